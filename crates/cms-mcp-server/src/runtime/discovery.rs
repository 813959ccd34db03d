//! Schema cache and query synthesis settings

use std::time::Duration;

use cms_schema_discovery::cache::{CacheConfig, DEFAULT_MAX_ENTRIES, DEFAULT_TTL};
use cms_schema_discovery::composition::DEFAULT_COMPOSITION_DEPTH;
use cms_schema_discovery::synthesize::{DEFAULT_MAX_FIELDS, SynthesisOptions};
use serde::Deserialize;

/// Caching of the introspected schema and everything derived from it
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Cache {
    /// How long the schema is kept before it is introspected again, such as `30m`
    #[serde(with = "humantime_serde")]
    pub ttl: Duration,

    /// The number of entries held by each cache
    pub max_entries: usize,
}

impl Default for Cache {
    fn default() -> Self {
        Self {
            ttl: DEFAULT_TTL,
            max_entries: DEFAULT_MAX_ENTRIES,
        }
    }
}

impl From<&Cache> for CacheConfig {
    fn from(cache: &Cache) -> Self {
        CacheConfig {
            ttl: cache.ttl,
            max_entries: cache.max_entries,
        }
    }
}

/// Limits on synthesized queries
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Synthesis {
    /// Fields selected per content type, metadata included
    pub max_fields: usize,

    /// Levels of nested composition nodes to follow
    pub composition_depth: usize,
}

impl Default for Synthesis {
    fn default() -> Self {
        Self {
            max_fields: DEFAULT_MAX_FIELDS,
            composition_depth: DEFAULT_COMPOSITION_DEPTH,
        }
    }
}

impl From<&Synthesis> for SynthesisOptions {
    fn from(synthesis: &Synthesis) -> Self {
        SynthesisOptions {
            max_fields: synthesis.max_fields,
            composition_depth: synthesis.composition_depth,
        }
    }
}
