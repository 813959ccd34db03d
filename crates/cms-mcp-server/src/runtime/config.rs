use std::time::Duration;

use cms_mcp_server::server::Transport;
use reqwest::header::HeaderMap;
use secrecy::SecretString;
use serde::Deserialize;

use super::{
    discovery::{Cache, Synthesis},
    endpoint::Endpoint,
    logging::Logging,
};

/// Configuration for the MCP server
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// The content GraphQL endpoint
    pub endpoint: Endpoint,

    /// The read key sent with every request as the `auth` query parameter
    pub single_key: Option<SecretString>,

    /// Hard-coded headers to include in all GraphQL requests
    #[serde(deserialize_with = "parsers::map_from_str")]
    pub headers: HeaderMap,

    /// How long a GraphQL request may take, such as `30s`
    #[serde(with = "humantime_serde")]
    pub timeout: Option<Duration>,

    /// Schema caching
    pub cache: Cache,

    /// Limits on synthesized queries
    pub synthesis: Synthesis,

    /// Logging configuration
    pub logging: Logging,

    /// The type of server transport to use
    pub transport: Transport,
}

mod parsers {
    use std::str::FromStr;

    use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
    use serde::Deserializer;

    pub(super) fn map_from_str<'de, D>(deserializer: D) -> Result<HeaderMap, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct MapFromStrVisitor;
        impl<'de> serde::de::Visitor<'de> for MapFromStrVisitor {
            type Value = HeaderMap;

            fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
                formatter.write_str("a map of header names to values")
            }

            fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
            where
                A: serde::de::MapAccess<'de>,
            {
                let mut parsed = HeaderMap::with_capacity(map.size_hint().unwrap_or(0));
                while let Some((key, value)) = map.next_entry::<String, String>()? {
                    let key = HeaderName::from_str(&key)
                        .map_err(|e| serde::de::Error::custom(e.to_string()))?;
                    let value = HeaderValue::from_str(&value)
                        .map_err(|e| serde::de::Error::custom(e.to_string()))?;
                    parsed.insert(key, value);
                }

                Ok(parsed)
            }
        }

        deserializer.deserialize_map(MapFromStrVisitor)
    }
}
