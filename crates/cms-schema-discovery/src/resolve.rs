//! Locating content from a loose identifier.
//!
//! An identifier may be a URL path, a content key, or free text. Each kind maps
//! to a lookup strategy, and the strategies are tried in order until one finds
//! an item.

use crate::error::DiscoveryError;
use crate::synthesize::{ItemLookup, QuerySynthesizer, SearchParams};
use crate::transport::{GraphQLTransport, execute, root_items};
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt::{self, Display, Formatter};
use std::sync::OnceLock;
use tracing::{debug, info, warn};

/// Search terms that mean the site root
const HOMEPAGE_TERMS: &[&str] = &["home", "homepage", "start", "index"];

/// Strategies in fallback order
const STRATEGY_ORDER: [StrategyKind; 3] = [StrategyKind::Search, StrategyKind::Path, StrategyKind::Key];

/// A way of looking content up
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
    /// Full-text search
    Search,
    /// URL path
    Path,
    /// Content key
    Key,
}

impl Display for StrategyKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            StrategyKind::Search => "search",
            StrategyKind::Path => "path",
            StrategyKind::Key => "key",
        })
    }
}

#[allow(clippy::expect_used)]
fn guid_pattern() -> &'static Regex {
    static GUID_PATTERN: OnceLock<Regex> = OnceLock::new();
    GUID_PATTERN.get_or_init(|| {
        Regex::new(
            r"^[0-9a-fA-F]{8}-?[0-9a-fA-F]{4}-?[0-9a-fA-F]{4}-?[0-9a-fA-F]{4}-?[0-9a-fA-F]{12}$",
        )
        .expect("regex pattern compiles")
    })
}

/// Pick the strategy an identifier most likely calls for
pub fn detect(identifier: &str) -> StrategyKind {
    let identifier = identifier.trim();
    if identifier.starts_with('/') {
        StrategyKind::Path
    } else if guid_pattern().is_match(identifier)
        || (!identifier.is_empty() && identifier.chars().all(|c| c.is_ascii_digit()))
    {
        StrategyKind::Key
    } else {
        StrategyKind::Search
    }
}

pub fn is_homepage_term(identifier: &str) -> bool {
    let identifier = identifier.trim();
    HOMEPAGE_TERMS
        .iter()
        .any(|term| term.eq_ignore_ascii_case(identifier))
}

/// Strip hyphens from GUID keys and lowercase them; other keys are kept as given
pub fn normalize_key(key: &str) -> String {
    let key = key.trim();
    if guid_pattern().is_match(key) {
        key.replace('-', "").to_lowercase()
    } else {
        key.to_string()
    }
}

pub fn normalize_path(path: &str) -> String {
    let path = path.trim();
    if path.starts_with('/') {
        path.to_string()
    } else {
        format!("/{path}")
    }
}

/// Hints narrowing how an identifier is resolved
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolveHint {
    /// Try this strategy first
    pub strategy: Option<StrategyKind>,
    /// Restrict searches to this content type
    pub content_type: Option<String>,
    pub locale: Option<String>,
}

/// One lookup to try
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attempt {
    pub strategy: StrategyKind,
    pub input: String,
}

impl Attempt {
    fn new(strategy: StrategyKind, identifier: &str) -> Self {
        let input = match strategy {
            StrategyKind::Search => identifier.trim().to_string(),
            StrategyKind::Path => normalize_path(identifier),
            StrategyKind::Key => normalize_key(identifier),
        };
        Self { strategy, input }
    }
}

/// The ordered lookups for an identifier.
///
/// The hinted or detected strategy goes first and the others follow in
/// search, path, key order. Homepage terms try the site root first.
pub fn plan(identifier: &str, hint: &ResolveHint) -> Vec<Attempt> {
    let first = hint.strategy.unwrap_or_else(|| detect(identifier));

    if hint.strategy.is_none() && first == StrategyKind::Search && is_homepage_term(identifier) {
        return vec![
            Attempt::new(StrategyKind::Path, "/"),
            Attempt::new(StrategyKind::Search, identifier),
            Attempt::new(StrategyKind::Key, identifier),
        ];
    }

    std::iter::once(first)
        .chain(STRATEGY_ORDER.into_iter().filter(|strategy| *strategy != first))
        .map(|strategy| Attempt::new(strategy, identifier))
        .collect()
}

/// A located content item
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedContent {
    pub key: String,
    /// The first non-system entry of the item's types
    pub content_type: Option<String>,
    pub method: StrategyKind,
}

/// Runs resolution plans against the transport
pub struct ContentResolver<'a> {
    transport: &'a dyn GraphQLTransport,
    synthesizer: &'a QuerySynthesizer,
}

impl<'a> ContentResolver<'a> {
    pub fn new(transport: &'a dyn GraphQLTransport, synthesizer: &'a QuerySynthesizer) -> Self {
        Self {
            transport,
            synthesizer,
        }
    }

    /// Try each planned lookup in turn; a failed lookup moves on to the next
    pub async fn resolve(&self, identifier: &str, hint: &ResolveHint) -> Option<ResolvedContent> {
        let attempts = plan(identifier, hint);

        for attempt in &attempts {
            match self.attempt(attempt, hint).await {
                Ok(Some(resolved)) => {
                    info!(
                        identifier,
                        method = %resolved.method,
                        key = %resolved.key,
                        content_type = ?resolved.content_type,
                        "Resolved content"
                    );
                    return Some(resolved);
                }
                Ok(None) => {
                    debug!(strategy = %attempt.strategy, input = %attempt.input, "No match");
                }
                Err(error) => {
                    warn!(
                        strategy = %attempt.strategy,
                        input = %attempt.input,
                        %error,
                        "Resolution attempt failed; trying next strategy"
                    );
                }
            }
        }

        info!(
            identifier,
            attempts = attempts.len(),
            "No strategy resolved the identifier"
        );
        None
    }

    async fn attempt(
        &self,
        attempt: &Attempt,
        hint: &ResolveHint,
    ) -> Result<Option<ResolvedContent>, DiscoveryError> {
        let locale = hint.locale.as_deref();
        let query = match attempt.strategy {
            StrategyKind::Search => self.synthesizer.search_query(&SearchParams {
                content_types: hint.content_type.iter().cloned().collect(),
                limit: 1,
                locale: hint.locale.clone(),
                ..SearchParams::new(&attempt.input)
            })?,
            StrategyKind::Path => {
                self.synthesizer
                    .item_query(&ItemLookup::Path(attempt.input.clone()), None, locale)?
                    .query
            }
            StrategyKind::Key => {
                self.synthesizer
                    .item_query(&ItemLookup::Key(attempt.input.clone()), None, locale)?
                    .query
            }
        };

        let data = execute(self.transport, &query).await?;
        Ok(root_items(&data, &query.root_field)
            .first()
            .and_then(|item| resolved_from(item, attempt.strategy)))
    }
}

fn resolved_from(item: &Value, method: StrategyKind) -> Option<ResolvedContent> {
    let metadata = item.get("_metadata")?;
    let key = metadata.get("key")?.as_str()?;
    let content_type = metadata
        .get("types")
        .and_then(Value::as_array)
        .and_then(|types| {
            types
                .iter()
                .filter_map(Value::as_str)
                .find(|name| !name.starts_with('_'))
        })
        .map(str::to_string);

    Some(ResolvedContent {
        key: key.to_string(),
        content_type,
        method,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::SchemaCache;
    use crate::error::TransportError;
    use crate::synthesize::SynthesisOptions;
    use crate::test_support::{MockTransport, cms_schema};
    use rstest::rstest;
    use serde_json::json;
    use std::sync::Arc;
    use tracing_test::traced_test;

    fn synthesizer() -> QuerySynthesizer {
        QuerySynthesizer::new(
            Arc::new(cms_schema()),
            SchemaCache::default(),
            SynthesisOptions::default(),
        )
    }

    fn found(key: &str) -> Value {
        json!({
            "data": {
                "_Content": {
                    "total": 1,
                    "items": [{ "_metadata": { "key": key, "types": ["_Page", "ArticlePage", "_Content"] } }]
                }
            }
        })
    }

    fn empty() -> Value {
        json!({ "data": { "_Content": { "total": 0, "items": [] } } })
    }

    #[rstest]
    #[case("/about-us", StrategyKind::Path)]
    #[case("8F0B3A4C-1D2E-4F5A-9B8C-7D6E5F4A3B2C", StrategyKind::Key)]
    #[case("8f0b3a4c1d2e4f5a9b8c7d6e5f4a3b2c", StrategyKind::Key)]
    #[case("12345", StrategyKind::Key)]
    #[case("abc123", StrategyKind::Search)]
    #[case("Article 4", StrategyKind::Search)]
    fn detects_identifier_kinds(#[case] identifier: &str, #[case] expected: StrategyKind) {
        assert_eq!(detect(identifier), expected);
    }

    #[test]
    fn normalizes_keys_and_paths() {
        assert_eq!(
            normalize_key("8F0B3A4C-1D2E-4F5A-9B8C-7D6E5F4A3B2C"),
            "8f0b3a4c1d2e4f5a9b8c7d6e5f4a3b2c"
        );
        assert_eq!(normalize_key("abc123"), "abc123");
        assert_eq!(normalize_path("news/latest"), "/news/latest");
        assert_eq!(normalize_path("/news"), "/news");
    }

    #[rstest]
    #[case("/news", &[StrategyKind::Path, StrategyKind::Search, StrategyKind::Key])]
    #[case("12345", &[StrategyKind::Key, StrategyKind::Search, StrategyKind::Path])]
    #[case("Article 4", &[StrategyKind::Search, StrategyKind::Path, StrategyKind::Key])]
    #[case("Home", &[StrategyKind::Path, StrategyKind::Search, StrategyKind::Key])]
    fn plans_attempts_in_fallback_order(#[case] identifier: &str, #[case] expected: &[StrategyKind]) {
        let strategies: Vec<StrategyKind> = plan(identifier, &ResolveHint::default())
            .into_iter()
            .map(|attempt| attempt.strategy)
            .collect();

        assert_eq!(strategies, expected);
    }

    #[test]
    fn hinted_strategies_go_first_and_skip_the_homepage_heuristic() {
        let hint = ResolveHint {
            strategy: Some(StrategyKind::Key),
            ..ResolveHint::default()
        };

        assert_eq!(
            plan("home", &hint),
            vec![
                Attempt::new(StrategyKind::Key, "home"),
                Attempt::new(StrategyKind::Search, "home"),
                Attempt::new(StrategyKind::Path, "home"),
            ]
        );
    }

    #[tokio::test]
    async fn homepage_terms_look_up_the_root_path_first() {
        let transport = MockTransport::cms().respond(|_, variables| {
            if variables.get("path") == Some(&json!("/")) {
                Ok(found("startpage"))
            } else {
                Ok(empty())
            }
        });
        let synthesizer = synthesizer();

        let resolved = ContentResolver::new(&transport, &synthesizer)
            .resolve("home", &ResolveHint::default())
            .await
            .unwrap();

        assert_eq!(resolved.method, StrategyKind::Path);
        assert_eq!(resolved.key, "startpage");
        let requests = transport.requests();
        assert_eq!(requests.len(), 1);
        assert!(requests[0].0.starts_with("query GetContentByPath"));
    }

    #[tokio::test]
    async fn ordinary_terms_search_first() {
        let transport = MockTransport::cms().respond(|_, _| Ok(found("article-4")));
        let synthesizer = synthesizer();

        let resolved = ContentResolver::new(&transport, &synthesizer)
            .resolve("Article 4", &ResolveHint::default())
            .await
            .unwrap();

        assert_eq!(
            resolved,
            ResolvedContent {
                key: "article-4".into(),
                content_type: Some("ArticlePage".into()),
                method: StrategyKind::Search,
            }
        );
        let requests = transport.requests();
        assert!(requests[0].0.starts_with("query SearchContent"));
        assert_eq!(requests[0].1["searchText"], json!("Article 4"));
        assert_eq!(requests[0].1["limit"], json!(1));
    }

    #[tokio::test]
    #[traced_test]
    async fn failed_attempts_fall_through_to_the_next_strategy() {
        let transport = MockTransport::cms().respond(|document, _| {
            if document.starts_with("query SearchContent") {
                Err(TransportError::new("search unavailable"))
            } else if document.starts_with("query GetContentByKey") {
                Ok(found("article-4"))
            } else {
                Ok(empty())
            }
        });
        let synthesizer = synthesizer();

        let resolved = ContentResolver::new(&transport, &synthesizer)
            .resolve("Article 4", &ResolveHint::default())
            .await
            .unwrap();

        assert_eq!(resolved.method, StrategyKind::Key);
        assert_eq!(transport.requests().len(), 3);
        assert_eq!(transport.requests()[1].1["path"], json!("/Article 4"));
        assert!(logs_contain("Resolution attempt failed"));
    }

    #[tokio::test]
    async fn exhausting_every_strategy_resolves_nothing() {
        let transport = MockTransport::cms().respond(|_, _| Ok(empty()));
        let synthesizer = synthesizer();

        let resolved = ContentResolver::new(&transport, &synthesizer)
            .resolve("nothing here", &ResolveHint::default())
            .await;

        assert!(resolved.is_none());
        assert_eq!(transport.requests().len(), 3);
    }
}
