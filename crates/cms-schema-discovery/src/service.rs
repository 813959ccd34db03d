//! The operations offered to callers.

use crate::cache::SchemaCache;
use crate::error::DiscoveryError;
use crate::introspector::SchemaIntrospector;
use crate::resolve::{ContentResolver, ResolveHint, StrategyKind};
use crate::schema::ContentTypeSchema;
use crate::synthesize::{ItemLookup, QuerySynthesizer, SearchParams, SynthesisOptions};
use crate::transport::{GraphQLTransport, execute, root_items};
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use tracing::{info, warn};

/// The interface implemented by every routable content type
pub const DEFAULT_CONTENT_INTERFACE: &str = "_IContent";

/// Options for [`ContentService::resolve_and_enrich`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnrichOptions {
    /// Try this lookup strategy first
    pub strategy: Option<StrategyKind>,
    /// The content type to assume when the item does not report one
    pub content_type: Option<String>,
    /// Override the field budget
    pub max_fields: Option<usize>,
}

/// A content item with everything its type exposes
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrichedContent {
    pub content: Value,
    pub discovered_fields: Vec<String>,
    pub method: StrategyKind,
    pub key: String,
    pub content_type: Option<String>,
}

/// Schema-driven access to CMS content
pub struct ContentService {
    introspector: SchemaIntrospector,
    options: SynthesisOptions,
}

impl ContentService {
    pub fn new(
        transport: Arc<dyn GraphQLTransport>,
        cache: SchemaCache,
        options: SynthesisOptions,
    ) -> Self {
        Self {
            introspector: SchemaIntrospector::new(transport, cache),
            options,
        }
    }

    pub fn introspector(&self) -> &SchemaIntrospector {
        &self.introspector
    }

    async fn synthesizer(&self, options: SynthesisOptions) -> Result<QuerySynthesizer, DiscoveryError> {
        let schema = self.introspector.initialize().await?;
        Ok(QuerySynthesizer::new(
            schema,
            self.introspector.cache().clone(),
            options,
        ))
    }

    /// Locate an item and fetch it again with every field its type exposes.
    ///
    /// Items whose type is not in the schema are returned with metadata only.
    pub async fn resolve_and_enrich(
        &self,
        identifier: &str,
        locale: Option<&str>,
        options: &EnrichOptions,
    ) -> Result<EnrichedContent, DiscoveryError> {
        let synthesizer = self
            .synthesizer(SynthesisOptions {
                max_fields: options.max_fields.unwrap_or(self.options.max_fields),
                ..self.options
            })
            .await?;
        let transport = self.introspector.transport();

        let hint = ResolveHint {
            strategy: options.strategy,
            content_type: options.content_type.clone(),
            locale: locale.map(str::to_string),
        };
        let resolved = ContentResolver::new(transport, &synthesizer)
            .resolve(identifier, &hint)
            .await
            .ok_or_else(|| DiscoveryError::NotFound(format!("no content matches '{identifier}'")))?;

        let content_type = resolved
            .content_type
            .clone()
            .or_else(|| options.content_type.clone());
        // Look the type up in the schema the item query is built from
        let info = match &content_type {
            Some(name) => {
                let info = synthesizer.content_type(name);
                if info.is_none() {
                    warn!(content_type = %name, "Content type is not in the schema; selecting metadata only");
                }
                info
            }
            None => None,
        };

        let item = synthesizer.item_query(
            &ItemLookup::Key(resolved.key.clone()),
            info.as_deref(),
            locale,
        )?;
        let data = execute(transport, &item.query).await?;
        let content = root_items(&data, &item.query.root_field)
            .first()
            .cloned()
            .ok_or_else(|| {
                DiscoveryError::NotFound(format!("content '{}' returned no items", resolved.key))
            })?;

        info!(
            key = %resolved.key,
            fields = item.discovered_fields.len(),
            "Enriched content"
        );
        Ok(EnrichedContent {
            content,
            discovered_fields: item.discovered_fields,
            method: resolved.method,
            key: resolved.key,
            content_type,
        })
    }

    pub async fn get_content_type_schema(
        &self,
        type_name: &str,
    ) -> Result<ContentTypeSchema, DiscoveryError> {
        self.introspector
            .content_type_schema(type_name)
            .await?
            .ok_or_else(|| DiscoveryError::NotFound(format!("content type '{type_name}'")))
    }

    /// Run a full-text search, returning the root result with totals and facets
    pub async fn search(&self, params: &SearchParams) -> Result<Value, DiscoveryError> {
        let query = self.synthesizer(self.options).await?.search_query(params)?;
        let mut data = execute(self.introspector.transport(), &query).await?;
        Ok(data
            .get_mut(&query.root_field)
            .map(Value::take)
            .unwrap_or(Value::Null))
    }

    /// Content types implementing an interface, sorted by name
    pub async fn list_content_types(
        &self,
        interface: Option<&str>,
    ) -> Result<Vec<String>, DiscoveryError> {
        let mut names = self
            .introspector
            .get_types_implementing(interface.unwrap_or(DEFAULT_CONTENT_INTERFACE))
            .await?;
        names.sort();
        Ok(names)
    }
}
