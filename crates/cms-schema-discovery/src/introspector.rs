//! Loads the schema through the transport and serves cached views of it.

use crate::cache::SchemaCache;
use crate::error::DiscoveryError;
use crate::schema::{ContentTypeInfo, ContentTypeSchema, QueryRoot, SchemaModel};
use crate::transport::GraphQLTransport;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::info;

const SCHEMA_KEY: &str = "schema";

/// Fetches the introspection document at most once per cache TTL
pub struct SchemaIntrospector {
    transport: Arc<dyn GraphQLTransport>,
    cache: SchemaCache,
    fetch_gate: Mutex<()>,
}

impl SchemaIntrospector {
    pub fn new(transport: Arc<dyn GraphQLTransport>, cache: SchemaCache) -> Self {
        Self {
            transport,
            cache,
            fetch_gate: Mutex::new(()),
        }
    }

    pub fn cache(&self) -> &SchemaCache {
        &self.cache
    }

    pub fn transport(&self) -> &dyn GraphQLTransport {
        self.transport.as_ref()
    }

    /// Get the schema, fetching it if the cached copy is missing or expired.
    ///
    /// Concurrent callers wait for a single in-flight fetch.
    pub async fn initialize(&self) -> Result<Arc<SchemaModel>, DiscoveryError> {
        if let Some(schema) = self.cache.schemas().get(SCHEMA_KEY) {
            return Ok(schema);
        }

        let _guard = self.fetch_gate.lock().await;
        if let Some(schema) = self.cache.schemas().get(SCHEMA_KEY) {
            return Ok(schema);
        }

        info!("Fetching GraphQL schema");
        let document = self
            .transport
            .introspect()
            .await
            .map_err(DiscoveryError::SchemaUnavailable)?;
        let schema = Arc::new(SchemaModel::from_introspection(document)?);

        self.cache.clear_derived();
        self.cache
            .schemas()
            .set(SCHEMA_KEY, schema.clone(), self.cache.ttl());
        info!(
            types = schema.types().count(),
            query_type = schema.query_type_name(),
            "Loaded GraphQL schema"
        );
        Ok(schema)
    }

    /// The field view of an OBJECT type, or `None` if there is no such type
    pub async fn get_content_type(
        &self,
        name: &str,
    ) -> Result<Option<Arc<ContentTypeInfo>>, DiscoveryError> {
        let schema = self.initialize().await?;
        Ok(self.cache.content_type(&schema, name))
    }

    pub async fn get_types_implementing(
        &self,
        interface: &str,
    ) -> Result<Vec<String>, DiscoveryError> {
        Ok(self.initialize().await?.types_implementing(interface))
    }

    pub async fn resolve_query_root(&self, type_name: &str) -> Result<QueryRoot, DiscoveryError> {
        Ok(self.initialize().await?.resolve_query_root(type_name))
    }

    pub async fn content_type_schema(
        &self,
        name: &str,
    ) -> Result<Option<ContentTypeSchema>, DiscoveryError> {
        Ok(self
            .get_content_type(name)
            .await?
            .map(|info| ContentTypeSchema::from(info.as_ref())))
    }

    /// Drop the schema and everything derived from it
    pub fn invalidate(&self) {
        info!("Invalidating cached schema");
        self.cache.clear();
    }
}
