/// A boxed error from a transport implementation
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// An error raised by a [`GraphQLTransport`](crate::transport::GraphQLTransport)
#[derive(Debug, thiserror::Error)]
#[error("{message}")]
pub struct TransportError {
    message: String,
    #[source]
    source: Option<BoxError>,
}

impl TransportError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: None,
        }
    }

    pub fn with_source(message: impl Into<String>, source: impl Into<BoxError>) -> Self {
        Self {
            message: message.into(),
            source: Some(source.into()),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

/// An error in schema discovery, query synthesis or content resolution
#[derive(Debug, thiserror::Error)]
pub enum DiscoveryError {
    #[error("Content not found: {0}")]
    NotFound(String),

    #[error("GraphQL schema is unavailable: {0}")]
    SchemaUnavailable(#[source] TransportError),

    #[error("Invalid introspection document: {0}")]
    InvalidIntrospection(String),

    #[error("GraphQL request failed: {0}")]
    Transport(#[from] TransportError),

    #[error("GraphQL errors: {}", .0.join("; "))]
    GraphQL(Vec<String>),

    #[error("Unexpected GraphQL response: {0}")]
    InvalidResponse(String),

    #[error("Synthesized document is not valid GraphQL: {0}")]
    InvalidDocument(String),
}

impl DiscoveryError {
    /// Whether the error means "nothing matched" rather than a failure
    pub fn is_not_found(&self) -> bool {
        matches!(self, DiscoveryError::NotFound(_))
    }
}
