//! The GraphQL transport consumed by discovery and resolution.

use crate::error::{DiscoveryError, TransportError};
use crate::introspection::IntrospectionDocument;
use crate::synthesize::SynthesizedQuery;
use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, warn};

/// Executes GraphQL documents against the content endpoint.
///
/// Retries, timeouts and authentication are the implementation's concern.
#[async_trait]
pub trait GraphQLTransport: Send + Sync {
    /// Execute a document, returning the full response body
    async fn query(&self, document: &str, variables: Value) -> Result<Value, TransportError>;

    /// Fetch the introspection document
    async fn introspect(&self) -> Result<IntrospectionDocument, TransportError>;
}

/// Execute a synthesized query and return its `data`.
///
/// Errors reported alongside data are logged and the data is kept; errors without
/// data fail the request.
pub async fn execute(
    transport: &dyn GraphQLTransport,
    query: &SynthesizedQuery,
) -> Result<Value, DiscoveryError> {
    debug!(
        operation = %query.operation_name,
        variables = %query.variables,
        "Executing GraphQL document:\n{}",
        query.document
    );
    let mut response = transport
        .query(&query.document, query.variables.clone())
        .await?;

    let errors: Vec<String> = response
        .get("errors")
        .and_then(Value::as_array)
        .map(|errors| {
            errors
                .iter()
                .map(|error| {
                    error
                        .get("message")
                        .and_then(Value::as_str)
                        .map(str::to_string)
                        .unwrap_or_else(|| error.to_string())
                })
                .collect()
        })
        .unwrap_or_default();

    match response.get_mut("data").map(Value::take) {
        Some(data) if !data.is_null() => {
            if !errors.is_empty() {
                warn!(
                    operation = %query.operation_name,
                    "GraphQL response contained errors: {}",
                    errors.join("; ")
                );
            }
            Ok(data)
        }
        _ if !errors.is_empty() => Err(DiscoveryError::GraphQL(errors)),
        _ => Err(DiscoveryError::InvalidResponse(
            "response has neither data nor errors".into(),
        )),
    }
}

/// The `items` list returned under a root field
pub fn root_items<'a>(data: &'a Value, root_field: &str) -> &'a [Value] {
    data.get(root_field)
        .and_then(|root| root.get("items"))
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default()
}
