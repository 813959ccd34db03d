//! Execute GraphQL documents against the CMS content endpoint

use crate::errors::ServerError;
use async_trait::async_trait;
use bon::bon;
use cms_schema_discovery::error::TransportError;
use cms_schema_discovery::introspection::{INTROSPECTION_QUERY, IntrospectionDocument};
use cms_schema_discovery::transport::GraphQLTransport;
use reqwest::header::HeaderMap;
use rmcp::serde_json::{self, Value};
use secrecy::{ExposeSecret, SecretString};
use std::time::Duration;
use tracing::debug;
use url::Url;

/// The query parameter carrying the endpoint's read key
const AUTH_QUERY_PARAM: &str = "auth";

/// A GraphQL client for the content endpoint
#[derive(Clone)]
pub struct GraphClient {
    client: reqwest::Client,
    endpoint: Url,
    headers: HeaderMap,
    single_key: Option<SecretString>,
}

#[bon]
impl GraphClient {
    #[builder]
    pub fn new(
        endpoint: Url,
        #[builder(default)] headers: HeaderMap,
        single_key: Option<SecretString>,
        timeout: Option<Duration>,
    ) -> Result<Self, ServerError> {
        let mut client = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            client = client.timeout(timeout);
        }

        Ok(Self {
            client: client.build()?,
            endpoint,
            headers,
            single_key,
        })
    }
}

impl GraphClient {
    fn url(&self) -> Url {
        let mut url = self.endpoint.clone();
        if let Some(key) = &self.single_key {
            url.query_pairs_mut()
                .append_pair(AUTH_QUERY_PARAM, key.expose_secret());
        }
        url
    }
}

#[async_trait]
impl GraphQLTransport for GraphClient {
    async fn query(&self, document: &str, variables: Value) -> Result<Value, TransportError> {
        let body = serde_json::json!({
            "query": document,
            "variables": variables,
        });

        let response = self
            .client
            .post(self.url())
            .headers(self.headers.clone())
            .json(&body)
            .send()
            .await
            .map_err(|e| TransportError::with_source("Failed to send GraphQL request", e))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(TransportError::new(format!(
                "GraphQL endpoint returned {status}: {text}"
            )));
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| TransportError::with_source("Failed to read GraphQL response body", e))
    }

    async fn introspect(&self) -> Result<IntrospectionDocument, TransportError> {
        debug!(endpoint = %self.endpoint, "Introspecting content schema");
        let mut response = self
            .query(INTROSPECTION_QUERY, Value::Object(Default::default()))
            .await?;

        match response.get_mut("data").map(Value::take) {
            Some(data) if !data.is_null() => IntrospectionDocument::from_data(data)
                .map_err(|e| TransportError::with_source("Invalid introspection response", e)),
            _ => Err(TransportError::new(format!(
                "Introspection returned no data: {}",
                response.get("errors").cloned().unwrap_or(Value::Null)
            ))),
        }
    }
}
