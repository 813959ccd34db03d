//! A small content endpoint for exercising tools over HTTP

use crate::graphql::GraphClient;
use cms_schema_discovery::cache::SchemaCache;
use cms_schema_discovery::service::ContentService;
use cms_schema_discovery::synthesize::SynthesisOptions;
use rmcp::model::{CallToolResult, RawContent};
use rmcp::serde_json::{Value, json};
use std::ops::Deref;
use std::sync::Arc;
use url::Url;
use wiremock::matchers::{body_string_contains, method};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn named(kind: &str, name: &str) -> Value {
    json!({ "kind": kind, "name": name, "ofType": null })
}

fn list(of: Value) -> Value {
    json!({ "kind": "LIST", "name": null, "ofType": of })
}

fn field(name: &str, type_ref: Value) -> Value {
    json!({ "name": name, "description": null, "args": [], "type": type_ref })
}

fn root(name: &str, output: &str) -> Value {
    let arg = |name: &str, type_ref: Value| {
        json!({ "name": name, "description": null, "type": type_ref, "defaultValue": null })
    };
    json!({
        "name": name,
        "description": null,
        "args": [
            arg("where", named("INPUT_OBJECT", &format!("{name}Where"))),
            arg("locale", list(named("ENUM", "Locales"))),
            arg("limit", named("SCALAR", "Int")),
            arg("skip", named("SCALAR", "Int")),
        ],
        "type": named("OBJECT", output),
    })
}

fn object(name: &str, fields: Vec<Value>, interfaces: &[&str]) -> Value {
    json!({
        "kind": "OBJECT",
        "name": name,
        "description": null,
        "fields": fields,
        "interfaces": interfaces.iter().map(|name| json!({ "name": name })).collect::<Vec<_>>(),
    })
}

/// An introspection response for a schema with a single page type
pub fn introspection_response() -> Value {
    let output = |name: &str, item: &str| {
        object(
            name,
            vec![
                field("total", named("SCALAR", "Int")),
                field("items", list(named("INTERFACE", item))),
            ],
            &[],
        )
    };

    json!({
        "data": {
            "__schema": {
                "queryType": { "name": "Query" },
                "types": [
                    object(
                        "Query",
                        vec![
                            root("_Content", "_ContentOutput"),
                            root("_IContent", "_IContentOutput"),
                        ],
                        &[],
                    ),
                    output("_ContentOutput", "_IContent"),
                    output("_IContentOutput", "_IContent"),
                    {
                        "kind": "INTERFACE",
                        "name": "_IContent",
                        "description": null,
                        "fields": [field("_metadata", named("INTERFACE", "IContentMetadata"))],
                        "possibleTypes": [{ "name": "ArticlePage" }],
                    },
                    object(
                        "ArticlePage",
                        vec![
                            field("_metadata", named("INTERFACE", "IContentMetadata")),
                            field("Heading", named("SCALAR", "String")),
                        ],
                        &["_IContent"],
                    ),
                    { "kind": "ENUM", "name": "Locales", "enumValues": [{ "name": "en" }] },
                    { "kind": "SCALAR", "name": "String" },
                    { "kind": "SCALAR", "name": "Int" },
                ]
            }
        }
    })
}

/// Start an endpoint that answers introspection
pub async fn cms_endpoint() -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(body_string_contains("IntrospectionQuery"))
        .respond_with(ResponseTemplate::new(200).set_body_json(introspection_response()))
        .mount(&server)
        .await;
    server
}

pub fn content_service(server: &MockServer) -> Arc<ContentService> {
    let client = GraphClient::builder()
        .endpoint(Url::parse(&server.uri()).unwrap())
        .build()
        .unwrap();
    Arc::new(ContentService::new(
        Arc::new(client),
        SchemaCache::default(),
        SynthesisOptions::default(),
    ))
}

/// Concatenate the text content of a tool result
pub fn result_text(result: &CallToolResult) -> String {
    result
        .content
        .iter()
        .filter_map(|content| match content.deref() {
            RawContent::Text(text) => Some(text.text.clone()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("\n")
}
