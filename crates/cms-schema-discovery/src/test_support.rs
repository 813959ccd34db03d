//! Builders for introspection fixtures and a scripted transport.

use crate::error::TransportError;
use crate::introspection::IntrospectionDocument;
use crate::schema::SchemaModel;
use crate::transport::GraphQLTransport;
use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::{Value, json};
use std::sync::atomic::{AtomicUsize, Ordering};

pub fn named(kind: &str, name: &str) -> Value {
    json!({ "kind": kind, "name": name, "ofType": null })
}

pub fn non_null(inner: Value) -> Value {
    json!({ "kind": "NON_NULL", "name": null, "ofType": inner })
}

pub fn list(inner: Value) -> Value {
    json!({ "kind": "LIST", "name": null, "ofType": inner })
}

pub fn field(name: &str, ty: Value) -> Value {
    field_with_args(name, ty, vec![])
}

pub fn field_with_args(name: &str, ty: Value, args: Vec<Value>) -> Value {
    json!({ "name": name, "description": null, "args": args, "type": ty })
}

pub fn arg(name: &str, ty: Value) -> Value {
    json!({ "name": name, "description": null, "type": ty, "defaultValue": null })
}

pub fn object(name: &str, fields: Vec<Value>, interfaces: &[&str]) -> Value {
    json!({
        "kind": "OBJECT",
        "name": name,
        "fields": fields,
        "interfaces": interfaces.iter().map(|i| named("INTERFACE", i)).collect::<Vec<_>>(),
    })
}

pub fn interface(name: &str, fields: Vec<Value>, possible: &[&str]) -> Value {
    json!({
        "kind": "INTERFACE",
        "name": name,
        "fields": fields,
        "possibleTypes": possible.iter().map(|p| named("OBJECT", p)).collect::<Vec<_>>(),
    })
}

pub fn schema_document(types: Vec<Value>) -> IntrospectionDocument {
    IntrospectionDocument::from_data(json!({
        "__schema": { "queryType": { "name": "Query" }, "types": types }
    }))
    .unwrap()
}

pub fn schema_from(types: Vec<Value>) -> SchemaModel {
    SchemaModel::from_introspection(schema_document(types)).unwrap()
}

/// A root content field taking the usual query arguments
fn content_root(name: &str, output: &str) -> Value {
    field_with_args(
        name,
        named("OBJECT", output),
        vec![
            arg("where", named("INPUT_OBJECT", &format!("{name}WhereInput"))),
            arg("locale", list(named("ENUM", "Locales"))),
            arg("limit", named("SCALAR", "Int")),
            arg("skip", named("SCALAR", "Int")),
            arg("orderBy", named("INPUT_OBJECT", &format!("{name}OrderByInput"))),
        ],
    )
}

fn metadata() -> Value {
    field("_metadata", named("INTERFACE", "IContentMetadata"))
}

/// Types of a headless CMS schema with pages, an experience and components.
///
/// `ArticlePage` is only reachable through `_IContent`; `LandingExperience` is a
/// root field of its own and carries a composition tree; `HeroBlock` and
/// `TextBlock` disagree on the type of `Title`.
pub fn cms_types() -> Vec<Value> {
    vec![
        object(
            "Query",
            vec![
                content_root("_Content", "_ContentOutput"),
                content_root("_IContent", "_IContentOutput"),
                content_root("LandingExperience", "LandingExperienceOutput"),
            ],
            &[],
        ),
        object(
            "_ContentOutput",
            vec![
                field("total", named("SCALAR", "Int")),
                field("items", list(named("INTERFACE", "_IContent"))),
            ],
            &[],
        ),
        object(
            "_IContentOutput",
            vec![
                field("total", named("SCALAR", "Int")),
                field("items", list(named("INTERFACE", "_IContent"))),
            ],
            &[],
        ),
        object(
            "LandingExperienceOutput",
            vec![field("items", list(named("OBJECT", "LandingExperience")))],
            &[],
        ),
        interface(
            "_IContent",
            vec![metadata()],
            &["ArticlePage", "StandardPage", "LandingExperience", "_Image"],
        ),
        object(
            "ArticlePage",
            vec![
                metadata(),
                field("Heading", named("SCALAR", "String")),
                field("Body", named("OBJECT", "RichText")),
            ],
            &["_IContent"],
        ),
        object(
            "StandardPage",
            vec![
                metadata(),
                field("Title", named("SCALAR", "String")),
                field("MainBody", named("OBJECT", "RichText")),
                field("Teaser", named("OBJECT", "ContentReference")),
                field("SortIndex", named("SCALAR", "Int")),
            ],
            &["_IContent"],
        ),
        object(
            "LandingExperience",
            vec![
                metadata(),
                field("Title", named("SCALAR", "String")),
                field("composition", named("OBJECT", "CompositionStructureNode")),
            ],
            &["_IContent", "_IExperience"],
        ),
        interface(
            "ICompositionNode",
            vec![field("key", named("SCALAR", "String"))],
            &["CompositionStructureNode", "CompositionComponentNode"],
        ),
        object(
            "CompositionStructureNode",
            vec![
                field("key", named("SCALAR", "String")),
                field("displayName", named("SCALAR", "String")),
                field("nodeType", named("SCALAR", "String")),
                field("layoutType", named("SCALAR", "String")),
                field("nodes", list(named("INTERFACE", "ICompositionNode"))),
            ],
            &["ICompositionNode"],
        ),
        object(
            "CompositionComponentNode",
            vec![
                field("key", named("SCALAR", "String")),
                field("displayName", named("SCALAR", "String")),
                field("nodeType", named("SCALAR", "String")),
                field("component", named("INTERFACE", "_IComponent")),
            ],
            &["ICompositionNode"],
        ),
        interface("_IComponent", vec![metadata()], &["HeroBlock", "TextBlock", "EmptyBlock"]),
        object(
            "HeroBlock",
            vec![
                metadata(),
                field("Heading", named("SCALAR", "String")),
                field("Title", named("SCALAR", "String")),
                field("Image", named("OBJECT", "ContentReference")),
            ],
            &["_IComponent"],
        ),
        object(
            "TextBlock",
            vec![
                metadata(),
                field("Title", named("SCALAR", "Int")),
                field("Text", named("OBJECT", "RichText")),
            ],
            &["_IComponent"],
        ),
        object(
            "EmptyBlock",
            vec![metadata(), field("Area", named("OBJECT", "ContentAreaItem"))],
            &["_IComponent"],
        ),
        object(
            "RichText",
            vec![
                field("html", named("SCALAR", "String")),
                field("json", named("SCALAR", "JSON")),
            ],
            &[],
        ),
        json!({ "kind": "ENUM", "name": "Locales", "enumValues": [{ "name": "en" }, { "name": "sv" }] }),
        json!({ "kind": "SCALAR", "name": "String" }),
        json!({ "kind": "SCALAR", "name": "Int" }),
        json!({ "kind": "SCALAR", "name": "JSON" }),
    ]
}

pub fn cms_schema() -> SchemaModel {
    schema_from(cms_types())
}

/// The CMS fixture after `HeroBlock` gained a `Subtitle` field
pub fn cms_types_with_subtitle() -> Vec<Value> {
    cms_types()
        .into_iter()
        .map(|mut ty| {
            if ty["name"] == "HeroBlock" {
                if let Some(fields) = ty["fields"].as_array_mut() {
                    fields.push(field("Subtitle", named("SCALAR", "String")));
                }
            }
            ty
        })
        .collect()
}

type Responder = Box<dyn Fn(&str, &Value) -> Result<Value, TransportError> + Send + Sync>;

/// A transport that serves scripted schemas and answers queries from a closure
pub struct MockTransport {
    schemas: Vec<IntrospectionDocument>,
    responder: Responder,
    introspections: AtomicUsize,
    requests: Mutex<Vec<(String, Value)>>,
}

impl MockTransport {
    pub fn new(types: Vec<Value>) -> Self {
        Self::sequence(vec![types])
    }

    /// Serve each schema in turn on successive introspections, then keep serving the last
    pub fn sequence(schemas: Vec<Vec<Value>>) -> Self {
        Self {
            schemas: schemas.into_iter().map(schema_document).collect(),
            ..Self::empty()
        }
    }

    /// Serve the CMS fixture schema
    pub fn cms() -> Self {
        Self::new(cms_types())
    }

    /// A transport whose introspection always fails
    pub fn empty() -> Self {
        Self {
            schemas: Vec::new(),
            responder: Box::new(|_, _| Ok(json!({ "data": {} }))),
            introspections: AtomicUsize::new(0),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn respond(
        mut self,
        responder: impl Fn(&str, &Value) -> Result<Value, TransportError> + Send + Sync + 'static,
    ) -> Self {
        self.responder = Box::new(responder);
        self
    }

    pub fn introspections(&self) -> usize {
        self.introspections.load(Ordering::SeqCst)
    }

    /// Every query sent, with its variables
    pub fn requests(&self) -> Vec<(String, Value)> {
        self.requests.lock().clone()
    }

    pub fn documents(&self) -> Vec<String> {
        self.requests().into_iter().map(|(document, _)| document).collect()
    }
}

#[async_trait]
impl GraphQLTransport for MockTransport {
    async fn query(&self, document: &str, variables: Value) -> Result<Value, TransportError> {
        self.requests
            .lock()
            .push((document.to_string(), variables.clone()));
        (self.responder)(document, &variables)
    }

    async fn introspect(&self) -> Result<IntrospectionDocument, TransportError> {
        let served = self.introspections.fetch_add(1, Ordering::SeqCst);
        self.schemas
            .get(served)
            .or(self.schemas.last())
            .cloned()
            .ok_or_else(|| TransportError::new("connection refused"))
    }
}
