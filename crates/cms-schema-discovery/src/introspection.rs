//! The GraphQL introspection document, as returned by the standard introspection query.
//!
//! These types mirror the introspection schema closely and are only used to build a
//! [`SchemaModel`](crate::schema::SchemaModel).

use serde::Deserialize;

/// The introspection query sent to the endpoint
pub const INTROSPECTION_QUERY: &str = r#"query IntrospectionQuery {
  __schema {
    queryType { name }
    types {
      kind
      name
      description
      fields(includeDeprecated: true) {
        name
        description
        args { name description type { ...TypeRef } defaultValue }
        type { ...TypeRef }
      }
      inputFields { name description type { ...TypeRef } defaultValue }
      interfaces { name }
      possibleTypes { name }
      enumValues(includeDeprecated: true) { name }
    }
  }
}
fragment TypeRef on __Type {
  kind
  name
  ofType {
    kind
    name
    ofType {
      kind
      name
      ofType {
        kind
        name
        ofType {
          kind
          name
          ofType {
            kind
            name
            ofType { kind name ofType { kind name } }
          }
        }
      }
    }
  }
}"#;

/// The `data` of an introspection response
#[derive(Debug, Clone, Deserialize)]
pub struct IntrospectionDocument {
    #[serde(rename = "__schema")]
    pub schema: RawSchema,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawSchema {
    pub query_type: Option<RawNamedRef>,
    #[serde(default)]
    pub types: Vec<RawType>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawNamedRef {
    pub name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RawTypeKind {
    Scalar,
    Object,
    Interface,
    Union,
    Enum,
    InputObject,
    List,
    NonNull,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawType {
    pub kind: RawTypeKind,
    pub name: Option<String>,
    pub description: Option<String>,
    pub fields: Option<Vec<RawField>>,
    pub input_fields: Option<Vec<RawInputValue>>,
    pub interfaces: Option<Vec<RawNamedRef>>,
    pub possible_types: Option<Vec<RawNamedRef>>,
    pub enum_values: Option<Vec<RawNamedRef>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawField {
    pub name: String,
    pub description: Option<String>,
    #[serde(default)]
    pub args: Vec<RawInputValue>,
    #[serde(rename = "type")]
    pub type_ref: RawTypeRef,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawInputValue {
    pub name: String,
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub type_ref: RawTypeRef,
    pub default_value: Option<String>,
}

/// A possibly wrapped type reference
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawTypeRef {
    pub kind: RawTypeKind,
    pub name: Option<String>,
    pub of_type: Option<Box<RawTypeRef>>,
}

impl IntrospectionDocument {
    /// Parse the `data` object of an introspection response
    pub fn from_data(data: serde_json::Value) -> Result<Self, serde_json::Error> {
        serde_json::from_value(data)
    }
}
