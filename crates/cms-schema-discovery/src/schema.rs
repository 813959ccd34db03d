//! A typed model of the named types in an introspected schema.

use crate::classify::{FieldClassifier, FieldKind};
use crate::error::DiscoveryError;
use crate::introspection::{IntrospectionDocument, RawField, RawType, RawTypeKind, RawTypeRef};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

/// The root field assumed to exist on every supported schema
pub const GENERIC_ROOT_FIELD: &str = "_Content";

/// Interface and type names that describe the schema itself rather than content
pub const SYSTEM_TYPE_NAMES: &[&str] = &["IContent", "IComponent", "IData"];

static NEXT_GENERATION: AtomicU64 = AtomicU64::new(1);

/// The kind of a named type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TypeKind {
    Scalar,
    Object,
    Interface,
    Union,
    Enum,
    InputObject,
}

/// A field argument
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ArgumentDescriptor {
    pub name: String,
    pub base_type_name: String,
    pub declared_type: String,
    pub default_value: Option<String>,
    pub description: Option<String>,
}

/// A field with its wrapper chain unwrapped down to the named type
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldDescriptor {
    pub name: String,
    pub base_type_name: String,
    pub declared_type: String,
    pub is_list: bool,
    pub is_required: bool,
    pub args: Vec<ArgumentDescriptor>,
    pub description: Option<String>,
}

impl FieldDescriptor {
    /// Metadata fields are prefixed with an underscore
    pub fn is_metadata(&self) -> bool {
        self.name.starts_with('_')
    }

    pub fn arg(&self, name: &str) -> Option<&ArgumentDescriptor> {
        self.args.iter().find(|arg| arg.name == name)
    }
}

/// A named type
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TypeDescriptor {
    pub name: String,
    pub kind: TypeKind,
    pub description: Option<String>,
    pub fields: Vec<FieldDescriptor>,
    pub interfaces: Vec<String>,
    pub possible_types: Vec<String>,
}

impl TypeDescriptor {
    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|field| field.name == name)
    }
}

/// The root query field chosen for a content type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryRoot {
    /// The root query field name
    pub field: String,
    /// The content type being queried
    pub type_name: String,
}

impl QueryRoot {
    /// Whether the content type's fields must be wrapped in an inline fragment
    pub fn wraps_type(&self) -> bool {
        self.field != self.type_name
    }
}

/// The named types of a schema, keyed by name.
///
/// Every model built from an introspection document gets its own generation
/// and a classifier that knows the schema's scalars and enums.
#[derive(Debug, Clone)]
pub struct SchemaModel {
    query_type: String,
    types: HashMap<String, TypeDescriptor>,
    generation: u64,
    classifier: FieldClassifier,
}

impl SchemaModel {
    /// Build the model from an introspection document
    pub fn from_introspection(document: IntrospectionDocument) -> Result<Self, DiscoveryError> {
        let query_type = document
            .schema
            .query_type
            .map(|query_type| query_type.name)
            .ok_or_else(|| DiscoveryError::InvalidIntrospection("missing query type".into()))?;

        let mut types = HashMap::with_capacity(document.schema.types.len());
        for raw in document.schema.types {
            if let Some(descriptor) = type_descriptor(raw)? {
                types.insert(descriptor.name.clone(), descriptor);
            }
        }

        if !types.contains_key(&query_type) {
            return Err(DiscoveryError::InvalidIntrospection(format!(
                "query type {query_type} is not defined"
            )));
        }

        let mut schema = Self {
            query_type,
            types,
            generation: NEXT_GENERATION.fetch_add(1, Ordering::Relaxed),
            classifier: FieldClassifier::new(),
        };
        schema.classifier = FieldClassifier::for_schema(&schema);
        Ok(schema)
    }

    /// Identifies this model among every model built by the process
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn classifier(&self) -> &FieldClassifier {
        &self.classifier
    }

    pub fn get(&self, name: &str) -> Option<&TypeDescriptor> {
        self.types.get(name)
    }

    pub fn types(&self) -> impl Iterator<Item = &TypeDescriptor> {
        self.types.values()
    }

    pub fn query_type_name(&self) -> &str {
        &self.query_type
    }

    pub fn root_field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.types
            .get(&self.query_type)
            .and_then(|query| query.field(name))
    }

    pub fn root_fields(&self) -> impl Iterator<Item = &FieldDescriptor> {
        self.types
            .get(&self.query_type)
            .into_iter()
            .flat_map(|query| query.fields.iter())
    }

    /// Get an OBJECT type
    pub fn object(&self, name: &str) -> Option<&TypeDescriptor> {
        self.get(name)
            .filter(|descriptor| descriptor.kind == TypeKind::Object)
    }

    /// The content types implementing an interface, excluding system types.
    ///
    /// An unknown interface yields an empty list, which callers treat as "no
    /// implementers found".
    pub fn types_implementing(&self, interface: &str) -> Vec<String> {
        self.get(interface)
            .filter(|descriptor| descriptor.kind == TypeKind::Interface)
            .map(|descriptor| {
                descriptor
                    .possible_types
                    .iter()
                    .filter(|name| !is_system_type(name))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }

    /// OBJECT types declaring an interface, sorted by name
    pub fn objects_declaring(&self, interface: &str) -> Vec<String> {
        let mut names: Vec<String> = self
            .types
            .values()
            .filter(|descriptor| descriptor.kind == TypeKind::Object)
            .filter(|descriptor| descriptor.interfaces.iter().any(|i| i == interface))
            .filter(|descriptor| !is_system_type(&descriptor.name))
            .map(|descriptor| descriptor.name.clone())
            .collect();
        names.sort();
        names
    }

    /// Pick the root query field used to fetch a content type.
    ///
    /// The type itself is preferred, then its interfaces in declaration order,
    /// then any root field returning a list of content, and finally
    /// [`GENERIC_ROOT_FIELD`].
    pub fn resolve_query_root(&self, type_name: &str) -> QueryRoot {
        let field = if self.root_field(type_name).is_some() {
            type_name.to_string()
        } else if let Some(interface) = self.get(type_name).and_then(|descriptor| {
            descriptor
                .interfaces
                .iter()
                .find(|interface| self.root_field(interface).is_some())
        }) {
            interface.clone()
        } else {
            self.content_list_root()
                .unwrap_or_else(|| GENERIC_ROOT_FIELD.to_string())
        };

        QueryRoot {
            field,
            type_name: type_name.to_string(),
        }
    }

    /// The root field used for queries across all content types
    pub fn generic_content_root(&self) -> String {
        if self.root_field(GENERIC_ROOT_FIELD).is_some() {
            return GENERIC_ROOT_FIELD.to_string();
        }
        self.content_list_root()
            .unwrap_or_else(|| GENERIC_ROOT_FIELD.to_string())
    }

    /// The first root field returning a list of something named like content
    fn content_list_root(&self) -> Option<String> {
        self.root_fields()
            .find(|field| field.base_type_name.contains("Content") && self.returns_list(field))
            .map(|field| field.name.clone())
    }

    fn returns_list(&self, field: &FieldDescriptor) -> bool {
        field.is_list
            || self
                .get(&field.base_type_name)
                .and_then(|output| output.field("items"))
                .is_some_and(|items| items.is_list)
    }

    /// Get the derived view of a content type, if it is an OBJECT
    pub fn content_type(
        &self,
        name: &str,
        classifier: &FieldClassifier,
    ) -> Option<ContentTypeInfo> {
        self.object(name)
            .map(|descriptor| ContentTypeInfo::new(descriptor, classifier))
    }
}

/// Whether a type name belongs to the schema's own plumbing
pub fn is_system_type(name: &str) -> bool {
    name.starts_with('_') || SYSTEM_TYPE_NAMES.contains(&name)
}

/// A content type, with its fields grouped for query synthesis
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentTypeInfo {
    pub name: String,
    pub fields: Vec<FieldDescriptor>,
    pub searchable_fields: Vec<String>,
    pub metadata_fields: Vec<String>,
    pub interfaces: Vec<String>,
}

impl ContentTypeInfo {
    pub fn new(descriptor: &TypeDescriptor, classifier: &FieldClassifier) -> Self {
        let metadata_fields = descriptor
            .fields
            .iter()
            .filter(|field| field.is_metadata())
            .map(|field| field.name.clone())
            .collect();
        let searchable_fields = descriptor
            .fields
            .iter()
            .filter(|field| match classifier.classify(field) {
                FieldKind::RichText => true,
                FieldKind::Scalar => field.base_type_name == "String",
                _ => false,
            })
            .map(|field| field.name.clone())
            .collect();

        Self {
            name: descriptor.name.clone(),
            fields: descriptor.fields.clone(),
            searchable_fields,
            metadata_fields,
            interfaces: descriptor.interfaces.clone(),
        }
    }

    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|field| field.name == name)
    }

    pub fn is_searchable(&self, name: &str) -> bool {
        self.searchable_fields.iter().any(|field| field == name)
    }
}

/// The schema of a content type, for display to callers
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContentTypeSchema {
    pub name: String,
    pub fields: Vec<FieldDescriptor>,
    pub interfaces: Vec<String>,
}

impl From<&ContentTypeInfo> for ContentTypeSchema {
    fn from(info: &ContentTypeInfo) -> Self {
        Self {
            name: info.name.clone(),
            fields: info.fields.clone(),
            interfaces: info.interfaces.clone(),
        }
    }
}

fn type_descriptor(raw: RawType) -> Result<Option<TypeDescriptor>, DiscoveryError> {
    let Some(name) = raw.name else {
        return Ok(None);
    };
    let kind = match raw.kind {
        RawTypeKind::Scalar => TypeKind::Scalar,
        RawTypeKind::Object => TypeKind::Object,
        RawTypeKind::Interface => TypeKind::Interface,
        RawTypeKind::Union => TypeKind::Union,
        RawTypeKind::Enum => TypeKind::Enum,
        RawTypeKind::InputObject => TypeKind::InputObject,
        RawTypeKind::List | RawTypeKind::NonNull => {
            return Err(DiscoveryError::InvalidIntrospection(format!(
                "named type {name} has a wrapper kind"
            )));
        }
    };

    let mut fields = raw
        .fields
        .unwrap_or_default()
        .into_iter()
        .map(field_descriptor)
        .collect::<Result<Vec<_>, _>>()?;
    for input_field in raw.input_fields.unwrap_or_default() {
        let unwrapped = unwrap_type(&input_field.type_ref)?;
        fields.push(FieldDescriptor {
            name: input_field.name,
            base_type_name: unwrapped.base_type_name,
            declared_type: unwrapped.declared_type,
            is_list: unwrapped.is_list,
            is_required: unwrapped.is_required,
            args: Vec::new(),
            description: input_field.description,
        });
    }

    Ok(Some(TypeDescriptor {
        name,
        kind,
        description: raw.description,
        fields,
        interfaces: names(raw.interfaces),
        possible_types: names(raw.possible_types),
    }))
}

fn names(refs: Option<Vec<crate::introspection::RawNamedRef>>) -> Vec<String> {
    refs.unwrap_or_default()
        .into_iter()
        .map(|named| named.name)
        .collect()
}

fn field_descriptor(raw: RawField) -> Result<FieldDescriptor, DiscoveryError> {
    let unwrapped = unwrap_type(&raw.type_ref)?;
    let args = raw
        .args
        .into_iter()
        .map(|arg| {
            let unwrapped = unwrap_type(&arg.type_ref)?;
            Ok(ArgumentDescriptor {
                name: arg.name,
                base_type_name: unwrapped.base_type_name,
                declared_type: unwrapped.declared_type,
                default_value: arg.default_value,
                description: arg.description,
            })
        })
        .collect::<Result<Vec<_>, DiscoveryError>>()?;

    Ok(FieldDescriptor {
        name: raw.name,
        base_type_name: unwrapped.base_type_name,
        declared_type: unwrapped.declared_type,
        is_list: unwrapped.is_list,
        is_required: unwrapped.is_required,
        args,
        description: raw.description,
    })
}

/// The result of unwrapping a type reference
#[derive(Debug, PartialEq, Eq)]
pub(crate) struct UnwrappedType {
    pub(crate) base_type_name: String,
    pub(crate) declared_type: String,
    pub(crate) is_list: bool,
    pub(crate) is_required: bool,
}

/// Follow the NON_NULL/LIST chain down to the named type
pub(crate) fn unwrap_type(type_ref: &RawTypeRef) -> Result<UnwrappedType, DiscoveryError> {
    let is_required = type_ref.kind == RawTypeKind::NonNull;
    let mut is_list = false;
    let mut wrappers = Vec::new();
    let mut current = type_ref;

    loop {
        match current.kind {
            RawTypeKind::NonNull | RawTypeKind::List => {
                is_list |= current.kind == RawTypeKind::List;
                wrappers.push(current.kind);
                current = current.of_type.as_deref().ok_or_else(|| {
                    DiscoveryError::InvalidIntrospection(
                        "type wrapper without an inner type".into(),
                    )
                })?;
            }
            _ => break,
        }
    }

    let base_type_name = current.name.clone().ok_or_else(|| {
        DiscoveryError::InvalidIntrospection("named type reference without a name".into())
    })?;

    let mut declared_type = String::new();
    for wrapper in &wrappers {
        if *wrapper == RawTypeKind::List {
            declared_type.push('[');
        }
    }
    declared_type.push_str(&base_type_name);
    for wrapper in wrappers.iter().rev() {
        declared_type.push(if *wrapper == RawTypeKind::List { ']' } else { '!' });
    }

    Ok(UnwrappedType {
        base_type_name,
        declared_type,
        is_list,
        is_required,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{
        field, interface, list, named, non_null, object, schema_document, schema_from,
    };
    use rstest::rstest;
    use serde_json::json;

    fn type_ref(value: serde_json::Value) -> RawTypeRef {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn each_model_has_its_own_generation_and_classifier() {
        let types = || {
            vec![
                object("Query", vec![field("ok", named("SCALAR", "Boolean"))], &[]),
                json!({ "kind": "ENUM", "name": "Status", "enumValues": [{ "name": "DRAFT" }] }),
            ]
        };
        let first = schema_from(types());
        let second = schema_from(types());

        assert_ne!(first.generation(), second.generation());
        assert!(
            first
                .classifier()
                .is_basic_field(&first.root_field("ok").cloned().unwrap())
        );
        let status = FieldDescriptor {
            name: "Status".into(),
            base_type_name: "Status".into(),
            declared_type: "Status".into(),
            is_list: false,
            is_required: false,
            args: vec![],
            description: None,
        };
        assert!(first.classifier().is_basic_field(&status));
        assert!(!FieldClassifier::new().is_basic_field(&status));
    }

    #[test]
    fn unwraps_required_list_of_required_strings() {
        let unwrapped =
            unwrap_type(&type_ref(non_null(list(non_null(named("SCALAR", "String")))))).unwrap();

        assert_eq!(
            unwrapped,
            UnwrappedType {
                base_type_name: "String".into(),
                declared_type: "[String!]!".into(),
                is_list: true,
                is_required: true,
            }
        );
    }

    #[rstest]
    #[case(named("SCALAR", "Int"), "Int", false, false)]
    #[case(non_null(named("SCALAR", "Int")), "Int!", false, true)]
    #[case(list(named("OBJECT", "Block")), "[Block]", true, false)]
    #[case(list(non_null(named("OBJECT", "Block"))), "[Block!]", true, false)]
    fn renders_declared_types(
        #[case] raw: serde_json::Value,
        #[case] declared: &str,
        #[case] is_list: bool,
        #[case] is_required: bool,
    ) {
        let unwrapped = unwrap_type(&type_ref(raw)).unwrap();

        assert_eq!(unwrapped.declared_type, declared);
        assert_eq!(unwrapped.is_list, is_list);
        assert_eq!(unwrapped.is_required, is_required);
    }

    #[test]
    fn rejects_wrappers_without_a_named_leaf() {
        let broken = type_ref(json!({ "kind": "NON_NULL", "name": null, "ofType": null }));

        assert!(matches!(
            unwrap_type(&broken),
            Err(DiscoveryError::InvalidIntrospection(_))
        ));
    }

    #[test]
    fn rejects_documents_without_a_query_type() {
        let document = IntrospectionDocument::from_data(json!({
            "__schema": { "queryType": null, "types": [] }
        }))
        .unwrap();

        assert!(SchemaModel::from_introspection(document).is_err());
    }

    #[test]
    fn input_objects_expose_input_fields() {
        let document = IntrospectionDocument::from_data(json!({
            "__schema": {
                "queryType": { "name": "Query" },
                "types": [
                    object("Query", vec![field("ok", named("SCALAR", "Boolean"))], &[]),
                    {
                        "kind": "INPUT_OBJECT",
                        "name": "StringFilterInput",
                        "inputFields": [{
                            "name": "eq",
                            "type": named("SCALAR", "String"),
                            "defaultValue": null
                        }]
                    }
                ]
            }
        }))
        .unwrap();
        let schema = SchemaModel::from_introspection(document).unwrap();

        let input = schema.get("StringFilterInput").unwrap();
        assert_eq!(input.kind, TypeKind::InputObject);
        assert_eq!(input.fields[0].name, "eq");
    }

    #[test]
    fn types_implementing_filters_system_types() {
        let schema = schema_from(vec![
            object("Query", vec![field("ok", named("SCALAR", "Boolean"))], &[]),
            interface(
                "_IContent",
                vec![],
                &["ArticlePage", "_Image", "IContent", "StandardPage"],
            ),
        ]);

        assert_eq!(
            schema.types_implementing("_IContent"),
            vec!["ArticlePage".to_string(), "StandardPage".to_string()]
        );
        assert!(schema.types_implementing("_IMissing").is_empty());
    }

    #[test]
    fn query_root_prefers_the_type_itself() {
        let schema = schema_document_with_roots(&["ArticlePage", "_IContent", "_Content"]);

        let root = schema.resolve_query_root("ArticlePage");
        assert_eq!(root.field, "ArticlePage");
        assert!(!root.wraps_type());
    }

    #[test]
    fn query_root_falls_back_to_interfaces_in_declaration_order() {
        let schema = schema_document_with_roots(&["_IPage", "_IContent"]);

        let root = schema.resolve_query_root("ArticlePage");
        assert_eq!(root.field, "_IContent");
        assert!(root.wraps_type());
    }

    #[test]
    fn query_root_falls_back_to_content_list_fields() {
        let schema = schema_document_with_roots(&["ContentList"]);

        assert_eq!(schema.resolve_query_root("ArticlePage").field, "ContentList");
    }

    #[test]
    fn query_root_last_resort_is_the_generic_root() {
        let schema = schema_document_with_roots(&[]);

        assert_eq!(
            schema.resolve_query_root("ArticlePage").field,
            GENERIC_ROOT_FIELD
        );
    }

    fn schema_document_with_roots(roots: &[&str]) -> SchemaModel {
        let root_fields = roots
            .iter()
            .map(|root| match *root {
                "ContentList" => field(root, list(named("OBJECT", "ContentItem"))),
                other => field(other, named("OBJECT", &format!("{other}Output"))),
            })
            .chain(std::iter::once(field("ok", named("SCALAR", "Boolean"))))
            .collect();

        let document = schema_document(vec![
            object("Query", root_fields, &[]),
            interface("_IContent", vec![], &["ArticlePage"]),
            object(
                "ArticlePage",
                vec![field("Heading", named("SCALAR", "String"))],
                &["_IContent", "_IPage"],
            ),
        ]);
        SchemaModel::from_introspection(document).unwrap()
    }
}
