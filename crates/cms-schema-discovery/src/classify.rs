//! Field classification by type name.
//!
//! The lowercased base type name is matched against an ordered list of patterns and
//! the first match decides the sub-selection. Complex types that match nothing are
//! left out of projections entirely: a wrong sub-selection fails the whole query
//! on the server, a missing field does not.

use crate::document::{self, leaf, object, selection_set_text};
use crate::schema::{ContentTypeInfo, FieldDescriptor, SchemaModel, TypeKind};
use apollo_compiler::ast::Selection;
use apollo_compiler::name;
use std::collections::HashSet;

/// Scalar type names recognised without consulting the schema
const SCALAR_KEYWORDS: &[&str] = &[
    "string", "int", "float", "boolean", "bool", "id", "date", "datetime", "long", "json",
    "decimal", "any",
];

/// How a field is projected
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Underscore-prefixed, selected explicitly rather than by iteration
    Metadata,
    Scalar,
    RichText,
    ContentReference,
    ContentArea,
    Link,
    Media,
    /// A visual-builder composition tree
    Composition,
    Unsupported,
}

/// Whether references to other content are projected or left out
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReferencePolicy {
    #[default]
    Project,
    Omit,
}

/// Classifies fields and builds their sub-selections
#[derive(Debug, Clone, Default)]
pub struct FieldClassifier {
    leaf_types: HashSet<String>,
}

impl FieldClassifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// A classifier that also treats the schema's own scalars and enums as leaves
    pub fn for_schema(schema: &SchemaModel) -> Self {
        Self {
            leaf_types: schema
                .types()
                .filter(|descriptor| matches!(descriptor.kind, TypeKind::Scalar | TypeKind::Enum))
                .map(|descriptor| descriptor.name.to_lowercase())
                .collect(),
        }
    }

    pub fn classify(&self, field: &FieldDescriptor) -> FieldKind {
        if field.is_metadata() {
            return FieldKind::Metadata;
        }

        let type_name = field.base_type_name.to_lowercase();
        if type_name.contains("richtext") {
            FieldKind::RichText
        } else if type_name.contains("contentreference") {
            FieldKind::ContentReference
        } else if type_name.contains("contentarea") {
            FieldKind::ContentArea
        } else if type_name.contains("link") {
            FieldKind::Link
        } else if type_name.contains("image") || type_name.contains("media") {
            FieldKind::Media
        } else if type_name.contains("composition") {
            FieldKind::Composition
        } else if SCALAR_KEYWORDS.contains(&type_name.as_str())
            || self.leaf_types.contains(&type_name)
        {
            FieldKind::Scalar
        } else {
            FieldKind::Unsupported
        }
    }

    /// Whether a field can be selected without a sub-selection
    pub fn is_basic_field(&self, field: &FieldDescriptor) -> bool {
        self.classify(field) == FieldKind::Scalar
    }

    /// The sub-selection for a field.
    ///
    /// `None` means the field is left out, an empty list means it is a leaf.
    pub fn projection(
        &self,
        field: &FieldDescriptor,
        policy: ReferencePolicy,
    ) -> Option<Vec<Selection>> {
        match self.classify(field) {
            FieldKind::Scalar => Some(Vec::new()),
            FieldKind::RichText => Some(vec![leaf(name!("html")), leaf(name!("json"))]),
            FieldKind::ContentReference | FieldKind::ContentArea => match policy {
                ReferencePolicy::Project => Some(vec![default_url()]),
                ReferencePolicy::Omit => None,
            },
            FieldKind::Link => Some(vec![default_url(), leaf(name!("text"))]),
            FieldKind::Media => Some(vec![default_url()]),
            FieldKind::Metadata | FieldKind::Composition | FieldKind::Unsupported => None,
        }
    }

    /// The full selection for a field, if it can be projected.
    ///
    /// Fields whose names are not valid GraphQL names are never projected.
    pub fn project(&self, field: &FieldDescriptor, policy: ReferencePolicy) -> Option<Selection> {
        let selection_set = self.projection(field, policy)?;
        let name = document::name(&field.name).ok()?;
        Some(object(name, selection_set))
    }

    /// The projection string for a field
    pub fn projection_string(&self, field: &FieldDescriptor, policy: ReferencePolicy) -> String {
        match self.projection(field, policy) {
            Some(selections) if !selections.is_empty() => selection_set_text(&selections),
            _ => String::new(),
        }
    }

    /// What a field looks like in a response: its projection when it has one,
    /// otherwise its declared type
    pub fn signature(&self, field: &FieldDescriptor, policy: ReferencePolicy) -> String {
        let projection = self.projection_string(field, policy);
        if projection.is_empty() {
            field.declared_type.clone()
        } else {
            projection
        }
    }

    /// The first field holding a composition tree
    pub fn composition_field<'a>(&self, info: &'a ContentTypeInfo) -> Option<&'a FieldDescriptor> {
        info.fields
            .iter()
            .find(|field| self.classify(field) == FieldKind::Composition)
    }

    pub fn has_composition_field(&self, info: &ContentTypeInfo) -> bool {
        self.composition_field(info).is_some()
    }
}

/// `url { default }`
fn default_url() -> Selection {
    object(name!("url"), vec![leaf(name!("default"))])
}
