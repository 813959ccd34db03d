//! Assembling GraphQL documents from the discovered schema.

use crate::budget::select_fields;
use crate::cache::SchemaCache;
use crate::classify::{FieldClassifier, ReferencePolicy};
use crate::composition::{CompositionShape, DEFAULT_COMPOSITION_DEPTH};
use crate::document::{
    self, argument, field, inline, input_object, leaf, nested, object, parse_type, query, render,
    variable_definition,
};
use crate::error::DiscoveryError;
use crate::fragments::all_components;
use crate::schema::{ContentTypeInfo, SchemaModel};
use apollo_compiler::ast::{FragmentDefinition, Selection, Type, Value, VariableDefinition};
use apollo_compiler::{Name, Node, name};
use serde::Serialize;
use serde_json::{Map, json};
use std::sync::Arc;

/// The default number of fields selected for a content type
pub const DEFAULT_MAX_FIELDS: usize = 50;

/// Locale variable type used when the root field cannot be inspected
fn fallback_locale_type() -> Type {
    Type::Named(name!("Locales")).list()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SynthesisOptions {
    /// Field budget per content type, metadata included
    pub max_fields: usize,
    /// Levels of nested composition nodes to select
    pub composition_depth: usize,
}

impl Default for SynthesisOptions {
    fn default() -> Self {
        Self {
            max_fields: DEFAULT_MAX_FIELDS,
            composition_depth: DEFAULT_COMPOSITION_DEPTH,
        }
    }
}

/// A rendered document ready to send
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SynthesizedQuery {
    pub operation_name: String,
    pub document: String,
    pub variables: serde_json::Value,
    /// The root field holding the result in the response data
    pub root_field: String,
}

/// How a single item is located
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemLookup {
    Key(String),
    Path(String),
}

/// A full-text search
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchParams {
    pub text: String,
    /// Restrict results to these content types
    pub content_types: Vec<String>,
    pub limit: usize,
    pub skip: usize,
    pub locale: Option<String>,
    /// Select relevance scores and order by them
    pub include_score: bool,
}

impl SearchParams {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            content_types: Vec::new(),
            limit: 10,
            skip: 0,
            locale: None,
            include_score: false,
        }
    }
}

/// An item query with the names of the fields it selects
#[derive(Debug, Clone, PartialEq)]
pub struct ItemQuery {
    pub query: SynthesizedQuery,
    pub discovered_fields: Vec<String>,
}

/// Builds search and item documents against one schema
pub struct QuerySynthesizer {
    schema: Arc<SchemaModel>,
    cache: SchemaCache,
    options: SynthesisOptions,
}

impl QuerySynthesizer {
    pub fn new(schema: Arc<SchemaModel>, cache: SchemaCache, options: SynthesisOptions) -> Self {
        Self {
            schema,
            cache,
            options,
        }
    }

    pub fn classifier(&self) -> &FieldClassifier {
        self.schema.classifier()
    }

    /// The derived view of a content type in this synthesizer's schema
    pub fn content_type(&self, name: &str) -> Option<Arc<ContentTypeInfo>> {
        self.cache.content_type(&self.schema, name)
    }

    /// A full-text search across content, with facets
    pub fn search_query(&self, params: &SearchParams) -> Result<SynthesizedQuery, DiscoveryError> {
        let root = self.schema.generic_content_root();
        let mut variables = Variables::default();

        let mut filter = vec![(
            name!("_fulltext"),
            input_object([(
                name!("match"),
                variables.add(
                    name!("searchText"),
                    Type::Named(name!("String")).non_null(),
                    json!(params.text),
                ),
            )]),
        )];
        if !params.content_types.is_empty() {
            filter.push((
                name!("_metadata"),
                nested(
                    &[name!("types"), name!("in")],
                    variables.add(
                        name!("contentTypes"),
                        Type::Named(name!("String")).list(),
                        json!(params.content_types),
                    ),
                ),
            ));
        }

        let mut content = field(document::name(&root)?, Vec::new());
        content.arguments = vec![
            argument(name!("where"), input_object(filter)),
            argument(
                name!("limit"),
                variables.add(name!("limit"), Type::Named(name!("Int")), json!(params.limit)),
            ),
            argument(
                name!("skip"),
                variables.add(name!("skip"), Type::Named(name!("Int")), json!(params.skip)),
            ),
        ];
        if let Some(locale) = self.locale(&root, params.locale.as_deref(), &mut variables)? {
            content.arguments.push(argument(name!("locale"), locale));
        }

        let mut items = Vec::new();
        if params.include_score {
            content.arguments.push(argument(
                name!("orderBy"),
                input_object([(name!("_ranking"), Value::Enum(name!("RELEVANCE")))]),
            ));
            items.push(leaf(name!("_score")));
        }
        items.push(metadata_block(false));

        content.selection_set = vec![
            leaf(name!("total")),
            object(name!("items"), items),
            facets(),
        ];

        variables.finish(
            name!("SearchContent"),
            root,
            Selection::Field(Node::new(content)),
            None,
        )
    }

    /// Fetch one item by key or URL path.
    ///
    /// Without a content type only the metadata block is selected, through the
    /// generic root. With one, its budgeted fields are added, wrapped in an inline
    /// fragment when the root field serves more than that type, and a composition
    /// field brings in the component fragment.
    pub fn item_query(
        &self,
        lookup: &ItemLookup,
        content_type: Option<&ContentTypeInfo>,
        locale: Option<&str>,
    ) -> Result<ItemQuery, DiscoveryError> {
        let mut variables = Variables::default();
        let required_string = || Type::Named(name!("String")).non_null();
        let (by, filter) = match lookup {
            ItemLookup::Key(key) => (
                "ByKey",
                nested(
                    &[name!("_metadata"), name!("key"), name!("eq")],
                    variables.add(name!("key"), required_string(), json!(key)),
                ),
            ),
            ItemLookup::Path(path) => (
                "ByPath",
                nested(
                    &[name!("_metadata"), name!("url"), name!("default"), name!("eq")],
                    variables.add(name!("path"), required_string(), json!(path)),
                ),
            ),
        };

        let mut items = vec![metadata_block(true)];
        let mut discovered_fields = vec!["_metadata".to_string()];
        let mut fragment = None;

        let root = match content_type {
            None => self.schema.generic_content_root(),
            Some(info) => {
                let classifier = self.classifier();
                let root = self.schema.resolve_query_root(&info.name);
                let selected = select_fields(info, classifier, self.options.max_fields);

                let mut fields: Vec<Selection> = selected
                    .fields
                    .iter()
                    .filter_map(|name| info.field(name))
                    .filter_map(|field| classifier.project(field, ReferencePolicy::Project))
                    .collect();
                discovered_fields.extend(selected.fields);

                if let Some(composition) = classifier.composition_field(info) {
                    let shape = CompositionShape::discover(&self.schema, composition);
                    fields.push(
                        shape.selection(&composition.name, self.options.composition_depth)?,
                    );
                    discovered_fields.push(composition.name.clone());
                    if self.options.composition_depth > 0 {
                        fragment = Some(all_components(
                            &self.cache,
                            &self.schema,
                            classifier,
                            &shape.component_interface,
                        )?);
                    }
                }

                if !root.wraps_type() {
                    items.extend(fields);
                } else if !fields.is_empty() {
                    items.push(inline(document::name(&info.name)?, fields));
                }
                root.field
            }
        };

        let mut content = field(document::name(&root)?, vec![object(name!("items"), items)]);
        content.arguments.push(argument(name!("where"), filter));
        if let Some(locale) = self.locale(&root, locale, &mut variables)? {
            content.arguments.push(argument(name!("locale"), locale));
        }
        content
            .arguments
            .push(argument(name!("limit"), Value::from(1)));

        let operation = if fragment.is_some() {
            format!("GetComposition{by}")
        } else {
            format!("GetContent{by}")
        };
        Ok(ItemQuery {
            query: variables.finish(
                document::name(&operation)?,
                root,
                Selection::Field(Node::new(content)),
                fragment,
            )?,
            discovered_fields,
        })
    }

    /// Declare `$locale` with the type the root field expects.
    ///
    /// Roots without a `locale` argument get no locale.
    fn locale(
        &self,
        root: &str,
        locale: Option<&str>,
        variables: &mut Variables,
    ) -> Result<Option<Value>, DiscoveryError> {
        let Some(locale) = locale else {
            return Ok(None);
        };
        let ty = match self.schema.root_field(root) {
            Some(field) => match field.arg("locale") {
                Some(arg) => parse_type(&arg.declared_type)?,
                None => return Ok(None),
            },
            None => fallback_locale_type(),
        };
        let value = if matches!(ty, Type::List(_) | Type::NonNullList(_)) {
            json!([locale])
        } else {
            json!(locale)
        };
        Ok(Some(variables.add(name!("locale"), ty, value)))
    }
}

/// Variable definitions and their values, collected while building a document
#[derive(Default)]
struct Variables {
    definitions: Vec<Node<VariableDefinition>>,
    values: Map<String, serde_json::Value>,
}

impl Variables {
    /// Declare a variable and return a reference to it
    fn add(&mut self, name: Name, ty: Type, value: serde_json::Value) -> Value {
        self.values.insert(name.to_string(), value);
        self.definitions.push(variable_definition(name.clone(), ty));
        Value::Variable(name)
    }

    fn finish(
        self,
        operation_name: Name,
        root_field: String,
        selection: Selection,
        fragment: Option<Node<FragmentDefinition>>,
    ) -> Result<SynthesizedQuery, DiscoveryError> {
        let document = render(
            query(operation_name.clone(), self.definitions, vec![selection]),
            fragment.as_slice(),
        )?;

        Ok(SynthesizedQuery {
            operation_name: operation_name.to_string(),
            document,
            variables: serde_json::Value::Object(self.values),
            root_field,
        })
    }
}

/// The `_metadata` block; item lookups also select locale and version
fn metadata_block(extended: bool) -> Selection {
    let mut fields = vec![
        leaf(name!("key")),
        leaf(name!("displayName")),
        leaf(name!("types")),
        object(name!("url"), vec![leaf(name!("default"))]),
        leaf(name!("published")),
        leaf(name!("lastModified")),
        leaf(name!("status")),
    ];
    if extended {
        fields.push(leaf(name!("locale")));
        fields.push(leaf(name!("version")));
    }
    object(name!("_metadata"), fields)
}

/// Result counts by content type and locale
fn facets() -> Selection {
    let counts = || vec![leaf(name!("name")), leaf(name!("count"))];
    object(
        name!("facets"),
        vec![object(
            name!("_metadata"),
            vec![
                object(name!("types"), counts()),
                object(name!("locale"), counts()),
            ],
        )],
    )
}
