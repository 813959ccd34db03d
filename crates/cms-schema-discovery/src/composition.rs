//! Selections for visual-builder composition trees.
//!
//! A composition is a tree of structure nodes (grids, rows, columns) whose leaves
//! are component nodes wrapping a component instance. Each nesting level selects
//! `nodes` under a descriptive alias.

use crate::document::{self, field, inline, leaf, object, spread};
use crate::error::DiscoveryError;
use crate::fragments::ALL_COMPONENTS;
use crate::schema::{FieldDescriptor, SchemaModel, TypeKind};
use apollo_compiler::Node;
use apollo_compiler::ast::Selection;
use apollo_compiler::name;

pub const STRUCTURE_NODE_FALLBACK: &str = "CompositionStructureNode";
pub const COMPONENT_NODE_FALLBACK: &str = "CompositionComponentNode";
pub const COMPONENT_INTERFACE_FALLBACK: &str = "_IComponent";

/// How deep composition trees are followed by default
pub const DEFAULT_COMPOSITION_DEPTH: usize = 4;

/// Response keys for the `nodes` field at each nesting level
const LEVEL_ALIASES: &[&str] = &["grids", "rows", "columns", "elements"];

/// The node types making up a composition tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompositionShape {
    pub structure_node: String,
    pub component_node: String,
    pub component_interface: String,
}

impl Default for CompositionShape {
    fn default() -> Self {
        Self {
            structure_node: STRUCTURE_NODE_FALLBACK.into(),
            component_node: COMPONENT_NODE_FALLBACK.into(),
            component_interface: COMPONENT_INTERFACE_FALLBACK.into(),
        }
    }
}

impl CompositionShape {
    /// Discover the node types behind a composition field.
    ///
    /// The structure node is the field's own type, the component node is the
    /// `nodes` implementer with a `component` field, and the component interface is
    /// that field's type. Anything not found falls back to the usual names.
    pub fn discover(schema: &SchemaModel, composition_field: &FieldDescriptor) -> Self {
        let fallback = Self::default();

        let structure_node = schema
            .object(&composition_field.base_type_name)
            .map(|descriptor| descriptor.name.clone())
            .unwrap_or(fallback.structure_node);

        let node_types = schema
            .object(&structure_node)
            .and_then(|descriptor| descriptor.field("nodes"))
            .and_then(|nodes| schema.get(&nodes.base_type_name))
            .map(|node| match node.kind {
                TypeKind::Interface | TypeKind::Union => node.possible_types.clone(),
                _ => vec![node.name.clone()],
            })
            .unwrap_or_default();

        let component = node_types.iter().find_map(|name| {
            schema
                .object(name)
                .and_then(|descriptor| descriptor.field("component"))
                .map(|field| (name.clone(), field.base_type_name.clone()))
        });

        match component {
            Some((component_node, component_interface)) => Self {
                structure_node,
                component_node,
                component_interface,
            },
            None => Self {
                structure_node,
                ..fallback
            },
        }
    }

    /// Select a composition field, following nested nodes down to `depth` levels
    pub fn selection(&self, field_name: &str, depth: usize) -> Result<Selection, DiscoveryError> {
        let mut selections = node_fields();
        selections.push(leaf(name!("layoutType")));
        if depth > 0 {
            selections.push(self.nodes(0, depth)?);
        }
        Ok(object(document::name(field_name)?, selections))
    }

    /// `<alias>: nodes { ... }` at a nesting level
    fn nodes(&self, level: usize, depth: usize) -> Result<Selection, DiscoveryError> {
        let mut children = node_fields();
        children.push(inline(
            document::name(&self.component_node)?,
            vec![object(
                name!("component"),
                vec![spread(document::name(ALL_COMPONENTS)?)],
            )],
        ));

        let mut structure = vec![leaf(name!("layoutType"))];
        if level + 1 < depth {
            structure.push(self.nodes(level + 1, depth)?);
        }
        children.push(inline(document::name(&self.structure_node)?, structure));

        let mut nodes = field(name!("nodes"), children);
        if let Some(alias) = LEVEL_ALIASES.get(level) {
            nodes.alias = Some(document::name(alias)?);
        }
        Ok(Selection::Field(Node::new(nodes)))
    }
}

fn node_fields() -> Vec<Selection> {
    vec![
        leaf(name!("__typename")),
        leaf(name!("key")),
        leaf(name!("displayName")),
        leaf(name!("nodeType")),
    ]
}
