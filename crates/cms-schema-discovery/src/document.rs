//! Builders for GraphQL documents on the `apollo_compiler` AST.
//!
//! Queries are assembled as AST selections and only serialized once complete.
//! Output is compact: `serialize().no_indent()` writes every selection set on one
//! line as `{ a b { c } }`.

use crate::error::DiscoveryError;
use apollo_compiler::ast::{
    Argument, Definition, DirectiveList, Document, Field, FragmentDefinition, FragmentSpread,
    InlineFragment, OperationDefinition, OperationType, Selection, Type, Value,
    VariableDefinition,
};
use apollo_compiler::parser::Parser;
use apollo_compiler::{Name, Node};

/// A name taken from the schema, checked for GraphQL name syntax
pub fn name(value: &str) -> Result<Name, DiscoveryError> {
    Name::new(value).map_err(|e| DiscoveryError::InvalidDocument(e.to_string()))
}

/// A type reference such as `[Locales]` or `String!`
pub fn parse_type(text: &str) -> Result<Type, DiscoveryError> {
    Type::parse(text, "variable.graphql")
        .map_err(|errors| DiscoveryError::InvalidDocument(errors.to_string()))
}

/// A field with no arguments or alias
pub fn field(name: Name, selection_set: Vec<Selection>) -> Field {
    Field {
        alias: None,
        name,
        arguments: Vec::new(),
        directives: DirectiveList::default(),
        selection_set,
    }
}

/// A leaf field selection
pub fn leaf(name: Name) -> Selection {
    Selection::Field(Node::new(field(name, Vec::new())))
}

/// A field selection with a sub-selection
pub fn object(name: Name, selection_set: Vec<Selection>) -> Selection {
    Selection::Field(Node::new(field(name, selection_set)))
}

/// `... on Type { selections }`
pub fn inline(type_condition: Name, selection_set: Vec<Selection>) -> Selection {
    Selection::InlineFragment(Node::new(InlineFragment {
        type_condition: Some(type_condition),
        directives: DirectiveList::default(),
        selection_set,
    }))
}

/// `...Name`
pub fn spread(fragment_name: Name) -> Selection {
    Selection::FragmentSpread(Node::new(FragmentSpread {
        fragment_name,
        directives: DirectiveList::default(),
    }))
}

pub fn argument(name: Name, value: Value) -> Node<Argument> {
    Node::new(Argument {
        name,
        value: Node::new(value),
    })
}

/// An input object built from `(field, value)` pairs
pub fn input_object(entries: impl IntoIterator<Item = (Name, Value)>) -> Value {
    Value::Object(
        entries
            .into_iter()
            .map(|(key, value)| (key, Node::new(value)))
            .collect(),
    )
}

/// Build `{a: {b: {c: value}}}` from a path of field names
pub fn nested(path: &[Name], value: Value) -> Value {
    path.iter()
        .rev()
        .fold(value, |inner, key| input_object([(key.clone(), inner)]))
}

pub fn variable_definition(name: Name, ty: Type) -> Node<VariableDefinition> {
    Node::new(VariableDefinition {
        name,
        ty: Node::new(ty),
        default_value: None,
        directives: DirectiveList::default(),
    })
}

/// A named query operation
pub fn query(
    name: Name,
    variables: Vec<Node<VariableDefinition>>,
    selection_set: Vec<Selection>,
) -> OperationDefinition {
    OperationDefinition {
        operation_type: OperationType::Query,
        name: Some(name),
        variables,
        directives: DirectiveList::default(),
        selection_set,
    }
}

pub fn fragment(
    name: Name,
    type_condition: Name,
    selection_set: Vec<Selection>,
) -> FragmentDefinition {
    FragmentDefinition {
        name,
        type_condition,
        directives: DirectiveList::default(),
        selection_set,
    }
}

/// A selection set on its own, as used in projection signatures
pub fn selection_set_text(selection_set: &[Selection]) -> String {
    let selections: Vec<String> = selection_set
        .iter()
        .map(|selection| selection.serialize().no_indent().to_string())
        .collect();
    format!("{{ {} }}", selections.join(" "))
}

/// Serialize an operation and the fragments it spreads, and check that the
/// result parses
pub fn render(
    operation: OperationDefinition,
    fragments: &[Node<FragmentDefinition>],
) -> Result<String, DiscoveryError> {
    let mut document = Document::new();
    document
        .definitions
        .push(Definition::OperationDefinition(Node::new(operation)));
    document
        .definitions
        .extend(fragments.iter().cloned().map(Definition::FragmentDefinition));

    let text = document.serialize().no_indent().to_string();
    Parser::new()
        .parse_ast(&text, "synthesized.graphql")
        .map_err(|errors| DiscoveryError::InvalidDocument(errors.to_string()))?;
    Ok(text)
}
