//! The shared fragment selecting every component type.

use crate::cache::{SchemaCache, derived_key};
use crate::classify::{FieldClassifier, ReferencePolicy};
use crate::conflicts::detect_field_conflicts;
use crate::document::{self, fragment, inline, leaf};
use crate::error::DiscoveryError;
use crate::schema::SchemaModel;
use apollo_compiler::Node;
use apollo_compiler::ast::{FragmentDefinition, Selection};
use apollo_compiler::name;
use tracing::{debug, warn};

/// The name of the component fragment spread into composition queries
pub const ALL_COMPONENTS: &str = "AllComponents";

/// Projections produced by older field rules, which the server rejects
const STALE_PATTERNS: &[&str] = &["{ url }", "{ html }", "url { hierarchical }", "contentLink {"];

/// Build `fragment AllComponents on <interface> { __typename ... on T { fields } }`.
///
/// Component types are the implementers of the interface, or the object types
/// declaring it when the interface lists none. References are left out, fields
/// that conflict across components are dropped everywhere, and types left with
/// no fields are skipped.
pub fn build_all_components(
    schema: &SchemaModel,
    classifier: &FieldClassifier,
    component_interface: &str,
) -> Result<FragmentDefinition, DiscoveryError> {
    let mut component_types = schema.types_implementing(component_interface);
    if component_types.is_empty() {
        component_types = schema.objects_declaring(component_interface);
    }

    let conflicts = detect_field_conflicts(
        schema,
        classifier,
        ReferencePolicy::Omit,
        &component_types,
    );

    let mut selections = vec![leaf(name!("__typename"))];
    for type_name in &component_types {
        let Some(descriptor) = schema.object(type_name) else {
            continue;
        };
        let fields: Vec<Selection> = descriptor
            .fields
            .iter()
            .filter(|field| !field.is_metadata() && !conflicts.contains(&field.name))
            .filter_map(|field| classifier.project(field, ReferencePolicy::Omit))
            .collect();

        if fields.is_empty() {
            debug!(component = %type_name, "No projectable fields; skipping component");
            continue;
        }
        selections.push(inline(document::name(type_name)?, fields));
    }

    debug!(
        interface = component_interface,
        components = selections.len() - 1,
        conflicts = conflicts.len(),
        "Generated {ALL_COMPONENTS} fragment"
    );
    Ok(fragment(
        document::name(ALL_COMPONENTS)?,
        document::name(component_interface)?,
        selections,
    ))
}

/// Whether a fragment carries a projection the server no longer accepts
pub fn is_stale(fragment: &FragmentDefinition) -> bool {
    let text = fragment.serialize().no_indent().to_string();
    STALE_PATTERNS.iter().any(|pattern| text.contains(pattern))
}

/// Get the component fragment for an interface from the cache, regenerating it
/// when missing or stale.
///
/// Entries are keyed by the schema they were built from, so a fragment built
/// while the schema is being refetched is never served for the new one.
pub fn all_components(
    cache: &SchemaCache,
    schema: &SchemaModel,
    classifier: &FieldClassifier,
    component_interface: &str,
) -> Result<Node<FragmentDefinition>, DiscoveryError> {
    let key = derived_key(schema, &format!("{ALL_COMPONENTS}:{component_interface}"));
    if let Some(fragment) = cache.fragments().get(&key) {
        if !is_stale(&fragment) {
            return Ok(fragment);
        }
        warn!(fragment = %key, "Cached fragment has stale projections; regenerating");
        cache.fragments().remove(&key);
    }

    let fragment = Node::new(build_all_components(
        schema,
        classifier,
        component_interface,
    )?);
    cache.fragments().set(&key, fragment.clone(), cache.ttl());
    Ok(fragment)
}
