//! Detection of fields that cannot be merged across component fragments.
//!
//! Inline fragments spread into the same selection set must agree on the shape of
//! every same-named field. A field that two component types project differently is
//! reported here and dropped from every component's fragment.

use crate::classify::{FieldClassifier, ReferencePolicy};
use crate::schema::SchemaModel;
use std::collections::{BTreeMap, BTreeSet};
use tracing::warn;

/// Field names that appear in two or more types with differing signatures
pub type ConflictSet = BTreeSet<String>;

/// Find conflicting field names across a set of component types.
///
/// Types missing from the schema are skipped. Fields that would not be projected
/// under `policy` cannot conflict.
pub fn detect_field_conflicts(
    schema: &SchemaModel,
    classifier: &FieldClassifier,
    policy: ReferencePolicy,
    component_types: &[String],
) -> ConflictSet {
    let mut signatures: BTreeMap<&str, BTreeMap<&str, String>> = BTreeMap::new();

    for type_name in component_types {
        let Some(descriptor) = schema.get(type_name) else {
            continue;
        };
        for field in &descriptor.fields {
            if field.is_metadata() || classifier.projection(field, policy).is_none() {
                continue;
            }
            signatures
                .entry(field.name.as_str())
                .or_default()
                .insert(descriptor.name.as_str(), classifier.signature(field, policy));
        }
    }

    signatures
        .into_iter()
        .filter_map(|(field_name, by_type)| {
            let distinct: BTreeSet<&String> = by_type.values().collect();
            if distinct.len() > 1 {
                warn!(
                    field = field_name,
                    signatures = ?by_type,
                    "Conflicting field signatures across component types; field will be omitted"
                );
                Some(field_name.to_string())
            } else {
                None
            }
        })
        .collect()
}
