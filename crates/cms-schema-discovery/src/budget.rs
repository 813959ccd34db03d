//! Choosing which fields of a content type fit in a query.

use crate::classify::{FieldClassifier, ReferencePolicy};
use crate::schema::ContentTypeInfo;
use std::collections::HashSet;

/// Share of the slots left after metadata that goes to searchable fields, in percent
const SEARCHABLE_SHARE_PERCENT: usize = 70;

/// The fields picked for a query
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldSelection {
    /// Metadata fields, served by the explicit metadata block
    pub metadata: Vec<String>,
    /// Non-metadata fields, in declaration order
    pub fields: Vec<String>,
}

impl FieldSelection {
    pub fn len(&self) -> usize {
        self.metadata.len() + self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Select at most `budget` fields.
///
/// Metadata fields come first. Of the remaining slots, 70% (rounded down) go to
/// searchable fields and the rest to other projectable fields; slots the other
/// fields leave unused are given back to searchable ones.
pub fn select_fields(
    info: &ContentTypeInfo,
    classifier: &FieldClassifier,
    budget: usize,
) -> FieldSelection {
    let metadata: Vec<String> = info.metadata_fields.iter().take(budget).cloned().collect();
    let remaining = budget - metadata.len();

    let (searchable, other): (Vec<&str>, Vec<&str>) = info
        .fields
        .iter()
        .filter(|field| !field.is_metadata())
        .filter(|field| {
            classifier
                .projection(field, ReferencePolicy::Project)
                .is_some()
        })
        .map(|field| field.name.as_str())
        .partition(|name| info.is_searchable(name));

    let searchable_share = remaining * SEARCHABLE_SHARE_PERCENT / 100;
    let mut chosen: HashSet<&str> = searchable.iter().take(searchable_share).copied().collect();
    let searchable_taken = chosen.len();

    chosen.extend(other.iter().take(remaining - searchable_taken).copied());
    let top_up = remaining - chosen.len();
    chosen.extend(searchable.iter().skip(searchable_taken).take(top_up).copied());

    FieldSelection {
        metadata,
        fields: info
            .fields
            .iter()
            .filter(|field| chosen.contains(field.name.as_str()))
            .map(|field| field.name.clone())
            .collect(),
    }
}
