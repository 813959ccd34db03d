//! Library for discovering a headless CMS's GraphQL schema and synthesizing queries against it.
//!
//! Nothing about the content model is hardcoded. The schema is introspected once per cache
//! lifetime and every query is derived from it:
//!
//! * Fields are classified by type name and given a sub-selection the server accepts, or left out
//! * Content types reachable only through an interface are selected with an inline fragment
//! * Component types are gathered into one shared fragment, minus fields whose shape differs
//!   between components
//! * Composition trees are selected recursively to a fixed depth
//!
//! Documents are built on the `apollo_compiler` AST, serialized on one line, then checked with a
//! GraphQL parser before they are sent.
//!
//! Content is located from loose identifiers (URL paths, keys, search terms) by trying lookup
//! strategies in order until one finds an item.

pub mod budget;
pub mod cache;
pub mod classify;
pub mod composition;
pub mod conflicts;
pub mod document;
pub mod error;
pub mod fragments;
pub mod introspection;
pub mod introspector;
pub mod resolve;
pub mod schema;
pub mod service;
pub mod synthesize;
pub mod transport;

#[cfg(test)]
mod test_support;
