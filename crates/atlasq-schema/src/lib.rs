//! Schema trees and fuzzy field path resolution for atlasq.
//!
//! A [`SchemaNode`] tree describes the fields of one record type. The
//! [`Resolver`] maps loosely written dotted paths (`categorie`, `id`,
//! `supplier.city`) onto nodes of that tree and reports whether the node
//! sits directly under a list, which decides whether search clauses on it
//! need an embedded-document wrapper.
//!
//! Resolution never fails: an unmatched path yields a synthetic node with
//! `exists == false`, so callers can still build a clause against it.

#![warn(missing_docs)]

mod error;
mod node;
mod resolve;
mod similarity;

pub use error::SchemaError;
pub use node::{CUSTOM_TYPE, SchemaNode};
pub use resolve::{Candidate, MatchTier, ResolvedField, Resolver, Thresholds};
pub use similarity::{levenshtein, similarity};
