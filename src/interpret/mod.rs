//! Natural-language query interpretation.
//!
//! [`Vocabulary`] is built once from the catalog. [`rules::interpret`] turns
//! query text into a [`FilterSet`] deterministically, and
//! [`QueryInterpreter`] decides whether a learned extractor gets the first
//! attempt.

pub mod colors;
pub mod filters;
pub mod fuzzy;
pub mod policy;
pub mod rules;
pub mod vocabulary;

pub use filters::{FilterSet, Gender};
pub use policy::{ExtractError, FilterExtractor, FilterSource, Interpretation, QueryInterpreter};
pub use vocabulary::Vocabulary;
