//! Reconciliation: query preprocessing, search request construction and
//! the match decision.

mod clauses;
mod matcher;
mod preprocess;
mod query;
pub mod syntax;

pub use clauses::{join_clauses, property_clauses, PropertyShape, LITERAL_FIELDS};
pub use matcher::{is_confident_match, Reconciler, MATCH_MARGIN, MATCH_THRESHOLD};
pub use preprocess::{is_gnd_id, preprocess};
pub use query::{boosted_fields, QueryBuilder, AUX_QUERY_BOOST};
pub use syntax::SyntaxError;
