//! Core traits for gnd backends.

mod search_index;

pub use search_index::*;
