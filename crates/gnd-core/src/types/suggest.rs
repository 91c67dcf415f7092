//! Suggest and preview protocol types.

use serde::{Deserialize, Serialize};

/// One suggestion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuggestItem {
    pub id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SuggestResponse {
    pub result: Vec<SuggestItem>,
}

/// HTML preview of an entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Flyout {
    pub id: String,
    pub html: String,
}
