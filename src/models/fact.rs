use serde::{Deserialize, Serialize};

/// A single cat fact.
///
/// Facts are immutable once fetched. The fact endpoint answers with
/// `{"fact": "...", "length": 30}`; only `fact` is required.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fact {
    #[serde(rename = "fact")]
    pub text: String,
    /// Character count as reported by the endpoint.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub length: Option<u32>,
}

impl Fact {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            length: None,
        }
    }
}
