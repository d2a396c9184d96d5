//! Model catalog entries shown in the front-end's model picker.

use serde::{Deserialize, Serialize};

/// One selectable model: a display label and the id sent upstream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelOption {
    pub label: String,
    pub value: String,
}

impl ModelOption {
    pub fn new(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
        }
    }
}
