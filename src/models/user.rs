// src/models/user.rs

use serde::{Deserialize, Serialize};

/// Author block embedded in posts and comments.
/// The backend only exposes a display name here.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Author {
    #[serde(default)]
    pub name: String,
}

impl Author {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    /// Name to render, falling back for anonymous or deleted accounts.
    pub fn display_name(&self) -> &str {
        let trimmed = self.name.trim();
        if trimmed.is_empty() { "Anonymous" } else { trimmed }
    }
}
