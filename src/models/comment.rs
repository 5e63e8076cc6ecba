use serde::{Deserialize, Serialize};
use validator::Validate;

use super::user::Author;

/// A comment as embedded in a canonical post.
/// Order inside `Post::comments` is whatever the server returned.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    #[serde(default)]
    pub author: Author,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
}

/// Body of `POST /comment/:id`.
#[derive(Debug, Serialize, Validate)]
pub struct CreateCommentRequest {
    #[validate(length(
        min = 1,
        max = 1000,
        message = "Comment must be between 1 and 1000 characters"
    ))]
    pub text: String,
}

impl CreateCommentRequest {
    pub fn new(text: &str) -> Self {
        Self {
            text: text.trim().to_string(),
        }
    }
}
