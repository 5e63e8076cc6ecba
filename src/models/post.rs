use std::collections::BTreeSet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::{comment::Comment, user::Author};
use crate::error::AppError;

/// Canonical post as returned by the bulletin backend.
/// The client never patches fields of a `Post`; it only replaces whole values.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    #[serde(alias = "_id")]
    pub id: String,
    #[serde(default)]
    pub author: Author,
    #[serde(rename = "type", default)]
    pub kind: PostKind,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub body: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default)]
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
    #[serde(default)]
    pub pinned: bool,

    /// User ids that liked the post. A set, so an id appears at most once.
    #[serde(default)]
    pub likes: BTreeSet<String>,
    #[serde(default)]
    pub comments: Vec<Comment>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event: Option<EventInfo>,
}

impl Post {
    pub fn is_event(&self) -> bool {
        self.kind == PostKind::Event || self.event.is_some()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PostKind {
    #[default]
    Post,
    Event,
}

impl PostKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            PostKind::Post => "post",
            PostKind::Event => "event",
        }
    }
}

/// Event block. Dates are kept as the raw wire strings (either `YYYY-MM-DD`
/// or a full timestamp) and parsed where they are used.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

/// Active feed query sent to `GET /posts`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeedQuery {
    pub text: String,
    pub category: String,
    pub selected_day: Option<NaiveDate>,
    /// Opaque server cursor; empty means "first page".
    pub cursor: String,
}

impl FeedQuery {
    /// Query pairs in the order the backend documents them.
    pub fn to_pairs(&self, limit: u32) -> Vec<(&'static str, String)> {
        vec![
            ("q", self.text.clone()),
            ("category", self.category.clone()),
            (
                "on",
                self.selected_day
                    .map(|d| d.format("%Y-%m-%d").to_string())
                    .unwrap_or_default(),
            ),
            ("cursor", self.cursor.clone()),
            ("limit", limit.to_string()),
        ]
    }
}

/// One page of `GET /posts`. An empty `next_cursor` means there are no more pages.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedPage {
    #[serde(default)]
    pub items: Vec<Post>,
    #[serde(default)]
    pub next_cursor: String,
}

/// `{items: Post[]}` envelope used by `/calendar` and `/events`.
#[derive(Debug, Deserialize)]
pub struct ItemsResponse {
    #[serde(default)]
    pub items: Vec<Post>,
}

/// `{item: Post}` envelope returned by every mutation.
#[derive(Debug, Deserialize)]
pub struct ItemResponse {
    pub item: Post,
}

/// Body of `POST /pin/:id`.
#[derive(Debug, Serialize)]
pub struct PinRequest {
    pub pinned: bool,
}

/// Uploaded image attached to a new post.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

/// Form data for `POST /posts`.
#[derive(Debug, Clone, Default, Validate)]
pub struct PostDraft {
    pub kind: PostKind,

    #[validate(length(max = 50, message = "Category must be at most 50 characters"))]
    pub category: String,

    #[validate(length(
        min = 1,
        max = 200,
        message = "Title length must be between 1 and 200 chars"
    ))]
    pub title: String,

    #[validate(length(max = 10000, message = "Body must be at most 10000 chars"))]
    pub body: String,

    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,

    #[validate(length(max = 200, message = "Location must be at most 200 chars"))]
    pub location: Option<String>,

    #[validate(url(message = "Image URL is not a valid URL"))]
    pub image_url: Option<String>,

    pub file: Option<Attachment>,
}

impl PostDraft {
    /// Field validation plus the event rules the derive cannot express.
    pub fn check(&self) -> Result<(), AppError> {
        self.validate()?;

        if self.title.trim().is_empty() {
            return Err(AppError::Validation("Title must not be blank".to_string()));
        }

        match (self.kind, self.start_date, self.end_date) {
            (PostKind::Event, None, _) => Err(AppError::Validation(
                "Events need a start date".to_string(),
            )),
            (_, Some(start), Some(end)) if end < start => Err(AppError::Validation(
                "End date must not be before start date".to_string(),
            )),
            (PostKind::Post, Some(_), _) | (PostKind::Post, _, Some(_)) => Err(
                AppError::Validation("Only events carry dates".to_string()),
            ),
            _ => Ok(()),
        }
    }

    /// Text fields of the multipart form, empty optionals omitted.
    pub fn text_fields(&self) -> Vec<(&'static str, String)> {
        let mut fields = vec![
            ("type", self.kind.as_str().to_string()),
            ("category", self.category.clone()),
            ("title", self.title.trim().to_string()),
            ("body", self.body.clone()),
        ];
        if let Some(start) = self.start_date {
            fields.push(("startDate", start.format("%Y-%m-%d").to_string()));
        }
        if let Some(end) = self.end_date {
            fields.push(("endDate", end.format("%Y-%m-%d").to_string()));
        }
        if let Some(location) = self.location.as_ref().filter(|l| !l.trim().is_empty()) {
            fields.push(("location", location.trim().to_string()));
        }
        if let Some(url) = self.image_url.as_ref().filter(|u| !u.is_empty()) {
            fields.push(("imageUrl", url.clone()));
        }
        fields
    }
}
