// src/api/mod.rs

//! REST seam of the bulletin backend.
//!
//! Everything above this module talks to a `dyn BulletinApi`, so the feed and
//! calendar logic can be driven by the real HTTP client or by a scripted fake.

pub mod http;

#[cfg(test)]
pub(crate) mod fake;

use async_trait::async_trait;

use crate::{
    calendar::CalendarMonth,
    error::AppError,
    models::post::{FeedPage, FeedQuery, Post, PostDraft},
};

pub use http::HttpApi;

#[async_trait]
pub trait BulletinApi: Send + Sync {
    /// `GET /posts?q=&category=&on=&cursor=&limit=`
    async fn list_posts(&self, query: &FeedQuery, limit: u32) -> Result<FeedPage, AppError>;

    /// `GET /calendar?year=&month=`. Items are month-scoped but not clamped.
    async fn calendar(&self, month: CalendarMonth) -> Result<Vec<Post>, AppError>;

    /// `GET /events?limit=`
    async fn upcoming_events(&self, limit: u32) -> Result<Vec<Post>, AppError>;

    /// `POST /posts` (multipart)
    async fn publish(&self, draft: &PostDraft) -> Result<Post, AppError>;

    /// `POST /like/:id`. The server decides whether this adds or removes the like.
    async fn like(&self, post_id: &str) -> Result<Post, AppError>;

    /// `POST /comment/:id`
    async fn comment(&self, post_id: &str, text: &str) -> Result<Post, AppError>;

    /// `POST /pin/:id`
    async fn pin(&self, post_id: &str, pinned: bool) -> Result<Post, AppError>;

    /// `DELETE /posts/:id`
    async fn delete(&self, post_id: &str) -> Result<(), AppError>;
}
