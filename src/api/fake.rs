//! Scripted in-memory `BulletinApi` for unit tests.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use super::BulletinApi;
use crate::{
    calendar::CalendarMonth,
    error::AppError,
    models::post::{FeedPage, FeedQuery, Post, PostDraft},
};

/// Each call pops the next scripted response of its kind and records itself.
#[derive(Default)]
pub(crate) struct ScriptedApi {
    pages: Mutex<VecDeque<Result<FeedPage, AppError>>>,
    items: Mutex<VecDeque<Result<Post, AppError>>>,
    lists: Mutex<VecDeque<Result<Vec<Post>, AppError>>>,
    deletes: Mutex<VecDeque<Result<(), AppError>>>,
    calls: Mutex<Vec<String>>,
}

impl ScriptedApi {
    pub(crate) fn push_page(&self, page: Result<FeedPage, AppError>) -> &Self {
        self.pages.lock().unwrap().push_back(page);
        self
    }

    pub(crate) fn push_item(&self, item: Result<Post, AppError>) -> &Self {
        self.items.lock().unwrap().push_back(item);
        self
    }

    pub(crate) fn push_list(&self, list: Result<Vec<Post>, AppError>) -> &Self {
        self.lists.lock().unwrap().push_back(list);
        self
    }

    pub(crate) fn push_delete(&self, result: Result<(), AppError>) -> &Self {
        self.deletes.lock().unwrap().push_back(result);
        self
    }

    pub(crate) fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }

    fn next<T>(queue: &Mutex<VecDeque<Result<T, AppError>>>) -> Result<T, AppError> {
        queue
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(AppError::Network("no scripted response".to_string())))
    }
}

#[async_trait]
impl BulletinApi for ScriptedApi {
    async fn list_posts(&self, query: &FeedQuery, limit: u32) -> Result<FeedPage, AppError> {
        self.record(format!(
            "GET /posts q={} category={} cursor={} limit={}",
            query.text, query.category, query.cursor, limit
        ));
        Self::next(&self.pages)
    }

    async fn calendar(&self, month: CalendarMonth) -> Result<Vec<Post>, AppError> {
        self.record(format!(
            "GET /calendar year={} month={}",
            month.year(),
            month.wire_month()
        ));
        Self::next(&self.lists)
    }

    async fn upcoming_events(&self, limit: u32) -> Result<Vec<Post>, AppError> {
        self.record(format!("GET /events limit={}", limit));
        Self::next(&self.lists)
    }

    async fn publish(&self, draft: &PostDraft) -> Result<Post, AppError> {
        self.record(format!("POST /posts title={}", draft.title));
        Self::next(&self.items)
    }

    async fn like(&self, post_id: &str) -> Result<Post, AppError> {
        self.record(format!("POST /like/{}", post_id));
        Self::next(&self.items)
    }

    async fn comment(&self, post_id: &str, text: &str) -> Result<Post, AppError> {
        self.record(format!("POST /comment/{} text={}", post_id, text));
        Self::next(&self.items)
    }

    async fn pin(&self, post_id: &str, pinned: bool) -> Result<Post, AppError> {
        self.record(format!("POST /pin/{} pinned={}", post_id, pinned));
        Self::next(&self.items)
    }

    async fn delete(&self, post_id: &str) -> Result<(), AppError> {
        self.record(format!("DELETE /posts/{}", post_id));
        Self::next(&self.deletes)
    }
}

/// Minimal post for tests.
pub(crate) fn post(id: &str) -> Post {
    Post {
        id: id.to_string(),
        title: format!("Post {}", id),
        ..Default::default()
    }
}

pub(crate) fn page(ids: &[&str], next_cursor: &str) -> FeedPage {
    FeedPage {
        items: ids.iter().map(|id| post(id)).collect(),
        next_cursor: next_cursor.to_string(),
    }
}
