// src/board.rs

use std::sync::Arc;

use chrono::NaiveDate;
use tracing::{info, warn};

use crate::{
    api::BulletinApi,
    calendar::{CalendarMonth, CalendarView, MonthGrid},
    config::Config,
    error::AppError,
    feed::{FeedPaginator, FilterState, LoadOutcome, Mutation, MutationOutcome, apply_mutation},
    models::post::{Post, PostDraft},
    view::{PostView, project_all},
};

/// Transient, dismissible error notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub action: &'static str,
    pub message: String,
}

/// Community bulletin view: the single owner of the feed, its filter, the
/// calendar month and the upcoming-events list.
///
/// Every user action enters here and every failure stops here: it is logged,
/// stored as a [`Notice`] and the action returns `None`/`false`. Nothing is
/// retried automatically.
pub struct Board {
    api: Arc<dyn BulletinApi>,
    viewer_id: Option<String>,
    upcoming_limit: u32,
    filter: FilterState,
    feed: FeedPaginator,
    calendar: CalendarView,
    upcoming: Vec<Post>,
    notice: Option<Notice>,
}

impl Board {
    pub fn new(api: Arc<dyn BulletinApi>, config: &Config, month: CalendarMonth) -> Self {
        Self {
            api,
            viewer_id: config.viewer_id.clone(),
            upcoming_limit: config.upcoming_limit,
            filter: FilterState::new(),
            feed: FeedPaginator::new(config.page_size),
            calendar: CalendarView::new(month),
            upcoming: Vec::new(),
            notice: None,
        }
    }

    pub fn filter(&self) -> &FilterState {
        &self.filter
    }

    pub fn feed(&self) -> &FeedPaginator {
        &self.feed
    }

    pub fn posts(&self) -> &[Post] {
        self.feed.store().posts()
    }

    pub fn views(&self) -> Vec<PostView> {
        project_all(self.posts(), self.viewer_id.as_deref())
    }

    pub fn has_more(&self) -> bool {
        self.feed.has_more()
    }

    pub fn calendar(&self) -> &CalendarView {
        &self.calendar
    }

    pub fn grid(&self) -> MonthGrid {
        self.calendar.grid(self.filter.selected_day())
    }

    pub fn upcoming(&self) -> &[Post] {
        &self.upcoming
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    pub fn dismiss_notice(&mut self) {
        self.notice = None;
    }

    fn fail(&mut self, action: &'static str, err: AppError) {
        warn!(action, error = %err, "bulletin action failed");
        self.notice = Some(Notice {
            action,
            message: err.user_message(),
        });
    }

    // ---- feed ----

    pub async fn load(&mut self, reset: bool) -> Option<LoadOutcome> {
        match self.feed.load(self.api.as_ref(), &self.filter, reset).await {
            Ok(outcome) => Some(outcome),
            Err(e) => {
                self.fail("load", e);
                None
            }
        }
    }

    pub async fn load_more(&mut self) -> Option<LoadOutcome> {
        self.load(false).await
    }

    pub async fn set_text(&mut self, text: &str) -> Option<LoadOutcome> {
        self.filter.set_text(text);
        self.load(true).await
    }

    pub async fn set_category(&mut self, category: &str) -> Option<LoadOutcome> {
        self.filter.set_category(category);
        self.load(true).await
    }

    pub async fn select_day(&mut self, day: NaiveDate) -> Option<LoadOutcome> {
        self.filter.select_day(day);
        self.load(true).await
    }

    /// Removes the day predicate. The calendar month stays as it is.
    pub async fn clear_day(&mut self) -> Option<LoadOutcome> {
        self.filter.clear_day();
        self.load(true).await
    }

    // ---- mutations ----

    pub async fn like(&mut self, post_id: &str) -> Option<Post> {
        self.mutate(post_id, Mutation::Like).await
    }

    pub async fn comment(&mut self, post_id: &str, text: &str) -> Option<Post> {
        self.mutate(post_id, Mutation::Comment(text.to_string()))
            .await
    }

    /// Pin or unpin; the feed is reloaded from the first page afterwards.
    pub async fn pin(&mut self, post_id: &str, pinned: bool) -> Option<Post> {
        self.mutate(post_id, Mutation::Pin(pinned)).await
    }

    async fn mutate(&mut self, post_id: &str, mutation: Mutation) -> Option<Post> {
        let action = mutation.name();
        let outcome =
            match apply_mutation(self.api.as_ref(), self.feed.store_mut(), post_id, &mutation).await {
                Ok(outcome) => outcome,
                Err(e) => {
                    self.fail(action, e);
                    return None;
                }
            };

        match outcome {
            MutationOutcome::Replaced { post, .. } => {
                self.replace_upcoming(&post);
                Some(post)
            }
            MutationOutcome::ReloadRequired(post) => {
                self.replace_upcoming(&post);
                self.load(true).await;
                Some(post)
            }
        }
    }

    fn replace_upcoming(&mut self, canonical: &Post) {
        if let Some(slot) = self.upcoming.iter_mut().find(|p| p.id == canonical.id) {
            *slot = canonical.clone();
        }
    }

    /// Publishes a new post. The feed restarts from the first page since the
    /// new post's position is decided by the server.
    pub async fn publish(&mut self, draft: &PostDraft) -> Option<Post> {
        if let Err(e) = draft.check() {
            self.fail("publish", e);
            return None;
        }

        let post = match self.api.publish(draft).await {
            Ok(post) => post,
            Err(e) => {
                self.fail("publish", e);
                return None;
            }
        };
        info!(post_id = %post.id, kind = post.kind.as_str(), "post published");

        self.load(true).await;
        if post.is_event() {
            self.refresh_calendar().await;
            self.refresh_upcoming().await;
        }
        Some(post)
    }

    pub async fn delete(&mut self, post_id: &str) -> bool {
        if let Err(e) = self.api.delete(post_id).await {
            self.fail("delete", e);
            return false;
        }

        let removed = self.feed.store_mut().remove_by_id(post_id);
        let was_upcoming = self.upcoming.iter().any(|p| p.id == post_id);
        let in_calendar = self.calendar.events().iter().any(|p| p.id == post_id);
        info!(post_id, in_feed = removed.is_some(), "post deleted");

        if was_upcoming || in_calendar || removed.is_some_and(|p| p.is_event()) {
            self.upcoming.retain(|p| p.id != post_id);
            self.refresh_calendar().await;
            self.refresh_upcoming().await;
        }
        true
    }

    // ---- calendar & events ----

    pub async fn show_month(&mut self, month: CalendarMonth) -> bool {
        match self.calendar.show(self.api.as_ref(), month).await {
            Ok(applied) => applied,
            Err(e) => {
                self.fail("calendar", e);
                false
            }
        }
    }

    pub async fn prev_month(&mut self) -> bool {
        let month = self.calendar.month().prev();
        self.show_month(month).await
    }

    pub async fn next_month(&mut self) -> bool {
        let month = self.calendar.month().next();
        self.show_month(month).await
    }

    pub async fn refresh_calendar(&mut self) -> bool {
        let month = self.calendar.month();
        self.show_month(month).await
    }

    pub async fn refresh_upcoming(&mut self) -> bool {
        match self.api.upcoming_events(self.upcoming_limit).await {
            Ok(events) => {
                self.upcoming = events;
                true
            }
            Err(e) => {
                self.fail("events", e);
                false
            }
        }
    }
}
