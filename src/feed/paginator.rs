use tracing::{debug, info};

use super::{filter::FilterState, store::FeedStore};
use crate::{
    api::BulletinApi,
    error::AppError,
    models::post::{FeedPage, FeedQuery},
};

/// One issued feed request. Only the ticket with the latest token may
/// change the paginator when its response comes back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadTicket {
    token: u64,
    reset: bool,
    revision: u64,
    limit: u32,
    query: FeedQuery,
}

impl LoadTicket {
    pub fn token(&self) -> u64 {
        self.token
    }

    pub fn is_reset(&self) -> bool {
        self.reset
    }

    pub fn query(&self) -> &FeedQuery {
        &self.query
    }

    /// Performs the request. Borrows nothing from the paginator, so several
    /// tickets may be in flight at once.
    pub async fn fetch(&self, api: &dyn BulletinApi) -> Result<FeedPage, AppError> {
        api.list_posts(&self.query, self.limit).await
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    Applied { added: usize, has_more: bool },
    /// A newer request was issued after this one; nothing changed.
    Discarded,
}

/// Cursor-driven pagination over the server-ordered feed.
#[derive(Debug)]
pub struct FeedPaginator {
    store: FeedStore,
    /// Cursor to send with the next `load(false)`.
    cursor: String,
    has_more: bool,
    latest_token: u64,
    /// Filter revision the current cursor chain was started under.
    chain_revision: Option<u64>,
    page_size: u32,
}

impl FeedPaginator {
    pub fn new(page_size: u32) -> Self {
        Self {
            store: FeedStore::new(),
            cursor: String::new(),
            has_more: false,
            latest_token: 0,
            chain_revision: None,
            page_size: page_size.max(1),
        }
    }

    pub fn store(&self) -> &FeedStore {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut FeedStore {
        &mut self.store
    }

    /// Whether "load more" should be offered.
    pub fn has_more(&self) -> bool {
        self.has_more
    }

    pub fn cursor(&self) -> &str {
        &self.cursor
    }

    /// Issues a new token and snapshots the query to send.
    ///
    /// A continuation requested under a different filter revision than the
    /// current chain is promoted to a reset.
    pub fn begin(&mut self, filter: &FilterState, reset: bool) -> LoadTicket {
        let reset = reset || self.chain_revision != Some(filter.revision());
        self.latest_token += 1;

        let cursor = if reset { "" } else { self.cursor.as_str() };
        LoadTicket {
            token: self.latest_token,
            reset,
            revision: filter.revision(),
            limit: self.page_size,
            query: filter.query(cursor),
        }
    }

    /// Applies a response, or discards it when its ticket is superseded.
    ///
    /// A failed response leaves list and cursor exactly as they were. For a
    /// reset the clear happens here, together with the first page.
    pub fn complete(
        &mut self,
        ticket: LoadTicket,
        result: Result<FeedPage, AppError>,
    ) -> Result<LoadOutcome, AppError> {
        if ticket.token != self.latest_token {
            debug!(
                token = ticket.token,
                latest = self.latest_token,
                "discarding superseded feed response"
            );
            return Ok(LoadOutcome::Discarded);
        }

        let page = result?;

        if ticket.reset {
            self.store.reset();
        }
        let added = self.store.append(page.items);
        self.chain_revision = Some(ticket.revision);

        if page.next_cursor.is_empty() {
            // Keep the cursor that produced the tail page; asking for it again
            // only yields posts the store already holds.
            self.cursor = ticket.query.cursor;
            self.has_more = false;
        } else {
            self.cursor = page.next_cursor;
            self.has_more = true;
        }

        info!(
            token = ticket.token,
            reset = ticket.reset,
            added,
            total = self.store.len(),
            has_more = self.has_more,
            "feed page applied"
        );
        Ok(LoadOutcome::Applied {
            added,
            has_more: self.has_more,
        })
    }

    /// `begin` + `fetch` + `complete` for callers that await each load in turn.
    pub async fn load(
        &mut self,
        api: &dyn BulletinApi,
        filter: &FilterState,
        reset: bool,
    ) -> Result<LoadOutcome, AppError> {
        let ticket = self.begin(filter, reset);
        let result = ticket.fetch(api).await;
        self.complete(ticket, result)
    }
}
