use chrono::NaiveDate;

use crate::models::post::FeedQuery;

/// Single source of truth for the active feed query.
///
/// Every effective change bumps `revision`; the paginator uses it to refuse
/// continuing a cursor chain that belongs to an older query.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterState {
    text: String,
    category: String,
    selected_day: Option<NaiveDate>,
    revision: u64,
}

impl FilterState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn selected_day(&self) -> Option<NaiveDate> {
        self.selected_day
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Returns true when the value actually changed.
    pub fn set_text(&mut self, text: &str) -> bool {
        let text = text.trim();
        if self.text == text {
            return false;
        }
        self.text = text.to_string();
        self.bump()
    }

    pub fn set_category(&mut self, category: &str) -> bool {
        let category = category.trim();
        if self.category == category {
            return false;
        }
        self.category = category.to_string();
        self.bump()
    }

    pub fn select_day(&mut self, day: NaiveDate) -> bool {
        if self.selected_day == Some(day) {
            return false;
        }
        self.selected_day = Some(day);
        self.bump()
    }

    /// Explicit "clear date" action.
    pub fn clear_day(&mut self) -> bool {
        if self.selected_day.take().is_none() {
            return false;
        }
        self.bump()
    }

    /// Snapshot of the query for the given cursor.
    pub fn query(&self, cursor: &str) -> FeedQuery {
        FeedQuery {
            text: self.text.clone(),
            category: self.category.clone(),
            selected_day: self.selected_day,
            cursor: cursor.to_string(),
        }
    }

    fn bump(&mut self) -> bool {
        self.revision += 1;
        true
    }
}
