// src/calendar.rs

//! Calendar aggregation: which days of a displayed month carry an event
//! marker, plus the Monday-first day grid the marks are drawn on.

use std::collections::BTreeSet;

use chrono::{Datelike, NaiveDate};
use tracing::debug;

use crate::{
    api::BulletinApi,
    error::AppError,
    models::post::Post,
    utils::dates::{iso_day, parse_day},
};

/// A displayed month. `month0` is 0-based (9 = October); the backend
/// receives the 1-based `wire_month`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CalendarMonth {
    first: NaiveDate,
}

impl CalendarMonth {
    pub fn new(year: i32, month0: u32) -> Option<Self> {
        if month0 > 11 {
            return None;
        }
        NaiveDate::from_ymd_opt(year, month0 + 1, 1).map(|first| Self { first })
    }

    pub fn containing(day: NaiveDate) -> Self {
        Self {
            first: day.with_day(1).unwrap_or(day),
        }
    }

    pub fn year(&self) -> i32 {
        self.first.year()
    }

    pub fn month0(&self) -> u32 {
        self.first.month0()
    }

    pub fn wire_month(&self) -> u32 {
        self.first.month()
    }

    pub fn first_day(&self) -> NaiveDate {
        self.first
    }

    pub fn last_day(&self) -> NaiveDate {
        self.first
            .with_day(self.days_in_month())
            .unwrap_or(self.first)
    }

    pub fn days_in_month(&self) -> u32 {
        match self.first.month() {
            4 | 6 | 9 | 11 => 30,
            2 if NaiveDate::from_ymd_opt(self.year(), 2, 29).is_some() => 29,
            2 => 28,
            _ => 31,
        }
    }

    pub fn prev(&self) -> Self {
        let (year, month0) = match self.month0() {
            0 => (self.year() - 1, 11),
            m => (self.year(), m - 1),
        };
        Self::new(year, month0).unwrap_or(*self)
    }

    pub fn next(&self) -> Self {
        let (year, month0) = match self.month0() {
            11 => (self.year() + 1, 0),
            m => (self.year(), m + 1),
        };
        Self::new(year, month0).unwrap_or(*self)
    }

    /// e.g. "October 2025"
    pub fn label(&self) -> String {
        self.first.format("%B %Y").to_string()
    }
}

/// `[start, end]` of an event: `startDate` falling back to the creation day,
/// `endDate` falling back to the start. None when a present date is unreadable.
pub fn effective_span(post: &Post) -> Option<(NaiveDate, NaiveDate)> {
    let event = post.event.as_ref();

    let start = match event.and_then(|e| e.start_date.as_deref()) {
        Some(raw) => parse_day(raw)?,
        None => post.created_at?.date_naive(),
    };
    let end = match event.and_then(|e| e.end_date.as_deref()) {
        Some(raw) => parse_day(raw)?,
        None => start,
    };
    Some((start, end))
}

/// Days of `month` covered by at least one event, as `YYYY-MM-DD`.
///
/// Spans are clamped to the month, so a multi-day event that spills into a
/// neighbouring month only marks the days inside this one.
pub fn compute_day_marks(events: &[Post], month: CalendarMonth) -> BTreeSet<String> {
    let first = month.first_day();
    let last = month.last_day();
    let mut marks = BTreeSet::new();

    for post in events.iter().filter(|p| p.is_event()) {
        let Some((start, end)) = effective_span(post) else {
            debug!(post_id = %post.id, "skipping event without a readable date");
            continue;
        };

        let start = start.max(first);
        let end = end.min(last);
        if start > end {
            continue;
        }

        for day in start.iter_days().take_while(|d| *d <= end) {
            marks.insert(iso_day(day));
        }
    }

    marks
}

/// Blank cells before day 1 in a Monday-first week.
pub fn leading_blanks(month: CalendarMonth) -> u32 {
    (month.first_day().weekday().num_days_from_sunday() + 6) % 7
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DayCell {
    pub day: u32,
    pub date: NaiveDate,
    pub iso: String,
    pub marked: bool,
    pub selected: bool,
}

/// Day grid of a month. `cells` has `total_cells` entries, `None` for blanks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonthGrid {
    pub month: CalendarMonth,
    pub leading_blanks: u32,
    pub total_cells: u32,
    pub cells: Vec<Option<DayCell>>,
}

impl MonthGrid {
    pub fn build(
        month: CalendarMonth,
        marks: &BTreeSet<String>,
        selected: Option<NaiveDate>,
    ) -> Self {
        let blanks = leading_blanks(month);
        let days = month.days_in_month();
        let total_cells = (blanks + days).div_ceil(7) * 7;

        let mut cells: Vec<Option<DayCell>> = Vec::with_capacity(total_cells as usize);
        cells.extend((0..blanks).map(|_| None));
        for date in month.first_day().iter_days().take(days as usize) {
            let iso = iso_day(date);
            cells.push(Some(DayCell {
                day: date.day(),
                date,
                marked: marks.contains(&iso),
                selected: selected == Some(date),
                iso,
            }));
        }
        cells.resize(total_cells as usize, None);

        Self {
            month,
            leading_blanks: blanks,
            total_cells,
            cells,
        }
    }

    pub fn weeks(&self) -> impl Iterator<Item = &[Option<DayCell>]> {
        self.cells.chunks(7)
    }
}

/// One issued `/calendar` request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonthTicket {
    token: u64,
    month: CalendarMonth,
}

impl MonthTicket {
    pub fn month(&self) -> CalendarMonth {
        self.month
    }

    pub async fn fetch(&self, api: &dyn BulletinApi) -> Result<Vec<Post>, AppError> {
        api.calendar(self.month).await
    }
}

/// The displayed month with its fetched events and derived marks.
///
/// Month navigation applies the same latest-token rule as the feed, so a slow
/// reply for a month the user already left never lands on the grid.
#[derive(Debug)]
pub struct CalendarView {
    month: CalendarMonth,
    events: Vec<Post>,
    marks: BTreeSet<String>,
    latest_token: u64,
}

impl CalendarView {
    pub fn new(month: CalendarMonth) -> Self {
        Self {
            month,
            events: Vec::new(),
            marks: BTreeSet::new(),
            latest_token: 0,
        }
    }

    pub fn month(&self) -> CalendarMonth {
        self.month
    }

    pub fn events(&self) -> &[Post] {
        &self.events
    }

    pub fn marks(&self) -> &BTreeSet<String> {
        &self.marks
    }

    /// Switches the displayed month right away; marks of the previous month
    /// are dropped so they never show on the new grid.
    pub fn begin(&mut self, month: CalendarMonth) -> MonthTicket {
        if month != self.month {
            self.month = month;
            self.events.clear();
            self.marks.clear();
        }
        self.latest_token += 1;
        MonthTicket {
            token: self.latest_token,
            month,
        }
    }

    /// Returns Ok(false) when the ticket was superseded.
    pub fn complete(
        &mut self,
        ticket: MonthTicket,
        result: Result<Vec<Post>, AppError>,
    ) -> Result<bool, AppError> {
        if ticket.token != self.latest_token {
            debug!(
                token = ticket.token,
                latest = self.latest_token,
                "discarding superseded calendar response"
            );
            return Ok(false);
        }

        let events = result?;
        self.marks = compute_day_marks(&events, self.month);
        self.events = events;
        debug!(month = %self.month.label(), marked = self.marks.len(), "calendar marks computed");
        Ok(true)
    }

    pub async fn show(
        &mut self,
        api: &dyn BulletinApi,
        month: CalendarMonth,
    ) -> Result<bool, AppError> {
        let ticket = self.begin(month);
        let result = ticket.fetch(api).await;
        self.complete(ticket, result)
    }

    pub fn grid(&self, selected: Option<NaiveDate>) -> MonthGrid {
        MonthGrid::build(self.month, &self.marks, selected)
    }
}
