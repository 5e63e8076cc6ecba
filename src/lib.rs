// src/lib.rs

pub mod api;
pub mod board;
pub mod calendar;
pub mod config;
pub mod error;
pub mod feed;
pub mod models;
pub mod utils;
pub mod view;

// Re-export specific items for convenience
pub use api::{BulletinApi, HttpApi};
pub use board::{Board, Notice};
pub use calendar::{CalendarMonth, MonthGrid, compute_day_marks};
pub use error::AppError;
