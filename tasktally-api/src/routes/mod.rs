/// API route handlers
///
/// This module contains all route handlers organized by resource:
///
/// - `health`: Health check endpoint
/// - `auth`: Login and current user
/// - `dashboard`: Points per user and the day's board
/// - `instances`: Daily instances, completion, instantiation
/// - `tasks`: Task catalogue
/// - `groups`: Group management
/// - `users`: User management

pub mod auth;
pub mod dashboard;
pub mod groups;
pub mod health;
pub mod instances;
pub mod tasks;
pub mod users;

use chrono::NaiveDate;
use serde::Deserialize;

/// `?date=YYYY-MM-DD` query, defaulting to the server's local today
#[derive(Debug, Default, Deserialize)]
pub struct DateQuery {
    pub date: Option<NaiveDate>,
}

impl DateQuery {
    pub fn resolve(&self) -> NaiveDate {
        self.date.unwrap_or_else(today)
    }
}

/// The server's local calendar date
pub fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}
