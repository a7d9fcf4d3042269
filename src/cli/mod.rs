//! Terminal presentation: tables, sparklines, progress and setup.

pub mod dashboard;
pub mod setup;
pub mod ui;
