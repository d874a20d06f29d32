//! View state for the dashboard screens.
//!
//! These types hold no I/O; command handlers drive them with the API client.

pub mod catalog;
pub mod form;
pub mod report;
