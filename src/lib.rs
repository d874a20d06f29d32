//! UptimeX CLI library
//!
//! This module exposes the CLI internals for testing purposes.

pub mod cli;
pub mod client;
pub mod commands;
pub mod config;
pub mod error;
pub mod exit_codes;
pub mod models;
pub mod output;
pub mod render;
pub mod views;
