//! Core domain + application logic for the merchant payments bot.
//!
//! This crate is intentionally framework-agnostic. Telegram and the webhook
//! HTTP server live behind ports (traits) implemented in adapter crates.

pub mod callbacks;
pub mod client;
pub mod config;
pub mod directory;
pub mod domain;
pub mod errors;
pub mod formatting;
pub mod keyboards;
pub mod logging;
pub mod messaging;
pub mod notify;
pub mod ports;
pub mod router;
pub mod state;
pub mod tron;

pub use errors::{Error, Result};
