//! Shared types for the herald scheduler.
//!
//! `models` holds the two record kinds kept in the backing tables,
//! `api` the JSON bodies exchanged with the presentation layer.

pub mod api;
pub mod models;
