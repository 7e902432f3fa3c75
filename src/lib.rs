//! Quick categorized notes with a per-category timer. Notes, the draft, categories and the timer
//! live in a small key-value store, so every command and session picks up where the last one
//! stopped.
//!

pub mod app;
pub mod cli;
pub mod error;
pub mod session;
pub mod storage;
pub mod utils;
