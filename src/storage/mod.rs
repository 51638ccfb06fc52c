//! Storage layer for breathe.
//!
//! `SQLite` persistence for challenge progress and daily check-ins.

mod database;
mod migrations;

pub use database::Database;
