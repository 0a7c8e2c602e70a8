//! Storage layer
//!
//! Uses SQLite (embedded) through sqlx. No caching: every call reaches the
//! database.

pub mod db;

pub use db::Database;
