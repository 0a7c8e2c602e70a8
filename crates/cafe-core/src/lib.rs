//! Cafe Core Library
//!
//! Domain types, the storage port and the request-scoped unit of work for
//! the cafe item API. Nothing in here knows about HTTP or SQL.

pub mod context;
pub mod error;
pub mod ports;
pub mod types;

pub use context::RestContext;
pub use error::{CafeError, Result};
pub use ports::{CafeItemStore, Change};
pub use types::*;
