//! HTTP handlers

pub mod cafe_models;
pub mod health;

pub use health::health;
