//! Core domain types

pub mod cafe_item;

pub use cafe_item::*;
