//! Shared identifier types used across the order domain crates.

mod types;

pub use types::OrderId;
