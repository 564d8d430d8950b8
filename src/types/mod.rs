//! Core type definitions for cdx.
//!
//! Shared result types produced by the locator and consumed by the
//! output layer.

pub mod definition;

// Re-export commonly used types
pub use definition::*;
