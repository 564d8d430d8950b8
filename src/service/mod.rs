//! Service layer for cdx.
//!
//! This module runs definition searches over a directory tree on top of
//! the pattern registry, and owns their cancellation and statistics.

pub mod deadline;
pub mod locator;
pub mod stats;

pub use deadline::SearchContext;
pub use locator::{scan_source, DefinitionLocator, SearchOptions, SearchOutcome};
pub use stats::{ScanSnapshot, ScanStats};
