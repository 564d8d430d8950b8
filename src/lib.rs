//! cdx - fast, language-aware definition lookup
//!
//! Finds where a symbol is declared in a source tree without a language
//! server, using per-language line heuristics.
//!
//! # Architecture
//!
//! 1. **Patterns** (`patterns`) - language classifier, rule registry, and
//!    the compiler that specializes rules for one symbol
//! 2. **Service** (`service`) - the scan engine, its cancellation context
//!    and scan statistics
//! 3. **Output** (`output`) - human, plain and JSON rendering for the CLI
//! 4. **Config** (`config`) - command-line flags, `.cdx.yaml` files and
//!    `CDX_*` environment variables
//!
//! # Example
//!
//! ```no_run
//! use cdx::service::{DefinitionLocator, SearchContext, SearchOptions};
//! use std::time::Duration;
//!
//! # async fn run() -> cdx::Result<()> {
//! let locator = DefinitionLocator::default();
//! let ctx = SearchContext::with_timeout(Duration::from_secs(30));
//! let matches = locator
//!     .find_definition(&ctx, "GetUser", &SearchOptions::default())
//!     .await?;
//! for m in matches {
//!     println!("{}:{} [{}]", m.path.display(), m.line, m.kind);
//! }
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod output;
pub mod patterns;
pub mod service;
pub mod types;

pub use error::{Error, Result};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Files larger than this are skipped unless configured otherwise (1 MiB).
pub const DEFAULT_MAX_FILE_SIZE: u64 = 1024 * 1024;
