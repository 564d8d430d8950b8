//! Language classification by file extension.
//!
//! The extension table here is the single source of truth for which
//! files the locator ever looks at. Every language it can produce has a
//! profile in the built-in [`Registry`](super::Registry), and vice versa.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// A source language the locator understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Language {
    #[serde(rename = "go")]
    Go,
    #[serde(rename = "ts")]
    TypeScript,
    #[serde(rename = "js")]
    JavaScript,
    #[serde(rename = "py")]
    Python,
    #[serde(rename = "rust")]
    Rust,
    #[serde(rename = "unknown")]
    Unknown,
}

impl Language {
    /// Every language with definition support, in registry order.
    pub const SUPPORTED: [Language; 5] = [
        Language::Go,
        Language::TypeScript,
        Language::JavaScript,
        Language::Python,
        Language::Rust,
    ];

    /// Maps a file extension (with or without the leading dot) to a language.
    ///
    /// ```
    /// use cdx::patterns::Language;
    /// assert_eq!(Language::from_extension(".tsx"), Language::TypeScript);
    /// assert_eq!(Language::from_extension("rs"), Language::Rust);
    /// assert_eq!(Language::from_extension(".md"), Language::Unknown);
    /// ```
    pub fn from_extension(ext: &str) -> Language {
        match ext.strip_prefix('.').unwrap_or(ext) {
            "go" => Language::Go,
            "ts" | "tsx" | "mts" | "cts" => Language::TypeScript,
            "js" | "jsx" | "mjs" | "cjs" => Language::JavaScript,
            "py" | "pyi" => Language::Python,
            "rs" => Language::Rust,
            _ => Language::Unknown,
        }
    }

    /// Classifies a path by its extension.
    pub fn from_path(path: &Path) -> Language {
        path.extension()
            .and_then(|e| e.to_str())
            .map(Language::from_extension)
            .unwrap_or(Language::Unknown)
    }

    /// Normalizes a user-supplied language hint.
    ///
    /// Accepts short tags, full names and extensions, case-insensitively.
    /// Anything unrecognized is [`Language::Unknown`].
    pub fn from_hint(hint: &str) -> Language {
        let hint = hint.trim().to_lowercase();
        match hint.as_str() {
            "go" | "golang" => Language::Go,
            "ts" | "typescript" => Language::TypeScript,
            "js" | "javascript" | "node" => Language::JavaScript,
            "py" | "python" | "python3" => Language::Python,
            "rust" | "rs" => Language::Rust,
            other => Language::from_extension(other),
        }
    }

    /// Short tag used on the command line and in JSON output.
    pub fn tag(self) -> &'static str {
        match self {
            Language::Go => "go",
            Language::TypeScript => "ts",
            Language::JavaScript => "js",
            Language::Python => "py",
            Language::Rust => "rust",
            Language::Unknown => "unknown",
        }
    }

    pub fn is_known(self) -> bool {
        self != Language::Unknown
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}
