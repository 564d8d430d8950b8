//! Definition lookup result types.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

use crate::patterns::Language;

/// What kind of declaration a matched line introduces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DefinitionKind {
    Function,
    Method,
    Type,
    Interface,
    Const,
    Var,
}

impl DefinitionKind {
    pub fn as_str(self) -> &'static str {
        match self {
            DefinitionKind::Function => "function",
            DefinitionKind::Method => "method",
            DefinitionKind::Type => "type",
            DefinitionKind::Interface => "interface",
            DefinitionKind::Const => "const",
            DefinitionKind::Var => "var",
        }
    }
}

impl fmt::Display for DefinitionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lines surrounding a match, clamped at file boundaries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContextWindow {
    /// 1-based line number of the first line in the window
    pub start_line: usize,
    /// Lines immediately before the match, in file order
    pub before: Vec<String>,
    /// Lines immediately after the match, in file order
    pub after: Vec<String>,
}

impl ContextWindow {
    /// Build a window of up to `radius` lines around the zero-based `index`.
    pub fn around(lines: &[&str], index: usize, radius: usize) -> Self {
        let index = index.min(lines.len().saturating_sub(1));
        let start = index.saturating_sub(radius);
        let end = index.saturating_add(radius).saturating_add(1).min(lines.len());
        let after_start = (index + 1).min(end);

        Self {
            start_line: start + 1,
            before: lines[start..index].iter().map(|l| l.to_string()).collect(),
            after: lines[after_start..end].iter().map(|l| l.to_string()).collect(),
        }
    }

    /// Total number of context lines (excluding the matched line).
    pub fn len(&self) -> usize {
        self.before.len() + self.after.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// One located definition site.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchResult {
    /// File path relative to the search root
    pub path: PathBuf,
    /// 1-based line number
    pub line: usize,
    /// Kind of the matched declaration
    pub kind: DefinitionKind,
    /// Language of the file
    pub language: Language,
    /// The matched line, unmodified
    pub text: String,
    /// Surrounding lines, when requested
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<ContextWindow>,
}

#[cfg(test)]
mod tests {
    use super::*;

    const LINES: [&str; 5] = ["one", "two", "three", "four", "five"];

    #[test]
    fn test_kind_display_and_serde() {
        assert_eq!(DefinitionKind::Interface.to_string(), "interface");
        let json = serde_json::to_string(&DefinitionKind::Const).unwrap();
        assert_eq!(json, "\"const\"");
    }

    #[test]
    fn test_context_window_in_middle() {
        let window = ContextWindow::around(&LINES, 2, 1);
        assert_eq!(window.start_line, 2);
        assert_eq!(window.before, vec!["two"]);
        assert_eq!(window.after, vec!["four"]);
    }

    #[test]
    fn test_context_window_clamps_at_start() {
        let window = ContextWindow::around(&LINES, 0, 3);
        assert_eq!(window.start_line, 1);
        assert!(window.before.is_empty());
        assert_eq!(window.after, vec!["two", "three", "four"]);
    }

    #[test]
    fn test_context_window_clamps_at_end() {
        let window = ContextWindow::around(&LINES, 4, 2);
        assert_eq!(window.start_line, 3);
        assert_eq!(window.before, vec!["three", "four"]);
        assert!(window.after.is_empty());
    }

    #[test]
    fn test_context_window_never_exceeds_radius() {
        for index in 0..LINES.len() {
            for radius in 0..7 {
                let window = ContextWindow::around(&LINES, index, radius);
                assert!(window.before.len() <= radius);
                assert!(window.after.len() <= radius);
                assert_eq!(window.before.len(), radius.min(index));
                assert_eq!(window.after.len(), radius.min(LINES.len() - 1 - index));
            }
        }
    }

    #[test]
    fn test_match_result_omits_missing_context() {
        let result = MatchResult {
            path: PathBuf::from("user.go"),
            line: 10,
            kind: DefinitionKind::Function,
            language: Language::Go,
            text: "func GetUser(id int) *User {".to_string(),
            context: None,
        };

        let json = serde_json::to_string(&result).unwrap();
        assert!(json.contains("\"kind\":\"function\""));
        assert!(json.contains("\"language\":\"go\""));
        assert!(!json.contains("context"));
    }
}
