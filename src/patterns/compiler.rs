//! Turns a literal symbol into the anchored patterns that find its definition.

use regex::Regex;
use std::collections::HashSet;
use tracing::warn;

use super::language::Language;
use super::profiles::NEVER;
use super::registry::{Anchor, Registry, Scope};
use crate::types::DefinitionKind;

/// Escape a symbol for use inside a pattern.
///
/// All symbol text passes through here. The empty symbol becomes an
/// unsatisfiable fragment so that it compiles but never matches.
pub fn literal(symbol: &str) -> String {
    if symbol.is_empty() {
        NEVER.to_string()
    } else {
        regex::escape(symbol)
    }
}

/// One symbol-specific pattern, tagged with the rule that produced it.
#[derive(Debug, Clone)]
pub struct CompiledPattern {
    regex: Regex,
    kind: DefinitionKind,
    anchor: Anchor,
    scope: Scope,
}

impl CompiledPattern {
    pub fn kind(&self) -> DefinitionKind {
        self.kind
    }

    pub fn anchor(&self) -> Anchor {
        self.anchor
    }

    pub fn scope(&self) -> Scope {
        self.scope
    }

    pub fn as_str(&self) -> &str {
        self.regex.as_str()
    }

    /// Test `line` given the declaration group currently open, if any.
    pub fn is_match(&self, line: &str, group: Option<DefinitionKind>) -> bool {
        self.scope.admits(group) && self.regex.is_match(self.anchor.apply(line))
    }
}

/// The patterns derived for one symbol in one language.
#[derive(Debug, Clone)]
pub struct CompiledSearch {
    symbol: String,
    language: Language,
    patterns: Vec<CompiledPattern>,
}

impl CompiledSearch {
    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn language(&self) -> Language {
        self.language
    }

    /// Patterns in rule order.
    pub fn patterns(&self) -> &[CompiledPattern] {
        &self.patterns
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn pattern_texts(&self) -> Vec<&str> {
        self.patterns.iter().map(|p| p.as_str()).collect()
    }

    /// First pattern matching `line`, in rule order.
    pub fn match_line(&self, line: &str, group: Option<DefinitionKind>) -> Option<&CompiledPattern> {
        self.patterns.iter().find(|p| p.is_match(line, group))
    }
}

/// Compile `symbol` against the profile for `language`.
///
/// Unsupported languages yield an empty search. Rules that reduce to the
/// same pattern (with the same anchor and scope) are kept once, under the
/// kind of the first rule that produced it.
pub fn compile(registry: &Registry, symbol: &str, language: Language) -> CompiledSearch {
    let mut patterns = Vec::new();

    if let Some(profile) = registry.profile_for(language) {
        let escaped = literal(symbol);
        let mut seen: HashSet<(Anchor, Scope, String)> = HashSet::new();

        for rule in profile.rules() {
            let text = rule.specialize(&escaped);
            if !seen.insert((rule.anchor(), rule.scope(), text.clone())) {
                continue;
            }

            // Only pathological symbols (e.g. past the regex size limit) fail here.
            match Regex::new(&text) {
                Ok(regex) => patterns.push(CompiledPattern {
                    regex,
                    kind: rule.kind(),
                    anchor: rule.anchor(),
                    scope: rule.scope(),
                }),
                Err(e) => warn!("Skipping definition pattern for {:?}: {}", symbol, e),
            }
        }
    }

    CompiledSearch {
        symbol: symbol.to_string(),
        language,
        patterns,
    }
}
