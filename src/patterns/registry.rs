//! Per-language definition rules and the registry that owns them.
//!
//! A [`Registry`] is an immutable value: build it once (usually through
//! [`Registry::shared`]) and hand out references or `Arc`s. Nothing in it
//! is ever mutated after construction, so concurrent readers need no
//! locking.

use regex::Regex;
use std::path::Path;
use std::sync::{Arc, OnceLock};

use super::language::Language;
use super::profiles;
use crate::types::DefinitionKind;

/// Builds the symbol-specific pattern text for one rule from an already
/// escaped symbol.
pub type PatternBuilder = fn(&str) -> String;

/// Which view of a line a rule is anchored against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Anchor {
    /// Leading whitespace is stripped before matching.
    #[default]
    Trimmed,
    /// The untrimmed line; indentation is part of the signal.
    Raw,
}

impl Anchor {
    pub fn apply(self, line: &str) -> &str {
        match self {
            Anchor::Trimmed => line.trim_start(),
            Anchor::Raw => line,
        }
    }
}

/// Where in a file a rule may fire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Scope {
    #[default]
    Anywhere,
    /// Only inside an open declaration group of the given kind,
    /// e.g. the members of a Go `const ( ... )` block.
    Within(DefinitionKind),
}

impl Scope {
    pub fn admits(self, group: Option<DefinitionKind>) -> bool {
        match self {
            Scope::Anywhere => true,
            Scope::Within(kind) => group == Some(kind),
        }
    }
}

/// Compile one of the built-in patterns.
///
/// Built-in patterns are string literals covered by the registry tests,
/// so a failure here is a programming error.
pub(crate) fn static_regex(pattern: &str) -> Regex {
    Regex::new(pattern).unwrap_or_else(|e| panic!("invalid built-in pattern {pattern:?}: {e}"))
}

/// One heuristic recognizing a declaration from a single line.
#[derive(Debug, Clone)]
pub struct DefinitionRule {
    kind: DefinitionKind,
    pattern: Regex,
    build: PatternBuilder,
    anchor: Anchor,
    scope: Scope,
}

impl DefinitionRule {
    /// `pattern` must capture the declared identifier in a group named `name`.
    pub fn new(kind: DefinitionKind, pattern: &str, build: PatternBuilder) -> Self {
        Self {
            kind,
            pattern: static_regex(pattern),
            build,
            anchor: Anchor::Trimmed,
            scope: Scope::Anywhere,
        }
    }

    /// Match against the untrimmed line.
    pub fn raw(mut self) -> Self {
        self.anchor = Anchor::Raw;
        self
    }

    /// Restrict the rule to declaration groups of `kind`.
    pub fn within(mut self, kind: DefinitionKind) -> Self {
        self.scope = Scope::Within(kind);
        self
    }

    pub fn kind(&self) -> DefinitionKind {
        self.kind
    }

    pub fn pattern(&self) -> &Regex {
        &self.pattern
    }

    pub fn anchor(&self) -> Anchor {
        self.anchor
    }

    pub fn scope(&self) -> Scope {
        self.scope
    }

    /// The identifier this rule sees declared on `line`, if any.
    pub fn declared_name<'a>(&self, line: &'a str) -> Option<&'a str> {
        self.pattern
            .captures(self.anchor.apply(line))
            .and_then(|c| c.name("name"))
            .map(|m| m.as_str())
    }

    /// Pattern text requiring exactly `escaped_symbol` in the name position.
    pub fn specialize(&self, escaped_symbol: &str) -> String {
        (self.build)(escaped_symbol)
    }
}

/// Classifies test files by path shape.
#[derive(Debug, Clone)]
pub struct TestFileRule {
    pattern: Regex,
}

impl TestFileRule {
    pub fn new(pattern: &str) -> Self {
        Self {
            pattern: static_regex(pattern),
        }
    }

    /// Matches a root-relative path; separators are normalized to `/`.
    pub fn is_test(&self, path: &Path) -> bool {
        let normalized = path.to_string_lossy().replace('\\', "/");
        self.pattern.is_match(&normalized)
    }
}

/// A multi-line declaration group such as Go's `const (` ... `)`.
#[derive(Debug, Clone)]
pub struct DeclarationGroup {
    kind: DefinitionKind,
    opener: Regex,
}

impl DeclarationGroup {
    pub fn new(kind: DefinitionKind, opener: &str) -> Self {
        Self {
            kind,
            opener: static_regex(opener),
        }
    }
}

/// Everything the locator knows about one language.
#[derive(Debug, Clone)]
pub struct LanguageProfile {
    language: Language,
    extensions: &'static [&'static str],
    rules: Vec<DefinitionRule>,
    test_file: TestFileRule,
    groups: Vec<DeclarationGroup>,
    group_close: Option<Regex>,
}

impl LanguageProfile {
    pub fn new(
        language: Language,
        extensions: &'static [&'static str],
        rules: Vec<DefinitionRule>,
        test_file: TestFileRule,
    ) -> Self {
        Self {
            language,
            extensions,
            rules,
            test_file,
            groups: Vec::new(),
            group_close: None,
        }
    }

    /// Declare group openers and the (raw-line) pattern that closes any group.
    pub fn with_groups(mut self, groups: Vec<DeclarationGroup>, close: &str) -> Self {
        self.groups = groups;
        self.group_close = Some(static_regex(close));
        self
    }

    pub fn language(&self) -> Language {
        self.language
    }

    pub fn extensions(&self) -> &'static [&'static str] {
        self.extensions
    }

    /// Rules in evaluation order.
    pub fn rules(&self) -> &[DefinitionRule] {
        &self.rules
    }

    pub fn test_file(&self) -> &TestFileRule {
        &self.test_file
    }

    pub fn is_test_file(&self, path: &Path) -> bool {
        self.test_file.is_test(path)
    }

    /// Kind of the group opened by `line`, if it opens one.
    pub fn group_opened_by(&self, line: &str) -> Option<DefinitionKind> {
        self.groups
            .iter()
            .find(|g| g.opener.is_match(line))
            .map(|g| g.kind)
    }

    pub fn closes_group(&self, line: &str) -> bool {
        self.group_close
            .as_ref()
            .is_some_and(|close| close.is_match(line))
    }

    /// The most specific kind the generic rules assign to `symbol` on `line`.
    pub fn refine_kind(
        &self,
        line: &str,
        symbol: &str,
        group: Option<DefinitionKind>,
    ) -> Option<DefinitionKind> {
        self.rules
            .iter()
            .filter(|r| r.scope.admits(group))
            .find(|r| r.declared_name(line) == Some(symbol))
            .map(|r| r.kind)
    }
}

/// Registry of language profiles, in a fixed order.
#[derive(Debug, Clone)]
pub struct Registry {
    profiles: Vec<LanguageProfile>,
}

impl Registry {
    /// A registry holding exactly `profiles`.
    pub fn new(profiles: Vec<LanguageProfile>) -> Self {
        Self { profiles }
    }

    /// The built-in profiles for every supported language.
    pub fn builtin() -> Self {
        Self::new(vec![
            profiles::go(),
            profiles::typescript(),
            profiles::javascript(),
            profiles::python(),
            profiles::rust(),
        ])
    }

    /// Process-wide built-in registry, constructed on first use.
    pub fn shared() -> Arc<Registry> {
        static SHARED: OnceLock<Arc<Registry>> = OnceLock::new();
        SHARED.get_or_init(|| Arc::new(Registry::builtin())).clone()
    }

    pub fn profile_for(&self, language: Language) -> Option<&LanguageProfile> {
        self.profiles.iter().find(|p| p.language == language)
    }

    /// Languages with a registered profile, in registry order.
    pub fn languages(&self) -> Vec<Language> {
        self.profiles.iter().map(|p| p.language).collect()
    }

    pub fn profiles(&self) -> &[LanguageProfile] {
        &self.profiles
    }
}
