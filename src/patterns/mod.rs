//! Definition patterns.
//!
//! - `language` - classify a file by its extension
//! - `registry` - per-language definition rules and test-file rules
//! - `compiler` - specialize a registry's rules for one literal symbol

pub mod compiler;
pub mod language;
mod profiles;
pub mod registry;

pub use compiler::{compile, literal, CompiledPattern, CompiledSearch};
pub use language::Language;
pub use registry::{
    Anchor, DeclarationGroup, DefinitionRule, LanguageProfile, PatternBuilder, Registry, Scope,
    TestFileRule,
};
