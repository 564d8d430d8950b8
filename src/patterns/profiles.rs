//! Built-in language profiles.
//!
//! Each generic pattern captures the declared identifier as `name`; the
//! paired builder rebuilds the same shape around a literal symbol. Several
//! builders in one language deliberately produce identical text (all of a
//! language's type-like declarations, for instance), and the compiler
//! collapses them.
//!
//! Rule order is significant: the first rule that matches a line decides
//! its kind.

use super::language::Language;
use super::registry::{DeclarationGroup, DefinitionRule, LanguageProfile, TestFileRule};
use crate::types::DefinitionKind::{self, Const, Function, Interface, Method, Type, Var};

const IDENT: &str = "[A-Za-z_][A-Za-z0-9_]*";
const JS_IDENT: &str = "[A-Za-z_$][A-Za-z0-9_$]*";

/// Pattern that can never match; used where a symbol cannot fit a rule.
pub(crate) const NEVER: &str = r"\b\B";

/// Non-identifier character or end of line after a symbol.
const WORD_END: &str = r"(?:[^A-Za-z0-9_]|$)";
const JS_WORD_END: &str = r"(?:[^A-Za-z0-9_$]|$)";

/// Rust visibility, including `pub(crate)` and friends.
const RUST_VIS: &str = r"(?:pub(?:\s*\([^)]*\))?\s+)?";

/// A generic parameter or argument list, nested one level deep.
const RUST_GENERICS: &str = r"<(?:[^<>]|<[^<>]*>)*>";

/// Go's "what may follow a declared name" for const/var declarations.
const GO_DECL_TAIL: &str = r"(?:\s*=|\s+[A-Za-z_\[*(])";

/// Optional `: Type` on a TS binding; the type may itself be a function type.
const TS_BINDING_TYPE: &str = r"(?::(?:[^=()]|\((?:[^()]|\([^()]*\))*\)|=>)+)?";

/// Substitutes the capture group for `NAME` in a generic pattern.
fn named(pattern: &str, ident: &str) -> String {
    pattern.replace("NAME", &format!("(?P<name>{ident})"))
}

fn rule(kind: DefinitionKind, pattern: &str, build: fn(&str) -> String) -> DefinitionRule {
    DefinitionRule::new(kind, &named(pattern, IDENT), build)
}

fn js_rule(kind: DefinitionKind, pattern: &str, build: fn(&str) -> String) -> DefinitionRule {
    DefinitionRule::new(kind, &named(pattern, JS_IDENT), build)
}

fn leads_upper(symbol: &str) -> bool {
    symbol
        .chars()
        .next()
        .is_some_and(|c| c.is_ascii_uppercase() || c == '_')
}

fn is_screaming_case(symbol: &str) -> bool {
    symbol.chars().next().is_some_and(|c| c.is_ascii_uppercase())
        && symbol
            .chars()
            .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '_')
}

// ===== Go =====

fn go_type_family(sym: &str) -> String {
    format!(r"^type\s+{sym}(?:\s|\[)")
}

pub fn go() -> LanguageProfile {
    let rules = vec![
        rule(Function, r"^func\s+NAME\s*[\[(]", |sym| {
            format!(r"^func\s+{sym}\s*[\[(]")
        }),
        rule(Method, r"^func\s+\([^)]+\)\s*NAME\s*[\[(]", |sym| {
            format!(r"^func\s+\([^)]+\)\s*{sym}\s*[\[(]")
        }),
        rule(Type, r"^type\s+NAME(?:\[[^\]]*\])?\s+struct\b", go_type_family),
        rule(Interface, r"^type\s+NAME(?:\[[^\]]*\])?\s+interface\b", go_type_family),
        rule(Type, r"^type\s+NAME(?:\[[^\]]*\])?\s*=", go_type_family),
        rule(Type, r"^type\s+NAME(?:\[[^\]]*\])?\s+[A-Za-z_\[*(]", go_type_family),
        rule(Const, &format!(r"^const\s+NAME{GO_DECL_TAIL}"), |sym| {
            format!(r"^const\s+{sym}{GO_DECL_TAIL}")
        }),
        // gofmt indents group members with one tab; bare members repeat
        // the previous expression (iota).
        DefinitionRule::new(
            Const,
            &format!(r"^\t(?P<name>[A-Z_][A-Za-z0-9_]*)(?:{GO_DECL_TAIL}|\s*$|\s*//)"),
            |sym| {
                if leads_upper(sym) {
                    format!(r"^\t{sym}(?:{GO_DECL_TAIL}|\s*$|\s*//)")
                } else {
                    NEVER.to_string()
                }
            },
        )
        .raw()
        .within(Const),
        rule(Var, &format!(r"^var\s+NAME{GO_DECL_TAIL}"), |sym| {
            format!(r"^var\s+{sym}{GO_DECL_TAIL}")
        }),
        rule(Var, &format!(r"^\tNAME{GO_DECL_TAIL}"), |sym| {
            format!(r"^\t{sym}{GO_DECL_TAIL}")
        })
        .raw()
        .within(Var),
        rule(Type, r"^\tNAME(?:\[[^\]]*\])?\s+(?:=\s*)?[A-Za-z_\[*(]", |sym| {
            format!(r"^\t{sym}(?:\s|\[)")
        })
        .raw()
        .within(Type),
    ];

    LanguageProfile::new(
        Language::Go,
        &[".go"],
        rules,
        TestFileRule::new(r"_test\.go$"),
    )
    .with_groups(
        vec![
            DeclarationGroup::new(Const, r"^const\s*\(\s*(?://.*)?$"),
            DeclarationGroup::new(Var, r"^var\s*\(\s*(?://.*)?$"),
            DeclarationGroup::new(Type, r"^type\s*\(\s*(?://.*)?$"),
        ],
        r"^\)",
    )
}

// ===== TypeScript / JavaScript =====

fn ts_type_family(sym: &str) -> String {
    format!(
        r"^(?:export\s+)?(?:default\s+)?(?:declare\s+)?(?:abstract\s+)?(?:class|interface|type|enum|const\s+enum)\s+{sym}{JS_WORD_END}"
    )
}

pub fn typescript() -> LanguageProfile {
    let rules = vec![
        js_rule(
            Function,
            r"^(?:export\s+)?(?:default\s+)?(?:declare\s+)?(?:async\s+)?function(?:\s*\*\s*|\s+)NAME\s*[<(]",
            |sym| {
                format!(
                    r"^(?:export\s+)?(?:default\s+)?(?:declare\s+)?(?:async\s+)?function(?:\s*\*\s*|\s+){sym}\s*[<(]"
                )
            },
        ),
        // The arrow token is mandatory: `const x = (a + b)` is not a definition.
        js_rule(
            Function,
            &format!(
                r"^(?:export\s+)?(?:const|let|var)\s+NAME\s*{TS_BINDING_TYPE}=\s*(?:async\s*)?(?:<[^>]*>\s*)?\((?:[^()]*|\([^()]*\))*\)\s*(?::[^=]+)?=>"
            ),
            |sym| {
                format!(
                    r"^(?:export\s+)?(?:const|let|var)\s+{sym}\s*{TS_BINDING_TYPE}=\s*(?:async\s*)?(?:<[^>]*>\s*)?\((?:[^()]*|\([^()]*\))*\)\s*(?::[^=]+)?=>"
                )
            },
        ),
        js_rule(
            Function,
            &format!(
                r"^(?:export\s+)?(?:const|let|var)\s+NAME\s*{TS_BINDING_TYPE}=\s*(?:async\s+)?{JS_IDENT}\s*=>"
            ),
            |sym| {
                format!(
                    r"^(?:export\s+)?(?:const|let|var)\s+{sym}\s*{TS_BINDING_TYPE}=\s*(?:async\s+)?{JS_IDENT}\s*=>"
                )
            },
        ),
        js_rule(
            Type,
            r"^(?:export\s+)?(?:default\s+)?(?:declare\s+)?(?:abstract\s+)?class\s+NAME",
            ts_type_family,
        ),
        js_rule(
            Interface,
            r"^(?:export\s+)?(?:default\s+)?(?:declare\s+)?interface\s+NAME",
            ts_type_family,
        ),
        js_rule(
            Type,
            r"^(?:export\s+)?(?:declare\s+)?type\s+NAME\s*[<=]",
            ts_type_family,
        ),
        js_rule(
            Type,
            r"^(?:export\s+)?(?:declare\s+)?(?:const\s+)?enum\s+NAME",
            ts_type_family,
        ),
    ];

    LanguageProfile::new(
        Language::TypeScript,
        &[".ts", ".tsx", ".mts", ".cts"],
        rules,
        TestFileRule::new(r"\.(?:test|spec)\.[mc]?tsx?$|(?:^|/)__tests__/"),
    )
}

pub fn javascript() -> LanguageProfile {
    let rules = vec![
        js_rule(
            Function,
            r"^(?:export\s+)?(?:default\s+)?(?:async\s+)?function(?:\s*\*\s*|\s+)NAME\s*\(",
            |sym| {
                format!(
                    r"^(?:export\s+)?(?:default\s+)?(?:async\s+)?function(?:\s*\*\s*|\s+){sym}\s*\("
                )
            },
        ),
        js_rule(
            Function,
            r"^(?:export\s+)?(?:const|let|var)\s+NAME\s*=\s*(?:async\s*)?\((?:[^()]*|\([^()]*\))*\)\s*=>",
            |sym| {
                format!(
                    r"^(?:export\s+)?(?:const|let|var)\s+{sym}\s*=\s*(?:async\s*)?\((?:[^()]*|\([^()]*\))*\)\s*=>"
                )
            },
        ),
        js_rule(
            Function,
            &format!(r"^(?:export\s+)?(?:const|let|var)\s+NAME\s*=\s*(?:async\s+)?{JS_IDENT}\s*=>"),
            |sym| {
                format!(
                    r"^(?:export\s+)?(?:const|let|var)\s+{sym}\s*=\s*(?:async\s+)?{JS_IDENT}\s*=>"
                )
            },
        ),
        js_rule(Type, r"^(?:export\s+)?(?:default\s+)?class\s+NAME", |sym| {
            format!(r"^(?:export\s+)?(?:default\s+)?class\s+{sym}{JS_WORD_END}")
        }),
    ];

    LanguageProfile::new(
        Language::JavaScript,
        &[".js", ".jsx", ".mjs", ".cjs"],
        rules,
        TestFileRule::new(r"\.(?:test|spec)\.(?:js|jsx|mjs|cjs)$|(?:^|/)__tests__/"),
    )
}

// ===== Python =====

pub fn python() -> LanguageProfile {
    let rules = vec![
        rule(Function, r"^(?:async\s+)?def\s+NAME\s*[\[(]", |sym| {
            format!(r"^(?:async\s+)?def\s+{sym}\s*[\[(]")
        }),
        rule(Type, r"^class\s+NAME\s*[:(\[]", |sym| {
            format!(r"^class\s+{sym}\s*[:(\[]")
        }),
        // Module-level constants only: column zero, SCREAMING_CASE.
        DefinitionRule::new(
            Const,
            r"^(?P<name>[A-Z][A-Z0-9_]*)\s*(?::[^=]+)?=(?:[^=]|$)",
            |sym| {
                if is_screaming_case(sym) {
                    format!(r"^{sym}\s*(?::[^=]+)?=(?:[^=]|$)")
                } else {
                    NEVER.to_string()
                }
            },
        )
        .raw(),
    ];

    LanguageProfile::new(
        Language::Python,
        &[".py", ".pyi"],
        rules,
        TestFileRule::new(
            r"(?:^|/)test_[^/]*\.pyi?$|_test\.pyi?$|(?:^|/)conftest\.py$|(?:^|/)tests?/",
        ),
    )
}

// ===== Rust =====

fn rust_type_family(sym: &str) -> String {
    format!(r"^{RUST_VIS}(?:struct|enum|union|type)\s+{sym}{WORD_END}")
}

pub fn rust() -> LanguageProfile {
    let rules = vec![
        rule(
            Function,
            &format!(
                r#"^{RUST_VIS}(?:default\s+)?(?:const\s+)?(?:async\s+)?(?:unsafe\s+)?(?:extern\s+(?:"[^"]*"\s+)?)?fn\s+NAME\s*[<(]"#
            ),
            |sym| {
                format!(
                    r#"^{RUST_VIS}(?:default\s+)?(?:const\s+)?(?:async\s+)?(?:unsafe\s+)?(?:extern\s+(?:"[^"]*"\s+)?)?fn\s+{sym}\s*[<(]"#
                )
            },
        ),
        rule(Type, &format!(r"^{RUST_VIS}struct\s+NAME"), rust_type_family),
        rule(Type, &format!(r"^{RUST_VIS}enum\s+NAME"), rust_type_family),
        rule(Type, &format!(r"^{RUST_VIS}union\s+NAME\s*[<{{]"), rust_type_family),
        rule(
            Interface,
            &format!(r"^{RUST_VIS}(?:unsafe\s+)?(?:auto\s+)?trait\s+NAME"),
            |sym| format!(r"^{RUST_VIS}(?:unsafe\s+)?(?:auto\s+)?trait\s+{sym}{WORD_END}"),
        ),
        rule(Type, &format!(r"^{RUST_VIS}type\s+NAME\s*[<=;:]"), rust_type_family),
        rule(Const, &format!(r"^{RUST_VIS}const\s+NAME\s*:"), |sym| {
            format!(r"^{RUST_VIS}const\s+{sym}\s*:")
        }),
        rule(Var, &format!(r"^{RUST_VIS}static\s+(?:mut\s+)?NAME\s*:"), |sym| {
            format!(r"^{RUST_VIS}static\s+(?:mut\s+)?{sym}\s*:")
        }),
        // `impl Name` reports the first path; `impl Trait for Name` also reports the type.
        rule(
            Type,
            &format!(r"^(?:unsafe\s+)?impl(?:\s*{RUST_GENERICS})?\s+NAME"),
            |sym| format!(r"^(?:unsafe\s+)?impl(?:\s*{RUST_GENERICS})?\s+{sym}{WORD_END}"),
        ),
        rule(
            Type,
            &format!(
                r"^(?:unsafe\s+)?impl(?:\s*{RUST_GENERICS})?\s+!?[A-Za-z_][A-Za-z0-9_:]*(?:{RUST_GENERICS})?\s+for\s+NAME"
            ),
            |sym| {
                format!(
                    r"^(?:unsafe\s+)?impl(?:\s*{RUST_GENERICS})?\s+!?[A-Za-z_][A-Za-z0-9_:]*(?:{RUST_GENERICS})?\s+for\s+{sym}{WORD_END}"
                )
            },
        ),
    ];

    LanguageProfile::new(
        Language::Rust,
        &[".rs"],
        rules,
        TestFileRule::new(r"(?:^|/)test_[^/]*\.rs$|_test\.rs$|(?:^|/)tests/"),
    )
}
