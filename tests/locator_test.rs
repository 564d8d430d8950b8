//! Integration tests for the definition locator.
//!
//! These run full searches against temporary trees and the checked-in
//! sample project under `tests/fixtures/`.

use cdx::error::Error;
use cdx::patterns::Language;
use cdx::service::{DefinitionLocator, SearchContext, SearchOptions};
use cdx::types::DefinitionKind;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tempfile::TempDir;

fn fixture_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/sample-project")
}

fn fixture_options() -> SearchOptions {
    SearchOptions {
        root: fixture_root(),
        ..SearchOptions::default()
    }
}

fn write(dir: &TempDir, rel: &str, content: &str) {
    let path = dir.path().join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

fn temp_options(dir: &TempDir) -> SearchOptions {
    SearchOptions {
        root: dir.path().to_path_buf(),
        ..SearchOptions::default()
    }
}

// ===== Concrete scenarios =====

#[tokio::test]
async fn test_go_function_at_line_ten() {
    let dir = TempDir::new().unwrap();
    let mut src = String::from("package user\n");
    for i in 2..10 {
        src.push_str(&format!("// line {}\n", i));
    }
    src.push_str("func GetUser(id int) *User {\n\treturn nil\n}\n");
    write(&dir, "user.go", &src);

    let options = SearchOptions {
        language: Some(Language::Go),
        ..temp_options(&dir)
    };
    let results = DefinitionLocator::default()
        .find_definition(&SearchContext::new(), "GetUser", &options)
        .await
        .unwrap();

    assert_eq!(results.len(), 1);
    assert_eq!(results[0].line, 10);
    assert_eq!(results[0].kind, DefinitionKind::Function);
    assert_eq!(results[0].path, PathBuf::from("user.go"));
}

#[tokio::test]
async fn test_typescript_arrow_with_generic_return_type() {
    let dir = TempDir::new().unwrap();
    write(
        &dir,
        "api.ts",
        "export const fetchUser = async (id: number): Promise<User> => {\n  return get(id);\n};\n",
    );

    let options = SearchOptions {
        language: Some(Language::TypeScript),
        ..temp_options(&dir)
    };
    let results = DefinitionLocator::default()
        .find_definition(&SearchContext::new(), "fetchUser", &options)
        .await
        .unwrap();

    assert_eq!(results.len(), 1);
    assert_eq!(results[0].kind, DefinitionKind::Function);
    assert_eq!(results[0].line, 1);
}

#[tokio::test]
async fn test_grouped_expression_is_not_a_definition() {
    let dir = TempDir::new().unwrap();
    write(&dir, "calc.ts", "const result = (a + b) * 2\n");

    let err = DefinitionLocator::default()
        .find_definition(&SearchContext::new(), "result", &temp_options(&dir))
        .await
        .unwrap_err();

    assert!(err.is_not_found());
}

#[tokio::test]
async fn test_test_files_excluded_unless_requested() {
    let dir = TempDir::new().unwrap();
    write(&dir, "user.go", "package user\n\nfunc Lookup(id int) {}\n");
    write(&dir, "user_test.go", "package user\n\nfunc Lookup(t int) {}\n");

    let locator = DefinitionLocator::default();
    let ctx = SearchContext::new();

    let results = locator
        .find_definition(&ctx, "Lookup", &temp_options(&dir))
        .await
        .unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].path, PathBuf::from("user.go"));

    let options = SearchOptions {
        include_tests: true,
        ..temp_options(&dir)
    };
    let results = locator.find_definition(&ctx, "Lookup", &options).await.unwrap();
    let paths: Vec<PathBuf> = results.into_iter().map(|r| r.path).collect();
    assert_eq!(
        paths,
        vec![PathBuf::from("user.go"), PathBuf::from("user_test.go")]
    );
}

#[tokio::test]
async fn test_test_only_definition_is_not_found() {
    let dir = TempDir::new().unwrap();
    write(&dir, "helpers_test.go", "package user\n\nfunc newFixture() {}\n");

    let err = DefinitionLocator::default()
        .find_definition(&SearchContext::new(), "newFixture", &temp_options(&dir))
        .await
        .unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn test_missing_symbol_carries_symbol() {
    let err = DefinitionLocator::default()
        .find_definition(&SearchContext::new(), "DoesNotExist", &fixture_options())
        .await
        .unwrap_err();

    assert!(matches!(&err, Error::NotFound { symbol } if symbol == "DoesNotExist"));
    assert_eq!(err.to_string(), "No definition found for DoesNotExist");
}

#[tokio::test]
async fn test_expired_deadline_returns_no_partial_results() {
    let ctx = SearchContext::with_timeout(Duration::ZERO);
    let err = DefinitionLocator::default()
        .find_definition(&ctx, "User", &fixture_options())
        .await
        .unwrap_err();

    assert!(err.is_cancellation());
    assert!(matches!(err, Error::Timeout { .. }));
}

#[tokio::test]
async fn test_cancelled_search_is_distinct_from_not_found() {
    let ctx = SearchContext::new();
    ctx.cancel();
    let err = DefinitionLocator::default()
        .find_definition(&ctx, "User", &fixture_options())
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Cancelled));
    assert_ne!(err.exit_code(), Error::not_found("User").exit_code());
}

fn many_python_files(count: usize) -> TempDir {
    let dir = TempDir::new().unwrap();
    for i in 0..count {
        write(&dir, &format!("pkg{:04}/mod.py", i), "def handler():\n    pass\n");
    }
    dir
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_cancel_mid_walk_discards_results() {
    let dir = many_python_files(3000);
    let locator = DefinitionLocator::default().with_concurrency(1);
    let ctx = SearchContext::new();

    let canceller = ctx.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(5)).await;
        canceller.cancel();
    });

    let result = locator.search(&ctx, "handler", &temp_options(&dir)).await;
    assert!(matches!(result, Err(Error::Cancelled)));

    // The same tree completes when nothing interrupts it.
    let outcome = locator
        .search(&SearchContext::new(), "handler", &temp_options(&dir))
        .await
        .unwrap();
    assert_eq!(outcome.matches.len(), 3000);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_deadline_mid_walk_discards_results() {
    let dir = many_python_files(3000);
    let locator = DefinitionLocator::default().with_concurrency(1);
    let ctx = SearchContext::with_deadline(Instant::now() + Duration::from_millis(5));

    let err = locator
        .find_definition(&ctx, "handler", &temp_options(&dir))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Timeout { .. }));
    assert!(err.is_cancellation());
}

// ===== Options =====

#[tokio::test]
async fn test_max_results_truncates() {
    let dir = TempDir::new().unwrap();
    for i in 0..5 {
        write(&dir, &format!("pkg{}/handler.py", i), "def handle(request):\n    pass\n");
    }

    let locator = DefinitionLocator::default();
    let ctx = SearchContext::new();

    let options = SearchOptions {
        max_results: 3,
        ..temp_options(&dir)
    };
    let outcome = locator.search(&ctx, "handle", &options).await.unwrap();
    assert_eq!(outcome.matches.len(), 3);
    assert_eq!(outcome.stats.matches, 5);

    let paths: Vec<PathBuf> = outcome.matches.into_iter().map(|r| r.path).collect();
    assert_eq!(
        paths,
        vec![
            PathBuf::from("pkg0/handler.py"),
            PathBuf::from("pkg1/handler.py"),
            PathBuf::from("pkg2/handler.py"),
        ]
    );

    let unlimited = locator
        .find_definition(&ctx, "handle", &temp_options(&dir))
        .await
        .unwrap();
    assert_eq!(unlimited.len(), 5);
}

#[tokio::test]
async fn test_context_lines_are_clamped() {
    let options = SearchOptions {
        context_lines: 3,
        language: Some(Language::Rust),
        ..fixture_options()
    };
    let results = DefinitionLocator::default()
        .find_definition(&SearchContext::new(), "MAX_USERS", &options)
        .await
        .unwrap();

    assert_eq!(results.len(), 1);
    assert_eq!(results[0].line, 3);
    let ctx = results[0].context.as_ref().unwrap();
    assert_eq!(ctx.start_line, 1);
    assert_eq!(ctx.before, vec!["//! Users.", ""]);
    assert_eq!(ctx.after.len(), 3);
}

// ===== Sample project =====

#[tokio::test]
async fn test_sample_project_spans_languages() {
    let results = DefinitionLocator::default()
        .find_definition(&SearchContext::new(), "User", &fixture_options())
        .await
        .unwrap();

    let found: Vec<(PathBuf, usize, Language)> = results
        .iter()
        .map(|r| (r.path.clone(), r.line, r.language))
        .collect();
    assert_eq!(
        found,
        vec![
            (PathBuf::from("user.go"), 21, Language::Go),
            (PathBuf::from("user.rs"), 5, Language::Rust),
        ]
    );
}

#[tokio::test]
async fn test_sample_project_reports_interfaces() {
    let results = DefinitionLocator::default()
        .find_definition(&SearchContext::new(), "UserRepository", &fixture_options())
        .await
        .unwrap();

    assert_eq!(results.len(), 2);
    assert!(results.iter().all(|r| r.kind == DefinitionKind::Interface));
}

#[tokio::test]
async fn test_sample_project_kinds() {
    let cases = [
        ("GetUser", "user.go", 46, DefinitionKind::Method),
        ("StatusSuspended", "user.go", 16, DefinitionKind::Const),
        ("MaxUsers", "user.go", 51, DefinitionKind::Const),
        ("DefaultPageSize", "user.go", 53, DefinitionKind::Var),
        ("get_user", "user.rs", 24, DefinitionKind::Function),
        ("MAX_PAGE_SIZE", "utils.py", 6, DefinitionKind::Const),
        ("get_account", "utils.py", 19, DefinitionKind::Function),
        ("AccountProps", "web/api.ts", 3, DefinitionKind::Interface),
        ("fetchAccount", "web/api.ts", 14, DefinitionKind::Function),
        ("slugify", "web/util.js", 9, DefinitionKind::Function),
    ];

    let locator = DefinitionLocator::default();
    let ctx = SearchContext::new();
    for (symbol, path, line, kind) in cases {
        let results = locator
            .find_definition(&ctx, symbol, &fixture_options())
            .await
            .unwrap_or_else(|e| panic!("{}: {}", symbol, e));
        assert_eq!(results.len(), 1, "{}", symbol);
        assert_eq!(results[0].path, PathBuf::from(path), "{}", symbol);
        assert_eq!(results[0].line, line, "{}", symbol);
        assert_eq!(results[0].kind, kind, "{}", symbol);
    }
}

#[tokio::test]
async fn test_sample_project_heuristic_misses() {
    let locator = DefinitionLocator::default();
    let ctx = SearchContext::new();
    for symbol in ["maxRetries", "total", "label"] {
        let err = locator
            .find_definition(&ctx, symbol, &fixture_options())
            .await
            .unwrap_err();
        assert!(err.is_not_found(), "{} should not be found", symbol);
    }
}

#[tokio::test]
async fn test_sample_project_skips_node_modules() {
    let results = DefinitionLocator::default()
        .find_definition(&SearchContext::new(), "debounce", &fixture_options())
        .await
        .unwrap();

    assert_eq!(results.len(), 1);
    assert_eq!(results[0].path, PathBuf::from("web/util.js"));
}

#[tokio::test]
async fn test_sample_project_test_files() {
    let locator = DefinitionLocator::default();
    let ctx = SearchContext::new();

    let results = locator
        .find_definition(&ctx, "formatAccount", &fixture_options())
        .await
        .unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].path, PathBuf::from("web/api.ts"));

    let options = SearchOptions {
        include_tests: true,
        ..fixture_options()
    };
    let results = locator
        .find_definition(&ctx, "formatAccount", &options)
        .await
        .unwrap();
    let paths: Vec<PathBuf> = results.into_iter().map(|r| r.path).collect();
    assert_eq!(
        paths,
        vec![PathBuf::from("web/api.test.ts"), PathBuf::from("web/api.ts")]
    );
}

// ===== Concurrency =====

#[tokio::test]
async fn test_results_independent_of_concurrency() {
    let dir = TempDir::new().unwrap();
    for i in 0..20 {
        write(
            &dir,
            &format!("mod{:02}/lib.rs", i),
            "use std::fmt;\n\npub fn render() -> String {\n    String::new()\n}\n",
        );
    }

    let ctx = SearchContext::new();
    let serial = DefinitionLocator::default()
        .with_concurrency(1)
        .find_definition(&ctx, "render", &temp_options(&dir))
        .await
        .unwrap();
    let parallel = DefinitionLocator::default()
        .with_concurrency(8)
        .find_definition(&ctx, "render", &temp_options(&dir))
        .await
        .unwrap();

    assert_eq!(serial.len(), 20);
    assert_eq!(serial, parallel);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_searches_share_registry() {
    let locator = Arc::new(DefinitionLocator::default());
    let mut handles = Vec::new();
    for _ in 0..8 {
        let locator = locator.clone();
        handles.push(tokio::spawn(async move {
            locator
                .find_definition(&SearchContext::new(), "User", &fixture_options())
                .await
                .map(|r| r.len())
        }));
    }

    for handle in handles {
        assert_eq!(handle.await.unwrap().unwrap(), 2);
    }
}

#[tokio::test]
async fn test_unknown_language_hint_is_not_found() {
    let options = SearchOptions {
        language: Some(Language::from_hint("cobol")),
        ..fixture_options()
    };
    let err = DefinitionLocator::default()
        .find_definition(&SearchContext::new(), "User", &options)
        .await
        .unwrap_err();
    assert!(err.is_not_found());
}
