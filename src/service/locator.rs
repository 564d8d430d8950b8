//! Definition locator - walks a tree and reports where a symbol is declared.
//!
//! The walk itself runs on the calling task so it can stop between files.
//! Each candidate file is read and scanned on its own task, bounded by a
//! semaphore; results are put back into walk order before returning.

use dashmap::DashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, info};
use walkdir::{DirEntry, WalkDir};

use super::deadline::SearchContext;
use super::stats::{ScanSnapshot, ScanStats};
use crate::error::{Error, Result};
use crate::patterns::{compile, CompiledSearch, Language, LanguageProfile, Registry};
use crate::types::{ContextWindow, MatchResult};

/// Directories never descended into, besides hidden ones.
const IGNORED_DIRS: &[&str] = &[
    "node_modules",
    "vendor",
    "target",
    "dist",
    "build",
    "__pycache__",
    "venv",
];

/// Options for one search.
#[derive(Debug, Clone)]
pub struct SearchOptions {
    /// Restrict the search to one language; `None` infers it per file
    pub language: Option<Language>,
    /// Lines of context on each side of a match (0 = none)
    pub context_lines: usize,
    /// Scan files the language classifies as tests
    pub include_tests: bool,
    /// Directory to search
    pub root: PathBuf,
    /// Stop after this many matches (0 = unlimited)
    pub max_results: usize,
    /// Skip files larger than this many bytes
    pub max_file_size: u64,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            language: None,
            context_lines: 0,
            include_tests: false,
            root: PathBuf::from("."),
            max_results: 0,
            max_file_size: crate::DEFAULT_MAX_FILE_SIZE,
        }
    }
}

/// Matches plus the counters gathered while finding them.
#[derive(Debug, Clone)]
pub struct SearchOutcome {
    pub matches: Vec<MatchResult>,
    pub stats: ScanSnapshot,
}

/// Finds definition sites using a shared, read-only [`Registry`].
#[derive(Debug, Clone)]
pub struct DefinitionLocator {
    registry: Arc<Registry>,
    concurrency: usize,
}

impl Default for DefinitionLocator {
    fn default() -> Self {
        Self::new(Registry::shared())
    }
}

impl DefinitionLocator {
    pub fn new(registry: Arc<Registry>) -> Self {
        let concurrency = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(4);
        Self {
            registry,
            concurrency,
        }
    }

    /// Limit how many files are read at once.
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    pub fn registry(&self) -> &Arc<Registry> {
        &self.registry
    }

    /// Locate `symbol`, returning matches in walk order.
    ///
    /// Fails with [`Error::NotFound`] when nothing matched and with
    /// [`Error::Cancelled`] or [`Error::Timeout`] when `ctx` stops the walk.
    pub async fn find_definition(
        &self,
        ctx: &SearchContext,
        symbol: &str,
        opts: &SearchOptions,
    ) -> Result<Vec<MatchResult>> {
        self.search(ctx, symbol, opts).await.map(|o| o.matches)
    }

    /// Like [`find_definition`](Self::find_definition), also returning scan statistics.
    pub async fn search(
        &self,
        ctx: &SearchContext,
        symbol: &str,
        opts: &SearchOptions,
    ) -> Result<SearchOutcome> {
        ctx.check()?;

        let root = opts.root.as_path();
        match tokio::fs::metadata(root).await {
            Ok(meta) if meta.is_dir() => {}
            Ok(_) => {
                return Err(Error::InvalidPath(format!(
                    "{} is not a directory",
                    root.display()
                )))
            }
            Err(e) => return Err(Error::InvalidPath(format!("{}: {}", root.display(), e))),
        }

        debug!(
            "Searching for {:?} under {:?} (language: {})",
            symbol,
            root,
            opts.language.map_or("any", |l| l.tag())
        );

        let scanner = Arc::new(FileScanner {
            registry: self.registry.clone(),
            compiled: DashMap::new(),
            symbol: symbol.to_string(),
            context_lines: opts.context_lines,
            stats: ScanStats::new(),
        });

        if let Some(language) = opts.language {
            let compiled = compile(&self.registry, symbol, language);
            if compiled.is_empty() {
                debug!("No definition patterns for language {}", language);
                return Err(Error::not_found(symbol));
            }
            scanner.compiled.insert(language, Arc::new(compiled));
        }

        match self.walk(ctx, &scanner, opts).await {
            Ok(found) => scanner.finish(found, opts.max_results),
            Err(e) => {
                if e.is_cancellation() {
                    info!("Search for {:?} stopped: {}", symbol, e);
                }
                Err(e)
            }
        }
    }

    async fn walk(
        &self,
        ctx: &SearchContext,
        scanner: &Arc<FileScanner>,
        opts: &SearchOptions,
    ) -> Result<Vec<(usize, Vec<MatchResult>)>> {
        let root = opts.root.as_path();
        let semaphore = Arc::new(Semaphore::new(self.concurrency));
        let mut tasks: JoinSet<(usize, Vec<MatchResult>)> = JoinSet::new();
        let mut found = Vec::new();
        let mut ordinal = 0;

        let walker = WalkDir::new(root)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| !is_ignored_dir(e));

        for entry in walker {
            ctx.check()?;

            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    debug!("Cannot walk entry: {}", e);
                    scanner.stats.inc_read_errors();
                    continue;
                }
            };
            if !entry.file_type().is_file() {
                continue;
            }

            let language = Language::from_path(entry.path());
            if !language.is_known() || opts.language.is_some_and(|want| want != language) {
                continue;
            }
            let Some(profile) = self.registry.profile_for(language) else {
                continue;
            };
            scanner.stats.inc_considered();

            let relative = entry
                .path()
                .strip_prefix(root)
                .unwrap_or(entry.path())
                .to_path_buf();

            if !opts.include_tests && profile.is_test_file(&relative) {
                debug!("Skipping test file: {:?}", relative);
                scanner.stats.inc_skipped_tests();
                continue;
            }

            match entry.metadata() {
                Ok(meta) if meta.len() > opts.max_file_size => {
                    debug!("Skipping large file: {:?} ({} bytes)", relative, meta.len());
                    scanner.stats.inc_skipped_large();
                    continue;
                }
                Ok(_) => {}
                Err(e) => {
                    debug!("Cannot stat {:?}: {}", relative, e);
                    scanner.stats.inc_read_errors();
                    continue;
                }
            }

            let permit = tokio::select! {
                biased;
                err = ctx.done() => return Err(err),
                permit = semaphore.clone().acquire_owned() => {
                    permit.map_err(|e| Error::Internal(e.to_string()))?
                }
            };

            let job = FileJob {
                ordinal,
                path: entry.into_path(),
                relative,
                language,
            };
            ordinal += 1;

            let scanner = scanner.clone();
            tasks.spawn(async move {
                let _permit = permit;
                let matches = scanner.scan_file(&job).await;
                (job.ordinal, matches)
            });

            while let Some(joined) = tasks.try_join_next() {
                found.push(joined.map_err(|e| Error::Internal(format!("scan task failed: {}", e)))?);
            }
        }

        loop {
            let joined = tokio::select! {
                biased;
                err = ctx.done() => return Err(err),
                joined = tasks.join_next() => joined,
            };
            match joined {
                Some(joined) => found.push(
                    joined.map_err(|e| Error::Internal(format!("scan task failed: {}", e)))?,
                ),
                None => break,
            }
        }

        Ok(found)
    }
}

/// One candidate file, numbered in walk order.
struct FileJob {
    ordinal: usize,
    path: PathBuf,
    relative: PathBuf,
    language: Language,
}

/// State shared by the per-file tasks of one search.
struct FileScanner {
    registry: Arc<Registry>,
    compiled: DashMap<Language, Arc<CompiledSearch>>,
    symbol: String,
    context_lines: usize,
    stats: ScanStats,
}

impl FileScanner {
    /// Compiled patterns for `language`, built on first use.
    fn compiled_for(&self, language: Language) -> Arc<CompiledSearch> {
        if let Some(hit) = self.compiled.get(&language) {
            return hit.value().clone();
        }
        self.compiled
            .entry(language)
            .or_insert_with(|| Arc::new(compile(&self.registry, &self.symbol, language)))
            .value()
            .clone()
    }

    async fn scan_file(&self, job: &FileJob) -> Vec<MatchResult> {
        let Some(profile) = self.registry.profile_for(job.language) else {
            return Vec::new();
        };
        let compiled = self.compiled_for(job.language);
        if compiled.is_empty() {
            return Vec::new();
        }

        let bytes = match tokio::fs::read(&job.path).await {
            Ok(bytes) => bytes,
            Err(e) => {
                debug!("Failed to read {:?}: {}", job.relative, e);
                self.stats.inc_read_errors();
                return Vec::new();
            }
        };
        self.stats.inc_scanned();

        let content = String::from_utf8_lossy(&bytes);
        self.stats.add_lines(content.lines().count() as u64);
        scan_source(&content, &compiled, profile, &job.relative, self.context_lines)
    }

    fn finish(
        &self,
        mut found: Vec<(usize, Vec<MatchResult>)>,
        max_results: usize,
    ) -> Result<SearchOutcome> {
        found.sort_by_key(|(ordinal, _)| *ordinal);
        let mut matches: Vec<MatchResult> = found.into_iter().flat_map(|(_, m)| m).collect();
        self.stats.add_matches(matches.len() as u64);

        if max_results > 0 {
            matches.truncate(max_results);
        }

        let stats = self.stats.snapshot();
        debug!(
            "Scanned {} of {} files ({} tests skipped, {} too large, {} unreadable), {} matches",
            stats.files_scanned,
            stats.files_considered,
            stats.files_skipped_tests,
            stats.files_skipped_large,
            stats.read_errors,
            stats.matches
        );

        if matches.is_empty() {
            return Err(Error::not_found(self.symbol.as_str()));
        }
        Ok(SearchOutcome { matches, stats })
    }
}

fn is_ignored_dir(entry: &DirEntry) -> bool {
    entry.depth() > 0
        && entry.file_type().is_dir()
        && entry
            .file_name()
            .to_str()
            .is_some_and(|name| name.starts_with('.') || IGNORED_DIRS.contains(&name))
}

/// Scan one file's contents for definitions of `compiled.symbol()`.
///
/// Each line is attributed to at most one kind: the first matching
/// pattern wins, refined by the profile's generic rules when one of them
/// names the symbol.
pub fn scan_source(
    content: &str,
    compiled: &CompiledSearch,
    profile: &LanguageProfile,
    path: &Path,
    context_lines: usize,
) -> Vec<MatchResult> {
    let lines: Vec<&str> = content.lines().collect();
    let mut group = None;
    let mut results = Vec::new();

    for (index, line) in lines.iter().enumerate() {
        if group.is_some() {
            if profile.closes_group(line) {
                group = None;
                continue;
            }
        } else if let Some(kind) = profile.group_opened_by(line) {
            group = Some(kind);
            continue;
        }

        let Some(pattern) = compiled.match_line(line, group) else {
            continue;
        };
        let kind = profile
            .refine_kind(line, compiled.symbol(), group)
            .unwrap_or(pattern.kind());

        results.push(MatchResult {
            path: path.to_path_buf(),
            line: index + 1,
            kind,
            language: profile.language(),
            text: line.to_string(),
            context: (context_lines > 0)
                .then(|| ContextWindow::around(&lines, index, context_lines)),
        });
    }

    results
}
