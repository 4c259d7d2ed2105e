//! Audit orchestrator: discovers files, walks them and notifies listeners.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc};

use rayon::prelude::*;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::config::{Config, ConfigError};
use crate::diagnostic::{CheckIdentity, Diagnostic, DiagnosticCollector, Severity};
use crate::filter::{AuditEvent, Filter, FilterChain};
use crate::listener::{AuditListener, RecordingListener, SeverityCounter};
use crate::messages::{MessageBundle, IO_ERROR_KEY, PARSE_ERROR_KEY};
use crate::parser::{AstDumpParser, ParseError, Parser};
use crate::report::AuditReport;
use crate::tree::Tree;
use crate::walker::{CheckFault, TreeWalker, WalkerFactory};

/// Errors that stop an audit before or between files.
#[derive(Debug, Error)]
pub enum AuditError {
    /// IO error during discovery.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Glob pattern error.
    #[error("Invalid glob pattern: {0}")]
    Glob(#[from] glob::PatternError),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The worker pool could not be created.
    #[error("Failed to start worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

/// Cooperative cancellation flag, checked between files.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    /// Creates an uncancelled token.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests cancellation.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    /// Returns true once cancellation was requested.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Summary of one [`Auditor::process`] call.
#[derive(Debug, Default)]
pub struct AuditOutcome {
    /// Diagnostics at or above the threshold plus exceptions.
    pub error_count: usize,
    /// Files fully processed.
    pub files_processed: usize,
    /// True if the run stopped early.
    pub cancelled: bool,
    /// Everything that was reported.
    pub report: AuditReport,
}

/// Why a file produced no tree.
#[derive(Debug, Error)]
enum FileFailure {
    #[error("{0}")]
    Io(std::io::Error),
    #[error(transparent)]
    Parse(ParseError),
    #[error("walker setup failed: {0}")]
    Setup(String),
}

/// Everything produced for one file, ready for the listeners.
struct FileResult {
    path: PathBuf,
    diagnostics: Vec<Diagnostic>,
    failure: Option<(Diagnostic, FileFailure)>,
    faults: Vec<CheckFault>,
}

impl FileResult {
    fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
            diagnostics: Vec::new(),
            failure: None,
            faults: Vec::new(),
        }
    }

    fn setup_failed(path: &Path, error: &ConfigError) -> Self {
        let diagnostic = Diagnostic::file_level(
            IO_ERROR_KEY,
            vec![error.to_string()],
            Severity::Error,
            CheckIdentity::named("Auditor"),
        );
        Self {
            failure: Some((diagnostic, FileFailure::Setup(error.to_string()))),
            ..Self::new(path)
        }
    }
}

/// Per-file stage shared by workers: read, parse, walk, flush.
///
/// Read and parse failures and check faults go through the same filter
/// chain as check diagnostics, so a suppression rule can silence them.
struct FileStage<'a> {
    parser: &'a dyn Parser,
    filters: &'a FilterChain,
}

impl FileStage<'_> {
    fn run(&self, walker: &mut TreeWalker, path: &Path) -> FileResult {
        debug!("Auditing: {}", path.display());
        let mut result = FileResult::new(path);

        let tree = match self.read_and_parse(path) {
            Ok(tree) => tree,
            Err((diagnostic, failure)) => {
                if self.accepts(path, &diagnostic, walker.bundle()) {
                    result.failure = Some((diagnostic, failure));
                } else {
                    debug!("Failure in {} suppressed: {}", path.display(), failure);
                }
                return result;
            }
        };

        let outcome = walker.walk(path, &tree);
        if outcome.suppressed > 0 {
            debug!(
                "{} diagnostic(s) suppressed by comments in {}",
                outcome.suppressed,
                path.display()
            );
        }
        let mut collector = DiagnosticCollector::new();
        collector.record_all(outcome.diagnostics);
        result.diagnostics = collector.flush(path, self.filters, walker.bundle());
        result.faults = outcome
            .faults
            .into_iter()
            .filter(|fault| self.accepts(path, &fault.to_diagnostic(), walker.bundle()))
            .collect();
        result
    }

    fn read_and_parse(&self, path: &Path) -> Result<Tree, (Diagnostic, FileFailure)> {
        let source = std::fs::read_to_string(path).map_err(|e| {
            warn!("Failed to read {}: {}", path.display(), e);
            let diagnostic = Diagnostic::file_level(
                IO_ERROR_KEY,
                vec![e.to_string()],
                Severity::Error,
                CheckIdentity::named("Auditor"),
            );
            (diagnostic, FileFailure::Io(e))
        })?;

        self.parser.parse(&source, path).map_err(|e| {
            warn!("Failed to parse {}: {}", path.display(), e);
            let diagnostic = Diagnostic::file_level(
                PARSE_ERROR_KEY,
                vec![e.to_string()],
                Severity::Error,
                CheckIdentity::named("Parser"),
            );
            (diagnostic, FileFailure::Parse(e))
        })
    }

    fn accepts(&self, path: &Path, diagnostic: &Diagnostic, bundle: &MessageBundle) -> bool {
        if self.filters.is_empty() {
            return true;
        }
        let message = bundle.format(diagnostic);
        self.filters.accept(&AuditEvent {
            file: path,
            diagnostic,
            message: &message,
        })
    }
}

/// Builder for configuring an [`Auditor`].
#[derive(Default)]
pub struct AuditorBuilder {
    root: Option<PathBuf>,
    exclude_patterns: Vec<String>,
    extensions: Vec<String>,
    config: Option<Config>,
    parser: Option<Box<dyn Parser>>,
    walker: Option<TreeWalker>,
    factory: Option<Arc<WalkerFactory>>,
    filters: FilterChain,
    listeners: Vec<Box<dyn AuditListener>>,
    parallelism: Option<usize>,
    fail_on: Option<Severity>,
    cancellation: Option<CancellationToken>,
}

impl AuditorBuilder {
    /// Creates a new builder with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the root directory to audit.
    #[must_use]
    pub fn root(mut self, path: impl Into<PathBuf>) -> Self {
        self.root = Some(path.into());
        self
    }

    /// Adds an exclude glob pattern.
    #[must_use]
    pub fn exclude(mut self, pattern: impl Into<String>) -> Self {
        self.exclude_patterns.push(pattern.into());
        self
    }

    /// Adds multiple exclude glob patterns.
    #[must_use]
    pub fn excludes<I, S>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.exclude_patterns
            .extend(patterns.into_iter().map(Into::into));
        self
    }

    /// Adds a file extension to audit (without the dot).
    #[must_use]
    pub fn extension(mut self, extension: impl Into<String>) -> Self {
        self.extensions.push(extension.into());
        self
    }

    /// Sets the configuration. Its audit settings, threshold and
    /// suppression rules apply unless set explicitly on the builder.
    #[must_use]
    pub fn config(mut self, config: Config) -> Self {
        self.config = Some(config);
        self
    }

    /// Sets the parser (default: [`AstDumpParser`]).
    #[must_use]
    pub fn parser(mut self, parser: impl Parser + 'static) -> Self {
        self.parser = Some(Box::new(parser));
        self
    }

    /// Sets the walker used for sequential runs.
    #[must_use]
    pub fn walker(mut self, walker: TreeWalker) -> Self {
        self.walker = Some(walker);
        self
    }

    /// Sets a factory that builds one walker per worker.
    #[must_use]
    pub fn walker_factory<F>(mut self, factory: F) -> Self
    where
        F: Fn() -> Result<TreeWalker, ConfigError> + Send + Sync + 'static,
    {
        self.factory = Some(Arc::new(factory));
        self
    }

    /// Appends a filter after the configured suppression rules.
    #[must_use]
    pub fn filter(mut self, filter: impl Filter + 'static) -> Self {
        self.filters.push(filter);
        self
    }

    /// Adds a listener. Listeners are notified in registration order.
    #[must_use]
    pub fn listener(mut self, listener: impl AuditListener + 'static) -> Self {
        self.listeners.push(Box::new(listener));
        self
    }

    /// Walks files on `threads` workers. Needs a walker factory.
    ///
    /// Listeners still receive every file's events in input order, on the
    /// calling thread. `file_started` fires when that file's results are
    /// handed over, so reading and parsing may already have happened.
    #[must_use]
    pub fn parallelism(mut self, threads: usize) -> Self {
        self.parallelism = Some(threads);
        self
    }

    /// Lowest severity counted toward the error count.
    #[must_use]
    pub fn fail_on(mut self, severity: Severity) -> Self {
        self.fail_on = Some(severity);
        self
    }

    /// Sets the cancellation token.
    #[must_use]
    pub fn cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = Some(token);
        self
    }

    /// Builds the auditor. Every configuration error surfaces here, before
    /// any file is read.
    ///
    /// # Errors
    ///
    /// Returns an error if the current directory cannot be read, a
    /// suppression rule is invalid, or the walker factory fails.
    pub fn build(self) -> Result<Auditor, AuditError> {
        let root = self
            .root
            .or_else(|| self.config.as_ref().map(|c| c.audit.root.clone()))
            .unwrap_or_else(|| PathBuf::from("."));
        let root = if root.is_absolute() {
            root
        } else {
            std::env::current_dir()?.join(&root)
        };

        let mut exclude_patterns = self.exclude_patterns;
        let mut extensions = self.extensions;
        let mut filters = FilterChain::new();
        if let Some(ref config) = self.config {
            exclude_patterns.extend(config.audit.exclude.clone());
            if extensions.is_empty() {
                extensions.extend(config.audit.extensions.clone());
            }
            filters = config.filter_chain()?;
        }
        if exclude_patterns.is_empty() {
            exclude_patterns.push("**/target/**".to_string());
        }
        if extensions.is_empty() {
            extensions.push("ast".to_string());
        }
        for filter in self.filters.into_filters() {
            filters.push_boxed(filter);
        }

        let allow_range = self.config.as_ref().and_then(|c| c.audit.allow_range);
        let mut walker = match (self.walker, &self.factory) {
            (Some(walker), _) => walker,
            (None, Some(factory)) => factory()?,
            (None, None) => TreeWalker::new(),
        };
        if let Some(lines) = allow_range {
            walker.set_allow_range(lines);
        }
        let parallelism = self
            .parallelism
            .or_else(|| self.config.as_ref().and_then(|c| c.audit.parallelism))
            .filter(|&threads| threads > 1 && self.factory.is_some());
        let fail_on = self
            .fail_on
            .or_else(|| self.config.as_ref().map(Config::fail_on))
            .unwrap_or(Severity::Error);

        info!(
            checks = walker.check_count(),
            filters = filters.len(),
            "auditor ready"
        );
        Ok(Auditor {
            root,
            exclude_patterns,
            extensions,
            parser: self.parser.unwrap_or_else(|| Box::new(AstDumpParser)),
            walker,
            factory: self.factory,
            filters,
            listeners: self.listeners,
            parallelism,
            fail_on,
            allow_range,
            cancellation: self.cancellation.unwrap_or_default(),
        })
    }
}

/// Runs checks over a set of files.
///
/// Use [`Auditor::builder()`] to construct an instance.
pub struct Auditor {
    root: PathBuf,
    exclude_patterns: Vec<String>,
    extensions: Vec<String>,
    parser: Box<dyn Parser>,
    walker: TreeWalker,
    factory: Option<Arc<WalkerFactory>>,
    filters: FilterChain,
    listeners: Vec<Box<dyn AuditListener>>,
    parallelism: Option<usize>,
    fail_on: Severity,
    allow_range: Option<i64>,
    cancellation: CancellationToken,
}

impl Auditor {
    /// Creates a new builder for configuring an auditor.
    #[must_use]
    pub fn builder() -> AuditorBuilder {
        AuditorBuilder::new()
    }

    /// Returns the root directory being audited.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Returns the number of registered checks.
    #[must_use]
    pub fn check_count(&self) -> usize {
        self.walker.check_count()
    }

    /// Token for cancelling a running audit.
    #[must_use]
    pub fn cancellation(&self) -> CancellationToken {
        self.cancellation.clone()
    }

    /// Discovers files under the root, sorted by path.
    ///
    /// # Errors
    ///
    /// Returns an error if a glob pattern is invalid or a directory cannot
    /// be read.
    pub fn discover_files(&self) -> Result<Vec<PathBuf>, AuditError> {
        let mut files = Vec::new();
        for extension in &self.extensions {
            let pattern = format!("{}/**/*.{extension}", self.root.display());
            for entry in glob::glob(&pattern)? {
                let path = entry.map_err(|e| AuditError::Io(e.into_error()))?;
                if self.should_exclude(&path) {
                    debug!("Excluding: {}", path.display());
                    continue;
                }
                files.push(path);
            }
        }
        files.sort();
        files.dedup();
        Ok(files)
    }

    /// Checks if a path should be excluded.
    fn should_exclude(&self, path: &Path) -> bool {
        let path_str = path.to_string_lossy();
        let relative = path.strip_prefix(&self.root).unwrap_or(path);
        let relative_str = relative.to_string_lossy();

        for pattern in &self.exclude_patterns {
            if let Ok(glob_pattern) = glob::Pattern::new(pattern) {
                if glob_pattern.matches(&path_str) || glob_pattern.matches(&relative_str) {
                    return true;
                }
            }

            // Also check as substring for patterns like "**/target/**"
            let normalized_pattern = pattern.replace("**", "");
            if normalized_pattern.len() > 1 && path_str.contains(&normalized_pattern) {
                return true;
            }
        }

        false
    }

    /// Discovers files and processes them.
    ///
    /// # Errors
    ///
    /// See [`discover_files`](Self::discover_files) and [`process`](Self::process).
    pub fn run(&mut self) -> Result<AuditOutcome, AuditError> {
        let files = self.discover_files()?;
        info!("Found {} files to audit", files.len());
        self.process(&files)
    }

    /// Processes `files` in order and notifies listeners.
    ///
    /// Each file runs through `file_started`, read, parse, walk, flush and
    /// `file_finished` before the next one starts, so nothing of a file is
    /// kept once its listeners were notified. Cancellation is checked before
    /// every file, including from inside a listener.
    ///
    /// Read and parse failures are reported per file and never abort the
    /// run. The returned count covers diagnostics at or above the threshold
    /// plus exceptions.
    ///
    /// # Errors
    ///
    /// Returns an error only if the worker pool cannot be created.
    pub fn process(&mut self, files: &[PathBuf]) -> Result<AuditOutcome, AuditError> {
        info!("Starting audit of {} file(s) at {:?}", files.len(), self.root);
        let mut recorder = RecordingListener::new();
        let mut counter = SeverityCounter::new(self.fail_on);
        let mut files_processed = 0;

        {
            let mut listeners: Vec<&mut dyn AuditListener> = Vec::new();
            listeners.push(&mut counter);
            listeners.push(&mut recorder);
            listeners.extend(
                self.listeners
                    .iter_mut()
                    .map(|l| l.as_mut() as &mut dyn AuditListener),
            );
            for listener in &mut listeners {
                listener.audit_started();
            }

            let stage = FileStage {
                parser: self.parser.as_ref(),
                filters: &self.filters,
            };
            match (self.parallelism, &self.factory) {
                (Some(threads), Some(factory)) => {
                    let workers = Workers {
                        factory: factory.as_ref(),
                        allow_range: self.allow_range,
                        threads,
                    };
                    files_processed = workers.run(
                        &stage,
                        files,
                        &self.cancellation,
                        &mut listeners,
                        self.walker.bundle(),
                    )?;
                }
                _ => {
                    for path in files {
                        if self.cancellation.is_cancelled() {
                            break;
                        }
                        for listener in &mut listeners {
                            listener.file_started(path);
                        }
                        let result = stage.run(&mut self.walker, path);
                        report(&mut listeners, &result, self.walker.bundle());
                        files_processed += 1;
                    }
                }
            }

            for listener in &mut listeners {
                listener.audit_finished();
            }
        }

        let cancelled = files_processed < files.len();
        if cancelled {
            info!(
                "Audit cancelled after {} of {} file(s)",
                files_processed,
                files.len()
            );
        }
        let outcome = AuditOutcome {
            error_count: counter.count(),
            files_processed,
            cancelled,
            report: recorder.into_report(),
        };
        info!(
            "Audit complete: {} counted problem(s) in {} file(s)",
            outcome.error_count, outcome.files_processed
        );
        Ok(outcome)
    }
}

/// Worker pool settings for a parallel audit.
struct Workers<'a> {
    factory: &'a WalkerFactory,
    allow_range: Option<i64>,
    threads: usize,
}

impl Workers<'_> {
    fn walker(&self) -> Result<TreeWalker, ConfigError> {
        let mut walker = (self.factory)()?;
        if let Some(lines) = self.allow_range {
            walker.set_allow_range(lines);
        }
        Ok(walker)
    }

    /// Walks `files` on the pool and reports each result on the calling
    /// thread as soon as every earlier file was reported. Returns the number
    /// of files reported.
    fn run(
        &self,
        stage: &FileStage<'_>,
        files: &[PathBuf],
        cancellation: &CancellationToken,
        listeners: &mut [&mut dyn AuditListener],
        bundle: &MessageBundle,
    ) -> Result<usize, AuditError> {
        debug!("Walking files on {} workers", self.threads);
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.threads)
            .build()?;
        let (sender, receiver) = mpsc::sync_channel::<(usize, FileResult)>(self.threads);

        Ok(std::thread::scope(|scope| {
            scope.spawn(move || {
                pool.install(|| {
                    files.par_iter().enumerate().for_each_init(
                        || (sender.clone(), self.walker()),
                        |(sender, walker), (index, path)| {
                            if cancellation.is_cancelled() {
                                return;
                            }
                            let result = match walker {
                                Ok(walker) => stage.run(walker, path),
                                Err(e) => FileResult::setup_failed(path, e),
                            };
                            // fails only once reporting stopped
                            let _ = sender.send((index, result));
                        },
                    );
                });
            });

            let mut waiting: BTreeMap<usize, FileResult> = BTreeMap::new();
            let mut reported = 0;
            while reported < files.len() && !cancellation.is_cancelled() {
                if let Some(result) = waiting.remove(&reported) {
                    for listener in listeners.iter_mut() {
                        listener.file_started(&result.path);
                    }
                    report(listeners, &result, bundle);
                    reported += 1;
                    continue;
                }
                match receiver.recv() {
                    Ok((index, result)) => {
                        waiting.insert(index, result);
                    }
                    Err(_) => break,
                }
            }
            drop(receiver);
            reported
        }))
    }
}

/// Hands one file's failure, diagnostics and faults to the listeners, then
/// closes the file.
fn report(listeners: &mut [&mut dyn AuditListener], result: &FileResult, bundle: &MessageBundle) {
    let file = result.path.as_path();

    if let Some((diagnostic, cause)) = &result.failure {
        let message = bundle.format(diagnostic);
        let event = AuditEvent {
            file,
            diagnostic,
            message: &message,
        };
        for listener in listeners.iter_mut() {
            listener.add_exception(&event, cause);
        }
    }

    for diagnostic in &result.diagnostics {
        let message = bundle.format(diagnostic);
        let event = AuditEvent {
            file,
            diagnostic,
            message: &message,
        };
        for listener in listeners.iter_mut() {
            listener.add_error(&event);
        }
    }

    for fault in &result.faults {
        let diagnostic = fault.to_diagnostic();
        let message = bundle.format(&diagnostic);
        let event = AuditEvent {
            file,
            diagnostic: &diagnostic,
            message: &message,
        };
        for listener in listeners.iter_mut() {
            listener.add_exception(&event, fault);
        }
    }

    for listener in listeners.iter_mut() {
        listener.file_finished(file);
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;

    type Events = Arc<Mutex<Vec<String>>>;

    fn name(path: &Path) -> String {
        path.file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    /// Dump parser that records every file it parses.
    struct TracingParser(Events);

    impl Parser for TracingParser {
        fn parse(&self, source: &str, path: &Path) -> Result<Tree, ParseError> {
            self.0.lock().unwrap().push(format!("parse:{}", name(path)));
            AstDumpParser.parse(source, path)
        }
    }

    /// Records file events and cancels the audit after `stop_after` files.
    struct StoppingListener {
        events: Events,
        token: CancellationToken,
        stop_after: usize,
        finished: usize,
    }

    impl AuditListener for StoppingListener {
        fn file_started(&mut self, file: &Path) {
            self.events.lock().unwrap().push(format!("started:{}", name(file)));
        }

        fn file_finished(&mut self, file: &Path) {
            self.events.lock().unwrap().push(format!("finished:{}", name(file)));
            self.finished += 1;
            if self.finished == self.stop_after {
                self.token.cancel();
            }
        }
    }

    fn tree_files(dir: &Path, names: &[&str]) -> Vec<PathBuf> {
        names
            .iter()
            .map(|n| {
                let path = dir.join(n);
                std::fs::write(&path, "COMPILATION_UNIT -> COMPILATION_UNIT [1:0]\n").unwrap();
                path
            })
            .collect()
    }

    fn stopping_auditor(dir: &Path, events: &Events, stop_after: usize, threads: usize) -> Auditor {
        let token = CancellationToken::new();
        let mut builder = Auditor::builder()
            .root(dir)
            .parser(TracingParser(Arc::clone(events)))
            .cancellation(token.clone())
            .listener(StoppingListener {
                events: Arc::clone(events),
                token,
                stop_after,
                finished: 0,
            });
        if threads > 1 {
            builder = builder
                .walker_factory(|| Ok(TreeWalker::new()))
                .parallelism(threads);
        }
        builder.build().unwrap()
    }

    fn listener_events(events: &Events) -> Vec<String> {
        events
            .lock()
            .unwrap()
            .iter()
            .filter(|e| !e.starts_with("parse:"))
            .cloned()
            .collect()
    }

    #[test]
    fn test_builder() {
        let auditor = Auditor::builder()
            .root(".")
            .exclude("**/target/**")
            .build()
            .expect("Failed to build auditor");

        assert!(auditor.root().exists());
        assert_eq!(auditor.check_count(), 0);
    }

    #[test]
    fn test_exclude_patterns() {
        let auditor = Auditor::builder()
            .root("/foo")
            .exclude("**/target/**")
            .exclude("**/generated/**")
            .build()
            .expect("Failed to build auditor");

        assert!(auditor.should_exclude(Path::new("/foo/target/debug/A.ast")));
        assert!(auditor.should_exclude(Path::new("/foo/generated/B.ast")));
        assert!(!auditor.should_exclude(Path::new("/foo/src/C.ast")));
    }

    #[test]
    fn discovery_is_sorted_and_filtered_by_extension() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("b")).unwrap();
        std::fs::create_dir_all(dir.path().join("target")).unwrap();
        for name in ["b/Z.ast", "A.ast", "notes.txt", "target/T.ast"] {
            std::fs::write(dir.path().join(name), "").unwrap();
        }

        let auditor = Auditor::builder().root(dir.path()).build().unwrap();
        let files = auditor.discover_files().unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|p| p.strip_prefix(dir.path()).unwrap().to_path_buf())
            .collect();
        assert_eq!(names, vec![PathBuf::from("A.ast"), PathBuf::from("b/Z.ast")]);
    }

    #[test]
    fn unreadable_and_unparsable_files_are_reported_not_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let bad = dir.path().join("Bad.ast");
        std::fs::write(&bad, "not a tree").unwrap();
        let missing = dir.path().join("Missing.ast");

        let mut auditor = Auditor::builder().root(dir.path()).build().unwrap();
        let outcome = auditor.process(&[missing, bad]).unwrap();
        assert_eq!(outcome.files_processed, 2);
        assert_eq!(outcome.error_count, 2);
        let keys: Vec<&str> = outcome
            .report
            .exceptions()
            .map(|(_, d)| d.key.as_str())
            .collect();
        assert_eq!(keys, vec![IO_ERROR_KEY, PARSE_ERROR_KEY]);
    }

    #[test]
    fn cancellation_stops_between_files() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("A.ast");
        std::fs::write(&file, "COMPILATION_UNIT -> COMPILATION_UNIT [1:0]\n").unwrap();

        let token = CancellationToken::new();
        let mut auditor = Auditor::builder()
            .root(dir.path())
            .cancellation(token.clone())
            .build()
            .unwrap();
        token.cancel();
        let outcome = auditor.process(&[file.clone(), file]).unwrap();
        assert!(outcome.cancelled);
        assert_eq!(outcome.files_processed, 0);
    }

    #[test]
    fn each_file_is_parsed_between_its_start_and_finish() {
        let dir = tempfile::tempdir().unwrap();
        let files = tree_files(dir.path(), &["A.ast", "B.ast"]);
        let events = Events::default();

        let outcome = stopping_auditor(dir.path(), &events, usize::MAX, 1)
            .process(&files)
            .unwrap();
        assert_eq!(outcome.files_processed, 2);
        assert!(!outcome.cancelled);
        assert_eq!(
            *events.lock().unwrap(),
            vec![
                "started:A.ast",
                "parse:A.ast",
                "finished:A.ast",
                "started:B.ast",
                "parse:B.ast",
                "finished:B.ast",
            ]
        );
    }

    #[test]
    fn listener_can_cancel_after_first_file() {
        let dir = tempfile::tempdir().unwrap();
        let files = tree_files(dir.path(), &["A.ast", "B.ast", "C.ast"]);
        let events = Events::default();

        let outcome = stopping_auditor(dir.path(), &events, 1, 1)
            .process(&files)
            .unwrap();
        assert!(outcome.cancelled);
        assert_eq!(outcome.files_processed, 1);
        assert_eq!(outcome.report.files_checked, 1);
        assert_eq!(
            *events.lock().unwrap(),
            vec!["started:A.ast", "parse:A.ast", "finished:A.ast"]
        );
    }

    #[test]
    fn parallel_results_reach_listeners_in_input_order() {
        let dir = tempfile::tempdir().unwrap();
        let names = ["A.ast", "B.ast", "C.ast", "D.ast", "E.ast", "F.ast"];
        let files = tree_files(dir.path(), &names);
        let events = Events::default();

        let outcome = stopping_auditor(dir.path(), &events, usize::MAX, 3)
            .process(&files)
            .unwrap();
        assert_eq!(outcome.files_processed, names.len());
        let expected: Vec<String> = names
            .iter()
            .flat_map(|n| [format!("started:{n}"), format!("finished:{n}")])
            .collect();
        assert_eq!(listener_events(&events), expected);
    }

    #[test]
    fn parallel_listener_can_cancel_after_first_file() {
        let dir = tempfile::tempdir().unwrap();
        let files = tree_files(dir.path(), &["A.ast", "B.ast", "C.ast", "D.ast"]);
        let events = Events::default();

        let outcome = stopping_auditor(dir.path(), &events, 1, 2)
            .process(&files)
            .unwrap();
        assert!(outcome.cancelled);
        assert_eq!(outcome.files_processed, 1);
        assert_eq!(outcome.report.files_checked, 1);
        assert_eq!(listener_events(&events), vec!["started:A.ast", "finished:A.ast"]);
    }

    #[test]
    fn suppression_rules_apply_to_read_and_parse_failures() {
        let dir = tempfile::tempdir().unwrap();
        let bad = dir.path().join("Generated.ast");
        std::fs::write(&bad, "not a tree").unwrap();
        let missing = dir.path().join("Missing.ast");
        let config = Config::parse(
            r#"
[[suppress]]
files = "Generated\\.ast$"

[[suppress]]
message = "^Got an exception"
"#,
        )
        .unwrap();

        let mut auditor = Auditor::builder()
            .root(dir.path())
            .config(config)
            .build()
            .unwrap();
        let outcome = auditor.process(&[bad, missing]).unwrap();
        assert_eq!(outcome.files_processed, 2);
        assert_eq!(outcome.error_count, 0);
        assert_eq!(outcome.report.exceptions().count(), 0);
    }
}
