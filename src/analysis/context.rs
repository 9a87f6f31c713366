//! Parallel analysis of a set of files.
//!
//! The AnalysisContext provides:
//! - Per-file read → parse → extract on a bounded rayon pool
//! - Aggregation of completed files through a single channel consumer
//! - Discovery-order results regardless of completion order

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::mpsc;

use indicatif::ProgressBar;
use rayon::prelude::*;
use tracing::{debug, info, warn};

use crate::analysis::{
    get_analyzer, get_analyzer_by_id, AnalysisError, AnalysisResult, FileFailure, FileReport,
};

/// Analyzer used for configured extensions that have no dedicated mapping.
const DEFAULT_LANGUAGE: &str = "python";

type Outcome = Result<FileReport, FileFailure>;

/// Analysis context for a set of files.
pub struct AnalysisContext {
    /// Base directory for file identifiers.
    base_dir: PathBuf,
    /// Worker threads; `None` uses one per core.
    jobs: Option<usize>,
    /// Ticked once per completed file.
    progress: Option<ProgressBar>,
}

impl AnalysisContext {
    /// Create a new analysis context.
    pub fn new<P: AsRef<Path>>(base_dir: P) -> Self {
        Self {
            base_dir: base_dir.as_ref().to_path_buf(),
            jobs: None,
            progress: None,
        }
    }

    /// Bound the worker pool.
    pub fn jobs(mut self, jobs: Option<usize>) -> Self {
        self.jobs = jobs.filter(|&n| n > 0);
        self
    }

    /// Report per-file completion on a progress bar.
    pub fn progress(mut self, bar: ProgressBar) -> Self {
        self.progress = Some(bar);
        self
    }

    /// Identifier of a file: its path relative to the base directory, with
    /// `/` separators.
    pub fn file_id(&self, path: &Path) -> String {
        let rel = path.strip_prefix(&self.base_dir).unwrap_or(path);
        let id = if rel.as_os_str().is_empty() {
            path.file_name().map(Path::new).unwrap_or(path)
        } else {
            rel
        };
        id.to_string_lossy().replace('\\', "/")
    }

    /// Read, parse and extract a single file.
    pub fn analyze_file(&self, path: &Path) -> Result<FileReport, AnalysisError> {
        let file = self.file_id(path);

        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
        // Every configured extension is Python source.
        let analyzer = get_analyzer(ext)
            .or_else(|| get_analyzer_by_id(DEFAULT_LANGUAGE))
            .ok_or_else(|| AnalysisError::Parse {
                file: file.clone(),
                message: format!("no analyzer for extension {:?}", ext),
                line: 1,
                column: 1,
            })?;

        let source = fs::read_to_string(path).map_err(|source| AnalysisError::Io {
            file: file.clone(),
            source,
        })?;
        let parsed = analyzer.parse(&file, source)?;
        let functions = analyzer.extract_functions(&parsed)?;

        debug!(file = %file, functions = functions.len(), "extracted");
        Ok(FileReport::new(file, functions))
    }

    /// Analyze files in parallel.
    ///
    /// Each worker sends its outcome over a channel; the calling thread is
    /// the only writer to the result and inserts in the order of `paths`.
    pub fn analyze_files(&self, paths: &[PathBuf]) -> anyhow::Result<AnalysisResult> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.jobs.unwrap_or(0))
            .build()?;
        info!(
            files = paths.len(),
            threads = pool.current_num_threads(),
            "analyzing"
        );

        let (tx, rx) = mpsc::channel::<(usize, Outcome)>();
        let mut result = AnalysisResult::new();

        std::thread::scope(|s| {
            s.spawn(move || {
                pool.install(|| {
                    paths
                        .par_iter()
                        .enumerate()
                        .for_each_with(tx, |tx, (index, path)| {
                            let outcome = self.analyze_file(path).map_err(|err| {
                                warn!("skipping {}: {}", path.display(), err);
                                FileFailure::from_error(self.file_id(path), &err)
                            });
                            // The receiver outlives every sender.
                            let _ = tx.send((index, outcome));
                        });
                });
            });

            let mut aggregator = Aggregator::new(&mut result);
            for (index, outcome) in rx {
                aggregator.accept(index, outcome);
                if let Some(bar) = &self.progress {
                    bar.inc(1);
                }
            }
        });

        if let Some(bar) = &self.progress {
            bar.finish_and_clear();
        }
        info!(
            files = result.files.len(),
            failed = result.failures.len(),
            functions = result.function_count(),
            "analysis complete"
        );
        Ok(result)
    }
}

/// Re-orders completed files into discovery order before inserting them.
struct Aggregator<'a> {
    result: &'a mut AnalysisResult,
    next: usize,
    pending: BTreeMap<usize, Outcome>,
}

impl<'a> Aggregator<'a> {
    fn new(result: &'a mut AnalysisResult) -> Self {
        Self {
            result,
            next: 0,
            pending: BTreeMap::new(),
        }
    }

    fn accept(&mut self, index: usize, outcome: Outcome) {
        self.pending.insert(index, outcome);
        while let Some(outcome) = self.pending.remove(&self.next) {
            match outcome {
                Ok(report) => self.result.aggregate(report),
                Err(failure) => self.result.record_failure(failure),
            }
            self.next += 1;
        }
    }
}
