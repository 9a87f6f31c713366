//! Line-oriented regex search with match highlighting.

use colored::*;
use rayon::prelude::*;
use regex::{Regex, RegexBuilder};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use tracing::warn;

/// How the search pattern is interpreted.
#[derive(Debug, Clone, Copy, Default)]
pub struct SearchOptions {
    pub ignore_case: bool,
    /// Treat the pattern as a literal string.
    pub fixed_strings: bool,
}

/// A matching line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineMatch {
    /// Line number (1-indexed).
    pub line: usize,
    /// The line with surrounding whitespace removed.
    pub text: String,
    /// Byte ranges of matches within `text`.
    pub ranges: Vec<(usize, usize)>,
}

/// All matching lines of one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileMatches {
    pub file: String,
    pub matches: Vec<LineMatch>,
}

/// Compile the search pattern.
pub fn build_regex(pattern: &str, options: SearchOptions) -> anyhow::Result<Regex> {
    let source = if options.fixed_strings {
        regex::escape(pattern)
    } else {
        pattern.to_string()
    };
    RegexBuilder::new(&source)
        .case_insensitive(options.ignore_case)
        .build()
        .map_err(|e| anyhow::anyhow!("compiling pattern {:?}: {}", pattern, e))
}

/// Scan a single file for matching lines.
pub fn search_file(path: &Path, regex: &Regex) -> anyhow::Result<Vec<LineMatch>> {
    let file = File::open(path)?;
    let reader = BufReader::new(file);
    let mut matches = Vec::new();

    for (line_num, line_result) in reader.lines().enumerate() {
        let line = line_result?;
        let text = line.trim();
        let ranges: Vec<_> = regex
            .find_iter(text)
            .filter(|m| !m.is_empty())
            .map(|m| (m.start(), m.end()))
            .collect();
        if ranges.is_empty() {
            continue;
        }
        matches.push(LineMatch {
            line: line_num + 1,
            text: text.to_string(),
            ranges,
        });
    }

    Ok(matches)
}

/// Search files in parallel. Files without matches are omitted; unreadable
/// files are logged and skipped. Output order follows `files`.
pub fn search_files(base_dir: &Path, files: &[PathBuf], regex: &Regex) -> Vec<FileMatches> {
    files
        .par_iter()
        .filter_map(|path| match search_file(path, regex) {
            Ok(matches) if matches.is_empty() => None,
            Ok(matches) => Some(FileMatches {
                file: path
                    .strip_prefix(base_dir)
                    .unwrap_or(path)
                    .to_string_lossy()
                    .replace('\\', "/"),
                matches,
            }),
            Err(e) => {
                warn!("skipping {}: {}", path.display(), e);
                None
            }
        })
        .collect()
}

/// Render a line with its matches highlighted in green.
pub fn highlight(m: &LineMatch) -> String {
    let mut out = String::with_capacity(m.text.len());
    let mut last = 0;
    for &(start, end) in &m.ranges {
        out.push_str(&m.text[last..start]);
        out.push_str(&m.text[start..end].green().to_string());
        last = end;
    }
    out.push_str(&m.text[last..]);
    out
}

/// Print results grouped by file.
pub fn write_matches(results: &[FileMatches]) {
    for file in results {
        println!();
        println!("File: {}", file.file.bold());
        for m in &file.matches {
            println!(" Line {}: {}", m.line, highlight(m));
        }
    }
}
