//! Tests for the written view files.

use std::fs;
use std::path::PathBuf;

use pysummary::analysis::AnalysisContext;
use pysummary::config::{Config, OutputConfig};
use pysummary::{discover, report};
use tempfile::TempDir;

fn analyze_project() -> pysummary::AnalysisResult {
    pysummary::init();
    let root = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("testdata").join("project");
    let files = discover::collect_files(&root, &Config::default()).unwrap();
    AnalysisContext::new(&root).analyze_files(&files).unwrap()
}

#[test]
fn test_views_written_to_output_directory() {
    let temp = TempDir::new().unwrap();
    let output = OutputConfig {
        directory: temp.path().join("reports"),
        ..Default::default()
    };

    let result = analyze_project();
    let written = report::write_views(&result, &output).unwrap();
    let names: Vec<_> = written
        .iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
        .collect();
    assert_eq!(
        names,
        vec!["function_summaries.txt", "code_snippets.txt", "function_asts.txt"]
    );

    let summary = fs::read_to_string(&written[0]).unwrap();
    assert!(summary.starts_with("\nFile: app.py\n"));
    assert!(summary.contains(" - Function 'add' takes 2 arguments: a, b. Add two numbers.\n"));
    assert!(summary.contains(
        " - Function 'no_doc' takes 4 arguments: path, args, mode, kwargs. No docstring available.\n"
    ));
    assert!(summary.contains("\nFile: empty.py\n"));
    assert!(summary.contains("Skipped files:\n - broken.py: parse error: "));

    let snippets = fs::read_to_string(&written[1]).unwrap();
    assert!(snippets.contains("\nFunction: add\nCode:\ndef add(a, b):\n    \"Add two numbers.\"\n    return a + b\n"));

    let asts = fs::read_to_string(&written[2]).unwrap();
    assert!(asts.contains("\nFunction: inner\nAST: function_definition(name=identifier(\"inner\""));
}

#[test]
fn test_combined_view() {
    let temp = TempDir::new().unwrap();
    let output = OutputConfig {
        directory: temp.path().to_path_buf(),
        combined_file: Some("combined_output.txt".to_string()),
        ..Default::default()
    };

    let result = analyze_project();
    let written = report::write_views(&result, &output).unwrap();
    assert_eq!(written.len(), 1);

    let text = fs::read_to_string(&written[0]).unwrap();
    let summaries = text.find("=== Function Summaries ===").unwrap();
    let snippets = text.find("=== Code Snippets ===").unwrap();
    let asts = text.find("=== Abstract Syntax Trees (ASTs) ===").unwrap();
    assert!(summaries < snippets && snippets < asts);
}

#[test]
fn test_json_report_lists_failures() {
    let result = analyze_project();
    let value = serde_json::to_value(report::JsonReport::new("testdata/project", &result)).unwrap();

    assert_eq!(value["files_scanned"], 4);
    assert_eq!(value["failures"][0]["file"], "broken.py");
    assert_eq!(value["files"][2]["functions"][1]["qualified_name"], "outer.inner");
}
