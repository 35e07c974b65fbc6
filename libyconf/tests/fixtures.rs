//! Test harness for the yconf parser against fixture files.
//!
//! Every .conf file in test/conf/ must parse, and its merged tree must equal
//! the JSON in test/json/ with the same stem. Each merged tree must also
//! survive an export and re-parse. Every .nay file in test/nay/ must fail,
//! with the message in the matching .error file when there is one.

use std::fs;
use std::path::{Path, PathBuf};

use libyconf::{encode, merge, parse_with_filename, to_value, Format, Tree};

/// Root test directory.
fn test_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .parent()
        .unwrap()
        .join("test")
}

/// All files matching `pattern` under the test root, sorted.
fn fixture_files(pattern: &str) -> Vec<PathBuf> {
    let pattern = test_root().join(pattern);
    let mut files: Vec<PathBuf> = glob::glob(&pattern.to_string_lossy())
        .unwrap()
        .flatten()
        .collect();
    files.sort();
    files
}

fn file_name(path: &Path) -> String {
    path.file_name().unwrap().to_string_lossy().to_string()
}

/// Read the file with the same stem from a sibling fixture directory.
fn read_expected(path: &Path, subdir: &str, ext: &str) -> Option<String> {
    let stem = path.file_stem().unwrap().to_string_lossy();
    let expected = test_root().join(subdir).join(format!("{}.{}", stem, ext));
    fs::read_to_string(expected).ok()
}

fn load(path: &Path) -> Result<Tree, String> {
    let content = fs::read_to_string(path).map_err(|e| format!("Failed to read: {}", e))?;
    let documents = parse_with_filename(&content, Some(path))
        .map_err(|e| format!("Unexpected parse error: {}", e))?;
    Ok(merge(&documents))
}

/// Run a single .conf test file.
fn run_conf_test(path: &Path) -> Result<(), String> {
    let filename = file_name(path);
    let tree = load(path).map_err(|e| format!("{}: {}", filename, e))?;

    match read_expected(path, "json", "json") {
        Some(expected_json) => {
            let expected: serde_json::Value = serde_json::from_str(&expected_json)
                .map_err(|e| format!("{}: Bad expected JSON: {}", filename, e))?;
            let actual = to_value(tree.root());
            if actual != expected {
                return Err(format!(
                    "{}: Output mismatch\n    expected: {}\n    actual:   {}",
                    filename, expected, actual
                ));
            }
            println!("  {} => {}", filename, encode(tree.root(), Format::Json));
        }
        None => println!("  {} => {:?} (no expected output)", filename, tree.root()),
    }
    Ok(())
}

/// Export a fixture's tree and read it back.
fn run_round_trip_test(path: &Path) -> Result<(), String> {
    let filename = file_name(path);
    let tree = load(path).map_err(|e| format!("{}: {}", filename, e))?;
    let exported = tree
        .export()
        .map_err(|e| format!("{}: Export failed: {}", filename, e))?;
    let reparsed: Tree = exported
        .parse()
        .map_err(|e| format!("{}: Export does not parse: {}\n{}", filename, e, exported))?;
    if reparsed != tree {
        return Err(format!(
            "{}: Round trip mismatch\n    exported:\n{}\n    reparsed: {:?}",
            filename,
            exported,
            reparsed.root()
        ));
    }
    Ok(())
}

/// Run a single .nay test file (expected to fail with specific error).
fn run_nay_test(path: &Path) -> Result<(), String> {
    let content = fs::read_to_string(path).map_err(|e| format!("Failed to read: {}", e))?;
    let filename = file_name(path);

    // Parse with the bare filename so messages don't depend on the checkout.
    match parse_with_filename(&content, Some(Path::new(&filename))) {
        Ok(documents) => Err(format!(
            "{}: Expected parse error, but got success: {:?}",
            filename, documents
        )),
        Err(e) => {
            let actual_error = e.to_string();
            match read_expected(path, "nay", "error") {
                Some(expected) if actual_error == expected.trim() => {
                    println!("  {} => error (as expected)", filename);
                    Ok(())
                }
                Some(expected) => Err(format!(
                    "{}: Error mismatch\n    expected: {}\n    actual:   {}",
                    filename,
                    expected.trim(),
                    actual_error
                )),
                None => {
                    println!(
                        "  {} => error: {} (no .error file to compare)",
                        filename, actual_error
                    );
                    Ok(())
                }
            }
        }
    }
}

/// Run `test` over every file, reporting all failures at once.
fn run_all(kind: &str, files: &[PathBuf], test: fn(&Path) -> Result<(), String>) {
    assert!(!files.is_empty(), "No {} test files found!", kind);
    println!("\nRunning {} {} test files:", files.len(), kind);

    let errors: Vec<String> = files.iter().filter_map(|f| test(f.as_path()).err()).collect();

    println!(
        "\nResults: {} passed, {} failed",
        files.len() - errors.len(),
        errors.len()
    );
    if !errors.is_empty() {
        println!("\nErrors:");
        for error in &errors {
            println!("  - {}", error);
        }
    }

    assert!(errors.is_empty(), "{} {} tests failed", errors.len(), kind);
}

#[test]
fn test_all_conf_fixtures() {
    run_all(".conf", &fixture_files("conf/*.conf"), run_conf_test);
}

#[test]
fn test_all_nay_fixtures() {
    run_all(".nay", &fixture_files("nay/*.nay"), run_nay_test);
}

#[test]
fn test_round_trip_all_conf_fixtures() {
    run_all("round trip", &fixture_files("conf/*.conf"), run_round_trip_test);
}

#[test]
fn test_every_conf_fixture_has_json() {
    for path in fixture_files("conf/*.conf") {
        assert!(
            read_expected(&path, "json", "json").is_some(),
            "{} has no expected JSON",
            file_name(&path)
        );
    }
}
