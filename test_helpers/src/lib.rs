//! Test infrastructure shared across the survey pipeline workspace.
//!
//! Integration tests produce artifacts worth keeping around for manual
//! inspection: candidate lists, nearest-host JSON files, rendered report
//! tables. This crate gives every test the same two primitives for that:
//! workspace-root discovery (so tests behave the same regardless of which
//! crate invoked them) and a standardized `test_output/` directory.

use once_cell::sync::Lazy;
use std::env;
use std::path::{Path, PathBuf};

/// Errors raised while locating the workspace on disk.
#[derive(thiserror::Error, Debug)]
pub enum TestHelperError {
    /// No ancestor directory carries a `[workspace]` Cargo.toml. Usually
    /// means the test ran outside a checkout.
    #[error("Failed to find project root: {0}")]
    ProjectRootNotFound(String),
}

/// Locate the workspace root by walking up from the current directory
/// until a Cargo.toml containing a `[workspace]` section appears.
pub fn find_project_root() -> Result<PathBuf, TestHelperError> {
    let mut current_dir = env::current_dir().map_err(|e| {
        TestHelperError::ProjectRootNotFound(format!("Failed to get current directory: {}", e))
    })?;

    // Search for workspace Cargo.toml
    loop {
        let cargo_toml = current_dir.join("Cargo.toml");
        if cargo_toml.exists() {
            let content = std::fs::read_to_string(&cargo_toml).map_err(|e| {
                TestHelperError::ProjectRootNotFound(format!("Failed to read Cargo.toml: {}", e))
            })?;

            if content.contains("[workspace]") {
                return Ok(current_dir);
            }
        }

        if !current_dir.pop() {
            break;
        }
    }

    Err(TestHelperError::ProjectRootNotFound(
        "Workspace root not found".to_string(),
    ))
}

/// Workspace root, resolved once per process. Tests run concurrently, so
/// the lazy cell also serves as the synchronization point.
static PROJECT_ROOT: Lazy<PathBuf> =
    Lazy::new(|| find_project_root().expect("Failed to find project root directory"));

/// The shared `test_output/` directory at the workspace root, created on
/// first use. Artifacts written here survive the test run for inspection.
pub fn get_output_dir() -> PathBuf {
    let output_dir = PROJECT_ROOT.join("test_output");

    if !output_dir.exists() {
        std::fs::create_dir_all(&output_dir).expect("Failed to create output directory");
    }

    output_dir
}

/// Path of an artifact inside the test output directory.
pub fn output_path<P: AsRef<Path>>(path: P) -> PathBuf {
    get_output_dir().join(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_project_root_exists() {
        let root = find_project_root().expect("Failed to find project root");
        assert!(root.exists());
        assert!(root.join("Cargo.toml").exists());
    }

    #[test]
    fn test_output_dir_created() {
        let output = get_output_dir();
        assert!(output.exists());
        assert!(output.is_dir());
    }

    #[test]
    fn test_output_path() {
        let path = output_path("report.txt");
        assert_eq!(path, get_output_dir().join("report.txt"));
    }
}
