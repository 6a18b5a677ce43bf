//! Shared test utilities for integration tests.
//!
//! Provides a development-mode site fixture and a bundler double that
//! records the jobs it receives instead of invoking esbuild.

#![allow(dead_code)]

use anyhow::Result;
use std::cell::RefCell;
use std::fs;
use std::path::Path;
use tempfile::TempDir;
use webdist::{BuildError, BundleJob, Bundler};

/// Development page matching the layout the build expects.
pub const INDEX_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <title>Demo</title>
  <link rel="stylesheet" href="reset.css">
  <link rel="stylesheet" href="styles.css">
  <link rel="preload" href="assets/lato.woff2" as="font">
</head>
<body>
  <div id="root"></div>
  <script src="vendors/babel.min.js"></script>
  <script src="vendors/react-with-dom.js"></script>
  <script type="text/babel">
    const App = () => <h1>Hello</h1>;
    ReactDOM.render(<App />, document.getElementById('root'));
  </script>
</body>
</html>
"#;

/// Writes file under `root`, creating parent directories as needed.
///
/// # Errors
///
/// Returns error if directory creation or file write fails
pub fn write_file(root: &Path, path: &str, content: &str) -> Result<()> {
    let file_path = root.join(path);
    if let Some(parent) = file_path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(file_path, content)?;
    Ok(())
}

/// Creates temporary site root with page, stylesheets, and static inputs.
///
/// # Errors
///
/// Returns error if any fixture file cannot be written
pub fn create_test_site() -> Result<TempDir> {
    let dir = TempDir::new()?;
    let root = dir.path();

    write_file(root, "index.html", INDEX_HTML)?;
    write_file(root, "reset.css", "* { margin: 0; }")?;
    write_file(root, "styles.css", "body { font-family: Lato; }")?;
    write_file(root, "lato.woff2", "wOF2")?;
    write_file(root, "assets/logo.svg", "<svg></svg>")?;
    write_file(root, "assets/img/hero.png", "png")?;
    write_file(root, "vendors/babel.min.js", "babel")?;
    write_file(root, "vendors/react-with-dom.js", "react")?;

    Ok(dir)
}

/// Bundler double that copies each entry to its outfile.
///
/// Jobs whose entry file name equals `fail_on` are rejected with a
/// [`BuildError::BundlingFailure`].
#[derive(Default)]
pub struct RecordingBundler {
    pub jobs: RefCell<Vec<BundleJob>>,
    pub fail_on: Option<&'static str>,
}

impl RecordingBundler {
    pub fn failing_on(name: &'static str) -> Self {
        Self {
            jobs: RefCell::default(),
            fail_on: Some(name),
        }
    }
}

impl Bundler for RecordingBundler {
    fn bundle(&self, job: &BundleJob) -> Result<(), BuildError> {
        self.jobs.borrow_mut().push(job.clone());

        let entry = job.entry();
        let is_failing = entry
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| Some(n) == self.fail_on);
        if is_failing {
            return Err(BuildError::BundlingFailure {
                entry: entry.to_path_buf(),
                reason: "rejected by test bundler".to_string(),
            });
        }

        let source = fs::read_to_string(entry).map_err(|e| BuildError::BundlingFailure {
            entry: entry.to_path_buf(),
            reason: e.to_string(),
        })?;
        fs::write(job.outfile(), source).map_err(|e| BuildError::BundlingFailure {
            entry: entry.to_path_buf(),
            reason: e.to_string(),
        })
    }
}
