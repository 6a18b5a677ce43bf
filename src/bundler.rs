//! Bundling through the esbuild command line.

use log::{debug, info};
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Command;

use crate::error::BuildError;

/// One bundler invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BundleJob {
    /// JSX entry point bundled with React globals and production defines.
    Script { entry: PathBuf, outfile: PathBuf },
    /// Single stylesheet minified in place of its source.
    Style { entry: PathBuf, outfile: PathBuf },
}

impl BundleJob {
    pub fn entry(&self) -> &Path {
        match self {
            Self::Script { entry, .. } | Self::Style { entry, .. } => entry,
        }
    }

    pub fn outfile(&self) -> &Path {
        match self {
            Self::Script { outfile, .. } | Self::Style { outfile, .. } => outfile,
        }
    }
}

/// Compiles a [`BundleJob`] into a single minified artifact on disk.
pub trait Bundler {
    /// Runs one job to completion.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError::BundlingFailure`] if the job cannot be bundled.
    fn bundle(&self, job: &BundleJob) -> Result<(), BuildError>;
}

/// [`Bundler`] backed by an `esbuild` executable.
#[derive(Debug, Clone)]
pub struct Esbuild {
    program: PathBuf,
}

impl Esbuild {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Builds the command line arguments for a job.
    ///
    /// Script jobs load `.js` as JSX with the classic `React.createElement`
    /// runtime and define `process.env.NODE_ENV` as production. Style jobs
    /// only minify.
    pub fn args(job: &BundleJob) -> Vec<OsString> {
        let mut args: Vec<OsString> = vec![job.entry().into()];

        match job {
            BundleJob::Script { .. } => {
                args.extend(
                    [
                        "--bundle",
                        "--minify",
                        "--tree-shaking=true",
                        "--loader:.js=jsx",
                        "--define:process.env.NODE_ENV=\"production\"",
                        "--jsx-factory=React.createElement",
                        "--jsx-fragment=React.Fragment",
                    ]
                    .map(OsString::from),
                );
            }
            BundleJob::Style { .. } => {
                args.extend(["--minify", "--loader:.css=css"].map(OsString::from));
            }
        }

        let mut outfile = OsString::from("--outfile=");
        outfile.push(job.outfile());
        args.push(outfile);
        args
    }
}

impl Default for Esbuild {
    fn default() -> Self {
        Self::new("esbuild")
    }
}

impl Bundler for Esbuild {
    fn bundle(&self, job: &BundleJob) -> Result<(), BuildError> {
        let entry = job.entry();
        if !entry.is_file() {
            return Err(BuildError::BundlingFailure {
                entry: entry.to_path_buf(),
                reason: "entry point does not exist".to_string(),
            });
        }

        let args = Self::args(job);
        debug!("running {} {:?}", self.program.display(), args);

        let output = Command::new(&self.program)
            .args(&args)
            .output()
            .map_err(|e| BuildError::BundlingFailure {
                entry: entry.to_path_buf(),
                reason: format!("failed to run {}: {}", self.program.display(), e),
            })?;

        if !output.status.success() {
            return Err(BuildError::BundlingFailure {
                entry: entry.to_path_buf(),
                reason: format!(
                    "{} exited with {}: {}",
                    self.program.display(),
                    output.status,
                    String::from_utf8_lossy(&output.stderr).trim()
                ),
            });
        }

        info!("bundled {} -> {}", entry.display(), job.outfile().display());
        Ok(())
    }
}
