//! Production build of a development-mode site.

use log::{info, warn};
use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};

use crate::assets;
use crate::bundler::{BundleJob, Bundler};
use crate::error::BuildError;
use crate::html;

/// Source page name, both in the site root and the output tree.
pub const INDEX_HTML: &str = "index.html";

const FONT_FILE: &str = "lato.woff2";
const STATIC_DIRS: [&str; 2] = ["assets", "vendors"];
const STYLESHEETS: [(&str, &str); 2] = [
    ("reset.css", "reset.min.css"),
    ("styles.css", "styles.min.css"),
];
const SCRIPT_BUNDLE: &str = "bundle.min.js";

/// Locations read and written by one build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildPaths {
    /// Site root holding `index.html` and the static inputs.
    pub root: PathBuf,
    /// Output directory, wiped at the start of every build.
    pub output: PathBuf,
    /// Destination of the extracted inline script.
    pub payload: PathBuf,
}

impl BuildPaths {
    /// Paths for a site root with the conventional `dist/` and `src/app.js`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        Self {
            output: root.join("dist"),
            payload: root.join("src").join("app.js"),
            root,
        }
    }

    pub fn source_document(&self) -> PathBuf {
        self.root.join(INDEX_HTML)
    }

    pub fn production_document(&self) -> PathBuf {
        self.output.join(INDEX_HTML)
    }

    /// Rejects output directories whose cleaning or filling would touch inputs.
    ///
    /// The output is wiped before every build, so it must not be the site
    /// root or one of its ancestors. It must also stay outside the copied
    /// static directories, otherwise the copy would descend into its own
    /// destination.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError::UnsafeOutput`] for either case and a filesystem
    /// error if a path cannot be made absolute.
    pub fn check_output(&self) -> Result<(), BuildError> {
        let root = normalize(&self.root)?;
        let output = normalize(&self.output)?;

        if root.starts_with(&output) {
            return Err(BuildError::UnsafeOutput {
                output: self.output.clone(),
                reason: "it contains the site root",
            });
        }
        for dir in STATIC_DIRS {
            if output.starts_with(root.join(dir)) {
                return Err(BuildError::UnsafeOutput {
                    output: self.output.clone(),
                    reason: "it lies inside a copied static directory",
                });
            }
        }

        Ok(())
    }
}

/// Absolute form of `path` with `.` and `..` resolved lexically.
///
/// The output directory may not exist yet, so symlinks are not followed.
fn normalize(path: &Path) -> Result<PathBuf, BuildError> {
    let absolute = std::path::absolute(path).map_err(|e| BuildError::fs("resolve", path, e))?;

    let mut normalized = PathBuf::new();
    for component in absolute.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                normalized.pop();
            }
            other => normalized.push(other),
        }
    }
    Ok(normalized)
}

/// Summary of a completed build.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildReport {
    /// Files produced by the build itself, in write order.
    pub written: Vec<PathBuf>,
    /// Number of files copied verbatim from the site root.
    pub copied: usize,
    /// Rewrite rules whose targets were absent from the source page.
    pub skipped_rules: Vec<&'static str>,
}

/// Builds the production tree for a site.
///
/// Runs every step in order and stops at the first failure. A failed build
/// leaves the output directory partially written; rerunning starts from a
/// clean output directory again.
///
/// # Arguments
///
/// * `paths`: Input and output locations
/// * `bundler`: Service compiling the script and stylesheet artifacts
///
/// # Returns
///
/// Report listing the produced files
///
/// # Errors
///
/// Returns [`BuildError::UnsafeOutput`] if the output overlaps the inputs,
/// [`BuildError::MissingSourceDocument`] if `index.html` is absent,
/// [`BuildError::MalformedDocument`] if it has no inline script block, and
/// filesystem or bundling errors from the later steps.
pub fn run(paths: &BuildPaths, bundler: &dyn Bundler) -> Result<BuildReport, BuildError> {
    paths.check_output()?;

    let source_path = paths.source_document();
    if !source_path.is_file() {
        return Err(BuildError::MissingSourceDocument { path: source_path });
    }

    let mut report = BuildReport::default();

    info!("cleaning {}", paths.output.display());
    assets::clean_dir(&paths.output)?;
    for dir in STATIC_DIRS {
        assets::ensure_dir(&paths.output.join(dir))?;
    }

    for dir in STATIC_DIRS {
        if let Some(count) =
            assets::copy_dir_if_exists(&paths.root.join(dir), &paths.output.join(dir))?
        {
            info!("copied {} files from {}", count, dir);
            report.copied += count;
        }
    }
    if assets::copy_file_if_exists(&paths.root.join(FONT_FILE), &paths.output.join(FONT_FILE))? {
        report.copied += 1;
    }

    let source = assets::read_text(&source_path).map_err(|e| match e {
        BuildError::Filesystem { source, .. } if source.kind() == ErrorKind::NotFound => {
            BuildError::MissingSourceDocument {
                path: source_path.clone(),
            }
        }
        other => other,
    })?;

    let payload = html::extract(&source)?;
    assets::write_text(&paths.payload, &payload)?;
    info!("extracted inline script to {}", paths.payload.display());

    let rewrite = html::transform_with_report(&source);
    for rule in &rewrite.skipped {
        warn!("rewrite rule {} found nothing to rewrite", rule);
    }
    let production_path = paths.production_document();
    assets::write_text(&production_path, &rewrite.document)?;
    report.skipped_rules = rewrite.skipped;
    report.written.push(production_path);

    for job in bundle_jobs(paths) {
        bundler.bundle(&job)?;
        report.written.push(job.outfile().to_path_buf());
    }

    Ok(report)
}

/// Bundler invocations for a build, in execution order.
pub fn bundle_jobs(paths: &BuildPaths) -> Vec<BundleJob> {
    let mut jobs = vec![BundleJob::Script {
        entry: paths.payload.clone(),
        outfile: paths.output.join(SCRIPT_BUNDLE),
    }];
    jobs.extend(STYLESHEETS.iter().map(|(source, minified)| BundleJob::Style {
        entry: paths.root.join(source),
        outfile: paths.output.join(minified),
    }));
    jobs
}

/// Manual optimizations suggested after a successful build.
///
/// Informational only; none of these are executed.
pub fn follow_up_suggestions(output: &Path) -> Vec<String> {
    let out = output.display();
    vec![
        format!(
            "Convert images to WebP:\n   npx @squoosh/cli --webp '{{\"quality\":65}}' {out}/assets/*.png"
        ),
        format!("Optimize SVG files:\n   npx svgo {out}/assets/*.svg"),
        format!("Check bundle sizes:\n   du -sh {out}/* | sort -hr"),
    ]
}
