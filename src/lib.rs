//! Production builds for development-mode static sites.

pub mod assets;
pub mod build;
mod bundler;
mod config;
mod error;
pub mod html;

pub use build::{BuildPaths, BuildReport, bundle_jobs, follow_up_suggestions, run};
pub use bundler::{BundleJob, Bundler, Esbuild};
pub use config::Config;
pub use error::BuildError;
pub use html::{extract, transform, transform_with_report};
