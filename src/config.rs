//! Command line configuration.

use anyhow::{Result, bail};
use clap::Parser;
use std::path::PathBuf;

use crate::build::BuildPaths;

/// Command line configuration for webdist.
#[derive(Debug, Clone, Parser)]
#[command(name = "webdist", version, about, long_about = None)]
pub struct Config {
    /// Site root containing index.html
    #[arg(default_value = ".")]
    pub root: PathBuf,

    /// Output directory [default: <ROOT>/dist]
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// esbuild executable used for bundling
    #[arg(long, default_value = "esbuild")]
    pub esbuild: PathBuf,

    /// Where the extracted inline script is written, relative to the root
    #[arg(long, default_value = "src/app.js")]
    pub payload: PathBuf,

    /// Open the built index.html in the browser
    #[arg(long)]
    pub open: bool,
}

impl Config {
    /// Parses configuration from command line arguments.
    pub fn parse() -> Self {
        <Self as Parser>::parse()
    }

    /// Validates configuration.
    ///
    /// # Errors
    ///
    /// Returns error if the site root does not exist or is not a directory,
    /// or if the output directory would overlap the site's inputs.
    pub fn validate(&self) -> Result<()> {
        if !self.root.exists() {
            bail!("Site root does not exist: {}", self.root.display());
        }
        if !self.root.is_dir() {
            bail!("Site root is not a directory: {}", self.root.display());
        }

        self.paths().check_output()?;

        Ok(())
    }

    /// Resolves every path the build touches against the site root.
    ///
    /// Relative output and payload paths are taken relative to the root so
    /// the build never depends on the process working directory.
    pub fn paths(&self) -> BuildPaths {
        let output = match &self.output {
            Some(dir) if dir.is_absolute() => dir.clone(),
            Some(dir) => self.root.join(dir),
            None => self.root.join("dist"),
        };

        BuildPaths {
            root: self.root.clone(),
            output,
            payload: self.root.join(&self.payload),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(root: &str) -> Config {
        Config {
            root: PathBuf::from(root),
            output: None,
            esbuild: PathBuf::from("esbuild"),
            payload: PathBuf::from("src/app.js"),
            open: false,
        }
    }

    #[test]
    fn test_config_defaults_from_empty_args() {
        // Arrange & Act
        let config = Config::try_parse_from(["webdist"]).expect("Bare invocation should parse");

        // Assert
        assert_eq!(config.root, PathBuf::from("."));
        assert_eq!(config.output, None);
        assert_eq!(config.esbuild, PathBuf::from("esbuild"));
        assert_eq!(config.payload, PathBuf::from("src/app.js"));
        assert!(!config.open);
    }

    #[test]
    fn test_config_parses_all_flags() {
        // Arrange & Act
        let config = Config::try_parse_from([
            "webdist",
            "site",
            "-o",
            "public",
            "--esbuild",
            "/opt/esbuild",
            "--payload",
            "build/entry.js",
            "--open",
        ])
        .expect("Flags should parse");

        // Assert
        assert_eq!(config.root, PathBuf::from("site"));
        assert_eq!(config.output, Some(PathBuf::from("public")));
        assert_eq!(config.esbuild, PathBuf::from("/opt/esbuild"));
        assert_eq!(config.payload, PathBuf::from("build/entry.js"));
        assert!(config.open);
    }

    #[test]
    fn test_paths_default_to_root() {
        // Arrange
        let config = config("site");

        // Act
        let paths = config.paths();

        // Assert
        assert_eq!(paths.root, PathBuf::from("site"));
        assert_eq!(paths.output, PathBuf::from("site/dist"));
        assert_eq!(paths.payload, PathBuf::from("site/src/app.js"));
    }

    #[test]
    fn test_paths_keep_absolute_output() {
        // Arrange
        let mut config = config("site");
        config.output = Some(PathBuf::from("/srv/www"));

        // Act
        let paths = config.paths();

        // Assert
        assert_eq!(paths.output, PathBuf::from("/srv/www"));
    }

    #[test]
    fn test_validate_existing_path() {
        // Arrange
        let config = config(".");

        // Act
        let result = config.validate();

        // Assert
        assert!(result.is_ok(), "Current directory should be valid");
    }

    #[test]
    fn test_validate_rejects_overlapping_output() {
        // Arrange
        let site = tempfile::TempDir::new().unwrap();
        let root = site.path().to_str().unwrap();

        // Act & Assert
        for output in [".", "..", "assets/x", "vendors"] {
            let config = Config::try_parse_from(["webdist", root, "-o", output])
                .expect("Flags should parse");
            let err = config
                .validate()
                .expect_err("Overlapping output should be rejected");
            assert!(
                err.to_string().contains("refusing to build into"),
                "Output '{}' gave: {}",
                output,
                err
            );
        }
    }

    #[test]
    fn test_validate_accepts_separate_output() {
        // Arrange
        let site = tempfile::TempDir::new().unwrap();
        let root = site.path().to_str().unwrap();
        let config =
            Config::try_parse_from(["webdist", root, "-o", "public"]).expect("Flags should parse");

        // Act
        let result = config.validate();

        // Assert
        assert!(result.is_ok(), "Output beside the inputs should be valid");
    }

    #[test]
    fn test_validate_missing_root() {
        // Arrange
        let config = config("/nonexistent/webdist-site-root");

        // Act
        let result = config.validate();

        // Assert
        let err = result.expect_err("Missing root should be rejected");
        assert!(err.to_string().contains("does not exist"));
    }
}
