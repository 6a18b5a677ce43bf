//! Development to production HTML rewriting.
//!
//! The source document is a development page: an inline JSX block compiled
//! in the browser, local vendor builds of React and Babel, unminified
//! stylesheets. [`extract`] pulls the inline block out for the bundler and
//! [`transform`] rewrites the page to reference the production artifacts.
//!
//! Rewriting is literal text substitution, not a parse and serialize pass.
//! Every rule fires on the first match only, is case-sensitive, and silently
//! does nothing when its target is absent.

use log::debug;
use maud::html;
use regex::Regex;
use std::sync::LazyLock;

use crate::error::BuildError;

/// Opening tag of the inline script block.
pub const SCRIPT_OPEN: &str = r#"<script type="text/babel">"#;

/// Closing tag terminating the inline script block.
pub const SCRIPT_CLOSE: &str = "</script>";

/// Output path of the script bundle, relative to the production page.
pub const BUNDLE_HREF: &str = "./bundle.min.js";

const REACT_RUNTIME_CDN: &str = "https://unpkg.com/react@18.2.0/umd/react.production.min.js";
const REACT_DOM_CDN: &str = "https://unpkg.com/react-dom@18.2.0/umd/react-dom.production.min.js";

const BABEL_VENDOR_TAG: &str = r#"<script src="vendors/babel.min.js"></script>"#;
const REACT_VENDOR_TAG: &str = r#"<script src="vendors/react-with-dom.js"></script>"#;

/// Extracts the inline script payload from a development document.
///
/// The payload starts right after the first `<script type="text/babel">`
/// and ends at the first `</script>` following it. Surrounding whitespace
/// is trimmed.
///
/// # Arguments
///
/// * `document`: Full source HTML
///
/// # Returns
///
/// Trimmed script body
///
/// # Errors
///
/// Returns [`BuildError::MalformedDocument`] if the opening tag is absent or
/// is never closed.
pub fn extract(document: &str) -> Result<String, BuildError> {
    let start = document
        .find(SCRIPT_OPEN)
        .map(|offset| offset + SCRIPT_OPEN.len())
        .ok_or_else(|| BuildError::MalformedDocument {
            reason: format!("no inline script block ({SCRIPT_OPEN}) found"),
        })?;

    let len = document[start..]
        .find(SCRIPT_CLOSE)
        .ok_or_else(|| BuildError::MalformedDocument {
            reason: format!("inline script block is not terminated by {SCRIPT_CLOSE}"),
        })?;

    Ok(document[start..start + len].trim().to_string())
}

/// Text edit performed by a [`RewriteRule`].
#[derive(Debug)]
pub enum Edit {
    /// Removes the first match of the pattern.
    ///
    /// The only pattern-based edit: the inline block spans arbitrary script
    /// content between fixed tags, which a literal cannot express.
    Delete(Regex),
    /// Replaces the first occurrence of `target`.
    Replace { target: &'static str, with: String },
    /// Inserts `markup` right before the first occurrence of `anchor`.
    InsertBefore { anchor: &'static str, markup: String },
    /// Inserts `markup` right after the first occurrence of `anchor`.
    InsertAfter { anchor: &'static str, markup: String },
}

/// One named step of the production rewrite.
#[derive(Debug)]
pub struct RewriteRule {
    pub name: &'static str,
    pub edit: Edit,
}

impl RewriteRule {
    /// Applies the rule to `text`.
    ///
    /// Returns `None` when the rule's target does not occur, leaving the
    /// caller to keep the input unchanged.
    pub fn apply(&self, text: &str) -> Option<String> {
        match &self.edit {
            Edit::Delete(pattern) => {
                let found = pattern.find(text)?;
                Some(splice(text, found.start(), found.end(), ""))
            }
            Edit::Replace { target, with } => {
                let at = text.find(target)?;
                Some(splice(text, at, at + target.len(), with))
            }
            Edit::InsertBefore { anchor, markup } => {
                let at = text.find(anchor)?;
                Some(splice(text, at, at, markup))
            }
            Edit::InsertAfter { anchor, markup } => {
                let at = text.find(anchor)? + anchor.len();
                Some(splice(text, at, at, markup))
            }
        }
    }
}

fn splice(text: &str, start: usize, end: usize, insert: &str) -> String {
    let mut out = String::with_capacity(text.len() - (end - start) + insert.len());
    out.push_str(&text[..start]);
    out.push_str(insert);
    out.push_str(&text[end..]);
    out
}

static RULES: LazyLock<Vec<RewriteRule>> = LazyLock::new(|| {
    vec![
        RewriteRule {
            name: "strip-inline-script",
            edit: Edit::Delete(
                Regex::new(r#"<script type="text/babel">[\s\S]*?</script>"#)
                    .expect("inline script pattern is valid"),
            ),
        },
        RewriteRule {
            name: "drop-babel-vendor",
            edit: Edit::Replace {
                target: BABEL_VENDOR_TAG,
                with: String::new(),
            },
        },
        RewriteRule {
            name: "react-from-cdn",
            edit: Edit::Replace {
                target: REACT_VENDOR_TAG,
                with: cdn_scripts(),
            },
        },
        RewriteRule {
            name: "preload-hints",
            edit: Edit::InsertAfter {
                anchor: "</title>",
                markup: preload_hints(),
            },
        },
        RewriteRule {
            name: "bundle-script",
            edit: Edit::InsertBefore {
                anchor: "</body>",
                markup: html! { script src=(BUNDLE_HREF) {} }.into_string(),
            },
        },
        RewriteRule {
            name: "minified-reset-css",
            edit: Edit::Replace {
                target: r#"href="reset.css""#,
                with: r#"href="./reset.min.css""#.to_string(),
            },
        },
        RewriteRule {
            name: "minified-styles-css",
            edit: Edit::Replace {
                target: r#"href="styles.css""#,
                with: r#"href="./styles.min.css""#.to_string(),
            },
        },
        RewriteRule {
            name: "root-font-path",
            edit: Edit::Replace {
                target: r#"href="assets/lato.woff2""#,
                with: r#"href="./lato.woff2""#.to_string(),
            },
        },
    ]
});

fn cdn_scripts() -> String {
    html! {
        script src=(REACT_RUNTIME_CDN) {}
        script src=(REACT_DOM_CDN) {}
    }
    .into_string()
}

fn preload_hints() -> String {
    html! {
        link rel="preload" href=(BUNDLE_HREF) as="script";
        link rel="preload" href="./styles.min.css" as="style";
        link rel="preload" href="./lato.woff2" as="font" crossorigin;
    }
    .into_string()
}

/// Ordered production rewrite rules.
pub fn rules() -> &'static [RewriteRule] {
    &RULES
}

/// Production document along with which rules fired.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rewrite {
    pub document: String,
    pub applied: Vec<&'static str>,
    pub skipped: Vec<&'static str>,
}

/// Rewrites a development document into its production form.
///
/// Applies [`rules`] in order, each to the previous output. A rule whose
/// target is missing is recorded in [`Rewrite::skipped`] and otherwise
/// ignored.
pub fn transform_with_report(document: &str) -> Rewrite {
    let mut current = document.to_string();
    let mut applied = Vec::new();
    let mut skipped = Vec::new();

    for rule in rules() {
        match rule.apply(&current) {
            Some(next) => {
                debug!("rewrite rule {} applied", rule.name);
                current = next;
                applied.push(rule.name);
            }
            None => {
                debug!("rewrite rule {} found no target", rule.name);
                skipped.push(rule.name);
            }
        }
    }

    Rewrite {
        document: current,
        applied,
        skipped,
    }
}

/// Rewrites a development document into its production form.
pub fn transform(document: &str) -> String {
    transform_with_report(document).document
}
