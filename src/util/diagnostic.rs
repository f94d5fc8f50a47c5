//! User-friendly diagnostic messages.
//!
//! Every error shown to the user carries its cause chain and, where one is
//! known, a suggested fix.

use std::fmt;
use std::path::PathBuf;

use crate::asset::{CatalogError, GraphError};
use crate::destroy::DestroyError;

/// Common suggestion messages for consistent error handling.
pub mod suggestions {
    /// Suggestion when an asset could not be generated.
    pub const GENERATE_FAILED: &str =
        "help: Put the missing files in the asset directory or run `ignis create --verbose`";

    /// Suggestion when a persisted asset is corrupt.
    pub const LOAD_FAILED: &str =
        "help: Fix or remove the file named above; it will not be regenerated while present";

    /// Suggestion when the asset graph is inconsistent.
    pub const GRAPH_INVALID: &str = "help: Run `ignis graph` to inspect asset dependencies";

    /// Suggestion when an unknown target is requested.
    pub const UNKNOWN_TARGET: &str = "help: Run `ignis graph --list` to see available assets";

    /// Suggestion when metadata names no platform.
    pub const NO_PLATFORM: &str =
        "help: Check that metadata.json was written by `ignis create` for this cluster";

    /// Suggestion when no destroyer is registered.
    pub const NOT_REGISTERED: &str =
        "help: This build of ignis cannot tear down this platform; destroy its resources manually";
}

/// A diagnostic message with optional suggestions.
#[derive(Debug, Clone)]
pub struct Diagnostic {
    /// Primary message
    pub message: String,
    /// Additional context lines
    pub context: Vec<String>,
    /// Suggested fixes
    pub suggestions: Vec<String>,
    /// Related location (file path)
    pub location: Option<PathBuf>,
}

impl Diagnostic {
    /// Create a new error diagnostic.
    pub fn error(message: impl Into<String>) -> Self {
        Diagnostic {
            message: message.into(),
            context: Vec::new(),
            suggestions: Vec::new(),
            location: None,
        }
    }

    /// Add context to the diagnostic.
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context.push(context.into());
        self
    }

    /// Add a suggestion for fixing the issue.
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestions.push(suggestion.into());
        self
    }

    /// Add a file location.
    pub fn with_location(mut self, path: impl Into<PathBuf>) -> Self {
        self.location = Some(path.into());
        self
    }

    /// Build a diagnostic from an error and its cause chain.
    pub fn from_error(err: &anyhow::Error) -> Self {
        let mut diag = Diagnostic::error(err.to_string());
        for cause in err.chain().skip(1) {
            diag = diag.with_context(cause.to_string());
        }

        for cause in err.chain() {
            if let Some(e) = cause.downcast_ref::<GraphError>() {
                diag = diag.with_suggestion(graph_suggestion(e));
                break;
            }
            if let Some(e) = cause.downcast_ref::<CatalogError>() {
                let suggestion = match e {
                    CatalogError::Unknown { .. } => suggestions::UNKNOWN_TARGET,
                    _ => suggestions::GRAPH_INVALID,
                };
                diag = diag.with_suggestion(suggestion);
                break;
            }
            if let Some(e) = cause.downcast_ref::<DestroyError>() {
                diag = match e {
                    DestroyError::NoPlatform => diag.with_suggestion(suggestions::NO_PLATFORM),
                    DestroyError::NotRegistered { .. } => {
                        diag.with_suggestion(suggestions::NOT_REGISTERED)
                    }
                    DestroyError::Metadata { path, .. } => diag.with_location(path.clone()),
                    _ => diag,
                };
                break;
            }
        }

        diag
    }

    /// Format the diagnostic for terminal output.
    pub fn format(&self, color: bool) -> String {
        let mut output = String::new();

        let label = if color { "\x1b[1;31merror\x1b[0m" } else { "error" };
        output.push_str(&format!("{}: {}\n", label, self.message));

        if let Some(ref path) = self.location {
            output.push_str(&format!("  --> {}\n", path.display()));
        }

        for ctx in &self.context {
            output.push_str(&format!("  caused by: {}\n", ctx));
        }

        for suggestion in &self.suggestions {
            output.push('\n');
            output.push_str(suggestion);
            output.push('\n');
        }

        output
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format(false))
    }
}

fn graph_suggestion(err: &GraphError) -> &'static str {
    match err {
        GraphError::Load { .. } => suggestions::LOAD_FAILED,
        GraphError::Generate { .. } => suggestions::GENERATE_FAILED,
        GraphError::UnknownAsset { .. } => suggestions::UNKNOWN_TARGET,
        _ => suggestions::GRAPH_INVALID,
    }
}

/// Print a diagnostic to stderr.
pub fn emit(diagnostic: &Diagnostic, color: bool) {
    eprint!("{}", diagnostic.format(color));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::asset::AssetId;
    use anyhow::Context;

    #[test]
    fn test_diagnostic_formatting() {
        let diag = Diagnostic::error("failed to load asset \"Root CA\"")
            .with_context("\"Root CA\" is only partially present, missing: tls/root-ca.key")
            .with_suggestion(suggestions::LOAD_FAILED);

        let output = diag.format(false);
        assert!(output.contains("error: failed to load asset"));
        assert!(output.contains("caused by: \"Root CA\" is only partially present"));
        assert!(output.contains("help: Fix or remove"));
    }

    #[test]
    fn test_from_graph_error() {
        let err = anyhow::Error::new(GraphError::Generate {
            asset: "Install Config".to_string(),
            source: "install-config.toml not found".into(),
        })
        .context("failed to create assets");

        let diag = Diagnostic::from_error(&err);
        assert_eq!(diag.message, "failed to create assets");
        assert_eq!(diag.context[0], "failed to generate asset \"Install Config\"");
        assert_eq!(diag.context[1], "install-config.toml not found");
        assert_eq!(diag.suggestions, vec![suggestions::GENERATE_FAILED.to_string()]);
    }

    #[test]
    fn test_color_label() {
        let diag = Diagnostic::error("boom");
        assert!(diag.format(true).starts_with("\x1b[1;31merror\x1b[0m: boom"));
        assert!(diag.format(false).starts_with("error: boom"));
    }

    #[test]
    fn test_from_destroy_error() {
        let err = anyhow::Error::new(DestroyError::NotRegistered {
            platform: "aws".to_string(),
        });
        let diag = Diagnostic::from_error(&err);
        assert_eq!(diag.suggestions, vec![suggestions::NOT_REGISTERED.to_string()]);
    }

    #[test]
    fn test_from_catalog_error() {
        let err = anyhow::Error::new(CatalogError::Unknown {
            id: AssetId::new("nope"),
        });
        let diag = Diagnostic::from_error(&err);
        assert_eq!(diag.suggestions, vec![suggestions::UNKNOWN_TARGET.to_string()]);
    }

    #[test]
    fn test_plain_error_has_no_suggestion() {
        let err: anyhow::Error = Err::<(), _>(std::io::Error::other("disk full"))
            .context("failed to write bootstrap.ign")
            .unwrap_err();
        let diag = Diagnostic::from_error(&err);
        assert!(diag.suggestions.is_empty());
        assert_eq!(diag.context, vec!["disk full".to_string()]);
    }
}
