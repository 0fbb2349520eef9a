// SPDX-FileCopyrightText: 2026 Brigadir Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Diagnostic rendering for configuration errors.
//!
//! Converts figment's deserialization errors into miette diagnostics,
//! adding "did you mean" suggestions for unknown keys via strsim.

use figment::error::Kind;
use miette::Diagnostic;
use thiserror::Error;

/// Minimum Jaro-Winkler similarity for a typo suggestion.
const SUGGESTION_THRESHOLD: f64 = 0.75;

/// A single configuration error, renderable as a miette diagnostic.
#[derive(Debug, Clone, Error, Diagnostic)]
pub enum ConfigError {
    /// Parse / deserialization failure from figment.
    #[error("{message}")]
    #[diagnostic(code(brigadir::config::parse))]
    Parse {
        message: String,
        #[help]
        help: Option<String>,
    },

    /// Post-deserialization semantic validation failure.
    #[error("{message}")]
    #[diagnostic(code(brigadir::config::validation))]
    Validation { message: String },
}

/// Convert a figment error (possibly aggregating several failures) into
/// a list of [`ConfigError`] diagnostics.
pub fn figment_to_config_errors(err: figment::Error) -> Vec<ConfigError> {
    err.into_iter()
        .map(|e| {
            let path = e.path.join(".");
            match &e.kind {
                Kind::UnknownField(field, expected) => {
                    let location = if path.is_empty() {
                        String::new()
                    } else {
                        format!(" in `{path}`")
                    };
                    ConfigError::Parse {
                        message: format!("unknown configuration key `{field}`{location}"),
                        help: suggest(field, expected),
                    }
                }
                Kind::MissingField(name) => ConfigError::Parse {
                    message: format!("missing required configuration key `{name}`"),
                    help: None,
                },
                _ => ConfigError::Parse {
                    message: e.to_string(),
                    help: None,
                },
            }
        })
        .collect()
}

/// Render all collected errors to stderr.
pub fn render_errors(errors: &[ConfigError]) {
    for err in errors {
        eprintln!("{:?}", miette::Report::new(err.clone()));
    }
    eprintln!(
        "brigadir: {} configuration error{} found",
        errors.len(),
        if errors.len() == 1 { "" } else { "s" }
    );
}

/// Pick the closest known key for a typo suggestion, if close enough.
fn suggest(unknown: &str, candidates: &[&str]) -> Option<String> {
    candidates
        .iter()
        .map(|c| (strsim::jaro_winkler(unknown, c), *c))
        .filter(|(score, _)| *score >= SUGGESTION_THRESHOLD)
        .max_by(|a, b| a.0.total_cmp(&b.0))
        .map(|(_, best)| format!("did you mean `{best}`?"))
}
