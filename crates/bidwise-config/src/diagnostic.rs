// SPDX-FileCopyrightText: 2026 Bidwise Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Turns Figment failures into miette diagnostics that point at the offending
//! line of `bidwise.toml`, with a "did you mean" hint for misspelled keys.

#![allow(unused_assignments)] // miette's Diagnostic derive generates code triggering this lint

use figment::error::Kind;
use miette::{Diagnostic, GraphicalReportHandler, NamedSource, SourceSpan};
use thiserror::Error;

/// Jaro-Winkler score a candidate key must beat to be offered as a fix.
const SUGGESTION_THRESHOLD: f64 = 0.75;

/// A single configuration problem, renderable by miette.
#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    #[error("unknown key `{key}` in {}", section_label(.section))]
    #[diagnostic(
        code(bidwise::config::unknown_key),
        help("{}", unknown_key_help(suggestion.as_deref(), valid_keys))
    )]
    UnknownKey {
        key: String,
        /// Dotted table path, empty for the top level.
        section: String,
        suggestion: Option<String>,
        /// Comma-separated keys accepted by the section.
        valid_keys: String,
        #[label("not a recognized key")]
        span: Option<SourceSpan>,
        #[source_code]
        src: Option<NamedSource<String>>,
    },

    #[error("`{key}` has the wrong type: found {found}")]
    #[diagnostic(code(bidwise::config::invalid_type), help("expected {expected}"))]
    InvalidType {
        key: String,
        found: String,
        expected: String,
        #[label("expected {expected}")]
        span: Option<SourceSpan>,
        #[source_code]
        src: Option<NamedSource<String>>,
    },

    /// Parsed fine but violates a semantic rule.
    #[error("invalid configuration: {message}")]
    #[diagnostic(code(bidwise::config::validation))]
    Validation { message: String },

    #[error("configuration error: {0}")]
    #[diagnostic(code(bidwise::config::other))]
    Other(String),
}

fn section_label(section: &str) -> String {
    if section.is_empty() {
        "the top level".to_string()
    } else {
        format!("[{section}]")
    }
}

fn unknown_key_help(suggestion: Option<&str>, valid_keys: &str) -> String {
    match suggestion {
        Some(s) => format!("did you mean `{s}`? Valid keys: {valid_keys}"),
        None => format!("valid keys: {valid_keys}"),
    }
}

/// TOML files that fed the failed extraction, as `(path, content)` pairs.
struct Sources<'a>(&'a [(String, String)]);

impl Sources<'_> {
    /// Span of `key` inside `section` of whichever file the error came from.
    fn locate(
        &self,
        error: &figment::Error,
        section: &[String],
        key: &str,
    ) -> (Option<SourceSpan>, Option<NamedSource<String>>) {
        let origin = match error.metadata.as_ref().and_then(|m| m.source.as_ref()) {
            Some(figment::Source::File(path)) => Some(path.display().to_string()),
            _ => None,
        };
        // Inline strings carry no file path; a lone source must be the one.
        let found = match (&origin, self.0) {
            (Some(origin), sources) => sources.iter().find(|(p, _)| p == origin),
            (None, [only]) => Some(only),
            (None, _) => None,
        };
        let Some((path, content)) = found else {
            return (None, None);
        };
        match find_key_offset(content, section, key) {
            Some(offset) => (
                Some(SourceSpan::new(offset.into(), key.len())),
                Some(NamedSource::new(path, content.clone())),
            ),
            None => (None, None),
        }
    }
}

/// Convert every error inside a `figment::Error` into a [`ConfigError`].
pub fn figment_to_config_errors(
    err: figment::Error,
    toml_sources: &[(String, String)],
) -> Vec<ConfigError> {
    let sources = Sources(toml_sources);

    err.into_iter()
        .map(|error| {
            let path: Vec<String> = error.path.clone();
            match &error.kind {
                Kind::UnknownField(field, expected) => {
                    let (span, src) = sources.locate(&error, &path, field);
                    ConfigError::UnknownKey {
                        key: field.clone(),
                        section: path.join("."),
                        suggestion: suggest_key(field, expected),
                        valid_keys: expected.join(", "),
                        span,
                        src,
                    }
                }
                Kind::InvalidType(found, expected) => {
                    let (section, key) = match path.split_last() {
                        Some((last, rest)) => (rest.to_vec(), last.clone()),
                        None => (Vec::new(), String::new()),
                    };
                    let (span, src) = sources.locate(&error, &section, &key);
                    ConfigError::InvalidType {
                        key: path.join("."),
                        found: found.to_string(),
                        expected: expected.clone(),
                        span,
                        src,
                    }
                }
                _ => ConfigError::Other(error.to_string()),
            }
        })
        .collect()
}

/// Byte offset of `key = ...` inside the `[section]` table of `content`.
///
/// An empty `section` means keys that precede the first table header.
pub fn find_key_offset(content: &str, section: &[String], key: &str) -> Option<usize> {
    let wanted = section.join(".");
    let mut current = String::new();
    let mut offset = 0;

    for line in content.split_inclusive('\n') {
        let trimmed = line.trim_start();
        let indent = line.len() - trimmed.len();

        if let Some(header) = trimmed.strip_prefix('[') {
            if let Some(end) = header.find(']') {
                current = header[..end].trim().to_string();
            }
        } else if current == wanted
            && let Some(rest) = trimmed.strip_prefix(key)
            && rest.trim_start().starts_with('=')
        {
            return Some(offset + indent);
        }

        offset += line.len();
    }

    None
}

/// Closest valid key by Jaro-Winkler similarity, if any clears the threshold.
pub fn suggest_key(unknown: &str, valid_keys: &[&str]) -> Option<String> {
    valid_keys
        .iter()
        .map(|key| (strsim::jaro_winkler(unknown, key), *key))
        .filter(|(score, _)| *score > SUGGESTION_THRESHOLD)
        .max_by(|a, b| a.0.total_cmp(&b.0))
        .map(|(_, key)| key.to_string())
}

/// Print diagnostics to stderr, falling back to plain text if rendering fails.
pub fn render_errors(errors: &[ConfigError]) {
    let handler = GraphicalReportHandler::new();
    for error in errors {
        let mut rendered = String::new();
        match handler.render_report(&mut rendered, error as &dyn Diagnostic) {
            Ok(()) => eprint!("{rendered}"),
            Err(_) => eprintln!("error: {error}"),
        }
    }
}
