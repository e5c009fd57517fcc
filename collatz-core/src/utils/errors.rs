use std::{io, path::PathBuf};

use thiserror::Error;

/// Malformed checkpoint or literal text.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FormatError {
    #[error("expected a run of hexadecimal digits")]
    MissingDigits,
    #[error("missing field `{0}`")]
    MissingField(&'static str),
    #[error("invalid {field}: {value:?}")]
    InvalidField { field: &'static str, value: String },
    #[error("unexpected trailing content: {0:?}")]
    TrailingContent(String),
    #[error("invalid integer literal: {0:?}")]
    InvalidLiteral(String),
}

/// Longest prefix of offending input kept in a [`FormatError`].
const EXCERPT_CHARS: usize = 32;

impl FormatError {
    pub fn invalid_literal(text: &str) -> Self {
        Self::InvalidLiteral(excerpt(text))
    }

    pub fn trailing_content(text: &str) -> Self {
        Self::TrailingContent(excerpt(text))
    }

    pub fn invalid_field(field: &'static str, text: &str) -> Self {
        Self::InvalidField {
            field,
            value: excerpt(text),
        }
    }
}

/// `text` itself when short, otherwise its first characters and total length.
fn excerpt(text: &str) -> String {
    match text.char_indices().nth(EXCERPT_CHARS) {
        None => text.to_string(),
        Some((end, _)) => format!("{}... ({} chars)", &text[..end], text.chars().count()),
    }
}

#[derive(Error, Debug)]
pub enum CheckpointError {
    #[error("checkpoint I/O failed: {0}")]
    Io(#[from] io::Error),
    #[error("malformed checkpoint: {0}")]
    Format(#[from] FormatError),
}

#[derive(Error, Debug)]
pub enum RunError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("could not load literal file {}: {source}", path.display())]
    Literal {
        path: PathBuf,
        #[source]
        source: CheckpointError,
    },
    #[error("could not save checkpoint {}: {source}", path.display())]
    Save {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}
