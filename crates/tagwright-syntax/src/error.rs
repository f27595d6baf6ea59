//! Error types for tag synthesis and file rewriting.
//!
//! [`TagError`] covers problems scoped to a single request or field, while
//! [`ProcessError`] covers problems scoped to a whole source file. Neither
//! kind is meant to abort a batch: callers report the error and move on to
//! the next request, field, or file.

use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Errors raised while interpreting tag requests or converting identifiers.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum TagError {
    /// A request named a case style that is not one of snake, camel or
    /// pascal.
    #[error("unknown case style '{style}' in request '{token}'")]
    UnknownCaseStyle {
        /// The unrecognised case style.
        style: String,
        /// The full request token as supplied by the operator.
        token: String,
    },

    /// A field identifier could not be converted.
    #[error("invalid identifier '{identifier}'")]
    InvalidIdentifier {
        /// The offending identifier.
        identifier: String,
    },

    /// A request token did not name a tag.
    #[error("invalid tag request '{token}': a tag name is required")]
    InvalidRequest {
        /// The offending request token.
        token: String,
    },
}

impl TagError {
    /// Creates an unknown case style error.
    #[must_use]
    pub fn unknown_case_style(style: impl Into<String>, token: impl Into<String>) -> Self {
        Self::UnknownCaseStyle {
            style: style.into(),
            token: token.into(),
        }
    }

    /// Creates an invalid identifier error.
    #[must_use]
    pub fn invalid_identifier(identifier: impl Into<String>) -> Self {
        Self::InvalidIdentifier {
            identifier: identifier.into(),
        }
    }

    /// Creates an invalid request error.
    #[must_use]
    pub fn invalid_request(token: impl Into<String>) -> Self {
        Self::InvalidRequest {
            token: token.into(),
        }
    }
}

/// Errors raised while processing one source file.
///
/// Every variant leaves the file on disk exactly as it was found.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ProcessError {
    /// Failed to initialise the Tree-sitter parser for Go.
    #[error("failed to initialise Go parser: {message}")]
    ParserInitError {
        /// Description of the failure.
        message: String,
    },

    /// The source file could not be read.
    #[error("failed to read {}: {source}", path.display())]
    ReadError {
        /// The file that could not be read.
        path: PathBuf,
        /// Underlying IO failure.
        #[source]
        source: io::Error,
    },

    /// The source file is not valid Go.
    #[error("failed to parse {}: {message}", path.display())]
    ParseError {
        /// The file that failed to parse.
        path: PathBuf,
        /// Location and description of the first syntax error.
        message: String,
    },

    /// The rewritten tree could not be printed back to valid source text.
    #[error("failed to print {}: {message}", path.display())]
    RenderError {
        /// The file being printed.
        path: PathBuf,
        /// Description of the failure.
        message: String,
    },

    /// The rewritten source could not be written to its destination.
    #[error("failed to write {}: {source}", path.display())]
    WriteError {
        /// The destination file.
        path: PathBuf,
        /// Underlying IO failure.
        #[source]
        source: io::Error,
    },
}

impl ProcessError {
    /// Creates a parser initialisation error.
    #[must_use]
    pub fn parser_init(message: impl Into<String>) -> Self {
        Self::ParserInitError {
            message: message.into(),
        }
    }

    /// Creates a read error.
    #[must_use]
    pub fn read(path: &Path, source: io::Error) -> Self {
        Self::ReadError {
            path: path.to_path_buf(),
            source,
        }
    }

    /// Creates a parse error.
    #[must_use]
    pub fn parse(path: &Path, message: impl Into<String>) -> Self {
        Self::ParseError {
            path: path.to_path_buf(),
            message: message.into(),
        }
    }

    /// Creates a render error.
    #[must_use]
    pub fn render(path: &Path, message: impl Into<String>) -> Self {
        Self::RenderError {
            path: path.to_path_buf(),
            message: message.into(),
        }
    }

    /// Creates a write error.
    #[must_use]
    pub fn write(path: &Path, source: io::Error) -> Self {
        Self::WriteError {
            path: path.to_path_buf(),
            source,
        }
    }

    /// Returns the file this error refers to, if any.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::ParserInitError { .. } => None,
            Self::ReadError { path, .. }
            | Self::ParseError { path, .. }
            | Self::RenderError { path, .. }
            | Self::WriteError { path, .. } => Some(path),
        }
    }
}
