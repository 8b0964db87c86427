//! Error types for the steward reconciliation core.
//!
//! This module provides the error hierarchy for the two subsystems: the
//! module parser (syntax errors, aggregated semantic errors) and the
//! resource reconciliation engine (backend read/write failures).

use thiserror::Error;

/// The main error type for steward operations.
#[derive(Debug, Error)]
pub enum StewardError {
    /// The configuration document could not be parsed at the grammar level.
    ///
    /// Syntax errors abort parsing entirely and are never aggregated.
    #[error("syntax error: {message}")]
    Syntax {
        /// Description of the syntax error, including its location.
        message: String,
    },

    /// One or more semantic errors were found while parsing a module.
    #[error(transparent)]
    Parse(#[from] MultiError),

    /// A Docker Engine API call failed.
    #[error("docker error: {0}")]
    Docker(#[from] DockerError),

    /// A container could not be created.
    #[error("failed to run container {name}: {source}")]
    ContainerRun {
        /// Name of the container that failed to start.
        name: String,
        /// The underlying Docker error.
        source: DockerError,
    },

    /// An image lookup failed while diffing a container.
    #[error("failed to find image {image} for container {container}: {source}")]
    ImageLookup {
        /// The image reference that could not be resolved.
        image: String,
        /// Name of the container being diffed.
        container: String,
        /// The underlying Docker error.
        source: DockerError,
    },

    /// A shell task's apply command exited with a failure.
    #[error("task {name} failed: {message}")]
    TaskFailed {
        /// Name of the failing task.
        name: String,
        /// Exit status and captured stderr.
        message: String,
    },

    /// A template's destination could not be written.
    #[error("failed to write template {name}: {source}")]
    TemplateWrite {
        /// Name of the template.
        name: String,
        /// The underlying IO error.
        source: std::io::Error,
    },

    /// A resource was checked or applied before its client was injected.
    #[error("no client injected for container {name}")]
    MissingClient {
        /// Name of the resource missing its client handle.
        name: String,
    },

    /// IO errors.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Docker Engine API errors.
#[derive(Debug, Error)]
pub enum DockerError {
    /// The engine could not be reached.
    #[error("network error communicating with the engine: {message}")]
    Network {
        /// Description of the network error.
        message: String,
    },

    /// The engine rejected a request.
    #[error("engine API request failed: {status} - {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Error message from the engine.
        message: String,
    },

    /// The engine returned a response that could not be decoded.
    #[error("invalid response from the engine: {message}")]
    InvalidResponse {
        /// Description of the response issue.
        message: String,
    },
}

impl DockerError {
    /// Creates a network error with the given message.
    #[must_use]
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network {
            message: message.into(),
        }
    }

    /// Creates an API request error.
    #[must_use]
    pub fn api(status: u16, message: impl Into<String>) -> Self {
        Self::Api {
            status,
            message: message.into(),
        }
    }

    /// Creates an invalid-response error with the given message.
    #[must_use]
    pub fn invalid_response(message: impl Into<String>) -> Self {
        Self::InvalidResponse {
            message: message.into(),
        }
    }

    /// Returns true if this error is worth retrying at the transport layer.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        match self {
            Self::Network { .. } => true,
            Self::Api { status, .. } => *status == 429 || *status >= 500,
            Self::InvalidResponse { .. } => false,
        }
    }
}

/// A position in a configuration document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Pos {
    /// 1-based line number.
    pub line: usize,
    /// 1-based column number.
    pub column: usize,
}

impl Pos {
    /// Creates a new position.
    #[must_use]
    pub const fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

impl std::fmt::Display for Pos {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// A semantic parse error annotated with its source position.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{pos}: {message}")]
pub struct ParseError {
    /// Position of the offending item in the document.
    pub pos: Pos,
    /// Description of the defect.
    pub message: String,
}

impl ParseError {
    /// Creates a new parse error.
    #[must_use]
    pub fn new(pos: Pos, message: impl Into<String>) -> Self {
        Self {
            pos,
            message: message.into(),
        }
    }
}

/// An ordered collection of semantic parse errors.
///
/// A single parse pass keeps walking after the first defect so that one
/// invocation surfaces every error in the document. The collection renders
/// as a newline-joined report of all underlying messages.
#[derive(Debug, Clone, Default, PartialEq, Eq, Error)]
#[error("{}", render(.errors))]
pub struct MultiError {
    /// The collected errors, in document order.
    errors: Vec<ParseError>,
}

fn render(errors: &[ParseError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("\n")
}

impl MultiError {
    /// Creates an empty collection.
    #[must_use]
    pub const fn new() -> Self {
        Self { errors: Vec::new() }
    }

    /// Appends an error to the collection.
    pub fn push(&mut self, error: ParseError) {
        self.errors.push(error);
    }

    /// Returns true if no errors were collected.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Returns the number of collected errors.
    #[must_use]
    pub fn len(&self) -> usize {
        self.errors.len()
    }

    /// Iterates over the collected errors in document order.
    pub fn iter(&self) -> std::slice::Iter<'_, ParseError> {
        self.errors.iter()
    }
}

impl From<Vec<ParseError>> for MultiError {
    fn from(errors: Vec<ParseError>) -> Self {
        Self { errors }
    }
}

impl IntoIterator for MultiError {
    type Item = ParseError;
    type IntoIter = std::vec::IntoIter<ParseError>;

    fn into_iter(self) -> Self::IntoIter {
        self.errors.into_iter()
    }
}

impl<'a> IntoIterator for &'a MultiError {
    type Item = &'a ParseError;
    type IntoIter = std::slice::Iter<'a, ParseError>;

    fn into_iter(self) -> Self::IntoIter {
        self.errors.iter()
    }
}

/// Result type alias for steward operations.
pub type Result<T> = std::result::Result<T, StewardError>;
