//! Error types for the physxml core library.

use std::path::PathBuf;

/// The main error type for descriptor generation.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// I/O error with optional path context.
    #[error("I/O error{}: {source}", path.as_ref().map(|p| format!(" at '{}'", p.display())).unwrap_or_default())]
    Io {
        source: std::io::Error,
        path: Option<PathBuf>,
    },

    /// The XML writer failed while constructing the document.
    #[error("error constructing XML near {operation} of <{element}>: {message}")]
    Xml {
        operation: &'static str,
        element: String,
        message: String,
    },

    /// The machine configuration could not be loaded.
    #[error("Config error: {message}")]
    Config { message: String },

    /// A disk has no matching data connection.
    #[error("no data connection for disk {index} ('{disk}')")]
    MissingConnection { index: usize, disk: String },
}

/// A specialized Result type for physxml operations.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Create an I/O error with path context.
    pub fn io(source: std::io::Error, path: impl Into<PathBuf>) -> Self {
        Self::Io {
            source,
            path: Some(path.into()),
        }
    }

    /// Create an I/O error without path context.
    pub fn io_simple(source: std::io::Error) -> Self {
        Self::Io { source, path: None }
    }

    /// Create an XML construction error for the given writer operation.
    pub fn xml(
        operation: &'static str,
        element: impl Into<String>,
        cause: impl std::fmt::Display,
    ) -> Self {
        Self::Xml {
            operation,
            element: element.into(),
            message: cause.to_string(),
        }
    }

    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create an error for a disk without a data connection.
    pub fn missing_connection(index: usize, disk: impl Into<String>) -> Self {
        Self::MissingConnection {
            index,
            disk: disk.into(),
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(source: std::io::Error) -> Self {
        Self::io_simple(source)
    }
}
