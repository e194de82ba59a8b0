#![allow(non_shorthand_field_patterns)]
#![doc = "Error handling primitives shared across the insights crate."]
// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
//
// SPDX-License-Identifier: MIT

//! The derive emitted by [`masterror::Error`] expands pattern matches that
//! trigger the `non_shorthand_field_patterns` lint. The lint is disabled for
//! the module to keep the generated implementations warning-free.
//!
//! Only process-level failures live here. Failures of individual upstream
//! resources are classified into [`crate::FetchOutcome`] values and never
//! surface as [`Error`].

use std::net::SocketAddr;

/// Unified error type returned by configuration loading, client
/// construction and the binary entry points.
#[derive(Debug, masterror::Error)]
pub enum Error {
    /// Returned when start-up configuration violates invariants.
    #[error("invalid configuration: {message}")]
    Config {
        /// Human readable message describing the configuration problem.
        message: String
    },
    /// Returned when user-supplied input cannot be accepted.
    #[error("invalid input: {message}")]
    Validation {
        /// Human readable message describing the validation problem.
        message: String
    },
    /// Service errors when interacting with external APIs.
    #[error("service error: {message}")]
    Service {
        /// Human readable message describing the service error.
        message: String
    },
    /// Wraps I/O errors raised while binding or serving the HTTP listener.
    #[error("failed to serve on {addr}: {source}")]
    Io {
        /// Address the listener was bound to.
        addr:   SocketAddr,
        /// Underlying I/O error.
        source: std::io::Error
    },
    /// Wraps serialization errors when writing analysis output.
    #[error("failed to serialize analysis: {source}")]
    Serialize {
        /// Underlying serialization error.
        source: serde_json::Error
    }
}

impl Error {
    /// Constructs a configuration error from the provided displayable value.
    ///
    /// # Parameters
    ///
    /// * `message` - Human-readable description of the configuration problem.
    pub fn config<M>(message: M) -> Self
    where
        M: Into<String>
    {
        Self::Config {
            message: message.into()
        }
    }

    /// Constructs a validation error from the provided displayable value.
    pub fn validation<M>(message: M) -> Self
    where
        M: Into<String>
    {
        Self::Validation {
            message: message.into()
        }
    }

    /// Constructs a service error from the provided displayable value.
    pub fn service<M>(message: M) -> Self
    where
        M: Into<String>
    {
        Self::Service {
            message: message.into()
        }
    }

    /// Formats the error for diagnostics without the variant name.
    ///
    /// The returned string matches the [`std::fmt::Display`] implementation.
    pub fn to_display_string(&self) -> String {
        format!("{self}")
    }
}

impl From<serde_json::Error> for Error {
    fn from(source: serde_json::Error) -> Self {
        Self::Serialize {
            source
        }
    }
}

impl From<masterror::AppError> for Error {
    fn from(error: masterror::AppError) -> Self {
        Self::Service {
            message: error.to_string()
        }
    }
}

/// Creates an [`Error::Io`] variant capturing the listener address and source.
pub fn io_error(addr: SocketAddr, source: std::io::Error) -> Error {
    Error::Io {
        addr,
        source
    }
}
