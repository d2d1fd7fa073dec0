// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 U.S. Federal Government (in countries where recognized)
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Error types for tgsign.
//!
//! Every failure the signing workflow can hit is a [`TgSignError`]. Each
//! variant belongs to exactly one workflow stage, and [`TgSignError::exit_code`]
//! turns that stage into the process exit code.

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias using [`TgSignError`].
pub type Result<T> = std::result::Result<T, TgSignError>;

/// Process exit codes, one per workflow stage.
pub mod exit_codes {
    /// Certificate signed and installed.
    pub const SUCCESS: u8 = 0;
    /// Configuration file absent, malformed or incomplete.
    pub const CONFIG: u8 = 1;
    /// Public key file missing, unreadable or empty.
    pub const PUBLIC_KEY: u8 = 2;
    /// Signing service rejected the key or answered unexpectedly.
    pub const SIGNING: u8 = 3;
    /// Certificate could not be written into place.
    pub const INSTALL: u8 = 4;
}

/// Errors that can occur while signing and installing a certificate.
#[derive(Debug, Error)]
pub enum TgSignError {
    /// No configuration file exists at the expected path.
    #[error("No config @ {}. Run with `--init` or create it manually", path.display())]
    NoConfig {
        /// Path that was checked.
        path: PathBuf,
    },

    /// Configuration file exists but is not valid INI.
    #[error("Failed to parse config {}: {message}", path.display())]
    ConfigParse {
        /// Path of the malformed file.
        path: PathBuf,
        /// Parser error message.
        message: String,
    },

    /// Configuration file has no `[tgsign]` section.
    #[error("{} has no {section} section", path.display())]
    MissingSection {
        /// Path of the configuration file.
        path: PathBuf,
        /// Expected section name.
        section: String,
    },

    /// A required key is missing from the configuration section.
    #[error("Config section {section} is missing required key '{field}'")]
    MissingField {
        /// Section that was searched.
        section: String,
        /// Missing key.
        field: &'static str,
    },

    /// Public key file does not exist.
    #[error("Public Key file {} does not exist", path.display())]
    PublicKeyNotFound {
        /// Configured public key path.
        path: PathBuf,
    },

    /// Public key file exists but contains only whitespace.
    #[error("Public Key file {} is empty", path.display())]
    PublicKeyEmpty {
        /// Configured public key path.
        path: PathBuf,
    },

    /// Public key file could not be read.
    #[error("Failed to read public key {}: {source}", path.display())]
    PublicKeyRead {
        /// Configured public key path.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// HTTP request to the signing service failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Signing endpoint URL is invalid.
    #[error("URL error: {0}")]
    Url(#[from] url::ParseError),

    /// Signing service answered with a non-success status and a non-JSON body.
    #[error("Server error {status}: {message}")]
    ServerError {
        /// HTTP status code.
        status: u16,
        /// Response body.
        message: String,
    },

    /// Signing service returned an error payload.
    #[error("Signing rejected{}: {message}", code_suffix(code))]
    SignRejected {
        /// Error code reported by the service, if any.
        code: Option<i64>,
        /// Error detail reported by the service.
        message: String,
    },

    /// Signing service response did not match the expected shape.
    #[error("Unexpected response from signing service: {0}")]
    UnexpectedResponse(String),

    /// Certificate could not be written, renamed or restricted.
    #[error("Failed to install certificate {}: {source}", path.display())]
    Install {
        /// Path that was being written.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// I/O error outside the installer (config writing, prompting).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl TgSignError {
    /// Create a missing-field error for the given section.
    pub fn missing_field(section: impl Into<String>, field: &'static str) -> Self {
        Self::MissingField {
            section: section.into(),
            field,
        }
    }

    /// Create a server error with status and message.
    pub fn server_error(status: u16, message: impl Into<String>) -> Self {
        Self::ServerError {
            status,
            message: message.into(),
        }
    }

    /// Create an unexpected-response error.
    pub fn unexpected_response(msg: impl Into<String>) -> Self {
        Self::UnexpectedResponse(msg.into())
    }

    /// Create an installer error for the given path.
    pub fn install(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Install {
            path: path.into(),
            source,
        }
    }

    /// Returns the process exit code for the stage this error belongs to.
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::NoConfig { .. }
            | Self::ConfigParse { .. }
            | Self::MissingSection { .. }
            | Self::MissingField { .. }
            | Self::Io(_) => exit_codes::CONFIG,
            Self::PublicKeyNotFound { .. }
            | Self::PublicKeyEmpty { .. }
            | Self::PublicKeyRead { .. } => exit_codes::PUBLIC_KEY,
            Self::Http(_)
            | Self::Url(_)
            | Self::ServerError { .. }
            | Self::SignRejected { .. }
            | Self::UnexpectedResponse(_) => exit_codes::SIGNING,
            Self::Install { .. } => exit_codes::INSTALL,
        }
    }
}

fn code_suffix(code: &Option<i64>) -> String {
    code.map(|c| format!(" (code {c})")).unwrap_or_default()
}
