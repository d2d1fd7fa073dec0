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

//! Request and response types for the signing service.
//!
//! The service takes a form-encoded [`SignRequest`] and answers with a JSON
//! array whose first element is either `{"error": ..., "code": ...}` or
//! `{"public_cert": ...}`. [`SignResult`] is that answer decoded into a
//! tagged value.

use serde::Serialize;
use serde_json::Value;

use crate::config::Config;
use crate::error::{Result, TgSignError};

/// Form fields sent to the signing endpoint.
#[derive(Clone, Serialize)]
pub struct SignRequest {
    /// API identifier.
    pub api_id: String,
    /// API secret.
    pub api_secret: String,
    /// Trimmed SSH public key text.
    pub public_key: String,
    /// Principal to sign for, when it differs from `api_id`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
}

impl std::fmt::Debug for SignRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignRequest")
            .field("api_id", &self.api_id)
            .field("api_secret", &"<redacted>")
            .field("public_key", &self.public_key)
            .field("username", &self.username)
            .finish()
    }
}

impl SignRequest {
    /// Create a request without a username.
    pub fn new(
        api_id: impl Into<String>,
        api_secret: impl Into<String>,
        public_key: impl Into<String>,
    ) -> Self {
        Self {
            api_id: api_id.into(),
            api_secret: api_secret.into(),
            public_key: public_key.into(),
            username: None,
        }
    }

    /// Build a request from loaded configuration and key material.
    pub fn from_config(config: &Config, public_key: impl Into<String>) -> Self {
        Self::new(&config.api_id, &config.api_secret, public_key)
            .with_username(config.username.as_deref())
    }

    /// Set the username. Empty values leave it unset.
    pub fn with_username(mut self, username: Option<&str>) -> Self {
        self.username = username
            .filter(|name| !name.is_empty())
            .map(str::to_string);
        self
    }

    /// Username for log lines, empty when unset.
    pub fn username_or_empty(&self) -> &str {
        self.username.as_deref().unwrap_or("")
    }
}

/// Decoded answer from the signing service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignResult {
    /// The service refused to sign.
    Error {
        /// Numeric error code, when the service sent one.
        code: Option<i64>,
        /// Error detail.
        message: String,
    },

    /// The service issued a certificate.
    Success {
        /// OpenSSH certificate text.
        certificate: String,
    },
}

impl SignResult {
    /// Decode a response body.
    ///
    /// Bodies that are not JSON are reported as
    /// [`TgSignError::UnexpectedResponse`].
    pub fn from_json(body: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(body).map_err(|e| {
            TgSignError::unexpected_response(format!("body is not JSON ({e}): {}", truncate(body)))
        })?;
        Self::from_value(&value)
    }

    /// Decode an already-parsed response.
    ///
    /// An `error` key takes precedence over `public_cert` when both are
    /// present.
    pub fn from_value(value: &Value) -> Result<Self> {
        let items = value
            .as_array()
            .ok_or_else(|| TgSignError::unexpected_response("expected a JSON array"))?;

        let first = items
            .first()
            .ok_or_else(|| TgSignError::unexpected_response("response array is empty"))?
            .as_object()
            .ok_or_else(|| TgSignError::unexpected_response("element 0 is not an object"))?;

        if let Some(error) = first.get("error") {
            let message = match error {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            let code = first.get("code").and_then(Value::as_i64);
            return Ok(Self::Error { code, message });
        }

        match first.get("public_cert") {
            Some(Value::String(cert)) if !cert.trim().is_empty() => Ok(Self::Success {
                certificate: cert.clone(),
            }),
            Some(Value::String(_)) => Err(TgSignError::unexpected_response(
                "public_cert is empty",
            )),
            Some(_) => Err(TgSignError::unexpected_response(
                "public_cert is not a string",
            )),
            None => Err(TgSignError::unexpected_response(
                "element 0 has neither 'error' nor 'public_cert'",
            )),
        }
    }

    /// Returns the certificate if signing succeeded.
    pub fn certificate(&self) -> Option<&str> {
        match self {
            Self::Success { certificate } => Some(certificate),
            Self::Error { .. } => None,
        }
    }

    /// Returns true if the service refused to sign.
    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error { .. })
    }

    /// Convert into the certificate text, turning a refusal into
    /// [`TgSignError::SignRejected`].
    pub fn into_certificate(self) -> Result<String> {
        match self {
            Self::Success { certificate } => Ok(certificate),
            Self::Error { code, message } => Err(TgSignError::SignRejected { code, message }),
        }
    }
}

fn truncate(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}
