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

//! Signing service client.
//!
//! This module provides [`SigningClient`], which submits a public key to the
//! signing endpoint and decodes the answer into a [`SignResult`].

use std::sync::Arc;

use url::Url;

use crate::error::{Result, TgSignError};
use crate::logging::{LogLevel, Logger};
use crate::types::{SignRequest, SignResult};
use crate::USER_AGENT;

/// Default signing endpoint.
pub const DEFAULT_SIGN_URL: &str = "https://sw.terragraph.link/sign";

/// Client for the certificate signing endpoint.
///
/// Each call to [`SigningClient::sign`] is exactly one POST. There is no
/// retry and no timeout beyond the transport defaults.
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use tgsign::{SignRequest, SigningClient};
/// use tgsign::logging::TracingLogger;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let client = SigningClient::new(tgsign::client::DEFAULT_SIGN_URL, Arc::new(TracingLogger))?;
///
/// let request = SignRequest::new("ops-team", "hunter2", "ssh-ed25519 AAAA...");
/// let certificate = client.sign_certificate(&request).await?;
/// println!("{certificate}");
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct SigningClient {
    sign_url: Url,
    http: reqwest::Client,
    logger: Arc<dyn Logger>,
}

impl std::fmt::Debug for SigningClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SigningClient")
            .field("sign_url", &self.sign_url)
            .finish()
    }
}

impl SigningClient {
    /// Create a client for the given signing endpoint.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL does not parse or the HTTP client cannot
    /// be built.
    pub fn new(sign_url: impl AsRef<str>, logger: Arc<dyn Logger>) -> Result<Self> {
        Self::with_url(Url::parse(sign_url.as_ref())?, logger)
    }

    /// Create a client from a pre-parsed URL.
    pub fn with_url(sign_url: Url, logger: Arc<dyn Logger>) -> Result<Self> {
        let http = reqwest::Client::builder().user_agent(USER_AGENT).build()?;

        Ok(Self {
            sign_url,
            http,
            logger,
        })
    }

    /// Signing endpoint this client posts to.
    pub fn sign_url(&self) -> &Url {
        &self.sign_url
    }

    /// Submit `request` and decode the service's answer.
    ///
    /// A refusal from the service is `Ok(SignResult::Error { .. })` and is
    /// logged with the API id and username.
    ///
    /// # Errors
    ///
    /// - [`TgSignError::Http`] if the request cannot be sent or read
    /// - [`TgSignError::ServerError`] for a non-success status without a
    ///   JSON body
    /// - [`TgSignError::UnexpectedResponse`] for any other body shape
    pub async fn sign(&self, request: &SignRequest) -> Result<SignResult> {
        self.logger.debug(&format!(
            "POST {} for {} / ({})",
            self.sign_url,
            request.api_id,
            request.username_or_empty()
        ));

        let response = self
            .http
            .post(self.sign_url.clone())
            .form(request)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        let result = match SignResult::from_json(&body) {
            Ok(result) => result,
            Err(_) if !status.is_success() => {
                return Err(TgSignError::server_error(status.as_u16(), body));
            }
            Err(e) => return Err(e),
        };

        if let SignResult::Error { code, message } = &result {
            let code = code.map(|c| c.to_string()).unwrap_or_default();
            self.logger.log_with_fields(
                LogLevel::Error,
                &format!(
                    "Problem signing key for {} / ({}): {}",
                    request.api_id,
                    request.username_or_empty(),
                    message
                ),
                &[("code", code.as_str())],
            );
        }

        Ok(result)
    }

    /// Submit `request` and return the issued certificate text.
    ///
    /// A refusal from the service becomes [`TgSignError::SignRejected`].
    pub async fn sign_certificate(&self, request: &SignRequest) -> Result<String> {
        self.sign(request).await?.into_certificate()
    }
}
