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

//! The sign-and-install workflow.
//!
//! ```text
//! load config ──► load public key ──► sign ──► install ──► done
//!      │                 │              │          │
//!   exit 1            exit 2         exit 3     exit 4
//! ```
//!
//! Each stage aborts the run on failure. Nothing is retried, and the
//! certificate file is only touched once signing has succeeded.

use std::path::PathBuf;
use std::sync::Arc;

use url::Url;

use crate::client::SigningClient;
use crate::config::ConfigLoader;
use crate::error::{Result, exit_codes};
use crate::install::install;
use crate::key::load_public_key;
use crate::logging::{LogLevel, Logger};
use crate::types::SignRequest;

/// Run the full workflow and return the installed certificate path.
///
/// # Errors
///
/// Returns the first stage failure; see
/// [`TgSignError::exit_code`](crate::TgSignError::exit_code) for the
/// mapping to process exit codes.
pub async fn run(
    loader: &ConfigLoader,
    sign_url: &Url,
    logger: Arc<dyn Logger>,
) -> Result<PathBuf> {
    logger.debug(&format!("Using {} config", loader.path().display()));

    let config = loader.load_config(logger.as_ref())?;

    let public_key_path = config.public_key_path();
    let public_key = load_public_key(&public_key_path, logger.as_ref())?;

    let client = SigningClient::with_url(sign_url.clone(), Arc::clone(&logger))?;
    let request = SignRequest::from_config(&config, public_key);
    let certificate = client.sign_certificate(&request).await?;

    install(&public_key_path, &certificate, logger.as_ref())
}

/// Run the workflow and reduce the outcome to a process exit code.
///
/// Failures are logged with the stage they belong to.
pub async fn run_to_exit_code(
    loader: &ConfigLoader,
    sign_url: &Url,
    logger: Arc<dyn Logger>,
) -> u8 {
    match run(loader, sign_url, Arc::clone(&logger)).await {
        Ok(_) => exit_codes::SUCCESS,
        Err(e) => {
            let code = e.exit_code();
            let stage = match code {
                exit_codes::CONFIG => "config",
                exit_codes::PUBLIC_KEY => "public key",
                exit_codes::SIGNING => "sign",
                _ => "install",
            };
            logger.log_with_fields(
                LogLevel::Error,
                &e.to_string(),
                &[("stage", stage), ("exit_code", code.to_string().as_str())],
            );
            code
        }
    }
}
