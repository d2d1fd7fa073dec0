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

//! # tgsign
//!
//! Request a signed SSH certificate for a local public key and install it
//! next to the key.
//!
//! A run has three stages:
//!
//! 1. **Configuration** ([`config`]): read `~/.tgsign.conf` and the public key
//! 2. **Signing** ([`client`]): POST the key to the signing service and
//!    decode its JSON answer into a [`SignResult`]
//! 3. **Installation** ([`install`]): write `<key>-cert.pub` atomically with
//!    mode `0600`
//!
//! [`workflow::run`] chains them. This crate performs no cryptography; it
//! trusts the signing service to issue a valid certificate.
//!
//! ## Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use tgsign::config::ConfigLoader;
//! use tgsign::logging::TracingLogger;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let loader = ConfigLoader::new();
//!     let url = url::Url::parse(tgsign::client::DEFAULT_SIGN_URL)?;
//!
//!     let cert_path = tgsign::workflow::run(&loader, &url, Arc::new(TracingLogger)).await?;
//!     println!("Installed {}", cert_path.display());
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Configuration File
//!
//! ```ini
//! [tgsign]
//! api_id = ops-team
//! api_secret = hunter2
//! public_key_file = ~/.ssh/id_ed25519.pub
//! username = alice
//! ```
//!
//! `username` is optional. The API secret is never logged.

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod client;
pub mod config;
pub mod error;
pub mod install;
pub mod key;
pub mod logging;
pub mod types;
pub mod wizard;
pub mod workflow;

// Re-export main types at crate root for convenience
pub use client::SigningClient;
pub use config::{Config, ConfigFile, ConfigLoader};
pub use error::{Result, TgSignError};
pub use types::{SignRequest, SignResult};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// User-Agent string for HTTP requests.
pub const USER_AGENT: &str = concat!("tgsign/", env!("CARGO_PKG_VERSION"));
