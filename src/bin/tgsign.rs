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

//! tgsign Command-Line Tool
//!
//! Signs the configured SSH public key and installs the certificate.
//!
//! # Usage
//!
//! ```text
//! tgsign [OPTIONS]
//!
//! Options:
//!   -d, --debug           Verbose debug output
//!   -i, --init            Interactively populate ~/.tgsign.conf
//!   -u, --url <URL>       Sign API URL [default: https://sw.terragraph.link/sign]
//!   -c, --config <PATH>   Path to configuration file [default: ~/.tgsign.conf]
//!   -h, --help            Print help
//!   -V, --version         Print version
//! ```
//!
//! # Exit Codes
//!
//! | Code | Meaning |
//! |------|---------|
//! | 0 | Certificate installed |
//! | 1 | Configuration missing or invalid |
//! | 2 | Public key missing or empty |
//! | 3 | Signing failed |
//! | 4 | Certificate could not be written |

use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use tgsign::client::DEFAULT_SIGN_URL;
use tgsign::config::{CONF_FILE_NAME, ConfigLoader};
use tgsign::error::exit_codes;
use tgsign::logging::{Logger, TracingLogger};

/// Sign Public keys for TG Access
#[derive(Parser)]
#[command(name = "tgsign")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Sign SSH public keys and install the certificate", long_about = None)]
struct Cli {
    /// Verbose debug output
    #[arg(short, long)]
    debug: bool,

    /// Interactively populate ~/.tgsign.conf
    #[arg(short, long)]
    init: bool,

    /// Sign API URL
    #[arg(short, long, value_name = "URL", default_value = DEFAULT_SIGN_URL)]
    url: url::Url,

    /// Path to configuration file
    #[arg(short, long, value_name = "PATH")]
    config: Option<PathBuf>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let log_level = if cli.debug {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };

    tracing_subscriber::fmt()
        .with_max_level(log_level)
        .with_target(false)
        .with_file(cli.debug)
        .with_line_number(cli.debug)
        .init();

    let logger: Arc<dyn Logger> = Arc::new(TracingLogger);
    logger.debug(&format!("Starting {}", env!("CARGO_PKG_NAME")));

    let loader = match &cli.config {
        Some(path) => ConfigLoader::new().with_path(path),
        None => ConfigLoader::new(),
    };

    if cli.init {
        return cmd_init(&loader, logger.as_ref());
    }

    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(rt) => rt,
        Err(e) => {
            logger.error(&format!("Failed to create async runtime: {}", e));
            return ExitCode::FAILURE;
        }
    };

    let code = runtime.block_on(tgsign::workflow::run_to_exit_code(&loader, &cli.url, logger));
    ExitCode::from(code)
}

fn cmd_init(loader: &ConfigLoader, logger: &dyn Logger) -> ExitCode {
    logger.info(&format!("Generating a {}", CONF_FILE_NAME));

    let stdin = std::io::stdin();
    let mut input = stdin.lock();
    let mut output = std::io::stdout();

    match tgsign::wizard::init_config(loader, &mut input, &mut output, logger) {
        Ok(_) => ExitCode::from(exit_codes::SUCCESS),
        Err(e) => {
            logger.error(&format!("Failed to write {}: {}", loader.path().display(), e));
            ExitCode::from(e.exit_code())
        }
    }
}
