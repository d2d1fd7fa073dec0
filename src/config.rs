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

//! Operator configuration.
//!
//! Settings live in an INI file, `~/.tgsign.conf` by default:
//!
//! ```ini
//! [tgsign]
//! api_id = ops-team
//! api_secret = hunter2
//! public_key_file = ~/.ssh/id_ed25519.pub
//! username = alice
//! ```
//!
//! Loading is split in two steps. [`ConfigLoader::load`] only reads and
//! parses the file, returning `None` when there is nothing to read.
//! [`ConfigFile::tgsign`] then pulls the `[tgsign]` section out and reports
//! any missing key.
//!
//! Values are taken literally: backslashes and quotes are part of the
//! value, so Windows paths and secrets survive a save and reload. Key names
//! match case-insensitively (`API_ID` is `api_id`); the section name does
//! not.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use ini::{EscapePolicy, Ini, ParseOption};

use crate::error::{Result, TgSignError};
use crate::logging::Logger;

/// File name of the configuration file inside the home directory.
pub const CONF_FILE_NAME: &str = ".tgsign.conf";

/// Name of the INI section holding all settings.
pub const SECTION: &str = "tgsign";

/// Settings for one signing run.
#[derive(Clone, PartialEq, Eq)]
pub struct Config {
    /// API identifier.
    pub api_id: String,

    /// API secret. Never logged.
    pub api_secret: String,

    /// Path to the SSH public key, possibly starting with `~`.
    pub public_key_file: PathBuf,

    /// Principal to sign for, when it differs from `api_id`.
    pub username: Option<String>,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("api_id", &self.api_id)
            .field("api_secret", &"<redacted>")
            .field("public_key_file", &self.public_key_file)
            .field("username", &self.username)
            .finish()
    }
}

impl Config {
    /// Public key path with a leading `~` expanded.
    pub fn public_key_path(&self) -> PathBuf {
        expand_home(&self.public_key_file)
    }

    /// Render as an INI document with a single `[tgsign]` section.
    pub fn to_ini(&self) -> Ini {
        let mut ini = Ini::new();
        ini.with_section(Some(SECTION))
            .set("api_id", self.api_id.as_str())
            .set("api_secret", self.api_secret.as_str())
            .set(
                "public_key_file",
                self.public_key_file.to_string_lossy().into_owned(),
            );

        if let Some(username) = self.username.as_deref().filter(|u| !u.is_empty()) {
            ini.with_section(Some(SECTION)).set("username", username);
        }

        ini
    }
}

/// A parsed configuration file whose fields have not been checked yet.
#[derive(Debug, Clone)]
pub struct ConfigFile {
    path: PathBuf,
    ini: Ini,
}

impl ConfigFile {
    /// Parse INI content that was read from `path`.
    pub fn parse(path: impl Into<PathBuf>, content: &str) -> Result<Self> {
        let path = path.into();
        let ini = Ini::load_from_str_opt(content, literal_values())
            .map_err(|e| TgSignError::ConfigParse {
                path: path.clone(),
                message: e.to_string(),
            })?;

        Ok(Self { path, ini })
    }

    /// Path the file was read from.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Extract the `[tgsign]` section.
    ///
    /// # Errors
    ///
    /// - [`TgSignError::MissingSection`] when the section is absent
    /// - [`TgSignError::MissingField`] when `api_id`, `api_secret` or
    ///   `public_key_file` is absent or empty
    pub fn tgsign(&self) -> Result<Config> {
        let section = self
            .ini
            .section(Some(SECTION))
            .ok_or_else(|| TgSignError::MissingSection {
                path: self.path.clone(),
                section: SECTION.to_string(),
            })?;

        let lookup = |field: &str| -> Option<String> {
            section
                .iter()
                .find(|(key, _)| key.eq_ignore_ascii_case(field))
                .map(|(_, value)| value)
                .filter(|value| !value.is_empty())
                .map(str::to_string)
        };
        let required = |field: &'static str| -> Result<String> {
            lookup(field).ok_or_else(|| TgSignError::missing_field(SECTION, field))
        };

        Ok(Config {
            api_id: required("api_id")?,
            api_secret: required("api_secret")?,
            public_key_file: PathBuf::from(required("public_key_file")?),
            username: lookup("username"),
        })
    }
}

/// Locates, reads and writes the configuration file.
///
/// # Example
///
/// ```no_run
/// use tgsign::config::ConfigLoader;
/// use tgsign::logging::TracingLogger;
///
/// let loader = ConfigLoader::new().with_path("/etc/tgsign.conf");
/// match loader.load(&TracingLogger)? {
///     Some(file) => println!("api_id = {}", file.tgsign()?.api_id),
///     None => println!("run `tgsign --init` first"),
/// }
/// # Ok::<(), tgsign::TgSignError>(())
/// ```
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    path: PathBuf,
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigLoader {
    /// Loader for `~/.tgsign.conf`.
    pub fn new() -> Self {
        Self {
            path: default_config_path(),
        }
    }

    /// Use an explicit configuration file path.
    pub fn with_path(mut self, path: impl AsRef<Path>) -> Self {
        self.path = expand_home(path.as_ref());
        self
    }

    /// Configuration file path this loader uses.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read and parse the configuration file.
    ///
    /// Returns `Ok(None)` if the file does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or is not
    /// valid INI.
    pub fn load(&self, logger: &dyn Logger) -> Result<Option<ConfigFile>> {
        if !self.path.exists() {
            logger.info(&format!(
                "No config @ {}. Please run with `--init` or manually create {}",
                self.path.display(),
                self.path.display()
            ));
            return Ok(None);
        }

        logger.debug(&format!("Loading found config @ {}", self.path.display()));

        let content = std::fs::read_to_string(&self.path).map_err(|e| TgSignError::ConfigParse {
            path: self.path.clone(),
            message: e.to_string(),
        })?;

        ConfigFile::parse(&self.path, &content).map(Some)
    }

    /// Load the file and extract the `[tgsign]` section in one go.
    ///
    /// A missing file becomes [`TgSignError::NoConfig`].
    pub fn load_config(&self, logger: &dyn Logger) -> Result<Config> {
        let file = self.load(logger)?.ok_or_else(|| TgSignError::NoConfig {
            path: self.path.clone(),
        })?;
        file.tgsign()
    }

    /// Write `config` to the configuration file, replacing any existing one.
    ///
    /// The file holds the API secret, so it is restricted to the owner.
    pub fn save(&self, config: &Config, logger: &dyn Logger) -> Result<()> {
        logger.info(&format!("Generating {}", self.path.display()));

        let mut options = OpenOptions::new();
        options.write(true).create(true).truncate(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(0o600);
        }

        let mut file = options.open(&self.path)?;
        config.to_ini().write_to_policy(&mut file, EscapePolicy::Nothing)?;
        file.flush()?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(&self.path, std::fs::Permissions::from_mode(0o600))?;
        }

        logger.info(&format!("Wrote config to {}", self.path.display()));
        Ok(())
    }
}

/// Parser options that keep backslashes and quotes as written.
fn literal_values() -> ParseOption {
    ParseOption {
        enabled_escape: false,
        enabled_quote: false,
        ..Default::default()
    }
}

/// `~/.tgsign.conf`, falling back to the current directory when the home
/// directory is unknown.
pub fn default_config_path() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(CONF_FILE_NAME)
}

/// Expand a leading `~` component to the home directory.
///
/// Paths without a leading `~` (and `~user` forms) are returned unchanged.
pub fn expand_home(path: &Path) -> PathBuf {
    match (path.strip_prefix("~"), dirs::home_dir()) {
        (Ok(rest), Some(home)) if rest.as_os_str().is_empty() => home,
        (Ok(rest), Some(home)) => home.join(rest),
        _ => path.to_path_buf(),
    }
}
