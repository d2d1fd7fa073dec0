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

//! Certificate installation.
//!
//! A signed certificate for `~/.ssh/id_ed25519.pub` is installed as
//! `~/.ssh/id_ed25519-cert.pub`, the name OpenSSH looks for. Installation:
//!
//! 1. Write the certificate to `~/.ssh/.id_ed25519-cert.pub` and sync it
//! 2. Rename it over `~/.ssh/id_ed25519-cert.pub`
//! 3. Force the final file to mode `0600`
//!
//! Readers of the certificate path see either the old file or the new one,
//! never a partial write.

use std::ffi::OsString;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::error::{Result, TgSignError};
use crate::logging::Logger;

/// Suffix of SSH public key files.
pub const PUBLIC_KEY_SUFFIX: &str = ".pub";

/// Suffix OpenSSH expects for certificate files.
pub const CERT_SUFFIX: &str = "-cert.pub";

/// Mode applied to installed certificates.
pub const CERT_MODE: u32 = 0o600;

/// Certificate path for a public key path.
///
/// A trailing `.pub` becomes `-cert.pub`; names without it get `-cert.pub`
/// appended so the key itself is never the target.
///
/// # Errors
///
/// Returns [`TgSignError::Install`] if `public_key_path` has no file name.
pub fn cert_path_for(public_key_path: &Path) -> Result<PathBuf> {
    let name = file_name(public_key_path)?;
    let stem = name.strip_suffix(PUBLIC_KEY_SUFFIX).unwrap_or(&name);

    Ok(public_key_path.with_file_name(format!("{stem}{CERT_SUFFIX}")))
}

/// Hidden temporary path next to the certificate path.
pub fn temp_path_for(cert_path: &Path) -> Result<PathBuf> {
    let name = file_name(cert_path)?;
    Ok(cert_path.with_file_name(format!(".{name}")))
}

fn file_name(path: &Path) -> Result<String> {
    path.file_name()
        .map(OsString::from)
        .and_then(|name| name.into_string().ok())
        .ok_or_else(|| {
            TgSignError::install(
                path,
                std::io::Error::new(
                    std::io::ErrorKind::InvalidInput,
                    "path has no UTF-8 file name",
                ),
            )
        })
}

/// Install `certificate` next to `public_key_path`.
///
/// Returns the path of the installed certificate.
///
/// # Errors
///
/// Returns [`TgSignError::Install`] if writing, renaming or restricting the
/// file fails. The temporary file is removed when the write or rename fails.
pub fn install(public_key_path: &Path, certificate: &str, logger: &dyn Logger) -> Result<PathBuf> {
    let cert_path = cert_path_for(public_key_path)?;
    let temp_path = temp_path_for(&cert_path)?;

    logger.debug(&format!("Writing certificate to {}", temp_path.display()));

    if let Err(e) = write_synced(&temp_path, certificate) {
        let _ = fs::remove_file(&temp_path);
        return Err(TgSignError::install(&temp_path, e));
    }

    if let Err(e) = fs::rename(&temp_path, &cert_path) {
        let _ = fs::remove_file(&temp_path);
        return Err(TgSignError::install(&cert_path, e));
    }

    restrict_permissions(&cert_path).map_err(|e| TgSignError::install(&cert_path, e))?;

    logger.info(&format!(
        "Successfully wrote out a new {} signed SSH Cert",
        cert_path.display()
    ));

    Ok(cert_path)
}

/// Write `certificate` plus a trailing newline and flush it to disk.
fn write_synced(path: &Path, certificate: &str) -> std::io::Result<()> {
    let mut options = OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(CERT_MODE);
    }

    let mut file = options.open(path)?;
    file.write_all(certificate.as_bytes())?;
    file.write_all(b"\n")?;
    file.sync_all()
}

#[cfg(unix)]
fn restrict_permissions(path: &Path) -> std::io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(CERT_MODE))
}

#[cfg(not(unix))]
fn restrict_permissions(_path: &Path) -> std::io::Result<()> {
    Ok(())
}
