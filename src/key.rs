// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 U.S. Federal Government (in countries where recognized)

//! Public key loading.

use std::path::Path;

use crate::error::{Result, TgSignError};
use crate::logging::Logger;

/// Read an SSH public key file, trimmed of surrounding whitespace.
///
/// # Errors
///
/// - [`TgSignError::PublicKeyNotFound`] if the file does not exist
/// - [`TgSignError::PublicKeyRead`] if it cannot be read
/// - [`TgSignError::PublicKeyEmpty`] if it holds only whitespace
pub fn load_public_key(path: &Path, logger: &dyn Logger) -> Result<String> {
    if !path.exists() {
        return Err(TgSignError::PublicKeyNotFound {
            path: path.to_path_buf(),
        });
    }

    logger.debug(&format!("Reading public key {}", path.display()));

    let content = std::fs::read_to_string(path).map_err(|source| TgSignError::PublicKeyRead {
        path: path.to_path_buf(),
        source,
    })?;

    let key = content.trim();
    if key.is_empty() {
        return Err(TgSignError::PublicKeyEmpty {
            path: path.to_path_buf(),
        });
    }

    Ok(key.to_string())
}
