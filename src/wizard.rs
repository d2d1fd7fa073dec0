// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 U.S. Federal Government (in countries where recognized)

//! Interactive first-run setup.
//!
//! Used by `tgsign --init`. The prompts are read from any [`BufRead`] and
//! written to any [`Write`], so the wizard runs the same against a terminal
//! or a script.

use std::io::{BufRead, Write};
use std::path::PathBuf;

use crate::config::{Config, ConfigLoader};
use crate::error::{Result, TgSignError};
use crate::logging::Logger;

/// Ask for each setting in turn and build a [`Config`].
///
/// An empty username answer leaves the username unset.
///
/// # Errors
///
/// Returns an error if reading or writing fails, input ends early, or a
/// required answer is empty.
pub fn prompt_config<R: BufRead, W: Write>(input: &mut R, output: &mut W) -> Result<Config> {
    let api_id = ask(input, output, "API ID: ", Some("api_id"))?;
    let api_secret = ask(input, output, "API Secret: ", Some("api_secret"))?;
    let public_key_file = ask(input, output, "Public Key File path: ", Some("public_key_file"))?;
    let username = ask(
        input,
        output,
        "Username (different to app_id? hit enter if not): ",
        None,
    )?;

    Ok(Config {
        api_id,
        api_secret,
        public_key_file: PathBuf::from(public_key_file),
        username: Some(username).filter(|u| !u.is_empty()),
    })
}

/// Prompt for a configuration and save it with `loader`.
pub fn init_config<R: BufRead, W: Write>(
    loader: &ConfigLoader,
    input: &mut R,
    output: &mut W,
    logger: &dyn Logger,
) -> Result<Config> {
    let config = prompt_config(input, output)?;
    loader.save(&config, logger)?;
    Ok(config)
}

/// Print `prompt` and read one trimmed line. `required` names the field
/// that must not be empty.
fn ask<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
    prompt: &str,
    required: Option<&'static str>,
) -> Result<String> {
    output.write_all(prompt.as_bytes())?;
    output.flush()?;

    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Err(TgSignError::Io(std::io::Error::new(
            std::io::ErrorKind::UnexpectedEof,
            format!("input ended before '{}'", prompt.trim_end_matches([':', ' '])),
        )));
    }

    let answer = line.trim().to_string();
    match required {
        Some(field) if answer.is_empty() => Err(TgSignError::missing_field(
            crate::config::SECTION,
            field,
        )),
        _ => Ok(answer),
    }
}
