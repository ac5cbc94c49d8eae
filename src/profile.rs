/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0.
 */

//! File Based Providers
//!
//! Two sources are supported:
//!
//! 1. A named profile from the shared config files (`~/.aws/config`, `~/.aws/credentials`)
//! 2. An explicit credentials file. Both the properties format
//!    ```properties
//!    accessKey=AKIDEXAMPLE
//!    secretKey=wJalrXUtnFEMI/K7MDENG
//!    ```
//!    and the `[default]` profile of the shared credentials format are accepted:
//!    ```ini
//!    [default]
//!    aws_access_key_id = AKIDEXAMPLE
//!    aws_secret_access_key = wJalrXUtnFEMI/K7MDENG
//!    ```
//!
//! Files are read when credentials are requested, not when the provider is built.

use aws_config::profile::ProfileFileCredentialsProvider;
use aws_credential_types::provider::error::CredentialsError;
use aws_credential_types::provider::{self, future, ProvideCredentials};
use aws_credential_types::Credentials;
use std::error::Error;
use std::fmt::{self, Display, Formatter};
use std::io;
use std::path::PathBuf;
use tracing::Instrument;

/// Provider for the profile `name` of the shared config files
pub(crate) fn named_profile(name: &str) -> ProfileFileCredentialsProvider {
    ProfileFileCredentialsProvider::builder()
        .profile_name(name)
        .build()
}

/// Static credentials read from an explicit credentials file
///
/// The file is re-read on every request.
#[derive(Debug)]
pub(crate) struct CredentialsFileProvider {
    path: PathBuf,
}

impl CredentialsFileProvider {
    pub(crate) fn new(path: impl Into<PathBuf>) -> Self {
        CredentialsFileProvider { path: path.into() }
    }

    async fn credentials(&self) -> provider::Result {
        let contents = tokio::fs::read_to_string(&self.path).await.map_err(|source| {
            CredentialsError::invalid_configuration(CredentialsFileError::Io {
                path: self.path.clone(),
                source,
            })
        })?;
        parse_credentials_file(&contents).map_err(CredentialsError::invalid_configuration)
    }
}

impl ProvideCredentials for CredentialsFileProvider {
    fn provide_credentials<'a>(&'a self) -> future::ProvideCredentials<'a>
    where
        Self: 'a,
    {
        future::ProvideCredentials::new(self.credentials().instrument(tracing::debug_span!(
            "credentials_file",
            path = %self.path.display()
        )))
    }
}

#[derive(Debug)]
enum CredentialsFileError {
    Io { path: PathBuf, source: io::Error },
    MissingKey { key: &'static str },
}

impl Display for CredentialsFileError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            CredentialsFileError::Io { path, .. } => {
                write!(f, "could not read credentials file {}", path.display())
            }
            CredentialsFileError::MissingKey { key } => {
                write!(f, "the credentials file does not define `{}`", key)
            }
        }
    }
}

impl Error for CredentialsFileError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            CredentialsFileError::Io { source, .. } => Some(source),
            CredentialsFileError::MissingKey { .. } => None,
        }
    }
}

/// Parse `key=value` (or `key: value`) lines
///
/// Keys outside any section or in `[default]` are read; comments start with `#`, `!` or `;`.
fn parse_credentials_file(contents: &str) -> Result<Credentials, CredentialsFileError> {
    let mut section: Option<&str> = None;
    let mut access_key = None;
    let mut secret_key = None;
    let mut session_token = None;
    for line in contents.lines().map(str::trim) {
        if line.is_empty() || line.starts_with(['#', '!', ';']) {
            continue;
        }
        if let Some(name) = line.strip_prefix('[').and_then(|l| l.strip_suffix(']')) {
            section = Some(name.trim());
            continue;
        }
        if !matches!(section, None | Some("default")) {
            continue;
        }
        let (key, value) = match line.find(['=', ':']) {
            Some(separator) => (line[..separator].trim(), line[separator + 1..].trim()),
            None => continue,
        };
        if value.is_empty() {
            continue;
        }
        match key {
            "accessKey" | "aws_access_key_id" => access_key = Some(value),
            "secretKey" | "aws_secret_access_key" => secret_key = Some(value),
            "aws_session_token" => session_token = Some(value),
            _ => {}
        }
    }
    let access_key = access_key.ok_or(CredentialsFileError::MissingKey { key: "accessKey" })?;
    let secret_key = secret_key.ok_or(CredentialsFileError::MissingKey { key: "secretKey" })?;
    Ok(Credentials::new(
        access_key,
        secret_key,
        session_token.map(str::to_string),
        None,
        "CredentialsFile",
    ))
}
