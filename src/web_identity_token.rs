/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0.
 */

//! Web Identity Token Credential Provider

use crate::sts::{self, StsClientSettings};
use crate::{BuildError, PropertyKey};
use aws_credential_types::provider::error::CredentialsError;
use aws_credential_types::provider::{self, future, ProvideCredentials};
use std::path::PathBuf;
use tokio::sync::OnceCell;
use tracing::Instrument;

/// Exchanges an OIDC token for role credentials with STS `AssumeRoleWithWebIdentity`
///
/// The token file is re-read on every request so that rotated tokens are picked up. The STS
/// request is unsigned.
#[derive(Debug)]
pub struct WebIdentityTokenCredentialProvider {
    role_arn: String,
    session_name: String,
    token_file: PathBuf,
    settings: StsClientSettings,
    client: OnceCell<aws_sdk_sts::Client>,
}

impl WebIdentityTokenCredentialProvider {
    pub fn builder() -> Builder {
        Builder::default()
    }

    async fn credentials(&self) -> provider::Result {
        let token = tokio::fs::read(&self.token_file)
            .await
            .map_err(CredentialsError::provider_error)?;
        let token = String::from_utf8(token).map_err(|_utf_8_error| {
            CredentialsError::unhandled("WebIdentityToken was not valid UTF-8")
        })?;
        let client = self
            .client
            .get_or_init(|| self.settings.web_identity_client())
            .await;
        let output = client
            .assume_role_with_web_identity()
            .role_arn(&self.role_arn)
            .role_session_name(&self.session_name)
            .web_identity_token(token.trim())
            .send()
            .await
            .map_err(CredentialsError::provider_error)?;
        sts::into_credentials(output.credentials, "WebIdentityToken")
    }

    pub fn session_name(&self) -> &str {
        &self.session_name
    }
}

impl ProvideCredentials for WebIdentityTokenCredentialProvider {
    fn provide_credentials<'a>(&'a self) -> future::ProvideCredentials<'a>
    where
        Self: 'a,
    {
        future::ProvideCredentials::new(self.credentials().instrument(tracing::info_span!(
            "web_identity_token",
            role_arn = %self.role_arn,
            session_name = %self.session_name
        )))
    }
}

#[derive(Debug, Default)]
pub struct Builder {
    role_arn: Option<String>,
    session_name: Option<String>,
    token_file: Option<PathBuf>,
    settings: StsClientSettings,
}

impl Builder {
    pub fn role_arn(mut self, role_arn: impl Into<String>) -> Self {
        self.role_arn = Some(role_arn.into());
        self
    }

    pub fn session_name(mut self, session_name: impl Into<String>) -> Self {
        self.session_name = Some(session_name.into());
        self
    }

    /// Set the session name; `None` (or an empty name) generates `nifi-<epoch millis>`
    pub fn set_session_name(&mut self, session_name: Option<String>) -> &mut Self {
        self.session_name = session_name;
        self
    }

    pub fn token_file(mut self, token_file: impl Into<PathBuf>) -> Self {
        self.token_file = Some(token_file.into());
        self
    }

    pub(crate) fn settings(mut self, settings: StsClientSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn build(self) -> Result<WebIdentityTokenCredentialProvider, BuildError> {
        let role_arn = self.role_arn.ok_or(BuildError::MissingProperty {
            key: PropertyKey::WebIdentityRoleArn,
        })?;
        let token_file = self.token_file.ok_or(BuildError::MissingProperty {
            key: PropertyKey::WebIdentityTokenFile,
        })?;
        let session_name = self
            .session_name
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| sts::default_session_name("nifi"));
        Ok(WebIdentityTokenCredentialProvider {
            role_arn,
            session_name,
            token_file,
            settings: self.settings,
            client: OnceCell::new(),
        })
    }
}
