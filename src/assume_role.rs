/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0.
 */

//! Assume Role Credential Provider

use crate::sts::{self, StsClientSettings};
use aws_credential_types::provider::error::CredentialsError;
use aws_credential_types::provider::{self, future, ProvideCredentials, SharedCredentialsProvider};
use tokio::sync::OnceCell;
use tracing::Instrument;

/// Exchanges source credentials for temporary role credentials with STS `AssumeRole`
///
/// Source credentials sign the STS request; without them the request is sent unsigned.
#[derive(Debug)]
pub struct AssumeRoleProvider {
    role_arn: String,
    session_name: String,
    external_id: Option<String>,
    duration_seconds: Option<i32>,
    source: Option<SharedCredentialsProvider>,
    settings: StsClientSettings,
    client: OnceCell<aws_sdk_sts::Client>,
}

impl AssumeRoleProvider {
    pub fn builder() -> Builder {
        Builder::default()
    }

    async fn credentials(&self) -> provider::Result {
        let client = self
            .client
            .get_or_init(|| self.settings.assume_role_client(self.source.clone()))
            .await;
        tracing::debug!(
            role_arn = %self.role_arn,
            session_name = %self.session_name,
            proxy = ?self.settings.proxy().map(|proxy| proxy.uri()),
            "assuming role"
        );
        let output = client
            .assume_role()
            .role_arn(&self.role_arn)
            .role_session_name(&self.session_name)
            .set_external_id(self.external_id.clone())
            .set_duration_seconds(self.duration_seconds)
            .send()
            .await
            .map_err(CredentialsError::provider_error)?;
        sts::into_credentials(output.credentials, "AssumeRoleProvider")
    }
}

impl ProvideCredentials for AssumeRoleProvider {
    fn provide_credentials<'a>(&'a self) -> future::ProvideCredentials<'a>
    where
        Self: 'a,
    {
        future::ProvideCredentials::new(
            self.credentials()
                .instrument(tracing::info_span!("assume_role", role_arn = %self.role_arn)),
        )
    }
}

#[derive(Debug, Default)]
pub struct Builder {
    role_arn: Option<String>,
    session_name: Option<String>,
    external_id: Option<String>,
    duration_seconds: Option<i32>,
    source: Option<SharedCredentialsProvider>,
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

    pub fn external_id(mut self, external_id: impl Into<String>) -> Self {
        self.external_id = Some(external_id.into());
        self
    }

    pub fn set_external_id(&mut self, external_id: Option<String>) -> &mut Self {
        self.external_id = external_id;
        self
    }

    /// Session length in seconds
    pub fn duration_seconds(mut self, duration_seconds: i32) -> Self {
        self.duration_seconds = Some(duration_seconds);
        self
    }

    pub fn set_duration_seconds(&mut self, duration_seconds: Option<i32>) -> &mut Self {
        self.duration_seconds = duration_seconds;
        self
    }

    /// Credentials used to sign the `AssumeRole` request
    pub fn source(mut self, source: SharedCredentialsProvider) -> Self {
        self.source = Some(source);
        self
    }

    pub fn set_source(&mut self, source: Option<SharedCredentialsProvider>) -> &mut Self {
        self.source = source;
        self
    }

    pub(crate) fn settings(mut self, settings: StsClientSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Build the provider
    ///
    /// A default session name is generated when none was given.
    pub fn build(self) -> Result<AssumeRoleProvider, crate::BuildError> {
        let role_arn = self.role_arn.ok_or(crate::BuildError::MissingProperty {
            key: crate::PropertyKey::AssumeRoleArn,
        })?;
        Ok(AssumeRoleProvider {
            role_arn,
            session_name: self
                .session_name
                .unwrap_or_else(|| sts::default_session_name("assume-role-provider")),
            external_id: self.external_id,
            duration_seconds: self.duration_seconds,
            source: self.source,
            settings: self.settings,
            client: OnceCell::new(),
        })
    }
}
