/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0.
 */

use crate::strategy::CredentialsStrategy;
use aws_config::ConfigLoader;
use aws_credential_types::provider::error::CredentialsError;
use aws_credential_types::provider::{future, ProvideCredentials, SharedCredentialsProvider};

/// Credentials provider produced by a resolution pass
///
/// Anonymous handles carry no provider: requests made with them are sent unsigned.
#[derive(Clone, Debug)]
pub struct AwsCredentialsProvider {
    strategy: CredentialsStrategy,
    inner: Option<SharedCredentialsProvider>,
}

impl AwsCredentialsProvider {
    pub(crate) fn new(strategy: CredentialsStrategy, provider: impl ProvideCredentials + 'static) -> Self {
        AwsCredentialsProvider {
            strategy,
            inner: Some(SharedCredentialsProvider::new(provider)),
        }
    }

    pub(crate) fn anonymous() -> Self {
        AwsCredentialsProvider {
            strategy: CredentialsStrategy::Anonymous,
            inner: None,
        }
    }

    /// Strategy that built this provider
    pub fn strategy(&self) -> CredentialsStrategy {
        self.strategy
    }

    pub fn is_anonymous(&self) -> bool {
        self.inner.is_none()
    }

    /// The underlying provider, `None` for anonymous credentials
    pub fn shared(&self) -> Option<SharedCredentialsProvider> {
        self.inner.clone()
    }

    /// Install these credentials on an SDK config loader
    pub fn configure(&self, loader: ConfigLoader) -> ConfigLoader {
        match &self.inner {
            Some(provider) => loader.credentials_provider(provider.clone()),
            None => loader.no_credentials(),
        }
    }
}

impl ProvideCredentials for AwsCredentialsProvider {
    fn provide_credentials<'a>(&'a self) -> future::ProvideCredentials<'a>
    where
        Self: 'a,
    {
        match &self.inner {
            Some(provider) => provider.provide_credentials(),
            None => future::ProvideCredentials::ready(Err(CredentialsError::not_loaded(
                "anonymous credentials do not load credentials; requests are sent unsigned",
            ))),
        }
    }
}
