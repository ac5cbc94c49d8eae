/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0.
 */

use aws_config::default_provider::credentials::DefaultCredentialsChain;
use aws_credential_types::provider::{future, ProvideCredentials};
use aws_types::region::Region;
use tokio::sync::OnceCell;
use tracing::Instrument;

/// Default AWS Credential Provider Chain
///
/// Resolution order follows the AWS SDK default chain: environment variables, shared config
/// (`~/.aws/config`, `~/.aws/credentials`), web identity from the environment, ECS and IMDS.
///
/// Building the SDK chain is asynchronous, so the chain is assembled on the first credentials
/// request and reused afterwards.
///
/// ## Example:
/// ```rust
/// use aws_credential_strategies::DefaultProviderChain;
/// use aws_types::region::Region;
/// let credentials_provider = DefaultProviderChain::builder()
///     .region(Region::new("us-west-1"))
///     .build();
/// ```
#[derive(Debug)]
pub struct DefaultProviderChain {
    region: Option<Region>,
    chain: OnceCell<DefaultCredentialsChain>,
}

impl DefaultProviderChain {
    pub fn builder() -> Builder {
        Builder::default()
    }

    async fn chain(&self) -> &DefaultCredentialsChain {
        self.chain
            .get_or_init(|| async {
                let mut builder = DefaultCredentialsChain::builder();
                if let Some(region) = self.region.clone() {
                    builder = builder.region(region);
                }
                builder.build().await
            })
            .await
    }
}

impl ProvideCredentials for DefaultProviderChain {
    fn provide_credentials<'a>(&'a self) -> future::ProvideCredentials<'a>
    where
        Self: 'a,
    {
        future::ProvideCredentials::new(
            async move { self.chain().await.provide_credentials().await }
                .instrument(tracing::debug_span!("default_provider_chain")),
        )
    }
}

/// Builder for [`DefaultProviderChain`](DefaultProviderChain)
#[derive(Debug, Default)]
pub struct Builder {
    region: Option<Region>,
}

impl Builder {
    /// Set the region used when making requests to AWS services (eg. STS) as part of the provider chain
    ///
    /// When unset, the default region resolver chain will be used.
    pub fn region(mut self, region: Region) -> Self {
        self.region = Some(region);
        self
    }

    pub fn set_region(&mut self, region: Option<Region>) -> &mut Self {
        self.region = region;
        self
    }

    pub fn build(self) -> DefaultProviderChain {
        DefaultProviderChain {
            region: self.region,
            chain: OnceCell::new(),
        }
    }
}
