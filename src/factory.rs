/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0.
 */

//! Credentials strategy resolution
//!
//! The factory selects the primary strategy for a configuration, validates the configuration
//! against every strategy, and builds the resulting credentials provider.

use crate::error::BuildError;
use crate::expression::ValidationContext;
use crate::property::CredentialsConfig;
use crate::provider::AwsCredentialsProvider;
use crate::strategy::CredentialsStrategy;
use crate::validation::ValidationResult;
use aws_types::region::Region;

/// Resolves credentials providers from a [`CredentialsConfig`]
///
/// ## Example
/// ```rust
/// use aws_credential_strategies::{
///     CredentialsConfig, CredentialsProviderFactory, CredentialsStrategy, PropertyKey,
///     ValidationContext,
/// };
/// let factory = CredentialsProviderFactory::new();
/// let config = CredentialsConfig::new()
///     .with(PropertyKey::AccessKey, "AKIDEXAMPLE")
///     .with(PropertyKey::SecretKey, "secret");
/// assert!(factory.validate(&ValidationContext::literal(&config)).is_empty());
/// let provider = factory.credentials_provider(&config).expect("valid configuration");
/// assert_eq!(provider.strategy(), CredentialsStrategy::AccessKeyPair);
/// ```
#[derive(Debug, Clone, Default)]
pub struct CredentialsProviderFactory {
    region: Option<Region>,
}

impl CredentialsProviderFactory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn builder() -> Builder {
        Builder::default()
    }

    /// Strategies in the order they are considered
    pub fn strategies(&self) -> &'static [CredentialsStrategy] {
        &CredentialsStrategy::ALL
    }

    /// The first strategy able to act as the primary credentials source
    pub fn select_primary_strategy(&self, config: &CredentialsConfig) -> CredentialsStrategy {
        let primary = self
            .strategies()
            .iter()
            .copied()
            .find(|strategy| strategy.can_create_primary(config))
            .unwrap_or(CredentialsStrategy::ImplicitDefault);
        tracing::debug!(strategy = %primary, "selected primary credentials strategy");
        primary
    }

    /// Validate `context` against every strategy
    ///
    /// An empty result means the configuration is valid. Failures are listed in strategy order;
    /// a check shared by several strategies reports once per strategy.
    pub fn validate(&self, context: &ValidationContext<'_>) -> Vec<ValidationResult> {
        let primary = self.select_primary_strategy(context.config());
        let failures: Vec<ValidationResult> = self
            .strategies()
            .iter()
            .flat_map(|strategy| strategy.validate(context, primary))
            .collect();
        tracing::debug!(
            primary = %primary,
            failures = failures.len(),
            "validated credentials configuration"
        );
        failures
    }

    /// Build the credentials provider for `config`
    ///
    /// `config` must already be validated and its expressions evaluated. The first strategy able
    /// to derive credentials wraps the primary provider.
    pub fn credentials_provider(
        &self,
        config: &CredentialsConfig,
    ) -> Result<AwsCredentialsProvider, BuildError> {
        let primary = self.select_primary_strategy(config);
        let provider = primary.build_provider(config)?;
        match self
            .strategies()
            .iter()
            .find(|strategy| strategy.can_create_derived(config))
        {
            Some(derived) => {
                tracing::info!(primary = %primary, derived = %derived, "wrapping primary credentials");
                derived.build_derived_provider(config, &provider, self.region.as_ref())
            }
            None => Ok(provider),
        }
    }
}

#[derive(Debug, Default)]
pub struct Builder {
    region: Option<Region>,
}

impl Builder {
    /// Region of the STS client used by derived strategies
    pub fn region(mut self, region: Region) -> Self {
        self.region = Some(region);
        self
    }

    pub fn set_region(&mut self, region: Option<Region>) -> &mut Self {
        self.region = region;
        self
    }

    pub fn build(self) -> CredentialsProviderFactory {
        CredentialsProviderFactory {
            region: self.region,
        }
    }
}
