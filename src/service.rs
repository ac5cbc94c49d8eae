/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0.
 */

use crate::error::ServiceError;
use crate::expression::{ExpressionEvaluator, ValidationContext};
use crate::factory::CredentialsProviderFactory;
use crate::property::{CredentialsConfig, PropertyKey};
use crate::provider::AwsCredentialsProvider;
use crate::validation::ValidationResult;
use std::fmt::{self, Display, Formatter};

/// Holds one credentials provider for as long as the service is enabled
///
/// ## Example
/// ```rust
/// use aws_credential_strategies::{
///     CredentialsConfig, CredentialsProviderService, CredentialsStrategy, PropertyKey,
///     VariableRegistry,
/// };
/// let registry = VariableRegistry::new().with_variable("profile", "analytics");
/// let config = CredentialsConfig::new().with(PropertyKey::ProfileName, "${profile}");
/// let mut service = CredentialsProviderService::new("aws-credentials");
/// service.enable(&config, &registry).expect("valid configuration");
/// let provider = service.credentials_provider().expect("enabled");
/// assert_eq!(provider.strategy(), CredentialsStrategy::NamedProfile);
/// ```
#[derive(Debug)]
pub struct CredentialsProviderService {
    identifier: String,
    factory: CredentialsProviderFactory,
    provider: Option<AwsCredentialsProvider>,
}

impl CredentialsProviderService {
    pub fn new(identifier: impl Into<String>) -> Self {
        CredentialsProviderService {
            identifier: identifier.into(),
            factory: CredentialsProviderFactory::new(),
            provider: None,
        }
    }

    /// Resolve providers with `factory`, e.g. one configured with an STS region
    pub fn with_factory(mut self, factory: CredentialsProviderFactory) -> Self {
        self.factory = factory;
        self
    }

    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    pub fn supported_properties(&self) -> &'static [PropertyKey] {
        &PropertyKey::ALL
    }

    /// Validation failures for `config`; empty when the configuration is valid
    pub fn validate(
        &self,
        config: &CredentialsConfig,
        evaluator: &dyn ExpressionEvaluator,
    ) -> Vec<ValidationResult> {
        self.factory
            .validate(&ValidationContext::new(config, evaluator))
    }

    /// Validate `config`, evaluate its expressions and build the credentials provider
    ///
    /// A previously held provider is replaced only when enabling succeeds.
    pub fn enable(
        &mut self,
        config: &CredentialsConfig,
        evaluator: &dyn ExpressionEvaluator,
    ) -> Result<(), ServiceError> {
        let failures = self.validate(config, evaluator);
        if !failures.is_empty() {
            return Err(ServiceError::Invalid(failures));
        }
        let evaluated = config
            .evaluated(evaluator)
            .map_err(|(key, source)| ServiceError::Expression { key, source })?;
        let provider = self.factory.credentials_provider(&evaluated)?;
        tracing::info!(
            service = %self,
            strategy = %provider.strategy(),
            "credentials provider enabled"
        );
        self.provider = Some(provider);
        Ok(())
    }

    pub fn disable(&mut self) {
        if self.provider.take().is_some() {
            tracing::info!(service = %self, "credentials provider disabled");
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.provider.is_some()
    }

    pub fn credentials_provider(&self) -> Result<&AwsCredentialsProvider, ServiceError> {
        self.provider.as_ref().ok_or(ServiceError::NotEnabled)
    }
}

impl Display for CredentialsProviderService {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "AWSCredentialsProviderService[id={}]", self.identifier)
    }
}
