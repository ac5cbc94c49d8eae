/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0.
 */

//! Credentials strategies
//!
//! A strategy is one way of sourcing credentials. Primary strategies build a provider from the
//! configuration alone; derived strategies (role assumption, web identity federation) exchange
//! the credentials of a primary provider for temporary role credentials.

use crate::default_provider_chain::DefaultProviderChain;
use crate::error::BuildError;
use crate::expression::ValidationContext;
use crate::profile;
use crate::property::{CredentialsConfig, PropertyKey};
use crate::provider::AwsCredentialsProvider;
use crate::validation::ValidationResult;
use crate::validators::{self, BooleanValidator, CredentialsFileValidator, IntegerValidator};
use aws_credential_types::Credentials;
use aws_types::region::Region;
use std::fmt::{self, Display, Formatter};

mod assume_role;
mod web_identity;

/// Supported credentials strategies, in priority order
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum CredentialsStrategy {
    /// Default credentials chain, requested with `use_default_credentials`
    ExplicitDefault,
    AccessKeyPair,
    /// Static credentials from a properties or shared credentials file
    File,
    NamedProfile,
    /// No credentials; requests are sent unsigned
    Anonymous,
    /// Default credentials chain when nothing else is configured
    ImplicitDefault,
    AssumeRole,
    WebIdentityToken,
}

impl CredentialsStrategy {
    /// Every strategy, in priority order
    ///
    /// [`ImplicitDefault`](CredentialsStrategy::ImplicitDefault) is the last primary strategy and
    /// always applies, so primary selection always succeeds.
    pub const ALL: [CredentialsStrategy; 8] = [
        CredentialsStrategy::ExplicitDefault,
        CredentialsStrategy::AccessKeyPair,
        CredentialsStrategy::File,
        CredentialsStrategy::NamedProfile,
        CredentialsStrategy::Anonymous,
        CredentialsStrategy::ImplicitDefault,
        CredentialsStrategy::AssumeRole,
        CredentialsStrategy::WebIdentityToken,
    ];

    pub fn name(self) -> &'static str {
        match self {
            CredentialsStrategy::ExplicitDefault | CredentialsStrategy::ImplicitDefault => {
                "Default Credentials"
            }
            CredentialsStrategy::AccessKeyPair => "Access Key Pair",
            CredentialsStrategy::File => "Credentials File",
            CredentialsStrategy::NamedProfile => "Named Profile",
            CredentialsStrategy::Anonymous => "Anonymous Credentials",
            CredentialsStrategy::AssumeRole => "Assume Role",
            CredentialsStrategy::WebIdentityToken => "Web Identity Token",
        }
    }

    /// Properties owned by this strategy
    pub fn required_properties(self) -> &'static [PropertyKey] {
        match self {
            CredentialsStrategy::ExplicitDefault => &[PropertyKey::UseDefaultCredentials],
            CredentialsStrategy::AccessKeyPair => &[PropertyKey::AccessKey, PropertyKey::SecretKey],
            CredentialsStrategy::File => &[PropertyKey::CredentialsFile],
            CredentialsStrategy::NamedProfile => &[PropertyKey::ProfileName],
            CredentialsStrategy::Anonymous => &[PropertyKey::UseAnonymousCredentials],
            CredentialsStrategy::ImplicitDefault => &[],
            CredentialsStrategy::AssumeRole => &[
                PropertyKey::AssumeRoleArn,
                PropertyKey::AssumeRoleName,
                PropertyKey::MaxSessionTime,
            ],
            CredentialsStrategy::WebIdentityToken => &[
                PropertyKey::WebIdentityRoleArn,
                PropertyKey::WebIdentityRoleSessionName,
                PropertyKey::WebIdentityTokenFile,
            ],
        }
    }

    /// Boolean property enabling this strategy
    fn flag(self) -> Option<PropertyKey> {
        match self {
            CredentialsStrategy::ExplicitDefault => Some(PropertyKey::UseDefaultCredentials),
            CredentialsStrategy::Anonymous => Some(PropertyKey::UseAnonymousCredentials),
            _ => None,
        }
    }

    pub fn is_derived_only(self) -> bool {
        matches!(
            self,
            CredentialsStrategy::AssumeRole | CredentialsStrategy::WebIdentityToken
        )
    }

    /// Whether `config` satisfies this strategy as the primary credentials source
    pub fn can_create_primary(self, config: &CredentialsConfig) -> bool {
        if let Some(flag) = self.flag() {
            return config.flag(flag);
        }
        match self {
            CredentialsStrategy::ImplicitDefault => true,
            CredentialsStrategy::AssumeRole | CredentialsStrategy::WebIdentityToken => false,
            _ => self
                .required_properties()
                .iter()
                .all(|key| config.is_set(*key)),
        }
    }

    /// Whether `config` asks this strategy to wrap the primary provider
    pub fn can_create_derived(self, config: &CredentialsConfig) -> bool {
        match self {
            CredentialsStrategy::AssumeRole => assume_role::can_create_derived(config),
            CredentialsStrategy::WebIdentityToken => web_identity::can_create_derived(config),
            _ => false,
        }
    }

    /// Validate this strategy's properties given the selected `primary` strategy
    ///
    /// Returns the failures only; an empty list means this strategy has no objection.
    pub fn validate(
        self,
        context: &ValidationContext<'_>,
        primary: CredentialsStrategy,
    ) -> Vec<ValidationResult> {
        match self {
            CredentialsStrategy::ExplicitDefault | CredentialsStrategy::Anonymous => {
                self.validate_flag(context, primary)
            }
            CredentialsStrategy::File => {
                let mut failures = self.validate_exclusive(context, primary);
                if self == primary {
                    push_failure(
                        &mut failures,
                        validators::validate_property(
                            &CredentialsFileValidator,
                            PropertyKey::CredentialsFile,
                            context,
                        ),
                    );
                }
                failures
            }
            CredentialsStrategy::AssumeRole => assume_role::validate(context),
            CredentialsStrategy::WebIdentityToken => web_identity::validate(self, context),
            _ => self.validate_exclusive(context, primary),
        }
    }

    /// Only the selected primary strategy may have its properties set, and it must have all of
    /// them set
    fn validate_exclusive(
        self,
        context: &ValidationContext<'_>,
        primary: CredentialsStrategy,
    ) -> Vec<ValidationResult> {
        let selected = self == primary;
        self.required_properties()
            .iter()
            .filter(|key| context.is_set(**key) != selected)
            .map(|key| {
                let explanation = if selected {
                    format!(
                        "property {} must be set with {}",
                        key.display_name(),
                        primary
                    )
                } else {
                    format!(
                        "property {} cannot be used with {}",
                        key.display_name(),
                        primary
                    )
                };
                ValidationResult::invalid(key.display_name(), context.property(*key), explanation)
            })
            .collect()
    }

    fn validate_flag(
        self,
        context: &ValidationContext<'_>,
        primary: CredentialsStrategy,
    ) -> Vec<ValidationResult> {
        let mut failures = Vec::new();
        let flag = match self.flag() {
            Some(flag) => flag,
            None => return failures,
        };
        push_failure(
            &mut failures,
            validators::validate_property(&BooleanValidator, flag, context),
        );
        if self != primary && context.config().flag(flag) {
            failures.push(ValidationResult::invalid(
                flag.display_name(),
                context.property(flag),
                format!(
                    "property {} cannot be used with {}",
                    flag.display_name(),
                    primary
                ),
            ));
        }
        failures
    }

    /// Build the primary credentials provider
    pub fn build_provider(
        self,
        config: &CredentialsConfig,
    ) -> Result<AwsCredentialsProvider, BuildError> {
        let provider = match self {
            CredentialsStrategy::ExplicitDefault | CredentialsStrategy::ImplicitDefault => {
                AwsCredentialsProvider::new(self, DefaultProviderChain::builder().build())
            }
            CredentialsStrategy::AccessKeyPair => {
                let access_key = required(config, PropertyKey::AccessKey)?;
                let secret_key = required(config, PropertyKey::SecretKey)?;
                AwsCredentialsProvider::new(
                    self,
                    Credentials::new(access_key, secret_key, None, None, "Static"),
                )
            }
            CredentialsStrategy::File => {
                let path = required(config, PropertyKey::CredentialsFile)?;
                AwsCredentialsProvider::new(self, profile::CredentialsFileProvider::new(path))
            }
            CredentialsStrategy::NamedProfile => {
                let name = required(config, PropertyKey::ProfileName)?;
                AwsCredentialsProvider::new(self, profile::named_profile(name))
            }
            CredentialsStrategy::Anonymous => AwsCredentialsProvider::anonymous(),
            CredentialsStrategy::AssumeRole | CredentialsStrategy::WebIdentityToken => {
                return Err(BuildError::Unsupported {
                    strategy: self.name(),
                    operation: "building a primary credentials provider",
                })
            }
        };
        Ok(provider)
    }

    /// Build a provider that derives its credentials from `primary`
    ///
    /// `region` overrides the region of the STS client used for the exchange.
    pub fn build_derived_provider(
        self,
        config: &CredentialsConfig,
        primary: &AwsCredentialsProvider,
        region: Option<&Region>,
    ) -> Result<AwsCredentialsProvider, BuildError> {
        match self {
            CredentialsStrategy::AssumeRole => {
                assume_role::build_provider(self, config, primary, region)
            }
            CredentialsStrategy::WebIdentityToken => {
                web_identity::build_provider(self, config, region)
            }
            _ => Err(BuildError::Unsupported {
                strategy: self.name(),
                operation: "building a derived credentials provider",
            }),
        }
    }
}

impl Display for CredentialsStrategy {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

fn required(config: &CredentialsConfig, key: PropertyKey) -> Result<&str, BuildError> {
    config
        .get(key)
        .filter(|value| !value.is_empty())
        .ok_or(BuildError::MissingProperty { key })
}

fn push_failure(failures: &mut Vec<ValidationResult>, result: ValidationResult) {
    if !result.is_valid() {
        failures.push(result);
    }
}

/// Proxy host and port must be set together; the port must be a valid port number
fn validate_proxy(context: &ValidationContext<'_>, failures: &mut Vec<ValidationResult>) {
    let host_set = context.is_set(PropertyKey::AssumeRoleProxyHost);
    let port_set = context.is_set(PropertyKey::AssumeRoleProxyPort);
    if host_set ^ port_set {
        failures.push(ValidationResult::invalid(
            "Assume Role Proxy Host and Port",
            None,
            "Assume role with proxy requires both host and port for the proxy to be set",
        ));
    }
    if port_set {
        push_failure(
            failures,
            validators::validate_property(
                &IntegerValidator::port(),
                PropertyKey::AssumeRoleProxyPort,
                context,
            ),
        );
    }
}
