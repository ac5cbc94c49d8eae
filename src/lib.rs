/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0.
 */

//! Strategy based AWS credentials resolution
//!
//! A flat map of credentials properties is resolved into exactly one credentials provider:
//!
//! - one **primary** strategy supplies the base identity (default chain, access key pair,
//!   credentials file, named profile or anonymous)
//! - at most one **derived** strategy (assume role, web identity token) exchanges that identity
//!   for temporary role credentials through STS
//!
//! Validation reports every problem of a configuration at once instead of failing on the first.
//!
//! ## Example
//! ```rust
//! use aws_credential_strategies::{
//!     CredentialsConfig, CredentialsProviderFactory, CredentialsStrategy, PropertyKey,
//!     ValidationContext,
//! };
//! let config = CredentialsConfig::new()
//!     .with(PropertyKey::UseDefaultCredentials, "true")
//!     .with(PropertyKey::AccessKey, "AKIDEXAMPLE");
//! let factory = CredentialsProviderFactory::new();
//! assert_eq!(
//!     factory.select_primary_strategy(&config),
//!     CredentialsStrategy::ExplicitDefault
//! );
//! let failures = factory.validate(&ValidationContext::literal(&config));
//! assert_eq!(
//!     failures[0].explanation(),
//!     Some("property Access Key ID cannot be used with Default Credentials")
//! );
//! ```

mod assume_role;
mod default_provider_chain;
mod error;
mod expression;
mod factory;
mod profile;
mod property;
mod provider;
mod proxy;
mod service;
mod strategy;
mod sts;
mod validation;
pub mod validators;
mod web_identity_token;

pub use assume_role::AssumeRoleProvider;
pub use default_provider_chain::DefaultProviderChain;
pub use error::{BuildError, ServiceError};
pub use expression::{
    ExpressionError, ExpressionEvaluator, NoExpressions, ValidationContext, VariableRegistry,
};
pub use factory::CredentialsProviderFactory;
pub use property::{CredentialsConfig, PropertyKey, UnknownPropertyError};
pub use provider::AwsCredentialsProvider;
pub use proxy::ProxyConfiguration;
pub use service::CredentialsProviderService;
pub use strategy::CredentialsStrategy;
pub use sts::WebIdentityRetryClassifier;
pub use validation::{ValidationResult, Validity};
pub use web_identity_token::WebIdentityTokenCredentialProvider;

/// Builders for the providers and the factory
pub mod builders {
    pub use crate::assume_role::Builder as AssumeRoleProviderBuilder;
    pub use crate::default_provider_chain::Builder as DefaultProviderChainBuilder;
    pub use crate::factory::Builder as CredentialsProviderFactoryBuilder;
    pub use crate::web_identity_token::Builder as WebIdentityTokenCredentialProviderBuilder;
}
