/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0.
 */

use crate::expression::ExpressionError;
use crate::property::PropertyKey;
use crate::validation::ValidationResult;
use std::error::Error;
use std::fmt::{self, Display, Formatter};

/// Failure to build a credentials provider from a configuration
///
/// Configurations that passed validation only fail to build through misuse of the strategy API.
#[derive(Debug)]
#[non_exhaustive]
pub enum BuildError {
    /// The strategy cannot build this kind of provider (e.g. a primary provider from a derived-only
    /// strategy)
    Unsupported {
        strategy: &'static str,
        operation: &'static str,
    },
    /// A property the strategy relies on is not set
    MissingProperty { key: PropertyKey },
    /// A property value could not be interpreted
    InvalidProperty {
        key: PropertyKey,
        value: String,
        message: String,
    },
    /// The assume role proxy could not be turned into a URI
    InvalidProxy {
        uri: String,
        source: hyper::http::uri::InvalidUri,
    },
}

impl Display for BuildError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            BuildError::Unsupported {
                strategy,
                operation,
            } => write!(f, "the {} strategy does not support {}", strategy, operation),
            BuildError::MissingProperty { key } => write!(
                f,
                "the \"{}\" property must be set to build this provider",
                key.display_name()
            ),
            BuildError::InvalidProperty { message, .. } => write!(f, "{}", message),
            BuildError::InvalidProxy { uri, .. } => {
                write!(f, "`{}` is not a valid proxy address", uri)
            }
        }
    }
}

impl Error for BuildError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            BuildError::InvalidProxy { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Failure to enable a [`CredentialsProviderService`](crate::CredentialsProviderService)
#[derive(Debug)]
#[non_exhaustive]
pub enum ServiceError {
    /// The configuration failed validation
    Invalid(Vec<ValidationResult>),
    /// A property expression could not be evaluated
    Expression {
        key: PropertyKey,
        source: ExpressionError,
    },
    Build(BuildError),
    /// The service has no provider because it is not enabled
    NotEnabled,
}

impl Display for ServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            ServiceError::Invalid(failures) => {
                write!(f, "invalid credentials configuration")?;
                for failure in failures {
                    write!(f, "\n  {}", failure)?;
                }
                Ok(())
            }
            ServiceError::Expression { key, .. } => write!(
                f,
                "failed to evaluate the expression in \"{}\"",
                key.display_name()
            ),
            ServiceError::Build(_) => write!(f, "failed to build the credentials provider"),
            ServiceError::NotEnabled => write!(f, "the credentials provider service is not enabled"),
        }
    }
}

impl Error for ServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            ServiceError::Expression { source, .. } => Some(source),
            ServiceError::Build(err) => Some(err),
            _ => None,
        }
    }
}

impl From<BuildError> for ServiceError {
    fn from(err: BuildError) -> Self {
        ServiceError::Build(err)
    }
}
