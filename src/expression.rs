/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0.
 */

//! Templated expression evaluation
//!
//! Property values may embed `${name}` placeholders. Evaluation happens behind the
//! [`ExpressionEvaluator`] trait so that hosts can plug in their own expression language.

use crate::property::{CredentialsConfig, PropertyKey};
use std::borrow::Cow;
use std::collections::HashMap;
use std::error::Error;
use std::fmt::{self, Debug, Display, Formatter};

/// Failure to evaluate a templated expression
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ExpressionError {
    /// `${` was opened but never closed
    Unterminated { position: usize },
    /// `${}`
    EmptyName { position: usize },
    /// `${a${b}}`
    NestedExpression { position: usize },
    /// Error reported by a host-provided evaluator
    Other(Cow<'static, str>),
}

impl Display for ExpressionError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            ExpressionError::Unterminated { position } => {
                write!(f, "unterminated expression starting at position {}", position)
            }
            ExpressionError::EmptyName { position } => {
                write!(f, "empty variable name at position {}", position)
            }
            ExpressionError::NestedExpression { position } => {
                write!(f, "nested expressions are not supported (position {})", position)
            }
            ExpressionError::Other(message) => write!(f, "{}", message),
        }
    }
}

impl Error for ExpressionError {}

/// Evaluates templated expressions embedded in property values
pub trait ExpressionEvaluator: Debug + Send + Sync {
    /// `true` if `value` contains expression syntax
    fn contains_expression(&self, value: &str) -> bool;

    /// Evaluate every expression in `value`
    ///
    /// References to unknown variables evaluate to an empty string.
    fn evaluate(&self, value: &str) -> Result<String, ExpressionError>;
}

/// Evaluator for hosts without an expression language: values are always literal
#[derive(Debug, Default, Clone, Copy)]
pub struct NoExpressions;

impl ExpressionEvaluator for NoExpressions {
    fn contains_expression(&self, _value: &str) -> bool {
        false
    }

    fn evaluate(&self, value: &str) -> Result<String, ExpressionError> {
        Ok(value.to_string())
    }
}

/// `${name}` substitution backed by a variable map
///
/// ## Example
/// ```rust
/// use aws_credential_strategies::{ExpressionEvaluator, VariableRegistry};
/// let registry = VariableRegistry::new().with_variable("role", "analytics");
/// assert_eq!(
///     registry.evaluate("arn:aws:iam::123456789012:role/${role}").unwrap(),
///     "arn:aws:iam::123456789012:role/analytics"
/// );
/// assert_eq!(registry.evaluate("${missing}").unwrap(), "");
/// ```
#[derive(Clone, Default)]
pub struct VariableRegistry {
    variables: HashMap<String, String>,
}

impl VariableRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry seeded with the variables of the current process environment
    pub fn from_env() -> Self {
        VariableRegistry {
            variables: std::env::vars().collect(),
        }
    }

    pub fn with_variable(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_variable(name, value);
        self
    }

    pub fn set_variable(&mut self, name: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.variables.insert(name.into(), value.into());
        self
    }
}

impl Debug for VariableRegistry {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        // values may carry secrets
        let mut names: Vec<_> = self.variables.keys().collect();
        names.sort();
        f.debug_struct("VariableRegistry")
            .field("variables", &names)
            .finish()
    }
}

impl ExpressionEvaluator for VariableRegistry {
    fn contains_expression(&self, value: &str) -> bool {
        value.contains("${")
    }

    fn evaluate(&self, value: &str) -> Result<String, ExpressionError> {
        let mut output = String::with_capacity(value.len());
        let mut rest = value;
        let mut offset = 0;
        while let Some(start) = rest.find("${") {
            output.push_str(&rest[..start]);
            let body = &rest[start + 2..];
            let end = body.find('}').ok_or(ExpressionError::Unterminated {
                position: offset + start,
            })?;
            let name = &body[..end];
            if let Some(nested) = name.find("${") {
                return Err(ExpressionError::NestedExpression {
                    position: offset + start + 2 + nested,
                });
            }
            let name = name.trim();
            if name.is_empty() {
                return Err(ExpressionError::EmptyName {
                    position: offset + start,
                });
            }
            if let Some(resolved) = self.variables.get(name) {
                output.push_str(resolved);
            }
            let consumed = start + 2 + end + 1;
            offset += consumed;
            rest = &rest[consumed..];
        }
        output.push_str(rest);
        Ok(output)
    }
}

/// Configuration plus the evaluator used to resolve its expressions
///
/// This is the narrow view of a host validation context that validators and strategies need.
#[derive(Debug, Clone, Copy)]
pub struct ValidationContext<'a> {
    config: &'a CredentialsConfig,
    evaluator: &'a dyn ExpressionEvaluator,
}

impl<'a> ValidationContext<'a> {
    pub fn new(config: &'a CredentialsConfig, evaluator: &'a dyn ExpressionEvaluator) -> Self {
        ValidationContext { config, evaluator }
    }

    /// Context for configurations that contain no expressions
    pub fn literal(config: &'a CredentialsConfig) -> Self {
        ValidationContext {
            config,
            evaluator: &NoExpressions,
        }
    }

    pub fn config(&self) -> &'a CredentialsConfig {
        self.config
    }

    pub fn property(&self, key: PropertyKey) -> Option<&'a str> {
        self.config.get(key)
    }

    pub fn is_set(&self, key: PropertyKey) -> bool {
        self.config.is_set(key)
    }

    pub fn supports_expression(&self, key: PropertyKey) -> bool {
        key.supports_expression()
    }

    /// Evaluate `raw` as the value of `key`
    ///
    /// The raw value is returned unchanged when `key` does not accept expressions or `raw` does
    /// not contain any.
    pub fn evaluate(&self, key: PropertyKey, raw: &str) -> Result<String, ExpressionError> {
        if self.supports_expression(key) && self.evaluator.contains_expression(raw) {
            self.evaluator.evaluate(raw)
        } else {
            Ok(raw.to_string())
        }
    }
}

impl CredentialsConfig {
    /// Copy of this configuration with every expression evaluated
    pub fn evaluated(
        &self,
        evaluator: &dyn ExpressionEvaluator,
    ) -> Result<CredentialsConfig, (PropertyKey, ExpressionError)> {
        let context = ValidationContext::new(self, evaluator);
        self.iter()
            .map(|(key, raw)| {
                context
                    .evaluate(key, raw)
                    .map(|value| (key, value))
                    .map_err(|err| (key, err))
            })
            .collect()
    }
}

#[cfg(test)]
mod test {
    use super::{ExpressionError, ExpressionEvaluator, ValidationContext, VariableRegistry};
    use crate::property::{CredentialsConfig, PropertyKey};

    fn registry() -> VariableRegistry {
        VariableRegistry::new()
            .with_variable("account", "123456789012")
            .with_variable("role", "reader")
    }

    #[test]
    fn substitutes_known_variables() {
        assert_eq!(
            registry()
                .evaluate("arn:aws:iam::${account}:role/${ role }")
                .unwrap(),
            "arn:aws:iam::123456789012:role/reader"
        );
        assert_eq!(registry().evaluate("no expressions").unwrap(), "no expressions");
        assert_eq!(registry().evaluate("cost: $5").unwrap(), "cost: $5");
    }

    #[test]
    fn unknown_variables_are_empty() {
        assert_eq!(registry().evaluate("${nope}").unwrap(), "");
        assert_eq!(registry().evaluate("a-${nope}-b").unwrap(), "a--b");
    }

    #[test]
    fn malformed_expressions_fail() {
        assert_eq!(
            registry().evaluate("abc${role"),
            Err(ExpressionError::Unterminated { position: 3 })
        );
        assert_eq!(
            registry().evaluate("${}"),
            Err(ExpressionError::EmptyName { position: 0 })
        );
        assert!(matches!(
            registry().evaluate("${a${b}}"),
            Err(ExpressionError::NestedExpression { .. })
        ));
    }

    #[test]
    fn context_only_evaluates_supported_keys() {
        let config = CredentialsConfig::new();
        let registry = registry();
        let context = ValidationContext::new(&config, &registry);
        assert_eq!(
            context.evaluate(PropertyKey::ProfileName, "${role}").unwrap(),
            "reader"
        );
        assert_eq!(
            context
                .evaluate(PropertyKey::CredentialsFile, "${role}")
                .unwrap(),
            "${role}"
        );
    }

    #[test]
    fn evaluated_config() {
        let config = CredentialsConfig::new()
            .with(PropertyKey::AssumeRoleArn, "arn:aws:iam::${account}:role/x")
            .with(PropertyKey::AssumeRoleName, "${role}-session");
        let evaluated = config.evaluated(&registry()).expect("valid expressions");
        assert_eq!(
            evaluated.get(PropertyKey::AssumeRoleArn),
            Some("arn:aws:iam::123456789012:role/x")
        );
        assert_eq!(
            evaluated.get(PropertyKey::AssumeRoleName),
            Some("reader-session")
        );

        let broken = CredentialsConfig::new().with(PropertyKey::ProfileName, "${oops");
        let (key, _err) = broken.evaluated(&registry()).expect_err("malformed");
        assert_eq!(key, PropertyKey::ProfileName);
    }

    #[test]
    fn debug_hides_values() {
        let debug = format!("{:?}", registry().with_variable("secret", "hunter2"));
        assert!(debug.contains("secret"));
        assert!(!debug.contains("hunter2"));
    }
}
