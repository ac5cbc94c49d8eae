/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0.
 */

//! Single-property validators
//!
//! Every validator runs the same pipeline, short-circuiting on the first failure:
//!
//! 1. Presence: mandatory validators reject blank input.
//! 2. Expression evaluation: if the property accepts expressions and the input contains one, the
//!    evaluated value replaces the raw input. Evaluation errors are reported as failures.
//! 3. Value check: the validator's own predicate runs over the evaluated value. Optional
//!    validators skip this step when the evaluated value is empty.

use crate::expression::ValidationContext;
use crate::property::PropertyKey;
use crate::validation::ValidationResult;
use std::path::Path;

mod arn;
mod session_name;
mod token_file;

pub use arn::{Arn, ArnError, ArnValidator};
pub use session_name::RoleSessionNameValidator;
pub use token_file::TokenFileValidator;

/// Check applied to the value of a single property
pub trait PropertyValidator: Send + Sync {
    /// Mandatory validators reject blank input and always run [`check`](PropertyValidator::check)
    fn is_mandatory(&self) -> bool;

    /// Explanation reported when a mandatory property is blank
    fn blank_explanation(&self, subject: &str) -> String {
        format!("The \"{}\" property cannot be empty or blank.", subject)
    }

    /// Validate the evaluated `value`; `input` is the raw, unevaluated property value
    fn check(&self, subject: &str, input: &str, value: &str) -> Result<(), String>;
}

/// Validate the configured value of `key`
///
/// Properties that are not set are [not applicable](crate::Validity::NotApplicable).
pub fn validate_property(
    validator: &dyn PropertyValidator,
    key: PropertyKey,
    context: &ValidationContext<'_>,
) -> ValidationResult {
    match context.property(key) {
        Some(raw) if !raw.is_empty() => validate_value(validator, key, raw, context),
        _ => ValidationResult::not_applicable(key.display_name()),
    }
}

/// Run the validation pipeline for `raw` as a value of `key`
pub fn validate_value(
    validator: &dyn PropertyValidator,
    key: PropertyKey,
    raw: &str,
    context: &ValidationContext<'_>,
) -> ValidationResult {
    let subject = key.display_name();
    if validator.is_mandatory() && raw.trim().is_empty() {
        return ValidationResult::invalid(subject, Some(raw), validator.blank_explanation(subject));
    }
    let value = match evaluate(validator, key, raw, context) {
        Ok(value) => value,
        Err(failure) => return failure,
    };
    if validator.is_mandatory() || !value.is_empty() {
        if let Err(explanation) = validator.check(subject, raw, &value) {
            return ValidationResult::invalid(subject, Some(raw), explanation);
        }
    }
    ValidationResult::valid(subject, Some(raw))
}

fn evaluate(
    validator: &dyn PropertyValidator,
    key: PropertyKey,
    raw: &str,
    context: &ValidationContext<'_>,
) -> Result<String, ValidationResult> {
    let subject = key.display_name();
    let value = context.evaluate(key, raw).map_err(|err| {
        ValidationResult::invalid(
            subject,
            Some(raw),
            format!("\"{}\" is not a valid expression. The error is {}.", raw, err),
        )
    })?;
    if validator.is_mandatory() && value.is_empty() && value != raw {
        return Err(ValidationResult::invalid(
            subject,
            Some(raw),
            format!("The expression \"{}\" must not evaluate to an empty string.", raw),
        ));
    }
    Ok(value)
}

/// Base-10 integer, optionally restricted to an inclusive range
#[derive(Debug, Clone)]
pub struct IntegerValidator {
    range: Option<IntegerRange>,
}

#[derive(Debug, Clone)]
struct IntegerRange {
    min: i64,
    max: i64,
    explanation: &'static str,
}

impl IntegerValidator {
    pub fn new() -> Self {
        IntegerValidator { range: None }
    }

    /// Proxy port: an integer between 0 and 65535
    pub fn port() -> Self {
        IntegerValidator {
            range: Some(IntegerRange {
                min: 0,
                max: 65_535,
                explanation: "the proxy port value must be between 0 and 65535.",
            }),
        }
    }

    /// Parse `value` the way this validator does, for callers that need the number
    pub fn parse(value: &str) -> Result<i32, String> {
        value.trim().parse::<i32>().map_err(|err| {
            format!("is not a valid integer. The error is \"{}\".", err)
        })
    }
}

impl Default for IntegerValidator {
    fn default() -> Self {
        Self::new()
    }
}

impl PropertyValidator for IntegerValidator {
    fn is_mandatory(&self) -> bool {
        true
    }

    fn check(&self, _subject: &str, _input: &str, value: &str) -> Result<(), String> {
        let number = i64::from(Self::parse(value)?);
        match &self.range {
            Some(range) if number < range.min || number > range.max => {
                Err(range.explanation.to_string())
            }
            _ => Ok(()),
        }
    }
}

/// `true` or `false`, ignoring case
#[derive(Debug, Clone, Copy, Default)]
pub struct BooleanValidator;

impl PropertyValidator for BooleanValidator {
    fn is_mandatory(&self) -> bool {
        true
    }

    fn check(&self, _subject: &str, _input: &str, value: &str) -> Result<(), String> {
        let value = value.trim();
        if value.eq_ignore_ascii_case("true") || value.eq_ignore_ascii_case("false") {
            Ok(())
        } else {
            Err("Value must be 'true' or 'false'".to_string())
        }
    }
}

/// Path to an existing regular file
#[derive(Debug, Clone, Copy, Default)]
pub struct CredentialsFileValidator;

impl PropertyValidator for CredentialsFileValidator {
    fn is_mandatory(&self) -> bool {
        true
    }

    fn check(&self, _subject: &str, _input: &str, value: &str) -> Result<(), String> {
        if Path::new(value).is_file() {
            Ok(())
        } else {
            Err(format!(
                "the credentials file {} does not exist or is not a regular file.",
                value
            ))
        }
    }
}

#[cfg(test)]
mod test {
    use super::{
        validate_property, validate_value, BooleanValidator, CredentialsFileValidator,
        IntegerValidator,
    };
    use crate::expression::{ValidationContext, VariableRegistry};
    use crate::property::{CredentialsConfig, PropertyKey};
    use crate::validation::Validity;

    #[test]
    fn integers() {
        let config = CredentialsConfig::new();
        let ctx = ValidationContext::literal(&config);
        let validator = IntegerValidator::new();
        assert!(validate_value(&validator, PropertyKey::MaxSessionTime, "900", &ctx).is_valid());
        assert!(validate_value(&validator, PropertyKey::MaxSessionTime, " 42 ", &ctx).is_valid());

        let result = validate_value(&validator, PropertyKey::MaxSessionTime, "abc", &ctx);
        assert!(!result.is_valid());
        assert_eq!(
            result.explanation(),
            Some("is not a valid integer. The error is \"invalid digit found in string\".")
        );
        assert_eq!(result.subject(), "Assume Role Session Time");
    }

    #[test]
    fn ports() {
        let config = CredentialsConfig::new();
        let ctx = ValidationContext::literal(&config);
        let port = IntegerValidator::port();
        for valid in ["0", "8080", "65535"] {
            assert!(
                validate_value(&port, PropertyKey::AssumeRoleProxyPort, valid, &ctx).is_valid(),
                "{} should be a valid port",
                valid
            );
        }
        let result = validate_value(&port, PropertyKey::AssumeRoleProxyPort, "65536", &ctx);
        assert_eq!(
            result.explanation(),
            Some("the proxy port value must be between 0 and 65535.")
        );
        assert!(!validate_value(&port, PropertyKey::AssumeRoleProxyPort, "-1", &ctx).is_valid());
        assert!(
            !validate_value(&port, PropertyKey::AssumeRoleProxyPort, "notIntPort", &ctx).is_valid()
        );
    }

    #[test]
    fn booleans() {
        let config = CredentialsConfig::new();
        let ctx = ValidationContext::literal(&config);
        for valid in ["true", "FALSE", "True"] {
            assert!(
                validate_value(&BooleanValidator, PropertyKey::UseDefaultCredentials, valid, &ctx)
                    .is_valid()
            );
        }
        assert!(
            !validate_value(&BooleanValidator, PropertyKey::UseDefaultCredentials, "yes", &ctx)
                .is_valid()
        );
    }

    #[test]
    fn unset_properties_are_not_applicable() {
        let config = CredentialsConfig::new().with(PropertyKey::AssumeRoleProxyPort, "");
        let ctx = ValidationContext::literal(&config);
        let result = validate_property(&IntegerValidator::port(), PropertyKey::AssumeRoleProxyPort, &ctx);
        assert_eq!(result.validity(), &Validity::NotApplicable);
        let result = validate_property(&IntegerValidator::new(), PropertyKey::MaxSessionTime, &ctx);
        assert_eq!(result.validity(), &Validity::NotApplicable);
    }

    #[test]
    fn mandatory_values_cannot_be_blank() {
        let config = CredentialsConfig::new();
        let ctx = ValidationContext::literal(&config);
        let result = validate_value(&IntegerValidator::new(), PropertyKey::MaxSessionTime, "  ", &ctx);
        assert_eq!(
            result.explanation(),
            Some("The \"Assume Role Session Time\" property cannot be empty or blank.")
        );
    }

    #[test]
    fn expressions_are_evaluated_before_checking() {
        let config = CredentialsConfig::new();
        let registry = VariableRegistry::new().with_variable("port", "3128");
        let ctx = ValidationContext::new(&config, &registry);
        let port = IntegerValidator::port();
        assert!(validate_value(&port, PropertyKey::AssumeRoleProxyPort, "${port}", &ctx).is_valid());

        let result = validate_value(&port, PropertyKey::AssumeRoleProxyPort, "${missing}", &ctx);
        assert_eq!(
            result.explanation(),
            Some("The expression \"${missing}\" must not evaluate to an empty string.")
        );

        let result = validate_value(&port, PropertyKey::AssumeRoleProxyPort, "${port", &ctx);
        assert!(result
            .explanation()
            .expect("invalid")
            .starts_with("\"${port\" is not a valid expression. The error is"));
    }

    #[test]
    fn credentials_file_must_exist() {
        let file = tempfile::NamedTempFile::new().expect("temp file");
        let path = file.path().to_str().expect("utf-8 path").to_string();
        let config = CredentialsConfig::new();
        let ctx = ValidationContext::literal(&config);
        assert!(
            validate_value(&CredentialsFileValidator, PropertyKey::CredentialsFile, &path, &ctx)
                .is_valid()
        );
        let dir = tempfile::tempdir().expect("temp dir");
        let dir = dir.path().to_str().expect("utf-8 path").to_string();
        assert!(
            !validate_value(&CredentialsFileValidator, PropertyKey::CredentialsFile, &dir, &ctx)
                .is_valid()
        );
    }
}
