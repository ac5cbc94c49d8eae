/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0.
 */

use super::{required, validate_proxy, CredentialsStrategy};
use crate::assume_role::AssumeRoleProvider;
use crate::error::BuildError;
use crate::expression::ValidationContext;
use crate::property::{CredentialsConfig, PropertyKey};
use crate::provider::AwsCredentialsProvider;
use crate::proxy::ProxyConfiguration;
use crate::sts::StsClientSettings;
use crate::validation::ValidationResult;
use crate::validators::{self, IntegerValidator};
use aws_types::region::Region;

/// STS limits for the assumed role session length, in seconds
const MIN_SESSION_LENGTH: i32 = 900;
const MAX_SESSION_LENGTH: i32 = 3_600;

pub(super) fn can_create_derived(config: &CredentialsConfig) -> bool {
    config.is_set(PropertyKey::AssumeRoleArn) && config.is_set(PropertyKey::AssumeRoleName)
}

pub(super) fn validate(context: &ValidationContext<'_>) -> Vec<ValidationResult> {
    let mut failures = Vec::new();
    let arn_set = context.is_set(PropertyKey::AssumeRoleArn);
    let name_set = context.is_set(PropertyKey::AssumeRoleName);
    if arn_set ^ name_set {
        failures.push(ValidationResult::invalid(
            "Assume Role Arn and Name",
            None,
            "Assume role requires both arn and name to be set",
        ));
    }

    validate_session_length(context, &mut failures);

    if context.is_set(PropertyKey::AssumeRoleExternalId) && !(arn_set && name_set) {
        failures.push(ValidationResult::invalid(
            PropertyKey::AssumeRoleExternalId.display_name(),
            context.property(PropertyKey::AssumeRoleExternalId),
            "Assume role requires both arn and name to be set with External ID",
        ));
    }

    validate_proxy(context, &mut failures);
    failures
}

/// The configured session length, or the default when unset, must lie within the STS limits
fn validate_session_length(context: &ValidationContext<'_>, failures: &mut Vec<ValidationResult>) {
    let key = PropertyKey::MaxSessionTime;
    let (subject, raw, value) = match context.property(key).filter(|raw| !raw.is_empty()) {
        Some(raw) => {
            let result = validators::validate_value(&IntegerValidator::new(), key, raw, context);
            if !result.is_valid() {
                failures.push(result);
                return;
            }
            match context.evaluate(key, raw) {
                Ok(value) => (key.display_name().to_string(), raw, value),
                Err(_) => return,
            }
        }
        None => match key.default_value() {
            Some(default) => (
                format!("{} (Default Value)", key.display_name()),
                default,
                default.to_string(),
            ),
            None => return,
        },
    };
    let length = match IntegerValidator::parse(&value) {
        Ok(length) => length,
        Err(explanation) => {
            failures.push(ValidationResult::invalid(subject, Some(raw), explanation));
            return;
        }
    };
    if !(MIN_SESSION_LENGTH..=MAX_SESSION_LENGTH).contains(&length) {
        failures.push(ValidationResult::invalid(
            subject,
            Some(raw),
            format!(
                "must be between {} and {} seconds",
                MIN_SESSION_LENGTH, MAX_SESSION_LENGTH
            ),
        ));
    }
}

pub(super) fn build_provider(
    strategy: CredentialsStrategy,
    config: &CredentialsConfig,
    primary: &AwsCredentialsProvider,
    region: Option<&Region>,
) -> Result<AwsCredentialsProvider, BuildError> {
    let role_arn = required(config, PropertyKey::AssumeRoleArn)?;
    let session_name = required(config, PropertyKey::AssumeRoleName)?;
    let settings = StsClientSettings::new(region.cloned(), ProxyConfiguration::from_config(config)?)?;

    let mut builder = AssumeRoleProvider::builder()
        .role_arn(role_arn)
        .session_name(session_name)
        .settings(settings);
    builder
        .set_source(primary.shared())
        .set_duration_seconds(session_length(config)?)
        .set_external_id(
            config
                .get(PropertyKey::AssumeRoleExternalId)
                .filter(|id| !id.is_empty())
                .map(str::to_string),
        );
    tracing::info!(
        role_arn = %role_arn,
        source = %primary.strategy(),
        "assuming role with credentials from the primary strategy"
    );
    Ok(AwsCredentialsProvider::new(strategy, builder.build()?))
}

fn session_length(config: &CredentialsConfig) -> Result<Option<i32>, BuildError> {
    let key = PropertyKey::MaxSessionTime;
    // blank counts as unset
    let value = match config
        .get(key)
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .or_else(|| key.default_value())
    {
        Some(value) => value,
        None => return Ok(None),
    };
    value
        .parse::<i32>()
        .map(Some)
        .map_err(|err| BuildError::InvalidProperty {
            key,
            value: value.to_string(),
            message: format!(
                "The value \"{}\" is not a valid value for the {} property. The error is {}.",
                value,
                key.display_name(),
                err
            ),
        })
}

#[cfg(test)]
mod test {
    use super::{session_length, validate};
    use crate::expression::{ValidationContext, VariableRegistry};
    use crate::property::{CredentialsConfig, PropertyKey};
    use crate::BuildError;

    fn role() -> CredentialsConfig {
        CredentialsConfig::new()
            .with(PropertyKey::AssumeRoleArn, "BogusArn")
            .with(PropertyKey::AssumeRoleName, "BogusSession")
    }

    fn failures(config: &CredentialsConfig) -> Vec<String> {
        let ctx = ValidationContext::literal(config);
        validate(&ctx)
            .iter()
            .map(|failure| failure.explanation().unwrap_or_default().to_string())
            .collect()
    }

    #[test]
    fn arn_and_name_go_together() {
        assert!(failures(&role()).is_empty());
        let arn_only = CredentialsConfig::new().with(PropertyKey::AssumeRoleArn, "BogusArn");
        assert_eq!(
            failures(&arn_only),
            vec!["Assume role requires both arn and name to be set"]
        );
        let name_only = CredentialsConfig::new().with(PropertyKey::AssumeRoleName, "BogusSession");
        assert_eq!(failures(&name_only).len(), 1);
    }

    #[test]
    fn session_length_limits() {
        for (value, valid) in [
            ("899", false),
            ("900", true),
            ("3600", true),
            ("3601", false),
            ("10", false),
            ("abc", false),
        ] {
            let config = role().with(PropertyKey::MaxSessionTime, value);
            assert_eq!(
                failures(&config).is_empty(),
                valid,
                "session length {} should be {}",
                value,
                if valid { "valid" } else { "invalid" }
            );
        }
        let config = role().with(PropertyKey::MaxSessionTime, "3601");
        assert_eq!(
            failures(&config),
            vec!["must be between 900 and 3600 seconds"]
        );
    }

    #[test]
    fn session_length_expressions() {
        let registry = VariableRegistry::new().with_variable("session", "1200");
        let config = role().with(PropertyKey::MaxSessionTime, "${session}");
        let ctx = ValidationContext::new(&config, &registry);
        assert!(validate(&ctx).is_empty());

        let registry = VariableRegistry::new().with_variable("session", "60");
        let ctx = ValidationContext::new(&config, &registry);
        let failures = validate(&ctx);
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].input(), Some("${session}"));
    }

    #[test]
    fn external_id_requires_role() {
        let config = CredentialsConfig::new()
            .with(PropertyKey::AssumeRoleExternalId, "BogusExternalId");
        assert_eq!(
            failures(&config),
            vec!["Assume role requires both arn and name to be set with External ID"]
        );
        assert!(failures(&role().with(PropertyKey::AssumeRoleExternalId, "BogusExternalId")).is_empty());
    }

    #[test]
    fn proxy_settings() {
        let host_only = role().with(PropertyKey::AssumeRoleProxyHost, "proxy.company.com");
        assert_eq!(
            failures(&host_only),
            vec!["Assume role with proxy requires both host and port for the proxy to be set"]
        );
        let port_only = role().with(PropertyKey::AssumeRoleProxyPort, "8080");
        assert_eq!(failures(&port_only).len(), 1);

        let both = host_only.clone().with(PropertyKey::AssumeRoleProxyPort, "8080");
        assert!(failures(&both).is_empty());

        let bad_port = host_only.with(PropertyKey::AssumeRoleProxyPort, "notIntPort");
        assert_eq!(failures(&bad_port).len(), 1);
    }

    #[test]
    fn session_length_defaults() {
        assert_eq!(session_length(&role()).unwrap(), Some(3600));
        assert_eq!(
            session_length(&role().with(PropertyKey::MaxSessionTime, "")).unwrap(),
            Some(3600)
        );
        assert_eq!(
            session_length(&role().with(PropertyKey::MaxSessionTime, "  ")).unwrap(),
            Some(3600)
        );
        assert_eq!(
            session_length(&role().with(PropertyKey::MaxSessionTime, " 900 ")).unwrap(),
            Some(900)
        );
        match session_length(&role().with(PropertyKey::MaxSessionTime, "forever")) {
            Err(BuildError::InvalidProperty { key, .. }) => {
                assert_eq!(key, PropertyKey::MaxSessionTime)
            }
            other => panic!("incorrect result: {:?}", other),
        }
    }
}
