/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0.
 */

use super::{push_failure, required, validate_proxy, CredentialsStrategy};
use crate::error::BuildError;
use crate::expression::ValidationContext;
use crate::property::{CredentialsConfig, PropertyKey};
use crate::provider::AwsCredentialsProvider;
use crate::proxy::ProxyConfiguration;
use crate::sts::StsClientSettings;
use crate::validation::ValidationResult;
use crate::validators::{
    self, ArnValidator, PropertyValidator, RoleSessionNameValidator, TokenFileValidator,
};
use crate::web_identity_token::WebIdentityTokenCredentialProvider;
use aws_types::region::Region;

pub(super) fn can_create_derived(config: &CredentialsConfig) -> bool {
    config.is_set(PropertyKey::WebIdentityRoleArn) && config.is_set(PropertyKey::WebIdentityTokenFile)
}

pub(super) fn validate(
    strategy: CredentialsStrategy,
    context: &ValidationContext<'_>,
) -> Vec<ValidationResult> {
    let mut failures = Vec::new();
    if context.is_set(PropertyKey::WebIdentityRoleArn)
        ^ context.is_set(PropertyKey::WebIdentityTokenFile)
    {
        failures.push(ValidationResult::invalid(
            strategy.name(),
            None,
            missing_properties_explanation(strategy, context),
        ));
    }

    let property_validators: [(&dyn PropertyValidator, PropertyKey); 3] = [
        (&ArnValidator, PropertyKey::WebIdentityRoleArn),
        (&RoleSessionNameValidator, PropertyKey::WebIdentityRoleSessionName),
        (&TokenFileValidator, PropertyKey::WebIdentityTokenFile),
    ];
    for (validator, key) in property_validators {
        push_failure(
            &mut failures,
            validators::validate_property(validator, key, context),
        );
    }

    validate_proxy(context, &mut failures);
    failures
}

fn missing_properties_explanation(
    strategy: CredentialsStrategy,
    context: &ValidationContext<'_>,
) -> String {
    let mut explanation = String::from(
        "assuming roles with web identity session credentials requires the role ARN and token \
         file properties to be set together:\n",
    );
    for key in strategy.required_properties() {
        let status = if context.is_set(*key) {
            "is set"
        } else {
            "is not set"
        };
        explanation.push_str(&format!(
            "The \"{}\" property {}.\n",
            key.display_name(),
            status
        ));
    }
    explanation
}

pub(super) fn build_provider(
    strategy: CredentialsStrategy,
    config: &CredentialsConfig,
    region: Option<&Region>,
) -> Result<AwsCredentialsProvider, BuildError> {
    let role_arn = required(config, PropertyKey::WebIdentityRoleArn)?;
    let token_file = required(config, PropertyKey::WebIdentityTokenFile)?;
    let settings = StsClientSettings::new(region.cloned(), ProxyConfiguration::from_config(config)?)?;

    let mut builder = WebIdentityTokenCredentialProvider::builder()
        .role_arn(role_arn)
        .token_file(token_file)
        .settings(settings);
    builder.set_session_name(
        config
            .get(PropertyKey::WebIdentityRoleSessionName)
            .map(str::to_string),
    );
    let provider = builder.build()?;
    tracing::info!(
        role_arn = %role_arn,
        session_name = %provider.session_name(),
        "assuming role with web identity token"
    );
    Ok(AwsCredentialsProvider::new(strategy, provider))
}

#[cfg(test)]
mod test {
    use super::validate;
    use crate::expression::ValidationContext;
    use crate::property::{CredentialsConfig, PropertyKey};
    use crate::strategy::CredentialsStrategy;

    const ARN: &str = "arn:partition:service:us-east-2:account-id:some_resource";
    const TOKEN_FILE: &str = "test-data/web-identity-token/token.jwt";

    fn failures(config: &CredentialsConfig) -> Vec<crate::ValidationResult> {
        let ctx = ValidationContext::literal(config);
        validate(CredentialsStrategy::WebIdentityToken, &ctx)
    }

    #[test]
    fn happy_path() {
        let config = CredentialsConfig::new()
            .with(PropertyKey::WebIdentityRoleArn, ARN)
            .with(PropertyKey::WebIdentityRoleSessionName, "session-role-name")
            .with(PropertyKey::WebIdentityTokenFile, TOKEN_FILE);
        assert!(failures(&config).is_empty());
    }

    #[test]
    fn session_name_is_optional() {
        let config = CredentialsConfig::new()
            .with(PropertyKey::WebIdentityRoleArn, ARN)
            .with(PropertyKey::WebIdentityTokenFile, TOKEN_FILE);
        assert!(failures(&config).is_empty());
    }

    #[test]
    fn arn_without_token_file() {
        let config = CredentialsConfig::new()
            .with(PropertyKey::WebIdentityRoleArn, ARN)
            .with(PropertyKey::WebIdentityRoleSessionName, "session-role-name");
        let failures = failures(&config);
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].subject(), "Web Identity Token");
        let explanation = failures[0].explanation().expect("invalid");
        assert!(explanation.contains("The \"Web Identity Role ARN\" property is set."));
        assert!(explanation.contains("The \"Web Identity Role Session Name\" property is set."));
        assert!(explanation.contains("The \"Web Identity Token File\" property is not set."));
    }

    #[test]
    fn token_file_without_arn() {
        let config = CredentialsConfig::new()
            .with(PropertyKey::WebIdentityRoleSessionName, "session-role-name")
            .with(PropertyKey::WebIdentityTokenFile, TOKEN_FILE);
        let failures = failures(&config);
        assert_eq!(failures.len(), 1);
        assert!(failures[0]
            .explanation()
            .expect("invalid")
            .contains("The \"Web Identity Role ARN\" property is not set."));
    }

    #[test]
    fn property_values_are_validated() {
        let config = CredentialsConfig::new()
            .with(
                PropertyKey::WebIdentityRoleArn,
                "xxx:partition:service:us-east-2:account-id:some_resource",
            )
            .with(PropertyKey::WebIdentityRoleSessionName, "abc")
            .with(PropertyKey::WebIdentityTokenFile, "test-data");
        let subjects: Vec<_> = failures(&config)
            .iter()
            .map(|failure| failure.subject().to_string())
            .collect();
        assert_eq!(
            subjects,
            vec![
                "Web Identity Role ARN",
                "Web Identity Role Session Name",
                "Web Identity Token File"
            ]
        );
    }

    #[test]
    fn proxy_pairing() {
        let config = CredentialsConfig::new()
            .with(PropertyKey::WebIdentityRoleArn, ARN)
            .with(PropertyKey::WebIdentityTokenFile, TOKEN_FILE)
            .with(PropertyKey::AssumeRoleProxyPort, "8080");
        let failures = failures(&config);
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].subject(), "Assume Role Proxy Host and Port");
    }
}
