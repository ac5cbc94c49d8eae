/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0.
 */

use super::PropertyValidator;
use std::error::Error;
use std::fmt::{self, Display, Formatter};

/// Structurally parsed Amazon Resource Name
///
/// `arn:partition:service:region:account:resource`. Region and account may be empty; the resource
/// may itself contain `:`. Partition and service names are not checked against known values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Arn<'a> {
    pub partition: &'a str,
    pub service: &'a str,
    pub region: &'a str,
    pub account_id: &'a str,
    pub resource: &'a str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum ArnError {
    MissingPrefix,
    NoPartition,
    NoService,
    NoRegion,
    NoAccount,
    NoResource,
}

impl Display for ArnError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let message = match self {
            ArnError::MissingPrefix => "Malformed ARN - doesn't start with 'arn:'",
            ArnError::NoPartition => "Malformed ARN - no AWS partition specified",
            ArnError::NoService => "Malformed ARN - no service specified",
            ArnError::NoRegion => "Malformed ARN - no AWS region partition specified",
            ArnError::NoAccount => "Malformed ARN - no AWS account specified",
            ArnError::NoResource => "Malformed ARN - no resource specified",
        };
        f.write_str(message)
    }
}

impl Error for ArnError {}

impl<'a> Arn<'a> {
    pub fn parse(arn: &'a str) -> Result<Self, ArnError> {
        let rest = arn.strip_prefix("arn:").ok_or(ArnError::MissingPrefix)?;
        let mut fields = rest.splitn(5, ':');
        let partition = fields.next().ok_or(ArnError::NoPartition)?;
        if partition.is_empty() {
            return Err(ArnError::NoPartition);
        }
        let service = fields.next().ok_or(ArnError::NoService)?;
        if service.is_empty() {
            return Err(ArnError::NoService);
        }
        let region = fields.next().ok_or(ArnError::NoRegion)?;
        let account_id = fields.next().ok_or(ArnError::NoAccount)?;
        let resource = fields.next().ok_or(ArnError::NoResource)?;
        if resource.is_empty() {
            return Err(ArnError::NoResource);
        }
        Ok(Arn {
            partition,
            service,
            region,
            account_id,
            resource,
        })
    }
}

/// Validates role ARNs
#[derive(Debug, Clone, Copy, Default)]
pub struct ArnValidator;

impl PropertyValidator for ArnValidator {
    fn is_mandatory(&self) -> bool {
        true
    }

    fn blank_explanation(&self, _subject: &str) -> String {
        "an ARN cannot be empty or blank.".to_string()
    }

    fn check(&self, _subject: &str, _input: &str, value: &str) -> Result<(), String> {
        Arn::parse(value).map(|_| ()).map_err(|err| err.to_string())
    }
}

#[cfg(test)]
mod test {
    use super::{Arn, ArnError, ArnValidator};
    use crate::expression::{ValidationContext, VariableRegistry};
    use crate::property::{CredentialsConfig, PropertyKey};
    use crate::validators::validate_value;

    #[test]
    fn parse_arns() {
        assert_eq!(
            Arn::parse("arn:aws:iam::123456789012:role/path/to:role"),
            Ok(Arn {
                partition: "aws",
                service: "iam",
                region: "",
                account_id: "123456789012",
                resource: "role/path/to:role",
            })
        );
        assert!(Arn::parse("arn:partition:service:region:account:resource").is_ok());
        assert_eq!(
            Arn::parse("xxx:partition:service:region:account:resource"),
            Err(ArnError::MissingPrefix)
        );
        assert_eq!(Arn::parse("arn::iam::1:role/x"), Err(ArnError::NoPartition));
        assert_eq!(Arn::parse("arn:aws::::role/x"), Err(ArnError::NoService));
        assert_eq!(Arn::parse("arn:aws:iam"), Err(ArnError::NoRegion));
        assert_eq!(Arn::parse("arn:aws:iam:"), Err(ArnError::NoAccount));
        assert_eq!(Arn::parse("arn:aws:iam::1234"), Err(ArnError::NoResource));
        assert_eq!(Arn::parse("arn:aws:iam::1234:"), Err(ArnError::NoResource));
    }

    #[test]
    fn validator() {
        let config = CredentialsConfig::new();
        let ctx = ValidationContext::literal(&config);
        let key = PropertyKey::WebIdentityRoleArn;
        assert!(validate_value(
            &ArnValidator,
            key,
            "arn:partition:service:us-east-2:account-id:some_resource",
            &ctx
        )
        .is_valid());

        let result = validate_value(
            &ArnValidator,
            key,
            "xxx:partition:service:us-east-2:account-id:some_resource",
            &ctx,
        );
        assert_eq!(
            result.explanation(),
            Some("Malformed ARN - doesn't start with 'arn:'")
        );
        assert_eq!(result.subject(), "Web Identity Role ARN");

        let result = validate_value(&ArnValidator, key, " ", &ctx);
        assert_eq!(result.explanation(), Some("an ARN cannot be empty or blank."));
    }

    #[test]
    fn validator_evaluates_expressions() {
        let config = CredentialsConfig::new();
        let registry = VariableRegistry::new().with_variable("account", "123456789012");
        let ctx = ValidationContext::new(&config, &registry);
        assert!(validate_value(
            &ArnValidator,
            PropertyKey::WebIdentityRoleArn,
            "arn:aws:iam::${account}:role/reader",
            &ctx
        )
        .is_valid());
        assert!(!validate_value(
            &ArnValidator,
            PropertyKey::WebIdentityRoleArn,
            "${account}:role/reader",
            &ctx
        )
        .is_valid());
    }
}
