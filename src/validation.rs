/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0.
 */

use std::fmt::{self, Display, Formatter};

/// Outcome of validating a single value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Validity {
    /// The value was not set and nothing was checked
    NotApplicable,
    Valid,
    Invalid { explanation: String },
}

/// Result of validating one subject (usually a property)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationResult {
    subject: String,
    input: Option<String>,
    validity: Validity,
}

impl ValidationResult {
    pub fn valid(subject: impl Into<String>, input: Option<&str>) -> Self {
        ValidationResult {
            subject: subject.into(),
            input: input.map(str::to_string),
            validity: Validity::Valid,
        }
    }

    pub fn not_applicable(subject: impl Into<String>) -> Self {
        ValidationResult {
            subject: subject.into(),
            input: None,
            validity: Validity::NotApplicable,
        }
    }

    pub fn invalid(
        subject: impl Into<String>,
        input: Option<&str>,
        explanation: impl Into<String>,
    ) -> Self {
        ValidationResult {
            subject: subject.into(),
            input: input.map(str::to_string),
            validity: Validity::Invalid {
                explanation: explanation.into(),
            },
        }
    }

    pub fn subject(&self) -> &str {
        &self.subject
    }

    pub fn input(&self) -> Option<&str> {
        self.input.as_deref()
    }

    pub fn validity(&self) -> &Validity {
        &self.validity
    }

    /// `true` unless the result is [`Validity::Invalid`]
    pub fn is_valid(&self) -> bool {
        !matches!(self.validity, Validity::Invalid { .. })
    }

    /// Explanation of an invalid result
    pub fn explanation(&self) -> Option<&str> {
        match &self.validity {
            Validity::Invalid { explanation } => Some(explanation),
            _ => None,
        }
    }
}

impl Display for ValidationResult {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let input = self.input.as_deref().unwrap_or("");
        match &self.validity {
            Validity::Invalid { explanation } => write!(
                f,
                "'{}' validated against '{}' is invalid because {}",
                self.subject, input, explanation
            ),
            Validity::Valid => write!(f, "'{}' validated against '{}' is valid", self.subject, input),
            Validity::NotApplicable => write!(f, "'{}' is not set", self.subject),
        }
    }
}
