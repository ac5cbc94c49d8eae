/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0.
 */

use super::PropertyValidator;
use once_cell::sync::Lazy;
use regex::Regex;

const MIN_SESSION_NAME_LENGTH: usize = 8;
const MAX_SESSION_NAME_LENGTH: usize = 64;

static ROLE_SESSION_NAME: Lazy<Regex> = Lazy::new(|| {
    let pattern = format!(
        "^[A-Za-z][A-Za-z0-9_=,.@-]{{{},{}}}$",
        MIN_SESSION_NAME_LENGTH - 1,
        MAX_SESSION_NAME_LENGTH - 1
    );
    Regex::new(&pattern).expect("role session name pattern is a valid regex")
});

/// Validates optional web identity role session names
///
/// Absent names are accepted; a default name is generated when the provider is built.
#[derive(Debug, Clone, Copy, Default)]
pub struct RoleSessionNameValidator;

impl RoleSessionNameValidator {
    pub fn is_valid_name(name: &str) -> bool {
        ROLE_SESSION_NAME.is_match(name)
    }
}

impl PropertyValidator for RoleSessionNameValidator {
    fn is_mandatory(&self) -> bool {
        false
    }

    fn check(&self, subject: &str, input: &str, value: &str) -> Result<(), String> {
        if Self::is_valid_name(value) {
            return Ok(());
        }
        Err(format!(
            "\"{input}\" is not a valid {subject}\n\
             A web identity role session name must be between {min} and {max} characters long.\n\
             It must not contain space or tab characters.\n\
             It must start with an alphabetic character.\n\
             The remaining characters can be alphanumeric, '_', '=', ',', '.', '@', or '-'.\n",
            input = input,
            subject = subject,
            min = MIN_SESSION_NAME_LENGTH,
            max = MAX_SESSION_NAME_LENGTH,
        ))
    }
}
