/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0.
 */

use super::PropertyValidator;
use std::io::ErrorKind;
use std::path::Path;

/// Validates that a web identity token file resolves to an existing regular file
#[derive(Debug, Clone, Copy, Default)]
pub struct TokenFileValidator;

fn missing_file_explanation(path: &Path) -> String {
    format!(
        "the path {} does not exist, or is not a regular file, or it cannot be determined whether \
         the file is a regular file or not.",
        path.display()
    )
}

impl PropertyValidator for TokenFileValidator {
    fn is_mandatory(&self) -> bool {
        true
    }

    fn check(&self, _subject: &str, _input: &str, value: &str) -> Result<(), String> {
        let path = Path::new(value);
        match std::fs::canonicalize(path) {
            Ok(real_path) if real_path.is_file() => Ok(()),
            Ok(real_path) => Err(missing_file_explanation(&real_path)),
            Err(err) if err.kind() == ErrorKind::NotFound => Err(missing_file_explanation(path)),
            Err(err) => Err(format!(
                "an error occurred getting the real path from {}. This can happen if the effective \
                 user does not have permissions to access all the components of the path. The \
                 error is\n{}\n",
                value, err
            )),
        }
    }
}
