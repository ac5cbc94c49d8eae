/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0.
 */

//! Configuration properties consumed by the credentials strategies
//!
//! A [`CredentialsConfig`] is a flat map from [`PropertyKey`] to string value. It is treated as
//! immutable input for a single resolution pass.

use serde::de::{Deserializer, Error as _};
use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};
use std::error::Error;
use std::fmt::{self, Debug, Display, Formatter};
use std::str::FromStr;
use zeroize::Zeroize;

/// A configuration key understood by the credentials strategies
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PropertyKey {
    UseDefaultCredentials,
    AccessKey,
    SecretKey,
    CredentialsFile,
    ProfileName,
    UseAnonymousCredentials,
    AssumeRoleArn,
    AssumeRoleName,
    MaxSessionTime,
    AssumeRoleExternalId,
    AssumeRoleProxyHost,
    AssumeRoleProxyPort,
    WebIdentityRoleArn,
    WebIdentityRoleSessionName,
    WebIdentityTokenFile,
}

impl PropertyKey {
    /// Every supported key, in the order they are presented to users
    pub const ALL: [PropertyKey; 15] = [
        PropertyKey::UseDefaultCredentials,
        PropertyKey::AccessKey,
        PropertyKey::SecretKey,
        PropertyKey::CredentialsFile,
        PropertyKey::ProfileName,
        PropertyKey::UseAnonymousCredentials,
        PropertyKey::AssumeRoleArn,
        PropertyKey::AssumeRoleName,
        PropertyKey::MaxSessionTime,
        PropertyKey::AssumeRoleExternalId,
        PropertyKey::AssumeRoleProxyHost,
        PropertyKey::AssumeRoleProxyPort,
        PropertyKey::WebIdentityRoleArn,
        PropertyKey::WebIdentityRoleSessionName,
        PropertyKey::WebIdentityTokenFile,
    ];

    /// Machine identifier, e.g. `assume_role_arn`
    pub fn name(self) -> &'static str {
        match self {
            PropertyKey::UseDefaultCredentials => "use_default_credentials",
            PropertyKey::AccessKey => "access_key",
            PropertyKey::SecretKey => "secret_key",
            PropertyKey::CredentialsFile => "credentials_file",
            PropertyKey::ProfileName => "profile_name",
            PropertyKey::UseAnonymousCredentials => "use_anonymous_credentials",
            PropertyKey::AssumeRoleArn => "assume_role_arn",
            PropertyKey::AssumeRoleName => "assume_role_name",
            PropertyKey::MaxSessionTime => "max_session_time",
            PropertyKey::AssumeRoleExternalId => "assume_role_external_id",
            PropertyKey::AssumeRoleProxyHost => "assume_role_proxy_host",
            PropertyKey::AssumeRoleProxyPort => "assume_role_proxy_port",
            PropertyKey::WebIdentityRoleArn => "web_identity_role_arn",
            PropertyKey::WebIdentityRoleSessionName => "web_identity_role_session_name",
            PropertyKey::WebIdentityTokenFile => "web_identity_token_file",
        }
    }

    /// Human readable label, used as the subject of validation results
    pub fn display_name(self) -> &'static str {
        match self {
            PropertyKey::UseDefaultCredentials => "Use Default Credentials",
            PropertyKey::AccessKey => "Access Key ID",
            PropertyKey::SecretKey => "Secret Access Key",
            PropertyKey::CredentialsFile => "Credentials File",
            PropertyKey::ProfileName => "Profile Name",
            PropertyKey::UseAnonymousCredentials => "Use Anonymous Credentials",
            PropertyKey::AssumeRoleArn => "Assume Role ARN",
            PropertyKey::AssumeRoleName => "Assume Role Session Name",
            PropertyKey::MaxSessionTime => "Assume Role Session Time",
            PropertyKey::AssumeRoleExternalId => "Assume Role External ID",
            PropertyKey::AssumeRoleProxyHost => "Assume Role Proxy Host",
            PropertyKey::AssumeRoleProxyPort => "Assume Role Proxy Port",
            PropertyKey::WebIdentityRoleArn => "Web Identity Role ARN",
            PropertyKey::WebIdentityRoleSessionName => "Web Identity Role Session Name",
            PropertyKey::WebIdentityTokenFile => "Web Identity Token File",
        }
    }

    /// Whether values of this key may contain templated expressions
    pub fn supports_expression(self) -> bool {
        !matches!(
            self,
            PropertyKey::UseDefaultCredentials
                | PropertyKey::UseAnonymousCredentials
                | PropertyKey::CredentialsFile
        )
    }

    /// Value assumed when the key is absent
    pub fn default_value(self) -> Option<&'static str> {
        match self {
            PropertyKey::UseDefaultCredentials | PropertyKey::UseAnonymousCredentials => {
                Some("false")
            }
            PropertyKey::MaxSessionTime => Some("3600"),
            _ => None,
        }
    }

    fn is_secret(self) -> bool {
        matches!(self, PropertyKey::SecretKey)
    }
}

impl Display for PropertyKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Error returned when parsing an unknown property identifier
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownPropertyError {
    name: String,
}

impl Display for UnknownPropertyError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "`{}` is not a supported credentials property", self.name)
    }
}

impl Error for UnknownPropertyError {}

impl FromStr for PropertyKey {
    type Err = UnknownPropertyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PropertyKey::ALL
            .iter()
            .copied()
            .find(|key| key.name() == s)
            .ok_or_else(|| UnknownPropertyError { name: s.to_string() })
    }
}

impl<'de> Deserialize<'de> for PropertyKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        name.parse().map_err(D::Error::custom)
    }
}

/// Flat credentials configuration
///
/// ## Example
/// ```rust
/// use aws_credential_strategies::{CredentialsConfig, PropertyKey};
/// let config = CredentialsConfig::new()
///     .with(PropertyKey::AccessKey, "AKIDEXAMPLE")
///     .with(PropertyKey::SecretKey, "secret");
/// assert!(config.is_set(PropertyKey::AccessKey));
/// assert!(!config.is_set(PropertyKey::ProfileName));
/// ```
#[derive(Clone, Default, PartialEq, Eq)]
pub struct CredentialsConfig {
    values: BTreeMap<PropertyKey, String>,
}

impl CredentialsConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set `key` to `value`, replacing any previous value
    pub fn with(mut self, key: PropertyKey, value: impl Into<String>) -> Self {
        self.set(key, value);
        self
    }

    pub fn set(&mut self, key: PropertyKey, value: impl Into<String>) -> &mut Self {
        if let Some(mut previous) = self.values.insert(key, value.into()) {
            previous.zeroize();
        }
        self
    }

    pub fn remove(&mut self, key: PropertyKey) -> &mut Self {
        if let Some(mut previous) = self.values.remove(&key) {
            previous.zeroize();
        }
        self
    }

    /// Raw value of `key`, if present
    pub fn get(&self, key: PropertyKey) -> Option<&str> {
        self.values.get(&key).map(String::as_str)
    }

    /// Raw value of `key`, falling back to the key's default value
    pub fn get_or_default(&self, key: PropertyKey) -> Option<&str> {
        self.get(key).or_else(|| key.default_value())
    }

    /// `true` if `key` is present with a non-empty value
    pub fn is_set(&self, key: PropertyKey) -> bool {
        self.get(key).map(|value| !value.is_empty()).unwrap_or(false)
    }

    /// `true` only if `key` holds `true` (case-insensitive)
    pub fn flag(&self, key: PropertyKey) -> bool {
        self.get(key)
            .map(|value| value.trim().eq_ignore_ascii_case("true"))
            .unwrap_or(false)
    }

    pub fn iter(&self) -> impl Iterator<Item = (PropertyKey, &str)> {
        self.values.iter().map(|(key, value)| (*key, value.as_str()))
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl Drop for CredentialsConfig {
    fn drop(&mut self) {
        for value in self.values.values_mut() {
            value.zeroize();
        }
    }
}

impl Debug for CredentialsConfig {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let mut map = f.debug_map();
        for (key, value) in &self.values {
            if key.is_secret() {
                map.entry(&key.name(), &"** redacted **");
            } else {
                map.entry(&key.name(), value);
            }
        }
        map.finish()
    }
}

impl<V: Into<String>> FromIterator<(PropertyKey, V)> for CredentialsConfig {
    fn from_iter<T: IntoIterator<Item = (PropertyKey, V)>>(iter: T) -> Self {
        let mut config = CredentialsConfig::new();
        for (key, value) in iter {
            config.set(key, value);
        }
        config
    }
}

impl<'de> Deserialize<'de> for CredentialsConfig {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let values = HashMap::<PropertyKey, String>::deserialize(deserializer)?;
        Ok(values.into_iter().collect())
    }
}
