/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0.
 */

//! HTTP proxy support for STS clients

use crate::error::BuildError;
use crate::property::{CredentialsConfig, PropertyKey};
use aws_smithy_runtime::client::http::hyper_014::HyperClientBuilder;
use aws_smithy_runtime_api::client::http::SharedHttpClient;
use hyper::client::HttpConnector;
use hyper::Uri;
use hyper_proxy::{Intercept, Proxy, ProxyConnector};

/// Proxy used for the STS token exchange
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProxyConfiguration {
    host: String,
    port: u16,
}

impl ProxyConfiguration {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        ProxyConfiguration {
            host: host.into(),
            port,
        }
    }

    /// Proxy settings from `assume_role_proxy_host` and `assume_role_proxy_port`
    ///
    /// Returns `None` unless both are set.
    pub fn from_config(config: &CredentialsConfig) -> Result<Option<Self>, BuildError> {
        let (host, port) = match (
            config.get(PropertyKey::AssumeRoleProxyHost),
            config.get(PropertyKey::AssumeRoleProxyPort),
        ) {
            (Some(host), Some(port)) if !host.is_empty() && !port.is_empty() => (host, port),
            _ => return Ok(None),
        };
        let port = port
            .trim()
            .parse::<u16>()
            .map_err(|_| BuildError::InvalidProperty {
                key: PropertyKey::AssumeRoleProxyPort,
                value: port.to_string(),
                message: format!(
                    "The assume role proxy port value \"{}\" is not an integer value.",
                    port
                ),
            })?;
        Ok(Some(ProxyConfiguration::new(host.trim(), port)))
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn uri(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }

    /// HTTP client that sends every request through this proxy
    ///
    /// HTTPS requests are tunneled with `CONNECT`; TLS is negotiated end to end with the service.
    pub fn http_client(&self) -> Result<SharedHttpClient, BuildError> {
        let uri = self.uri();
        let proxy_uri = uri
            .parse::<Uri>()
            .map_err(|source| BuildError::InvalidProxy { uri, source })?;
        let proxy = Proxy::new(Intercept::All, proxy_uri);
        let connector = ProxyConnector::from_proxy_unsecured(HttpConnector::new(), proxy);
        let https = hyper_rustls::HttpsConnectorBuilder::new()
            .with_webpki_roots()
            .https_or_http()
            .enable_http1()
            .wrap_connector(connector);
        Ok(HyperClientBuilder::new().build(https))
    }
}
