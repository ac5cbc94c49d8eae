/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0.
 */

//! Shared STS plumbing for the role assumption providers

use crate::proxy::ProxyConfiguration;
use crate::error::BuildError;
use aws_config::BehaviorVersion;
use aws_credential_types::provider::error::CredentialsError;
use aws_credential_types::provider::{self, SharedCredentialsProvider};
use aws_credential_types::Credentials;
use aws_sdk_sts::error::ProvideErrorMetadata;
use aws_sdk_sts::operation::assume_role_with_web_identity::AssumeRoleWithWebIdentityError;
use aws_smithy_runtime_api::client::http::SharedHttpClient;
use aws_smithy_runtime_api::client::interceptors::context::InterceptorContext;
use aws_smithy_runtime_api::client::retries::classifiers::{
    ClassifyRetry, RetryAction, RetryClassifierPriority,
};
use aws_smithy_types::retry::RetryConfig;
use aws_types::region::Region;
use std::time::{SystemTime, UNIX_EPOCH};

/// Maximum number of attempts for the web identity token exchange
const WEB_IDENTITY_MAX_ATTEMPTS: u32 = 3;

const THROTTLING_ERRORS: &[&str] = &[
    "Throttling",
    "ThrottlingException",
    "ThrottledException",
    "RequestThrottledException",
    "TooManyRequestsException",
    "ProvisionedThroughputExceededException",
    "TransactionInProgressException",
    "RequestLimitExceeded",
    "BandwidthLimitExceeded",
    "LimitExceededException",
    "RequestThrottled",
    "SlowDown",
    "PriorRequestNotComplete",
    "EC2ThrottledException",
];

const CLOCK_SKEW_ERRORS: &[&str] = &[
    "RequestTimeTooSkewed",
    "RequestExpired",
    "InvalidSignatureException",
    "SignatureDoesNotMatch",
    "AuthFailure",
    "RequestInTheFuture",
];

/// `<base>-<milliseconds since the epoch>`
pub(crate) fn default_session_name(base: &str) -> String {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|since_epoch| since_epoch.as_millis())
        .unwrap_or_default();
    format!("{}-{}", base, now)
}

/// Convert STS credentials to [`Credentials`]
pub(crate) fn into_credentials(
    sts_credentials: Option<aws_sdk_sts::types::Credentials>,
    provider_name: &'static str,
) -> provider::Result {
    let sts_credentials = sts_credentials
        .ok_or_else(|| CredentialsError::unhandled("STS credentials must be defined"))?;
    let expiration = SystemTime::try_from(sts_credentials.expiration).map_err(|_| {
        CredentialsError::unhandled(
            "credential expiration time cannot be represented by a SystemTime",
        )
    })?;
    Ok(Credentials::new(
        sts_credentials.access_key_id,
        sts_credentials.secret_access_key,
        Some(sts_credentials.session_token),
        Some(expiration),
        provider_name,
    ))
}

/// How an STS client is configured
///
/// Clients are built lazily, on the first credentials request, since loading the SDK
/// configuration is asynchronous.
#[derive(Debug, Clone, Default)]
pub(crate) struct StsClientSettings {
    region: Option<Region>,
    proxy: Option<ProxyConfiguration>,
    http_client: Option<SharedHttpClient>,
}

impl StsClientSettings {
    pub(crate) fn new(
        region: Option<Region>,
        proxy: Option<ProxyConfiguration>,
    ) -> Result<Self, BuildError> {
        let http_client = proxy.as_ref().map(|p| p.http_client()).transpose()?;
        Ok(StsClientSettings {
            region,
            proxy,
            http_client,
        })
    }

    pub(crate) fn proxy(&self) -> Option<&ProxyConfiguration> {
        self.proxy.as_ref()
    }

    async fn sdk_config(
        &self,
        credentials: Option<SharedCredentialsProvider>,
    ) -> aws_types::SdkConfig {
        let mut loader = aws_config::defaults(BehaviorVersion::latest());
        if let Some(region) = &self.region {
            loader = loader.region(region.clone());
        }
        loader = match credentials {
            Some(credentials) => loader.credentials_provider(credentials),
            None => loader.no_credentials(),
        };
        if let Some(http_client) = &self.http_client {
            loader = loader.http_client(http_client.clone());
        }
        loader.load().await
    }

    /// STS client signing requests with `credentials`, or unsigned when there are none
    pub(crate) async fn assume_role_client(
        &self,
        credentials: Option<SharedCredentialsProvider>,
    ) -> aws_sdk_sts::Client {
        let sdk_config = self.sdk_config(credentials).await;
        aws_sdk_sts::Client::new(&sdk_config)
    }

    /// Unsigned STS client with the bounded web identity retry policy
    pub(crate) async fn web_identity_client(&self) -> aws_sdk_sts::Client {
        let sdk_config = self.sdk_config(None).await;
        let config = aws_sdk_sts::config::Builder::from(&sdk_config)
            .retry_config(RetryConfig::standard().with_max_attempts(WEB_IDENTITY_MAX_ATTEMPTS))
            .retry_classifier(WebIdentityRetryClassifier::new())
            .build();
        aws_sdk_sts::Client::from_conf(config)
    }
}

/// Retry policy for `AssumeRoleWithWebIdentity`
///
/// Retries I/O and timeout failures, identity provider communication errors, rejected identity
/// tokens, 5xx responses, throttling and clock skew. Every other failure is final.
#[derive(Debug, Default)]
pub struct WebIdentityRetryClassifier;

impl WebIdentityRetryClassifier {
    pub fn new() -> Self {
        WebIdentityRetryClassifier
    }
}

impl ClassifyRetry for WebIdentityRetryClassifier {
    fn classify_retry(&self, ctx: &InterceptorContext) -> RetryAction {
        let error = match ctx.output_or_error() {
            Some(Err(error)) => error,
            _ => return RetryAction::NoActionIndicated,
        };

        if error.is_timeout_error() {
            return RetryAction::transient_error();
        }
        if let Some(connector_error) = error.as_connector_error() {
            return if connector_error.is_io() || connector_error.is_timeout() {
                RetryAction::transient_error()
            } else {
                RetryAction::RetryForbidden
            };
        }

        if let Some(operation_error) = error
            .as_operation_error()
            .and_then(|err| err.downcast_ref::<AssumeRoleWithWebIdentityError>())
        {
            if operation_error.is_idp_communication_error_exception()
                || operation_error.is_invalid_identity_token_exception()
            {
                return RetryAction::transient_error();
            }
            if let Some(code) = operation_error.code() {
                if THROTTLING_ERRORS.contains(&code) {
                    return RetryAction::throttling_error();
                }
                if CLOCK_SKEW_ERRORS.contains(&code) {
                    return RetryAction::client_error();
                }
            }
        }

        let server_error = ctx
            .response()
            .map(|response| response.status().as_u16() >= 500)
            .unwrap_or(false);
        if server_error {
            return RetryAction::server_error();
        }
        RetryAction::RetryForbidden
    }

    fn name(&self) -> &'static str {
        "web identity token exchange"
    }

    fn priority(&self) -> RetryClassifierPriority {
        RetryClassifierPriority::run_after(RetryClassifierPriority::transient_error_classifier())
    }
}

#[cfg(test)]
mod test {
    use super::{default_session_name, into_credentials, WebIdentityRetryClassifier};
    use aws_sdk_sts::operation::assume_role_with_web_identity::AssumeRoleWithWebIdentityError;
    use aws_sdk_sts::types::error::{
        ExpiredTokenException, IdpCommunicationErrorException, InvalidIdentityTokenException,
    };
    use aws_smithy_runtime_api::client::interceptors::context::{Error, Input, InterceptorContext};
    use aws_smithy_runtime_api::client::orchestrator::{HttpResponse, OrchestratorError};
    use aws_smithy_runtime_api::client::result::ConnectorError;
    use aws_smithy_runtime_api::client::retries::classifiers::{ClassifyRetry, RetryAction};
    use aws_smithy_runtime_api::http::StatusCode;
    use aws_smithy_types::body::SdkBody;
    use aws_smithy_types::error::ErrorMetadata;
    use aws_smithy_types::DateTime;
    use std::time::{Duration, UNIX_EPOCH};

    fn context_with(error: OrchestratorError<Error>) -> InterceptorContext {
        let mut ctx = InterceptorContext::new(Input::erase(()));
        ctx.set_output_or_error(Err(error));
        ctx
    }

    fn operation_error(error: AssumeRoleWithWebIdentityError) -> OrchestratorError<Error> {
        OrchestratorError::operation(Error::erase(error))
    }

    #[test]
    fn session_names_carry_the_base() {
        let name = default_session_name("nifi");
        let millis = name.strip_prefix("nifi-").expect("prefixed");
        assert!(millis.parse::<u128>().expect("numeric suffix") > 0);
    }

    #[test]
    fn converts_sts_credentials() {
        let sts_credentials = aws_sdk_sts::types::Credentials::builder()
            .access_key_id("AKIDTEST")
            .secret_access_key("SECRETKEYTEST")
            .session_token("SESSIONTOKEN_TEST")
            .expiration(DateTime::from_secs(1629147173))
            .build()
            .expect("all required fields set");
        let creds =
            into_credentials(Some(sts_credentials), "WebIdentityToken").expect("valid credentials");
        assert_eq!(creds.access_key_id(), "AKIDTEST");
        assert_eq!(creds.secret_access_key(), "SECRETKEYTEST");
        assert_eq!(creds.session_token(), Some("SESSIONTOKEN_TEST"));
        assert_eq!(
            creds.expiry(),
            Some(UNIX_EPOCH + Duration::from_secs(1629147173))
        );

        into_credentials(None, "WebIdentityToken").expect_err("no credentials in the response");
    }

    #[test]
    fn retries_io_errors() {
        let ctx = context_with(OrchestratorError::connector(ConnectorError::io(
            "connection reset".into(),
        )));
        assert_eq!(
            WebIdentityRetryClassifier::new().classify_retry(&ctx),
            RetryAction::transient_error()
        );
    }

    #[test]
    fn does_not_retry_other_connector_errors() {
        let ctx = context_with(OrchestratorError::connector(ConnectorError::other(
            "misconfigured connector".into(),
            None,
        )));
        assert_eq!(
            WebIdentityRetryClassifier::new().classify_retry(&ctx),
            RetryAction::RetryForbidden
        );
    }

    #[test]
    fn retries_identity_provider_errors() {
        let classifier = WebIdentityRetryClassifier::new();
        let idp = context_with(operation_error(
            AssumeRoleWithWebIdentityError::IdpCommunicationErrorException(
                IdpCommunicationErrorException::builder()
                    .message("the identity provider could not be reached")
                    .build(),
            ),
        ));
        assert_eq!(classifier.classify_retry(&idp), RetryAction::transient_error());

        let invalid_token = context_with(operation_error(
            AssumeRoleWithWebIdentityError::InvalidIdentityTokenException(
                InvalidIdentityTokenException::builder()
                    .message("Error normalizing issuer")
                    .build(),
            ),
        ));
        assert_eq!(
            classifier.classify_retry(&invalid_token),
            RetryAction::transient_error()
        );
    }

    #[test]
    fn retries_throttling_and_clock_skew() {
        let classifier = WebIdentityRetryClassifier::new();
        let throttled = context_with(operation_error(AssumeRoleWithWebIdentityError::generic(
            ErrorMetadata::builder().code("Throttling").build(),
        )));
        assert_eq!(
            classifier.classify_retry(&throttled),
            RetryAction::throttling_error()
        );

        let skewed = context_with(operation_error(AssumeRoleWithWebIdentityError::generic(
            ErrorMetadata::builder().code("RequestTimeTooSkewed").build(),
        )));
        assert_eq!(classifier.classify_retry(&skewed), RetryAction::client_error());
    }

    #[test]
    fn retries_server_errors() {
        let mut ctx = context_with(operation_error(AssumeRoleWithWebIdentityError::generic(
            ErrorMetadata::builder().code("InternalFailure").build(),
        )));
        ctx.set_response(HttpResponse::new(
            StatusCode::try_from(503).expect("valid status"),
            SdkBody::empty(),
        ));
        assert_eq!(
            WebIdentityRetryClassifier::new().classify_retry(&ctx),
            RetryAction::server_error()
        );
    }

    #[test]
    fn other_service_errors_are_final() {
        let mut ctx = context_with(operation_error(
            AssumeRoleWithWebIdentityError::ExpiredTokenException(
                ExpiredTokenException::builder().message("expired").build(),
            ),
        ));
        ctx.set_response(HttpResponse::new(
            StatusCode::try_from(400).expect("valid status"),
            SdkBody::empty(),
        ));
        assert_eq!(
            WebIdentityRetryClassifier::new().classify_retry(&ctx),
            RetryAction::RetryForbidden
        );
    }

    #[test]
    fn successful_responses_are_left_alone() {
        let ctx = InterceptorContext::new(Input::erase(()));
        assert_eq!(
            WebIdentityRetryClassifier::new().classify_retry(&ctx),
            RetryAction::NoActionIndicated
        );
    }
}
