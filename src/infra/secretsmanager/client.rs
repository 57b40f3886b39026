use async_trait::async_trait;
use aws_config::retry::RetryConfig;
use aws_config::timeout::TimeoutConfig;
use aws_config::{BehaviorVersion, Region, SdkConfig};
use aws_sdk_secretsmanager::Client;
use aws_sdk_secretsmanager::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};
use bytes::Bytes;
use tracing::debug;

use crate::config::StoreConfig;
use crate::error::{ApiError, ErrorKind};
use crate::services::secrets_api::{Operation, SecretValue, SecretsApi};

/// Talks to AWS Secrets Manager.
///
/// Credentials come from the ambient provider chain (env vars, the named
/// profile, instance or task role), so the process needs
/// `secretsmanager:GetSecretValue`, `PutSecretValue` and `CreateSecret`.
#[derive(Debug, Clone)]
pub struct SecretsManagerClient {
    client: Client,
}

impl SecretsManagerClient {
    /// Creates a client bound to the region, endpoint and transport settings in
    /// `config`. No request is sent until the first operation.
    pub async fn new(config: &StoreConfig) -> Self {
        let sdk_config = load_sdk_config(config).await;
        Self {
            client: Client::new(&sdk_config),
        }
    }

    /// Wraps an already configured SDK client.
    pub fn from_client(client: Client) -> Self {
        Self { client }
    }
}

/// Builds the SDK configuration for `config`.
///
/// The region is set explicitly, so loading does not consult IMDS for it;
/// credentials are resolved lazily on first use.
pub async fn load_sdk_config(config: &StoreConfig) -> SdkConfig {
    let transport = config.transport();

    let timeouts = TimeoutConfig::builder()
        .connect_timeout(transport.connect_timeout())
        .operation_attempt_timeout(transport.request_timeout())
        .build();

    aws_config::defaults(BehaviorVersion::latest())
        .region(Region::new(config.region().to_string()))
        .endpoint_url(config.endpoint().as_str().trim_end_matches('/'))
        .profile_name(config.profile())
        .retry_config(RetryConfig::standard().with_max_attempts(transport.max_attempts()))
        .timeout_config(timeouts)
        .load()
        .await
}

/// Maps an SDK failure onto an [`ApiError`] using the service error code.
///
/// Anything that is not a service error (timeouts, dispatch or construction
/// failures) is [`ErrorKind::Other`].
pub(crate) fn classify<E, R>(operation: Operation, secret: &str, err: SdkError<E, R>) -> ApiError
where
    E: ProvideErrorMetadata + std::error::Error + Send + Sync + 'static,
    R: std::fmt::Debug + Send + Sync + 'static,
{
    let (kind, message) = match err.as_service_error() {
        Some(service) => (
            ErrorKind::from_code(service.code()),
            service
                .message()
                .map(str::to_owned)
                .unwrap_or_else(|| DisplayErrorContext(&err).to_string()),
        ),
        None => (ErrorKind::Other, DisplayErrorContext(&err).to_string()),
    };

    ApiError::new(operation, secret, kind, message).with_source(err)
}

#[async_trait]
impl SecretsApi for SecretsManagerClient {
    async fn get_secret_value(&self, id: &str) -> Result<Option<SecretValue>, ApiError> {
        let resp = self
            .client
            .get_secret_value()
            .secret_id(id)
            .send()
            .await
            .map_err(|e| classify(Operation::GetSecretValue, id, e))?;

        let binary = resp
            .secret_binary()
            .map(|blob| Bytes::copy_from_slice(blob.as_ref()));
        let string = resp.secret_string().map(str::to_owned);

        debug!(
            secret = id,
            has_string = string.is_some(),
            has_binary = binary.is_some(),
            "GetSecretValue returned"
        );

        Ok(SecretValue::from_payload(string, binary))
    }

    async fn put_secret_value(&self, id: &str, value: &str) -> Result<(), ApiError> {
        let resp = self
            .client
            .put_secret_value()
            .secret_id(id)
            .secret_string(value)
            .send()
            .await
            .map_err(|e| classify(Operation::PutSecretValue, id, e))?;

        debug!(secret = id, version_id = ?resp.version_id(), "PutSecretValue succeeded");
        Ok(())
    }

    async fn create_secret(&self, name: &str, value: &str) -> Result<(), ApiError> {
        let resp = self
            .client
            .create_secret()
            .name(name)
            .secret_string(value)
            .send()
            .await
            .map_err(|e| classify(Operation::CreateSecret, name, e))?;

        debug!(secret = name, arn = ?resp.arn(), "CreateSecret succeeded");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aws_sdk_secretsmanager::error::ErrorMetadata;
    use aws_sdk_secretsmanager::operation::get_secret_value::GetSecretValueError;
    use aws_sdk_secretsmanager::operation::put_secret_value::PutSecretValueError;
    use std::time::Duration;

    fn service_error(code: &str, message: &str) -> SdkError<GetSecretValueError, ()> {
        let meta = ErrorMetadata::builder().code(code).message(message).build();
        SdkError::service_error(GetSecretValueError::generic(meta), ())
    }

    #[test]
    fn test_classify_not_found() {
        let err = classify(
            Operation::GetSecretValue,
            "test",
            service_error("ResourceNotFoundException", "can't find the specified secret"),
        );
        assert_eq!(err.kind(), ErrorKind::ResourceNotFound);
        assert_eq!(err.secret, "test");
        assert_eq!(err.message, "can't find the specified secret");
        assert!(err.source.is_some());
    }

    #[test]
    fn test_classify_invalid_parameter() {
        let err = classify(
            Operation::GetSecretValue,
            "test",
            service_error("InvalidParameterException", "bad id"),
        );
        assert_eq!(err.kind(), ErrorKind::InvalidParameter);
    }

    #[test]
    fn test_classify_unknown_service_code() {
        let meta = ErrorMetadata::builder()
            .code("AccessDeniedException")
            .message("not authorized")
            .build();
        let err = classify(
            Operation::PutSecretValue,
            "test",
            SdkError::service_error(PutSecretValueError::generic(meta), ()),
        );
        assert_eq!(err.kind(), ErrorKind::Other);
        assert_eq!(err.operation, Operation::PutSecretValue);
    }

    #[test]
    fn test_classify_timeout_is_other() {
        let err = classify(
            Operation::GetSecretValue,
            "test",
            SdkError::<GetSecretValueError, ()>::timeout_error("attempt timed out"),
        );
        assert_eq!(err.kind(), ErrorKind::Other);
    }

    #[tokio::test]
    async fn test_load_sdk_config_applies_settings() {
        let config = StoreConfig::builder()
            .region("us-east-1")
            .endpoint("http://127.0.0.1:1")
            .profile("test")
            .build()
            .unwrap();

        let sdk_config = load_sdk_config(&config).await;
        assert_eq!(sdk_config.region().map(|r| r.as_ref()), Some("us-east-1"));
        assert_eq!(sdk_config.endpoint_url(), Some("http://127.0.0.1:1"));
        assert_eq!(sdk_config.retry_config().map(|r| r.max_attempts()), Some(3));

        let timeouts = sdk_config.timeout_config().expect("timeout config is set");
        assert_eq!(timeouts.connect_timeout(), Some(Duration::from_secs(5)));
        assert_eq!(
            timeouts.operation_attempt_timeout(),
            Some(Duration::from_secs(30))
        );

        let _client = SecretsManagerClient::new(&config).await;
    }
}
