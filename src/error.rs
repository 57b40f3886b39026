//! Error types for the secret store.
//!
//! [`ConfigError`] covers construction, [`ApiError`] covers a single remote
//! call, and [`StoreError`] is what [`SecretStoreClient`](crate::store::SecretStoreClient)
//! hands back to callers.

use std::fmt;

use crate::services::secrets_api::Operation;

pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("missing required {0} in options")]
    Missing(&'static str),

    #[error("invalid endpoint '{endpoint}': {source}")]
    InvalidEndpoint {
        endpoint: String,
        #[source]
        source: url::ParseError,
    },

    #[error("max_retries {max_retries} exceeds the limit of {limit}")]
    TooManyRetries { max_retries: u32, limit: u32 },

    #[error("failed to read config file '{path}': {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file '{path}': {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Category of a failed remote call, taken from the provider's error code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    ResourceNotFound,
    InvalidRequest,
    InvalidParameter,
    /// Timeouts, network failures, auth, throttling and unclassified codes.
    Other,
}

impl ErrorKind {
    /// Maps a provider error code (e.g. `ResourceNotFoundException`) to a kind.
    pub fn from_code(code: Option<&str>) -> Self {
        match code {
            Some("ResourceNotFoundException") => ErrorKind::ResourceNotFound,
            Some("InvalidRequestException") => ErrorKind::InvalidRequest,
            Some("InvalidParameterException") => ErrorKind::InvalidParameter,
            _ => ErrorKind::Other,
        }
    }

    /// `true` for the conditions a read treats as "no value".
    pub fn is_absent(self) -> bool {
        !matches!(self, ErrorKind::Other)
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorKind::ResourceNotFound => "resource not found",
            ErrorKind::InvalidRequest => "invalid request",
            ErrorKind::InvalidParameter => "invalid parameter",
            ErrorKind::Other => "request failed",
        };
        f.write_str(s)
    }
}

/// A failed call to the remote secret store.
#[derive(Debug, thiserror::Error)]
#[error("{operation} for '{secret}': {kind}: {message}")]
pub struct ApiError {
    pub operation: Operation,
    pub secret: String,
    pub kind: ErrorKind,
    pub message: String,
    #[source]
    pub source: Option<BoxError>,
}

impl ApiError {
    pub fn new(
        operation: Operation,
        secret: &str,
        kind: ErrorKind,
        message: impl Into<String>,
    ) -> Self {
        Self {
            operation,
            secret: secret.to_string(),
            kind,
            message: message.into(),
            source: None,
        }
    }

    pub fn with_source(mut self, source: impl Into<BoxError>) -> Self {
        self.source = Some(source.into());
        self
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("secret name must not be empty")]
    InvalidName,

    #[error(transparent)]
    Api(#[from] ApiError),
}

impl StoreError {
    /// The remote error category, if this error came from the secret store.
    pub fn api_kind(&self) -> Option<ErrorKind> {
        match self {
            StoreError::Api(e) => Some(e.kind),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_code_known_codes() {
        assert_eq!(
            ErrorKind::from_code(Some("ResourceNotFoundException")),
            ErrorKind::ResourceNotFound
        );
        assert_eq!(
            ErrorKind::from_code(Some("InvalidRequestException")),
            ErrorKind::InvalidRequest
        );
        assert_eq!(
            ErrorKind::from_code(Some("InvalidParameterException")),
            ErrorKind::InvalidParameter
        );
    }

    #[test]
    fn test_from_code_unknown_is_other() {
        assert_eq!(ErrorKind::from_code(Some("ThrottlingException")), ErrorKind::Other);
        assert_eq!(ErrorKind::from_code(Some("DecryptionFailure")), ErrorKind::Other);
        assert_eq!(ErrorKind::from_code(None), ErrorKind::Other);
    }

    #[test]
    fn test_is_absent() {
        assert!(ErrorKind::ResourceNotFound.is_absent());
        assert!(ErrorKind::InvalidRequest.is_absent());
        assert!(ErrorKind::InvalidParameter.is_absent());
        assert!(!ErrorKind::Other.is_absent());
    }

    #[test]
    fn test_api_error_display() {
        let err = ApiError::new(
            Operation::GetSecretValue,
            "db/password",
            ErrorKind::ResourceNotFound,
            "Secrets Manager can't find the specified secret.",
        );
        assert_eq!(
            err.to_string(),
            "GetSecretValue for 'db/password': resource not found: Secrets Manager can't find the specified secret."
        );
    }

    #[test]
    fn test_store_error_api_kind() {
        let err: StoreError =
            ApiError::new(Operation::CreateSecret, "x", ErrorKind::InvalidRequest, "bad").into();
        assert_eq!(err.api_kind(), Some(ErrorKind::InvalidRequest));
        assert_eq!(StoreError::InvalidName.api_kind(), None);
    }
}
