//! Trait and types for talking to a remote secret store.

use bytes::Bytes;
use std::fmt;

use crate::error::ApiError;

/// The value of a secret.
///
/// The provider stores either a UTF-8 string or a binary blob, never both.
/// The kind is decided by which payload is present, not by inspecting content.
#[derive(Clone, PartialEq, Eq)]
pub enum SecretValue {
    String(String),
    Binary(Bytes),
}

impl SecretValue {
    /// Builds a value from the two optional payloads of a read response.
    ///
    /// A non-empty string wins. Failing that, a non-empty binary payload is
    /// used. Returns `None` when neither is populated.
    pub fn from_payload(string: Option<String>, binary: Option<Bytes>) -> Option<Self> {
        match (string, binary) {
            (Some(s), _) if !s.is_empty() => Some(SecretValue::String(s)),
            (_, Some(b)) if !b.is_empty() => Some(SecretValue::Binary(b)),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            SecretValue::String(s) => Some(s),
            SecretValue::Binary(_) => None,
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        match self {
            SecretValue::String(s) => s.as_bytes(),
            SecretValue::Binary(b) => &b[..],
        }
    }

    pub fn is_binary(&self) -> bool {
        matches!(self, SecretValue::Binary(_))
    }
}

// Values are secrets; keep them out of logs and panic messages.
impl fmt::Debug for SecretValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SecretValue::String(s) => write!(f, "String(<redacted {} bytes>)", s.len()),
            SecretValue::Binary(b) => write!(f, "Binary(<redacted {} bytes>)", b.len()),
        }
    }
}

impl From<&str> for SecretValue {
    fn from(s: &str) -> Self {
        SecretValue::String(s.to_string())
    }
}

impl From<String> for SecretValue {
    fn from(s: String) -> Self {
        SecretValue::String(s)
    }
}

impl From<Bytes> for SecretValue {
    fn from(b: Bytes) -> Self {
        SecretValue::Binary(b)
    }
}

/// Remote operations issued by the store, used for error reporting and logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    GetSecretValue,
    PutSecretValue,
    CreateSecret,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Operation::GetSecretValue => "GetSecretValue",
            Operation::PutSecretValue => "PutSecretValue",
            Operation::CreateSecret => "CreateSecret",
        };
        f.write_str(s)
    }
}

/// Abstraction over a secret-management service (e.g. AWS Secrets Manager).
///
/// Implementations report failures as [`ApiError`] with the provider's error
/// code already mapped to an [`ErrorKind`](crate::error::ErrorKind).
#[async_trait::async_trait]
pub trait SecretsApi: Send + Sync {
    /// Reads the current value of `id`. `Ok(None)` means the secret exists but
    /// carries no populated payload.
    async fn get_secret_value(&self, id: &str) -> Result<Option<SecretValue>, ApiError>;

    /// Stores `value` as the new current version of an existing secret.
    async fn put_secret_value(&self, id: &str, value: &str) -> Result<(), ApiError>;

    /// Creates a new secret named `name` holding `value`.
    async fn create_secret(&self, name: &str, value: &str) -> Result<(), ApiError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_payload_prefers_string() {
        let value = SecretValue::from_payload(Some("case".into()), Some(Bytes::from_static(b"x")));
        assert_eq!(value, Some(SecretValue::String("case".into())));
    }

    #[test]
    fn test_from_payload_binary_when_no_string() {
        let value = SecretValue::from_payload(None, Some(Bytes::from_static(&[0, 1, 2])));
        assert_eq!(value, Some(SecretValue::Binary(Bytes::from_static(&[0, 1, 2]))));
    }

    #[test]
    fn test_from_payload_empty_string_falls_back_to_binary() {
        let value = SecretValue::from_payload(Some(String::new()), Some(Bytes::from_static(b"b")));
        assert!(value.unwrap().is_binary());
    }

    #[test]
    fn test_from_payload_nothing_populated() {
        assert_eq!(SecretValue::from_payload(None, None), None);
        assert_eq!(SecretValue::from_payload(Some(String::new()), Some(Bytes::new())), None);
    }

    #[test]
    fn test_debug_redacts_value() {
        let value = SecretValue::from("hunter2");
        let debug = format!("{value:?}");
        assert!(!debug.contains("hunter2"));
        assert_eq!(debug, "String(<redacted 7 bytes>)");
    }

    #[test]
    fn test_accessors() {
        let s = SecretValue::from("case");
        assert_eq!(s.as_str(), Some("case"));
        assert_eq!(s.as_bytes(), b"case");

        let b = SecretValue::from(Bytes::from_static(b"\xff\x00"));
        assert_eq!(b.as_str(), None);
        assert_eq!(b.as_bytes(), b"\xff\x00");
    }
}
