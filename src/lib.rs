//! Key-value access to AWS Secrets Manager.
//!
//! [`SecretStoreClient::get_value`] reads a secret by name, treating
//! not-found and rejected lookups as "no value". [`SecretStoreClient::set_value`]
//! overwrites a secret, creating it when it does not exist yet.

pub mod config;
pub mod error;
pub mod infra;
pub mod services;
pub mod store;

pub use config::{StoreConfig, StoreConfigBuilder, TransportSettings};
pub use error::{ApiError, ConfigError, ErrorKind, StoreError};
pub use services::secrets_api::{Operation, SecretValue, SecretsApi};
pub use store::{SecretStoreClient, WriteOutcome};
