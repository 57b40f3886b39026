//! AWS Secrets Manager backend.
//!
//! [`SecretsManagerClient`] implements [`SecretsApi`](crate::services::secrets_api::SecretsApi)
//! on top of `aws-sdk-secretsmanager`.

mod client;

pub use client::{SecretsManagerClient, load_sdk_config};
