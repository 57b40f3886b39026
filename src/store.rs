//! Key-value access to a remote secret store.
//!
//! [`SecretStoreClient`] reads a secret by name and writes one by name,
//! creating it on first write. Nothing is cached; every call is a round trip.

use tracing::{debug, warn};

use crate::config::{StoreConfig, StoreConfigBuilder};
use crate::error::{ErrorKind, StoreError};
use crate::infra::secretsmanager::SecretsManagerClient;
use crate::services::secrets_api::{SecretValue, SecretsApi};

/// Which write path [`SecretStoreClient::set_value`] took.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    /// The secret existed and a new version was stored.
    Updated,
    /// The secret did not exist and was created.
    Created,
}

#[derive(Debug, Clone)]
pub struct SecretStoreClient<A = SecretsManagerClient> {
    api: A,
}

impl SecretStoreClient<SecretsManagerClient> {
    /// Validates `options` and builds a client bound to the resulting region
    /// and endpoint.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Config`] if a required option is missing or the
    /// endpoint is not a URL.
    pub async fn connect(options: StoreConfigBuilder) -> Result<Self, StoreError> {
        let config = options.build()?;
        Ok(Self::from_config(&config).await)
    }

    /// Builds a client from an already validated config.
    ///
    /// No request is sent here; credentials are resolved on first use.
    pub async fn from_config(config: &StoreConfig) -> Self {
        debug!(
            region = config.region(),
            endpoint = %config.endpoint(),
            profile = config.profile(),
            "Creating secret store client"
        );
        Self {
            api: SecretsManagerClient::new(config).await,
        }
    }
}

impl<A: SecretsApi> SecretStoreClient<A> {
    /// Wraps any [`SecretsApi`] implementation.
    pub fn with_api(api: A) -> Self {
        Self { api }
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    /// Fetches the current value of `name`.
    ///
    /// Returns `Ok(None)` when the secret has no populated payload or when the
    /// store reports it as not found, or rejects the request or its
    /// parameters. Every other failure is returned as an error.
    #[tracing::instrument(skip(self))]
    pub async fn get_value(&self, name: &str) -> Result<Option<SecretValue>, StoreError> {
        check_name(name)?;

        match self.api.get_secret_value(name).await {
            Ok(Some(value)) => {
                debug!(binary = value.is_binary(), "Secret value found");
                Ok(Some(value))
            }
            Ok(None) => {
                debug!("Secret has no value");
                Ok(None)
            }
            Err(err) if err.kind().is_absent() => {
                debug!(kind = %err.kind(), message = %err.message, "Treating secret as absent");
                Ok(None)
            }
            Err(err) => {
                warn!(error = %err, "GetSecretValue failed");
                Err(err.into())
            }
        }
    }

    /// Stores `value` under `name`, overwriting an existing secret or creating
    /// a new one.
    ///
    /// # Errors
    ///
    /// Fails without writing if the existence check reports anything other than
    /// not-found (including invalid request or parameter). A failed update or
    /// create is returned as is.
    #[tracing::instrument(skip(self, value))]
    pub async fn set_value(&self, name: &str, value: &str) -> Result<WriteOutcome, StoreError> {
        check_name(name)?;

        match self.api.get_secret_value(name).await {
            Ok(_) => {
                self.api.put_secret_value(name, value).await.inspect_err(|e| {
                    warn!(error = %e, "PutSecretValue failed");
                })?;
                debug!("Overwrote existing secret");
                Ok(WriteOutcome::Updated)
            }
            Err(err) if err.kind() == ErrorKind::ResourceNotFound => {
                debug!("Secret not found, creating it");
                self.api.create_secret(name, value).await.inspect_err(|e| {
                    warn!(error = %e, "CreateSecret failed");
                })?;
                Ok(WriteOutcome::Created)
            }
            Err(err) => {
                warn!(error = %err, "Existence check failed");
                Err(err.into())
            }
        }
    }
}

fn check_name(name: &str) -> Result<(), StoreError> {
    if name.is_empty() {
        return Err(StoreError::InvalidName);
    }
    Ok(())
}
