pub mod secrets_api;
