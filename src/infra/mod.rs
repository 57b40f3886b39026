pub mod secretsmanager;
