//! Infrastructure layer: storage adapters, password hashing, config, wiring.

pub mod bootstrap;
pub mod config;
pub mod password;
pub mod repositories;

mod integration_tests;

pub use bootstrap::{InMemoryStores, Services};
pub use config::InfraConfig;
pub use password::Argon2PasswordHasher;
