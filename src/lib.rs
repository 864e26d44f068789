//! Credential store: one persisted record per authenticated identity,
//! with passwords hashed (Argon2id) before they ever reach storage.

pub mod config;
pub mod credentials;
pub mod error;

pub use config::{HashConfig, StoreConfig};
pub use credentials::record::{Credential, CredentialUpdate, NewCredential};
pub use credentials::repo::{CredentialRepository, CredentialRow, PgCredentialRepository};
pub use credentials::service::CredentialStore;
pub use error::StoreError;
