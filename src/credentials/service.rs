use std::sync::Arc;

use lazy_static::lazy_static;
use regex::Regex;
use time::OffsetDateTime;
use tracing::{debug, info, warn};

use crate::config::HashConfig;
use crate::credentials::password::hash_password;
use crate::credentials::record::{Credential, CredentialUpdate, NewCredential};
use crate::credentials::repo::{CredentialRepository, CredentialRow, PgCredentialRepository};
use crate::error::StoreError;

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

/// Credential store service.
///
/// The single write path for credential records: every password passes
/// through `hash_password` exactly once before the repository sees it, so
/// there is no save hook to re-enter and no way to double-hash a stored
/// value on an unrelated update.
#[derive(Clone)]
pub struct CredentialStore {
    repo: Arc<dyn CredentialRepository>,
    hash: HashConfig,
}

impl CredentialStore {
    pub fn new(repo: Arc<dyn CredentialRepository>, hash: HashConfig) -> Self {
        Self { repo, hash }
    }

    /// Store backed by Postgres over the `logins` table.
    pub fn postgres(db: sqlx::PgPool, hash: HashConfig) -> Self {
        Self::new(Arc::new(PgCredentialRepository::new(db)), hash)
    }

    /// Create a new credential record. Requires a non-empty phone; hashes
    /// the plaintext password, if any, before the insert.
    pub async fn save_credential(&self, new: NewCredential) -> Result<Credential, StoreError> {
        let phone = new.phone.trim().to_string();
        if phone.is_empty() {
            warn!("save_credential with empty phone");
            return Err(StoreError::InvalidInput("phone is required".into()));
        }

        let email = match new.email {
            Some(raw) => {
                let normalized = raw.trim().to_lowercase();
                if !is_valid_email(&normalized) {
                    warn!(email = %normalized, "invalid email");
                    return Err(StoreError::InvalidInput("invalid email".into()));
                }
                Some(normalized)
            }
            None => None,
        };

        let hashed_password = match new.password.as_deref() {
            Some(plain) if !plain.is_empty() => Some(hash_password(plain, &self.hash)?),
            _ => None,
        };

        let credential = self
            .repo
            .insert(CredentialRow {
                name: new.name,
                email,
                phone,
                otp: new.otp,
                otp_expires: new.otp_expires,
                hashed_password,
            })
            .await?;

        info!(id = credential.id, phone = %credential.phone, "credential created");
        Ok(credential)
    }

    /// Apply a partial update. Fields left `None` keep their stored value;
    /// in particular the stored hash is carried over untouched unless a new
    /// plaintext password is supplied.
    pub async fn update_credential(
        &self,
        id: i64,
        update: CredentialUpdate,
    ) -> Result<Credential, StoreError> {
        let existing = self.repo.find_by_id(id).await?.ok_or(StoreError::NotFound)?;

        let email = match update.email {
            Some(raw) => {
                let normalized = raw.trim().to_lowercase();
                if !is_valid_email(&normalized) {
                    warn!(email = %normalized, "invalid email");
                    return Err(StoreError::InvalidInput("invalid email".into()));
                }
                Some(normalized)
            }
            None => existing.email,
        };

        let hashed_password = match update.password.as_deref() {
            Some(plain) if !plain.is_empty() => {
                debug!(id, "password changed, rehashing");
                Some(hash_password(plain, &self.hash)?)
            }
            _ => existing.hashed_password,
        };

        let credential = self
            .repo
            .update(
                id,
                CredentialRow {
                    name: update.name.or(existing.name),
                    email,
                    phone: existing.phone,
                    otp: update.otp.unwrap_or(existing.otp),
                    otp_expires: update.otp_expires.or(existing.otp_expires),
                    hashed_password,
                },
            )
            .await?;

        info!(id = credential.id, "credential updated");
        Ok(credential)
    }

    /// Rotate the OTP code and its expiry. Delivery is the caller's concern.
    pub async fn issue_otp(
        &self,
        id: i64,
        otp: &str,
        otp_expires: Option<OffsetDateTime>,
    ) -> Result<Credential, StoreError> {
        let credential = self.repo.set_otp(id, otp, otp_expires).await?;
        debug!(id, "otp rotated");
        Ok(credential)
    }

    /// Mark the record deleted without removing the row.
    pub async fn soft_delete(&self, id: i64) -> Result<(), StoreError> {
        self.repo.soft_delete(id).await?;
        info!(id, "credential soft-deleted");
        Ok(())
    }

    pub async fn find_by_id(&self, id: i64) -> Result<Option<Credential>, StoreError> {
        self.repo.find_by_id(id).await
    }

    pub async fn find_by_phone(&self, phone: &str) -> Result<Option<Credential>, StoreError> {
        self.repo.find_by_phone(phone).await
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Option<Credential>, StoreError> {
        self.repo.find_by_email(email.trim().to_lowercase().as_str()).await
    }

    /// Lookup that also sees soft-deleted rows.
    pub async fn find_by_id_unscoped(&self, id: i64) -> Result<Option<Credential>, StoreError> {
        self.repo.find_by_id_unscoped(id).await
    }
}
