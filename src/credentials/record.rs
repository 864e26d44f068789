use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;

use crate::credentials::password;
use crate::error::StoreError;

/// Credential record in the database, one row per identity.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Credential {
    pub id: i64,                              // unique record ID
    pub name: Option<String>,                 // display name
    pub email: Option<String>,                // unique when present
    pub phone: String,                        // unique, required
    pub otp: String,                          // one-time password code
    pub otp_expires: Option<OffsetDateTime>,  // OTP validity cutoff
    #[serde(skip_serializing)]
    pub hashed_password: Option<String>,      // Argon2 hash, not exposed in JSON
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
    pub deleted_at: Option<OffsetDateTime>,   // soft-delete marker
}

impl Credential {
    /// Check a plaintext candidate against the stored hash.
    ///
    /// Returns `Ok(false)` when no password is set; a mismatch is never an
    /// error. Errors only when the hashing backend fails (malformed hash).
    pub fn compare_password(&self, candidate: &str) -> Result<bool, StoreError> {
        match self.hashed_password.as_deref() {
            None | Some("") => Ok(false),
            Some(hash) => password::verify_password(candidate, hash),
        }
    }

    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }
}

/// Input for creating a credential. `password` is plaintext here and is
/// hashed exactly once by the store before the insert.
#[derive(Debug, Clone, Deserialize)]
pub struct NewCredential {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: String,
    pub otp: String,
    pub otp_expires: Option<OffsetDateTime>,
    pub password: Option<String>,
}

/// Partial update. `None` fields are left untouched, so a profile update
/// never routes the stored hash back through the hasher.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CredentialUpdate {
    pub name: Option<String>,
    pub email: Option<String>,
    pub otp: Option<String>,
    pub otp_expires: Option<OffsetDateTime>,
    pub password: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::HashConfig;
    use time::macros::datetime;

    fn record_with_hash(hash: Option<&str>) -> Credential {
        Credential {
            id: 1,
            name: None,
            email: None,
            phone: "+15550001111".into(),
            otp: "123456".into(),
            otp_expires: None,
            hashed_password: hash.map(str::to_string),
            created_at: datetime!(2024-01-01 0:00 UTC),
            updated_at: datetime!(2024-01-01 0:00 UTC),
            deleted_at: None,
        }
    }

    #[test]
    fn compare_password_false_when_unset() {
        let record = record_with_hash(None);
        assert!(!record.compare_password("anything").expect("no error"));

        let record = record_with_hash(Some(""));
        assert!(!record.compare_password("anything").expect("no error"));
    }

    #[test]
    fn compare_password_roundtrip() {
        let cfg = HashConfig {
            memory_kib: 1024,
            iterations: 1,
            parallelism: 1,
        };
        let hash = password::hash_password("secret123", &cfg).expect("hash");
        let record = record_with_hash(Some(&hash));
        assert!(record.compare_password("secret123").expect("verify"));
        assert!(!record.compare_password("wrong").expect("verify"));
    }

    #[test]
    fn hashed_password_not_serialized() {
        let record = record_with_hash(Some("$argon2id$fake"));
        let json = serde_json::to_string(&record).expect("serialize");
        assert!(!json.contains("hashed_password"));
        assert!(json.contains("phone"));
    }
}
