use async_trait::async_trait;
use sqlx::PgPool;
use time::OffsetDateTime;

use crate::credentials::record::Credential;
use crate::error::StoreError;

/// Row-level write input. `hashed_password` is already a hash by the time it
/// reaches the repository; plaintext never crosses this boundary.
#[derive(Debug, Clone)]
pub struct CredentialRow {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: String,
    pub otp: String,
    pub otp_expires: Option<OffsetDateTime>,
    pub hashed_password: Option<String>,
}

/// Storage interface for credential records.
///
/// Default lookups exclude soft-deleted rows; only `find_by_id_unscoped`
/// sees them. There is no hard delete at this layer.
#[async_trait]
pub trait CredentialRepository: Send + Sync {
    async fn insert(&self, row: CredentialRow) -> Result<Credential, StoreError>;
    async fn update(&self, id: i64, row: CredentialRow) -> Result<Credential, StoreError>;
    async fn find_by_id(&self, id: i64) -> Result<Option<Credential>, StoreError>;
    async fn find_by_phone(&self, phone: &str) -> Result<Option<Credential>, StoreError>;
    async fn find_by_email(&self, email: &str) -> Result<Option<Credential>, StoreError>;
    async fn find_by_id_unscoped(&self, id: i64) -> Result<Option<Credential>, StoreError>;
    async fn set_otp(
        &self,
        id: i64,
        otp: &str,
        otp_expires: Option<OffsetDateTime>,
    ) -> Result<Credential, StoreError>;
    async fn soft_delete(&self, id: i64) -> Result<(), StoreError>;
}

/// Postgres-backed repository over the `logins` table.
#[derive(Clone)]
pub struct PgCredentialRepository {
    db: PgPool,
}

impl PgCredentialRepository {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl CredentialRepository for PgCredentialRepository {
    async fn insert(&self, row: CredentialRow) -> Result<Credential, StoreError> {
        let credential = sqlx::query_as::<_, Credential>(
            r#"
            INSERT INTO logins (name, email, phone, otp, otp_expires, hashed_password)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, name, email, phone, otp, otp_expires, hashed_password,
                      created_at, updated_at, deleted_at
            "#,
        )
        .bind(&row.name)
        .bind(&row.email)
        .bind(&row.phone)
        .bind(&row.otp)
        .bind(row.otp_expires)
        .bind(&row.hashed_password)
        .fetch_one(&self.db)
        .await
        .map_err(StoreError::from_sqlx)?;
        Ok(credential)
    }

    async fn update(&self, id: i64, row: CredentialRow) -> Result<Credential, StoreError> {
        let credential = sqlx::query_as::<_, Credential>(
            r#"
            UPDATE logins
            SET name = $2, email = $3, phone = $4, otp = $5, otp_expires = $6,
                hashed_password = $7, updated_at = now()
            WHERE id = $1 AND deleted_at IS NULL
            RETURNING id, name, email, phone, otp, otp_expires, hashed_password,
                      created_at, updated_at, deleted_at
            "#,
        )
        .bind(id)
        .bind(&row.name)
        .bind(&row.email)
        .bind(&row.phone)
        .bind(&row.otp)
        .bind(row.otp_expires)
        .bind(&row.hashed_password)
        .fetch_one(&self.db)
        .await
        .map_err(StoreError::from_sqlx)?;
        Ok(credential)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Credential>, StoreError> {
        let credential = sqlx::query_as::<_, Credential>(
            r#"
            SELECT id, name, email, phone, otp, otp_expires, hashed_password,
                   created_at, updated_at, deleted_at
            FROM logins
            WHERE id = $1 AND deleted_at IS NULL
            "#,
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await
        .map_err(StoreError::from_sqlx)?;
        Ok(credential)
    }

    async fn find_by_phone(&self, phone: &str) -> Result<Option<Credential>, StoreError> {
        let credential = sqlx::query_as::<_, Credential>(
            r#"
            SELECT id, name, email, phone, otp, otp_expires, hashed_password,
                   created_at, updated_at, deleted_at
            FROM logins
            WHERE phone = $1 AND deleted_at IS NULL
            "#,
        )
        .bind(phone)
        .fetch_optional(&self.db)
        .await
        .map_err(StoreError::from_sqlx)?;
        Ok(credential)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Credential>, StoreError> {
        let credential = sqlx::query_as::<_, Credential>(
            r#"
            SELECT id, name, email, phone, otp, otp_expires, hashed_password,
                   created_at, updated_at, deleted_at
            FROM logins
            WHERE email = $1 AND deleted_at IS NULL
            "#,
        )
        .bind(email)
        .fetch_optional(&self.db)
        .await
        .map_err(StoreError::from_sqlx)?;
        Ok(credential)
    }

    async fn find_by_id_unscoped(&self, id: i64) -> Result<Option<Credential>, StoreError> {
        let credential = sqlx::query_as::<_, Credential>(
            r#"
            SELECT id, name, email, phone, otp, otp_expires, hashed_password,
                   created_at, updated_at, deleted_at
            FROM logins
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await
        .map_err(StoreError::from_sqlx)?;
        Ok(credential)
    }

    async fn set_otp(
        &self,
        id: i64,
        otp: &str,
        otp_expires: Option<OffsetDateTime>,
    ) -> Result<Credential, StoreError> {
        let credential = sqlx::query_as::<_, Credential>(
            r#"
            UPDATE logins
            SET otp = $2, otp_expires = $3, updated_at = now()
            WHERE id = $1 AND deleted_at IS NULL
            RETURNING id, name, email, phone, otp, otp_expires, hashed_password,
                      created_at, updated_at, deleted_at
            "#,
        )
        .bind(id)
        .bind(otp)
        .bind(otp_expires)
        .fetch_one(&self.db)
        .await
        .map_err(StoreError::from_sqlx)?;
        Ok(credential)
    }

    async fn soft_delete(&self, id: i64) -> Result<(), StoreError> {
        let result = sqlx::query(
            r#"
            UPDATE logins
            SET deleted_at = now(), updated_at = now()
            WHERE id = $1 AND deleted_at IS NULL
            "#,
        )
        .bind(id)
        .execute(&self.db)
        .await
        .map_err(StoreError::from_sqlx)?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }
}
