use thiserror::Error;

/// Errors surfaced by the credential store.
///
/// A failed password comparison is not an error: `compare_password` returns
/// `Ok(false)`. Errors here are constraint violations, bad input, or
/// infrastructure failures, reported to the caller without retry.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("duplicate value for unique field `{field}`")]
    Conflict { field: String },

    #[error("password hashing failed: {0}")]
    Hashing(String),

    #[error("credential not found")]
    NotFound,

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl StoreError {
    /// Map a sqlx error to the store taxonomy: unique violations (SQLSTATE
    /// 23505) become `Conflict` with the offending field derived from the
    /// constraint name, row-not-found becomes `NotFound`, everything else
    /// passes through as `Database`.
    pub fn from_sqlx(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::RowNotFound => StoreError::NotFound,
            sqlx::Error::Database(db_err)
                if db_err.code().is_some_and(|code| code.as_ref() == "23505") =>
            {
                let field = db_err
                    .constraint()
                    .map(constraint_field)
                    .unwrap_or("unknown")
                    .to_string();
                StoreError::Conflict { field }
            }
            _ => StoreError::Database(err),
        }
    }
}

fn constraint_field(constraint: &str) -> &'static str {
    // Postgres names unique constraints `<table>_<column>_key`.
    if constraint.contains("phone") {
        "phone"
    } else if constraint.contains("email") {
        "email"
    } else {
        "unknown"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::error::{DatabaseError, ErrorKind};
    use std::borrow::Cow;
    use std::error::Error as StdError;
    use std::fmt;

    #[derive(Debug)]
    struct TestDbError {
        code: Option<&'static str>,
        constraint: Option<&'static str>,
    }

    impl fmt::Display for TestDbError {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "test database error")
        }
    }

    impl StdError for TestDbError {}

    impl DatabaseError for TestDbError {
        fn message(&self) -> &'static str {
            "test database error"
        }

        fn code(&self) -> Option<Cow<'_, str>> {
            self.code.map(Cow::Borrowed)
        }

        fn constraint(&self) -> Option<&str> {
            self.constraint
        }

        fn as_error(&self) -> &(dyn StdError + Send + Sync + 'static) {
            self
        }

        fn as_error_mut(&mut self) -> &mut (dyn StdError + Send + Sync + 'static) {
            self
        }

        fn into_error(self: Box<Self>) -> Box<dyn StdError + Send + Sync + 'static> {
            self
        }

        fn kind(&self) -> ErrorKind {
            ErrorKind::UniqueViolation
        }
    }

    #[test]
    fn unique_violation_maps_to_conflict_with_field() {
        let err = sqlx::Error::Database(Box::new(TestDbError {
            code: Some("23505"),
            constraint: Some("logins_phone_key"),
        }));
        match StoreError::from_sqlx(err) {
            StoreError::Conflict { field } => assert_eq!(field, "phone"),
            other => panic!("expected Conflict, got {other:?}"),
        }

        let err = sqlx::Error::Database(Box::new(TestDbError {
            code: Some("23505"),
            constraint: Some("logins_email_key"),
        }));
        match StoreError::from_sqlx(err) {
            StoreError::Conflict { field } => assert_eq!(field, "email"),
            other => panic!("expected Conflict, got {other:?}"),
        }
    }

    #[test]
    fn other_sqlstate_stays_database_error() {
        let err = sqlx::Error::Database(Box::new(TestDbError {
            code: Some("99999"),
            constraint: None,
        }));
        assert!(matches!(StoreError::from_sqlx(err), StoreError::Database(_)));
    }

    #[test]
    fn row_not_found_maps_to_not_found() {
        assert!(matches!(
            StoreError::from_sqlx(sqlx::Error::RowNotFound),
            StoreError::NotFound
        ));
    }
}
