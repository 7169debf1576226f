// SQLITE_CONSTRAINT_UNIQUE, reported by sqlx as the extended result code.
const UNIQUE_VIOLATION: &str = "2067";

#[derive(thiserror::Error)]
pub enum StoreError {
    #[error("Subscriber already exists: {0}")]
    Conflict(#[source] sqlx::Error),
    #[error("Failed to execute query: {0}")]
    Persistence(#[source] sqlx::Error),
}

impl std::fmt::Debug for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Caused by:\n\t({})", self)
    }
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        let is_unique_violation = matches!(
            &err,
            sqlx::Error::Database(db_err) if db_err.code().as_deref() == Some(UNIQUE_VIOLATION)
        );

        if is_unique_violation {
            StoreError::Conflict(err)
        } else {
            StoreError::Persistence(err)
        }
    }
}

impl StoreError {
    pub fn is_conflict(&self) -> bool {
        matches!(self, StoreError::Conflict(_))
    }
}
