use sqlx::Error as SqlxError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("Database error: {0}")]
    Sqlx(SqlxError),

    #[error("Not found")]
    NotFound,

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Already exists: {0}")]
    AlreadyExists(String),

    #[error("Custom: {0}")]
    Custom(String),
}

impl From<SqlxError> for RepositoryError {
    fn from(err: SqlxError) -> Self {
        match err {
            SqlxError::RowNotFound => RepositoryError::NotFound,
            other => {
                // 23505 is Postgres unique_violation; order numbers and
                // payment keys rely on it as the authoritative guard.
                if let Some(db_err) = other.as_database_error()
                    && db_err.code().as_deref() == Some("23505")
                {
                    return RepositoryError::AlreadyExists(db_err.message().to_string());
                }
                RepositoryError::Sqlx(other)
            }
        }
    }
}
