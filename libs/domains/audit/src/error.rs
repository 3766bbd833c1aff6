use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuditError {
    #[error("Database error: {0}")]
    Database(String),
}

pub type AuditResult<T> = Result<T, AuditError>;

impl From<mongodb::error::Error> for AuditError {
    fn from(err: mongodb::error::Error) -> Self {
        AuditError::Database(err.to_string())
    }
}
