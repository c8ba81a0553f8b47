use bb8::RunError;
use thiserror::Error;
use tokio_postgres::error::SqlState;

/// Store-level failures. The gateway translates these into user-facing messages.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Error getting connection from the pool: {0}")]
    ConnectionPoolError(#[from] RunError<tokio_postgres::Error>),
    #[error("Error executing database query: {0}")]
    DatabaseQueryError(#[from] tokio_postgres::Error),
    #[error("Error initialising the database: {0}")]
    DatabaseInitialisationError(tokio_postgres::Error),
    #[error("Error configuring tls: {0}")]
    TlsError(#[from] rustls::Error),
    #[error("error reading file: {0}")]
    ReadFileError(#[from] std::io::Error),
    #[error("duplicate record: {0}")]
    DuplicateRecord(String),
    #[error("relation does not exist: {0}")]
    MissingTable(String),
    #[error("permission denied: {0}")]
    PermissionDenied(String),
}

impl Error {
    /// Classifies a failed statement by its SQLSTATE code.
    pub fn from_query(e: tokio_postgres::Error) -> Error {
        let detail = e
            .as_db_error()
            .map(|db| db.message().to_string())
            .unwrap_or_else(|| e.to_string());
        match e.code() {
            Some(code) if *code == SqlState::UNIQUE_VIOLATION => Error::DuplicateRecord(detail),
            Some(code) if *code == SqlState::UNDEFINED_TABLE => Error::MissingTable(detail),
            Some(code) if *code == SqlState::INSUFFICIENT_PRIVILEGE => {
                Error::PermissionDenied(detail)
            }
            _ => Error::DatabaseQueryError(e),
        }
    }
}
