//! Error types for the skywatch registry

use thiserror::Error;

/// Errors surfaced by registry operations.
///
/// Rejection conditions carry stable numeric wire codes (see
/// [`RegistryError::code`]) so embedders can map them without string
/// matching. A precondition failure aborts the whole call; no operation
/// leaves partial state behind.
#[derive(Error, Debug)]
pub enum RegistryError {
    #[error("Bad parameters: {0}")]
    BadParameters(String),

    #[error("Record not found: {0}")]
    InvalidRecord(i64),

    #[error("Record {record_id} already validated by {validator}")]
    DuplicateValidation { record_id: i64, validator: String },

    #[error("Cannot validate own record: {0}")]
    SelfValidation(i64),

    #[error("Not authorized: {0}")]
    NotAuthorized(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl RegistryError {
    /// Stable numeric code for this error.
    ///
    /// Each rejection condition maps to a distinct code. Infrastructure
    /// failures (IO, database) share a single code and are not part of the
    /// portable taxonomy.
    pub fn code(&self) -> u32 {
        match self {
            RegistryError::NotAuthorized(_) => 100,
            RegistryError::NotFound(_) => 101,
            RegistryError::InvalidRecord(_) => 102,
            RegistryError::DuplicateValidation { .. } => 104,
            RegistryError::SelfValidation(_) => 105,
            RegistryError::BadParameters(_) => 108,
            RegistryError::Io(_) | RegistryError::Database(_) | RegistryError::Internal(_) => 110,
        }
    }
}

impl From<rusqlite::Error> for RegistryError {
    fn from(e: rusqlite::Error) -> Self {
        RegistryError::Database(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejection_codes_are_distinct() {
        let errors = [
            RegistryError::NotAuthorized("x".into()),
            RegistryError::NotFound("x".into()),
            RegistryError::InvalidRecord(1),
            RegistryError::DuplicateValidation {
                record_id: 1,
                validator: "x".into(),
            },
            RegistryError::SelfValidation(1),
            RegistryError::BadParameters("x".into()),
        ];

        let mut codes: Vec<u32> = errors.iter().map(|e| e.code()).collect();
        codes.sort_unstable();
        codes.dedup();
        assert_eq!(codes.len(), errors.len());
    }

    #[test]
    fn test_infrastructure_errors_share_one_code() {
        let db = RegistryError::Database("boom".into());
        let internal = RegistryError::Internal("boom".into());
        assert_eq!(db.code(), internal.code());
    }
}
