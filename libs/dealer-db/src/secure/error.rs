use sea_orm::SqlErr;

/// Errors that can occur during tenant-scoped operations.
#[derive(thiserror::Error, Debug)]
pub enum ScopeError {
    /// Database error occurred during query execution.
    #[error("database error: {0}")]
    Db(#[from] sea_orm::DbErr),

    /// The target row does not exist or belongs to another tenant.
    ///
    /// The two cases are deliberately not distinguished.
    #[error("{entity} not found or access denied")]
    NotFoundOrDenied { entity: String },

    /// Invalid scope input, such as a nil tenant id.
    #[error("invalid scope: {0}")]
    Invalid(&'static str),
}

impl ScopeError {
    #[must_use]
    pub fn is_not_found_or_denied(&self) -> bool {
        matches!(self, ScopeError::NotFoundOrDenied { .. })
    }

    /// True when the database rejected a write on a unique index.
    #[must_use]
    pub fn is_unique_violation(&self) -> bool {
        matches!(
            self,
            ScopeError::Db(err) if matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_)))
        )
    }
}
