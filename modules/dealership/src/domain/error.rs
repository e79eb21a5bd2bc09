use dealer_db::secure::ScopeError;

#[derive(Debug, thiserror::Error)]
pub enum DomainError {
    /// Missing, or owned by another tenant. The two are never told apart.
    #[error("{entity} not found")]
    NotFound { entity: &'static str },

    #[error("Validation error on field '{field}': {message}")]
    Validation { field: String, message: String },

    #[error("{resource} quota exceeded (limit {limit})")]
    QuotaExceeded { resource: &'static str, limit: i32 },

    #[error("Tenant is unknown or not active")]
    TenantUnavailable,

    #[error("Database error: {0}")]
    Database(String),
}

impl DomainError {
    #[must_use]
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    #[must_use]
    pub fn not_found(entity: &'static str) -> Self {
        Self::NotFound { entity }
    }

    pub(crate) fn from_scope(entity: &'static str, err: ScopeError) -> Self {
        match err {
            ScopeError::NotFoundOrDenied { .. } => Self::NotFound { entity },
            ScopeError::Invalid(msg) => Self::validation("tenant_id", msg),
            ScopeError::Db(e) => Self::Database(e.to_string()),
        }
    }
}

impl From<ScopeError> for DomainError {
    fn from(err: ScopeError) -> Self {
        Self::from_scope("Resource", err)
    }
}

impl From<sea_orm::DbErr> for DomainError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}
