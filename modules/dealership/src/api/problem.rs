//! RFC 9457 Problem Details for the dealership API.
//!
//! Every "not yours" outcome is rendered exactly like "does not exist":
//! same status, same title, same detail, same code.

use http::StatusCode;
use serde::{Serialize, Serializer};

use crate::domain::error::DomainError;

pub const APPLICATION_PROBLEM_JSON: &str = "application/problem+json";

const NOT_FOUND_DETAIL: &str = "The requested resource was not found";

#[allow(clippy::trivially_copy_pass_by_ref)] // serde requires &T signature
fn serialize_status_code<S>(status: &StatusCode, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_u16(status.as_u16())
}

#[derive(Debug, Clone, Serialize)]
#[must_use]
pub struct Problem {
    #[serde(rename = "type")]
    pub type_url: String,
    pub title: String,
    #[serde(serialize_with = "serialize_status_code")]
    pub status: StatusCode,
    pub detail: String,
    pub instance: String,
    pub code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trace_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<ValidationViolation>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationViolation {
    pub field: String,
    pub message: String,
}

impl Problem {
    pub fn new(status: StatusCode, title: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            type_url: "about:blank".to_owned(),
            title: title.into(),
            status,
            detail: detail.into(),
            instance: String::new(),
            code: String::new(),
            trace_id: None,
            errors: None,
        }
    }

    pub fn with_instance(mut self, uri: impl Into<String>) -> Self {
        self.instance = uri.into();
        self
    }

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = code.into();
        self
    }

    pub fn with_trace_id(mut self, id: Option<String>) -> Self {
        self.trace_id = id;
        self
    }

    pub fn with_errors(mut self, errors: Vec<ValidationViolation>) -> Self {
        self.errors = Some(errors);
        self
    }
}

/// Map a domain error to a problem response for `instance`.
pub fn domain_error_to_problem(e: &DomainError, instance: &str) -> Problem {
    let trace_id = tracing::Span::current()
        .id()
        .map(|id| id.into_u64().to_string());

    let problem = match e {
        // Unknown and inactive tenants look like any other missing resource.
        DomainError::NotFound { .. } | DomainError::TenantUnavailable => {
            Problem::new(StatusCode::NOT_FOUND, "Not Found", NOT_FOUND_DETAIL).with_code("not_found")
        }
        DomainError::Validation { field, message } => Problem::new(
            StatusCode::UNPROCESSABLE_ENTITY,
            "Validation Failed",
            format!("Validation error on '{field}': {message}"),
        )
        .with_code("validation")
        .with_errors(vec![ValidationViolation {
            field: field.clone(),
            message: message.clone(),
        }]),
        DomainError::QuotaExceeded { resource, limit } => Problem::new(
            StatusCode::FORBIDDEN,
            "Quota Exceeded",
            format!("The plan allows at most {limit} {resource}"),
        )
        .with_code("quota_exceeded"),
        DomainError::Database(_) => {
            tracing::error!(error = ?e, "Database error occurred");
            Problem::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal Server Error",
                "An internal database error occurred",
            )
            .with_code("internal")
        }
    };

    problem.with_instance(instance).with_trace_id(trace_id)
}

impl From<DomainError> for Problem {
    fn from(e: DomainError) -> Self {
        domain_error_to_problem(&e, "/")
    }
}
