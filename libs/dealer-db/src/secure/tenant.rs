use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::secure::ScopeError;

/// Identifier of the tenant a [`TenantConn`](super::TenantConn) is bound to.
///
/// Never nil: the nil UUID is what an unresolved tenant would look like, and
/// binding it would silently produce a connection that sees nothing.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "Uuid", into = "Uuid")]
pub struct TenantId(Uuid);

impl TenantId {
    /// # Errors
    /// Returns `ScopeError::Invalid` for the nil UUID.
    pub fn new(id: Uuid) -> Result<Self, ScopeError> {
        if id.is_nil() {
            return Err(ScopeError::Invalid("tenant id must not be nil"));
        }
        Ok(Self(id))
    }

    /// Parse a tenant id from its textual form (e.g. an `x-tenant-id` header).
    ///
    /// # Errors
    /// Returns `ScopeError::Invalid` if the value is not a UUID or is nil.
    pub fn parse(value: &str) -> Result<Self, ScopeError> {
        let id = Uuid::parse_str(value.trim())
            .map_err(|_| ScopeError::Invalid("tenant id is not a valid UUID"))?;
        Self::new(id)
    }

    #[inline]
    #[must_use]
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl TryFrom<Uuid> for TenantId {
    type Error = ScopeError;

    fn try_from(id: Uuid) -> Result<Self, Self::Error> {
        Self::new(id)
    }
}

impl From<TenantId> for Uuid {
    fn from(id: TenantId) -> Self {
        id.0
    }
}

impl FromStr for TenantId {
    type Err = ScopeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for TenantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}
