use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A single taxpayer record. `tid` uniquely identifies the record in the
/// store and is immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Taxpayer {
    pub tid: String,
    pub first_name: String,
    pub last_name: String,
    pub address: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("field '{field}' must not be empty")]
pub struct EmptyField {
    pub field: &'static str,
}

impl Taxpayer {
    pub fn new(
        tid: impl Into<String>,
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        address: impl Into<String>,
    ) -> Self {
        Self {
            tid: tid.into(),
            first_name: first_name.into(),
            last_name: last_name.into(),
            address: address.into(),
        }
    }

    /// All four fields must be non-empty after trimming. Shared by the
    /// client-side pre-check and the server so both reject the same input.
    pub fn validate(&self) -> Result<(), EmptyField> {
        require_non_empty("tid", &self.tid)?;
        require_non_empty("first_name", &self.first_name)?;
        require_non_empty("last_name", &self.last_name)?;
        require_non_empty("address", &self.address)?;
        Ok(())
    }

    /// Canonical form stored by the server: surrounding whitespace removed.
    pub fn trimmed(&self) -> Self {
        Self {
            tid: self.tid.trim().to_string(),
            first_name: self.first_name.trim().to_string(),
            last_name: self.last_name.trim().to_string(),
            address: self.address.trim().to_string(),
        }
    }
}

fn require_non_empty(field: &'static str, value: &str) -> Result<(), EmptyField> {
    if value.trim().is_empty() {
        return Err(EmptyField { field });
    }
    Ok(())
}
