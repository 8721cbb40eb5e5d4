//! Employee identifier: `VAE` followed by exactly five digits.
//!
//! Matching is case-insensitive; the stored form is always uppercase, which is
//! what the persistence backends use as the record key.

use std::fmt;
use std::str::FromStr;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::IdCaptureError;

/// Hint shown next to the identifier field whenever it fails validation.
pub const ID_FORMAT_HINT: &str = "Employee ID must have the format VAE + 5 digits (e.g. VAE00076)";

static EMPLOYEE_ID_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)^VAE[0-9]{5}$").unwrap());

/// A validated, uppercased employee identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct EmployeeId(String);

impl EmployeeId {
    pub fn parse(raw: &str) -> Result<Self, IdCaptureError> {
        if !EMPLOYEE_ID_RE.is_match(raw) {
            return Err(IdCaptureError::validation(ID_FORMAT_HINT));
        }
        Ok(Self(raw.to_ascii_uppercase()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Validate raw input, returning the normalized identifier or the format hint.
pub fn validate_employee_id(raw: &str) -> Result<EmployeeId, IdCaptureError> {
    EmployeeId::parse(raw)
}

impl FromStr for EmployeeId {
    type Err = IdCaptureError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for EmployeeId {
    type Error = IdCaptureError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<EmployeeId> for String {
    fn from(id: EmployeeId) -> Self {
        id.0
    }
}

impl fmt::Display for EmployeeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
