//! Strongly-typed identifiers
//!
//! Identifiers come from external data (admin-unit codes, facility ids)
//! and are carried verbatim; the newtypes only prevent mixing them up.

use crate::error::ModelError;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

/// Identifier of an administrative spatial unit (ward / sub-county code)
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UnitId(String);

impl UnitId {
    /// Wrap an external unit code
    #[inline]
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The underlying code as a string slice
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for UnitId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of a service facility
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FacilityId(String);

impl FacilityId {
    /// Wrap an external facility id
    #[inline]
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The underlying id as a string slice
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for FacilityId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Service category a facility belongs to
///
/// An open set: the well-known categories have constants, but any
/// non-empty lowercase token from the input data is accepted. A facility
/// serving several functions is loaded once per category it matches;
/// categories are independent analysis dimensions, never merged.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FacilityCategory(String);

impl FacilityCategory {
    /// Health facilities
    pub const CLINIC: &'static str = "clinic";
    /// Education facilities
    pub const SCHOOL: &'static str = "school";
    /// Food markets
    pub const MARKET: &'static str = "market";
    /// Public-transit stops
    pub const TRANSIT: &'static str = "transit";

    /// Validate and normalize a category token
    ///
    /// # Errors
    /// Returns [`ModelError::EmptyCategory`] when the token is blank.
    pub fn new(raw: &str) -> Result<Self, ModelError> {
        let token = raw.trim().to_ascii_lowercase();
        if token.is_empty() {
            return Err(ModelError::EmptyCategory);
        }
        Ok(Self(token))
    }

    /// The normalized category token
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for FacilityCategory {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl Display for FacilityCategory {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn category_normalizes_case_and_whitespace() {
        let cat = FacilityCategory::new("  Clinic ").unwrap();
        assert_eq!(cat.as_str(), FacilityCategory::CLINIC);
    }

    #[test]
    fn blank_category_rejected() {
        assert!(FacilityCategory::new("   ").is_err());
    }
}
