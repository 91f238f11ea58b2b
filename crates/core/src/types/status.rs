//! Status and role enums.

use serde::{Deserialize, Serialize};

/// Error returned when a status string from the database or a request body
/// does not match any known variant.
#[derive(Debug, Clone, thiserror::Error)]
#[error("unknown {kind} value: {value}")]
pub struct StatusParseError {
    /// Which enum failed to parse (e.g., "listing status").
    pub kind: &'static str,
    /// The offending input.
    pub value: String,
}

/// Status of a listing on an external e-commerce platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ListingStatus {
    #[default]
    Active,
    Inactive,
    Ended,
}

impl ListingStatus {
    /// The canonical string stored in the `listing_status` column.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Inactive => "inactive",
            Self::Ended => "ended",
        }
    }
}

impl std::str::FromStr for ListingStatus {
    type Err = StatusParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(Self::Active),
            "inactive" => Ok(Self::Inactive),
            "ended" => Ok(Self::Ended),
            other => Err(StatusParseError {
                kind: "listing status",
                value: other.to_owned(),
            }),
        }
    }
}

/// Application role of a user account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    #[default]
    User,
    Admin,
}

impl UserRole {
    /// The canonical string stored in the `role` column.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Admin => "admin",
        }
    }
}

impl std::str::FromStr for UserRole {
    type Err = StatusParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Self::User),
            "admin" => Ok(Self::Admin),
            other => Err(StatusParseError {
                kind: "user role",
                value: other.to_owned(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_listing_status_roundtrip() {
        for status in [
            ListingStatus::Active,
            ListingStatus::Inactive,
            ListingStatus::Ended,
        ] {
            assert_eq!(ListingStatus::from_str(status.as_str()).expect("parse"), status);
        }
    }

    #[test]
    fn test_listing_status_rejects_unknown() {
        let err = ListingStatus::from_str("archived").expect_err("should fail");
        assert_eq!(err.kind, "listing status");
        assert_eq!(err.value, "archived");
    }

    #[test]
    fn test_user_role_roundtrip() {
        assert_eq!(UserRole::from_str("admin").expect("parse"), UserRole::Admin);
        assert_eq!(UserRole::Admin.as_str(), "admin");
    }

    #[test]
    fn test_serde_uses_snake_case() {
        let json = serde_json::to_string(&ListingStatus::Active).expect("serialize");
        assert_eq!(json, "\"active\"");
    }
}
