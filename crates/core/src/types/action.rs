//! Audit log action kinds.

use serde::{Deserialize, Serialize};

/// The kind of mutation recorded by an audit log entry.
///
/// Stored as the uppercase strings the SPA already understands
/// (`CREATE`, `UPDATE`, `ENRICH`, ...), so the wire format is part of the
/// contract and must not change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuditAction {
    Create,
    Update,
    Delete,
    Enrich,
    CreateListing,
    UpdateListing,
    DeleteListing,
    BatchCreateListing,
}

impl AuditAction {
    /// The canonical string stored in the `action` column.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Create => "CREATE",
            Self::Update => "UPDATE",
            Self::Delete => "DELETE",
            Self::Enrich => "ENRICH",
            Self::CreateListing => "CREATE_LISTING",
            Self::UpdateListing => "UPDATE_LISTING",
            Self::DeleteListing => "DELETE_LISTING",
            Self::BatchCreateListing => "BATCH_CREATE_LISTING",
        }
    }
}

impl std::fmt::Display for AuditAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_format_is_screaming_snake_case() {
        assert_eq!(AuditAction::Create.as_str(), "CREATE");
        assert_eq!(AuditAction::BatchCreateListing.as_str(), "BATCH_CREATE_LISTING");

        let json = serde_json::to_string(&AuditAction::CreateListing).expect("serialize");
        assert_eq!(json, "\"CREATE_LISTING\"");
    }

    #[test]
    fn test_serde_matches_as_str() {
        for action in [
            AuditAction::Create,
            AuditAction::Update,
            AuditAction::Delete,
            AuditAction::Enrich,
            AuditAction::CreateListing,
            AuditAction::UpdateListing,
            AuditAction::DeleteListing,
            AuditAction::BatchCreateListing,
        ] {
            let json = serde_json::to_string(&action).expect("serialize");
            assert_eq!(json, format!("\"{}\"", action.as_str()));
        }
    }
}
