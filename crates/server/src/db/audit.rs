//! Database operations for the append-only audit log.
//!
//! Audit rows are only ever inserted, and always inside the transaction of
//! the mutation they describe.

use serde::Serialize;
use serde_json::{Map, Value, json};
use sqlx::PgConnection;

use super::RepositoryError;
use crate::models::NewAuditEntry;

/// Recorder for audit log entries.
pub struct AuditRepository;

impl AuditRepository {
    /// Insert one audit entry on the caller's transaction connection.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn record(
        conn: &mut PgConnection,
        entry: &NewAuditEntry,
    ) -> Result<(), RepositoryError> {
        sqlx::query(
            r"
            INSERT INTO audit_log (user_id, action, table_name, record_id, changes)
            VALUES ($1, $2, $3, $4, $5)
            ",
        )
        .bind(entry.user_id.as_i32())
        .bind(entry.action.as_str())
        .bind(entry.table_name)
        .bind(entry.record_id)
        .bind(&entry.changes)
        .execute(conn)
        .await?;

        Ok(())
    }
}

/// Accumulates `{field: {old, new}}` pairs for an UPDATE audit entry,
/// dropping fields whose value did not actually change.
#[derive(Debug, Default)]
pub struct ChangeSet {
    changes: Map<String, Value>,
}

impl ChangeSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a field if its old and new values differ.
    pub fn record<T: Serialize + PartialEq>(&mut self, field: &str, old: &T, new: &T) {
        if old != new {
            self.changes
                .insert(field.to_owned(), json!({ "old": old, "new": new }));
        }
    }

    /// True when no field changed; such an update writes no audit entry.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    #[must_use]
    pub fn into_value(self) -> Value {
        Value::Object(self.changes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    #[test]
    fn test_changeset_drops_equal_values() {
        let mut changes = ChangeSet::new();
        changes.record("name", &"Brake Rotor", &"Brake Rotor");
        assert!(changes.is_empty());
    }

    #[test]
    fn test_changeset_records_only_changed_fields() {
        let mut changes = ChangeSet::new();
        changes.record("name", &"Brake Rotor", &"Brake Rotor");
        changes.record(
            "price",
            &Some(Decimal::new(8999, 2)),
            &Some(Decimal::new(9999, 2)),
        );
        assert!(!changes.is_empty());

        let value = changes.into_value();
        assert_eq!(
            value,
            json!({ "price": { "old": "89.99", "new": "99.99" } })
        );
    }

    #[test]
    fn test_changeset_records_none_to_some() {
        let mut changes = ChangeSet::new();
        changes.record("color", &None::<String>, &Some("red".to_owned()));
        assert_eq!(
            changes.into_value(),
            json!({ "color": { "old": null, "new": "red" } })
        );
    }
}
