//! Audit trail model.

use serde_json::Value;

use partshed_core::{AuditAction, UserId};

/// An audit entry about to be written. The insert happens inside the same
/// transaction as the mutation it describes, so the two commit or roll back
/// together.
#[derive(Debug, Clone)]
pub struct NewAuditEntry {
    pub user_id: UserId,
    pub action: AuditAction,
    pub table_name: &'static str,
    pub record_id: i32,
    /// CREATE/DELETE carry a full row snapshot; UPDATE carries only the
    /// changed fields as `{field: {old, new}}`.
    pub changes: Value,
}
