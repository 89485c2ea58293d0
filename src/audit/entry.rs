//! Audit entry data structures

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Kind of change recorded in the audit log
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    Create,
    Update,
    /// Hard removal (categories, limits, purged archives)
    Delete,
    /// Soft delete into the archive
    Archive,
    /// Restore from the archive
    Restore,
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Operation::Create => "CREATE",
            Operation::Update => "UPDATE",
            Operation::Delete => "DELETE",
            Operation::Archive => "ARCHIVE",
            Operation::Restore => "RESTORE",
        };
        f.write_str(label)
    }
}

/// Types of records that can be audited
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityType {
    Note,
    Category,
    BudgetEntry,
    BudgetLimit,
    Archive,
    Preference,
}

impl std::fmt::Display for EntityType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            EntityType::Note => "Note",
            EntityType::Category => "Category",
            EntityType::BudgetEntry => "BudgetEntry",
            EntityType::BudgetLimit => "BudgetLimit",
            EntityType::Archive => "Archive",
            EntityType::Preference => "Preference",
        };
        f.write_str(label)
    }
}

/// A single audit log line
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEntry {
    pub timestamp: DateTime<Utc>,
    pub operation: Operation,
    pub entity_type: EntityType,
    pub entity_id: String,

    /// Human-readable name of the record (note title, category title...)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entity_name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub before: Option<Value>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub after: Option<Value>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub diff_summary: Option<String>,
}

impl AuditEntry {
    fn record(
        operation: Operation,
        entity_type: EntityType,
        entity_id: impl Into<String>,
        entity_name: Option<String>,
        before: Option<Value>,
        after: Option<Value>,
    ) -> Self {
        Self {
            timestamp: Utc::now(),
            operation,
            entity_type,
            entity_id: entity_id.into(),
            entity_name,
            before,
            after,
            diff_summary: None,
        }
    }

    pub fn create<T: Serialize>(
        entity_type: EntityType,
        entity_id: impl Into<String>,
        entity_name: Option<String>,
        entity: &T,
    ) -> Self {
        let after = serde_json::to_value(entity).ok();
        Self::record(Operation::Create, entity_type, entity_id, entity_name, None, after)
    }

    /// Update entry; the diff summary is computed from the two states
    pub fn update<T: Serialize>(
        entity_type: EntityType,
        entity_id: impl Into<String>,
        entity_name: Option<String>,
        before: &T,
        after: &T,
    ) -> Self {
        let before = serde_json::to_value(before).ok();
        let after = serde_json::to_value(after).ok();
        let diff_summary = match (&before, &after) {
            (Some(b), Some(a)) => super::summarize_changes(b, a),
            _ => None,
        };
        let mut entry =
            Self::record(Operation::Update, entity_type, entity_id, entity_name, before, after);
        entry.diff_summary = diff_summary;
        entry
    }

    pub fn delete<T: Serialize>(
        entity_type: EntityType,
        entity_id: impl Into<String>,
        entity_name: Option<String>,
        entity: &T,
    ) -> Self {
        let before = serde_json::to_value(entity).ok();
        Self::record(Operation::Delete, entity_type, entity_id, entity_name, before, None)
    }

    /// A record moved into the archive; `before` holds its live state
    pub fn archive<T: Serialize>(
        entity_type: EntityType,
        entity_id: impl Into<String>,
        entity_name: Option<String>,
        entity: &T,
    ) -> Self {
        let before = serde_json::to_value(entity).ok();
        Self::record(Operation::Archive, entity_type, entity_id, entity_name, before, None)
    }

    /// A record brought back from the archive; `after` holds its restored state
    pub fn restore<T: Serialize>(
        entity_type: EntityType,
        entity_id: impl Into<String>,
        entity_name: Option<String>,
        entity: &T,
    ) -> Self {
        let after = serde_json::to_value(entity).ok();
        Self::record(Operation::Restore, entity_type, entity_id, entity_name, None, after)
    }

    /// One-line rendering, with the change summary on a second line when present
    pub fn format_human_readable(&self) -> String {
        let mut output = format!(
            "[{}] {} {} {}",
            self.timestamp.format("%Y-%m-%d %H:%M:%S UTC"),
            self.operation,
            self.entity_type,
            self.entity_id
        );

        if let Some(name) = &self.entity_name {
            output.push_str(&format!(" ({})", name));
        }

        if let Some(diff) = &self.diff_summary {
            output.push_str(&format!("\n  Changes: {}", diff));
        }

        output
    }
}
