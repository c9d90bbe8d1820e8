use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value;

use super::member::value_text;
use crate::utils::parse_timestamp;

/// A revision history entry as returned by the item revision endpoint.
/// Revisions that did not touch any field carry no `data`.
#[derive(Debug, Clone, Deserialize)]
pub struct RawRevision {
    pub created_on: Option<String>,
    #[serde(default)]
    pub data: Option<RevisionData>,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct RevisionData {
    #[serde(default)]
    pub fields: Vec<RevisionField>,
}

/// A single field delta within a revision: the values before and after.
#[derive(Debug, Clone, Deserialize)]
pub struct RevisionField {
    pub field_id: i64,
    #[serde(default)]
    pub old_values: Vec<Value>,
    #[serde(default)]
    pub values: Vec<Value>,
}

/// A status snapshot at a point in time, derived from a revision that
/// changed the status field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusRevision {
    pub at: DateTime<Utc>,
    pub status: String,
}

/// Extract the status snapshots from a member's raw revision history,
/// sorted chronologically (stable, so same-timestamp entries keep the
/// order the API returned them in).
///
/// Only revisions whose delta includes the status field contribute; the
/// snapshot is the post-revision value. A status-field delta whose new
/// value cannot be read is a data-shape error.
pub fn status_revisions(raw: &[RawRevision], status_field_id: i64) -> Result<Vec<StatusRevision>> {
    let mut snapshots = Vec::new();

    for revision in raw {
        let fields = match &revision.data {
            Some(data) => &data.fields,
            None => continue,
        };
        for field in fields {
            if field.field_id != status_field_id {
                continue;
            }
            // A delta with no new value (field cleared) carries no snapshot.
            let Some(entry) = field.values.first() else {
                continue;
            };
            let status = value_text(entry)
                .context("Status revision has an unreadable new value")?;
            let created_on = revision
                .created_on
                .as_deref()
                .context("Status revision is missing created_on")?;
            let at = parse_timestamp(created_on).context("Status revision timestamp")?;
            snapshots.push(StatusRevision { at, status });
        }
    }

    // The revision endpoint returns newest first; the detector wants
    // chronological order with stable ties.
    snapshots.sort_by_key(|s| s.at);
    Ok(snapshots)
}
