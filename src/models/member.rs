use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use crate::utils::parse_timestamp;

// ============================================================================
// Constants
// ============================================================================

/// Fallback field id for the membership start date ("Beginn Mitgliedschaft").
/// Used when no field label matches; ids are stable per Podio app.
const JOIN_DATE_FIELD_ID: i64 = 229_611_689;

/// Fallback field id for the status category field.
const STATUS_FIELD_ID: i64 = 216_758_721;

/// Fallback field id for the name text field ("Vorname").
const NAME_FIELD_ID: i64 = 206_882_163;

/// Number of leading items inspected when discovering field ids by label.
const FIELD_DISCOVERY_SAMPLE: usize = 5;

// ============================================================================
// Raw API payload types
// ============================================================================

/// A member item as returned by the Podio app filter endpoint.
/// Only the parts the pipeline reads are typed; everything else stays in
/// the cached JSON untouched.
#[derive(Debug, Clone, Deserialize)]
pub struct RawItem {
    pub item_id: i64,
    pub created_on: Option<String>,
    #[serde(default)]
    pub fields: Vec<RawField>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawField {
    pub field_id: i64,
    #[serde(rename = "type")]
    pub field_type: Option<String>,
    pub label: Option<String>,
    #[serde(default)]
    pub values: Vec<Value>,
}

impl RawField {
    fn first_value(&self) -> Option<&Value> {
        self.values.first()
    }
}

/// Extract the display text from a field value entry.
/// Category values nest the text under `value.text`; text fields carry the
/// string directly under `value`; numeric ids are rendered as-is.
pub(crate) fn value_text(entry: &Value) -> Option<String> {
    let value = entry.get("value")?;
    match value {
        Value::Object(obj) => obj.get("text").and_then(Value::as_str).map(str::to_string),
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

// ============================================================================
// Field discovery
// ============================================================================

/// Field ids for the app fields the pipeline reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldIds {
    pub join_date: i64,
    pub status: i64,
    pub name: i64,
}

impl FieldIds {
    /// Discover field ids by label from the first few items, falling back to
    /// the known ids for fields whose labels never match. Labels are matched
    /// case-insensitively so app cosmetic renames don't break extraction.
    pub fn discover(items: &[RawItem]) -> Self {
        let mut join_date = None;
        let mut status = None;
        let mut name = None;

        for item in items.iter().take(FIELD_DISCOVERY_SAMPLE) {
            for field in &item.fields {
                let label = match &field.label {
                    Some(l) => l.to_lowercase(),
                    None => continue,
                };
                if label.contains("beginn") && label.contains("mitgliedschaft") {
                    join_date.get_or_insert(field.field_id);
                } else if label.contains("status") {
                    status.get_or_insert(field.field_id);
                } else if label.contains("vorname") || label.contains("name") {
                    name.get_or_insert(field.field_id);
                }
            }
        }

        let ids = Self {
            join_date: join_date.unwrap_or(JOIN_DATE_FIELD_ID),
            status: status.unwrap_or(STATUS_FIELD_ID),
            name: name.unwrap_or(NAME_FIELD_ID),
        };
        debug!(
            join_date = ids.join_date,
            status = ids.status,
            name = ids.name,
            "Resolved field ids"
        );
        ids
    }
}

// ============================================================================
// Domain type
// ============================================================================

/// A roster member with resolved dates. Read-only after extraction except
/// for `leave_date`, which the detector fills in.
#[derive(Debug, Clone)]
pub struct Member {
    pub item_id: i64,
    pub name: Option<String>,
    pub join_date: DateTime<Utc>,
    pub status: Option<String>,
    pub leave_date: Option<DateTime<Utc>>,
}

/// Extract typed members from raw items.
///
/// The join date comes from the membership-start date field; items without
/// one fall back to the item's `created_on`. An item missing both is a
/// data-shape error and aborts the run rather than silently skewing the
/// monthly counts.
pub fn extract_members(items: &[RawItem], ids: &FieldIds) -> Result<Vec<Member>> {
    let mut members = Vec::with_capacity(items.len());

    for item in items {
        let mut join_raw: Option<String> = None;
        let mut status = None;
        let mut name = None;

        for field in &item.fields {
            if field.field_id == ids.join_date {
                join_raw = field
                    .first_value()
                    .and_then(|v| v.get("start"))
                    .and_then(Value::as_str)
                    .map(str::to_string);
            } else if field.field_id == ids.status {
                status = field.first_value().and_then(value_text);
            } else if field.field_id == ids.name {
                name = field.first_value().and_then(value_text);
            }
        }

        let join_raw = join_raw
            .or_else(|| item.created_on.clone())
            .with_context(|| {
                format!("Member {}: no join date field and no created_on", item.item_id)
            })?;
        let join_date = parse_timestamp(&join_raw)
            .with_context(|| format!("Member {}: invalid join date", item.item_id))?;

        members.push(Member {
            item_id: item.item_id,
            name,
            join_date,
            status,
            leave_date: None,
        });
    }

    Ok(members)
}

// ============================================================================
// Tests
// ============================================================================
