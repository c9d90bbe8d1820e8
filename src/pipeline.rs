//! The fetch -> detect -> aggregate -> emit pipeline.
//!
//! Strictly sequential: one member at a time, no shared mutable state, no
//! spawned tasks. Raw payloads flow through the cache store verbatim; typed
//! extraction happens on the way out.

use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use tracing::{debug, info};

use crate::api::MemberSource;
use crate::cache::{get_or_fetch, CacheStore};
use crate::detect::{departure_date, is_departed};
use crate::models::{extract_members, status_revisions, FieldIds, Member, RawItem, RawRevision};
use crate::report::{render_plot, write_csv};
use crate::stats::{monthly_active, summary};

/// Cache key for the full member list
const MEMBERS_CACHE_KEY: &str = "members";

fn revisions_cache_key(item_id: i64) -> String {
    format!("revisions_{}", item_id)
}

/// Load the roster (through the cache) and resolve departure dates.
///
/// Revision history is only fetched for members whose current status is the
/// departed sentinel - revisions of an active member cannot produce a
/// departure date under the first-match rule.
pub async fn collect_members<A, S>(api: &A, store: &S) -> Result<Vec<Member>>
where
    A: MemberSource,
    S: CacheStore,
{
    let raw = get_or_fetch(store, MEMBERS_CACHE_KEY, || api.fetch_members()).await?;
    let items: Vec<RawItem> =
        serde_json::from_value(raw).context("Failed to parse member list payload")?;
    info!(count = items.len(), "Loaded member items");

    let field_ids = FieldIds::discover(&items);
    let mut members = extract_members(&items, &field_ids)?;

    let mut distribution: HashMap<&str, usize> = HashMap::new();
    for member in &members {
        if let Some(status) = &member.status {
            *distribution.entry(status.as_str()).or_default() += 1;
        }
    }
    debug!(?distribution, "Status distribution");

    for member in members.iter_mut() {
        let currently_departed = member.status.as_deref().map(is_departed).unwrap_or(false);
        if !currently_departed {
            continue;
        }

        let item_id = member.item_id;
        let raw = get_or_fetch(store, &revisions_cache_key(item_id), || {
            api.fetch_revisions(item_id)
        })
        .await?;
        let revisions: Vec<RawRevision> = serde_json::from_value(raw)
            .with_context(|| format!("Member {}: failed to parse revision payload", item_id))?;
        let snapshots = status_revisions(&revisions, field_ids.status)
            .with_context(|| format!("Member {}", item_id))?;

        member.leave_date = departure_date(&snapshots);
        debug!(
            item_id,
            leave_date = ?member.leave_date,
            revisions = revisions.len(),
            "Resolved departure"
        );
    }

    Ok(members)
}

/// Run the whole pipeline: fetch, detect, aggregate, emit.
pub async fn run<A, S>(
    api: &A,
    store: &S,
    today: NaiveDate,
    csv_path: &Path,
    plot_path: &Path,
) -> Result<()>
where
    A: MemberSource,
    S: CacheStore,
{
    let members = collect_members(api, store).await?;
    let departed = members.iter().filter(|m| m.leave_date.is_some()).count();
    info!(members = members.len(), departed, "Resolved roster");

    let buckets = monthly_active(&members, today);
    write_csv(csv_path, &buckets)?;
    render_plot(plot_path, &buckets)?;
    info!(
        csv = %csv_path.display(),
        plot = %plot_path.display(),
        months = buckets.len(),
        "Reports written"
    );

    if let Some(s) = summary(&buckets) {
        info!(
            current = s.current,
            peak = s.peak.active,
            peak_month = %s.peak.month,
            average = format!("{:.1}", s.average),
            "Membership summary"
        );
    }

    Ok(())
}

// ============================================================================
// Tests
// ============================================================================
