//! Data models for Podio roster entities.
//!
//! This module contains both the raw payload shapes returned by the Podio
//! API (kept loose, the schema is owned by Podio) and the resolved domain
//! types the pipeline works with:
//!
//! - `RawItem`, `RawField`: member items as returned by the app filter endpoint
//! - `RawRevision`: per-item revision history entries
//! - `FieldIds`: app field ids discovered from item labels
//! - `Member`: a roster member with resolved join/leave dates
//! - `StatusRevision`: a chronological status snapshot for one member

pub mod member;
pub mod revision;

pub use member::{extract_members, FieldIds, Member, RawField, RawItem};
pub use revision::{status_revisions, RawRevision, StatusRevision};
