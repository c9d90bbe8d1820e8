//! REST API client module for the Podio platform.
//!
//! This module provides the `PodioClient` for fetching the member roster and
//! per-item revision history from api.podio.com, authenticated via an OAuth2
//! password-grant bearer token.
//!
//! The `MemberSource` trait is the narrow capability surface the pipeline
//! depends on, so detection and aggregation are testable without network
//! access.

pub mod client;
pub mod error;

pub use client::{MemberSource, PodioClient};
pub use error::ApiError;
