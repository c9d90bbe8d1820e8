//! Utility functions shared across modules.

pub mod dates;

pub use dates::parse_timestamp;
