//! Report emission - pure presentation of the monthly series.
//!
//! Writes the `(month, active count)` sequence as CSV and renders it as a
//! line chart. No aggregation logic lives here.

pub mod csv;
pub mod plot;

pub use csv::{read_csv, write_csv};
pub use plot::render_plot;
