//! Reporting layer: merges vendor call records with the aggregated IVR
//! paths from the store, computes the call KPIs the dashboard shows, and
//! generates sample data for when the vendor API is unavailable. The
//! front-end that renders charts from this is a separate process; it
//! consumes the merged record set over the receiver's report API.

pub mod labels;
pub mod merge;
pub mod metrics;
pub mod sample;
