//! Async plumbing for the spectrum chart.
//!
//! Wraps the positions backend in a typed [`ApiClient`] and drives the
//! per-selection evidence retrievals on tokio, reporting each outcome back to
//! the UI thread over a channel.

pub mod api;
pub mod detail_fetch;

pub use api::{find_issue, ApiClient, ApiError, ApiResult};
pub use detail_fetch::{spawn_detail_fetch, DetailOutcome, EvidenceSource};
pub use spectrum_schema::*;
