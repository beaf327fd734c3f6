//! HTTP client for the external web-search service.
//!
//! The engine treats search as an unreliable collaborator: a missing API
//! key degrades to an empty result set with a note, transient failures are
//! retried with back-off, and quota errors stop immediately.

mod client;
mod error;
mod retry;
mod usage;

pub use client::{SearchClient, SearchOutcome};
pub use error::SearchError;
pub use usage::{UsageSnapshot, UsageTracker};
