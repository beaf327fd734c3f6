//! HTTP client for the external language-model completion service.
//!
//! The service is treated as unreliable prose, never as a typed API: this
//! crate only delivers the raw completion string. All structure recovery
//! happens in the engine's extractor.

mod client;
mod error;

pub use client::CompletionClient;
pub use error::LlmError;
