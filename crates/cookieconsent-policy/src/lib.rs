//! Remote policy retrieval.
//!
//! One `GET <endpoint>?hostname=<host>` per page load. No caching, no retry,
//! no timeout: callers decide what a failure means.

pub mod client;

pub use client::{HttpPolicySource, PolicySource, StaticPolicySource};
