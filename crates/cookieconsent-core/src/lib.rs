//! Shared types for the cookie consent controller: configuration, errors, policy.

pub mod clock;
pub mod config;
pub mod error;
pub mod types;

pub use clock::{Clock, FixedClock, SystemClock};
pub use config::ConsentConfig;
pub use error::{Error, Result};
pub use types::{ConsentDecision, HidePeriod, RemotePolicy};

/// Script release this controller tracks.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Supertrait for capability objects: thread-safe on native targets, unbounded
/// on wasm32 where browser handles are neither `Send` nor `Sync`.
#[cfg(not(target_arch = "wasm32"))]
pub trait MaybeSendSync: Send + Sync {}
#[cfg(not(target_arch = "wasm32"))]
impl<T: Send + Sync + ?Sized> MaybeSendSync for T {}

#[cfg(target_arch = "wasm32")]
pub trait MaybeSendSync {}
#[cfg(target_arch = "wasm32")]
impl<T: ?Sized> MaybeSendSync for T {}
