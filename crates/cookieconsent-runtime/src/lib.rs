//! Consent controller runtime.
//!
//! Hides the banner before anything else runs, decides from the Consent
//! Record whether to prompt, consults the remote policy, and carries out the
//! visitor's accept/reject choice. Every browser facility is reached through
//! a capability trait so the whole flow runs against in-memory fakes.

pub mod analytics;
pub mod capabilities;
pub mod controller;
pub mod suppress;
pub mod types;

pub use analytics::{AnalyticsBootstrap, DataLayer, GtagEvent};
pub use capabilities::{BannerDom, Capabilities, OnLoad, ScriptLoader, ScriptTag, StylesheetInjector};
pub use controller::ConsentController;
pub use suppress::BannerSuppressor;
pub use types::{ControllerState, Outcome};
