//! Cookie consent for the browser.
//!
//! Build with `wasm-pack build --target web` and load the module on any page
//! carrying the banner markup. On `DOMContentLoaded` the controller hides the
//! banner, checks the Consent Record, asks the policy endpoint, and wires the
//! accept/reject controls. On other targets this crate is empty.

#[cfg(target_arch = "wasm32")]
pub mod dom;

#[cfg(target_arch = "wasm32")]
mod entry;

#[cfg(target_arch = "wasm32")]
pub use entry::{install, start};
