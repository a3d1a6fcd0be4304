//! Cookie handling for the consent controller.
//!
//! Reads the Consent Record out of the document cookie string, writes it back
//! with a policy-derived expiry, and clears every other script-visible cookie
//! when the visitor rejects. Browser access goes through the traits in
//! [`jar`]; [`MemoryCookieJar`] is an in-process implementation.

pub mod header;
pub mod jar;
pub mod purge;
pub mod record;

pub use header::{find_cookie, parse_cookie_header, should_show_popup, CookiePair};
pub use jar::{CookieReader, CookieStoreApi, CookieWriter, MemoryCookieJar, StoredCookie};
pub use purge::{CookiePurger, PurgeReport, PurgeStrategy};
pub use record::{ConsentRecorder, CookieAssignment, SameSite};
