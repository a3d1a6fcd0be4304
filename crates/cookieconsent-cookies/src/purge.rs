//! Cookie purge on rejection.
//!
//! Structured deletion through the async cookie store is tried first. If the
//! store is missing or fails at any point, every cookie in the header (except
//! the Consent Record) is rewritten empty with a past expiry, once host-only
//! and once for `.<hostname>`. Cookies the server marked `HttpOnly` are out of
//! script reach either way.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use cookieconsent_core::{Error, Result};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::header::parse_cookie_header;
use crate::jar::{CookieReader, CookieStoreApi, CookieWriter};
use crate::record::CookieAssignment;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PurgeStrategy {
    Structured,
    Fallback,
}

/// What a purge did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PurgeReport {
    pub strategy: PurgeStrategy,
    /// Names removed (structured) or rewritten (fallback), in order.
    pub cookies: Vec<String>,
}

/// Clears every script-visible cookie except the Consent Record.
pub struct CookiePurger {
    keep: String,
    hostname: String,
    store: Option<Arc<dyn CookieStoreApi>>,
    reader: Arc<dyn CookieReader>,
    writer: Arc<dyn CookieWriter>,
}

impl CookiePurger {
    pub fn new(
        keep: impl Into<String>,
        hostname: impl Into<String>,
        store: Option<Arc<dyn CookieStoreApi>>,
        reader: Arc<dyn CookieReader>,
        writer: Arc<dyn CookieWriter>,
    ) -> Self {
        Self {
            keep: keep.into(),
            hostname: hostname.into(),
            store,
            reader,
            writer,
        }
    }

    /// Run the purge. Never fails: a structured-deletion error switches to
    /// the fallback.
    pub async fn purge(&self) -> PurgeReport {
        match self.delete_structured().await {
            Ok(cookies) => {
                info!("Purged {} cookies via cookie store", cookies.len());
                PurgeReport {
                    strategy: PurgeStrategy::Structured,
                    cookies,
                }
            }
            Err(e) => {
                warn!("Cookie store purge failed ({}); expiring via document.cookie", e);
                let cookies = self.expire_fallback();
                info!("Expired {} cookies via fallback", cookies.len());
                PurgeReport {
                    strategy: PurgeStrategy::Fallback,
                    cookies,
                }
            }
        }
    }

    /// Enumerate the store and delete entries one at a time, in order.
    pub async fn delete_structured(&self) -> Result<Vec<String>> {
        let store = self.store.as_ref().ok_or(Error::CookieStoreUnavailable)?;
        let mut deleted = Vec::new();
        for cookie in store.get_all().await? {
            if cookie.name.trim() == self.keep {
                continue;
            }
            store.delete(&cookie).await?;
            debug!("Deleted cookie {}", cookie.name);
            deleted.push(cookie.name);
        }
        Ok(deleted)
    }

    /// Rewrite every header cookie but the Consent Record with a past expiry.
    pub fn expire_fallback(&self) -> Vec<String> {
        let header = self.reader.cookie_header();
        let assignments = fallback_assignments(&header, &self.keep, &self.hostname);
        for assignment in &assignments {
            self.writer.write_cookie(assignment);
        }
        let mut names: Vec<String> = assignments.into_iter().map(|a| a.name).collect();
        names.dedup();
        names
    }
}

/// The Unix epoch, used as the already-past expiry.
pub fn already_expired() -> DateTime<Utc> {
    DateTime::<Utc>::default()
}

/// Expiry rewrites for every cookie in `header` except `keep`: a host-only
/// write followed by a `.<hostname>` write for each.
pub fn fallback_assignments(header: &str, keep: &str, hostname: &str) -> Vec<CookieAssignment> {
    let parent_domain = format!(".{}", hostname);
    parse_cookie_header(header)
        .into_iter()
        .filter(|c| c.name != keep)
        .flat_map(|c| {
            let host_only = CookieAssignment::new(c.name, "", already_expired());
            let scoped = host_only.clone().with_domain(parent_domain.clone());
            [host_only, scoped]
        })
        .collect()
}
