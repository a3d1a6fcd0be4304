//! `Set-Cookie`-style assignments and the Consent Recorder.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use cookieconsent_core::{Clock, ConsentDecision, HidePeriod};
use serde::Serialize;
use tracing::info;

use crate::jar::CookieWriter;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SameSite {
    Lax,
    Strict,
    None,
}

impl std::fmt::Display for SameSite {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Lax => write!(f, "Lax"),
            Self::Strict => write!(f, "Strict"),
            Self::None => write!(f, "None"),
        }
    }
}

/// A single `document.cookie = ...` write.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CookieAssignment {
    pub name: String,
    pub value: String,
    pub path: String,
    pub expires: DateTime<Utc>,
    /// `None` writes a host-only cookie.
    pub domain: Option<String>,
    pub same_site: SameSite,
}

impl CookieAssignment {
    /// A root-path, `SameSite=Lax` assignment.
    pub fn new(name: impl Into<String>, value: impl Into<String>, expires: DateTime<Utc>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            path: "/".into(),
            expires,
            domain: None,
            same_site: SameSite::Lax,
        }
    }

    pub fn with_domain(mut self, domain: impl Into<String>) -> Self {
        self.domain = Some(domain.into());
        self
    }

    /// Expiry in RFC-1123 form, e.g. `Thu, 01 Jan 1970 00:00:00 GMT`.
    pub fn expires_header(&self) -> String {
        self.expires.format("%a, %d %b %Y %H:%M:%S GMT").to_string()
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires <= now
    }
}

impl std::fmt::Display for CookieAssignment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}={}; Path={}; Expires={}",
            self.name,
            self.value,
            self.path,
            self.expires_header()
        )?;
        if let Some(domain) = &self.domain {
            write!(f, "; Domain={}", domain)?;
        }
        write!(f, "; SameSite={}", self.same_site)
    }
}

/// Writes the Consent Record. Touches no other cookie.
pub struct ConsentRecorder {
    cookie_name: String,
    writer: Arc<dyn CookieWriter>,
    clock: Arc<dyn Clock>,
}

impl ConsentRecorder {
    pub fn new(
        cookie_name: impl Into<String>,
        writer: Arc<dyn CookieWriter>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            cookie_name: cookie_name.into(),
            writer,
            clock,
        }
    }

    /// The assignment `record` would write right now.
    pub fn assignment(&self, decision: ConsentDecision, period: HidePeriod) -> CookieAssignment {
        let expires = self.clock.now() + Duration::days(period.days());
        CookieAssignment::new(self.cookie_name.clone(), decision.marker(), expires)
    }

    /// Persist the decision for `period`.
    pub fn record(&self, decision: ConsentDecision, period: HidePeriod) -> CookieAssignment {
        let assignment = self.assignment(decision, period);
        self.writer.write_cookie(&assignment);
        info!(
            "Consent {} recorded until {} ({})",
            decision,
            assignment.expires_header(),
            period
        );
        assignment
    }
}
