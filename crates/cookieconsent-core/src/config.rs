//! Controller configuration: endpoint, measurement id, DOM ids, cookie name.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};

pub const DEFAULT_POLICY_ENDPOINT: &str =
    "https://cookie-consent-production.up.railway.app/api/cookie-consent/hostname";
pub const DEFAULT_MEASUREMENT_ID: &str = "G-LTR729EM84";
pub const DEFAULT_ANALYTICS_SCRIPT_BASE: &str = "https://www.googletagmanager.com/gtag/js";
pub const DEFAULT_BANNER_ID: &str = "flowappz-cookie-consent";
pub const DEFAULT_ACCEPT_ID: &str = "flowappz-cookie-consent-approve";
pub const DEFAULT_REJECT_ID: &str = "flowappz-cookie-consent-reject";
pub const DEFAULT_CONSENT_COOKIE: &str = "hidePopup";
pub const DEFAULT_BANNER_Z_INDEX: u32 = 99999;

/// Consent controller configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsentConfig {
    /// Remote policy endpoint; the page hostname is sent as `?hostname=`.
    #[serde(default = "default_policy_endpoint")]
    pub policy_endpoint: String,
    /// Analytics measurement tag id.
    #[serde(default = "default_measurement_id")]
    pub measurement_id: String,
    #[serde(default = "default_analytics_script_base")]
    pub analytics_script_base: String,
    #[serde(default = "default_banner_id")]
    pub banner_id: String,
    #[serde(default = "default_accept_id")]
    pub accept_id: String,
    #[serde(default = "default_reject_id")]
    pub reject_id: String,
    /// Name of the Consent Record cookie.
    #[serde(default = "default_consent_cookie")]
    pub consent_cookie_name: String,
    #[serde(default = "default_banner_z_index")]
    pub banner_z_index: u32,
}

fn default_policy_endpoint() -> String {
    DEFAULT_POLICY_ENDPOINT.into()
}
fn default_measurement_id() -> String {
    DEFAULT_MEASUREMENT_ID.into()
}
fn default_analytics_script_base() -> String {
    DEFAULT_ANALYTICS_SCRIPT_BASE.into()
}
fn default_banner_id() -> String {
    DEFAULT_BANNER_ID.into()
}
fn default_accept_id() -> String {
    DEFAULT_ACCEPT_ID.into()
}
fn default_reject_id() -> String {
    DEFAULT_REJECT_ID.into()
}
fn default_consent_cookie() -> String {
    DEFAULT_CONSENT_COOKIE.into()
}
fn default_banner_z_index() -> u32 {
    DEFAULT_BANNER_Z_INDEX
}

impl Default for ConsentConfig {
    fn default() -> Self {
        Self {
            policy_endpoint: DEFAULT_POLICY_ENDPOINT.into(),
            measurement_id: DEFAULT_MEASUREMENT_ID.into(),
            analytics_script_base: DEFAULT_ANALYTICS_SCRIPT_BASE.into(),
            banner_id: DEFAULT_BANNER_ID.into(),
            accept_id: DEFAULT_ACCEPT_ID.into(),
            reject_id: DEFAULT_REJECT_ID.into(),
            consent_cookie_name: DEFAULT_CONSENT_COOKIE.into(),
            banner_z_index: DEFAULT_BANNER_Z_INDEX,
        }
    }
}

impl ConsentConfig {
    /// Parse a (possibly partial) JSON document; missing keys keep their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| Error::Config(e.to_string()))
    }

    /// Load config from a JSON file, or return defaults.
    pub fn load(config_path: &Path) -> Self {
        match std::fs::read_to_string(config_path) {
            Ok(s) => Self::from_json(&s).unwrap_or_else(|e| {
                debug!("Ignoring {}: {}", config_path.display(), e);
                Self::default()
            }),
            Err(_) => Self::default(),
        }
    }

    /// Source URL of the analytics tag.
    pub fn analytics_script_url(&self) -> String {
        format!("{}?id={}", self.analytics_script_base, self.measurement_id)
    }

    /// Full policy URL for a hostname. Hostnames never need escaping beyond
    /// what the HTTP client does; this form is used for logging.
    pub fn policy_url(&self, hostname: &str) -> String {
        format!("{}?hostname={}", self.policy_endpoint, hostname)
    }
}
