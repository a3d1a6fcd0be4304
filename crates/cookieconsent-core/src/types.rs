//! Hide periods, the remote policy shape, and recorded consent decisions.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// How long a recorded decision suppresses the banner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HidePeriod {
    /// Ten years; also the fallback when no policy could be fetched.
    Forever,
    OneYear,
    SixMonth,
    ThreeMonth,
    /// Any unrecognized period name. Honored for 30 days.
    Other,
}

impl HidePeriod {
    pub fn all() -> &'static [HidePeriod] {
        &[
            Self::Forever,
            Self::OneYear,
            Self::SixMonth,
            Self::ThreeMonth,
            Self::Other,
        ]
    }

    /// Number of days the Consent Record stays alive.
    pub fn days(&self) -> i64 {
        match self {
            Self::Forever => 3650,
            Self::OneYear => 365,
            Self::SixMonth => 182,
            Self::ThreeMonth => 90,
            Self::Other => 30,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Forever => "FOREVER",
            Self::OneYear => "ONE_YEAR",
            Self::SixMonth => "SIX_MONTH",
            Self::ThreeMonth => "THREE_MONTH",
            Self::Other => "OTHER",
        }
    }

    /// Parse a wire name. Never fails: unknown names become `Other`.
    pub fn from_name(name: &str) -> Self {
        match name {
            "FOREVER" => Self::Forever,
            "ONE_YEAR" => Self::OneYear,
            "SIX_MONTH" => Self::SixMonth,
            "THREE_MONTH" => Self::ThreeMonth,
            _ => Self::Other,
        }
    }
}

impl std::fmt::Display for HidePeriod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl Serialize for HidePeriod {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

impl<'de> Deserialize<'de> for HidePeriod {
    /// Accepts any JSON value; anything but a known period name is `Other`.
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Option::<serde_json::Value>::deserialize(deserializer)?;
        Ok(value
            .as_ref()
            .and_then(|v| v.as_str())
            .map(HidePeriod::from_name)
            .unwrap_or(HidePeriod::Other))
    }
}

fn missing_period() -> HidePeriod {
    HidePeriod::Other
}

/// Per-hostname banner policy served by the remote configuration endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemotePolicy {
    #[serde(rename = "cookiePopupEnabled", default)]
    pub cookie_popup_enabled: bool,
    #[serde(rename = "cookiePopupHidePeriod", default = "missing_period")]
    pub cookie_popup_hide_period: HidePeriod,
}

/// The visitor's answer to the banner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConsentDecision {
    Accepted,
    Rejected,
}

impl ConsentDecision {
    /// Marker written for an accepted decision. Earlier releases wrote it for both.
    pub const ACCEPTED_MARKER: &'static str = "true";
    pub const REJECTED_MARKER: &'static str = "true-rejected";

    /// Cookie value recorded for this decision. Both contain `true`, so either
    /// suppresses the banner.
    pub fn marker(&self) -> &'static str {
        match self {
            Self::Accepted => Self::ACCEPTED_MARKER,
            Self::Rejected => Self::REJECTED_MARKER,
        }
    }

    /// Read a recorded marker back. Only the exact accepted marker counts as
    /// acceptance; other values that still suppress the banner are rejections.
    pub fn from_marker(value: &str) -> Option<Self> {
        let value = value.trim();
        if value == Self::ACCEPTED_MARKER {
            Some(Self::Accepted)
        } else if value.contains("true") {
            Some(Self::Rejected)
        } else {
            None
        }
    }
}

impl std::fmt::Display for ConsentDecision {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Accepted => write!(f, "accepted"),
            Self::Rejected => write!(f, "rejected"),
        }
    }
}
