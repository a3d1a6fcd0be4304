//! Controller states and outcomes.

use cookieconsent_core::HidePeriod;
use serde::Serialize;

/// Where the consent flow currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "camelCase")]
pub enum ControllerState {
    Init,
    /// Banner stylesheet adopted; nothing decided yet.
    Suppressed,
    /// Returning visitor whose record is not an acceptance.
    SkipAnalyticsLoad,
    /// Returning visitor who accepted.
    LoadAnalytics,
    FetchPolicy,
    /// Policy turned the banner off for this hostname.
    Disabled,
    ShowBanner {
        #[serde(rename = "hidePeriod")]
        hide_period: HidePeriod,
    },
    /// The page has no banner container.
    NoBanner,
    Accepted,
    Rejected,
    /// An unexpected failure stopped the flow before the banner was shown.
    Halted,
}

impl ControllerState {
    pub fn is_terminal(&self) -> bool {
        !matches!(
            self,
            Self::Init | Self::Suppressed | Self::FetchPolicy | Self::ShowBanner { .. }
        )
    }
}

/// Result of running the flow up to the point of waiting for the visitor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "camelCase")]
pub enum Outcome {
    AnalyticsLoaded,
    AnalyticsSkipped,
    Disabled,
    BannerShown {
        #[serde(rename = "hidePeriod")]
        hide_period: HidePeriod,
        /// Accept control found; its clicks should reach `accept`.
        #[serde(rename = "acceptWired")]
        accept_wired: bool,
        #[serde(rename = "rejectWired")]
        reject_wired: bool,
    },
    NoBanner,
    Halted,
}
