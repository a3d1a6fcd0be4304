//! The page-ready consent flow and the two banner actions.

use std::sync::Arc;

use cookieconsent_core::{ConsentConfig, ConsentDecision, HidePeriod, Result, VERSION};
use cookieconsent_cookies::{
    find_cookie, should_show_popup, ConsentRecorder, CookieAssignment, CookiePurger, PurgeReport,
};
use parking_lot::Mutex;
use tracing::{debug, error, info, warn};

use crate::analytics::{AnalyticsBootstrap, DataLayer};
use crate::capabilities::Capabilities;
use crate::suppress::BannerSuppressor;
use crate::types::{ControllerState, Outcome};

/// Hide period used when the policy endpoint gives no usable answer.
pub const FALLBACK_HIDE_PERIOD: HidePeriod = HidePeriod::Forever;

/// Drives one page load's consent flow.
pub struct ConsentController {
    config: ConsentConfig,
    hostname: String,
    caps: Capabilities,
    suppressor: BannerSuppressor,
    recorder: ConsentRecorder,
    purger: CookiePurger,
    analytics: AnalyticsBootstrap,
    state: Mutex<ControllerState>,
}

impl ConsentController {
    /// Create a controller bound to the page-wide data layer.
    pub fn new(config: ConsentConfig, hostname: impl Into<String>, caps: Capabilities) -> Self {
        Self::with_data_layer(config, hostname, caps, DataLayer::global())
    }

    /// Create a controller with an explicit data layer.
    pub fn with_data_layer(
        config: ConsentConfig,
        hostname: impl Into<String>,
        caps: Capabilities,
        data_layer: Arc<DataLayer>,
    ) -> Self {
        let hostname = hostname.into();
        let suppressor = BannerSuppressor::new(caps.stylesheets.clone(), &config.banner_id);
        let recorder = ConsentRecorder::new(
            config.consent_cookie_name.clone(),
            caps.cookie_writer.clone(),
            caps.clock.clone(),
        );
        let purger = CookiePurger::new(
            config.consent_cookie_name.clone(),
            hostname.clone(),
            caps.cookie_store.clone(),
            caps.cookie_reader.clone(),
            caps.cookie_writer.clone(),
        );
        let analytics = AnalyticsBootstrap::new(
            &config,
            caps.scripts.clone(),
            data_layer,
            caps.clock.clone(),
        );

        Self {
            config,
            hostname,
            caps,
            suppressor,
            recorder,
            purger,
            analytics,
            state: Mutex::new(ControllerState::Init),
        }
    }

    pub fn state(&self) -> ControllerState {
        *self.state.lock()
    }

    pub fn config(&self) -> &ConsentConfig {
        &self.config
    }

    pub fn hostname(&self) -> &str {
        &self.hostname
    }

    /// Run the page-ready flow. Failures are logged and end in `Halted`
    /// with the banner left hidden.
    pub async fn run(&self) -> Outcome {
        info!("Cookie consent {} starting on {}", VERSION, self.hostname);
        match self.drive().await {
            Ok(outcome) => outcome,
            Err(e) => {
                error!("Cookie consent halted: {}", e);
                self.transition(ControllerState::Halted);
                Outcome::Halted
            }
        }
    }

    async fn drive(&self) -> Result<Outcome> {
        self.suppressor.hide_by_default()?;
        self.transition(ControllerState::Suppressed);

        let header = self.caps.cookie_reader.cookie_header();
        let cookie_name = &self.config.consent_cookie_name;
        if !should_show_popup(&header, cookie_name) {
            let recorded =
                find_cookie(&header, cookie_name).and_then(|v| ConsentDecision::from_marker(&v));
            if recorded == Some(ConsentDecision::Accepted) {
                self.transition(ControllerState::LoadAnalytics);
                self.analytics.load();
                return Ok(Outcome::AnalyticsLoaded);
            }
            self.transition(ControllerState::SkipAnalyticsLoad);
            return Ok(Outcome::AnalyticsSkipped);
        }

        self.transition(ControllerState::FetchPolicy);
        let hide_period = match self.caps.policy.fetch(&self.hostname).await {
            Ok(policy) if !policy.cookie_popup_enabled => {
                info!("Consent banner disabled for {}", self.hostname);
                self.transition(ControllerState::Disabled);
                return Ok(Outcome::Disabled);
            }
            Ok(policy) => policy.cookie_popup_hide_period,
            Err(e) => {
                warn!(
                    "No policy for {} ({}); using {}",
                    self.hostname, e, FALLBACK_HIDE_PERIOD
                );
                FALLBACK_HIDE_PERIOD
            }
        };

        let dom = &self.caps.dom;
        if !dom.has_element(&self.config.banner_id) {
            warn!("Banner #{} not found; nothing to show", self.config.banner_id);
            self.transition(ControllerState::NoBanner);
            return Ok(Outcome::NoBanner);
        }
        dom.show_banner(&self.config.banner_id, self.config.banner_z_index)?;
        self.transition(ControllerState::ShowBanner { hide_period });

        let accept_wired = dom.has_element(&self.config.accept_id);
        let reject_wired = dom.has_element(&self.config.reject_id);
        if !accept_wired {
            warn!("Accept control #{} not found", self.config.accept_id);
        }
        if !reject_wired {
            warn!("Reject control #{} not found", self.config.reject_id);
        }

        Ok(Outcome::BannerShown {
            hide_period,
            accept_wired,
            reject_wired,
        })
    }

    /// Accept click: hide the banner, record consent, load analytics.
    ///
    /// Returns the written record, or `None` if the banner is not showing.
    pub fn accept(&self) -> Option<CookieAssignment> {
        let hide_period = self.leave_banner(ControllerState::Accepted)?;
        let record = self.recorder.record(ConsentDecision::Accepted, hide_period);
        self.analytics.load();
        Some(record)
    }

    /// Reject click: hide the banner, record the decision, purge cookies.
    ///
    /// Returns the purge report, or `None` if the banner is not showing.
    pub async fn reject(&self) -> Option<PurgeReport> {
        let hide_period = self.leave_banner(ControllerState::Rejected)?;
        self.recorder.record(ConsentDecision::Rejected, hide_period);
        Some(self.purger.purge().await)
    }

    /// Move from `ShowBanner` to `next` and hide the banner. Only the first
    /// caller gets the hide period.
    fn leave_banner(&self, next: ControllerState) -> Option<HidePeriod> {
        let hide_period = {
            let mut state = self.state.lock();
            match *state {
                ControllerState::ShowBanner { hide_period } => {
                    *state = next;
                    hide_period
                }
                current => {
                    debug!("Ignoring banner action in state {:?}", current);
                    return None;
                }
            }
        };
        info!("Consent flow: banner -> {:?}", next);

        if let Err(e) = self.caps.dom.hide_banner(&self.config.banner_id) {
            warn!("Could not hide banner: {}", e);
        }
        Some(hide_period)
    }

    fn transition(&self, next: ControllerState) {
        let mut state = self.state.lock();
        debug!("Consent flow: {:?} -> {:?}", *state, next);
        *state = next;
    }
}
