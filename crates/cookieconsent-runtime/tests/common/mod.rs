//! In-memory page used by the controller flow tests.

#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use cookieconsent_core::{ConsentConfig, Error, FixedClock, RemotePolicy, Result};
use cookieconsent_cookies::{CookieStoreApi, MemoryCookieJar};
use cookieconsent_policy::PolicySource;
use cookieconsent_runtime::{
    BannerDom, Capabilities, ConsentController, DataLayer, OnLoad, ScriptLoader, ScriptTag,
    StylesheetInjector,
};
use parking_lot::Mutex;

pub fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 10, 17, 10, 0, 0).unwrap()
}

/// DOM stand-in: elements by id, inline styles, adopted sheets, scripts.
#[derive(Default)]
pub struct FakePage {
    elements: Mutex<HashSet<String>>,
    inline_display: Mutex<HashMap<String, String>>,
    z_index: Mutex<HashMap<String, u32>>,
    stylesheets: Mutex<Vec<String>>,
    scripts: Mutex<Vec<ScriptTag>>,
    pending_loads: Mutex<Vec<OnLoad>>,
    refuse_stylesheets: Mutex<bool>,
}

impl FakePage {
    pub fn with_elements(ids: &[&str]) -> Self {
        let page = Self::default();
        page.elements
            .lock()
            .extend(ids.iter().map(|id| id.to_string()));
        page
    }

    pub fn refuse_stylesheets(&self) {
        *self.refuse_stylesheets.lock() = true;
    }

    /// Inline style wins; otherwise an adopted rule naming the id hides it.
    pub fn effective_display(&self, id: &str) -> String {
        if let Some(display) = self.inline_display.lock().get(id) {
            return display.clone();
        }
        let selector = format!("#{}", id);
        if self.stylesheets.lock().iter().any(|css| css.contains(&selector)) {
            "none".into()
        } else {
            "block".into()
        }
    }

    pub fn z_index(&self, id: &str) -> Option<u32> {
        self.z_index.lock().get(id).copied()
    }

    pub fn stylesheets(&self) -> Vec<String> {
        self.stylesheets.lock().clone()
    }

    pub fn scripts(&self) -> Vec<ScriptTag> {
        self.scripts.lock().clone()
    }

    /// Fire `onload` for every injected script.
    pub fn finish_script_loads(&self) {
        let pending: Vec<OnLoad> = self.pending_loads.lock().drain(..).collect();
        for on_load in pending {
            on_load();
        }
    }
}

impl StylesheetInjector for FakePage {
    fn adopt(&self, css: &str) -> Result<()> {
        if *self.refuse_stylesheets.lock() {
            return Err(Error::Stylesheet("adoptedStyleSheets is frozen".into()));
        }
        self.stylesheets.lock().push(css.to_string());
        Ok(())
    }
}

impl ScriptLoader for FakePage {
    fn inject(&self, tag: ScriptTag, on_load: OnLoad) -> Result<()> {
        self.scripts.lock().push(tag);
        self.pending_loads.lock().push(on_load);
        Ok(())
    }
}

impl BannerDom for FakePage {
    fn has_element(&self, id: &str) -> bool {
        self.elements.lock().contains(id)
    }

    fn show_banner(&self, id: &str, z_index: u32) -> Result<()> {
        if !self.has_element(id) {
            return Err(Error::MissingElement(id.into()));
        }
        self.inline_display.lock().insert(id.into(), "block".into());
        self.z_index.lock().insert(id.into(), z_index);
        Ok(())
    }

    fn hide_banner(&self, id: &str) -> Result<()> {
        if !self.has_element(id) {
            return Err(Error::MissingElement(id.into()));
        }
        self.inline_display.lock().insert(id.into(), "none".into());
        Ok(())
    }
}

/// Policy source that records what the banner looked like when it was asked.
pub struct ObservedPolicy {
    page: Arc<FakePage>,
    banner_id: String,
    answer: std::result::Result<RemotePolicy, String>,
    display_at_fetch: Mutex<Vec<String>>,
    hostnames: Mutex<Vec<String>>,
}

impl ObservedPolicy {
    pub fn display_at_fetch(&self) -> Vec<String> {
        self.display_at_fetch.lock().clone()
    }

    pub fn hostnames(&self) -> Vec<String> {
        self.hostnames.lock().clone()
    }
}

#[async_trait]
impl PolicySource for ObservedPolicy {
    async fn fetch(&self, hostname: &str) -> Result<RemotePolicy> {
        self.display_at_fetch
            .lock()
            .push(self.page.effective_display(&self.banner_id));
        self.hostnames.lock().push(hostname.to_string());
        self.answer.clone().map_err(Error::Network)
    }
}

pub fn enabled(period: &str) -> std::result::Result<RemotePolicy, String> {
    Ok(serde_json::from_value(serde_json::json!({
        "cookiePopupEnabled": true,
        "cookiePopupHidePeriod": period,
    }))
    .unwrap())
}

pub fn disabled() -> std::result::Result<RemotePolicy, String> {
    Ok(serde_json::from_value(serde_json::json!({ "cookiePopupEnabled": false })).unwrap())
}

pub fn unreachable() -> std::result::Result<RemotePolicy, String> {
    Err("TypeError: Failed to fetch".into())
}

pub const HOST: &str = "shop.example.com";

pub struct Harness {
    pub config: ConsentConfig,
    pub jar: Arc<MemoryCookieJar>,
    pub page: Arc<FakePage>,
    pub policy: Arc<ObservedPolicy>,
    pub data_layer: Arc<DataLayer>,
    pub controller: ConsentController,
}

pub struct HarnessBuilder {
    cookies: Vec<(String, String)>,
    elements: Vec<String>,
    answer: std::result::Result<RemotePolicy, String>,
    with_store: bool,
    data_layer: Option<Arc<DataLayer>>,
}

impl HarnessBuilder {
    pub fn new(answer: std::result::Result<RemotePolicy, String>) -> Self {
        let config = ConsentConfig::default();
        Self {
            cookies: Vec::new(),
            elements: vec![config.banner_id, config.accept_id, config.reject_id],
            answer,
            with_store: false,
            data_layer: None,
        }
    }

    pub fn cookie(mut self, name: &str, value: &str) -> Self {
        self.cookies.push((name.into(), value.into()));
        self
    }

    pub fn without_element(mut self, id: &str) -> Self {
        self.elements.retain(|e| e != id);
        self
    }

    pub fn with_cookie_store(mut self) -> Self {
        self.with_store = true;
        self
    }

    pub fn data_layer(mut self, layer: Arc<DataLayer>) -> Self {
        self.data_layer = Some(layer);
        self
    }

    pub fn build(self) -> Harness {
        let config = ConsentConfig::default();
        let clock = Arc::new(FixedClock(now()));
        let jar = Arc::new(MemoryCookieJar::new(clock.clone()));
        for (name, value) in &self.cookies {
            jar.set(name, value);
        }
        let ids: Vec<&str> = self.elements.iter().map(String::as_str).collect();
        let page = Arc::new(FakePage::with_elements(&ids));
        let policy = Arc::new(ObservedPolicy {
            page: page.clone(),
            banner_id: config.banner_id.clone(),
            answer: self.answer,
            display_at_fetch: Mutex::new(Vec::new()),
            hostnames: Mutex::new(Vec::new()),
        });
        let data_layer = self
            .data_layer
            .unwrap_or_else(|| Arc::new(DataLayer::new()));

        let cookie_store: Option<Arc<dyn CookieStoreApi>> = if self.with_store {
            Some(jar.clone() as Arc<dyn CookieStoreApi>)
        } else {
            None
        };
        let caps = Capabilities {
            cookie_reader: jar.clone(),
            cookie_writer: jar.clone(),
            cookie_store,
            stylesheets: page.clone(),
            scripts: page.clone(),
            dom: page.clone(),
            policy: policy.clone(),
            clock,
        };
        let controller =
            ConsentController::with_data_layer(config.clone(), HOST, caps, data_layer.clone());

        Harness {
            config,
            jar,
            page,
            policy,
            data_layer,
            controller,
        }
    }
}

impl Harness {
    pub fn banner_display(&self) -> String {
        self.page.effective_display(&self.config.banner_id)
    }
}
