//! Page capabilities the controller depends on.

use std::sync::Arc;

use cookieconsent_core::{Clock, MaybeSendSync, Result};
use cookieconsent_cookies::{CookieReader, CookieStoreApi, CookieWriter};
use cookieconsent_policy::PolicySource;
use serde::Serialize;

/// Adds a stylesheet to the document's adopted set.
pub trait StylesheetInjector: MaybeSendSync {
    fn adopt(&self, css: &str) -> Result<()>;
}

/// A `<script>` element to append to `<head>`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScriptTag {
    pub src: String,
    #[serde(rename = "async")]
    pub async_load: bool,
}

/// Callback run once the injected script has loaded.
#[cfg(not(target_arch = "wasm32"))]
pub type OnLoad = Box<dyn FnOnce() + Send + 'static>;
#[cfg(target_arch = "wasm32")]
pub type OnLoad = Box<dyn FnOnce() + 'static>;

/// Injects remote scripts. Load failures are never reported back.
pub trait ScriptLoader: MaybeSendSync {
    fn inject(&self, tag: ScriptTag, on_load: OnLoad) -> Result<()>;
}

/// The banner container and its two controls, looked up by element id.
pub trait BannerDom: MaybeSendSync {
    fn has_element(&self, id: &str) -> bool;

    /// Make the element visible and raise it to `z_index`.
    fn show_banner(&self, id: &str, z_index: u32) -> Result<()>;

    fn hide_banner(&self, id: &str) -> Result<()>;
}

/// Everything the controller touches outside itself.
#[derive(Clone)]
pub struct Capabilities {
    pub cookie_reader: Arc<dyn CookieReader>,
    pub cookie_writer: Arc<dyn CookieWriter>,
    /// `None` when the async cookie store is not exposed by the browser.
    pub cookie_store: Option<Arc<dyn CookieStoreApi>>,
    pub stylesheets: Arc<dyn StylesheetInjector>,
    pub scripts: Arc<dyn ScriptLoader>,
    pub dom: Arc<dyn BannerDom>,
    pub policy: Arc<dyn PolicySource>,
    pub clock: Arc<dyn Clock>,
}
