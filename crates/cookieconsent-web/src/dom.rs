//! web-sys implementations of the controller's capabilities.

use async_trait::async_trait;
use cookieconsent_core::{Error, Result};
use cookieconsent_cookies::{
    CookieAssignment, CookieReader, CookieStoreApi, CookieWriter, StoredCookie,
};
use cookieconsent_runtime::{BannerDom, OnLoad, ScriptLoader, ScriptTag, StylesheetInjector};
use js_sys::{Array, Function, Object, Promise, Reflect};
use tracing::debug;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::{Document, HtmlDocument, HtmlElement, HtmlScriptElement, Window};

fn js_err(e: JsValue) -> String {
    e.as_string().unwrap_or_else(|| format!("{:?}", e))
}

fn get(target: &JsValue, key: &str) -> std::result::Result<JsValue, JsValue> {
    Reflect::get(target, &JsValue::from_str(key))
}

// ---------------------------------------------------------------
// document.cookie
// ---------------------------------------------------------------

/// Reads and writes `document.cookie`.
pub struct DocumentCookies {
    document: HtmlDocument,
}

impl DocumentCookies {
    pub fn new(document: &Document) -> Result<Self> {
        let document = document
            .clone()
            .dyn_into::<HtmlDocument>()
            .map_err(|_| Error::Internal("document is not an HTML document".into()))?;
        Ok(Self { document })
    }
}

impl CookieReader for DocumentCookies {
    fn cookie_header(&self) -> String {
        self.document.cookie().unwrap_or_default()
    }
}

impl CookieWriter for DocumentCookies {
    fn write_cookie(&self, assignment: &CookieAssignment) {
        if let Err(e) = self.document.set_cookie(&assignment.to_string()) {
            tracing::warn!("Cookie write for {} rejected: {}", assignment.name, js_err(e));
        }
    }
}

// ---------------------------------------------------------------
// window.cookieStore
// ---------------------------------------------------------------

/// The async Cookie Store API, when the browser exposes it.
pub struct BrowserCookieStore {
    store: JsValue,
}

impl BrowserCookieStore {
    pub fn detect(window: &Window) -> Option<Self> {
        let store = get(window, "cookieStore").ok()?;
        if store.is_undefined() || store.is_null() {
            return None;
        }
        Some(Self { store })
    }

    async fn call(&self, method: &str, args: &[JsValue]) -> Result<JsValue> {
        let f: Function = get(&self.store, method)
            .and_then(|f| f.dyn_into::<Function>().map_err(JsValue::from))
            .map_err(|e| Error::CookieStore(js_err(e)))?;
        let result = match args {
            [] => f.call0(&self.store),
            [a] => f.call1(&self.store, a),
            _ => return Err(Error::Internal(format!("cookieStore.{} arity", method))),
        }
        .map_err(|e| Error::CookieStore(js_err(e)))?;
        let promise: Promise = result
            .dyn_into()
            .map_err(|_| Error::CookieStore(format!("cookieStore.{} returned no promise", method)))?;
        JsFuture::from(promise)
            .await
            .map_err(|e| Error::CookieStore(js_err(e)))
    }
}

#[async_trait(?Send)]
impl CookieStoreApi for BrowserCookieStore {
    async fn get_all(&self) -> Result<Vec<StoredCookie>> {
        let list: Array = self
            .call("getAll", &[])
            .await?
            .dyn_into()
            .map_err(|_| Error::CookieStore("getAll did not return a list".into()))?;

        Ok(list
            .iter()
            .filter_map(|item| {
                let name = get(&item, "name").ok()?.as_string()?;
                Some(StoredCookie {
                    name,
                    domain: get(&item, "domain").ok().and_then(|v| v.as_string()),
                    path: get(&item, "path").ok().and_then(|v| v.as_string()),
                })
            })
            .collect())
    }

    async fn delete(&self, cookie: &StoredCookie) -> Result<()> {
        let options = Object::new();
        let set = |key: &str, value: &str| {
            Reflect::set(&options, &JsValue::from_str(key), &JsValue::from_str(value))
                .map_err(|e| Error::CookieStore(js_err(e)))
        };
        set("name", &cookie.name)?;
        if let Some(domain) = &cookie.domain {
            set("domain", domain)?;
        }
        if let Some(path) = &cookie.path {
            set("path", path)?;
        }
        self.call("delete", &[options.into()]).await?;
        Ok(())
    }
}

// ---------------------------------------------------------------
// Stylesheets, scripts, banner
// ---------------------------------------------------------------

/// Appends constructed stylesheets to `document.adoptedStyleSheets`, or a
/// `<style>` element where constructable stylesheets are unsupported.
pub struct AdoptedStylesheets {
    window: Window,
    document: Document,
}

impl AdoptedStylesheets {
    pub fn new(window: &Window, document: &Document) -> Self {
        Self {
            window: window.clone(),
            document: document.clone(),
        }
    }

    fn adopt_constructed(&self, css: &str) -> std::result::Result<bool, JsValue> {
        let ctor = get(&self.window, "CSSStyleSheet")?;
        let adopted = get(&self.document, "adoptedStyleSheets")?;
        let (Ok(ctor), Ok(adopted)) = (ctor.dyn_into::<Function>(), adopted.dyn_into::<Array>())
        else {
            return Ok(false);
        };

        let sheet = Reflect::construct(&ctor, &Array::new())?;
        let replace_sync: Function = get(&sheet, "replaceSync")?.dyn_into()?;
        replace_sync.call1(&sheet, &JsValue::from_str(css))?;

        let next = Array::from(&adopted);
        next.push(&sheet);
        Reflect::set(&self.document, &JsValue::from_str("adoptedStyleSheets"), &next)?;
        Ok(true)
    }

    fn append_style_element(&self, css: &str) -> std::result::Result<(), JsValue> {
        let style = self.document.create_element("style")?;
        style.set_text_content(Some(css));
        let head = self
            .document
            .head()
            .ok_or_else(|| JsValue::from_str("document has no <head>"))?;
        head.append_child(&style)?;
        Ok(())
    }
}

impl StylesheetInjector for AdoptedStylesheets {
    fn adopt(&self, css: &str) -> Result<()> {
        match self.adopt_constructed(css) {
            Ok(true) => Ok(()),
            Ok(false) => {
                debug!("Constructable stylesheets unavailable; using <style>");
                self.append_style_element(css)
                    .map_err(|e| Error::Stylesheet(js_err(e)))
            }
            Err(e) => Err(Error::Stylesheet(js_err(e))),
        }
    }
}

/// Appends `<script>` tags to `<head>`.
pub struct HeadScriptLoader {
    document: Document,
}

impl HeadScriptLoader {
    pub fn new(document: &Document) -> Self {
        Self {
            document: document.clone(),
        }
    }
}

impl ScriptLoader for HeadScriptLoader {
    fn inject(&self, tag: ScriptTag, on_load: OnLoad) -> Result<()> {
        let script: HtmlScriptElement = self
            .document
            .create_element("script")
            .and_then(|e| e.dyn_into::<HtmlScriptElement>().map_err(JsValue::from))
            .map_err(|e| Error::Script(js_err(e)))?;
        script.set_src(&tag.src);
        script.set_async(tag.async_load);

        let callback = Closure::once_into_js(move || on_load());
        script
            .add_event_listener_with_callback("load", callback.unchecked_ref())
            .map_err(|e| Error::Script(js_err(e)))?;

        let head = self
            .document
            .head()
            .ok_or_else(|| Error::Script("document has no <head>".into()))?;
        head.append_child(&script)
            .map_err(|e| Error::Script(js_err(e)))?;
        Ok(())
    }
}

/// Shows and hides the banner container through its inline style.
pub struct ElementBanner {
    document: Document,
}

impl ElementBanner {
    pub fn new(document: &Document) -> Self {
        Self {
            document: document.clone(),
        }
    }

    pub fn element(&self, id: &str) -> Option<HtmlElement> {
        self.document
            .get_element_by_id(id)
            .and_then(|e| e.dyn_into::<HtmlElement>().ok())
    }

    fn style(&self, id: &str, properties: &[(&str, String)]) -> Result<()> {
        let element = self
            .element(id)
            .ok_or_else(|| Error::MissingElement(id.to_string()))?;
        let style = element.style();
        for (name, value) in properties {
            style
                .set_property(name, value)
                .map_err(|e| Error::Internal(js_err(e)))?;
        }
        Ok(())
    }
}

impl BannerDom for ElementBanner {
    fn has_element(&self, id: &str) -> bool {
        self.document.get_element_by_id(id).is_some()
    }

    fn show_banner(&self, id: &str, z_index: u32) -> Result<()> {
        self.style(
            id,
            &[("display", "block".into()), ("z-index", z_index.to_string())],
        )
    }

    fn hide_banner(&self, id: &str) -> Result<()> {
        self.style(id, &[("display", "none".into())])
    }
}
