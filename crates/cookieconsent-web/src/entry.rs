//! Module start: wire the browser into a controller and run it once the
//! document is parsed.

use std::rc::Rc;
use std::sync::Arc;

use cookieconsent_core::{ConsentConfig, SystemClock};
use cookieconsent_cookies::CookieStoreApi;
use cookieconsent_policy::HttpPolicySource;
use cookieconsent_runtime::{Capabilities, ConsentController, DataLayer, GtagEvent, Outcome};
use js_sys::{Array, Function, Reflect};
use tracing::{debug, info, warn};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::prelude::*;
use web_sys::{Document, Window};

use crate::dom::{
    AdoptedStylesheets, BrowserCookieStore, DocumentCookies, ElementBanner, HeadScriptLoader,
};

/// Page global holding optional JSON-compatible overrides for [`ConsentConfig`].
const CONFIG_GLOBAL: &str = "cookieConsentConfig";

const GTAG_SHIM: &str =
    "window.dataLayer = window.dataLayer || []; window.dataLayer.push(arguments);";

#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    console_error_panic_hook::set_once();
    tracing_wasm::set_as_global_default();

    let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
    let config = page_config(&window);
    install(window, config)
}

/// Run the consent flow on `DOMContentLoaded`, or right away if the document
/// has already been parsed.
pub fn install(window: Window, config: ConsentConfig) -> Result<(), JsValue> {
    let document = window
        .document()
        .ok_or_else(|| JsValue::from_str("no document"))?;
    install_gtag(&window)?;

    if document.ready_state() == "loading" {
        let ready = Closure::once_into_js(move || {
            if let Err(e) = launch(window, config) {
                warn!("Cookie consent failed to start: {:?}", e);
            }
        });
        document.add_event_listener_with_callback("DOMContentLoaded", ready.unchecked_ref())?;
        Ok(())
    } else {
        launch(window, config)
    }
}

fn page_config(window: &Window) -> ConsentConfig {
    let overrides = match Reflect::get(window, &JsValue::from_str(CONFIG_GLOBAL)) {
        Ok(v) if v.is_object() => v,
        _ => return ConsentConfig::default(),
    };
    let json = js_sys::JSON::stringify(&overrides)
        .ok()
        .and_then(|s| s.as_string())
        .unwrap_or_default();
    ConsentConfig::from_json(&json).unwrap_or_else(|e| {
        warn!("Ignoring window.{}: {}", CONFIG_GLOBAL, e);
        ConsentConfig::default()
    })
}

/// Define `window.gtag` if the page has not, and mirror data layer pushes
/// into it.
fn install_gtag(window: &Window) -> Result<(), JsValue> {
    let key = JsValue::from_str("gtag");
    if !Reflect::get(window, &key)?.is_function() {
        Reflect::set(window, &key, &Function::new_no_args(GTAG_SHIM))?;
    }

    DataLayer::global().set_push_hook(Box::new(|event: &GtagEvent| {
        let Some(window) = web_sys::window() else {
            return;
        };
        let gtag = match Reflect::get(&window, &JsValue::from_str("gtag")) {
            Ok(f) => match f.dyn_into::<Function>() {
                Ok(f) => f,
                Err(_) => return,
            },
            Err(_) => return,
        };
        let args = match event {
            GtagEvent::Js(_) => Array::of2(&"js".into(), &js_sys::Date::new_0()),
            GtagEvent::Config(tag) => Array::of2(&"config".into(), &JsValue::from_str(tag)),
        };
        if let Err(e) = gtag.apply(&JsValue::NULL, &args) {
            warn!("gtag call failed: {:?}", e);
        }
    }));
    Ok(())
}

fn capabilities(
    window: &Window,
    document: &Document,
    config: &ConsentConfig,
) -> Result<Capabilities, JsValue> {
    let cookies = DocumentCookies::new(document).map_err(|e| JsValue::from_str(&e.to_string()))?;
    let cookies = Arc::new(cookies);
    let cookie_store =
        BrowserCookieStore::detect(window).map(|s| Arc::new(s) as Arc<dyn CookieStoreApi>);
    if cookie_store.is_none() {
        debug!("cookieStore unavailable; purge will expire cookies through document.cookie");
    }
    let banner = Arc::new(ElementBanner::new(document));

    Ok(Capabilities {
        cookie_reader: cookies.clone(),
        cookie_writer: cookies,
        cookie_store,
        stylesheets: Arc::new(AdoptedStylesheets::new(window, document)),
        scripts: Arc::new(HeadScriptLoader::new(document)),
        dom: banner,
        policy: Arc::new(HttpPolicySource::from_config(config)),
        clock: Arc::new(SystemClock),
    })
}

fn launch(window: Window, config: ConsentConfig) -> Result<(), JsValue> {
    let document = window
        .document()
        .ok_or_else(|| JsValue::from_str("no document"))?;
    let hostname = window.location().hostname()?;
    let caps = capabilities(&window, &document, &config)?;
    let controller = Rc::new(ConsentController::new(config, hostname, caps));

    wasm_bindgen_futures::spawn_local(async move {
        if let Outcome::BannerShown {
            accept_wired,
            reject_wired,
            ..
        } = controller.run().await
        {
            if accept_wired {
                on_click(&document, &controller.config().accept_id, {
                    let controller = controller.clone();
                    move || {
                        controller.accept();
                    }
                });
            }
            if reject_wired {
                on_click(&document, &controller.config().reject_id, {
                    let controller = controller.clone();
                    move || {
                        let controller = controller.clone();
                        wasm_bindgen_futures::spawn_local(async move {
                            if let Some(report) = controller.reject().await {
                                info!(
                                    "Removed {} cookies ({:?})",
                                    report.cookies.len(),
                                    report.strategy
                                );
                            }
                        });
                    }
                });
            }
        }
    });
    Ok(())
}

fn on_click(document: &Document, id: &str, handler: impl FnMut() + 'static) {
    let Some(element) = document.get_element_by_id(id) else {
        return;
    };
    let closure = Closure::<dyn FnMut()>::new(handler);
    let callback = closure.as_ref().unchecked_ref();
    if let Err(e) = element.add_event_listener_with_callback("click", callback) {
        warn!("Could not wire #{}: {:?}", id, e);
    }
    // The banner lives as long as the page.
    closure.forget();
}
