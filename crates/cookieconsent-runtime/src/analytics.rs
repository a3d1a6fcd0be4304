//! Analytics bootstrap and the page-wide gtag data layer.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use cookieconsent_core::{Clock, ConsentConfig};
use once_cell::sync::OnceCell;
use parking_lot::{Mutex, RwLock};
use serde::Serialize;
use serde_json::json;
use tracing::{debug, info, warn};

use crate::capabilities::{ScriptLoader, ScriptTag};

/// One `gtag(...)` call queued on the data layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum GtagEvent {
    Js(DateTime<Utc>),
    Config(String),
}

impl GtagEvent {
    /// The argument list as gtag sees it, e.g. `["config", "G-XXXX"]`.
    pub fn to_args(&self) -> serde_json::Value {
        match self {
            Self::Js(at) => json!(["js", at.to_rfc3339()]),
            Self::Config(tag) => json!(["config", tag]),
        }
    }
}

/// Observer invoked on every push.
pub type PushHook = Box<dyn Fn(&GtagEvent) + Send + Sync>;

static GLOBAL: OnceCell<Arc<DataLayer>> = OnceCell::new();

/// The gtag event queue plus the record of which tags were bootstrapped.
///
/// One instance per page: [`DataLayer::global`] creates it on first use and
/// it lives until the page unloads. The bootstrapped-tag set is the guard that
/// keeps a tag from being injected twice.
pub struct DataLayer {
    events: Mutex<Vec<GtagEvent>>,
    bootstrapped: Mutex<HashSet<String>>,
    hook: RwLock<Option<PushHook>>,
}

impl DataLayer {
    /// A private data layer, detached from the page-wide one.
    pub fn new() -> Self {
        Self {
            events: Mutex::new(Vec::new()),
            bootstrapped: Mutex::new(HashSet::new()),
            hook: RwLock::new(None),
        }
    }

    /// The page-wide data layer.
    pub fn global() -> Arc<DataLayer> {
        GLOBAL.get_or_init(|| Arc::new(DataLayer::new())).clone()
    }

    /// Mirror every future push, e.g. into `window.dataLayer`.
    pub fn set_push_hook(&self, hook: PushHook) {
        *self.hook.write() = Some(hook);
    }

    /// Claim `tag_id` for bootstrapping. Only the first claim succeeds.
    pub fn claim(&self, tag_id: &str) -> bool {
        self.bootstrapped.lock().insert(tag_id.to_string())
    }

    pub fn is_bootstrapped(&self, tag_id: &str) -> bool {
        self.bootstrapped.lock().contains(tag_id)
    }

    pub fn push(&self, event: GtagEvent) {
        if let Some(hook) = self.hook.read().as_ref() {
            hook(&event);
        }
        self.events.lock().push(event);
    }

    pub fn events(&self) -> Vec<GtagEvent> {
        self.events.lock().clone()
    }
}

impl Default for DataLayer {
    fn default() -> Self {
        Self::new()
    }
}

/// Loads the analytics tag at most once per data layer.
pub struct AnalyticsBootstrap {
    tag_id: String,
    script_url: String,
    loader: Arc<dyn ScriptLoader>,
    data_layer: Arc<DataLayer>,
    clock: Arc<dyn Clock>,
}

impl AnalyticsBootstrap {
    pub fn new(
        config: &ConsentConfig,
        loader: Arc<dyn ScriptLoader>,
        data_layer: Arc<DataLayer>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            tag_id: config.measurement_id.clone(),
            script_url: config.analytics_script_url(),
            loader,
            data_layer,
            clock,
        }
    }

    /// Inject the tag script; once it loads, queue `js` and `config`.
    ///
    /// Returns false when the tag was already claimed on this data layer.
    pub fn load(&self) -> bool {
        if !self.data_layer.claim(&self.tag_id) {
            debug!("Analytics tag {} already bootstrapped", self.tag_id);
            return false;
        }

        let data_layer = self.data_layer.clone();
        let clock = self.clock.clone();
        let tag_id = self.tag_id.clone();
        let tag = ScriptTag {
            src: self.script_url.clone(),
            async_load: true,
        };

        let injected = self.loader.inject(
            tag,
            Box::new(move || {
                data_layer.push(GtagEvent::Js(clock.now()));
                data_layer.push(GtagEvent::Config(tag_id));
            }),
        );
        match injected {
            Ok(()) => info!("Analytics tag {} injected", self.tag_id),
            Err(e) => warn!("Analytics tag {} not injected: {}", self.tag_id, e),
        }
        true
    }

    pub fn tag_id(&self) -> &str {
        &self.tag_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use cookieconsent_core::{FixedClock, Result};

    /// Runs `on_load` immediately and counts injections.
    #[derive(Default)]
    struct InstantLoader(Mutex<Vec<ScriptTag>>);

    impl ScriptLoader for InstantLoader {
        fn inject(&self, tag: ScriptTag, on_load: crate::capabilities::OnLoad) -> Result<()> {
            self.0.lock().push(tag);
            on_load();
            Ok(())
        }
    }

    fn bootstrap(layer: Arc<DataLayer>, loader: Arc<InstantLoader>) -> AnalyticsBootstrap {
        let now = Utc.with_ymd_and_hms(2026, 2, 2, 8, 0, 0).unwrap();
        AnalyticsBootstrap::new(
            &ConsentConfig::default(),
            loader,
            layer,
            Arc::new(FixedClock(now)),
        )
    }

    #[test]
    fn test_load_queues_init_events() {
        let layer = Arc::new(DataLayer::new());
        let loader = Arc::new(InstantLoader::default());
        let analytics = bootstrap(layer.clone(), loader.clone());

        assert!(analytics.load());
        let scripts = loader.0.lock().clone();
        assert_eq!(scripts.len(), 1);
        assert_eq!(
            scripts[0].src,
            "https://www.googletagmanager.com/gtag/js?id=G-LTR729EM84"
        );
        assert!(scripts[0].async_load);

        let events = layer.events();
        assert_eq!(events.len(), 2);
        assert!(matches!(events[0], GtagEvent::Js(_)));
        assert_eq!(events[1], GtagEvent::Config("G-LTR729EM84".into()));
        assert_eq!(events[1].to_args(), json!(["config", "G-LTR729EM84"]));
    }

    #[test]
    fn test_second_load_is_noop() {
        let layer = Arc::new(DataLayer::new());
        let loader = Arc::new(InstantLoader::default());
        let first = bootstrap(layer.clone(), loader.clone());
        let second = bootstrap(layer.clone(), loader.clone());

        assert!(first.load());
        assert!(!first.load());
        assert!(!second.load());
        assert_eq!(loader.0.lock().len(), 1);
        assert_eq!(layer.events().len(), 2);
    }

    #[test]
    fn test_push_hook_mirrors_events() {
        let layer = Arc::new(DataLayer::new());
        let mirrored = Arc::new(Mutex::new(Vec::new()));
        let sink = mirrored.clone();
        layer.set_push_hook(Box::new(move |e: &GtagEvent| sink.lock().push(e.to_args())));

        layer.push(GtagEvent::Config("G-1".into()));
        assert_eq!(*mirrored.lock(), vec![json!(["config", "G-1"])]);
    }

    #[test]
    fn test_global_is_shared() {
        let a = DataLayer::global();
        let b = DataLayer::global();
        assert!(Arc::ptr_eq(&a, &b));
    }
}
