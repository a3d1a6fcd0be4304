//! Suppression default: keep the banner hidden until a decision is made.

use std::sync::Arc;

use cookieconsent_core::Result;
use parking_lot::Mutex;
use tracing::debug;

use crate::capabilities::StylesheetInjector;

/// Owns the single stylesheet that hides the banner container.
pub struct BannerSuppressor {
    injector: Arc<dyn StylesheetInjector>,
    css: String,
    adopted: Mutex<bool>,
}

impl BannerSuppressor {
    pub fn new(injector: Arc<dyn StylesheetInjector>, banner_id: &str) -> Self {
        Self {
            injector,
            css: hide_rule(banner_id),
            adopted: Mutex::new(false),
        }
    }

    /// Adopt the hiding stylesheet. Later calls are no-ops.
    pub fn hide_by_default(&self) -> Result<()> {
        let mut adopted = self.adopted.lock();
        if *adopted {
            debug!("Banner suppression stylesheet already adopted");
            return Ok(());
        }
        self.injector.adopt(&self.css)?;
        *adopted = true;
        Ok(())
    }

    pub fn css(&self) -> &str {
        &self.css
    }
}

/// `display: none` for the banner, matched by class or id. Inline styles
/// set when revealing the banner take precedence.
pub fn hide_rule(banner_id: &str) -> String {
    format!(".{id}, #{id} {{ display: none; }}", id = banner_id)
}
