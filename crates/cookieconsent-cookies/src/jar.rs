//! Cookie capabilities and an in-memory jar.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use cookieconsent_core::{Clock, Error, MaybeSendSync, Result};
use parking_lot::Mutex;
use serde::Serialize;

use crate::record::CookieAssignment;

/// Read access to the script-visible cookie header.
pub trait CookieReader: MaybeSendSync {
    fn cookie_header(&self) -> String;
}

/// Write access to the document cookie string.
pub trait CookieWriter: MaybeSendSync {
    fn write_cookie(&self, assignment: &CookieAssignment);
}

/// A cookie as reported by the async cookie store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StoredCookie {
    pub name: String,
    pub domain: Option<String>,
    pub path: Option<String>,
}

/// Asynchronous enumerate-and-delete cookie storage.
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
pub trait CookieStoreApi: MaybeSendSync {
    async fn get_all(&self) -> Result<Vec<StoredCookie>>;

    /// Delete by exact name/domain/path.
    async fn delete(&self, cookie: &StoredCookie) -> Result<()>;
}

#[derive(Debug, Clone)]
struct Entry {
    value: String,
    expires: Option<DateTime<Utc>>,
}

type Key = (String, Option<String>, String);

/// In-memory cookie jar that applies assignments the way a browser does:
/// an already-expired write removes the matching (name, domain, path) entry.
pub struct MemoryCookieJar {
    clock: Arc<dyn Clock>,
    entries: Mutex<BTreeMap<Key, Entry>>,
    writes: Mutex<Vec<CookieAssignment>>,
}

impl MemoryCookieJar {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            clock,
            entries: Mutex::new(BTreeMap::new()),
            writes: Mutex::new(Vec::new()),
        }
    }

    /// Seed a host-only session cookie without recording a write.
    pub fn set(&self, name: &str, value: &str) {
        self.set_scoped(name, value, None, "/");
    }

    /// Seed a cookie under an explicit domain and path.
    pub fn set_scoped(&self, name: &str, value: &str, domain: Option<&str>, path: &str) {
        self.entries.lock().insert(
            (name.to_string(), domain.map(str::to_string), path.to_string()),
            Entry {
                value: value.to_string(),
                expires: None,
            },
        );
    }

    /// Current value of the first live cookie called `name`.
    pub fn get(&self, name: &str) -> Option<String> {
        let now = self.clock.now();
        self.entries
            .lock()
            .iter()
            .find(|((n, _, _), e)| n == name && e.expires.map_or(true, |exp| exp > now))
            .map(|(_, e)| e.value.clone())
    }

    /// Expiry of the first cookie called `name`.
    pub fn expiry(&self, name: &str) -> Option<DateTime<Utc>> {
        self.entries
            .lock()
            .iter()
            .find(|((n, _, _), _)| n == name)
            .and_then(|(_, e)| e.expires)
    }

    /// Names of all live cookies, sorted.
    pub fn names(&self) -> Vec<String> {
        let now = self.clock.now();
        let mut names: Vec<String> = self
            .entries
            .lock()
            .iter()
            .filter(|(_, e)| e.expires.map_or(true, |exp| exp > now))
            .map(|((n, _, _), _)| n.clone())
            .collect();
        names.dedup();
        names
    }

    /// Every assignment written through [`CookieWriter`], in order.
    pub fn writes(&self) -> Vec<CookieAssignment> {
        self.writes.lock().clone()
    }

    /// How long until `name` expires, measured from the jar's clock.
    pub fn remaining(&self, name: &str) -> Option<Duration> {
        self.expiry(name).map(|exp| exp - self.clock.now())
    }
}

impl CookieReader for MemoryCookieJar {
    fn cookie_header(&self) -> String {
        let now = self.clock.now();
        self.entries
            .lock()
            .iter()
            .filter(|(_, e)| e.expires.map_or(true, |exp| exp > now))
            .map(|((n, _, _), e)| format!("{}={}", n, e.value))
            .collect::<Vec<_>>()
            .join("; ")
    }
}

impl CookieWriter for MemoryCookieJar {
    fn write_cookie(&self, assignment: &CookieAssignment) {
        self.writes.lock().push(assignment.clone());
        let key = (
            assignment.name.clone(),
            assignment.domain.clone(),
            assignment.path.clone(),
        );
        let mut entries = self.entries.lock();
        if assignment.is_expired_at(self.clock.now()) {
            entries.remove(&key);
        } else {
            entries.insert(
                key,
                Entry {
                    value: assignment.value.clone(),
                    expires: Some(assignment.expires),
                },
            );
        }
    }
}

#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
impl CookieStoreApi for MemoryCookieJar {
    async fn get_all(&self) -> Result<Vec<StoredCookie>> {
        let now = self.clock.now();
        Ok(self
            .entries
            .lock()
            .iter()
            .filter(|(_, e)| e.expires.map_or(true, |exp| exp > now))
            .map(|((name, domain, path), _)| StoredCookie {
                name: name.clone(),
                domain: domain.clone(),
                path: Some(path.clone()),
            })
            .collect())
    }

    async fn delete(&self, cookie: &StoredCookie) -> Result<()> {
        let key = (
            cookie.name.clone(),
            cookie.domain.clone(),
            cookie.path.clone().unwrap_or_else(|| "/".into()),
        );
        self.entries
            .lock()
            .remove(&key)
            .map(|_| ())
            .ok_or_else(|| Error::CookieStore(format!("no such cookie: {}", cookie.name)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use cookieconsent_core::FixedClock;

    fn jar() -> MemoryCookieJar {
        let now = Utc.with_ymd_and_hms(2026, 5, 1, 0, 0, 0).unwrap();
        MemoryCookieJar::new(Arc::new(FixedClock(now)))
    }

    #[test]
    fn test_header_reflects_writes() {
        let jar = jar();
        jar.set("a", "1");
        let far = Utc.with_ymd_and_hms(2030, 1, 1, 0, 0, 0).unwrap();
        jar.write_cookie(&CookieAssignment::new("b", "2", far));
        assert_eq!(jar.cookie_header(), "a=1; b=2");

        jar.write_cookie(&CookieAssignment::new("a", "", DateTime::<Utc>::default()));
        assert_eq!(jar.cookie_header(), "b=2");
        assert_eq!(jar.writes().len(), 2);
    }

    #[test]
    fn test_domain_scope_is_separate() {
        let jar = jar();
        jar.set_scoped("_ga", "1", Some(".example.com"), "/");
        jar.write_cookie(&CookieAssignment::new("_ga", "", DateTime::<Utc>::default()));
        assert_eq!(jar.names(), vec!["_ga".to_string()]);

        jar.write_cookie(
            &CookieAssignment::new("_ga", "", DateTime::<Utc>::default())
                .with_domain(".example.com"),
        );
        assert!(jar.names().is_empty());
    }

    #[tokio::test]
    async fn test_store_enumerate_and_delete() {
        let jar = jar();
        jar.set("a", "1");
        jar.set_scoped("b", "2", Some(".example.com"), "/shop");

        let all = jar.get_all().await.unwrap();
        assert_eq!(all.len(), 2);
        for cookie in &all {
            jar.delete(cookie).await.unwrap();
        }
        assert!(jar.names().is_empty());
        assert!(jar.delete(&all[0]).await.is_err());
    }
}
