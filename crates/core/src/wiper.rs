//! Destructive clearing of session state.
//!
//! Two distinct scopes. The pre-install wipe clears every browsing-data
//! category for the full origin allow-list; the watchdog's reactive clear
//! removes cookies on the target domains only. Both are idempotent when
//! re-run.

use tracing::warn;

use crate::env::{BrowsingData, CookieStore, DataKind};
use crate::error::Result;
use crate::installer::cookie_url;

/// Categories cleared by the pre-install wipe.
pub const WIPE_KINDS: [DataKind; 5] = [
    DataKind::Cache,
    DataKind::Cookies,
    DataKind::LocalStorage,
    DataKind::IndexedDb,
    DataKind::ServiceWorkers,
];

/// Deep clean of every origin in the allow-list. Runs unconditionally
/// before each install batch.
pub async fn clear_site_data(data: &dyn BrowsingData, origins: &[String]) -> Result<()> {
    data.remove(origins, &WIPE_KINDS).await
}

/// Cookie-only clear for the given domains, returning how many cookies
/// were removed. A failure on one domain or cookie is logged and does not
/// stop the others.
pub async fn clear_domain_cookies(store: &dyn CookieStore, domains: &[String]) -> usize {
    let mut removed = 0;
    for domain in domains {
        let cookies = match store.get_all(domain).await {
            Ok(cookies) => cookies,
            Err(err) => {
                warn!(target: "warden.wiper", %domain, error = %err, "cookie enumeration failed");
                continue;
            }
        };
        for cookie in cookies {
            let url = cookie_url(&cookie.domain, &cookie.path);
            match store.remove(&url, &cookie.name).await {
                Ok(()) => removed += 1,
                Err(err) => {
                    warn!(target: "warden.wiper", name = %cookie.name, error = %err, "cookie removal failed");
                }
            }
        }
    }
    removed
}
