//! Batch cookie installation with a per-item success/failure ledger.

use tracing::warn;
use warden_protocol::{CookieDescriptor, InjectResult, SameSitePolicy};

use crate::env::{CookieStore, SetCookieParams};

/// Ledger for one install batch.
#[derive(Debug, Default, PartialEq)]
pub struct InstallReport {
    pub success_count: usize,
    /// One `"<name>: <message>"` entry per failed item, in request order.
    pub errors: Vec<String>,
}

impl InstallReport {
    /// Fold the ledger into the wire result.
    ///
    /// Zero successes with at least one error is a failure; a mix is a
    /// success with a summary; everything else (all installed, or an empty
    /// batch) is a clean success.
    pub fn into_result(self) -> InjectResult {
        if !self.errors.is_empty() && self.success_count == 0 {
            InjectResult::fail(format!("Failed to set all cookies. {}", self.errors.join(", ")))
        } else if !self.errors.is_empty() {
            InjectResult::ok_with(format!(
                "Set {} cookies, but some failed: {}",
                self.success_count,
                self.errors.join(", ")
            ))
        } else {
            InjectResult::ok()
        }
    }
}

/// `https://` URL for a cookie's host. Wildcard domains lose their leading
/// dot; an empty path becomes `/`.
pub(crate) fn cookie_url(domain: &str, path: &str) -> String {
    let host = domain.strip_prefix('.').unwrap_or(domain);
    let path = if path.is_empty() { "/" } else { path };
    format!("https://{host}{path}")
}

/// Install record for one descriptor.
///
/// `secure` is forced on and `sameSite` relaxed to `no_restriction`
/// regardless of what the descriptor says: the downstream auth provider
/// rejects injected tokens under stricter policies. The explicit `domain`
/// field is set only for wildcard descriptors; host-only descriptors let
/// the store infer the narrower scope. Session-scoped cookies never carry
/// an expiration.
pub fn set_params(cookie: &CookieDescriptor) -> SetCookieParams {
    let path = if cookie.path.is_empty() { "/".to_string() } else { cookie.path.clone() };
    SetCookieParams {
        url: cookie_url(&cookie.domain, &path),
        name: cookie.name.clone(),
        value: cookie.value.clone(),
        path,
        secure: true,
        http_only: cookie.http_only,
        same_site: SameSitePolicy::NoRestriction,
        domain: cookie.is_wildcard().then(|| cookie.domain.clone()),
        expiration_date: if cookie.session { None } else { cookie.expiration_date },
    }
}

/// Install the batch in request order.
///
/// Each item is an independent suspension point; a failing item is recorded
/// in the ledger and never aborts the rest of the batch.
pub async fn install_batch(store: &dyn CookieStore, cookies: &[CookieDescriptor]) -> InstallReport {
    let mut report = InstallReport::default();
    for cookie in cookies {
        match store.set(set_params(cookie)).await {
            Ok(()) => report.success_count += 1,
            Err(err) => {
                warn!(target: "warden.install", name = %cookie.name, error = %err, "cookie install failed");
                report.errors.push(format!("{}: {}", cookie.name, err));
            }
        }
    }
    report
}
