//! Cookie descriptor as delivered by the remote credential source.

use serde::{Deserialize, Serialize};

/// SameSite policy values, named the way the privileged cookie store
/// names them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SameSitePolicy {
    #[default]
    Unspecified,
    NoRestriction,
    Lax,
    Strict,
}

/// One cookie from a credential payload.
///
/// Created by the remote credential source, consumed exactly once by the
/// installer, never persisted. Field names match the payload JSON
/// (`httpOnly`, `sameSite`, `expirationDate`, `session`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CookieDescriptor {
    /// Host-only (`chatgpt.com`) or leading-dot wildcard (`.chatgpt.com`).
    pub domain: String,
    #[serde(default = "default_path")]
    pub path: String,
    pub name: String,
    pub value: String,
    #[serde(default)]
    pub secure: bool,
    #[serde(default)]
    pub http_only: bool,
    #[serde(default)]
    pub same_site: SameSitePolicy,
    /// Seconds since the epoch. Ignored on install when `session` is set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiration_date: Option<f64>,
    /// True when the cookie lives only as long as the browser session.
    #[serde(default)]
    pub session: bool,
}

impl CookieDescriptor {
    /// Whether the descriptor is wildcard-scoped (leading-dot domain).
    pub fn is_wildcard(&self) -> bool {
        self.domain.starts_with('.')
    }
}

fn default_path() -> String {
    "/".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_payload_field_names() {
        let json = r#"{
            "domain": ".chatgpt.com",
            "path": "/",
            "name": "sid",
            "value": "abc",
            "secure": true,
            "httpOnly": true,
            "sameSite": "lax",
            "expirationDate": 1999999999.5,
            "session": false
        }"#;
        let cookie: CookieDescriptor = serde_json::from_str(json).unwrap();

        assert_eq!(cookie.name, "sid");
        assert!(cookie.http_only);
        assert_eq!(cookie.same_site, SameSitePolicy::Lax);
        assert_eq!(cookie.expiration_date, Some(1999999999.5));
        assert!(cookie.is_wildcard());
    }

    #[test]
    fn missing_optional_fields_take_defaults() {
        let json = r#"{"domain": "chatgpt.com", "name": "sid", "value": "abc"}"#;
        let cookie: CookieDescriptor = serde_json::from_str(json).unwrap();

        assert_eq!(cookie.path, "/");
        assert!(!cookie.secure);
        assert!(!cookie.http_only);
        assert_eq!(cookie.same_site, SameSitePolicy::Unspecified);
        assert_eq!(cookie.expiration_date, None);
        assert!(!cookie.session);
        assert!(!cookie.is_wildcard());
    }
}
