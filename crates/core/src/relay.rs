//! Content-context relay between the requester page and the privileged
//! boundary.
//!
//! The relay has page access but no privileged APIs. It shape-checks
//! inject payloads before anything crosses the boundary, performs exactly
//! one round trip per request (never retries), and funnels the reply back
//! to the requester as an event. A requester destroyed mid-flight simply
//! never sees its event.

use std::sync::Arc;

use serde_json::Value;
use tokio::sync::mpsc;
use tracing::{debug, warn};
use warden_protocol::{
    CookieDescriptor, DisableResult, InjectResult, PrivilegedRequest, PrivilegedResponse,
    RelayEvent, RequesterEvent,
};

use crate::boundary::BoundaryClient;

/// Response emitted when an inject payload fails the shape check. Part of
/// the requester-facing contract.
pub const INVALID_PAYLOAD_ERROR: &str = "Invalid cookie data received.";

/// Shape check applied to an inject payload before deserialization.
///
/// The payload must be an object whose `cookies` field is an array of
/// descriptors. Anything else is rejected without contacting the
/// privileged context.
///
/// Descriptors are typed at this edge, so one malformed item rejects the
/// whole payload here. This is stricter than the install ledger, which
/// only sees items that already parsed: an untyped relay would forward
/// such an item and surface it as a per-item install failure instead.
pub fn validate_payload(detail: &Value) -> Result<Vec<CookieDescriptor>, String> {
    let Some(cookies) = detail.get("cookies") else {
        return Err(INVALID_PAYLOAD_ERROR.to_string());
    };
    if !cookies.is_array() {
        return Err(INVALID_PAYLOAD_ERROR.to_string());
    }
    serde_json::from_value(cookies.clone()).map_err(|_| INVALID_PAYLOAD_ERROR.to_string())
}

/// Relay endpoint living in the page-adjacent context.
///
/// Shares the boundary client with its background dispatch loop, so it
/// holds the client behind an `Arc`.
pub struct Relay {
    boundary: Arc<BoundaryClient>,
    events: mpsc::UnboundedSender<RelayEvent>,
}

impl Relay {
    pub fn new(boundary: Arc<BoundaryClient>, events: mpsc::UnboundedSender<RelayEvent>) -> Self {
        Self { boundary, events }
    }

    /// Drain requester events until the requester context goes away.
    ///
    /// The boundary client's dispatch loop must already be running.
    pub async fn run(self, mut requests: mpsc::UnboundedReceiver<RequesterEvent>) {
        while let Some(event) = requests.recv().await {
            self.handle(event).await;
        }
        debug!(target: "warden.relay", "requester channel closed");
    }

    /// One request, one round trip, one response event.
    pub async fn handle(&self, event: RequesterEvent) {
        match event {
            RequesterEvent::InjectCookies { detail } => {
                let response = self.inject(detail).await;
                self.emit(RelayEvent::InjectResult(response));
            }
            RequesterEvent::DisableOtherAgents => {
                let response = self.disable_others().await;
                self.emit(RelayEvent::DisableResult(response));
            }
        }
    }

    async fn inject(&self, detail: Value) -> InjectResult {
        let cookies = match validate_payload(&detail) {
            Ok(cookies) => cookies,
            Err(message) => {
                debug!(target: "warden.relay", "inject payload failed validation");
                return InjectResult::fail(message);
            }
        };

        match self.boundary.call(PrivilegedRequest::SetCookies { cookies }).await {
            Ok(PrivilegedResponse::Inject(result)) => result,
            Ok(PrivilegedResponse::Disable(_)) => {
                warn!(target: "warden.relay", "mismatched reply kind for inject request");
                InjectResult::fail("unexpected reply from privileged context")
            }
            Err(err) => InjectResult::fail(err.to_string()),
        }
    }

    async fn disable_others(&self) -> DisableResult {
        match self.boundary.call(PrivilegedRequest::DisableOtherAgents).await {
            Ok(PrivilegedResponse::Disable(result)) => result,
            Ok(PrivilegedResponse::Inject(_)) => {
                warn!(target: "warden.relay", "mismatched reply kind for disable request");
                DisableResult { success: false, count: 0 }
            }
            Err(err) => {
                warn!(target: "warden.relay", error = %err, "disable round trip failed");
                DisableResult { success: false, count: 0 }
            }
        }
    }

    fn emit(&self, event: RelayEvent) {
        // The requester context may already be gone; that drop is silent.
        let _ = self.events.send(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn missing_payload_is_rejected() {
        let err = validate_payload(&Value::Null).unwrap_err();
        assert_eq!(err, INVALID_PAYLOAD_ERROR);
    }

    #[test]
    fn non_array_cookies_is_rejected() {
        let err = validate_payload(&json!({"cookies": "not-a-list"})).unwrap_err();
        assert_eq!(err, INVALID_PAYLOAD_ERROR);
    }

    #[test]
    fn malformed_descriptor_is_rejected() {
        // An array, but the items do not have descriptor shape.
        let err = validate_payload(&json!({"cookies": [{"domain": "chatgpt.com"}]})).unwrap_err();
        assert_eq!(err, INVALID_PAYLOAD_ERROR);
    }

    #[test]
    fn empty_list_is_valid() {
        assert_eq!(validate_payload(&json!({"cookies": []})).unwrap(), vec![]);
    }

    #[test]
    fn well_formed_payload_deserializes() {
        let cookies = validate_payload(&json!({
            "cookies": [{"domain": ".chatgpt.com", "name": "sid", "value": "abc"}]
        }))
        .unwrap();
        assert_eq!(cookies.len(), 1);
        assert_eq!(cookies[0].name, "sid");
    }
}
