//! Request/response shapes for both isolation boundaries.
//!
//! The requester page and the relay exchange [`RequesterEvent`] /
//! [`RelayEvent`] pairs. The relay and the privileged context exchange
//! [`PrivilegedRequest`] / [`PrivilegedResponse`] pairs wrapped in
//! correlation envelopes ([`BoundaryRequest`] / [`BoundaryResponse`]).

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::cookie::CookieDescriptor;

/// Event dispatched by the untrusted requester page.
///
/// The inject payload arrives untyped: the relay validates its shape before
/// any descriptor is deserialized or anything crosses the privileged
/// boundary.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RequesterEvent {
    InjectCookies {
        #[serde(default)]
        detail: Value,
    },
    DisableOtherAgents,
}

/// Event the relay dispatches back to the requester page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RelayEvent {
    InjectResult(InjectResult),
    DisableResult(DisableResult),
}

/// Request carried over the privileged channel.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum PrivilegedRequest {
    SetCookies { cookies: Vec<CookieDescriptor> },
    DisableOtherAgents,
}

/// Reply carried over the privileged channel, forwarded to the requester
/// verbatim.
///
/// Untagged on the wire; `Disable` is listed first because it is the only
/// variant requiring a `count` field, which disambiguates the two shapes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PrivilegedResponse {
    Disable(DisableResult),
    Inject(InjectResult),
}

/// Outcome of one `INJECT_COOKIES` round trip.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InjectResult {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl InjectResult {
    /// Clean success: every item installed, or the batch was empty.
    pub fn ok() -> Self {
        Self { success: true, error: None }
    }

    /// Success with a human-readable summary (partial install).
    pub fn ok_with(message: impl Into<String>) -> Self {
        Self { success: true, error: Some(message.into()) }
    }

    pub fn fail(message: impl Into<String>) -> Self {
        Self { success: false, error: Some(message.into()) }
    }
}

/// Outcome of one `DISABLE_OTHER_AGENTS` round trip.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisableResult {
    pub success: bool,
    pub count: usize,
}

/// Correlation envelope for a request crossing the privileged boundary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoundaryRequest {
    /// Unique id for correlating the reply.
    pub id: u32,
    pub payload: PrivilegedRequest,
}

/// Correlation envelope for a reply crossing back.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoundaryResponse {
    /// Request id this reply correlates to.
    pub id: u32,
    pub payload: PrivilegedResponse,
}
