//! Wire types for the session-warden boundary protocol.
//!
//! This crate contains the serde-serializable types that cross the two
//! isolation boundaries: the event pair exchanged with the untrusted
//! requester page, and the request/response envelopes exchanged with the
//! privileged context. These types represent the "protocol layer" - the
//! shapes of data as they appear on the wire.
//!
//! # Design Philosophy
//!
//! Types in this crate are:
//! * Pure data: No behavior beyond serialization/deserialization
//! * Stable: Changes only when the wire contract changes
//!
//! The coordination logic built on top of these types lives in `warden-rs`.

pub mod agent;
pub mod cookie;
pub mod messages;

pub use agent::*;
pub use cookie::*;
pub use messages::*;
