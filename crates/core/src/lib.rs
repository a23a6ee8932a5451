//! Session takeover protocol: relay, privileged orchestrator, and watchdog.
//!
//! Three cooperating contexts, connected only by asynchronous message
//! passing:
//!
//! * An untrusted requester page dispatches [`RequesterEvent`]s.
//! * The [`Relay`] runs in a context with page access but no privileged
//!   APIs; it validates payloads and forwards them across the boundary.
//! * The [`Orchestrator`] runs in the privileged context; it enforces the
//!   exclusivity invariant (exactly one privileged agent may touch the
//!   guarded session), wipes existing session state, and installs cookie
//!   batches with a per-item failure ledger.
//!
//! The [`Watchdog`] runs independently in the privileged context: when a
//! competing agent is activated it revokes the session's cookies and
//! reloads every open tab on the guarded origins.
//!
//! [`RequesterEvent`]: warden_protocol::RequesterEvent

pub mod boundary;
pub mod config;
pub mod env;
pub mod error;
pub mod gate;
pub mod installer;
pub mod orchestrator;
pub mod relay;
pub mod watchdog;
pub mod wiper;

pub use boundary::{BoundaryClient, BoundaryServer};
pub use config::SessionScope;
pub use env::{AgentRegistry, BrowsingData, CookieStore, Environment, Tabs};
pub use error::{Error, Result};
pub use orchestrator::Orchestrator;
pub use relay::Relay;
pub use watchdog::Watchdog;
