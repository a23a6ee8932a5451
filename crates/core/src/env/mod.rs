//! Traits for the environment collaborators of the privileged context.
//!
//! The privileged context holds ambient authority over four facilities:
//! the agent registry, the cookie store, bulk browsing-data removal, and
//! open-tab control. Each is modeled as a trait so the protocol logic can
//! be driven against the in-memory [`fake`] double in tests.
//!
//! Every call into one of these traits is a suspension point: unrelated
//! activity in the same context may interleave between any two calls.

pub mod fake;

use std::sync::Arc;

use async_trait::async_trait;
use warden_protocol::{AgentRecord, SameSitePolicy};

use crate::error::Result;

pub type TabId = u32;

/// Parameters for one cookie install against the privileged store.
#[derive(Debug, Clone, PartialEq)]
pub struct SetCookieParams {
    pub url: String,
    pub name: String,
    pub value: String,
    pub path: String,
    pub secure: bool,
    pub http_only: bool,
    pub same_site: SameSitePolicy,
    /// Set only for wildcard-scoped cookies; omitting it lets the store
    /// infer the narrower host-only scope.
    pub domain: Option<String>,
    pub expiration_date: Option<f64>,
}

/// A cookie as read back from the privileged store.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredCookie {
    pub domain: String,
    pub path: String,
    pub name: String,
    pub value: String,
}

/// Browsing-state categories accepted by [`BrowsingData::remove`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataKind {
    Cache,
    Cookies,
    LocalStorage,
    IndexedDb,
    ServiceWorkers,
}

/// Registry of installed privileged agents.
#[async_trait]
pub trait AgentRegistry: Send + Sync {
    /// Id of the agent this code runs as.
    fn self_id(&self) -> &str;

    /// Fresh snapshot of every installed agent.
    async fn all(&self) -> Result<Vec<AgentRecord>>;

    /// Activate or deactivate an agent by id.
    async fn set_enabled(&self, id: &str, enabled: bool) -> Result<()>;
}

/// The privileged cookie store.
#[async_trait]
pub trait CookieStore: Send + Sync {
    /// All cookies whose domain matches `domain` exactly.
    async fn get_all(&self, domain: &str) -> Result<Vec<StoredCookie>>;

    async fn set(&self, params: SetCookieParams) -> Result<()>;

    async fn remove(&self, url: &str, name: &str) -> Result<()>;
}

/// Bulk clearing of browsing state scoped to an origin list.
#[async_trait]
pub trait BrowsingData: Send + Sync {
    async fn remove(&self, origins: &[String], kinds: &[DataKind]) -> Result<()>;
}

/// Query and reload of open tabs.
#[async_trait]
pub trait Tabs: Send + Sync {
    /// Ids of open tabs whose URL matches any of the given patterns.
    async fn query(&self, patterns: &[String]) -> Result<Vec<TabId>>;

    async fn reload(&self, tab: TabId) -> Result<()>;
}

/// Capability bundle handed to the orchestrator and watchdog.
#[derive(Clone)]
pub struct Environment {
    pub agents: Arc<dyn AgentRegistry>,
    pub cookies: Arc<dyn CookieStore>,
    pub browsing_data: Arc<dyn BrowsingData>,
    pub tabs: Arc<dyn Tabs>,
}
