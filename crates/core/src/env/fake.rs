//! In-memory environment for driving the protocol without a browser.
//!
//! Provides fake implementations of all four environment traits plus a
//! controller for seeding state and inspecting what the privileged context
//! did to it.
//!
//! # Example
//!
//! ```ignore
//! let (env, controller) = FakeEnvironmentBuilder::new().build();
//! controller.install_agent(AgentRecord { /* competing agent */ });
//!
//! let orchestrator = Orchestrator::new(env, SessionScope::default());
//! let response = orchestrator.handle(request).await;
//! assert!(controller.wipes().is_empty());
//! ```

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use warden_protocol::AgentRecord;

use super::{
    AgentRegistry, BrowsingData, CookieStore, DataKind, Environment, SetCookieParams,
    StoredCookie, TabId, Tabs,
};
use crate::error::{Error, Result};

/// Builder for the fake environment.
pub struct FakeEnvironmentBuilder {
    self_id: String,
}

impl FakeEnvironmentBuilder {
    pub fn new() -> Self {
        Self { self_id: "warden-self".to_string() }
    }

    /// Id the environment reports for this agent.
    pub fn self_id(mut self, id: impl Into<String>) -> Self {
        self.self_id = id.into();
        self
    }

    /// Build the environment and return it with its controller.
    pub fn build(self) -> (Environment, FakeController) {
        let state = Arc::new(Mutex::new(FakeState {
            agents: Vec::new(),
            cookies: Vec::new(),
            installs: Vec::new(),
            fail_cookie_names: HashSet::new(),
            fail_wipe: false,
            fail_registry: false,
            wipes: Vec::new(),
            tabs: Vec::new(),
            next_tab_id: 1,
            reloaded: Vec::new(),
        }));

        let env = Environment {
            agents: Arc::new(FakeRegistry { self_id: self.self_id, state: Arc::clone(&state) }),
            cookies: Arc::new(FakeCookieStore { state: Arc::clone(&state) }),
            browsing_data: Arc::new(FakeBrowsingData { state: Arc::clone(&state) }),
            tabs: Arc::new(FakeTabs { state: Arc::clone(&state) }),
        };

        (env, FakeController { state })
    }
}

impl Default for FakeEnvironmentBuilder {
    fn default() -> Self {
        Self::new()
    }
}

struct FakeState {
    agents: Vec<AgentRecord>,
    /// Resident cookies, seeded or installed.
    cookies: Vec<StoredCookie>,
    /// Every successful `set` call, in order.
    installs: Vec<SetCookieParams>,
    /// Cookie names the store rejects.
    fail_cookie_names: HashSet<String>,
    /// When set, every browsing-data clear fails.
    fail_wipe: bool,
    /// When set, registry enumeration fails.
    fail_registry: bool,
    /// Every browsing-data clear, in order.
    wipes: Vec<(Vec<String>, Vec<DataKind>)>,
    tabs: Vec<(TabId, String)>,
    next_tab_id: TabId,
    reloaded: Vec<TabId>,
}

/// Controller for seeding the fake environment and inspecting mutations.
pub struct FakeController {
    state: Arc<Mutex<FakeState>>,
}

impl FakeController {
    /// Register an installed agent in the registry snapshot.
    pub fn install_agent(&self, record: AgentRecord) {
        self.state.lock().unwrap().agents.push(record);
    }

    /// Current registry record for `id`.
    pub fn agent(&self, id: &str) -> Option<AgentRecord> {
        self.state.lock().unwrap().agents.iter().find(|a| a.id == id).cloned()
    }

    /// Make the store reject installs of the named cookie.
    pub fn fail_cookie(&self, name: impl Into<String>) {
        self.state.lock().unwrap().fail_cookie_names.insert(name.into());
    }

    /// Make every browsing-data clear fail.
    pub fn fail_wipe(&self) {
        self.state.lock().unwrap().fail_wipe = true;
    }

    /// Make registry enumeration fail.
    pub fn fail_registry(&self) {
        self.state.lock().unwrap().fail_registry = true;
    }

    /// Place a cookie directly into the resident store.
    pub fn seed_cookie(&self, domain: &str, path: &str, name: &str, value: &str) {
        self.state.lock().unwrap().cookies.push(StoredCookie {
            domain: domain.to_string(),
            path: path.to_string(),
            name: name.to_string(),
            value: value.to_string(),
        });
    }

    /// Open a tab at `url` and return its id.
    pub fn open_tab(&self, url: &str) -> TabId {
        let mut state = self.state.lock().unwrap();
        let id = state.next_tab_id;
        state.next_tab_id += 1;
        state.tabs.push((id, url.to_string()));
        id
    }

    /// Every successful install, in call order.
    pub fn installs(&self) -> Vec<SetCookieParams> {
        self.state.lock().unwrap().installs.clone()
    }

    /// Cookies currently resident in the store.
    pub fn resident_cookies(&self) -> Vec<StoredCookie> {
        self.state.lock().unwrap().cookies.clone()
    }

    /// Every browsing-data clear, in call order.
    pub fn wipes(&self) -> Vec<(Vec<String>, Vec<DataKind>)> {
        self.state.lock().unwrap().wipes.clone()
    }

    /// Tabs reloaded so far, in call order.
    pub fn reloaded(&self) -> Vec<TabId> {
        self.state.lock().unwrap().reloaded.clone()
    }
}

struct FakeRegistry {
    self_id: String,
    state: Arc<Mutex<FakeState>>,
}

#[async_trait]
impl AgentRegistry for FakeRegistry {
    fn self_id(&self) -> &str {
        &self.self_id
    }

    async fn all(&self) -> Result<Vec<AgentRecord>> {
        let state = self.state.lock().unwrap();
        if state.fail_registry {
            return Err(Error::environment("agent registry unavailable"));
        }
        Ok(state.agents.clone())
    }

    async fn set_enabled(&self, id: &str, enabled: bool) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        match state.agents.iter_mut().find(|a| a.id == id) {
            Some(agent) => {
                agent.enabled = enabled;
                Ok(())
            }
            None => Err(Error::environment(format!("no agent with id {id}"))),
        }
    }
}

struct FakeCookieStore {
    state: Arc<Mutex<FakeState>>,
}

#[async_trait]
impl CookieStore for FakeCookieStore {
    async fn get_all(&self, domain: &str) -> Result<Vec<StoredCookie>> {
        let state = self.state.lock().unwrap();
        Ok(state.cookies.iter().filter(|c| c.domain == domain).cloned().collect())
    }

    async fn set(&self, params: SetCookieParams) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        if state.fail_cookie_names.contains(&params.name) {
            return Err(Error::environment(format!("store rejected cookie {}", params.name)));
        }
        let domain = params
            .domain
            .clone()
            .unwrap_or_else(|| url_host(&params.url).to_string());
        state.cookies.retain(|c| !(c.domain == domain && c.name == params.name));
        state.cookies.push(StoredCookie {
            domain,
            path: params.path.clone(),
            name: params.name.clone(),
            value: params.value.clone(),
        });
        state.installs.push(params);
        Ok(())
    }

    async fn remove(&self, url: &str, name: &str) -> Result<()> {
        let host = url_host(url).to_string();
        let mut state = self.state.lock().unwrap();
        state
            .cookies
            .retain(|c| !(c.name == name && c.domain.trim_start_matches('.') == host));
        Ok(())
    }
}

struct FakeBrowsingData {
    state: Arc<Mutex<FakeState>>,
}

#[async_trait]
impl BrowsingData for FakeBrowsingData {
    async fn remove(&self, origins: &[String], kinds: &[DataKind]) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        if state.fail_wipe {
            return Err(Error::environment("browsing data removal refused"));
        }
        if kinds.contains(&DataKind::Cookies) {
            state.cookies.retain(|c| {
                let host = c.domain.trim_start_matches('.');
                !origins.iter().any(|o| url_host(o) == host)
            });
        }
        state.wipes.push((origins.to_vec(), kinds.to_vec()));
        Ok(())
    }
}

struct FakeTabs {
    state: Arc<Mutex<FakeState>>,
}

#[async_trait]
impl Tabs for FakeTabs {
    async fn query(&self, patterns: &[String]) -> Result<Vec<TabId>> {
        let state = self.state.lock().unwrap();
        Ok(state
            .tabs
            .iter()
            .filter(|(_, url)| patterns.iter().any(|p| wildcard_match(p, url)))
            .map(|(id, _)| *id)
            .collect())
    }

    async fn reload(&self, tab: TabId) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        if !state.tabs.iter().any(|(id, _)| *id == tab) {
            return Err(Error::environment(format!("no tab with id {tab}")));
        }
        state.reloaded.push(tab);
        Ok(())
    }
}

fn url_host(url: &str) -> &str {
    let without_scheme = url.split_once("://").map(|(_, rest)| rest).unwrap_or(url);
    without_scheme.split('/').next().unwrap_or(without_scheme)
}

/// Match-pattern check: `*` spans any run of characters.
fn wildcard_match(pattern: &str, input: &str) -> bool {
    let parts: Vec<&str> = pattern.split('*').collect();
    if parts.len() == 1 {
        return pattern == input;
    }
    let mut rest = input;
    for (i, part) in parts.iter().enumerate() {
        if part.is_empty() {
            continue;
        }
        if i == 0 {
            match rest.strip_prefix(part) {
                Some(r) => rest = r,
                None => return false,
            }
        } else if i == parts.len() - 1 {
            return rest.ends_with(part);
        } else {
            match rest.find(part) {
                Some(at) => rest = &rest[at + part.len()..],
                None => return false,
            }
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use warden_protocol::SameSitePolicy;

    fn params(name: &str, url: &str) -> SetCookieParams {
        SetCookieParams {
            url: url.to_string(),
            name: name.to_string(),
            value: "v".to_string(),
            path: "/".to_string(),
            secure: true,
            http_only: false,
            same_site: SameSitePolicy::NoRestriction,
            domain: None,
            expiration_date: None,
        }
    }

    #[test]
    fn wildcard_match_covers_tab_patterns() {
        assert!(wildcard_match("*://chatgpt.com/*", "https://chatgpt.com/"));
        assert!(wildcard_match("*://*.chatgpt.com/*", "https://chat.chatgpt.com/c/1"));
        assert!(!wildcard_match("*://chatgpt.com/*", "https://example.com/"));
        assert!(!wildcard_match("*://*.chatgpt.com/*", "https://chatgpt.com.evil.io/"));
    }

    #[tokio::test]
    async fn set_then_remove_round_trips() {
        let (env, controller) = FakeEnvironmentBuilder::new().build();

        env.cookies.set(params("sid", "https://chatgpt.com/")).await.unwrap();
        assert_eq!(controller.resident_cookies().len(), 1);

        env.cookies.remove("https://chatgpt.com/", "sid").await.unwrap();
        assert!(controller.resident_cookies().is_empty());
        // The install ledger keeps history even after removal.
        assert_eq!(controller.installs().len(), 1);
    }

    #[tokio::test]
    async fn failing_cookie_is_rejected() {
        let (env, controller) = FakeEnvironmentBuilder::new().build();
        controller.fail_cookie("bad");

        let err = env.cookies.set(params("bad", "https://chatgpt.com/")).await.unwrap_err();
        assert!(err.to_string().contains("bad"));
        assert!(controller.installs().is_empty());
    }
}
