//! Reactive guard against competing agents being activated.
//!
//! Standing consumer of the registry's activation event stream, armed for
//! the lifetime of the privileged context. There is no caller to report
//! to: every failure on this path is logged and forgotten.

use tokio::sync::mpsc;
use tracing::{debug, info, warn};
use warden_protocol::{AgentEvent, AgentKind};

use crate::config::SessionScope;
use crate::env::Environment;
use crate::wiper;

pub struct Watchdog {
    env: Environment,
    scope: SessionScope,
}

impl Watchdog {
    pub fn new(env: Environment, scope: SessionScope) -> Self {
        Self { env, scope }
    }

    /// Consume activation events until the stream closes.
    pub async fn run(self, mut events: mpsc::UnboundedReceiver<AgentEvent>) {
        while let Some(event) = events.recv().await {
            self.on_activated(&event).await;
        }
        debug!(target: "warden.watchdog", "activation stream closed");
    }

    /// React to one activation. Our own activation and non-agent units
    /// (themes, apps) are ignored.
    pub async fn on_activated(&self, event: &AgentEvent) {
        if event.id == self.env.agents.self_id() || event.kind != AgentKind::Agent {
            return;
        }

        info!(
            target: "warden.watchdog",
            id = %event.id,
            name = %event.name,
            "competing agent activated; revoking session cookies"
        );

        let removed =
            wiper::clear_domain_cookies(self.env.cookies.as_ref(), &self.scope.target_domains).await;
        debug!(target: "warden.watchdog", removed, "target-domain cookies cleared");

        self.reload_target_tabs().await;
    }

    async fn reload_target_tabs(&self) {
        let tabs = match self.env.tabs.query(&self.scope.tab_patterns).await {
            Ok(tabs) => tabs,
            Err(err) => {
                warn!(target: "warden.watchdog", error = %err, "tab query failed");
                return;
            }
        };
        for tab in tabs {
            if let Err(err) = self.env.tabs.reload(tab).await {
                warn!(target: "warden.watchdog", tab, error = %err, "tab reload failed");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::fake::{FakeController, FakeEnvironmentBuilder};

    fn build() -> (Watchdog, FakeController) {
        let (env, controller) = FakeEnvironmentBuilder::new().self_id("me").build();
        (Watchdog::new(env, SessionScope::default()), controller)
    }

    fn activation(id: &str, kind: AgentKind) -> AgentEvent {
        AgentEvent { id: id.to_string(), name: id.to_string(), kind }
    }

    #[tokio::test]
    async fn competing_agent_triggers_wipe_and_reload() {
        let (watchdog, controller) = build();
        controller.seed_cookie(".chatgpt.com", "/", "sid", "abc");
        controller.seed_cookie("example.com", "/", "other", "keep");
        let target_tab = controller.open_tab("https://chatgpt.com/c/42");
        controller.open_tab("https://example.com/");

        watchdog.on_activated(&activation("rival", AgentKind::Agent)).await;

        let remaining = controller.resident_cookies();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].name, "other");
        assert_eq!(controller.reloaded(), vec![target_tab]);
    }

    #[tokio::test]
    async fn own_activation_is_ignored() {
        let (watchdog, controller) = build();
        controller.seed_cookie(".chatgpt.com", "/", "sid", "abc");
        controller.open_tab("https://chatgpt.com/");

        watchdog.on_activated(&activation("me", AgentKind::Agent)).await;

        assert_eq!(controller.resident_cookies().len(), 1);
        assert!(controller.reloaded().is_empty());
    }

    #[tokio::test]
    async fn non_agent_kinds_are_ignored() {
        let (watchdog, controller) = build();
        controller.seed_cookie(".chatgpt.com", "/", "sid", "abc");

        watchdog.on_activated(&activation("some-theme", AgentKind::Theme)).await;

        assert_eq!(controller.resident_cookies().len(), 1);
    }

    #[tokio::test]
    async fn run_drains_the_stream() {
        let (watchdog, controller) = build();
        controller.seed_cookie("chatgpt.com", "/", "sid", "abc");

        let (tx, rx) = mpsc::unbounded_channel();
        tx.send(activation("rival", AgentKind::Agent)).unwrap();
        drop(tx);

        watchdog.run(rx).await;
        assert!(controller.resident_cookies().is_empty());
    }
}
