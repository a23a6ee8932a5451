//! Exclusivity gate over the environment's agent registry.
//!
//! The gate is a best-effort check-then-act guard, not a lock: an agent
//! activated between the check and the following mutation is not caught.
//! The host environment offers nothing stronger.

use warden_protocol::{AgentKind, AgentRecord};

use crate::env::AgentRegistry;
use crate::error::Result;

/// Verbatim rejection string. Part of the external contract: requesters
/// substring-match on `"delete other extensions"` to decide whether to
/// offer the disable-all remediation.
pub const EXCLUSIVITY_ERROR: &str =
    "injection failed delete other extensions other than my extension to continue";

/// Every enabled agent of kind `agent` other than ourselves.
///
/// Queries the registry fresh on each call; snapshots must never be cached
/// across mutating operations.
pub async fn other_active_agents(registry: &dyn AgentRegistry) -> Result<Vec<AgentRecord>> {
    let self_id = registry.self_id().to_string();
    let agents = registry.all().await?;
    Ok(agents
        .into_iter()
        .filter(|a| a.kind == AgentKind::Agent && a.enabled && a.id != self_id)
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::fake::FakeEnvironmentBuilder;

    fn record(id: &str, kind: AgentKind, enabled: bool) -> AgentRecord {
        AgentRecord { id: id.to_string(), name: id.to_string(), kind, enabled }
    }

    #[tokio::test]
    async fn filters_self_disabled_and_other_kinds() {
        let (env, controller) = FakeEnvironmentBuilder::new().self_id("me").build();
        controller.install_agent(record("me", AgentKind::Agent, true));
        controller.install_agent(record("sleeping", AgentKind::Agent, false));
        controller.install_agent(record("dark-mode", AgentKind::Theme, true));
        controller.install_agent(record("rival", AgentKind::Agent, true));

        let others = other_active_agents(env.agents.as_ref()).await.unwrap();
        assert_eq!(others.len(), 1);
        assert_eq!(others[0].id, "rival");
    }

    #[tokio::test]
    async fn empty_registry_means_no_competitors() {
        let (env, _controller) = FakeEnvironmentBuilder::new().build();
        assert!(other_active_agents(env.agents.as_ref()).await.unwrap().is_empty());
    }
}
