//! Snapshot and event types for the environment's agent registry.

use serde::{Deserialize, Serialize};

/// Kind of installable unit in the host environment. Only `Agent` carries
/// the privileged capabilities the exclusivity rules care about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentKind {
    Agent,
    Theme,
    App,
}

/// Read-only snapshot of one installed privileged agent.
///
/// Snapshots are taken fresh from the registry on every check; callers must
/// not cache them across mutating operations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentRecord {
    pub id: String,
    pub name: String,
    pub kind: AgentKind,
    pub enabled: bool,
}

/// Activation notice from the registry's event stream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentEvent {
    pub id: String,
    pub name: String,
    pub kind: AgentKind,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_serializes_snake_case() {
        assert_eq!(serde_json::to_string(&AgentKind::Agent).unwrap(), "\"agent\"");
        assert_eq!(serde_json::to_string(&AgentKind::Theme).unwrap(), "\"theme\"");
    }
}
