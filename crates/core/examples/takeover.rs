// Session takeover walkthrough against the in-memory environment
//
// This example demonstrates:
// - Wiring the relay and orchestrator across the boundary channel
// - The exclusivity rejection and the disable-all remediation
// - A successful cookie injection
// - The watchdog revoking the session when a rival agent activates
//
// Note: everything runs against the fake environment; no browser is
// involved.

use std::sync::Arc;

use serde_json::json;
use tokio::sync::mpsc;
use warden::env::fake::FakeEnvironmentBuilder;
use warden::{Orchestrator, Relay, SessionScope, Watchdog, boundary};
use warden_protocol::{AgentEvent, AgentKind, AgentRecord, RequesterEvent};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt().init();

    let (env, controller) = FakeEnvironmentBuilder::new().self_id("warden").build();
    let scope = SessionScope::default();

    // Privileged context: orchestrator + watchdog.
    let (client, server) = boundary::channel();
    let client = Arc::new(client);
    tokio::spawn({
        let client = Arc::clone(&client);
        async move { client.run().await }
    });
    tokio::spawn(Orchestrator::new(env.clone(), scope.clone()).run(server));

    let (activation_tx, activation_rx) = mpsc::unbounded_channel::<AgentEvent>();
    tokio::spawn(Watchdog::new(env.clone(), scope.clone()).run(activation_rx));

    // Page-adjacent context: the relay.
    let (request_tx, request_rx) = mpsc::unbounded_channel();
    let (event_tx, mut event_rx) = mpsc::unbounded_channel();
    tokio::spawn(Relay::new(client, event_tx).run(request_rx));

    // A rival agent is installed and enabled.
    controller.install_agent(AgentRecord {
        id: "rival".into(),
        name: "Rival Agent".into(),
        kind: AgentKind::Agent,
        enabled: true,
    });

    let payload = json!({
        "cookies": [
            {"domain": ".chatgpt.com", "name": "sid", "value": "abc", "session": false, "expirationDate": 1999999999.0},
            {"domain": "chatgpt.com", "name": "csrf", "value": "tok", "session": true}
        ]
    });

    println!("1) Injecting while a rival agent is active...");
    request_tx.send(RequesterEvent::InjectCookies { detail: payload.clone() })?;
    println!("   -> {:?}\n", event_rx.recv().await.unwrap());

    println!("2) Disabling other agents...");
    request_tx.send(RequesterEvent::DisableOtherAgents)?;
    println!("   -> {:?}\n", event_rx.recv().await.unwrap());

    println!("3) Retrying the injection...");
    request_tx.send(RequesterEvent::InjectCookies { detail: payload })?;
    println!("   -> {:?}", event_rx.recv().await.unwrap());
    println!("   installed: {} cookies\n", controller.installs().len());

    println!("4) Rival agent re-activates; watchdog revokes the session...");
    let tab = controller.open_tab("https://chatgpt.com/c/1");
    activation_tx.send(AgentEvent {
        id: "rival".into(),
        name: "Rival Agent".into(),
        kind: AgentKind::Agent,
    })?;
    tokio::time::sleep(std::time::Duration::from_millis(50)).await;
    println!(
        "   resident cookies: {}, reloaded tabs: {:?}",
        controller.resident_cookies().len(),
        controller.reloaded().contains(&tab)
    );

    Ok(())
}
