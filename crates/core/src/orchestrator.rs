//! Privileged-context request handling.
//!
//! One request moves through `CHECKING_EXCLUSIVITY` and either stops at
//! `REJECTED` or proceeds `WIPING -> INSTALLING -> DONE`. The serve loop
//! handles one request per cycle, so two concurrent injects can never
//! interleave their wipe and install phases. The exclusivity check itself
//! stays a non-atomic check-then-act guard.

use futures::future::join_all;
use tracing::{debug, info, warn};
use warden_protocol::{
    CookieDescriptor, DisableResult, InjectResult, PrivilegedRequest, PrivilegedResponse,
};

use crate::boundary::BoundaryServer;
use crate::config::SessionScope;
use crate::env::Environment;
use crate::{gate, installer, wiper};

pub struct Orchestrator {
    env: Environment,
    scope: SessionScope,
}

impl Orchestrator {
    pub fn new(env: Environment, scope: SessionScope) -> Self {
        Self { env, scope }
    }

    /// Serve boundary requests until every relay is gone.
    ///
    /// Requests are handled strictly one at a time.
    pub async fn run(self, mut server: BoundaryServer) {
        while let Some((request, responder)) = server.next().await {
            let response = self.handle(request).await;
            responder.respond(response);
        }
        debug!(target: "warden.orchestrator", "boundary closed, serve loop ended");
    }

    /// Handle a single request to completion. Failures are folded into the
    /// response payload; nothing is thrown back across the boundary.
    pub async fn handle(&self, request: PrivilegedRequest) -> PrivilegedResponse {
        match request {
            PrivilegedRequest::SetCookies { cookies } => {
                PrivilegedResponse::Inject(self.inject(cookies).await)
            }
            PrivilegedRequest::DisableOtherAgents => {
                PrivilegedResponse::Disable(self.disable_other_agents().await)
            }
        }
    }

    async fn inject(&self, cookies: Vec<CookieDescriptor>) -> InjectResult {
        // CHECKING_EXCLUSIVITY: fresh registry snapshot on every request.
        let others = match gate::other_active_agents(self.env.agents.as_ref()).await {
            Ok(others) => others,
            Err(err) => return InjectResult::fail(err.to_string()),
        };
        if !others.is_empty() {
            let names: Vec<&str> = others.iter().map(|a| a.name.as_str()).collect();
            info!(target: "warden.orchestrator", ?names, "inject rejected: competing agents active");
            return InjectResult::fail(gate::EXCLUSIVITY_ERROR);
        }

        // WIPING: a prerequisite of every install, not transactional with it.
        if let Err(err) = wiper::clear_site_data(self.env.browsing_data.as_ref(), &self.scope.wipe_origins).await
        {
            return InjectResult::fail(format!("session wipe failed: {err}"));
        }

        // INSTALLING
        let report = installer::install_batch(self.env.cookies.as_ref(), &cookies).await;
        info!(
            target: "warden.orchestrator",
            installed = report.success_count,
            failed = report.errors.len(),
            "install batch finished"
        );
        report.into_result()
    }

    /// Deactivate every other active agent, concurrently and unordered.
    ///
    /// The count reports attempts: a deactivation that fails silently still
    /// counts, since the registry offers no per-item failure channel worth
    /// surfacing here.
    async fn disable_other_agents(&self) -> DisableResult {
        let others = match gate::other_active_agents(self.env.agents.as_ref()).await {
            Ok(others) => others,
            Err(err) => {
                warn!(target: "warden.orchestrator", error = %err, "agent enumeration failed");
                return DisableResult { success: false, count: 0 };
            }
        };

        let registry = &self.env.agents;
        let count = join_all(others.iter().map(|agent| async move {
            if let Err(err) = registry.set_enabled(&agent.id, false).await {
                warn!(target: "warden.orchestrator", id = %agent.id, error = %err, "deactivation failed");
            }
        }))
        .await
        .len();

        info!(target: "warden.orchestrator", count, "competing agents deactivated");
        DisableResult { success: true, count }
    }
}
