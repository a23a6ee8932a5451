//! Correlation layer across the relay/privileged isolation boundary.
//!
//! The two contexts share no memory; they exchange [`BoundaryRequest`] /
//! [`BoundaryResponse`] envelopes over a pair of channels. This module
//! handles:
//! - Generating unique request ids
//! - Correlating responses with pending requests
//! - Surfacing a dead privileged context as a transport failure
//! - Dropping replies silently when the requesting side is gone
//!
//! # Message Flow
//!
//! 1. The relay calls [`BoundaryClient::call`] with a request payload
//! 2. The client generates a unique id and registers a oneshot channel
//! 3. The envelope is sent to the privileged context
//! 4. The orchestrator pulls it via [`BoundaryServer::next`] and replies
//!    through the paired [`Responder`]
//! 5. The client's dispatch loop correlates the reply by id and completes
//!    the oneshot
//!
//! A response whose requester has since been destroyed has nowhere to go
//! and is dropped without error; the orchestrator's work still ran to
//! completion.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};

use tokio::sync::{Mutex, mpsc, oneshot};
use warden_protocol::{BoundaryRequest, BoundaryResponse, PrivilegedRequest, PrivilegedResponse};

use crate::error::{Error, Result};

/// Create a connected client/server pair.
///
/// The client's dispatch loop must be running ([`BoundaryClient::run`],
/// spawned in a background task) before replies can be delivered.
pub fn channel() -> (BoundaryClient, BoundaryServer) {
    let (request_tx, request_rx) = mpsc::unbounded_channel();
    let (response_tx, response_rx) = mpsc::unbounded_channel();

    let client = BoundaryClient {
        last_id: AtomicU32::new(0),
        pending: Arc::new(Mutex::new(HashMap::new())),
        request_tx,
        response_rx: Mutex::new(Some(response_rx)),
    };
    let server = BoundaryServer { request_rx, response_tx };

    (client, server)
}

/// Relay-side endpoint of the boundary.
pub struct BoundaryClient {
    /// Sequential request id counter.
    last_id: AtomicU32,
    /// Pending reply channels keyed by request id.
    pending: Arc<Mutex<HashMap<u32, oneshot::Sender<PrivilegedResponse>>>>,
    request_tx: mpsc::UnboundedSender<BoundaryRequest>,
    response_rx: Mutex<Option<mpsc::UnboundedReceiver<BoundaryResponse>>>,
}

impl BoundaryClient {
    /// Send one request across the boundary and await exactly one reply.
    pub async fn call(&self, payload: PrivilegedRequest) -> Result<PrivilegedResponse> {
        let id = self.last_id.fetch_add(1, Ordering::SeqCst);

        let (tx, rx) = oneshot::channel();
        self.pending.lock().await.insert(id, tx);

        if self.request_tx.send(BoundaryRequest { id, payload }).is_err() {
            self.pending.lock().await.remove(&id);
            return Err(Error::Transport("privileged context unreachable".to_string()));
        }

        rx.await.map_err(|_| Error::ChannelClosed)
    }

    /// Run the reply dispatch loop until the privileged context hangs up.
    ///
    /// Spawn this in a background task; it may only be called once.
    pub async fn run(&self) {
        let mut response_rx = self
            .response_rx
            .lock()
            .await
            .take()
            .expect("run() can only be called once");

        while let Some(response) = response_rx.recv().await {
            let Some(tx) = self.pending.lock().await.remove(&response.id) else {
                tracing::debug!(target: "warden.boundary", id = response.id, "reply without pending request; dropped");
                continue;
            };
            // The caller may have been destroyed mid-flight; dropping the
            // reply is the contract, not an error.
            let _ = tx.send(response.payload);
        }

        tracing::debug!(target: "warden.boundary", "dispatch loop ended (privileged context closed)");
    }
}

/// Privileged-side endpoint of the boundary.
pub struct BoundaryServer {
    request_rx: mpsc::UnboundedReceiver<BoundaryRequest>,
    response_tx: mpsc::UnboundedSender<BoundaryResponse>,
}

impl BoundaryServer {
    /// Next request, paired with the responder for its reply. Returns
    /// `None` once every client is gone.
    pub async fn next(&mut self) -> Option<(PrivilegedRequest, Responder)> {
        let BoundaryRequest { id, payload } = self.request_rx.recv().await?;
        Some((payload, Responder { id, response_tx: self.response_tx.clone() }))
    }
}

/// One-shot reply handle for a single boundary request.
pub struct Responder {
    id: u32,
    response_tx: mpsc::UnboundedSender<BoundaryResponse>,
}

impl Responder {
    /// Send the reply. A vanished relay context makes this a silent no-op.
    pub fn respond(self, payload: PrivilegedResponse) {
        let _ = self.response_tx.send(BoundaryResponse { id: self.id, payload });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use warden_protocol::{DisableResult, InjectResult};

    #[tokio::test]
    async fn round_trip_correlates_by_id() {
        let (client, mut server) = channel();
        let client = Arc::new(client);

        let dispatch = Arc::clone(&client);
        tokio::spawn(async move { dispatch.run().await });

        tokio::spawn(async move {
            while let Some((request, responder)) = server.next().await {
                let payload = match request {
                    PrivilegedRequest::SetCookies { cookies } => PrivilegedResponse::Inject(
                        InjectResult::ok_with(format!("{} cookies", cookies.len())),
                    ),
                    PrivilegedRequest::DisableOtherAgents => {
                        PrivilegedResponse::Disable(DisableResult { success: true, count: 0 })
                    }
                };
                responder.respond(payload);
            }
        });

        let first = client.call(PrivilegedRequest::SetCookies { cookies: vec![] }).await.unwrap();
        assert_eq!(first, PrivilegedResponse::Inject(InjectResult::ok_with("0 cookies")));

        let second = client.call(PrivilegedRequest::DisableOtherAgents).await.unwrap();
        assert_eq!(
            second,
            PrivilegedResponse::Disable(DisableResult { success: true, count: 0 })
        );
    }

    #[tokio::test]
    async fn dead_server_is_a_transport_failure() {
        let (client, server) = channel();
        drop(server);

        let err = client.call(PrivilegedRequest::DisableOtherAgents).await.unwrap_err();
        assert!(matches!(err, Error::Transport(_)));
        assert!(err.to_string().contains("privileged context unreachable"));
    }

    #[tokio::test]
    async fn reply_for_vanished_caller_is_dropped_silently() {
        let (client, mut server) = channel();
        let client = Arc::new(client);

        let dispatch = Arc::clone(&client);
        tokio::spawn(async move { dispatch.run().await });

        // Start a call and abandon it before the reply lands.
        let caller = Arc::clone(&client);
        let pending = tokio::spawn(async move {
            caller.call(PrivilegedRequest::DisableOtherAgents).await
        });
        let (_, responder) = server.next().await.unwrap();
        pending.abort();
        let _ = pending.await;

        // Responding must not panic or error even though nobody is waiting.
        responder.respond(PrivilegedResponse::Disable(DisableResult { success: true, count: 1 }));

        // The channel stays usable for the next caller.
        let caller = Arc::clone(&client);
        let next = tokio::spawn(async move { caller.call(PrivilegedRequest::DisableOtherAgents).await });
        let (_, responder) = server.next().await.unwrap();
        responder.respond(PrivilegedResponse::Disable(DisableResult { success: true, count: 2 }));
        assert_eq!(
            next.await.unwrap().unwrap(),
            PrivilegedResponse::Disable(DisableResult { success: true, count: 2 })
        );
    }
}
