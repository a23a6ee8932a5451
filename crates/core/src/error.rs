//! Error types shared across the relay and privileged contexts.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// The privileged context hung up or was never reachable.
    #[error("{0}")]
    Transport(String),

    /// The reply channel closed before a response arrived.
    #[error("response channel closed before a reply arrived")]
    ChannelClosed,

    /// An environment-provided call (store, registry, tabs, browsing data)
    /// reported a failure.
    #[error("{0}")]
    Environment(String),
}

impl Error {
    pub fn environment(message: impl Into<String>) -> Self {
        Self::Environment(message.into())
    }
}
