//! Relay server core - fans client events out to every connection

pub mod hub;

pub use hub::RelayHub;

use crate::ws::protocol::ConnId;

/// Reasons a client frame was not relayed
#[derive(Debug, thiserror::Error)]
pub enum RelayError {
    #[error("Malformed client message: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("Message from unknown connection {0}")]
    UnknownConnection(ConnId),
}
