//! Outbound transport to the relay

use std::sync::Arc;

use crate::relay::{RelayError, RelayHub};
use crate::ws::protocol::{ClientMsg, ConnId};

use super::SyncError;

/// A message-oriented connection to the relay
pub trait RelayLink {
    /// Whether sends can currently be delivered
    fn is_open(&self) -> bool;

    /// Deliver one message. Only called while `is_open` is true.
    fn send(&self, msg: &ClientMsg) -> Result<(), SyncError>;
}

/// Link to a relay hub in the same process
pub struct HubLink {
    hub: Arc<RelayHub>,
    id: ConnId,
}

impl HubLink {
    pub fn new(hub: Arc<RelayHub>, id: ConnId) -> Self {
        Self { hub, id }
    }

    pub fn id(&self) -> &ConnId {
        &self.id
    }

    /// Leave the relay; later sends are skipped
    pub fn close(&self) {
        self.hub.disconnect(&self.id);
    }
}

impl RelayLink for HubLink {
    fn is_open(&self) -> bool {
        self.hub.is_connected(&self.id)
    }

    fn send(&self, msg: &ClientMsg) -> Result<(), SyncError> {
        let text = serde_json::to_string(msg)?;
        self.hub.handle_text(&self.id, &text).map_err(|e| match e {
            RelayError::UnknownConnection(_) => SyncError::Closed,
            RelayError::Malformed(e) => SyncError::Encode(e),
        })
    }
}
