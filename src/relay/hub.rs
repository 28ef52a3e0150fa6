//! Relay hub - connection table and fan-out

use std::collections::BTreeMap;

use dashmap::DashMap;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::ws::protocol::{ClientMsg, ConnId, PlayerEntry, Position, RelayMsg};

use super::RelayError;

/// Outbound frames buffered per connection before messages are dropped
pub const OUTBOUND_CAPACITY: usize = 256;

/// One live connection
struct Connection {
    tx: mpsc::Sender<String>,
    position: Position,
}

/// Message-forwarding hub. Holds no simulation state, only the player table.
pub struct RelayHub {
    connections: DashMap<ConnId, Connection>,
    outbound_capacity: usize,
}

impl RelayHub {
    pub fn new() -> Self {
        Self::with_capacity(OUTBOUND_CAPACITY)
    }

    pub fn with_capacity(outbound_capacity: usize) -> Self {
        Self {
            connections: DashMap::new(),
            outbound_capacity: outbound_capacity.max(1),
        }
    }

    /// Register a connection. The returned receiver yields the JSON frames
    /// to write to it, starting with `welcome` and the current player table.
    pub fn connect(&self) -> (ConnId, mpsc::Receiver<String>) {
        let id = ConnId::generate();
        let (tx, rx) = mpsc::channel(self.outbound_capacity);

        self.connections.insert(
            id.clone(),
            Connection {
                tx,
                position: Position::default(),
            },
        );

        self.send_to(&id, &RelayMsg::Welcome { id: id.clone() });
        self.send_to(
            &id,
            &RelayMsg::UpdatePlayers {
                players: self.players(),
            },
        );

        info!(conn_id = %id, connections = self.connections.len(), "Relay connection opened");
        (id, rx)
    }

    /// Remove a connection and tell everyone else
    pub fn disconnect(&self, id: &ConnId) {
        if self.connections.remove(id).is_none() {
            return;
        }
        info!(conn_id = %id, connections = self.connections.len(), "Relay connection closed");
        self.broadcast(&RelayMsg::UpdatePlayers {
            players: self.players(),
        });
    }

    pub fn is_connected(&self, id: &ConnId) -> bool {
        self.connections.contains_key(id)
    }

    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }

    /// Handle one text frame from `from`
    pub fn handle_text(&self, from: &ConnId, text: &str) -> Result<(), RelayError> {
        let msg: ClientMsg = serde_json::from_str(text)?;
        self.handle(from, msg)
    }

    pub fn handle(&self, from: &ConnId, msg: ClientMsg) -> Result<(), RelayError> {
        match msg {
            ClientMsg::UpdatePosition { position } => {
                match self.connections.get_mut(from) {
                    Some(mut conn) => conn.position = position,
                    None => return Err(RelayError::UnknownConnection(from.clone())),
                }
                self.broadcast(&RelayMsg::UpdatePlayers {
                    players: self.players(),
                });
            }
            other => {
                if !self.is_connected(from) {
                    return Err(RelayError::UnknownConnection(from.clone()));
                }
                if let Some(relayed) = RelayMsg::forwarded(from, other) {
                    self.broadcast(&relayed);
                }
            }
        }
        Ok(())
    }

    /// Snapshot of the player table
    pub fn players(&self) -> BTreeMap<ConnId, PlayerEntry> {
        self.connections
            .iter()
            .map(|entry| {
                (
                    entry.key().clone(),
                    PlayerEntry {
                        position: entry.value().position,
                    },
                )
            })
            .collect()
    }

    /// Send to every open connection
    fn broadcast(&self, msg: &RelayMsg) {
        let Some(text) = encode(msg) else {
            return;
        };

        let mut closed = Vec::new();
        for entry in self.connections.iter() {
            if !Self::push(entry.key(), &entry.value().tx, text.clone()) {
                closed.push(entry.key().clone());
            }
        }

        self.prune(closed);
    }

    fn send_to(&self, id: &ConnId, msg: &RelayMsg) {
        let Some(text) = encode(msg) else {
            return;
        };
        let tx = match self.connections.get(id) {
            Some(conn) => conn.tx.clone(),
            None => return,
        };
        if !Self::push(id, &tx, text) {
            self.prune(vec![id.clone()]);
        }
    }

    /// Drop writers that went away without a disconnect call and tell the
    /// rest. Each round removes at least one entry, so the recursion through
    /// `broadcast` ends.
    fn prune(&self, closed: Vec<ConnId>) {
        let mut removed = 0;
        for id in closed {
            if self.connections.remove(&id).is_some() {
                debug!(conn_id = %id, "Dropping connection with closed outbound queue");
                removed += 1;
            }
        }
        if removed == 0 {
            return;
        }
        self.broadcast(&RelayMsg::UpdatePlayers {
            players: self.players(),
        });
    }

    /// Queue a frame; returns false if the receiver is gone
    fn push(id: &ConnId, tx: &mpsc::Sender<String>, text: String) -> bool {
        match tx.try_send(text) {
            Ok(()) => true,
            Err(mpsc::error::TrySendError::Full(_)) => {
                warn!(conn_id = %id, "Outbound queue full, dropping message");
                true
            }
            Err(mpsc::error::TrySendError::Closed(_)) => false,
        }
    }
}

impl Default for RelayHub {
    fn default() -> Self {
        Self::new()
    }
}

fn encode(msg: &RelayMsg) -> Option<String> {
    match serde_json::to_string(msg) {
        Ok(text) => Some(text),
        Err(e) => {
            warn!(error = %e, "Failed to encode relay message");
            None
        }
    }
}
