//! Relay protocol message definitions
//! These are the JSON wire types exchanged between clients and the relay

use std::collections::BTreeMap;
use std::fmt;

use glam::Vec3;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Connection identifier assigned by the relay
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConnId(pub String);

impl ConnId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }
}

impl fmt::Display for ConnId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// `{x, y, z}` vector as it appears on the wire
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Position {
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }
}

impl From<Vec3> for Position {
    fn from(v: Vec3) -> Self {
        Self {
            x: v.x,
            y: v.y,
            z: v.z,
        }
    }
}

impl From<Position> for Vec3 {
    fn from(p: Position) -> Self {
        Vec3::new(p.x, p.y, p.z)
    }
}

/// Messages sent from client to relay
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ClientMsg {
    /// Local player moved
    UpdatePosition { position: Position },

    /// Ask every client to materialize an enemy
    #[serde(rename_all = "camelCase")]
    SpawnZombie {
        position: Position,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        zombie_id: Option<Uuid>,
    },

    /// Local player fired
    Shoot {
        position: Position,
        direction: Position,
    },

    /// Local player killed an enemy
    #[serde(rename_all = "camelCase")]
    ZombieKilled {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        zombie_id: Option<Uuid>,
    },
}

/// Messages sent from relay to clients
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum RelayMsg {
    /// First message on a new connection
    Welcome { id: ConnId },

    /// Full table of connected players
    UpdatePlayers {
        players: BTreeMap<ConnId, PlayerEntry>,
    },

    #[serde(rename_all = "camelCase")]
    SpawnZombie {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        from: Option<ConnId>,
        position: Position,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        zombie_id: Option<Uuid>,
    },

    Shoot {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        from: Option<ConnId>,
        position: Position,
        direction: Position,
    },

    #[serde(rename_all = "camelCase")]
    ZombieKilled {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        from: Option<ConnId>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        zombie_id: Option<Uuid>,
    },
}

impl RelayMsg {
    /// Stamp a client event with its sender for fan-out.
    /// Returns `None` for messages the relay answers itself.
    pub fn forwarded(from: &ConnId, msg: ClientMsg) -> Option<Self> {
        let from = Some(from.clone());
        match msg {
            ClientMsg::UpdatePosition { .. } => None,
            ClientMsg::SpawnZombie {
                position,
                zombie_id,
            } => Some(Self::SpawnZombie {
                from,
                position,
                zombie_id,
            }),
            ClientMsg::Shoot {
                position,
                direction,
            } => Some(Self::Shoot {
                from,
                position,
                direction,
            }),
            ClientMsg::ZombieKilled { zombie_id } => Some(Self::ZombieKilled { from, zombie_id }),
        }
    }
}

/// One row of the relay's player table
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PlayerEntry {
    pub position: Position,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn client_messages_use_camel_case_tags() {
        let msg = ClientMsg::UpdatePosition {
            position: Vec3::new(1.0, 0.5, -2.0).into(),
        };
        let value = serde_json::to_value(&msg).unwrap();
        assert_eq!(
            value,
            json!({"type": "updatePosition", "position": {"x": 1.0, "y": 0.5, "z": -2.0}})
        );

        let killed = ClientMsg::ZombieKilled {
            zombie_id: Some(Uuid::nil()),
        };
        let value = serde_json::to_value(&killed).unwrap();
        assert_eq!(value["type"], "zombieKilled");
        assert_eq!(value["zombieId"], Uuid::nil().to_string());
    }

    #[test]
    fn bare_kill_notice_parses() {
        let msg: ClientMsg = serde_json::from_str(r#"{"type":"zombieKilled"}"#).unwrap();
        assert_eq!(msg, ClientMsg::ZombieKilled { zombie_id: None });

        let relayed: RelayMsg = serde_json::from_str(r#"{"type":"zombieKilled"}"#).unwrap();
        assert_eq!(
            relayed,
            RelayMsg::ZombieKilled {
                from: None,
                zombie_id: None
            }
        );
    }

    #[test]
    fn update_players_accepts_foreign_ids() {
        let raw = r#"{"type":"updatePlayers","players":{"k3j9x0a1b":{"position":{"x":1,"y":2,"z":3}}}}"#;
        let msg: RelayMsg = serde_json::from_str(raw).unwrap();
        match msg {
            RelayMsg::UpdatePlayers { players } => {
                let entry = players[&ConnId("k3j9x0a1b".to_string())];
                assert_eq!(Vec3::from(entry.position), Vec3::new(1.0, 2.0, 3.0));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn unknown_and_malformed_messages_fail_to_parse() {
        assert!(serde_json::from_str::<ClientMsg>(r#"{"type":"teleport"}"#).is_err());
        assert!(serde_json::from_str::<ClientMsg>(r#"{"type":"shoot","position":{}}"#).is_err());
        assert!(serde_json::from_str::<ClientMsg>("not json").is_err());
    }

    #[test]
    fn forwarded_stamps_sender() {
        let from = ConnId("abc".to_string());
        let shot = ClientMsg::Shoot {
            position: Position::default(),
            direction: Vec3::NEG_Z.into(),
        };
        match RelayMsg::forwarded(&from, shot) {
            Some(RelayMsg::Shoot { from: Some(id), .. }) => assert_eq!(id, from),
            other => panic!("unexpected {other:?}"),
        }
        let update = ClientMsg::UpdatePosition {
            position: Position::default(),
        };
        assert!(RelayMsg::forwarded(&from, update).is_none());
    }
}
