//! WebSocket transport for the relay

pub mod handler;
pub mod protocol;
