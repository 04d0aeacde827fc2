//! Loopback UDP status broadcast
//!
//! The supervisor sends each worker's output to ten consecutive loopback
//! ports; any number of listeners (up to ten) can each claim one of them.

pub mod client;
pub mod frame;
pub mod server;

use std::io;
use std::net::{Ipv4Addr, SocketAddr};
use thiserror::Error;

pub use client::BroadcastClient;
pub use frame::{decode_length, encode_frame, format_status, parse_status, Frame, FrameError};
pub use server::BroadcastServer;

/// First listener port
pub const BASE_PORT: u16 = 49_740;

/// Number of listener ports starting at [`BASE_PORT`]
pub const PORT_RANGE: u16 = 10;

/// Errors setting up the broadcast sender
#[derive(Debug, Error)]
pub enum BroadcastError {
    #[error("failed to bind UDP socket on port {port}: {source}")]
    Bind {
        port: u16,
        #[source]
        source: io::Error,
    },

    #[error("failed to configure UDP socket: {0}")]
    Configure(#[source] io::Error),
}

/// Loopback addresses for every listener port starting at `base_port`
pub fn destinations(base_port: u16) -> Vec<SocketAddr> {
    (0..PORT_RANGE)
        .filter_map(|offset| base_port.checked_add(offset))
        .map(|port| SocketAddr::from((Ipv4Addr::LOCALHOST, port)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_destinations_cover_port_range() {
        let ports: Vec<u16> = destinations(BASE_PORT).iter().map(SocketAddr::port).collect();
        assert_eq!(ports, (49_740..49_750).collect::<Vec<_>>());
    }

    #[test]
    fn test_destinations_stop_at_port_limit() {
        assert_eq!(destinations(u16::MAX - 2).len(), 3);
    }
}
