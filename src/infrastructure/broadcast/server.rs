use std::net::{Ipv4Addr, SocketAddr};
use tokio::net::UdpSocket;
use tokio::sync::Mutex;
use tracing::{debug, trace};

use super::frame::encode_frame;
use super::{destinations, BroadcastError, BASE_PORT};

/// Sends status frames to every listener port on the loopback interface
///
/// Delivery is best-effort: nobody has to be listening, and send failures
/// are only traced.
pub struct BroadcastServer {
    socket: Mutex<Option<UdpSocket>>,
    destinations: Vec<SocketAddr>,
}

impl BroadcastServer {
    /// Bind a sender targeting the default port range
    pub async fn start() -> Result<Self, BroadcastError> {
        Self::start_with_base(BASE_PORT).await
    }

    /// Bind a sender targeting `base_port..base_port + PORT_RANGE`
    pub async fn start_with_base(base_port: u16) -> Result<Self, BroadcastError> {
        let socket = UdpSocket::bind((Ipv4Addr::LOCALHOST, 0))
            .await
            .map_err(|source| BroadcastError::Bind { port: 0, source })?;
        socket.set_broadcast(true).map_err(BroadcastError::Configure)?;

        let destinations = destinations(base_port);
        debug!(
            local = ?socket.local_addr().ok(),
            base_port,
            targets = destinations.len(),
            "broadcast server started"
        );

        Ok(Self {
            socket: Mutex::new(Some(socket)),
            destinations,
        })
    }

    /// Send `message` to every destination
    ///
    /// The prefix and payload of one message are never interleaved with
    /// another write. Does nothing once the server is stopped.
    pub async fn write(&self, message: &str) {
        let frame = encode_frame(message);
        let guard = self.socket.lock().await;
        let Some(socket) = guard.as_ref() else {
            return;
        };

        for destination in &self.destinations {
            if let Err(e) = socket.send_to(&frame.prefix, destination).await {
                trace!(%destination, error = %e, "prefix send failed");
            }
            if let Err(e) = socket.send_to(&frame.payload, destination).await {
                trace!(%destination, error = %e, "payload send failed");
            }
        }
    }

    /// Close the socket
    pub async fn stop(&self) {
        if self.socket.lock().await.take().is_some() {
            debug!("broadcast server stopped");
        }
    }

    pub async fn is_running(&self) -> bool {
        self.socket.lock().await.is_some()
    }
}
