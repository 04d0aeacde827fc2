use std::io;
use std::net::Ipv4Addr;
use std::sync::atomic::{AtomicU16, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::net::UdpSocket;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use super::frame::{decode_length, parse_status};
use super::{BASE_PORT, PORT_RANGE};
use crate::domain::models::{ConnectionState, StatusMessage};
use crate::services::{ObserverId, ObserverRegistry};

const RECEIVE_TIMEOUT: Duration = Duration::from_millis(400);
const ERROR_BACKOFF: Duration = Duration::from_millis(100);
const STOP_TIMEOUT: Duration = Duration::from_millis(500);
const RECEIVE_BUFFER_LEN: usize = 65_536;

struct Listener {
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

/// Receives status broadcasts on the first free port in the listener range
pub struct BroadcastClient {
    base_port: u16,
    state: Arc<watch::Sender<ConnectionState>>,
    local_port: Arc<AtomicU16>,
    observers: Arc<ObserverRegistry<StatusMessage>>,
    listener: Mutex<Option<Listener>>,
}

impl BroadcastClient {
    pub fn new() -> Self {
        Self::with_base_port(BASE_PORT)
    }

    pub fn with_base_port(base_port: u16) -> Self {
        let (state, _) = watch::channel(ConnectionState::Disconnected);
        Self {
            base_port,
            state: Arc::new(state),
            local_port: Arc::new(AtomicU16::new(0)),
            observers: Arc::new(ObserverRegistry::new()),
            listener: Mutex::new(None),
        }
    }

    /// Spawn the receive task
    ///
    /// Must be called from within a tokio runtime. Calling it while a
    /// receive task is still running has no effect.
    pub fn start(&self) {
        let mut listener = self.listener.lock().unwrap_or_else(PoisonError::into_inner);
        if listener.as_ref().is_some_and(|l| !l.handle.is_finished()) {
            return;
        }

        self.state.send_replace(ConnectionState::Connecting);
        let cancel = CancellationToken::new();
        let handle = tokio::spawn(receive_loop(
            self.base_port,
            Arc::clone(&self.state),
            Arc::clone(&self.local_port),
            Arc::clone(&self.observers),
            cancel.clone(),
        ));

        *listener = Some(Listener { cancel, handle });
    }

    /// Stop the receive task, aborting it if it does not finish in time
    pub async fn stop(&self) {
        let listener = self
            .listener
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();

        if let Some(Listener { cancel, mut handle }) = listener {
            cancel.cancel();
            if tokio::time::timeout(STOP_TIMEOUT, &mut handle).await.is_err() {
                warn!("broadcast client did not stop in time, aborting");
                handle.abort();
            }
        }

        self.local_port.store(0, Ordering::Release);
        self.state.send_replace(ConnectionState::Disconnected);
    }

    /// Register a callback for received status messages
    pub fn subscribe<F>(&self, callback: F) -> ObserverId
    where
        F: Fn(&StatusMessage) + Send + Sync + 'static,
    {
        self.observers.subscribe(callback)
    }

    pub fn unsubscribe(&self, id: ObserverId) -> bool {
        self.observers.unsubscribe(id)
    }

    pub fn state(&self) -> ConnectionState {
        *self.state.borrow()
    }

    /// Receiver that observes every state change
    pub fn watch_state(&self) -> watch::Receiver<ConnectionState> {
        self.state.subscribe()
    }

    /// Wait until the client reaches `target`; returns `false` on timeout
    pub async fn wait_for_state(&self, target: ConnectionState, timeout: Duration) -> bool {
        let mut rx = self.state.subscribe();
        let reached = tokio::time::timeout(timeout, rx.wait_for(|state| *state == target))
            .await
            .is_ok_and(|changed| changed.is_ok());
        reached
    }

    /// Port the client is bound to while connected
    pub fn local_port(&self) -> Option<u16> {
        match self.local_port.load(Ordering::Acquire) {
            0 => None,
            port => Some(port),
        }
    }
}

impl Default for BroadcastClient {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for BroadcastClient {
    fn drop(&mut self) {
        let listener = self
            .listener
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(listener) = listener {
            listener.cancel.cancel();
        }
    }
}

enum Received {
    Datagram(usize),
    TimedOut,
    Failed(io::Error),
    Cancelled,
}

async fn receive(socket: &UdpSocket, buf: &mut [u8], cancel: &CancellationToken) -> Received {
    tokio::select! {
        () = cancel.cancelled() => Received::Cancelled,
        result = tokio::time::timeout(RECEIVE_TIMEOUT, socket.recv_from(buf)) => match result {
            Ok(Ok((len, _))) => Received::Datagram(len),
            Ok(Err(e)) => Received::Failed(e),
            Err(_) => Received::TimedOut,
        },
    }
}

async fn bind_first(base_port: u16) -> Option<UdpSocket> {
    for offset in 0..PORT_RANGE {
        let Some(port) = base_port.checked_add(offset) else {
            break;
        };
        match UdpSocket::bind((Ipv4Addr::LOCALHOST, port)).await {
            Ok(socket) => return Some(socket),
            Err(e) => debug!(port, error = %e, "listener port unavailable"),
        }
    }
    None
}

async fn receive_loop(
    base_port: u16,
    state: Arc<watch::Sender<ConnectionState>>,
    local_port: Arc<AtomicU16>,
    observers: Arc<ObserverRegistry<StatusMessage>>,
    cancel: CancellationToken,
) {
    let Some(socket) = bind_first(base_port).await else {
        warn!(
            base_port,
            range = PORT_RANGE,
            "no free listener port, broadcast client disconnected"
        );
        state.send_replace(ConnectionState::Disconnected);
        return;
    };

    let port = socket.local_addr().map(|addr| addr.port()).unwrap_or(0);
    local_port.store(port, Ordering::Release);
    state.send_replace(ConnectionState::Connected);
    info!(port, "broadcast client listening");

    let mut buf = vec![0u8; RECEIVE_BUFFER_LEN];
    loop {
        let expected = match receive(&socket, &mut buf, &cancel).await {
            Received::Cancelled => break,
            Received::TimedOut => continue,
            Received::Failed(e) => {
                error!(error = %e, "broadcast receive failed");
                if backoff(&cancel).await {
                    break;
                }
                continue;
            }
            Received::Datagram(len) => match decode_length(&buf[..len]) {
                Some(0) => {
                    debug!("termination frame received");
                    break;
                }
                Some(expected) => usize::from(expected),
                None => {
                    warn!(len, "skipping datagram with unexpected size");
                    continue;
                }
            },
        };

        match receive(&socket, &mut buf, &cancel).await {
            Received::Cancelled => break,
            Received::TimedOut => debug!(expected, "payload datagram timed out"),
            Received::Failed(e) => {
                error!(error = %e, "broadcast receive failed");
                if backoff(&cancel).await {
                    break;
                }
            }
            Received::Datagram(len) if len != expected => {
                warn!(len, expected, "payload length does not match prefix");
            }
            Received::Datagram(len) => match parse_status(&buf[..len]) {
                Ok(status) => observers.notify(&status),
                Err(e) => warn!(error = %e, "discarding malformed status message"),
            },
        }
    }

    local_port.store(0, Ordering::Release);
    state.send_replace(ConnectionState::Disconnected);
    debug!(port, "broadcast client stopped");
}

/// Sleep before retrying after a socket error; returns `true` if cancelled
async fn backoff(cancel: &CancellationToken) -> bool {
    tokio::select! {
        () = cancel.cancelled() => true,
        () = tokio::time::sleep(ERROR_BACKOFF) => false,
    }
}
