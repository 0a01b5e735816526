//! Live-reload notification server

use crate::config::constants::DEFAULT_LIVE_RELOAD_PORT;
use crate::error::LiveReloadError;
use serde_json::json;
use std::net::SocketAddr;
use tokio::io::AsyncWriteExt;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{OnceCell, broadcast};
use tracing::{debug, error, info};

/// Bind settings for the live-reload listener
#[derive(Clone, Debug)]
pub struct LiveReloadSettings {
    pub host: String,
    pub port: u16,
}

impl Default for LiveReloadSettings {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: DEFAULT_LIVE_RELOAD_PORT,
        }
    }
}

/// Handle to the running server
#[derive(Clone, Debug)]
pub struct LiveReloadHandle {
    addr: SocketAddr,
    refresh_tx: broadcast::Sender<String>,
}

impl LiveReloadHandle {
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Tell every connected client to reload the given channel
    pub fn refresh(&self, channel: &str) {
        let message = json!({ "command": "reload", "path": channel }).to_string();
        // send only fails when nobody is connected, which is fine
        if self.refresh_tx.send(message).is_ok() {
            debug!("Refresh signalled for {}", channel);
        }
    }
}

/// Lazily started live-reload server
///
/// `start` is memoized: the first call binds and spawns the accept loop, and
/// every later or concurrent call resolves to the same handle. There is no
/// shutdown; the server lives until the process exits.
pub struct LiveReload {
    settings: LiveReloadSettings,
    cell: OnceCell<LiveReloadHandle>,
}

impl LiveReload {
    pub fn new(settings: LiveReloadSettings) -> Self {
        Self {
            settings,
            cell: OnceCell::new(),
        }
    }

    pub async fn start(&self) -> Result<&LiveReloadHandle, LiveReloadError> {
        self.cell
            .get_or_try_init(|| async {
                let addr = format!("{}:{}", self.settings.host, self.settings.port);
                let listener =
                    TcpListener::bind(&addr)
                        .await
                        .map_err(|source| LiveReloadError::Bind {
                            addr: addr.clone(),
                            source,
                        })?;
                let local = listener
                    .local_addr()
                    .map_err(|source| LiveReloadError::Bind { addr, source })?;

                let (refresh_tx, _) = broadcast::channel(16);
                let tx = refresh_tx.clone();
                tokio::spawn(accept_loop(listener, tx));

                info!("Live reload listening on {}", local);
                Ok(LiveReloadHandle {
                    addr: local,
                    refresh_tx,
                })
            })
            .await
    }
}

async fn accept_loop(listener: TcpListener, refresh_tx: broadcast::Sender<String>) {
    loop {
        match listener.accept().await {
            Ok((stream, peer)) => {
                debug!("Live reload client connected: {}", peer);
                tokio::spawn(forward_refreshes(stream, refresh_tx.subscribe()));
            }
            Err(e) => {
                error!("Live reload accept error: {}", e);
            }
        }
    }
}

/// Push refresh messages to one client as newline-delimited JSON until it
/// disconnects or falls behind
async fn forward_refreshes(mut stream: TcpStream, mut refresh_rx: broadcast::Receiver<String>) {
    loop {
        let message = match refresh_rx.recv().await {
            Ok(message) => message,
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                debug!("Live reload client lagged by {} refreshes, dropping", skipped);
                break;
            }
            Err(broadcast::error::RecvError::Closed) => break,
        };

        if stream.write_all(message.as_bytes()).await.is_err()
            || stream.write_all(b"\n").await.is_err()
        {
            break;
        }
    }

    debug!("Live reload client disconnected");
}
