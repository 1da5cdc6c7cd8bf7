use std::net::SocketAddr;

use anyhow::Context;
use tokio::net::TcpListener;
use tracing::{debug, info};

use crate::config::ServerConfig;
use crate::http::connection::Connection;
use crate::http::router::Router;

/// The bound server socket. Lives for the whole process.
pub struct Listener {
    inner: TcpListener,
    router: Router,
    max_request_bytes: usize,
}

impl Listener {
    /// Binds `bind_addr:port`. Failure here is fatal to startup.
    pub async fn bind(cfg: &ServerConfig) -> anyhow::Result<Self> {
        let addr = cfg.listen_addr();
        let inner = TcpListener::bind(&addr)
            .await
            .with_context(|| format!("failed to bind {}", addr))?;

        info!("Listening on {}", inner.local_addr()?);

        Ok(Self {
            inner,
            router: Router::new(cfg.hello_route),
            max_request_bytes: cfg.max_request_bytes,
        })
    }

    pub fn local_addr(&self) -> anyhow::Result<SocketAddr> {
        Ok(self.inner.local_addr()?)
    }

    /// Accepts connections forever, one task per connection.
    ///
    /// Accept errors and per-connection errors are dropped after a debug
    /// trace; the loop itself never returns under normal operation.
    pub async fn run(self) -> anyhow::Result<()> {
        loop {
            let (socket, peer) = match self.inner.accept().await {
                Ok(accepted) => accepted,
                Err(e) => {
                    debug!("Accept failed: {}", e);
                    continue;
                }
            };
            debug!("Accepted connection from {}", peer);

            let router = self.router;
            let max_request_bytes = self.max_request_bytes;
            tokio::spawn(async move {
                let mut conn =
                    Connection::new(socket, router).with_max_request_bytes(max_request_bytes);
                if let Err(e) = conn.run().await {
                    debug!("Connection from {} abandoned: {}", peer, e);
                }
            });
        }
    }
}

