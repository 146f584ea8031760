use crate::{auth, commands, relay};
use anyhow::{Result, anyhow, bail};
use std::net::SocketAddr;
use tokio::net::{TcpListener, TcpStream};
use tracing::{error, info};

/// Socks5Server represents a SOCKS5 server and houses related
/// configuration data
pub struct Socks5Server {
    pub listen_addr: String,
    listener: Option<TcpListener>,
}

/// Socks5Server implementation block
impl Socks5Server {
    /// new is a constructor for the Socks5Server type
    pub fn new(listen_addr: impl Into<String>) -> Self {
        Self {
            listen_addr: listen_addr.into(),
            listener: None,
        }
    }

    /// bind to the listen address and return the bound address.
    /// Port 0 picks a free port
    pub async fn bind(&mut self) -> Result<SocketAddr> {
        if self.listener.is_some() {
            bail!("[ERR] {} is already bound", self.listen_addr);
        }

        // Instantiate tokio listener
        let listener = TcpListener::bind(&self.listen_addr).await?;
        let addr = listener.local_addr()?;

        // DEBUG
        info!("SOCKS5 proxy listening on {:?}", addr);

        self.listener = Some(listener);
        Ok(addr)
    }

    /// run accepts clients forever, one task per connection
    pub async fn run(&mut self) -> Result<()> {
        if self.listener.is_none() {
            self.bind().await?;
        }
        let listener = self
            .listener
            .take()
            .ok_or_else(|| anyhow!("[ERR] listener not bound"))?;

        loop {
            let (inbound, peer_addr) = match listener.accept().await {
                Ok(accepted) => accepted,
                Err(e) => {
                    error!("accept error: {}", e);
                    continue;
                }
            };

            tokio::spawn(async move {
                // DEBUG
                info!("new client: {}", peer_addr);

                if let Err(e) = handle_connection(inbound).await {
                    error!("connection error from {}: {}", peer_addr, e);
                }
            });
        }
    }
}

/// handle_connection runs negotiation, the request and the relay for one client.
/// Both streams are dropped, and so closed, on every return path
async fn handle_connection(mut stream: TcpStream) -> Result<()> {
    auth::negotiate(&mut stream).await?;

    let outbound = commands::handle_socks_request(&mut stream)
        .await
        .map_err(|e| anyhow!("[ERR] failed to handle socks request: {e}"))?;

    let from_client = relay::relay(stream, outbound).await;

    // DEBUG
    info!("connection closed: {} bytes from client", from_client);

    Ok(())
}
