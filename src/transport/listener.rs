use super::client::{MAX_DATAGRAM_SIZE, MAX_PAYLOAD_SIZE};

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::UdpSocket;
use tokio::task::JoinHandle;

/// Turns one inbound datagram into the reply to send back, if any.
///
/// Returning `None` drops the datagram silently: the sender simply times out.
pub trait DatagramHandler: Send + Sync + 'static {
    fn handle(&self, datagram: &str) -> Option<String>;
}

/// The inbound side of a node: receives requests from peers and answers them.
pub struct DatagramListener {
    socket: Arc<UdpSocket>,
}

impl DatagramListener {
    pub async fn bind(addr: SocketAddr) -> Result<Self> {
        let socket = UdpSocket::bind(addr).await?;
        tracing::info!("Datagram listener bound to {}", socket.local_addr()?);

        Ok(Self {
            socket: Arc::new(socket),
        })
    }

    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.socket.local_addr()?)
    }

    /// Runs the receive loop on its own task.
    pub fn spawn<H: DatagramHandler>(self, handler: Arc<H>) -> JoinHandle<()> {
        tokio::spawn(async move {
            self.receive_loop(handler).await;
        })
    }

    async fn receive_loop<H: DatagramHandler>(self, handler: Arc<H>) {
        let mut buf = vec![0u8; MAX_DATAGRAM_SIZE];

        loop {
            match self.socket.recv_from(&mut buf).await {
                Ok((len, src)) => match std::str::from_utf8(&buf[..len]) {
                    Ok(datagram) => {
                        tracing::debug!("Received datagram from {}: {}", src, datagram.trim());
                        if let Some(reply) = handler.handle(datagram) {
                            self.reply(&reply, src).await;
                        }
                    }
                    Err(e) => {
                        tracing::warn!("Dropping non UTF-8 datagram from {}: {}", src, e);
                    }
                },
                Err(e) => {
                    tracing::error!("Failed to receive UDP packet: {}", e);
                    tokio::time::sleep(Duration::from_millis(100)).await;
                }
            }
        }
    }

    async fn reply(&self, reply: &str, dst: SocketAddr) {
        if reply.len() > MAX_PAYLOAD_SIZE {
            tracing::warn!(
                "Reply to {} is {} bytes, larger than a datagram; dropping",
                dst,
                reply.len()
            );
            return;
        }

        if let Err(e) = self.socket.send_to(reply.as_bytes(), dst).await {
            tracing::warn!("Failed to send reply to {}: {}", dst, e);
        }
    }
}
