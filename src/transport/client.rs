use std::future::Future;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr};
use std::time::Duration;
use tokio::net::UdpSocket;

/// Receive buffer size.
pub const MAX_DATAGRAM_SIZE: usize = 65536;
/// Largest payload a single UDP/IPv4 datagram can carry.
pub const MAX_PAYLOAD_SIZE: usize = 65_507;

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("no reply from {endpoint} within {after:?}")]
    Timeout { endpoint: SocketAddr, after: Duration },

    #[error("reply from {endpoint} is not valid UTF-8")]
    InvalidUtf8 { endpoint: SocketAddr },
}

/// Sends one request to a peer and waits for its single reply.
pub trait PeerTransport: Send + Sync + 'static {
    fn request(
        &self,
        endpoint: SocketAddr,
        payload: &str,
    ) -> impl Future<Output = Result<String, TransportError>> + Send;
}

/// UDP request/response with an explicit bound on the wait for the reply.
#[derive(Debug, Clone)]
pub struct UdpTransport {
    timeout: Duration,
}

impl UdpTransport {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    async fn exchange(&self, endpoint: SocketAddr, payload: &str) -> Result<String, TransportError> {
        let socket = UdpSocket::bind(ephemeral_for(endpoint)).await?;
        socket.send_to(payload.as_bytes(), endpoint).await?;
        tracing::trace!("Sent {} bytes to {}", payload.len(), endpoint);

        let mut buf = vec![0u8; MAX_DATAGRAM_SIZE];
        let receive = async {
            loop {
                let (len, src) = socket.recv_from(&mut buf).await?;
                if src == endpoint {
                    return Ok::<usize, std::io::Error>(len);
                }
                tracing::debug!("Ignoring stray datagram from {} while waiting on {}", src, endpoint);
            }
        };

        let len = tokio::time::timeout(self.timeout, receive)
            .await
            .map_err(|_| TransportError::Timeout {
                endpoint,
                after: self.timeout,
            })??;

        String::from_utf8(buf[..len].to_vec()).map_err(|_| TransportError::InvalidUtf8 { endpoint })
    }
}

impl PeerTransport for UdpTransport {
    fn request(
        &self,
        endpoint: SocketAddr,
        payload: &str,
    ) -> impl Future<Output = Result<String, TransportError>> + Send {
        self.exchange(endpoint, payload)
    }
}

fn ephemeral_for(endpoint: SocketAddr) -> SocketAddr {
    let unspecified = match endpoint.ip() {
        IpAddr::V4(_) => IpAddr::V4(Ipv4Addr::UNSPECIFIED),
        IpAddr::V6(_) => IpAddr::V6(Ipv6Addr::UNSPECIFIED),
    };
    SocketAddr::new(unspecified, 0)
}
