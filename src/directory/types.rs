use std::net::SocketAddr;

/// One institution of the federation and the endpoint its listener is bound to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Peer {
    pub institution: String,
    pub endpoint: SocketAddr,
}
