//! Datagram Transport Module
//!
//! Minimal request/response exchange over UDP: one send, one bounded receive, no retry.
//!
//! ## Components
//! - **`client`**: `PeerTransport`, the seam the coordinator probes peers through, and
//!   `UdpTransport`, its production implementation (fresh ephemeral socket per request,
//!   receive bounded by the configured probe timeout).
//! - **`listener`**: the inbound side. One task per node receives datagrams, hands them to
//!   a `DatagramHandler` and sends back whatever reply the handler produces.

pub mod client;
pub mod listener;
