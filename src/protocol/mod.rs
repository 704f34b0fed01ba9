//! Inter-node Message Codec
//!
//! Defines the datagram format exchanged between institutions and the classification
//! of the plain-text replies.
//!
//! ## Wire Format
//! `<METHOD><delim><sender><delim><param1>...<delim><paramN>`, where the delimiter comes
//! from the configuration. Replies are not wrapped: they are the raw result message of
//! the responding ledger.

pub mod codec;
