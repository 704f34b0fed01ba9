//! Peer Directory Module
//!
//! Static mapping from institution name to UDP endpoint, derived once from the
//! federation configuration. Membership never changes at runtime.
//!
//! The directory keeps the full institution list (self included) in configuration
//! order. That order is the probe order of the reservation protocol, so earlier-listed
//! peers are always tried first.

pub mod service;
pub mod types;
