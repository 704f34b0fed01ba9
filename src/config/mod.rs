//! Federation Configuration
//!
//! Builds the single configuration object every component of a node is constructed from.
//! The configuration is read once at startup (TOML) and never mutated afterwards.
//!
//! ## Layout
//! - **Global properties**: the ordered `libraries` list, the UDP message delimiter,
//!   the host used for every peer datagram and the per-probe timeout.
//! - **Institution sections**: one table per library with its UDP port, record files
//!   and optional HTTP port for the client gateway.
//!
//! The order of `libraries` is significant: it is the probe order of the inter-library
//! reservation protocol and the aggregation order of the non-returners report.

pub mod types;
