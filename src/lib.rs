//! Federated Library Node Library
//!
//! This library crate defines the modules of one library node ("institution") in a
//! federation of independently administered libraries. It is the foundation for the
//! binary executable (`main.rs`).
//!
//! ## Architecture Modules
//! Leaves first:
//!
//! - **`config`**: The federation layout. Loads and validates the TOML file listing every
//!   institution, its ports and record files, the message delimiter and the probe timeout.
//! - **`directory`**: The static peer list, in configuration order, derived from `config`.
//! - **`ledger`**: The local bookkeeping of one institution: students, book copies,
//!   reservations and pre-reservations, plus the flat-file loader.
//! - **`transport`**: Datagram request/response over UDP, with an explicit timeout on
//!   the client side and a receive loop on the listener side.
//! - **`protocol`**: The delimiter-joined inter-node message format and the
//!   classification of peer replies.
//! - **`coordinator`**: The inter-node coordination engine. Escalates unavailable books
//!   to peers one at a time behind a pre-reservation, fans overdue reports out to the
//!   whole federation, and answers requests arriving from peers.
//! - **`gateway`**: The JSON-over-HTTP surface used by end users.
//! - **`node`**: Runtime wiring of one institution.

pub mod config;
pub mod coordinator;
pub mod directory;
pub mod gateway;
pub mod ledger;
pub mod node;
pub mod protocol;
pub mod transport;
