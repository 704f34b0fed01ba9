//! Local Reservation Ledger
//!
//! Per-node bookkeeping of students, book inventory and reservations. Nothing in here
//! crosses a node boundary: the coordinator is the only caller, and it decides when a
//! local failure must be escalated to peers.
//!
//! ## Core Concepts
//! - **Books** are value keys `(title, author)` with an availability count owned by this node.
//! - **Reservations** bind a student to a book with an allowed duration in days.
//! - **Pre-reservations** are tentative holds placed before a peer is asked for a copy.
//!   They are promoted with `confirm_external_reservation` or dropped with
//!   `remove_failed_external_reservation` before the coordinating call returns.
//!
//! ## Submodules
//! - **`types`**: Students, books and reservation records.
//! - **`error`**: Typed outcomes and failures, with the user-facing messages.
//! - **`service`**: The `Ledger` itself.
//! - **`loader`**: Flat-file loading of students and books at startup.

pub mod error;
pub mod loader;
pub mod service;
pub mod types;

#[cfg(test)]
mod tests;
