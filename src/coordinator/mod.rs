//! Coordination Engine
//!
//! Owns every cross-node decision of an institution. A node is both initiator and
//! responder of the same protocol: the public operations below start coordination, and
//! the `DatagramHandler` impl answers the peers that started it elsewhere.
//!
//! ## Protocols
//! - **Inter-library reservation**: local attempt first; only an unknown book or an empty
//!   shelf escalates. Peers are then probed one at a time in directory order. Before each
//!   probe a pre-reservation is recorded locally; the first peer that answers with a
//!   reservation wins and the hold is promoted, every other outcome rolls the hold back.
//! - **Non-returners fan-out**: the local report is always produced; only the institution
//!   the request was addressed to asks the others, and they never forward it further.
//!
//! ## Submodules
//! - **`service`**: the `Coordinator`.
//! - **`locks`**: per (student, book) serialization of the pre-reservation window.
//! - **`types`**: typed results of the reservation protocol.

pub mod locks;
pub mod service;
pub mod types;
