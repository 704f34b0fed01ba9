use crate::ledger::error::{LedgerError, Outcome};
use std::fmt;

/// Message returned when no institution could supply the book.
pub const INTER_LIBRARY_FAILURE: &str = "Unable to reserve inter-library";

/// Result of `reserve_inter_library`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InterLibraryResult {
    /// Served from the local shelf, no peer contacted.
    Local(Outcome),
    /// Served by `institution`; `reply` is that institution's confirmation.
    Remote { institution: String, reply: String },
    /// Local failure that does not justify asking peers.
    Rejected(LedgerError),
    /// Every peer was tried and none could supply the book.
    Exhausted,
}

impl InterLibraryResult {
    pub fn is_reserved(&self) -> bool {
        matches!(self, Self::Local(_) | Self::Remote { .. })
    }
}

impl fmt::Display for InterLibraryResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Local(outcome) => write!(f, "{}", outcome),
            Self::Remote { reply, .. } => f.write_str(reply),
            Self::Rejected(err) => write!(f, "{}", err),
            Self::Exhausted => f.write_str(INTER_LIBRARY_FAILURE),
        }
    }
}
