//! Ledger outcomes and failures.
//!
//! Internally every ledger operation returns a typed `Result<Outcome, LedgerError>`.
//! The `Display` impls below are the only place the human-readable strings live; they
//! are what end users see and what travels back in inter-node replies.

use super::types::Book;
use std::fmt;

/// Fragment present in every successful reservation message.
pub const BOOK_RESERVED_MARKER: &str = "Book reserved";
/// Fragment present when the book is unknown at a node.
pub const INEXISTENT_BOOK_MARKER: &str = "Inexistent book";
/// Fragment present when the book is known but has no copies left.
pub const NO_COPIES_MARKER: &str = "No copies available";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LedgerError {
    #[error("Account already exists: {username} at {institution}")]
    DuplicateAccount {
        username: String,
        institution: String,
    },

    #[error("Unknown student: {username} at {institution}")]
    UnknownStudent {
        username: String,
        institution: String,
    },

    #[error("Invalid credentials for {username}")]
    InvalidCredentials { username: String },

    #[error("Inexistent book: {book} at {institution}")]
    InexistentBook { book: Book, institution: String },

    #[error("No copies available: {book} at {institution}")]
    NoCopiesAvailable { book: Book, institution: String },

    #[error("Book already reserved: {book} for {username}")]
    AlreadyReserved { username: String, book: Book },

    #[error("Reservation of {book} for {username} is awaiting confirmation from {external}")]
    PreReservationPending {
        username: String,
        book: Book,
        external: String,
    },

    #[error("No pending reservation of {book} for {username}")]
    NoPendingReservation { username: String, book: Book },
}

impl LedgerError {
    /// Failures that justify asking the other institutions for a copy.
    pub fn is_book_unavailable(&self) -> bool {
        matches!(
            self,
            Self::InexistentBook { .. } | Self::NoCopiesAvailable { .. }
        )
    }
}

/// Successful ledger operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    AccountCreated {
        username: String,
        institution: String,
    },
    Reserved {
        username: String,
        book: Book,
        institution: String,
    },
    PreReserved {
        username: String,
        book: Book,
        external: String,
    },
    Confirmed {
        username: String,
        book: Book,
        origin: String,
    },
    Released {
        username: String,
        book: Book,
        removed: bool,
    },
    DurationSet {
        username: String,
        title: String,
        days: i64,
    },
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AccountCreated {
                username,
                institution,
            } => write!(f, "Account created: {} at {}", username, institution),
            Self::Reserved {
                username,
                book,
                institution,
            } => write!(
                f,
                "{}: {} for {} at {}",
                BOOK_RESERVED_MARKER, book, username, institution
            ),
            Self::PreReserved {
                username,
                book,
                external,
            } => write!(
                f,
                "Pre-reserved: {} for {} pending confirmation from {}",
                book, username, external
            ),
            Self::Confirmed {
                username,
                book,
                origin,
            } => write!(
                f,
                "Inter-library reservation confirmed: {} for {} from {}",
                book, username, origin
            ),
            Self::Released {
                username,
                book,
                removed,
            } => {
                if *removed {
                    write!(f, "Pre-reservation removed: {} for {}", book, username)
                } else {
                    write!(f, "No pre-reservation to remove: {} for {}", book, username)
                }
            }
            Self::DurationSet {
                username,
                title,
                days,
            } => write!(
                f,
                "Duration set: '{}' for {} to {} days",
                title, username, days
            ),
        }
    }
}
