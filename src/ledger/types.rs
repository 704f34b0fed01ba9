use chrono::{DateTime, Utc};
use std::fmt;

/// Loan length given to every new reservation.
pub const DEFAULT_DURATION_DAYS: i64 = 14;

/// A book is identified by its title and author, there is no surrogate id.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Book {
    pub title: String,
    pub author: String,
}

impl Book {
    pub fn new(title: impl Into<String>, author: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            author: author.into(),
        }
    }
}

impl fmt::Display for Book {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "'{}' by {}", self.title, self.author)
    }
}

/// A student account, owned by its home institution.
#[derive(Debug, Clone)]
pub struct Student {
    pub username: String,
    pub password: String,
    pub institution: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
}

/// How a reservation came to exist at this node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReservationKind {
    /// Local student, local copy.
    Local,
    /// Local student, waiting for `external` to confirm a copy.
    Pending { external: String },
    /// Local student, copy serviced by `origin`.
    External { origin: String },
    /// Student of `requester`, local copy handed out through the inter-library protocol.
    OnBehalfOf { requester: String },
}

/// Key of the reservation table. The holder's home institution is part of the key
/// because usernames are only unique per institution.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ReservationKey {
    pub home: String,
    pub username: String,
    pub book: Book,
}

#[derive(Debug, Clone)]
pub struct Reservation {
    pub username: String,
    pub book: Book,
    pub kind: ReservationKind,
    pub reserved_at: DateTime<Utc>,
    /// Allowed loan length. May be negative to force an overdue state.
    pub duration_days: i64,
}

impl Reservation {
    pub fn new(username: impl Into<String>, book: Book, kind: ReservationKind) -> Self {
        Self {
            username: username.into(),
            book,
            kind,
            reserved_at: Utc::now(),
            duration_days: DEFAULT_DURATION_DAYS,
        }
    }

    /// Days past the allowed duration at `now`. Negative while the loan is still running.
    pub fn days_overdue(&self, now: DateTime<Utc>) -> i64 {
        (now - self.reserved_at)
            .num_days()
            .saturating_sub(self.duration_days)
    }

    pub fn is_pending(&self) -> bool {
        matches!(self.kind, ReservationKind::Pending { .. })
    }
}
