use super::error::{LedgerError, Outcome};
use super::loader::{LoadError, load_books, load_students};
use super::types::{Book, Reservation, ReservationKey, ReservationKind, Student};

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use std::path::Path;

/// Bookkeeping of one institution.
///
/// Lock order when two tables are touched together: `books` before `reservations`.
pub struct Ledger {
    institution: String,
    students: DashMap<String, Student>,
    books: DashMap<Book, u32>,
    reservations: DashMap<ReservationKey, Reservation>,
}

impl Ledger {
    pub fn new(institution: impl Into<String>) -> Self {
        Self {
            institution: institution.into(),
            students: DashMap::new(),
            books: DashMap::new(),
            reservations: DashMap::new(),
        }
    }

    /// Creates a ledger populated from the institution's flat files.
    pub fn from_files(
        institution: &str,
        students_file: &Path,
        books_file: &Path,
    ) -> Result<Self, LoadError> {
        let ledger = Self::new(institution);

        for student in load_students(students_file, institution)? {
            if let Err(e) = ledger.create_account(student) {
                tracing::warn!("Skipping student record: {}", e);
            }
        }

        for (book, copies) in load_books(books_file)? {
            ledger.add_book(book, copies);
        }

        tracing::info!(
            "Loaded {} students and {} books for {}",
            ledger.students.len(),
            ledger.books.len(),
            institution
        );

        Ok(ledger)
    }

    pub fn institution(&self) -> &str {
        &self.institution
    }

    /// Adds `copies` to the availability of `book`, registering it if unknown.
    pub fn add_book(&self, book: Book, copies: u32) {
        let mut count = self.books.entry(book).or_insert(0);
        *count = count.saturating_add(copies);
    }

    pub fn available_copies(&self, book: &Book) -> Option<u32> {
        self.books.get(book).map(|count| *count)
    }

    pub fn has_account(&self, username: &str) -> bool {
        self.students.contains_key(username)
    }

    /// Reservation held by a local student for `book`, if any.
    pub fn reservation(&self, username: &str, book: &Book) -> Option<Reservation> {
        self.reservations
            .get(&self.local_key(username, book))
            .map(|entry| entry.value().clone())
    }

    /// Reservation handed out to a student of another institution.
    pub fn external_holder_reservation(
        &self,
        home: &str,
        username: &str,
        book: &Book,
    ) -> Option<Reservation> {
        let key = ReservationKey {
            home: home.to_string(),
            username: username.to_string(),
            book: book.clone(),
        };
        self.reservations.get(&key).map(|entry| entry.value().clone())
    }

    pub fn reservation_count(&self) -> usize {
        self.reservations.len()
    }

    pub fn create_account(&self, student: Student) -> Result<Outcome, LedgerError> {
        match self.students.entry(student.username.clone()) {
            Entry::Occupied(_) => Err(LedgerError::DuplicateAccount {
                username: student.username,
                institution: self.institution.clone(),
            }),
            Entry::Vacant(slot) => {
                let username = student.username.clone();
                slot.insert(student);
                Ok(Outcome::AccountCreated {
                    username,
                    institution: self.institution.clone(),
                })
            }
        }
    }

    /// Reserves a local copy for a local student.
    ///
    /// The book is checked before the account, so an unknown or exhausted book is reported
    /// as such even for an unknown student. `take_copy` checks the count again under the
    /// entry lock.
    pub fn reserve_book(
        &self,
        username: &str,
        password: &str,
        book: &Book,
    ) -> Result<Outcome, LedgerError> {
        match self.available_copies(book) {
            None => return Err(self.inexistent(book)),
            Some(0) => {
                return Err(LedgerError::NoCopiesAvailable {
                    book: book.clone(),
                    institution: self.institution.clone(),
                });
            }
            Some(_) => {}
        }

        self.authenticate(username, password)?;

        self.take_copy(self.local_key(username, book), ReservationKind::Local)
    }

    /// Reserves a local copy for a student of `requester`. The student has no account
    /// here, so no identity check is made.
    pub fn reserve_book_external(
        &self,
        username: &str,
        book: &Book,
        requester: &str,
    ) -> Result<Outcome, LedgerError> {
        let key = ReservationKey {
            home: requester.to_string(),
            username: username.to_string(),
            book: book.clone(),
        };

        self.take_copy(
            key,
            ReservationKind::OnBehalfOf {
                requester: requester.to_string(),
            },
        )
    }

    /// Places a pre-reservation for a local student against `external`.
    pub fn add_external_reservation_to_local_user(
        &self,
        username: &str,
        book: &Book,
        external: &str,
    ) -> Result<Outcome, LedgerError> {
        if !self.has_account(username) {
            return Err(self.unknown_student(username));
        }

        match self.reservations.entry(self.local_key(username, book)) {
            Entry::Occupied(existing) => match &existing.get().kind {
                ReservationKind::Pending { external } => Err(LedgerError::PreReservationPending {
                    username: username.to_string(),
                    book: book.clone(),
                    external: external.clone(),
                }),
                _ => Err(LedgerError::AlreadyReserved {
                    username: username.to_string(),
                    book: book.clone(),
                }),
            },
            Entry::Vacant(slot) => {
                slot.insert(Reservation::new(
                    username,
                    book.clone(),
                    ReservationKind::Pending {
                        external: external.to_string(),
                    },
                ));
                Ok(Outcome::PreReserved {
                    username: username.to_string(),
                    book: book.clone(),
                    external: external.to_string(),
                })
            }
        }
    }

    /// Promotes a pre-reservation to a confirmed reservation serviced by the peer it named.
    pub fn confirm_external_reservation(
        &self,
        username: &str,
        book: &Book,
    ) -> Result<Outcome, LedgerError> {
        let not_pending = || LedgerError::NoPendingReservation {
            username: username.to_string(),
            book: book.clone(),
        };

        let mut reservation = self
            .reservations
            .get_mut(&self.local_key(username, book))
            .ok_or_else(not_pending)?;

        let origin = match &reservation.kind {
            ReservationKind::Pending { external } => external.clone(),
            _ => return Err(not_pending()),
        };

        reservation.kind = ReservationKind::External {
            origin: origin.clone(),
        };

        Ok(Outcome::Confirmed {
            username: username.to_string(),
            book: book.clone(),
            origin,
        })
    }

    /// Drops the pre-reservation of the pair. Confirmed reservations are left alone,
    /// and calling this when nothing is pending is not an error.
    pub fn remove_failed_external_reservation(&self, username: &str, book: &Book) -> Outcome {
        let removed = self
            .reservations
            .remove_if(&self.local_key(username, book), |_, reservation| {
                reservation.is_pending()
            })
            .is_some();

        Outcome::Released {
            username: username.to_string(),
            book: book.clone(),
            removed,
        }
    }

    /// One `first last phone` line per local reservation held more than
    /// `num_days` days past its allowed duration. Empty when nobody is overdue.
    pub fn non_returners(&self, num_days: i32) -> String {
        self.non_returners_at(Utc::now(), num_days)
    }

    pub fn non_returners_at(&self, now: DateTime<Utc>, num_days: i32) -> String {
        let mut lines: Vec<(String, String, String)> = self
            .reservations
            .iter()
            .filter(|entry| entry.key().home == self.institution)
            .filter(|entry| !entry.value().is_pending())
            .filter(|entry| entry.value().days_overdue(now) > i64::from(num_days))
            .filter_map(|entry| {
                self.students.get(&entry.value().username).map(|student| {
                    (
                        student.last_name.clone(),
                        student.first_name.clone(),
                        student.phone.clone(),
                    )
                })
            })
            .collect();

        lines.sort();

        lines
            .into_iter()
            .map(|(last, first, phone)| format!("{} {} {}\n", first, last, phone))
            .collect()
    }

    /// Overwrites the allowed duration of every reservation the local student holds
    /// for a book with this title.
    pub fn set_duration(
        &self,
        username: &str,
        title: &str,
        days: i64,
    ) -> Result<Outcome, LedgerError> {
        let mut updated = 0usize;

        for mut entry in self.reservations.iter_mut() {
            let key = entry.key();
            if key.home == self.institution && key.username == username && key.book.title == title
            {
                entry.value_mut().duration_days = days;
                updated += 1;
            }
        }

        if updated == 0 {
            return Err(self.unknown_student(username));
        }

        Ok(Outcome::DurationSet {
            username: username.to_string(),
            title: title.to_string(),
            days,
        })
    }

    fn take_copy(&self, key: ReservationKey, kind: ReservationKind) -> Result<Outcome, LedgerError> {
        let Some(mut copies) = self.books.get_mut(&key.book) else {
            return Err(self.inexistent(&key.book));
        };

        if *copies == 0 {
            return Err(LedgerError::NoCopiesAvailable {
                book: key.book,
                institution: self.institution.clone(),
            });
        }

        match self.reservations.entry(key) {
            Entry::Occupied(existing) => Err(LedgerError::AlreadyReserved {
                username: existing.key().username.clone(),
                book: existing.key().book.clone(),
            }),
            Entry::Vacant(slot) => {
                *copies -= 1;
                let username = slot.key().username.clone();
                let book = slot.key().book.clone();
                slot.insert(Reservation::new(username.clone(), book.clone(), kind));

                Ok(Outcome::Reserved {
                    username,
                    book,
                    institution: self.institution.clone(),
                })
            }
        }
    }

    pub fn authenticate(&self, username: &str, password: &str) -> Result<(), LedgerError> {
        let student = self
            .students
            .get(username)
            .ok_or_else(|| self.unknown_student(username))?;

        if student.password != password {
            return Err(LedgerError::InvalidCredentials {
                username: username.to_string(),
            });
        }

        Ok(())
    }

    fn local_key(&self, username: &str, book: &Book) -> ReservationKey {
        ReservationKey {
            home: self.institution.clone(),
            username: username.to_string(),
            book: book.clone(),
        }
    }

    fn inexistent(&self, book: &Book) -> LedgerError {
        LedgerError::InexistentBook {
            book: book.clone(),
            institution: self.institution.clone(),
        }
    }

    fn unknown_student(&self, username: &str) -> LedgerError {
        LedgerError::UnknownStudent {
            username: username.to_string(),
            institution: self.institution.clone(),
        }
    }
}
