//! Ledger Module Tests
//!
//! Validates single-node bookkeeping: accounts, the local reservation path, the
//! pre-reservation lifecycle (hold, confirm, release) and the overdue report.
//!
//! ## Test Scopes
//! - **Accounts**: duplicate detection and credential checks.
//! - **Reservations**: availability accounting and the failure classes the coordinator escalates on.
//! - **Pre-reservations**: at most one per pair, idempotent release, promotion keeps the record.
//! - **Reporting**: non-returners lines and forced overdue through `set_duration`.
//! - **Loader**: flat-file parsing.

#[cfg(test)]
mod tests {
    use crate::ledger::error::{BOOK_RESERVED_MARKER, LedgerError, Outcome};
    use crate::ledger::loader::{LoadError, load_books, load_students};
    use crate::ledger::service::Ledger;
    use crate::ledger::types::{Book, ReservationKind, Student};
    use chrono::{Duration, Utc};
    use std::io::Write;

    fn student(username: &str, first: &str, last: &str, phone: &str) -> Student {
        Student {
            username: username.to_string(),
            password: "secret".to_string(),
            institution: "Concordia".to_string(),
            first_name: first.to_string(),
            last_name: last.to_string(),
            email: format!("{}@example.org", username),
            phone: phone.to_string(),
        }
    }

    fn ledger() -> Ledger {
        let ledger = Ledger::new("Concordia");
        ledger
            .create_account(student("alice", "Alice", "Martin", "514-555-0101"))
            .unwrap();
        ledger
            .create_account(student("bob", "Bob", "Tremblay", "514-555-0102"))
            .unwrap();
        ledger.add_book(Book::new("Dune", "Herbert"), 2);
        ledger.add_book(Book::new("Emma", "Austen"), 0);
        ledger
    }

    // ============================================================
    // ACCOUNT TESTS
    // ============================================================

    #[test]
    fn test_duplicate_account_rejected() {
        let ledger = ledger();

        let result = ledger.create_account(student("alice", "Other", "Person", "000"));

        assert!(matches!(result, Err(LedgerError::DuplicateAccount { .. })));
    }

    #[test]
    fn test_account_created_message() {
        let ledger = ledger();

        let outcome = ledger
            .create_account(student("carol", "Carol", "Roy", "111"))
            .unwrap();

        assert_eq!(outcome.to_string(), "Account created: carol at Concordia");
        assert!(ledger.has_account("carol"));
    }

    // ============================================================
    // LOCAL RESERVATION TESTS
    // ============================================================

    #[test]
    fn test_reserve_book_decrements_availability() {
        let ledger = ledger();
        let dune = Book::new("Dune", "Herbert");

        let outcome = ledger.reserve_book("alice", "secret", &dune).unwrap();

        assert!(outcome.to_string().contains(BOOK_RESERVED_MARKER));
        assert_eq!(ledger.available_copies(&dune), Some(1));

        let reservation = ledger.reservation("alice", &dune).unwrap();
        assert_eq!(reservation.kind, ReservationKind::Local);
        assert_eq!(reservation.duration_days, 14);
    }

    #[test]
    fn test_reserve_unknown_book_is_inexistent() {
        let ledger = ledger();

        let err = ledger
            .reserve_book("alice", "secret", &Book::new("Ulysses", "Joyce"))
            .unwrap_err();

        assert!(matches!(err, LedgerError::InexistentBook { .. }));
        assert!(err.is_book_unavailable());
    }

    #[test]
    fn test_reserve_without_copies_is_no_copies() {
        let ledger = ledger();

        let err = ledger
            .reserve_book("alice", "secret", &Book::new("Emma", "Austen"))
            .unwrap_err();

        assert!(matches!(err, LedgerError::NoCopiesAvailable { .. }));
        assert!(err.is_book_unavailable());
    }

    #[test]
    fn test_unknown_book_reported_before_unknown_student() {
        let ledger = ledger();

        let err = ledger
            .reserve_book("ghost", "secret", &Book::new("Ulysses", "Joyce"))
            .unwrap_err();

        assert!(matches!(err, LedgerError::InexistentBook { .. }));
    }

    #[test]
    fn test_exhausted_book_reported_before_unknown_student() {
        let ledger = ledger();

        let err = ledger
            .reserve_book("ghost", "secret", &Book::new("Emma", "Austen"))
            .unwrap_err();

        assert!(matches!(err, LedgerError::NoCopiesAvailable { .. }));
        assert!(err.is_book_unavailable());
    }

    #[test]
    fn test_reserve_unknown_student_fails() {
        let ledger = ledger();

        let err = ledger
            .reserve_book("ghost", "secret", &Book::new("Dune", "Herbert"))
            .unwrap_err();

        assert!(matches!(err, LedgerError::UnknownStudent { .. }));
        assert!(!err.is_book_unavailable());
    }

    #[test]
    fn test_reserve_wrong_password_fails() {
        let ledger = ledger();

        let err = ledger
            .reserve_book("alice", "wrong", &Book::new("Dune", "Herbert"))
            .unwrap_err();

        assert!(matches!(err, LedgerError::InvalidCredentials { .. }));
    }

    #[test]
    fn test_reserve_same_book_twice_fails_without_taking_copy() {
        let ledger = ledger();
        let dune = Book::new("Dune", "Herbert");

        ledger.reserve_book("alice", "secret", &dune).unwrap();
        let err = ledger.reserve_book("alice", "secret", &dune).unwrap_err();

        assert!(matches!(err, LedgerError::AlreadyReserved { .. }));
        assert_eq!(ledger.available_copies(&dune), Some(1));
    }

    #[test]
    fn test_reserve_external_skips_account_check() {
        let ledger = ledger();
        let dune = Book::new("Dune", "Herbert");

        let outcome = ledger
            .reserve_book_external("stranger", &dune, "McGill")
            .unwrap();

        assert!(outcome.to_string().contains(BOOK_RESERVED_MARKER));
        assert_eq!(ledger.available_copies(&dune), Some(1));

        let held = ledger
            .external_holder_reservation("McGill", "stranger", &dune)
            .unwrap();
        assert_eq!(
            held.kind,
            ReservationKind::OnBehalfOf {
                requester: "McGill".to_string()
            }
        );
        assert!(ledger.reservation("stranger", &dune).is_none());
    }

    #[test]
    fn test_external_username_does_not_collide_with_local() {
        let ledger = ledger();
        let dune = Book::new("Dune", "Herbert");

        ledger.reserve_book("alice", "secret", &dune).unwrap();
        let outcome = ledger.reserve_book_external("alice", &dune, "McGill");

        assert!(outcome.is_ok());
        assert_eq!(ledger.available_copies(&dune), Some(0));
    }

    #[test]
    fn test_reserve_external_failure_messages() {
        let ledger = ledger();

        let missing = ledger
            .reserve_book_external("stranger", &Book::new("Ulysses", "Joyce"), "McGill")
            .unwrap_err();
        let empty = ledger
            .reserve_book_external("stranger", &Book::new("Emma", "Austen"), "McGill")
            .unwrap_err();

        assert!(missing.to_string().starts_with("Inexistent book"));
        assert!(empty.to_string().starts_with("No copies available"));
    }

    // ============================================================
    // PRE-RESERVATION TESTS
    // ============================================================

    #[test]
    fn test_pre_reservation_requires_local_student() {
        let ledger = ledger();

        let err = ledger
            .add_external_reservation_to_local_user("ghost", &Book::new("Emma", "Austen"), "McGill")
            .unwrap_err();

        assert!(matches!(err, LedgerError::UnknownStudent { .. }));
        assert_eq!(ledger.reservation_count(), 0);
    }

    #[test]
    fn test_single_pre_reservation_per_pair() {
        let ledger = ledger();
        let emma = Book::new("Emma", "Austen");

        ledger
            .add_external_reservation_to_local_user("alice", &emma, "McGill")
            .unwrap();
        let err = ledger
            .add_external_reservation_to_local_user("alice", &emma, "Montreal")
            .unwrap_err();

        assert_eq!(
            err,
            LedgerError::PreReservationPending {
                username: "alice".to_string(),
                book: emma.clone(),
                external: "McGill".to_string(),
            }
        );
    }

    #[test]
    fn test_pre_reservation_does_not_touch_inventory() {
        let ledger = ledger();
        let emma = Book::new("Emma", "Austen");

        ledger
            .add_external_reservation_to_local_user("alice", &emma, "McGill")
            .unwrap();

        assert_eq!(ledger.available_copies(&emma), Some(0));
    }

    #[test]
    fn test_confirm_promotes_pre_reservation() {
        let ledger = ledger();
        let emma = Book::new("Emma", "Austen");

        ledger
            .add_external_reservation_to_local_user("alice", &emma, "McGill")
            .unwrap();
        let outcome = ledger.confirm_external_reservation("alice", &emma).unwrap();

        assert!(matches!(outcome, Outcome::Confirmed { ref origin, .. } if origin == "McGill"));
        let reservation = ledger.reservation("alice", &emma).unwrap();
        assert_eq!(
            reservation.kind,
            ReservationKind::External {
                origin: "McGill".to_string()
            }
        );
    }

    #[test]
    fn test_confirm_without_pre_reservation_fails() {
        let ledger = ledger();
        let dune = Book::new("Dune", "Herbert");
        ledger.reserve_book("alice", "secret", &dune).unwrap();

        let err = ledger.confirm_external_reservation("alice", &dune).unwrap_err();

        assert!(matches!(err, LedgerError::NoPendingReservation { .. }));
    }

    #[test]
    fn test_remove_failed_external_reservation_is_idempotent() {
        let ledger = ledger();
        let emma = Book::new("Emma", "Austen");

        ledger
            .add_external_reservation_to_local_user("alice", &emma, "McGill")
            .unwrap();

        let first = ledger.remove_failed_external_reservation("alice", &emma);
        let second = ledger.remove_failed_external_reservation("alice", &emma);

        assert!(matches!(first, Outcome::Released { removed: true, .. }));
        assert!(matches!(second, Outcome::Released { removed: false, .. }));
        assert!(ledger.reservation("alice", &emma).is_none());
    }

    #[test]
    fn test_remove_failed_keeps_confirmed_reservation() {
        let ledger = ledger();
        let dune = Book::new("Dune", "Herbert");
        ledger.reserve_book("alice", "secret", &dune).unwrap();

        let outcome = ledger.remove_failed_external_reservation("alice", &dune);

        assert!(matches!(outcome, Outcome::Released { removed: false, .. }));
        assert!(ledger.reservation("alice", &dune).is_some());
    }

    // ============================================================
    // NON-RETURNERS & DURATION TESTS
    // ============================================================

    #[test]
    fn test_non_returners_empty_when_nothing_overdue() {
        let ledger = ledger();
        ledger
            .reserve_book("alice", "secret", &Book::new("Dune", "Herbert"))
            .unwrap();

        assert_eq!(ledger.non_returners(0), "");
    }

    #[test]
    fn test_negative_duration_forces_overdue() {
        let ledger = ledger();
        ledger
            .reserve_book("alice", "secret", &Book::new("Dune", "Herbert"))
            .unwrap();

        ledger.set_duration("alice", "Dune", -1).unwrap();

        assert_eq!(ledger.non_returners(0), "Alice Martin 514-555-0101\n");
        assert_eq!(ledger.non_returners(1), "");
    }

    #[test]
    fn test_extreme_durations_do_not_overflow() {
        let ledger = ledger();
        let dune = Book::new("Dune", "Herbert");
        ledger.reserve_book("alice", "secret", &dune).unwrap();
        ledger.reserve_book("bob", "secret", &dune).unwrap();

        ledger.set_duration("alice", "Dune", i64::MIN).unwrap();
        ledger.set_duration("bob", "Dune", i64::MAX).unwrap();

        assert_eq!(ledger.non_returners(0), "Alice Martin 514-555-0101\n");
        assert_eq!(
            ledger.non_returners_at(Utc::now() + Duration::days(365), i32::MIN),
            "Alice Martin 514-555-0101\n"
        );
    }

    #[test]
    fn test_one_line_per_overdue_reservation() {
        let ledger = ledger();
        ledger.add_book(Book::new("Ulysses", "Joyce"), 1);
        ledger
            .reserve_book("alice", "secret", &Book::new("Dune", "Herbert"))
            .unwrap();
        ledger
            .reserve_book("alice", "secret", &Book::new("Ulysses", "Joyce"))
            .unwrap();

        ledger.set_duration("alice", "Dune", -2).unwrap();
        ledger.set_duration("alice", "Ulysses", -2).unwrap();

        assert_eq!(
            ledger.non_returners(0),
            "Alice Martin 514-555-0101\nAlice Martin 514-555-0101\n"
        );
    }

    #[test]
    fn test_non_returners_after_elapsed_time() {
        let ledger = ledger();
        let dune = Book::new("Dune", "Herbert");
        ledger.reserve_book("alice", "secret", &dune).unwrap();
        ledger.reserve_book("bob", "secret", &dune).unwrap();

        let later = Utc::now() + Duration::days(20);

        assert_eq!(
            ledger.non_returners_at(later, 3),
            "Alice Martin 514-555-0101\nBob Tremblay 514-555-0102\n"
        );
        assert_eq!(ledger.non_returners_at(later, 10), "");
    }

    #[test]
    fn test_pending_and_foreign_reservations_not_reported() {
        let ledger = ledger();
        let dune = Book::new("Dune", "Herbert");
        ledger
            .add_external_reservation_to_local_user("alice", &Book::new("Emma", "Austen"), "McGill")
            .unwrap();
        ledger.reserve_book_external("bob", &dune, "McGill").unwrap();

        let later = Utc::now() + Duration::days(60);

        assert_eq!(ledger.non_returners_at(later, 0), "");
    }

    #[test]
    fn test_confirmed_external_reservation_is_reported() {
        let ledger = ledger();
        let emma = Book::new("Emma", "Austen");
        ledger
            .add_external_reservation_to_local_user("bob", &emma, "McGill")
            .unwrap();
        ledger.confirm_external_reservation("bob", &emma).unwrap();
        ledger.set_duration("bob", "Emma", -5).unwrap();

        assert_eq!(ledger.non_returners(2), "Bob Tremblay 514-555-0102\n");
    }

    #[test]
    fn test_set_duration_unknown_student() {
        let ledger = ledger();

        let err = ledger.set_duration("ghost", "any", -1).unwrap_err();

        assert!(matches!(err, LedgerError::UnknownStudent { .. }));
    }

    #[test]
    fn test_set_duration_requires_matching_title() {
        let ledger = ledger();
        ledger
            .reserve_book("alice", "secret", &Book::new("Dune", "Herbert"))
            .unwrap();

        let err = ledger.set_duration("alice", "Emma", 3).unwrap_err();

        assert!(matches!(err, LedgerError::UnknownStudent { .. }));
    }

    // ============================================================
    // LOADER TESTS
    // ============================================================

    #[test]
    fn test_load_students_and_books() {
        let mut students = tempfile::NamedTempFile::new().unwrap();
        writeln!(students, "# username,password,first,last,email,phone").unwrap();
        writeln!(students, "alice,pw,Alice,Martin,alice@example.org,514-555-0101").unwrap();
        writeln!(students).unwrap();
        writeln!(students, "bob , pw2 ,Bob,Tremblay,bob@example.org,514-555-0102").unwrap();

        let mut books = tempfile::NamedTempFile::new().unwrap();
        writeln!(books, "Dune,Herbert,3").unwrap();
        writeln!(books, "Emma,Austen,0").unwrap();

        let loaded = load_students(students.path(), "Concordia").unwrap();
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded[1].username, "bob");
        assert_eq!(loaded[1].password, "pw2");
        assert_eq!(loaded[1].institution, "Concordia");

        let inventory = load_books(books.path()).unwrap();
        assert_eq!(inventory, vec![
            (Book::new("Dune", "Herbert"), 3),
            (Book::new("Emma", "Austen"), 0),
        ]);

        let ledger = Ledger::from_files("Concordia", students.path(), books.path()).unwrap();
        assert!(ledger.has_account("alice"));
        assert_eq!(ledger.available_copies(&Book::new("Dune", "Herbert")), Some(3));
    }

    #[test]
    fn test_load_books_rejects_bad_count() {
        let mut books = tempfile::NamedTempFile::new().unwrap();
        writeln!(books, "Dune,Herbert,many").unwrap();

        let result = load_books(books.path());

        assert!(matches!(result, Err(LoadError::Malformed { line: 1, .. })));
    }

    #[test]
    fn test_load_students_rejects_wrong_field_count() {
        let mut students = tempfile::NamedTempFile::new().unwrap();
        writeln!(students, "alice,pw,Alice").unwrap();

        let result = load_students(students.path(), "Concordia");

        assert!(matches!(result, Err(LoadError::Malformed { .. })));
    }
}
