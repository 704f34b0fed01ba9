use super::locks::PairLocks;
use super::types::InterLibraryResult;
use crate::directory::service::PeerDirectory;
use crate::directory::types::Peer;
use crate::ledger::error::{LedgerError, Outcome};
use crate::ledger::service::Ledger;
use crate::ledger::types::{Book, Student};
use crate::protocol::codec::{Envelope, InterNodeRequest, MessageCodec, ReplyOutcome};
use crate::transport::client::PeerTransport;
use crate::transport::listener::DatagramHandler;

use std::sync::Arc;
use tracing::Instrument;
use uuid::Uuid;

/// Closes every segment of the non-returners report.
const SEGMENT_TERMINATOR: &str = "......";

/// Cross-node coordinator of one institution.
pub struct Coordinator<T> {
    ledger: Arc<Ledger>,
    directory: Arc<PeerDirectory>,
    codec: MessageCodec,
    transport: T,
    pair_locks: PairLocks,
}

impl<T: PeerTransport> Coordinator<T> {
    pub fn new(
        ledger: Arc<Ledger>,
        directory: Arc<PeerDirectory>,
        codec: MessageCodec,
        transport: T,
    ) -> Self {
        Self {
            ledger,
            directory,
            codec,
            transport,
            pair_locks: PairLocks::new(),
        }
    }

    pub fn institution(&self) -> &str {
        self.directory.local_name()
    }

    pub fn ledger(&self) -> &Arc<Ledger> {
        &self.ledger
    }

    pub fn directory(&self) -> &Arc<PeerDirectory> {
        &self.directory
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn create_account(&self, student: Student) -> Result<Outcome, LedgerError> {
        let result = self.ledger.create_account(student);
        tracing::info!("createAccount result: {}", message_of(&result));
        result
    }

    pub fn reserve_book(
        &self,
        username: &str,
        password: &str,
        book: &Book,
    ) -> Result<Outcome, LedgerError> {
        let result = self.ledger.reserve_book(username, password, book);
        tracing::info!("reserveBook result: {}", message_of(&result));
        result
    }

    pub fn set_duration(
        &self,
        username: &str,
        title: &str,
        days: i64,
    ) -> Result<Outcome, LedgerError> {
        let result = self.ledger.set_duration(username, title, days);
        tracing::info!("setDuration result: {}", message_of(&result));
        result
    }

    /// Reserves `book` locally, or from the first peer able to supply it.
    pub async fn reserve_inter_library(
        &self,
        username: &str,
        password: &str,
        book: &Book,
    ) -> InterLibraryResult {
        let span = tracing::info_span!(
            "reserve_inter_library",
            attempt = %Uuid::new_v4(),
            institution = %self.institution(),
            username = %username,
        );

        let result = async {
            match self.ledger.reserve_book(username, password, book) {
                Ok(outcome) => InterLibraryResult::Local(outcome),
                Err(e) if e.is_book_unavailable() => {
                    // Unknown students are turned away by the pre-reservation itself.
                    if let Err(denied @ LedgerError::InvalidCredentials { .. }) =
                        self.ledger.authenticate(username, password)
                    {
                        return InterLibraryResult::Rejected(denied);
                    }
                    tracing::debug!("{}; asking other institutions", e);
                    self.probe_peers(username, book).await
                }
                Err(e) => InterLibraryResult::Rejected(e),
            }
        }
        .instrument(span)
        .await;

        tracing::info!("reserveInterLibrary result: {}", result);
        result
    }

    /// Sequential probe loop. The pair lock is held for the whole loop so an identical
    /// request cannot place a second pre-reservation against the same peers meanwhile.
    async fn probe_peers(&self, username: &str, book: &Book) -> InterLibraryResult {
        let _pair = self.pair_locks.acquire(username, book).await;

        for peer in self.directory.others() {
            let hold = match self.ledger.add_external_reservation_to_local_user(
                username,
                book,
                &peer.institution,
            ) {
                Ok(_) => PreReservation::new(&self.ledger, username, book, &peer.institution),
                Err(e) => {
                    tracing::debug!(
                        "Skipping {}: pre-reservation not recorded ({})",
                        peer.institution,
                        e
                    );
                    continue;
                }
            };
            tracing::debug!(
                "Pre-reservation of book [{}] for user [{}] on library [{}]",
                book,
                username,
                peer.institution
            );

            if let Some(reply) = self.request_reservation(peer, username, book).await {
                hold.commit();
                return InterLibraryResult::Remote {
                    institution: peer.institution.clone(),
                    reply,
                };
            }
            // `hold` drops here and rolls the pre-reservation back.
        }

        InterLibraryResult::Exhausted
    }

    /// Asks one peer for a copy. `Some` carries the peer's confirmation; every other
    /// outcome, including silence, is `None`.
    async fn request_reservation(&self, peer: &Peer, username: &str, book: &Book) -> Option<String> {
        let envelope = Envelope {
            sender: self.institution().to_string(),
            request: InterNodeRequest::ReserveInterLibrary {
                username: username.to_string(),
                title: book.title.clone(),
                author: book.author.clone(),
            },
        };

        let payload = match self.codec.encode(&envelope) {
            Ok(payload) => payload,
            Err(e) => {
                tracing::warn!("Cannot encode request for {}: {}", peer.institution, e);
                return None;
            }
        };

        tracing::debug!(
            "Calling reserveInterLibrary() from {} on {}",
            self.institution(),
            peer.endpoint
        );

        match self.transport.request(peer.endpoint, &payload).await {
            Ok(reply) => match ReplyOutcome::classify(&reply) {
                ReplyOutcome::Reserved => Some(reply.trim().to_string()),
                outcome => {
                    tracing::debug!(
                        "{} declined ({:?}): {}",
                        peer.institution,
                        outcome,
                        reply.trim()
                    );
                    None
                }
            },
            Err(e) => {
                tracing::warn!("No usable reply from {}: {}", peer.institution, e);
                None
            }
        }
    }

    /// Overdue report for the federation when `target_institution` is this node,
    /// otherwise only this node's segment.
    pub async fn non_returners(&self, target_institution: &str, num_days: i32) -> String {
        let mut report = self.local_segment(num_days);

        if self.directory.is_local(target_institution) {
            let envelope = Envelope {
                sender: self.institution().to_string(),
                request: InterNodeRequest::GetNonReturners { num_days },
            };

            match self.codec.encode(&envelope) {
                Ok(payload) => {
                    for peer in self.directory.others() {
                        tracing::debug!(
                            "Calling getNonRetuners() from {} on {}",
                            self.institution(),
                            peer.endpoint
                        );
                        match self.transport.request(peer.endpoint, &payload).await {
                            Ok(segment) => report.push_str(&segment),
                            Err(e) => {
                                tracing::warn!(
                                    "No non-returners report from {}: {}",
                                    peer.institution,
                                    e
                                );
                            }
                        }
                    }
                }
                Err(e) => tracing::warn!("Cannot encode non-returners request: {}", e),
            }
        }

        tracing::info!(
            "Got non-returners for: institution = {}, numDays = {}",
            target_institution,
            num_days
        );
        report
    }

    /// `"\n<name>: <report>......"`, with the terminator on its own line when the
    /// report is empty.
    fn local_segment(&self, num_days: i32) -> String {
        let report = self.ledger.non_returners(num_days);
        if report.is_empty() {
            format!("\n{}: \n{}", self.institution(), SEGMENT_TERMINATOR)
        } else {
            format!("\n{}: {}{}", self.institution(), report, SEGMENT_TERMINATOR)
        }
    }

    /// Responder side of the protocol. Relayed requests are answered locally only.
    pub fn respond(&self, envelope: Envelope) -> String {
        match envelope.request {
            InterNodeRequest::ReserveInterLibrary {
                username,
                title,
                author,
            } => {
                let book = Book::new(title, author);
                let result = self
                    .ledger
                    .reserve_book_external(&username, &book, &envelope.sender);
                tracing::info!(
                    "Reservation for {} of {} requested by {}: {}",
                    username,
                    book,
                    envelope.sender,
                    message_of(&result)
                );
                message_of(&result)
            }
            InterNodeRequest::GetNonReturners { num_days } => {
                tracing::debug!("Non-returners requested by {}", envelope.sender);
                self.local_segment(num_days)
            }
        }
    }
}

impl<T: PeerTransport> DatagramHandler for Coordinator<T> {
    fn handle(&self, datagram: &str) -> Option<String> {
        match self.codec.decode(datagram) {
            Ok(envelope) => Some(self.respond(envelope)),
            Err(e) => {
                tracing::warn!("Ignoring unparseable datagram: {}", e);
                None
            }
        }
    }
}

/// A recorded pre-reservation. Unless committed, dropping it removes the record again,
/// including when the owning future is cancelled mid-probe.
struct PreReservation<'a> {
    ledger: &'a Ledger,
    username: &'a str,
    book: &'a Book,
    external: &'a str,
    committed: bool,
}

impl<'a> PreReservation<'a> {
    fn new(ledger: &'a Ledger, username: &'a str, book: &'a Book, external: &'a str) -> Self {
        Self {
            ledger,
            username,
            book,
            external,
            committed: false,
        }
    }

    fn commit(mut self) {
        self.committed = true;
        if let Err(e) = self
            .ledger
            .confirm_external_reservation(self.username, self.book)
        {
            tracing::error!(
                "Peer {} reserved {} for {} but the local hold is gone: {}",
                self.external,
                self.book,
                self.username,
                e
            );
        }
    }
}

impl Drop for PreReservation<'_> {
    fn drop(&mut self) {
        if self.committed {
            return;
        }

        let outcome = self
            .ledger
            .remove_failed_external_reservation(self.username, self.book);
        tracing::debug!(
            "Reverting pre-reservation of book [{}] for user [{}] on library [{}]: {}",
            self.book,
            self.username,
            self.external,
            outcome
        );
    }
}

fn message_of(result: &Result<Outcome, LedgerError>) -> String {
    match result {
        Ok(outcome) => outcome.to_string(),
        Err(e) => e.to_string(),
    }
}
