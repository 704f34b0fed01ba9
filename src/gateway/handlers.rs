use axum::{
    Json,
    extract::{Extension, Query},
    http::StatusCode,
};
use std::sync::Arc;

use super::protocol::{
    CreateAccountRequest, MessageResponse, NonReturnersQuery, ReserveRequest, SetDurationRequest,
};
use crate::coordinator::service::Coordinator;
use crate::coordinator::types::InterLibraryResult;
use crate::ledger::error::{LedgerError, Outcome};
use crate::ledger::types::{Book, Student};
use crate::transport::client::PeerTransport;

type Reply = (StatusCode, Json<MessageResponse>);

pub async fn handle_create_account<T: PeerTransport>(
    Extension(coordinator): Extension<Arc<Coordinator<T>>>,
    Json(req): Json<CreateAccountRequest>,
) -> Reply {
    let institution = coordinator.institution().to_string();

    if let Some(requested) = &req.educational_institution
        && *requested != institution
    {
        tracing::warn!(
            "Refusing account for {}: belongs to {}, not {}",
            req.username,
            requested,
            institution
        );
        return (
            StatusCode::BAD_REQUEST,
            Json(MessageResponse::new(format!(
                "Wrong institution: {} is served by {}",
                requested, institution
            ))),
        );
    }

    let student = Student {
        username: req.username,
        password: req.password,
        institution,
        first_name: req.first_name,
        last_name: req.last_name,
        email: req.email_address,
        phone: req.phone_number,
    };

    reply(coordinator.create_account(student))
}

pub async fn handle_reserve<T: PeerTransport>(
    Extension(coordinator): Extension<Arc<Coordinator<T>>>,
    Json(req): Json<ReserveRequest>,
) -> Reply {
    let book = Book::new(req.book_name, req.author_name);
    reply(coordinator.reserve_book(&req.username, &req.password, &book))
}

pub async fn handle_reserve_inter_library<T: PeerTransport>(
    Extension(coordinator): Extension<Arc<Coordinator<T>>>,
    Json(req): Json<ReserveRequest>,
) -> Reply {
    let book = Book::new(req.book_name, req.author_name);
    let result = coordinator
        .reserve_inter_library(&req.username, &req.password, &book)
        .await;

    let status = match &result {
        InterLibraryResult::Local(_) | InterLibraryResult::Remote { .. } => StatusCode::OK,
        InterLibraryResult::Rejected(e) => status_of(e),
        InterLibraryResult::Exhausted => StatusCode::CONFLICT,
    };

    (status, Json(MessageResponse::new(result.to_string())))
}

pub async fn handle_non_returners<T: PeerTransport>(
    Extension(coordinator): Extension<Arc<Coordinator<T>>>,
    Query(query): Query<NonReturnersQuery>,
) -> Reply {
    let report = coordinator
        .non_returners(&query.institution, query.num_days)
        .await;
    (StatusCode::OK, Json(MessageResponse::new(report)))
}

pub async fn handle_set_duration<T: PeerTransport>(
    Extension(coordinator): Extension<Arc<Coordinator<T>>>,
    Json(req): Json<SetDurationRequest>,
) -> Reply {
    reply(coordinator.set_duration(&req.username, &req.book_name, req.num_days))
}

fn reply(result: Result<Outcome, LedgerError>) -> Reply {
    match result {
        Ok(outcome) => (StatusCode::OK, Json(MessageResponse::new(outcome.to_string()))),
        Err(e) => (status_of(&e), Json(MessageResponse::new(e.to_string()))),
    }
}

pub fn status_of(err: &LedgerError) -> StatusCode {
    match err {
        LedgerError::InvalidCredentials { .. } => StatusCode::UNAUTHORIZED,
        LedgerError::UnknownStudent { .. } | LedgerError::InexistentBook { .. } => {
            StatusCode::NOT_FOUND
        }
        LedgerError::DuplicateAccount { .. }
        | LedgerError::NoCopiesAvailable { .. }
        | LedgerError::AlreadyReserved { .. }
        | LedgerError::PreReservationPending { .. }
        | LedgerError::NoPendingReservation { .. } => StatusCode::CONFLICT,
    }
}
