//! Client Gateway
//!
//! JSON-over-HTTP surface through which end users reach the operations of their own
//! institution. Every route delegates to the node's `Coordinator` and answers with
//! `{"message": ...}`; the status code reflects the outcome.

pub mod handlers;
pub mod protocol;


use axum::{
    Router,
    extract::Extension,
    routing::{get, post, put},
};
use std::sync::Arc;

use crate::coordinator::service::Coordinator;
use crate::transport::client::PeerTransport;
use handlers::{
    handle_create_account, handle_non_returners, handle_reserve, handle_reserve_inter_library,
    handle_set_duration,
};
use protocol::{
    ENDPOINT_ACCOUNT, ENDPOINT_DURATION, ENDPOINT_NON_RETURNERS, ENDPOINT_RESERVE,
    ENDPOINT_RESERVE_INTER_LIBRARY,
};

pub fn router<T: PeerTransport>(coordinator: Arc<Coordinator<T>>) -> Router {
    Router::new()
        .route(ENDPOINT_ACCOUNT, post(handle_create_account::<T>))
        .route(ENDPOINT_RESERVE, post(handle_reserve::<T>))
        .route(
            ENDPOINT_RESERVE_INTER_LIBRARY,
            post(handle_reserve_inter_library::<T>),
        )
        .route(ENDPOINT_NON_RETURNERS, get(handle_non_returners::<T>))
        .route(ENDPOINT_DURATION, put(handle_set_duration::<T>))
        .layer(Extension(coordinator))
}
