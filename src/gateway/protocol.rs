//! Gateway Protocol
//!
//! Routes and JSON bodies of the client-facing HTTP surface. Field names follow the
//! camelCase convention of the client applications.

use serde::{Deserialize, Serialize};

// --- API Endpoints ---

pub const ENDPOINT_ACCOUNT: &str = "/account";
pub const ENDPOINT_RESERVE: &str = "/reserve";
pub const ENDPOINT_RESERVE_INTER_LIBRARY: &str = "/reserve/inter-library";
/// `GET` with `?institution=<name>&numDays=<n>`.
pub const ENDPOINT_NON_RETURNERS: &str = "/non-returners";
pub const ENDPOINT_DURATION: &str = "/duration";

// --- Data Transfer Objects ---

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAccountRequest {
    pub first_name: String,
    pub last_name: String,
    pub email_address: String,
    pub phone_number: String,
    pub username: String,
    pub password: String,
    /// Must name the node receiving the request when present.
    #[serde(default)]
    pub educational_institution: Option<String>,
}

/// Body of both `/reserve` and `/reserve/inter-library`.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReserveRequest {
    pub username: String,
    pub password: String,
    pub book_name: String,
    pub author_name: String,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NonReturnersQuery {
    pub institution: String,
    pub num_days: i32,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetDurationRequest {
    pub username: String,
    pub book_name: String,
    pub num_days: i64,
}

/// Every route answers with the human-readable result of the operation.
#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
