// src/web/types.rs - response envelopes and request guards shared by all routes

use rocket::http::Status;
use rocket::request::{FromRequest, Outcome};
use rocket::response::status::Custom;
use rocket::serde::json::Json;
use rocket::serde::Serialize;
use rocket::Request;
use std::convert::Infallible;

use crate::jobs::Caller;

/// Header carrying the uid of a caller already authenticated upstream
pub const USER_HEADER: &str = "X-User-Id";

#[derive(Serialize)]
#[serde(crate = "rocket::serde", rename_all = "lowercase")]
pub enum ResponseType {
    Text,
    Data,
    Action,
    Error,
}

#[derive(Serialize)]
#[serde(crate = "rocket::serde")]
pub struct TextResponse {
    #[serde(rename = "type")]
    pub response_type: ResponseType,
    pub success: bool,
    pub message: String,
}

#[derive(Serialize)]
#[serde(crate = "rocket::serde")]
pub struct DataResponse<T> {
    #[serde(rename = "type")]
    pub response_type: ResponseType,
    pub success: bool,
    pub message: String,
    pub data: T,
}

#[derive(Serialize)]
#[serde(crate = "rocket::serde")]
pub struct ActionResponse {
    #[serde(rename = "type")]
    pub response_type: ResponseType,
    pub success: bool,
    pub message: String,
    pub action: String,
}

#[derive(Serialize)]
#[serde(crate = "rocket::serde")]
pub struct StandardErrorResponse {
    #[serde(rename = "type")]
    pub response_type: ResponseType,
    pub success: bool,
    pub error: String,
    pub error_code: String,
    pub suggestions: Vec<String>,
}

#[derive(Serialize)]
#[serde(crate = "rocket::serde", rename_all = "camelCase")]
pub struct CleanupData {
    pub purged: usize,
}

/// Stored models keep their id in the path; responses carry it inline
#[derive(Serialize)]
#[serde(crate = "rocket::serde")]
pub struct Identified<T> {
    pub id: String,
    #[serde(flatten)]
    pub item: T,
}

impl<T> Identified<T> {
    pub fn new(id: String, item: T) -> Self {
        Self { id, item }
    }
}

pub type ApiError = Custom<Json<StandardErrorResponse>>;

impl TextResponse {
    pub fn success(message: String) -> Self {
        Self {
            response_type: ResponseType::Text,
            success: true,
            message,
        }
    }
}

impl<T> DataResponse<T> {
    pub fn success(message: String, data: T) -> Self {
        Self {
            response_type: ResponseType::Data,
            success: true,
            message,
            data,
        }
    }
}

impl ActionResponse {
    pub fn success(message: String, action: String) -> Self {
        Self {
            response_type: ResponseType::Action,
            success: true,
            message,
            action,
        }
    }
}

impl StandardErrorResponse {
    pub fn new(error: String, error_code: String, suggestions: Vec<String>) -> Self {
        Self {
            response_type: ResponseType::Error,
            success: false,
            error,
            error_code,
            suggestions,
        }
    }
}

pub fn api_error(status: Status, error: String, error_code: &str, suggestions: &[&str]) -> ApiError {
    Custom(
        status,
        Json(StandardErrorResponse::new(
            error,
            error_code.to_string(),
            suggestions.iter().map(|s| s.to_string()).collect(),
        )),
    )
}

#[rocket::async_trait]
impl<'r> FromRequest<'r> for Caller {
    type Error = Infallible;

    async fn from_request(req: &'r Request<'_>) -> Outcome<Self, Self::Error> {
        match req
            .headers()
            .get_one(USER_HEADER)
            .map(str::trim)
            .filter(|uid| !uid.is_empty())
        {
            Some(uid) => Outcome::Success(Caller::user(uid)),
            None => Outcome::Success(Caller::Anonymous),
        }
    }
}
