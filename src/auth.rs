//! Caller identity forwarded by the authenticating gateway.

use std::future::{ready, Ready};

use actix_web::dev::Payload;
use actix_web::http::header::HeaderMap;
use actix_web::{FromRequest, HttpRequest};
use uuid::Uuid;

use crate::domain::caller::{Caller, Role};
use crate::errors::AppError;

pub const USER_ID_HEADER: &str = "X-User-Id";
pub const USER_ROLE_HEADER: &str = "X-User-Role";

fn header<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}

pub fn caller_from_headers(headers: &HeaderMap) -> Result<Caller, AppError> {
    let invalid = || AppError::Unauthorized("Authentication invalid".to_string());

    let user_id = header(headers, USER_ID_HEADER)
        .and_then(|v| Uuid::parse_str(v.trim()).ok())
        .ok_or_else(invalid)?;
    let role = header(headers, USER_ROLE_HEADER)
        .and_then(|v| v.parse::<Role>().ok())
        .ok_or_else(invalid)?;

    Ok(Caller::new(user_id, role))
}

impl FromRequest for Caller {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        ready(caller_from_headers(req.headers()))
    }
}
