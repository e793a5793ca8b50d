//! Session token transport.
//!
//! A thin middleware that reads the `sid` cookie (minting a fresh token
//! when there is none) and parks the token in the request extensions; the
//! [`Session`] extractor picks it up together with the store from
//! [`AppState`]. Everything beyond the token — what a session contains —
//! lives in [`crate::session`].

use axum::{
    extract::{FromRequestParts, Request},
    http::{
        header::{COOKIE, SET_COOKIE},
        request::Parts,
        HeaderValue,
    },
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

use super::error::AppError;
use super::state::AppState;
use crate::session::{Session, SessionToken};

const COOKIE_NAME: &str = "sid";

fn token_from_cookies(req: &Request) -> Option<SessionToken> {
    let header = req.headers().get(COOKIE)?.to_str().ok()?;
    header.split(';').find_map(|pair| {
        let (name, value) = pair.trim().split_once('=')?;
        (name == COOKIE_NAME && !value.is_empty())
            .then(|| SessionToken(value.to_string()))
    })
}

/// Ensure every request carries a session token; set the cookie on the way
/// out when one was minted.
pub async fn session_middleware(mut req: Request, next: Next) -> Response {
    let (token, minted) = match token_from_cookies(&req) {
        Some(token) => (token, false),
        None => (SessionToken(Uuid::new_v4().to_string()), true),
    };

    req.extensions_mut().insert(token.clone());
    let mut response = next.run(req).await;

    if minted {
        let cookie = format!("{}={}; Path=/; HttpOnly; SameSite=Lax", COOKIE_NAME, token);
        if let Ok(value) = HeaderValue::from_str(&cookie) {
            response.headers_mut().append(SET_COOKIE, value);
        }
    }
    response
}

impl FromRequestParts<AppState> for Session {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = parts
            .extensions
            .get::<SessionToken>()
            .cloned()
            .ok_or_else(|| AppError::Internal("session middleware not installed".into()))?;
        Ok(Session::new(token, state.sessions.clone()))
    }
}
