//! services/api/src/web/middleware.rs
//!
//! Visitor identification middleware.

use axum::{
    extract::Request,
    http::{header, HeaderMap, HeaderValue},
    middleware::Next,
    response::Response,
};
use tracing::{debug, error};
use uuid::Uuid;

use crate::web::state::VisitorContext;

pub const SESSION_COOKIE: &str = "chat_session";
pub const VISITOR_COOKIE: &str = "visitor_id";
const VISITOR_COOKIE_MAX_AGE: u64 = 60 * 60 * 24 * 365;

/// Middleware that resolves the visitor's session and durable ids from cookies.
///
/// Missing or unparsable ids are minted and set on the response. The session
/// cookie carries no Max-Age, so it ends with the browser session.
pub async fn require_visitor(mut req: Request, next: Next) -> Response {
    let session = cookie_id(req.headers(), SESSION_COOKIE);
    let visitor = cookie_id(req.headers(), VISITOR_COOKIE);

    let context = VisitorContext {
        session_id: session.unwrap_or_else(Uuid::new_v4),
        visitor_id: visitor.unwrap_or_else(Uuid::new_v4),
    };
    req.extensions_mut().insert(context);

    let mut response = next.run(req).await;

    if session.is_none() {
        debug!(session_id = %context.session_id, "Minted session cookie.");
        set_cookie(
            response.headers_mut(),
            format!(
                "{SESSION_COOKIE}={}; Path=/; HttpOnly; SameSite=Lax",
                context.session_id
            ),
        );
    }
    if visitor.is_none() {
        debug!(visitor_id = %context.visitor_id, "Minted visitor cookie.");
        set_cookie(
            response.headers_mut(),
            format!(
                "{VISITOR_COOKIE}={}; Path=/; Max-Age={VISITOR_COOKIE_MAX_AGE}; HttpOnly; SameSite=Lax",
                context.visitor_id
            ),
        );
    }
    response
}

/// Finds `name` in the Cookie header(s) and parses it as a UUID.
pub fn cookie_id(headers: &HeaderMap, name: &str) -> Option<Uuid> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .find_map(|pair| {
            let (key, value) = pair.trim().split_once('=')?;
            (key == name).then_some(value)
        })
        .and_then(|value| Uuid::parse_str(value.trim()).ok())
}

fn set_cookie(headers: &mut HeaderMap, cookie: String) {
    match HeaderValue::from_str(&cookie) {
        Ok(value) => {
            headers.append(header::SET_COOKIE, value);
        }
        Err(e) => error!("Failed to build Set-Cookie header: {}", e),
    }
}
