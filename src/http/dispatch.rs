//! Method dispatch for the audited endpoint.
//!
//! ```text
//! GET | PUT | DELETE → 403 Forbidden
//! POST               → forward.rs
//! anything else      → 501 Not Implemented
//! ```

use axum::{
    extract::{Request, State},
    http::{Method, StatusCode},
    response::Response,
};

use crate::http::response::plain_status;
use crate::http::server::AppState;

/// Classify the call by verb and answer or relay it.
pub async fn dispatch(State(state): State<AppState>, request: Request) -> Response {
    match *request.method() {
        Method::GET | Method::PUT | Method::DELETE => {
            tracing::debug!(method = %request.method(), "Rejecting method");
            plain_status(StatusCode::FORBIDDEN)
        }
        Method::POST => state.forwarder.forward(request).await,
        _ => plain_status(StatusCode::NOT_IMPLEMENTED),
    }
}
