//! Locally generated responses.
//!
//! Rejections and upstream failures answer with the standard reason phrase
//! as a plain-text body.

use axum::{
    body::Body,
    http::{header, HeaderValue, Response, StatusCode},
};

/// `<reason phrase>\n` as `text/plain`, with the given status.
pub fn plain_status(status: StatusCode) -> Response<Body> {
    let phrase = status.canonical_reason().unwrap_or_default();

    let mut response = Response::new(Body::from(format!("{}\n", phrase)));
    *response.status_mut() = status;
    response.headers_mut().insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("text/plain; charset=utf-8"),
    );
    response.headers_mut().insert(
        header::X_CONTENT_TYPE_OPTIONS,
        HeaderValue::from_static("nosniff"),
    );
    response
}
