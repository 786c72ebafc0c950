//! HTTP response helpers
//!
//! Small writers for the error and redirect responses shared by the request
//! handler and the file server.

use hyper::header::{HeaderValue, ALLOW, CONTENT_TYPE, LOCATION, X_CONTENT_TYPE_OPTIONS};
use hyper::StatusCode;

use super::writer::ResponseWriter;
use crate::logger;

pub const TEXT_PLAIN: &str = "text/plain; charset=utf-8";

/// Reply with a plain-text error message and the given status
pub fn error<W: ResponseWriter + ?Sized>(w: &mut W, status: StatusCode, message: &str) {
    let headers = w.headers_mut();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static(TEXT_PLAIN));
    headers.insert(X_CONTENT_TYPE_OPTIONS, HeaderValue::from_static("nosniff"));
    w.write_header(status);
    w.write(message.as_bytes());
    w.write(b"\n");
}

/// 405 for anything but GET
pub fn method_not_allowed<W: ResponseWriter + ?Sized>(w: &mut W) {
    w.headers_mut().insert(ALLOW, HeaderValue::from_static("GET"));
    error(w, StatusCode::METHOD_NOT_ALLOWED, "Method Not Allowed");
}

pub fn not_found<W: ResponseWriter + ?Sized>(w: &mut W) {
    error(w, StatusCode::NOT_FOUND, "404 page not found");
}

pub fn forbidden<W: ResponseWriter + ?Sized>(w: &mut W) {
    error(w, StatusCode::FORBIDDEN, "403 Forbidden");
}

pub fn internal_error<W: ResponseWriter + ?Sized>(w: &mut W) {
    error(w, StatusCode::INTERNAL_SERVER_ERROR, "500 Internal Server Error");
}

/// Redirect to `location`, which is sent as-is (relative locations allowed)
pub fn redirect<W: ResponseWriter + ?Sized>(w: &mut W, location: &str, status: StatusCode) {
    match HeaderValue::from_str(location) {
        Ok(value) => {
            w.headers_mut().insert(LOCATION, value);
            w.write_header(status);
        }
        Err(e) => {
            logger::log_error(&format!("Invalid redirect location '{location}': {e}"));
            internal_error(w);
        }
    }
}
