//! Response writing interface
//!
//! Handlers produce responses by writing through a [`ResponseWriter`] rather
//! than by returning a finished `Response`. That lets a wrapper observe what
//! the handler sends without the handler knowing about it.

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::header::HeaderMap;
use hyper::{Response, StatusCode};

use crate::logger;

/// Write side of an HTTP response
pub trait ResponseWriter {
    /// Headers that will be sent with the response
    fn headers_mut(&mut self) -> &mut HeaderMap;

    /// Set the response status; only the first call takes effect
    fn write_header(&mut self, status: StatusCode);

    /// Append body bytes, implying `200 OK` if no status was written yet
    fn write(&mut self, data: &[u8]);
}

/// A [`ResponseWriter`] that buffers everything into a hyper `Response`
#[derive(Debug, Default)]
pub struct BufferedResponse {
    status: Option<StatusCode>,
    headers: HeaderMap,
    body: Vec<u8>,
}

impl BufferedResponse {
    pub fn new() -> Self {
        Self::default()
    }

    /// Status that will be sent, `200 OK` if none was written
    pub fn status(&self) -> StatusCode {
        self.status.unwrap_or(StatusCode::OK)
    }

    pub const fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    pub fn into_response(self) -> Response<Full<Bytes>> {
        let status = self.status();
        let mut response = Response::new(Full::new(Bytes::from(self.body)));
        *response.status_mut() = status;
        *response.headers_mut() = self.headers;
        response
    }
}

impl ResponseWriter for BufferedResponse {
    fn headers_mut(&mut self) -> &mut HeaderMap {
        &mut self.headers
    }

    fn write_header(&mut self, status: StatusCode) {
        match self.status {
            None => self.status = Some(status),
            Some(sent) => logger::log_warning(&format!(
                "superfluous write_header call: {} (already sent {})",
                status.as_u16(),
                sent.as_u16()
            )),
        }
    }

    fn write(&mut self, data: &[u8]) {
        if self.status.is_none() {
            self.status = Some(StatusCode::OK);
        }
        self.body.extend_from_slice(data);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hyper::header::CONTENT_TYPE;

    #[test]
    fn test_default_status_is_ok() {
        let w = BufferedResponse::new();
        assert_eq!(w.status(), StatusCode::OK);
        assert_eq!(w.into_response().status(), StatusCode::OK);
    }

    #[test]
    fn test_first_write_header_wins() {
        let mut w = BufferedResponse::new();
        w.write_header(StatusCode::NOT_FOUND);
        w.write_header(StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(w.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_write_implies_ok() {
        let mut w = BufferedResponse::new();
        w.write(b"hello ");
        w.write_header(StatusCode::NOT_FOUND);
        w.write(b"world");
        assert_eq!(w.status(), StatusCode::OK);
        assert_eq!(w.body(), b"hello world");
    }

    #[test]
    fn test_into_response_keeps_headers() {
        let mut w = BufferedResponse::new();
        w.headers_mut()
            .insert(CONTENT_TYPE, "text/plain".parse().unwrap());
        w.write_header(StatusCode::CREATED);
        let resp = w.into_response();
        assert_eq!(resp.status(), StatusCode::CREATED);
        assert_eq!(resp.headers()[CONTENT_TYPE], "text/plain");
    }
}
