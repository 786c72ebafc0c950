//! Status-capturing response wrapper

use hyper::header::HeaderMap;
use hyper::StatusCode;

use super::writer::ResponseWriter;

/// Pass-through [`ResponseWriter`] that records the status handed to
/// `write_header` before forwarding it.
///
/// The recorded value starts at `200 OK` and stays there if the wrapped
/// handler never calls `write_header`, which matches the implicit status the
/// underlying writer sends on the first body write.
pub struct StatusRecorder<'a, W: ResponseWriter + ?Sized> {
    inner: &'a mut W,
    status: StatusCode,
}

impl<'a, W: ResponseWriter + ?Sized> StatusRecorder<'a, W> {
    pub fn new(inner: &'a mut W) -> Self {
        Self {
            inner,
            status: StatusCode::OK,
        }
    }

    pub const fn status(&self) -> StatusCode {
        self.status
    }
}

impl<W: ResponseWriter + ?Sized> ResponseWriter for StatusRecorder<'_, W> {
    fn headers_mut(&mut self) -> &mut HeaderMap {
        self.inner.headers_mut()
    }

    fn write_header(&mut self, status: StatusCode) {
        self.status = status;
        self.inner.write_header(status);
    }

    fn write(&mut self, data: &[u8]) {
        self.inner.write(data);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::writer::BufferedResponse;
    use hyper::header::CONTENT_TYPE;

    #[test]
    fn test_records_status_and_forwards() {
        let mut inner = BufferedResponse::new();
        let mut rec = StatusRecorder::new(&mut inner);
        rec.write_header(StatusCode::NOT_FOUND);
        rec.write(b"404 page not found\n");
        assert_eq!(rec.status(), StatusCode::NOT_FOUND);

        assert_eq!(inner.status(), StatusCode::NOT_FOUND);
        assert_eq!(inner.body(), b"404 page not found\n");
    }

    #[test]
    fn test_defaults_to_ok_without_write_header() {
        let mut inner = BufferedResponse::new();
        let mut rec = StatusRecorder::new(&mut inner);
        rec.write(b"body");
        assert_eq!(rec.status(), StatusCode::OK);
        assert_eq!(inner.status(), StatusCode::OK);
    }

    #[test]
    fn test_headers_pass_through() {
        let mut inner = BufferedResponse::new();
        {
            let mut rec = StatusRecorder::new(&mut inner);
            rec.headers_mut()
                .insert(CONTENT_TYPE, "text/html".parse().unwrap());
        }
        assert_eq!(inner.headers()[CONTENT_TYPE], "text/html");
    }

    #[test]
    fn test_records_every_write_header_call() {
        let mut inner = BufferedResponse::new();
        let mut rec = StatusRecorder::new(&mut inner);
        rec.write_header(StatusCode::NOT_MODIFIED);
        rec.write_header(StatusCode::OK);
        assert_eq!(rec.status(), StatusCode::OK);
        // the wire keeps the first status
        assert_eq!(inner.status(), StatusCode::NOT_MODIFIED);
    }

    #[test]
    fn test_wraps_trait_object() {
        let mut inner = BufferedResponse::new();
        let dyn_inner: &mut dyn ResponseWriter = &mut inner;
        let mut rec = StatusRecorder::new(dyn_inner);
        rec.write_header(StatusCode::FORBIDDEN);
        assert_eq!(rec.status(), StatusCode::FORBIDDEN);
    }
}
