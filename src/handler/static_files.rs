//! Static file serving module
//!
//! Maps request paths to files under a root directory. Index files,
//! directory listings, MIME types, single byte ranges and conditional
//! requests are handled here; every outcome, including I/O failures, is
//! written to the [`ResponseWriter`] as a complete response.

use std::fmt::Write as _;
use std::fs::Metadata;
use std::io;
use std::path::{Path, PathBuf};

use hyper::header::{
    HeaderName, HeaderValue, ACCEPT_RANGES, CONTENT_RANGE, CONTENT_TYPE, ETAG, IF_MODIFIED_SINCE,
    IF_NONE_MATCH, LAST_MODIFIED, RANGE,
};
use hyper::http::request::Parts;
use hyper::StatusCode;
use tokio::fs;

use crate::config::FilesConfig;
use crate::http::{cache, mime, response, ResponseWriter};
use crate::http::{parse_range_header, RangeParseResult};
use crate::logger;

/// Request fields the file server looks at
struct FileRequest<'a> {
    /// Raw (still percent-encoded) request path
    raw_path: &'a str,
    query: Option<&'a str>,
    if_none_match: Option<&'a str>,
    if_modified_since: Option<&'a str>,
    range: Option<&'a str>,
}

impl<'a> FileRequest<'a> {
    fn from_parts(parts: &'a Parts) -> Self {
        Self {
            raw_path: parts.uri.path(),
            query: parts.uri.query(),
            if_none_match: header_str(parts, IF_NONE_MATCH),
            if_modified_since: header_str(parts, IF_MODIFIED_SINCE),
            range: header_str(parts, RANGE),
        }
    }

    /// Append the original query string to a redirect target
    fn with_query(&self, target: String) -> String {
        match self.query {
            Some(q) => format!("{target}?{q}"),
            None => target,
        }
    }
}

fn header_str(parts: &Parts, name: HeaderName) -> Option<&str> {
    parts.headers.get(name).and_then(|v| v.to_str().ok())
}

/// Serves files from a single root directory
#[derive(Debug, Clone)]
pub struct FileServer {
    root: PathBuf,
    config: FilesConfig,
}

impl FileServer {
    /// Create a file server rooted at `root`, which must exist
    pub fn new(root: impl AsRef<Path>, config: FilesConfig) -> io::Result<Self> {
        Ok(Self {
            root: root.as_ref().canonicalize()?,
            config,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Write the response for `parts` to `w`
    pub async fn serve<W: ResponseWriter + ?Sized>(&self, w: &mut W, parts: &Parts) {
        let req = FileRequest::from_parts(parts);

        let Ok(decoded) = urlencoding::decode(req.raw_path) else {
            response::error(w, StatusCode::BAD_REQUEST, "400 Bad Request");
            return;
        };
        if decoded.contains('\0') {
            response::error(w, StatusCode::BAD_REQUEST, "400 Bad Request");
            return;
        }

        let trailing_slash = decoded.ends_with('/');
        let cleaned = clean_path(&decoded);
        let file_path = self.root.join(cleaned.trim_start_matches('/'));

        let meta = match fs::metadata(&file_path).await {
            Ok(meta) => meta,
            Err(e) => return write_io_error(w, &e, &file_path),
        };

        if !self.is_within_root(&file_path).await {
            logger::log_warning(&format!(
                "Path outside served directory blocked: {}",
                req.raw_path
            ));
            response::not_found(w);
            return;
        }

        if meta.is_dir() {
            if !trailing_slash {
                let base = last_segment(req.raw_path);
                let target = req.with_query(format!("{base}/"));
                response::redirect(w, &target, StatusCode::MOVED_PERMANENTLY);
                return;
            }
            self.serve_directory(w, &req, &file_path, &cleaned).await;
        } else {
            if trailing_slash {
                let base = last_segment(req.raw_path.trim_end_matches('/'));
                let target = req.with_query(format!("../{base}"));
                response::redirect(w, &target, StatusCode::MOVED_PERMANENTLY);
                return;
            }
            serve_file(w, &req, &file_path, &meta).await;
        }
    }

    /// Symlinks may point anywhere; only serve what resolves inside the root
    async fn is_within_root(&self, path: &Path) -> bool {
        fs::canonicalize(path)
            .await
            .is_ok_and(|resolved| resolved.starts_with(&self.root))
    }

    async fn serve_directory<W: ResponseWriter + ?Sized>(
        &self,
        w: &mut W,
        req: &FileRequest<'_>,
        dir: &Path,
        url_path: &str,
    ) {
        for index_file in &self.config.index_files {
            let index_path = dir.join(index_file);
            let Ok(meta) = fs::metadata(&index_path).await else {
                continue;
            };
            // an index symlinked out of the root counts as missing
            if meta.is_file() && self.is_within_root(&index_path).await {
                return serve_file(w, req, &index_path, &meta).await;
            }
        }

        if !self.config.directory_listing {
            response::forbidden(w);
            return;
        }

        match read_listing(dir).await {
            Ok(entries) => {
                let html = render_listing(url_path, &entries);
                w.headers_mut().insert(
                    CONTENT_TYPE,
                    HeaderValue::from_static("text/html; charset=utf-8"),
                );
                w.write_header(StatusCode::OK);
                w.write(html.as_bytes());
            }
            Err(e) => write_io_error(w, &e, dir),
        }
    }
}

async fn serve_file<W: ResponseWriter + ?Sized>(
    w: &mut W,
    req: &FileRequest<'_>,
    path: &Path,
    meta: &Metadata,
) {
    let content = match fs::read(path).await {
        Ok(c) => c,
        Err(e) => return write_io_error(w, &e, path),
    };

    let etag = cache::generate_etag(&content);
    let modified = meta.modified().ok();

    let headers = w.headers_mut();
    if let Ok(value) = HeaderValue::from_str(&etag) {
        headers.insert(ETAG, value);
    }
    if let Some(value) = modified.and_then(|m| HeaderValue::from_str(&cache::http_date(m)).ok()) {
        headers.insert(LAST_MODIFIED, value);
    }

    // If-None-Match takes precedence over If-Modified-Since
    let not_modified = if req.if_none_match.is_some() {
        cache::check_etag_match(req.if_none_match, &etag)
    } else {
        modified.is_some_and(|m| cache::not_modified_since(req.if_modified_since, m))
    };
    if not_modified {
        w.write_header(StatusCode::NOT_MODIFIED);
        return;
    }

    let total_size = content.len();
    match parse_range_header(req.range, total_size) {
        RangeParseResult::Valid(range) => {
            let headers = w.headers_mut();
            headers.insert(CONTENT_TYPE, HeaderValue::from_static(mime::content_type_for(path)));
            headers.insert(ACCEPT_RANGES, HeaderValue::from_static("bytes"));
            if let Ok(value) = HeaderValue::from_str(&range.content_range(total_size)) {
                headers.insert(CONTENT_RANGE, value);
            }
            w.write_header(StatusCode::PARTIAL_CONTENT);
            w.write(&content[range.start..=range.end]);
        }
        RangeParseResult::NotSatisfiable => {
            if let Ok(value) = HeaderValue::from_str(&format!("bytes */{total_size}")) {
                w.headers_mut().insert(CONTENT_RANGE, value);
            }
            response::error(
                w,
                StatusCode::RANGE_NOT_SATISFIABLE,
                "416 Range Not Satisfiable",
            );
        }
        RangeParseResult::None => {
            let headers = w.headers_mut();
            headers.insert(CONTENT_TYPE, HeaderValue::from_static(mime::content_type_for(path)));
            headers.insert(ACCEPT_RANGES, HeaderValue::from_static("bytes"));
            w.write_header(StatusCode::OK);
            w.write(&content);
        }
    }
}

/// Map a filesystem error to a response
fn write_io_error<W: ResponseWriter + ?Sized>(w: &mut W, err: &io::Error, path: &Path) {
    match err.kind() {
        io::ErrorKind::NotFound | io::ErrorKind::NotADirectory => response::not_found(w),
        io::ErrorKind::PermissionDenied => response::forbidden(w),
        _ => {
            logger::log_error(&format!("Failed to read '{}': {err}", path.display()));
            response::internal_error(w);
        }
    }
}

struct ListingEntry {
    name: String,
    is_dir: bool,
}

async fn read_listing(dir: &Path) -> io::Result<Vec<ListingEntry>> {
    let mut read_dir = fs::read_dir(dir).await?;
    let mut entries = Vec::new();
    while let Some(entry) = read_dir.next_entry().await? {
        let is_dir = entry.file_type().await.is_ok_and(|t| t.is_dir());
        entries.push(ListingEntry {
            name: entry.file_name().to_string_lossy().into_owned(),
            is_dir,
        });
    }
    entries.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(entries)
}

fn render_listing(url_path: &str, entries: &[ListingEntry]) -> String {
    let mut html = String::from("<!doctype html>\n<meta name=\"viewport\" content=\"width=device-width\">\n");
    let _ = writeln!(html, "<title>Index of {}</title>", escape_html(url_path));
    html.push_str("<pre>\n");
    for entry in entries {
        let suffix = if entry.is_dir { "/" } else { "" };
        let _ = writeln!(
            html,
            "<a href=\"{}{suffix}\">{}{suffix}</a>",
            urlencoding::encode(&entry.name),
            escape_html(&entry.name),
        );
    }
    html.push_str("</pre>\n");
    html
}

fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&#34;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Last segment of a slash-separated path (`/a/b` -> `b`, `/` -> ``)
fn last_segment(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or_default()
}

/// Lexically clean a URL path: always rooted, no empty, `.` or `..` segments,
/// and `..` never climbs above the root
pub fn clean_path(path: &str) -> String {
    let mut segments: Vec<&str> = Vec::new();
    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            s => segments.push(s),
        }
    }
    format!("/{}", segments.join("/"))
}
