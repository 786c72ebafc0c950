//! HTTP protocol layer module
//!
//! Response writing, status capture, and the protocol pieces the file server
//! is built from (MIME types, ranges, cache validators).

pub mod cache;
pub mod mime;
pub mod range;
pub mod recorder;
pub mod response;
pub mod writer;

// Re-export commonly used types
pub use range::{parse_range_header, ByteRange, RangeParseResult};
pub use recorder::StatusRecorder;
pub use writer::{BufferedResponse, ResponseWriter};
