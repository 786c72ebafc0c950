//! Request handler module
//!
//! Method gating and access logging around directory file serving.

pub mod request;
pub mod static_files;

// Re-export main entry points
pub use request::RequestHandler;
pub use static_files::FileServer;
