// Server module entry point
// Listener setup, per-connection serving, signals and the lifecycle controller

pub mod connection;
pub mod lifecycle;
pub mod listener;
pub mod signal;

// Re-export commonly used types
pub use lifecycle::{Server, ServerState};
pub use listener::create_listener;
pub use signal::ShutdownSignal;
