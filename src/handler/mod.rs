//! Request handler module
//!
//! Responsible for request routing dispatch: the fixed API table first,
//! then the static single-page app with its index fallback.

pub mod router;
pub mod routes;
pub mod static_files;

// Re-export main entry point
pub use router::handle_request;
