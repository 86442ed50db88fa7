//! Session module
//!
//! Cookie codec and the stateless session resolver used by the API handlers.

pub mod cookie;
pub mod resolver;

pub use resolver::get_or_create_session;
