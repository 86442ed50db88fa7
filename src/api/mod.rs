// API module entry
// JSON endpoints served under /api/*

mod error;
pub mod handlers;
mod response;
mod types;

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::{Method, Request, Response};

use crate::logger;
use crate::store::DocumentStore;

pub use error::ApiError;
pub use response::{error_response, preflight_response, CorsHeaders};

/// Headers the browser may send to the document endpoints
const USER_HEADERS: &str = "Content-Type, X-User-Id";

/// The fixed set of API endpoints
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    Example,
    Session,
    Save,
    Load,
}

impl Endpoint {
    /// Whether `method` reaches the main handler (OPTIONS is always a preflight)
    pub fn allows(self, method: &Method) -> bool {
        match self {
            Self::Example => method == Method::GET || method == Method::POST,
            Self::Session | Self::Load => method == Method::GET,
            Self::Save => method == Method::POST,
        }
    }

    /// `Access-Control-Allow-Methods` advertised for this endpoint
    pub const fn allow_methods(self) -> &'static str {
        match self {
            Self::Example => "GET, POST, OPTIONS",
            Self::Session | Self::Load => "GET, OPTIONS",
            Self::Save => "POST, OPTIONS",
        }
    }

    /// `Access-Control-Allow-Headers` advertised for this endpoint
    pub const fn allow_headers(self) -> &'static str {
        match self {
            Self::Example | Self::Session => "Content-Type",
            Self::Save | Self::Load => USER_HEADERS,
        }
    }

    /// Session-bearing endpoints let the browser send cookies cross-origin
    pub const fn allows_credentials(self) -> bool {
        matches!(self, Self::Example | Self::Session)
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::Example => "example",
            Self::Session => "session",
            Self::Save => "save",
            Self::Load => "load",
        }
    }
}

/// Per-request inputs the handlers need besides the request itself
pub struct ApiContext<'a> {
    /// Request `Origin`, or `*` when absent
    pub origin: &'a str,
    pub store: Option<&'a dyn DocumentStore>,
    pub expose_error_details: bool,
}

/// Dispatch a request already matched to `endpoint`
///
/// OPTIONS always answers the preflight; methods the endpoint does not
/// accept get an empty 405.
pub async fn dispatch(
    endpoint: Endpoint,
    req: &Request<Bytes>,
    ctx: &ApiContext<'_>,
) -> Response<Full<Bytes>> {
    let method = req.method();

    if method == Method::OPTIONS {
        let mut cors = CorsHeaders::origin(ctx.origin)
            .with_allow(endpoint.allow_methods(), endpoint.allow_headers());
        if endpoint.allows_credentials() {
            cors = cors.with_credentials();
        }
        return preflight_response(&cors);
    }

    if !endpoint.allows(method) {
        logger::log_warning(&format!(
            "Method not allowed: {method} /api/{}",
            endpoint.name()
        ));
        let cors = CorsHeaders::origin(ctx.origin)
            .with_allow(endpoint.allow_methods(), endpoint.allow_headers());
        return error_response(&ApiError::MethodNotAllowed, &cors);
    }

    match endpoint {
        Endpoint::Session => handlers::session(req, ctx),
        Endpoint::Example => handlers::example(req, ctx),
        Endpoint::Save => handlers::save(req, ctx).await,
        Endpoint::Load => handlers::load(req, ctx).await,
    }
}
