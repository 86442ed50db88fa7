//! Request routing dispatch module
//!
//! Entry point for HTTP request processing: body limits, the exact-match API
//! table, then the static asset side for everything else.

use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use http_body_util::{BodyExt, Full, LengthLimitError, Limited};
use hyper::body::{Body, Bytes, Incoming};
use hyper::header::{CONTENT_LENGTH, IF_NONE_MATCH, ORIGIN};
use hyper::{HeaderMap, Method, Request, Response};

use crate::api::{self, ApiContext};
use crate::config::AppState;
use crate::handler::static_files::{self, AssetRequest};
use crate::http;
use crate::logger::{self, AccessLogEntry};

/// Main entry point for HTTP request handling
pub async fn handle_request(
    req: Request<Incoming>,
    state: Arc<AppState>,
    remote_addr: SocketAddr,
) -> Result<Response<Full<Bytes>>, Infallible> {
    let started = Instant::now();
    let access_log = state.config.logging.access_log;
    let mut entry = access_log.then(|| {
        AccessLogEntry::from_request(
            remote_addr.ip().to_string(),
            req.method(),
            req.uri(),
            req.version(),
            req.headers(),
        )
    });

    let (response, route) = process(req, &state).await;

    if let Some(entry) = entry.as_mut() {
        entry.status = response.status().as_u16();
        entry.body_bytes = response
            .body()
            .size_hint()
            .exact()
            .and_then(|n| usize::try_from(n).ok())
            .unwrap_or(0);
        entry.route = route;
        entry.request_time_us = u64::try_from(started.elapsed().as_micros()).unwrap_or(u64::MAX);
        logger::log_access(entry, &state.config.logging.access_log_format);
    }

    Ok(response)
}

/// Buffer the body, then route the request
async fn process(req: Request<Incoming>, state: &AppState) -> (Response<Full<Bytes>>, String) {
    let max_body_size = state.config.http.max_body_size;

    if let Some(resp) = check_body_size(req.headers(), max_body_size) {
        return (resp, "rejected".to_string());
    }

    let (parts, body) = req.into_parts();
    let bytes = match read_body(body, max_body_size).await {
        Ok(bytes) => bytes,
        Err(resp) => return (resp, "rejected".to_string()),
    };

    route(&Request::from_parts(parts, bytes), state).await
}

/// Validate Content-Length header and return 413 if exceeded
fn check_body_size(headers: &HeaderMap, max_body_size: u64) -> Option<Response<Full<Bytes>>> {
    let content_length = headers.get(CONTENT_LENGTH)?;
    content_length.to_str().map_or_else(
        |_| {
            logger::log_warning("Content-Length header contains non-ASCII characters");
            None
        },
        |size_str| match size_str.parse::<u64>() {
            Ok(size) if size > max_body_size => {
                logger::log_error(&format!(
                    "Request body too large: {size} bytes (max: {max_body_size})"
                ));
                Some(http::build_413_response())
            }
            Err(_) => {
                logger::log_warning(&format!(
                    "Invalid Content-Length value: '{size_str}', skipping size check"
                ));
                None
            }
            _ => None,
        },
    )
}

/// Collect the request body, capped at `max_body_size`
///
/// Bodies without a declared length that grow past the cap are 413; any
/// other read failure is 400.
async fn read_body<B>(body: B, max_body_size: u64) -> Result<Bytes, Response<Full<Bytes>>>
where
    B: Body<Data = Bytes>,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    let limit = usize::try_from(max_body_size).unwrap_or(usize::MAX);
    match Limited::new(body, limit).collect().await {
        Ok(collected) => Ok(collected.to_bytes()),
        Err(e) if e.is::<LengthLimitError>() => {
            logger::log_error(&format!(
                "Request body too large: exceeded {max_body_size} bytes"
            ));
            Err(http::build_413_response())
        }
        Err(e) => {
            logger::log_warning(&format!("Failed to read request body: {e}"));
            Err(http::build_400_response("Failed to read request body"))
        }
    }
}

/// Route a buffered request
///
/// Returns the response together with a short label describing which side
/// answered it (`api:<name>`, `asset`, `spa-fallback`, ...).
pub async fn route(req: &Request<Bytes>, state: &AppState) -> (Response<Full<Bytes>>, String) {
    let path = req.uri().path();

    // 1. API table (exact match, terminal)
    if let Some(endpoint) = state.routes.lookup(path) {
        let ctx = ApiContext {
            origin: req
                .headers()
                .get(ORIGIN)
                .and_then(|v| v.to_str().ok())
                .unwrap_or("*"),
            store: state.store(),
            expose_error_details: state.config.api.expose_error_details,
        };
        let response = api::dispatch(endpoint, req, &ctx).await;
        return (response, format!("api:{}", endpoint.name()));
    }

    // 2. Asset side only answers GET and HEAD
    let method = req.method();
    match *method {
        Method::GET | Method::HEAD => {}
        Method::OPTIONS => return (http::build_options_response(), "options".to_string()),
        _ => {
            logger::log_warning(&format!("Method not allowed: {method} {path}"));
            return (http::build_asset_405_response(), "method-not-allowed".to_string());
        }
    }

    // 3. Static assets with SPA fallback
    let ctx = AssetRequest {
        path,
        is_head: *method == Method::HEAD,
        if_none_match: req
            .headers()
            .get(IF_NONE_MATCH)
            .and_then(|v| v.to_str().ok()),
        cache_max_age: state.config.assets.cache_max_age,
    };
    let (response, outcome) = static_files::serve_asset(&ctx, state.assets.as_ref()).await;
    (response, outcome.label().to_string())
}
