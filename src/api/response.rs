// API response utility functions module

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::header::{
    HeaderValue, ACCESS_CONTROL_ALLOW_CREDENTIALS, ACCESS_CONTROL_ALLOW_HEADERS,
    ACCESS_CONTROL_ALLOW_METHODS, ACCESS_CONTROL_ALLOW_ORIGIN, CONTENT_TYPE, SET_COOKIE,
};
use hyper::{Response, StatusCode};
use serde::Serialize;

use super::error::ApiError;
use super::types::ErrorBody;
use crate::http;
use crate::logger;

/// CORS headers attached to an API response
#[derive(Debug, Clone, Copy)]
pub struct CorsHeaders<'a> {
    /// Echoed request `Origin`, or `*`
    pub origin: &'a str,
    pub credentials: bool,
    pub methods: Option<&'static str>,
    pub headers: Option<&'static str>,
}

impl<'a> CorsHeaders<'a> {
    /// Origin only
    pub const fn origin(origin: &'a str) -> Self {
        Self {
            origin,
            credentials: false,
            methods: None,
            headers: None,
        }
    }

    #[must_use]
    pub const fn with_credentials(mut self) -> Self {
        self.credentials = true;
        self
    }

    #[must_use]
    pub const fn with_allow(mut self, methods: &'static str, headers: &'static str) -> Self {
        self.methods = Some(methods);
        self.headers = Some(headers);
        self
    }

    fn apply(&self, mut builder: hyper::http::response::Builder) -> hyper::http::response::Builder {
        builder = builder.header(ACCESS_CONTROL_ALLOW_ORIGIN, self.origin);
        if let Some(methods) = self.methods {
            builder = builder.header(ACCESS_CONTROL_ALLOW_METHODS, methods);
        }
        if let Some(headers) = self.headers {
            builder = builder.header(ACCESS_CONTROL_ALLOW_HEADERS, headers);
        }
        if self.credentials {
            builder = builder.header(ACCESS_CONTROL_ALLOW_CREDENTIALS, "true");
        }
        builder
    }
}

/// Build JSON response
pub fn json_response<T: Serialize>(
    status: StatusCode,
    body: &T,
    cors: &CorsHeaders<'_>,
) -> Response<Full<Bytes>> {
    let json = match serde_json::to_string(body) {
        Ok(j) => j,
        Err(e) => {
            logger::log_error(&format!("Failed to serialize response: {e}"));
            return Response::builder()
                .status(StatusCode::INTERNAL_SERVER_ERROR)
                .header(CONTENT_TYPE, "application/json")
                .body(Full::new(Bytes::from(r#"{"error":"Internal server error"}"#)))
                .unwrap_or_else(|_| Response::new(Full::new(Bytes::from("Error"))));
        }
    };

    cors.apply(Response::builder().status(status))
        .header(CONTENT_TYPE, "application/json")
        .body(Full::new(Bytes::from(json)))
        .unwrap_or_else(|e| {
            http::response::log_build_error(status.as_str(), &e);
            Response::new(Full::new(Bytes::from("Error")))
        })
}

/// Convert an [`ApiError`] into its response
///
/// 405 carries no body; everything else uses the `{error}` envelope.
pub fn error_response(err: &ApiError, cors: &CorsHeaders<'_>) -> Response<Full<Bytes>> {
    if matches!(err, ApiError::MethodNotAllowed) {
        return http::build_405_response(cors.methods.unwrap_or("OPTIONS"));
    }
    let body = ErrorBody {
        error: err.to_string(),
    };
    json_response(err.status(), &body, cors)
}

/// Empty 200 answering a CORS preflight
pub fn preflight_response(cors: &CorsHeaders<'_>) -> Response<Full<Bytes>> {
    cors.apply(Response::builder().status(StatusCode::OK))
        .body(Full::new(Bytes::new()))
        .unwrap_or_else(|e| {
            http::response::log_build_error("OPTIONS", &e);
            Response::new(Full::new(Bytes::new()))
        })
}

/// Attach a `Set-Cookie` header when a new session was issued
pub fn with_cookie(
    mut response: Response<Full<Bytes>>,
    set_cookie: Option<String>,
) -> Response<Full<Bytes>> {
    if let Some(cookie) = set_cookie {
        match HeaderValue::from_str(&cookie) {
            Ok(value) => {
                response.headers_mut().append(SET_COOKIE, value);
            }
            Err(e) => logger::log_error(&format!("Invalid Set-Cookie value: {e}")),
        }
    }
    response
}
