// API endpoint handlers
// Each handler turns a buffered request into a complete JSON response

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::{Method, Request, Response, StatusCode};

use super::error::ApiError;
use super::response::{error_response, json_response, with_cookie, CorsHeaders};
use super::types::{
    ExampleGetResponse, ExamplePostResponse, LoadResponse, SaveRequest, SaveResponse,
    SessionResponse,
};
use super::{ApiContext, Endpoint};
use crate::logger;
use crate::session::get_or_create_session;
use crate::store::timestamp_now;

/// Header identifying the document owner for save/load
pub const USER_ID_HEADER: &str = "x-user-id";

/// GET /api/session
pub fn session(req: &Request<Bytes>, ctx: &ApiContext<'_>) -> Response<Full<Bytes>> {
    let session = get_or_create_session(req.headers());
    let cors = CorsHeaders::origin(ctx.origin).with_credentials();

    let body = SessionResponse {
        session_id: session.session_id.clone(),
        is_new: session.is_new,
    };
    with_cookie(
        json_response(StatusCode::OK, &body, &cors),
        session.set_cookie_header(),
    )
}

/// GET|POST /api/example
///
/// The storage backend is only reported, never written to.
pub fn example(req: &Request<Bytes>, ctx: &ApiContext<'_>) -> Response<Full<Bytes>> {
    let session = get_or_create_session(req.headers());
    let cors = CorsHeaders::origin(ctx.origin).with_credentials();
    let has_database = ctx.store.is_some();

    let response = if req.method() == Method::POST {
        match serde_json::from_slice::<serde_json::Value>(req.body()) {
            Ok(received_data) => {
                let body = ExamplePostResponse {
                    success: true,
                    message: if has_database {
                        "Data saved successfully"
                    } else {
                        "Data received (not persisted)"
                    },
                    session_id: session.session_id.clone(),
                    received_data,
                    has_database,
                };
                json_response(StatusCode::OK, &body, &cors)
            }
            Err(e) => error_response(&ApiError::MalformedBody(e.to_string()), &cors),
        }
    } else {
        let body = ExampleGetResponse {
            message: "GET request successful",
            session_id: session.session_id.clone(),
            timestamp: timestamp_now(),
            has_database,
        };
        json_response(StatusCode::OK, &body, &cors)
    };

    with_cookie(response, session.set_cookie_header())
}

/// POST /api/save
pub async fn save(req: &Request<Bytes>, ctx: &ApiContext<'_>) -> Response<Full<Bytes>> {
    let cors = CorsHeaders::origin(ctx.origin);
    match save_document(req, ctx).await {
        Ok(body) => {
            let cors = cors.with_allow(
                Endpoint::Save.allow_methods(),
                Endpoint::Save.allow_headers(),
            );
            json_response(StatusCode::OK, &body, &cors)
        }
        Err(e) => error_response(&e, &cors),
    }
}

async fn save_document(
    req: &Request<Bytes>,
    ctx: &ApiContext<'_>,
) -> Result<SaveResponse, ApiError> {
    let user_id = user_id(req).ok_or(ApiError::MissingUserId)?;

    let Some(store) = ctx.store else {
        logger::log_error("Document database not configured");
        return Err(ApiError::DatabaseNotConfigured);
    };

    let data: SaveRequest = serde_json::from_slice(req.body())
        .map_err(|e| ApiError::storage("save", &e, ctx.expose_error_details))?;

    let affected_rows = store
        .upsert(&user_id, &data.content)
        .await
        .map_err(|e| ApiError::storage("save", &e, ctx.expose_error_details))?;

    logger::log_info(&format!("Document saved for user: {user_id}"));

    Ok(SaveResponse {
        success: true,
        user_id,
        affected_rows,
    })
}

/// GET /api/load
pub async fn load(req: &Request<Bytes>, ctx: &ApiContext<'_>) -> Response<Full<Bytes>> {
    let cors = CorsHeaders::origin(ctx.origin);
    match load_document(req, ctx).await {
        Ok(body) => {
            let cors = cors.with_allow(
                Endpoint::Load.allow_methods(),
                Endpoint::Load.allow_headers(),
            );
            json_response(StatusCode::OK, &body, &cors)
        }
        Err(e) => error_response(&e, &cors),
    }
}

async fn load_document(
    req: &Request<Bytes>,
    ctx: &ApiContext<'_>,
) -> Result<LoadResponse, ApiError> {
    let user_id = user_id(req).ok_or(ApiError::MissingUserId)?;

    // Without storage the client still gets a usable empty document
    let Some(store) = ctx.store else {
        logger::log_warning("Document database not configured, returning empty content");
        return Ok(empty_document(user_id));
    };

    let document = store
        .find(&user_id)
        .await
        .map_err(|e| ApiError::storage("load", &e, ctx.expose_error_details))?;

    Ok(match document {
        Some(doc) => LoadResponse {
            content: doc.content,
            timestamp: doc.updated_at,
            user_id,
        },
        None => empty_document(user_id),
    })
}

fn empty_document(user_id: String) -> LoadResponse {
    LoadResponse {
        content: String::new(),
        timestamp: timestamp_now(),
        user_id,
    }
}

/// Non-empty `X-User-Id` header value; non-ASCII bytes are decoded as UTF-8
fn user_id(req: &Request<Bytes>) -> Option<String> {
    req.headers()
        .get(USER_ID_HEADER)
        .map(|v| String::from_utf8_lossy(v.as_bytes()).into_owned())
        .filter(|v| !v.is_empty())
}
