// API wire types
// Field names follow the JSON contract the front end consumes (camelCase)

use serde::{Deserialize, Serialize};

/// GET /api/session
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponse {
    pub session_id: String,
    pub is_new: bool,
}

/// GET /api/example
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExampleGetResponse {
    pub message: &'static str,
    pub session_id: String,
    pub timestamp: String,
    pub has_database: bool,
}

/// POST /api/example
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExamplePostResponse {
    pub success: bool,
    pub message: &'static str,
    pub session_id: String,
    pub received_data: serde_json::Value,
    pub has_database: bool,
}

/// POST /api/save request body
#[derive(Debug, Deserialize)]
pub struct SaveRequest {
    pub content: String,
}

/// POST /api/save
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveResponse {
    pub success: bool,
    pub user_id: String,
    pub affected_rows: u64,
}

/// GET /api/load
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadResponse {
    pub content: String,
    pub timestamp: String,
    pub user_id: String,
}

/// Error envelope shared by every endpoint
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
}
