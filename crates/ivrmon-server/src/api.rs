pub mod ivr;
pub mod report;
pub mod webhook;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use utoipa::ToSchema;

pub use ivr::ivr_routes;
pub use report::report_routes;
pub use webhook::webhook_routes;

/// API 错误响应（校验失败或存储失败时返回）
#[derive(Serialize, ToSchema)]
pub struct ApiError {
    /// 恒为 false
    pub success: bool,
    /// 错误信息
    pub error: String,
    /// 链路追踪 ID
    pub trace_id: String,
}

pub fn error_response(status: StatusCode, trace_id: &str, msg: &str) -> Response {
    (
        status,
        Json(ApiError {
            success: false,
            error: msg.to_string(),
            trace_id: trace_id.to_string(),
        }),
    )
        .into_response()
}

/// Parse a `YYYY-MM-DD` query value; the webhook API has always used
/// bare calendar dates for range filters.
pub fn parse_date_param(
    value: Option<&str>,
    name: &str,
) -> Result<Option<chrono::NaiveDate>, String> {
    match value {
        None => Ok(None),
        Some(raw) => chrono::NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .map(Some)
            .map_err(|_| format!("{name} must be YYYY-MM-DD, got '{raw}'")),
    }
}
