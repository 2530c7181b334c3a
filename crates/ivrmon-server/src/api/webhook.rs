use crate::api::{error_response, ApiError};
use crate::logging::TraceId;
use crate::state::AppState;
use axum::extract::{Extension, Path, Query, Request, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::Utc;
use ivrmon_common::digits::normalize_digits;
use ivrmon_common::types::{IvrStep, StepEvent};
use ivrmon_storage::IvrStore;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use utoipa_axum::{router::OpenApiRouter, routes};

/// Keep oversized (hence bogus) notification bodies from being buffered.
const MAX_FORM_BODY_BYTES: usize = 64 * 1024;

/// Parameters of one Passthru notification. The vendor sends them in the
/// query string, in an urlencoded body, or both; the two sources are
/// merged with the query string winning.
#[derive(Debug, Default, Clone, Deserialize, IntoParams)]
pub struct WebhookParams {
    /// 通话唯一标识（必填）
    #[serde(rename = "CallSid")]
    pub call_sid: Option<String>,
    /// 按键值，可能带引号包裹（厂商怪癖）
    pub digits: Option<String>,
    /// 主叫号码
    #[serde(rename = "From")]
    pub from: Option<String>,
    /// 被叫号码（即 exophone）
    #[serde(rename = "To")]
    pub to: Option<String>,
    /// 通话状态（仅透传，不入库）
    #[serde(rename = "CallStatus")]
    pub call_status: Option<String>,
    /// 主叫归属 circle
    #[serde(rename = "CallerCircle")]
    pub caller_circle: Option<String>,
}

impl WebhookParams {
    fn merged_with(self, fallback: WebhookParams) -> WebhookParams {
        WebhookParams {
            call_sid: self.call_sid.or(fallback.call_sid),
            digits: self.digits.or(fallback.digits),
            from: self.from.or(fallback.from),
            to: self.to.or(fallback.to),
            call_status: self.call_status.or(fallback.call_status),
            caller_circle: self.caller_circle.or(fallback.caller_circle),
        }
    }
}

/// 按键接收确认（回给厂商，流程继续走下一个 applet）
#[derive(Serialize, ToSchema)]
struct WebhookAck {
    success: bool,
    message: String,
    call_sid: String,
    digit: Option<String>,
}

/// 接收 Passthru 按键通知。
/// step_name 取自厂商流程里配置的 URL 段（language/state/service/model/hp）；
/// 未知段位的事件照常入库但不参与路径聚合。
#[utoipa::path(
    method(get, post),
    path = "/webhook/ivr/{step_name}",
    tag = "Webhook",
    params(
        ("step_name" = String, Path, description = "IVR 步骤名（URL 段）"),
        WebhookParams
    ),
    responses(
        (status = 200, description = "按键已记录", body = WebhookAck),
        (status = 400, description = "缺少 CallSid", body = ApiError),
        (status = 500, description = "存储失败", body = ApiError)
    )
)]
async fn ivr_webhook(
    Extension(trace_id): Extension<TraceId>,
    Path(step_name): Path<String>,
    State(state): State<AppState>,
    Query(query): Query<WebhookParams>,
    request: Request,
) -> Response {
    // POST notifications may carry the parameters urlencoded in the body
    // instead of (or in addition to) the query string.
    let body = axum::body::to_bytes(request.into_body(), MAX_FORM_BODY_BYTES)
        .await
        .unwrap_or_default();
    let form: WebhookParams = serde_urlencoded::from_bytes(&body).unwrap_or_default();
    let params = query.merged_with(form);

    let Some(call_sid) = params.call_sid.filter(|sid| !sid.is_empty()) else {
        tracing::warn!(trace_id = %trace_id, step = %step_name, "Webhook without CallSid");
        return error_response(StatusCode::BAD_REQUEST, &trace_id, "CallSid is required");
    };

    let digits = normalize_digits(params.digits.as_deref());
    let event = StepEvent {
        call_sid: call_sid.clone(),
        step_name: step_name.clone(),
        digit_input: digits.clone(),
        from_number: params.from.clone(),
        to_number: params.to.clone(),
        // The callee number is the exophone the caller dialed.
        exophone: params.to.clone(),
        caller_circle: params.caller_circle.clone(),
        timestamp: Utc::now(),
    };

    if let Err(e) = state.store.record_event(&event) {
        tracing::error!(trace_id = %trace_id, error = %e, "Failed to record IVR event");
        return error_response(StatusCode::INTERNAL_SERVER_ERROR, &trace_id, &e.to_string());
    }

    match step_name.parse::<IvrStep>() {
        Ok(step) => {
            if let Err(e) = state.store.upsert_path(
                &call_sid,
                step,
                digits.as_deref(),
                params.from.as_deref(),
                params.to.as_deref(),
            ) {
                tracing::error!(trace_id = %trace_id, error = %e, "Failed to upsert IVR path");
                return error_response(StatusCode::INTERNAL_SERVER_ERROR, &trace_id, &e.to_string());
            }
        }
        Err(_) => {
            tracing::debug!(trace_id = %trace_id, step = %step_name, "Unknown step, event recorded without aggregation");
        }
    }

    tracing::info!(trace_id = %trace_id, call_sid = %call_sid, step = %step_name, digit = ?digits, "IVR input recorded");
    Json(WebhookAck {
        success: true,
        message: format!("IVR input recorded for {step_name}"),
        call_sid,
        digit: digits,
    })
    .into_response()
}

/// 健康检查响应
#[derive(Serialize, ToSchema)]
struct TestStatus {
    status: String,
    message: String,
    timestamp: String,
    /// 当前数据库文件路径
    database: String,
    /// 运行时长（秒）
    uptime_secs: i64,
}

/// 验证接收端存活（配置厂商流程前先打这个端点）。
#[utoipa::path(
    get,
    path = "/webhook/test",
    tag = "Webhook",
    responses(
        (status = 200, description = "接收端存活", body = TestStatus)
    )
)]
async fn test_webhook(State(state): State<AppState>) -> impl IntoResponse {
    Json(TestStatus {
        status: "active".to_string(),
        message: "ivrmon webhook receiver is running".to_string(),
        timestamp: Utc::now().to_rfc3339(),
        database: state.store.db_path().display().to_string(),
        uptime_secs: (Utc::now() - state.start_time).num_seconds(),
    })
}

pub fn webhook_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(ivr_webhook))
        .routes(routes!(test_webhook))
}
