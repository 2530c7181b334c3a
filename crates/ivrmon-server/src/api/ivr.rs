use crate::api::{error_response, parse_date_param, ApiError};
use crate::logging::TraceId;
use crate::state::AppState;
use axum::extract::{Extension, Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use ivrmon_common::types::{ChoiceCount, IvrPathRow, IvrStats, IvrStep, StepEventRow};
use ivrmon_report::labels::choice_label;
use ivrmon_storage::{IvrStore, PathQuery};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use utoipa_axum::{router::OpenApiRouter, routes};

#[derive(Debug, Deserialize, IntoParams)]
pub struct DateRangeParams {
    /// 起始日期（YYYY-MM-DD，含当天）
    pub start_date: Option<String>,
    /// 结束日期（YYYY-MM-DD，含当天）
    pub end_date: Option<String>,
}

/// 路径列表响应
#[derive(Serialize, ToSchema)]
struct PathsResponse {
    success: bool,
    count: usize,
    data: Vec<IvrPathRow>,
}

/// 查询聚合后的 IVR 路径，最近更新的在前。
#[utoipa::path(
    get,
    path = "/api/ivr/paths",
    tag = "IVR",
    params(DateRangeParams),
    responses(
        (status = 200, description = "路径列表", body = PathsResponse),
        (status = 400, description = "日期格式错误", body = ApiError),
        (status = 500, description = "存储失败", body = ApiError)
    )
)]
async fn get_ivr_paths(
    Extension(trace_id): Extension<TraceId>,
    State(state): State<AppState>,
    Query(params): Query<DateRangeParams>,
) -> Response {
    let query = match parse_path_query(&params) {
        Ok(query) => query,
        Err(msg) => return error_response(StatusCode::BAD_REQUEST, &trace_id, &msg),
    };

    match state.store.get_paths(&query) {
        Ok(paths) => Json(PathsResponse {
            success: true,
            count: paths.len(),
            data: paths,
        })
        .into_response(),
        Err(e) => {
            tracing::error!(trace_id = %trace_id, error = %e, "Failed to query IVR paths");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, &trace_id, &e.to_string())
        }
    }
}

/// IVR 统计：去重通话数、Top 路径、各步骤选择分布（带显示标签）。
#[utoipa::path(
    get,
    path = "/api/ivr/stats",
    tag = "IVR",
    responses(
        (status = 200, description = "统计汇总", body = IvrStats),
        (status = 500, description = "存储失败", body = ApiError)
    )
)]
async fn get_ivr_stats(
    Extension(trace_id): Extension<TraceId>,
    State(state): State<AppState>,
) -> Response {
    match state.store.get_stats() {
        Ok(mut stats) => {
            label_distribution(&mut stats.language_distribution, IvrStep::Language);
            label_distribution(&mut stats.state_distribution, IvrStep::State);
            label_distribution(&mut stats.service_distribution, IvrStep::Service);
            Json(stats).into_response()
        }
        Err(e) => {
            tracing::error!(trace_id = %trace_id, error = %e, "Failed to query IVR stats");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, &trace_id, &e.to_string())
        }
    }
}

/// 单通电话事件列表响应
#[derive(Serialize, ToSchema)]
struct EventsResponse {
    success: bool,
    count: usize,
    data: Vec<StepEventRow>,
}

/// 单通电话的原始按键事件，按时间正序（排查厂商重发时用）。
#[utoipa::path(
    get,
    path = "/api/ivr/calls/{call_sid}/events",
    tag = "IVR",
    params(
        ("call_sid" = String, Path, description = "通话唯一标识")
    ),
    responses(
        (status = 200, description = "事件列表（无记录时为空）", body = EventsResponse),
        (status = 500, description = "存储失败", body = ApiError)
    )
)]
async fn get_call_events(
    Extension(trace_id): Extension<TraceId>,
    State(state): State<AppState>,
    Path(call_sid): Path<String>,
) -> Response {
    match state.store.get_events(&call_sid) {
        Ok(events) => Json(EventsResponse {
            success: true,
            count: events.len(),
            data: events,
        })
        .into_response(),
        Err(e) => {
            tracing::error!(trace_id = %trace_id, error = %e, "Failed to query IVR events");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, &trace_id, &e.to_string())
        }
    }
}

pub(crate) fn parse_path_query(params: &DateRangeParams) -> Result<PathQuery, String> {
    Ok(PathQuery {
        start_date: parse_date_param(params.start_date.as_deref(), "start_date")?,
        end_date: parse_date_param(params.end_date.as_deref(), "end_date")?,
    })
}

fn label_distribution(distribution: &mut [ChoiceCount], step: IvrStep) {
    for entry in distribution {
        entry.label = choice_label(step, &entry.choice);
    }
}

pub fn ivr_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(get_ivr_paths))
        .routes(routes!(get_ivr_stats))
        .routes(routes!(get_call_events))
}
