use crate::api::ivr::{parse_path_query, DateRangeParams};
use crate::api::{error_response, ApiError};
use crate::logging::TraceId;
use crate::state::AppState;
use axum::extract::{Extension, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use ivrmon_report::merge::{merge_report, MergedCallRecord, MergedReport};
use ivrmon_report::metrics::{call_metrics, CallMetrics};
use ivrmon_report::sample::generate_sample_report;
use ivrmon_storage::IvrStore;
use ivrmon_telephony::CallQuery;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use utoipa_axum::{router::OpenApiRouter, routes};

const DEFAULT_SAMPLE_DAYS: i64 = 7;

#[derive(Debug, Deserialize, IntoParams)]
pub struct ReportParams {
    /// 起始日期（YYYY-MM-DD，含当天）
    pub start_date: Option<String>,
    /// 结束日期（YYYY-MM-DD，含当天）
    pub end_date: Option<String>,
    /// 最大通话记录数（缺省取配置 report_page_size）
    pub limit: Option<usize>,
    /// 数据源：live（默认，厂商 API）或 sample
    pub source: Option<String>,
}

/// 合并报表响应
#[derive(Serialize, ToSchema)]
struct ReportResponse {
    success: bool,
    /// 实际使用的数据源（live 失败时回退为 sample）
    source: String,
    count: usize,
    /// false 表示存储不可用，路径字段整体为空
    ivr_data_available: bool,
    metrics: CallMetrics,
    data: Vec<MergedCallRecord>,
}

/// 通话记录与 IVR 路径的合并报表（前端图表的数据源）。
/// 厂商 API 未配置或拉取失败时回退到示例数据；存储不可用时仅返回
/// 通话记录并置 ivr_data_available=false。
#[utoipa::path(
    get,
    path = "/api/report/calls",
    tag = "Report",
    params(ReportParams),
    responses(
        (status = 200, description = "合并报表", body = ReportResponse),
        (status = 400, description = "参数错误", body = ApiError)
    )
)]
async fn get_call_report(
    Extension(trace_id): Extension<TraceId>,
    State(state): State<AppState>,
    Query(params): Query<ReportParams>,
) -> Response {
    let range = DateRangeParams {
        start_date: params.start_date.clone(),
        end_date: params.end_date.clone(),
    };
    let path_query = match parse_path_query(&range) {
        Ok(query) => query,
        Err(msg) => return error_response(StatusCode::BAD_REQUEST, &trace_id, &msg),
    };

    let want_sample = match params.source.as_deref() {
        None | Some("live") => false,
        Some("sample") => true,
        Some(other) => {
            return error_response(
                StatusCode::BAD_REQUEST,
                &trace_id,
                &format!("source must be 'live' or 'sample', got '{other}'"),
            );
        }
    };

    let limit = params.limit.unwrap_or(state.config.report_page_size);
    let sample_days = match (path_query.start_date, path_query.end_date) {
        (Some(start), Some(end)) => ((end - start).num_days() + 1).max(1),
        _ => DEFAULT_SAMPLE_DAYS,
    };

    let live = if want_sample {
        None
    } else if let Some(client) = state.telephony.as_ref() {
        let call_query = CallQuery {
            start_date: path_query.start_date,
            end_date: path_query.end_date,
            limit,
        };
        match client.get_calls(&call_query).await {
            Ok(calls) => Some(calls),
            Err(e) => {
                tracing::warn!(trace_id = %trace_id, error = %e, "Vendor API fetch failed, falling back to sample data");
                None
            }
        }
    } else {
        None
    };

    let (report, source) = match live {
        Some(calls) => {
            let paths = match state.store.get_paths(&path_query) {
                Ok(paths) => Some(paths),
                Err(e) => {
                    tracing::warn!(trace_id = %trace_id, error = %e, "Store unreachable, report degrades to calls only");
                    None
                }
            };
            (merge_report(calls, paths.as_deref()), "live")
        }
        None => (
            MergedReport {
                rows: generate_sample_report(sample_days),
                ivr_data_available: true,
            },
            "sample",
        ),
    };

    let metrics = call_metrics(report.rows.iter().map(|r| &r.call));
    Json(ReportResponse {
        success: true,
        source: source.to_string(),
        count: report.rows.len(),
        ivr_data_available: report.ivr_data_available,
        metrics,
        data: report.rows,
    })
    .into_response()
}

pub fn report_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new().routes(routes!(get_call_report))
}
