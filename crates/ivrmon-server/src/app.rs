use crate::state::AppState;
use crate::{api, logging};
use axum::middleware;
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "ivrmon API",
        description = "IVR 按键采集与通话报表 REST API",
    ),
    tags(
        (name = "Webhook", description = "厂商 Passthru 回调"),
        (name = "IVR", description = "IVR 路径与统计查询"),
        (name = "Report", description = "通话合并报表")
    )
)]
struct ApiDoc;

pub fn build_http_app(state: AppState) -> Router {
    let (webhook_router, webhook_spec) = api::webhook_routes().split_for_parts();
    let (ivr_router, ivr_spec) = api::ivr_routes().split_for_parts();
    let (report_router, report_spec) = api::report_routes().split_for_parts();

    let mut merged_spec = ApiDoc::openapi();
    merged_spec.merge(webhook_spec);
    merged_spec.merge(ivr_spec);
    merged_spec.merge(report_spec);

    // The webhook is called by the vendor and the read APIs by the
    // dashboard front-end on another origin, so CORS stays open.
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    webhook_router
        .merge(ivr_router)
        .merge(report_router)
        .with_state(state)
        .merge(SwaggerUi::new("/docs").url("/api/openapi.json", merged_spec))
        .layer(cors)
        .layer(middleware::from_fn(logging::request_logging))
}
