mod common;

use axum::http::StatusCode;
use chrono::{Duration, Utc};
use common::{build_test_context, request_no_body};

#[tokio::test]
async fn test_endpoint_reports_active_status() {
    let ctx = build_test_context().expect("test context should build");

    let (status, body, trace) = request_no_body(&ctx.app, "GET", "/webhook/test").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "active");
    assert!(body["message"].as_str().unwrap().contains("running"));
    assert!(body["timestamp"].is_string());
    assert!(body["database"].as_str().unwrap().contains("ivr_data.db"));
    assert!(trace.is_some());
}

#[tokio::test]
async fn paths_endpoint_filters_by_date_range() {
    let ctx = build_test_context().expect("test context should build");

    let (status, _, _) =
        request_no_body(&ctx.app, "POST", "/webhook/ivr/language?CallSid=CA1&digits=1").await;
    assert_eq!(status, StatusCode::OK);

    let today = Utc::now().date_naive();
    let uri = format!("/api/ivr/paths?start_date={today}&end_date={today}");
    let (status, body, _) = request_no_body(&ctx.app, "GET", &uri).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 1);

    let tomorrow = today + Duration::days(1);
    let uri = format!("/api/ivr/paths?start_date={tomorrow}");
    let (status, body, _) = request_no_body(&ctx.app, "GET", &uri).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 0);
    assert!(body["data"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn paths_endpoint_rejects_malformed_dates() {
    let ctx = build_test_context().expect("test context should build");

    let (status, body, _) =
        request_no_body(&ctx.app, "GET", "/api/ivr/paths?start_date=01-06-2025").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert!(body["error"].as_str().unwrap().contains("start_date"));
}

#[tokio::test]
async fn stats_endpoint_labels_the_distributions() {
    let ctx = build_test_context().expect("test context should build");

    for (sid, lang) in [("CA1", "1"), ("CA2", "1"), ("CA3", "2")] {
        let uri = format!("/webhook/ivr/language?CallSid={sid}&digits={lang}");
        let (status, _, _) = request_no_body(&ctx.app, "POST", &uri).await;
        assert_eq!(status, StatusCode::OK);
    }
    let (status, _, _) =
        request_no_body(&ctx.app, "POST", "/webhook/ivr/state?CallSid=CA1&digits=3").await;
    assert_eq!(status, StatusCode::OK);

    let (status, body, _) = request_no_body(&ctx.app, "GET", "/api/ivr/stats").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total_calls"], 3);

    let languages = body["language_distribution"].as_array().unwrap();
    assert_eq!(languages[0]["choice"], "1");
    assert_eq!(languages[0]["label"], "Hindi");
    assert_eq!(languages[0]["count"], 2);
    assert_eq!(languages[1]["label"], "English");

    let states = body["state_distribution"].as_array().unwrap();
    assert_eq!(states[0]["label"], "Maharashtra");

    // CA1 answered two steps: 1-3--- ; CA2/CA3 only language.
    let top = body["top_paths"].as_array().unwrap();
    assert!(!top.is_empty());
    assert!(top.iter().all(|p| p["path"] != "----"));
}

#[tokio::test]
async fn report_endpoint_falls_back_to_sample_without_vendor_account() {
    let ctx = build_test_context().expect("test context should build");

    let (status, body, _) = request_no_body(&ctx.app, "GET", "/api/report/calls").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["source"], "sample");
    assert_eq!(body["ivr_data_available"], true);

    let count = body["count"].as_u64().unwrap();
    assert_eq!(count as usize, body["data"].as_array().unwrap().len());
    assert_eq!(body["metrics"]["total_calls"].as_u64().unwrap(), count);
    assert!(body["data"][0]["CallSid"].is_string());
}

#[tokio::test]
async fn report_endpoint_validates_parameters() {
    let ctx = build_test_context().expect("test context should build");

    let (status, _, _) =
        request_no_body(&ctx.app, "GET", "/api/report/calls?start_date=June-1").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body, _) =
        request_no_body(&ctx.app, "GET", "/api/report/calls?source=csv").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("source"));

    let (status, _, _) =
        request_no_body(&ctx.app, "GET", "/api/report/calls?source=sample&start_date=2025-06-01&end_date=2025-06-07").await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn openapi_spec_covers_the_public_surface() {
    let ctx = build_test_context().expect("test context should build");

    let (status, body, _) = request_no_body(&ctx.app, "GET", "/api/openapi.json").await;
    assert_eq!(status, StatusCode::OK);
    let paths = body["paths"].as_object().unwrap();
    assert!(paths.contains_key("/webhook/ivr/{step_name}"));
    assert!(paths.contains_key("/webhook/test"));
    assert!(paths.contains_key("/api/ivr/paths"));
    assert!(paths.contains_key("/api/ivr/stats"));
    assert!(paths.contains_key("/api/report/calls"));
}
