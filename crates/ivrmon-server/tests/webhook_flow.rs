mod common;

use axum::http::StatusCode;
use common::{build_test_context, request_form, request_no_body};
use ivrmon_storage::{IvrStore, PathQuery};

#[tokio::test]
async fn keypress_sequence_builds_the_path_row() {
    let ctx = build_test_context().expect("test context should build");

    let (status, body, trace) = request_no_body(
        &ctx.app,
        "POST",
        "/webhook/ivr/language?CallSid=CA1&digits=2&From=9999",
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["call_sid"], "CA1");
    assert_eq!(body["digit"], "2");
    assert!(body["message"].as_str().unwrap().contains("language"));
    assert!(trace.is_some());

    let (status, _, _) =
        request_no_body(&ctx.app, "POST", "/webhook/ivr/state?CallSid=CA1&digits=3").await;
    assert_eq!(status, StatusCode::OK);

    let (status, body, _) = request_no_body(&ctx.app, "GET", "/api/ivr/paths").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["count"], 1);
    let row = &body["data"][0];
    assert_eq!(row["call_sid"], "CA1");
    assert_eq!(row["language_choice"], "2");
    assert_eq!(row["state_choice"], "3");
    assert_eq!(row["complete_path"], "2-3---");
    assert_eq!(row["from_number"], "9999");
}

#[tokio::test]
async fn get_and_post_are_accepted_identically() {
    let ctx = build_test_context().expect("test context should build");

    let (status, _, _) =
        request_no_body(&ctx.app, "GET", "/webhook/ivr/language?CallSid=CA1&digits=1").await;
    assert_eq!(status, StatusCode::OK);

    // POST with the parameters in the form body instead of the query.
    let (status, body, _) = request_form(
        &ctx.app,
        "POST",
        "/webhook/ivr/state",
        "CallSid=CA1&digits=4",
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["call_sid"], "CA1");
    assert_eq!(body["digit"], "4");

    let paths = ctx.state.store.get_paths(&PathQuery::default()).unwrap();
    assert_eq!(paths.len(), 1);
    assert_eq!(paths[0].complete_path.as_deref(), Some("1-4---"));
}

#[tokio::test]
async fn missing_call_sid_is_rejected_without_store_writes() {
    let ctx = build_test_context().expect("test context should build");

    let (status, body, _) =
        request_no_body(&ctx.app, "POST", "/webhook/ivr/language?digits=1").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert!(body["error"].as_str().unwrap().contains("CallSid"));

    // An empty CallSid counts as missing.
    let (status, _, _) =
        request_no_body(&ctx.app, "POST", "/webhook/ivr/language?CallSid=&digits=1").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let stats = ctx.state.store.get_stats().unwrap();
    assert_eq!(stats.total_calls, 0);
    assert!(ctx.state.store.get_paths(&PathQuery::default()).unwrap().is_empty());
}

#[tokio::test]
async fn quote_wrapped_digits_are_stored_stripped() {
    let ctx = build_test_context().expect("test context should build");

    // digits="1" (the vendor quirk), urlencoded.
    let (status, body, _) = request_no_body(
        &ctx.app,
        "POST",
        "/webhook/ivr/language?CallSid=CA1&digits=%221%22",
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["digit"], "1");

    let paths = ctx.state.store.get_paths(&PathQuery::default()).unwrap();
    assert_eq!(paths[0].language_choice.as_deref(), Some("1"));

    let events = ctx.state.store.get_events("CA1").unwrap();
    assert_eq!(events[0].digit_input.as_deref(), Some("1"));
}

#[tokio::test]
async fn duplicate_notifications_append_events_but_not_paths() {
    let ctx = build_test_context().expect("test context should build");

    for _ in 0..2 {
        let (status, _, _) =
            request_no_body(&ctx.app, "POST", "/webhook/ivr/language?CallSid=CA1&digits=2").await;
        assert_eq!(status, StatusCode::OK);
    }

    let (status, body, _) = request_no_body(&ctx.app, "GET", "/api/ivr/calls/CA1/events").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 2);

    let paths = ctx.state.store.get_paths(&PathQuery::default()).unwrap();
    assert_eq!(paths.len(), 1);
    assert_eq!(paths[0].language_choice.as_deref(), Some("2"));
}

#[tokio::test]
async fn unknown_step_is_recorded_but_not_aggregated() {
    let ctx = build_test_context().expect("test context should build");

    let (status, body, _) =
        request_no_body(&ctx.app, "POST", "/webhook/ivr/callback-opt-in?CallSid=CA9&digits=5").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);

    // The raw event exists...
    let (_, body, _) = request_no_body(&ctx.app, "GET", "/api/ivr/calls/CA9/events").await;
    assert_eq!(body["count"], 1);
    assert_eq!(body["data"][0]["step_name"], "callback-opt-in");

    // ...but no path row was created for it.
    assert!(ctx.state.store.get_paths(&PathQuery::default()).unwrap().is_empty());

    // And it still counts as a call that touched the IVR.
    let stats = ctx.state.store.get_stats().unwrap();
    assert_eq!(stats.total_calls, 1);
}

#[tokio::test]
async fn horsepower_alias_maps_to_hp_column() {
    let ctx = build_test_context().expect("test context should build");

    let (status, _, _) =
        request_no_body(&ctx.app, "POST", "/webhook/ivr/horsepower?CallSid=CA1&digits=2").await;
    assert_eq!(status, StatusCode::OK);

    let paths = ctx.state.store.get_paths(&PathQuery::default()).unwrap();
    assert_eq!(paths[0].hp_choice.as_deref(), Some("2"));
    assert_eq!(paths[0].complete_path.as_deref(), Some("----2"));
}
