mod common;

use ajax_core::{
    EventDetail, EventKind, FeedbackKind, FormFields, FormOptions, InterceptedForm, RawResponse,
    SubmissionOutcome, SubmissionState, Submitter,
};
use common::Harness;
use http::{Method, StatusCode};
use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

fn post_form(action: &str) -> InterceptedForm {
    InterceptedForm::new(action, Method::POST)
        .with_fields(FormFields::new().with_text("name", "value"))
}

#[tokio::test]
async fn test_get_form_builds_query_request() {
    let harness = Harness::new();
    harness
        .transport
        .respond(RawResponse::json(StatusCode::OK, r#"{"success": true}"#));

    let form = InterceptedForm::new("/search", Method::GET)
        .with_fields(FormFields::new().with_text("q", "abc"));
    harness.app.interceptor.submit(form).await;

    let request = harness.transport.last_request();
    assert_eq!(request.method, Method::GET);
    assert_eq!(request.url, "/search?q=abc");
    assert!(request.body.is_none());
    assert_eq!(request.header("x-requested-with"), Some("XMLHttpRequest"));
    assert!(request.header("accept").unwrap().starts_with("application/json"));
}

#[tokio::test]
async fn test_post_form_sends_fields_as_body() {
    let harness = Harness::new();
    harness
        .transport
        .respond(RawResponse::json(StatusCode::OK, r#"{"success": true}"#));

    let form = InterceptedForm::new("/settings", Method::POST)
        .with_fields(FormFields::new().with_text("a", "1").with_text("b", "2"));
    harness.app.interceptor.submit(form).await;

    let request = harness.transport.last_request();
    assert_eq!(request.url, "/settings");
    let body = request.body.expect("POST carries a body");
    let names: Vec<&str> = body.iter().map(|(name, _)| name).collect();
    assert_eq!(names, vec!["a", "b"]);
}

#[tokio::test]
async fn test_opted_out_form_is_left_alone() {
    let harness = Harness::new();
    let seen = harness.record_events();

    let form = post_form("/native").with_options(FormOptions::default().opted_out());
    assert!(!harness.app.interceptor.accepts(&form));

    let outcome = harness.app.interceptor.submit(form).await;

    assert_eq!(outcome, SubmissionOutcome::Skipped);
    assert!(!outcome.reached_network());
    assert!(seen.borrow().is_empty());
    assert_eq!(harness.transport.request_count(), 0);
}

#[tokio::test]
async fn test_declined_confirmation_sends_nothing() {
    let harness = Harness::new();
    harness.host.confirm_answer.set(false);
    let seen = harness.record_events();

    let form = post_form("/danger").with_options(FormOptions::default().with_confirm("Sure?"));
    let outcome = harness.app.interceptor.submit(form).await;

    assert_eq!(outcome, SubmissionOutcome::Declined);
    assert_eq!(harness.host.prompts.borrow().as_slice(), ["Sure?"]);
    assert!(seen.borrow().is_empty());
    assert_eq!(harness.transport.request_count(), 0);
    assert!(harness.host.busy_log.borrow().is_empty());
}

#[tokio::test]
async fn test_accepted_confirmation_proceeds() {
    let harness = Harness::new();
    harness
        .transport
        .respond(RawResponse::json(StatusCode::OK, r#"{"success": true}"#));
    let seen = harness.record_events();

    let form = post_form("/danger").with_options(FormOptions::default().with_confirm("Sure?"));
    let outcome = harness.app.interceptor.submit(form).await;

    assert_eq!(outcome, SubmissionOutcome::Succeeded);
    assert_eq!(
        seen.borrow().as_slice(),
        [EventKind::Before, EventKind::Success, EventKind::Complete]
    );
}

#[tokio::test]
async fn test_cancelled_before_aborts_submission() {
    let harness = Harness::new();
    let seen = harness.record_events();
    harness
        .bus()
        .subscribe(EventKind::Before, |event| event.prevent_default());

    let form = post_form("/items");
    let id = form.id;
    let outcome = harness.app.interceptor.submit(form).await;

    assert_eq!(outcome, SubmissionOutcome::Cancelled);
    assert_eq!(seen.borrow().as_slice(), [EventKind::Before]);
    assert_eq!(harness.transport.request_count(), 0);
    assert!(harness.host.busy_log.borrow().is_empty());
    assert_eq!(harness.app.interceptor.state(id), SubmissionState::Idle);
}

#[tokio::test]
async fn test_complete_fires_once_and_submitter_is_restored() {
    let responses: Vec<Option<RawResponse>> = vec![
        Some(RawResponse::json(StatusCode::OK, r#"{"success": true}"#)),
        Some(RawResponse::json(StatusCode::OK, r#"{"success": false, "error": "no"}"#)),
        Some(RawResponse::json(StatusCode::OK, "{not json")),
        Some(RawResponse::html(StatusCode::OK, "<html></html>")),
        Some(RawResponse::new(StatusCode::INTERNAL_SERVER_ERROR, "boom").with_content_type("text/plain")),
        None,
    ];

    for response in responses {
        let harness = Harness::new();
        match response {
            Some(response) => harness.transport.respond(response),
            None => harness.transport.fail("connection reset"),
        }
        let seen = harness.record_events();

        let form = post_form("/items").with_submitter(Submitter {
            name: Some("save".to_string()),
            value: Some("1".to_string()),
        });
        let id = form.id;
        harness.app.interceptor.submit(form).await;

        let events = seen.borrow();
        println!("Events: {:?}", events);
        assert_eq!(events.first(), Some(&EventKind::Before));
        assert_eq!(events.last(), Some(&EventKind::Complete));
        assert_eq!(
            events.iter().filter(|kind| **kind == EventKind::Complete).count(),
            1
        );
        assert_eq!(events.len(), 3);

        assert!(!harness.host.is_busy(id));
        assert_eq!(
            harness.host.busy_log.borrow().as_slice(),
            [(id, true), (id, false)]
        );
        assert_eq!(harness.app.interceptor.in_flight(), 0);
    }
}

#[tokio::test]
async fn test_success_without_redirect_shows_default_message() {
    let harness = Harness::new();
    harness
        .transport
        .respond(RawResponse::json(StatusCode::OK, r#"{"success": true}"#));

    harness.app.interceptor.submit(post_form("/items")).await;

    let shown = harness.banner.feedback().expect("banner shown");
    assert_eq!(shown.kind, FeedbackKind::Success);
    assert_eq!(shown.message, "Operation completed successfully.");
    assert_eq!(harness.host.reloads.get(), 0);
    assert!(harness.host.navigations.borrow().is_empty());
}

#[tokio::test]
async fn test_success_with_reload_redirect() {
    let harness = Harness::new();
    harness.transport.respond(RawResponse::json(
        StatusCode::OK,
        r#"{"success": true, "redirect": "reload"}"#,
    ));
    let seen = harness.record_events();

    harness.app.interceptor.submit(post_form("/items")).await;

    assert_eq!(
        seen.borrow().as_slice(),
        [EventKind::Before, EventKind::Success, EventKind::Complete]
    );
    assert_eq!(harness.host.reloads.get(), 1);
    assert_eq!(
        harness.banner.message().as_deref(),
        Some("Operation completed successfully.")
    );
}

#[tokio::test]
async fn test_success_with_navigation_redirect() {
    let harness = Harness::new();
    harness.transport.respond(RawResponse::json(
        StatusCode::OK,
        r#"{"success": true, "message": "Saved", "redirect": "/dashboard"}"#,
    ));

    harness.app.interceptor.submit(post_form("/items")).await;

    assert_eq!(harness.host.navigations.borrow().as_slice(), ["/dashboard"]);
    assert_eq!(harness.banner.message().as_deref(), Some("Saved"));
}

#[tokio::test]
async fn test_handled_success_suppresses_defaults() {
    let harness = Harness::new();
    harness.transport.respond(RawResponse::json(
        StatusCode::OK,
        r#"{"success": true, "redirect": "reload"}"#,
    ));
    harness
        .bus()
        .subscribe(EventKind::Success, |event| event.mark_handled());

    harness.app.interceptor.submit(post_form("/items")).await;

    assert_eq!(harness.banner.renders.get(), 0);
    assert_eq!(harness.host.reloads.get(), 0);
}

#[tokio::test]
async fn test_logical_failure_shows_server_error() {
    let harness = Harness::new();
    harness.transport.respond(RawResponse::json(
        StatusCode::OK,
        r#"{"success": false, "error": "quota exceeded"}"#,
    ));
    let messages = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&messages);
    harness.bus().subscribe(EventKind::Error, move |event| {
        sink.borrow_mut().push(event.message().map(str::to_string));
    });

    let outcome = harness.app.interceptor.submit(post_form("/items")).await;

    assert_eq!(outcome, SubmissionOutcome::Failed);
    assert_eq!(
        messages.borrow().as_slice(),
        [Some("quota exceeded".to_string())]
    );
    let shown = harness.banner.feedback().expect("banner shown");
    assert_eq!(shown.kind, FeedbackKind::Error);
    assert_eq!(shown.message, "quota exceeded");
    assert!(harness.host.navigations.borrow().is_empty());
    assert_eq!(harness.host.reloads.get(), 0);
}

#[tokio::test]
async fn test_error_status_without_flag_is_failure() {
    let harness = Harness::new();
    harness.transport.respond(RawResponse::json(
        StatusCode::UNPROCESSABLE_ENTITY,
        r#"{"message": "Title is required"}"#,
    ));

    let outcome = harness.app.interceptor.submit(post_form("/items")).await;

    assert_eq!(outcome, SubmissionOutcome::Failed);
    assert_eq!(harness.banner.message().as_deref(), Some("Title is required"));
}

#[tokio::test]
async fn test_failure_redirect_is_still_followed() {
    let harness = Harness::new();
    harness.transport.respond(RawResponse::json(
        StatusCode::UNAUTHORIZED,
        r#"{"success": false, "error": "Session expired", "redirect": "/login"}"#,
    ));

    harness.app.interceptor.submit(post_form("/items")).await;

    assert_eq!(harness.host.navigations.borrow().as_slice(), ["/login"]);
    assert_eq!(harness.banner.message().as_deref(), Some("Session expired"));
}

#[tokio::test]
async fn test_handled_error_suppresses_banner() {
    let harness = Harness::new();
    harness.transport.respond(RawResponse::json(
        StatusCode::OK,
        r#"{"success": false, "error": "nope"}"#,
    ));
    harness
        .bus()
        .subscribe(EventKind::Error, |event| event.mark_handled());

    harness.app.interceptor.submit(post_form("/items")).await;

    assert_eq!(harness.banner.renders.get(), 0);
}

#[tokio::test]
async fn test_warning_is_shown_with_message() {
    let harness = Harness::new();
    harness.transport.respond(RawResponse::json(
        StatusCode::OK,
        r#"{"success": true, "message": "Saved", "warning": "Image was resized"}"#,
    ));

    harness.app.interceptor.submit(post_form("/items")).await;

    let shown = harness.banner.feedback().expect("banner shown");
    assert_eq!(shown.warning.as_deref(), Some("Image was resized"));
}

#[tokio::test]
async fn test_invalid_json_reports_invalid_response() {
    let harness = Harness::new();
    harness
        .transport
        .respond(RawResponse::json(StatusCode::OK, "<<not json>>"));
    let seen = harness.record_events();

    let outcome = harness.app.interceptor.submit(post_form("/items")).await;

    assert_eq!(outcome, SubmissionOutcome::InvalidResponse);
    assert_eq!(
        seen.borrow().as_slice(),
        [EventKind::Before, EventKind::Error, EventKind::Complete]
    );
    assert_eq!(
        harness.banner.message().as_deref(),
        Some("Invalid response from server.")
    );
}

#[tokio::test]
async fn test_html_response_replaces_document() {
    let harness = Harness::new();
    harness.transport.respond(RawResponse::html(
        StatusCode::OK,
        "<html><body>Next step</body></html>",
    ));
    let seen = harness.record_events();

    let outcome = harness.app.interceptor.submit(post_form("/wizard")).await;

    assert_eq!(outcome, SubmissionOutcome::Html);
    assert_eq!(
        seen.borrow().as_slice(),
        [EventKind::Before, EventKind::Html, EventKind::Complete]
    );
    assert_eq!(
        harness.host.documents.borrow().as_slice(),
        ["<html><body>Next step</body></html>"]
    );
    assert_eq!(harness.banner.renders.get(), 0);
}

#[tokio::test]
async fn test_handled_html_keeps_document() {
    let harness = Harness::new();
    harness
        .transport
        .respond(RawResponse::html(StatusCode::OK, "<p>fragment</p>"));
    let html = Rc::new(RefCell::new(String::new()));
    let sink = Rc::clone(&html);
    harness.bus().subscribe(EventKind::Html, move |event| {
        if let EventDetail::Html { html, .. } = &event.detail {
            *sink.borrow_mut() = html.clone();
        }
        event.mark_handled();
    });

    harness.app.interceptor.submit(post_form("/wizard")).await;

    assert_eq!(html.borrow().as_str(), "<p>fragment</p>");
    assert!(harness.host.documents.borrow().is_empty());
}

#[tokio::test]
async fn test_plain_text_response_becomes_error() {
    let harness = Harness::new();
    harness.transport.respond(
        RawResponse::new(StatusCode::INTERNAL_SERVER_ERROR, "  Database unavailable \n")
            .with_content_type("text/plain"),
    );

    let outcome = harness.app.interceptor.submit(post_form("/items")).await;

    assert_eq!(outcome, SubmissionOutcome::Failed);
    assert_eq!(
        harness.banner.message().as_deref(),
        Some("Database unavailable")
    );
}

#[tokio::test]
async fn test_empty_text_response_uses_default_failure() {
    let harness = Harness::new();
    harness
        .transport
        .respond(RawResponse::new(StatusCode::BAD_GATEWAY, ""));

    harness.app.interceptor.submit(post_form("/items")).await;

    assert_eq!(
        harness.banner.message().as_deref(),
        Some("The request could not be completed.")
    );
}

#[tokio::test]
async fn test_network_failure_dispatches_failure() {
    let harness = Harness::new();
    harness.transport.fail("connection refused");
    let errors = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&errors);
    harness.bus().subscribe(EventKind::Failure, move |event| {
        if let EventDetail::Failure { error } = &event.detail {
            sink.borrow_mut().push(error.clone());
        }
    });

    let form = post_form("/items");
    let id = form.id;
    let outcome = harness.app.interceptor.submit(form).await;

    assert_eq!(outcome, SubmissionOutcome::NetworkFailure);
    assert!(outcome.reached_network());
    assert_eq!(errors.borrow().len(), 1);
    assert!(errors.borrow()[0].contains("connection refused"));
    assert_eq!(
        harness.banner.message().as_deref(),
        Some("Network error. Check your connection and try again.")
    );
    assert!(!harness.host.is_busy(id));
}

#[tokio::test]
async fn test_silent_form_fires_events_without_banner() {
    let harness = Harness::new();
    harness.transport.respond(RawResponse::json(
        StatusCode::OK,
        r#"{"success": false, "error": "quiet"}"#,
    ));
    let seen = harness.record_events();

    let form = post_form("/items").with_options(FormOptions::default().silent());
    harness.app.interceptor.submit(form).await;

    assert_eq!(seen.borrow().len(), 3);
    assert_eq!(harness.banner.renders.get(), 0);
}

#[tokio::test]
async fn test_state_is_in_flight_while_listeners_run() {
    let harness = Harness::new();
    harness
        .transport
        .respond(RawResponse::json(StatusCode::OK, r#"{"success": true}"#));

    let observed = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&observed);
    let interceptor = Rc::downgrade(&harness.app.interceptor);
    harness.bus().subscribe_all(move |event| {
        if let Some(interceptor) = interceptor.upgrade() {
            sink.borrow_mut()
                .push((event.kind(), interceptor.state(event.form.id)));
        }
    });

    let form = post_form("/items");
    let id = form.id;
    harness.app.interceptor.submit(form).await;

    let observed = observed.borrow();
    assert_eq!(observed[1], (EventKind::Success, SubmissionState::InFlight));
    assert_eq!(
        observed[2],
        (
            EventKind::Complete,
            SubmissionState::Settled(SubmissionOutcome::Succeeded)
        )
    );
    assert_eq!(harness.app.interceptor.state(id), SubmissionState::Idle);
}

#[tokio::test]
async fn test_banner_clears_after_timeout() {
    let harness = Harness::new();
    harness
        .transport
        .respond(RawResponse::json(StatusCode::OK, r#"{"success": true}"#));

    harness.app.interceptor.submit(post_form("/items")).await;
    assert!(harness.banner.message().is_some());

    harness.timers.advance(Duration::from_millis(5999));
    assert!(harness.banner.message().is_some());

    harness.timers.advance(Duration::from_millis(1));
    assert!(harness.banner.message().is_none());
    assert_eq!(harness.timers.pending_count(), 0);
}

#[tokio::test]
async fn test_second_message_restarts_banner_timer() {
    let harness = Harness::new();
    harness
        .transport
        .respond(RawResponse::json(StatusCode::OK, r#"{"success": true, "message": "one"}"#));
    harness
        .transport
        .respond(RawResponse::json(StatusCode::OK, r#"{"success": true, "message": "two"}"#));

    harness.app.interceptor.submit(post_form("/items")).await;
    harness.timers.advance(Duration::from_millis(4000));
    harness.app.interceptor.submit(post_form("/items")).await;

    assert_eq!(harness.timers.pending_count(), 1);
    harness.timers.advance(Duration::from_millis(4000));
    assert_eq!(harness.banner.message().as_deref(), Some("two"));

    harness.timers.advance(Duration::from_millis(2000));
    assert!(harness.banner.message().is_none());
}

#[tokio::test]
async fn test_mistyped_message_still_succeeds() {
    let harness = Harness::new();
    harness.transport.respond(RawResponse::json(
        StatusCode::OK,
        r#"{"success": true, "message": 42, "redirect": "reload"}"#,
    ));
    let seen = harness.record_events();

    let outcome = harness.app.interceptor.submit(post_form("/items")).await;

    assert_eq!(outcome, SubmissionOutcome::Succeeded);
    assert_eq!(
        seen.borrow().as_slice(),
        [EventKind::Before, EventKind::Success, EventKind::Complete]
    );
    assert_eq!(
        harness.banner.message().as_deref(),
        Some("Operation completed successfully.")
    );
    assert_eq!(harness.host.reloads.get(), 1);
}

#[tokio::test]
async fn test_structured_error_falls_back_to_message() {
    let harness = Harness::new();
    harness.transport.respond(RawResponse::json(
        StatusCode::OK,
        r#"{"success": false, "error": {"title": "required"}, "message": "Fix the form"}"#,
    ));

    let outcome = harness.app.interceptor.submit(post_form("/items")).await;

    assert_eq!(outcome, SubmissionOutcome::Failed);
    let shown = harness.banner.feedback().expect("banner shown");
    assert_eq!(shown.kind, FeedbackKind::Error);
    assert_eq!(shown.message, "Fix the form");
}

#[tokio::test]
async fn test_non_object_json_follows_status() {
    let harness = Harness::new();
    harness
        .transport
        .respond(RawResponse::json(StatusCode::OK, "[1, 2, 3]"));
    harness
        .transport
        .respond(RawResponse::json(StatusCode::BAD_REQUEST, "null"));

    let first = harness.app.interceptor.submit(post_form("/items")).await;
    assert_eq!(first, SubmissionOutcome::Succeeded);

    let second = harness.app.interceptor.submit(post_form("/items")).await;
    assert_eq!(second, SubmissionOutcome::Failed);
    assert_eq!(
        harness.banner.message().as_deref(),
        Some("The request could not be completed.")
    );
}
