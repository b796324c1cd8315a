// SPDX-License-Identifier: MIT OR Apache-2.0
//! Classification with a live presenter: one record and one dialog per call.

use awui_dialog::{ButtonId, DialogKind, DialogPresenter, Key, MemoryOverlay};
use awui_error::ErrorCategory;
use awui_normalizer::{
    CountingReloader, ErrorNormalizer, GlobalFailure, HttpFailure, MemoryForm, NetworkFailure,
    UNEXPECTED_MESSAGE, UNEXPECTED_TITLE, ValidationErrors,
};
use awui_telemetry::{ErrorLog, LogKind, MemorySink, PageContext};
use serde_json::json;
use std::sync::Arc;

struct Harness {
    normalizer: ErrorNormalizer,
    presenter: DialogPresenter,
    overlay: Arc<MemoryOverlay>,
    sink: MemorySink,
    reloader: Arc<CountingReloader>,
}

fn harness() -> Harness {
    let sink = MemorySink::new();
    let log = ErrorLog::new(
        PageContext::new("https://training.example.org/assessment/1", "Mozilla/5.0"),
        vec![Arc::new(sink.clone())],
    );
    let (presenter, overlay) = DialogPresenter::headless();
    let reloader = Arc::new(CountingReloader::new());
    let normalizer = ErrorNormalizer::new(log)
        .with_presenter(presenter.clone())
        .with_reloader(reloader.clone())
        .with_stale_signatures(["ChunkLoadError"]);
    Harness {
        normalizer,
        presenter,
        overlay,
        sink,
        reloader,
    }
}

#[test]
fn response_shows_error_dialog() {
    let h = harness();
    let msg = h
        .normalizer
        .classify_response(&HttpFailure::from_status(401, "/api/me"), "Profile");
    assert_eq!(msg, "Please log in to access this feature.");
    assert_eq!(h.presenter.active_title().as_deref(), Some("Error"));
    assert_eq!(h.presenter.active_kind(), Some(DialogKind::Error));
    assert!(h.overlay.markup().contains(msg));
    assert_eq!(h.sink.kinds(), vec![LogKind::Api]);
}

#[test]
fn every_classify_logs_exactly_once() {
    let h = harness();
    let n = &h.normalizer;
    n.classify_response(&HttpFailure::from_status(500, "/x"), "a");
    n.classify_validation(&ValidationErrors::message("bad"), None);
    n.classify_network_error(&NetworkFailure::new("TypeError", "Failed to fetch"), "b");
    n.classify_assessment("ASSESSMENT_INCOMPLETE", json!({}));
    n.classify_module("MODULE_LOCKED", json!({}));
    assert_eq!(
        h.sink.kinds(),
        vec![
            LogKind::Api,
            LogKind::Validation,
            LogKind::Network,
            LogKind::Assessment,
            LogKind::Module,
        ]
    );
    for rec in h.sink.records() {
        assert!(rec.timestamp.ends_with('Z'));
    }
    // Last dialog wins.
    assert_eq!(h.presenter.active_title().as_deref(), Some("Module Error"));
    assert_eq!(
        h.presenter.active_message().as_deref(),
        Some(ErrorCategory::ModuleLocked.message())
    );
}

#[test]
fn validation_highlights_form() {
    let h = harness();
    let mut form = MemoryForm::new(["email", "password"]);
    let errors = ValidationErrors::from_json(
        r#"{"email": ["Invalid format"], "password": "Too short", "ghost": "skipped"}"#,
    )
    .unwrap();

    let msg = h.normalizer.classify_validation(&errors, Some(&mut form));
    assert_eq!(
        msg,
        "Please correct the following errors:\n\n• Invalid format\n• Too short\n• skipped"
    );
    assert!(form.is_invalid("email"));
    assert_eq!(form.feedback("password"), Some("Too short"));
    assert_eq!(h.presenter.active_title().as_deref(), Some("Validation Error"));
    assert!(h.overlay.markup().contains("• Invalid format<br>• Too short"));

    let rec = h.sink.last().unwrap();
    assert_eq!(rec.kind, LogKind::Validation);
    assert_eq!(rec.details["errors"]["password"], "Too short");
}

#[test]
fn network_dialog_title() {
    let h = harness();
    let msg = h.normalizer.classify_network_error(
        &NetworkFailure::new("TypeError", "Failed to fetch"),
        "Submitting",
    );
    assert_eq!(msg, ErrorCategory::NetworkError.message());
    assert_eq!(h.presenter.active_title().as_deref(), Some("Connection Error"));
}

#[test]
fn named_dialog_titles() {
    let h = harness();
    h.normalizer.classify_assessment("NOT_A_KEY", json!({}));
    assert_eq!(h.presenter.active_title().as_deref(), Some("Assessment Error"));
    assert_eq!(
        h.presenter.active_message().as_deref(),
        Some("An unexpected error occurred. Please try again.")
    );
}

#[test]
fn shorthands_use_default_titles() {
    let h = harness();
    let n = &h.normalizer;

    n.show_success("Saved.", None);
    assert_eq!(h.presenter.active_title().as_deref(), Some("Success"));
    n.show_info("Note.", None);
    assert_eq!(h.presenter.active_title().as_deref(), Some("Information"));
    n.show_warning("Careful.", Some("Heads up"));
    assert_eq!(h.presenter.active_title().as_deref(), Some("Heads up"));

    let handle = n.show_loading(None, None).expect("presenter configured");
    assert_eq!(h.presenter.active_title().as_deref(), Some("Please Wait"));
    assert_eq!(h.presenter.active_message().as_deref(), Some("Loading..."));
    assert!(!h.presenter.handle_key(Key::Escape));
    assert_eq!(h.presenter.active_handle(), Some(handle));
    n.hide_loading();
    assert!(!h.presenter.is_showing());
    assert!(h.sink.is_empty(), "presentation alone does not log");
}

#[test]
fn global_failure_shows_generic_dialog() {
    let h = harness();
    h.normalizer
        .handle_global(GlobalFailure::new("TypeError: cannot read x"));
    assert_eq!(h.presenter.active_title().as_deref(), Some(UNEXPECTED_TITLE));
    assert_eq!(h.presenter.active_message().as_deref(), Some(UNEXPECTED_MESSAGE));

    let handle = h.presenter.active_handle().unwrap();
    assert!(h.presenter.click(handle, &ButtonId::new(ButtonId::OK)));
    assert!(!h.presenter.is_showing());
    assert_eq!(h.reloader.count(), 0);

    let rec = h.sink.last().unwrap();
    assert_eq!(rec.kind, LogKind::Global);
    assert_eq!(rec.message, "TypeError: cannot read x");
    assert_eq!(rec.details["staleAsset"], false);
}

#[test]
fn stale_asset_reloads_on_acknowledge() {
    let h = harness();
    h.normalizer
        .handle_global(GlobalFailure::stale_asset("bundle outdated"));
    assert_eq!(h.reloader.count(), 0, "waits for the user");

    let handle = h.presenter.active_handle().unwrap();
    assert!(h.presenter.click(handle, &ButtonId::new(ButtonId::OK)));
    assert_eq!(h.reloader.count(), 1);
    assert!(!h.presenter.is_showing());
}

#[test]
fn stale_asset_escape_does_not_reload() {
    let h = harness();
    h.normalizer
        .handle_global(GlobalFailure::stale_asset("bundle outdated"));
    assert!(h.presenter.handle_key(Key::Escape));
    assert_eq!(h.reloader.count(), 0);
}

#[tokio::test]
async fn supervised_rejection_takes_global_path() {
    let h = harness();
    let task = h
        .normalizer
        .supervise(async { Err::<(), _>("ChunkLoadError: Loading chunk 12 failed.") })
        .unwrap();
    task.await.unwrap();

    let rec = h.sink.last().unwrap();
    assert_eq!(rec.kind, LogKind::Global);
    assert_eq!(rec.details["origin"], "rejection");
    assert_eq!(rec.details["staleAsset"], true);

    let handle = h.presenter.active_handle().unwrap();
    h.presenter.click(handle, &ButtonId::new(ButtonId::OK));
    assert_eq!(h.reloader.count(), 1);
}

#[tokio::test]
async fn supervised_success_is_silent() {
    let h = harness();
    h.normalizer
        .supervise(async { Ok::<(), String>(()) })
        .unwrap()
        .await
        .unwrap();
    assert!(h.sink.is_empty());
    assert!(!h.presenter.is_showing());
}
