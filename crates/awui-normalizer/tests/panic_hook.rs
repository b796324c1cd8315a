// SPDX-License-Identifier: MIT OR Apache-2.0
//! The panic hook is process-wide, so this binary holds a single test.

use awui_dialog::{ButtonId, DialogPresenter};
use awui_normalizer::{
    CountingReloader, ErrorNormalizer, GlobalHooks, NormalizerError, UNEXPECTED_TITLE,
};
use awui_telemetry::{ErrorLog, LogKind, MemorySink, PageContext};
use std::sync::Arc;
use std::thread;

#[test]
fn panics_are_logged_presented_and_chained() {
    let sink = MemorySink::new();
    let log = ErrorLog::new(PageContext::default(), vec![Arc::new(sink.clone())]);
    let (presenter, _overlay) = DialogPresenter::headless();
    let reloader = Arc::new(CountingReloader::new());
    let normalizer = ErrorNormalizer::new(log)
        .with_presenter(presenter.clone())
        .with_reloader(reloader.clone())
        .with_stale_signatures(["ChunkLoadError"]);

    assert!(!GlobalHooks::is_installed());
    let _hooks = GlobalHooks::install(normalizer.clone()).unwrap();
    assert!(GlobalHooks::is_installed());
    assert!(matches!(
        GlobalHooks::install(normalizer),
        Err(NormalizerError::AlreadyInstalled)
    ));

    let outcome = thread::spawn(|| panic!("ChunkLoadError: Loading chunk 3 failed.")).join();
    assert!(outcome.is_err(), "the panic still unwinds");

    let rec = sink.last().expect("panic was logged");
    assert_eq!(rec.kind, LogKind::Global);
    assert!(rec.message.starts_with("ChunkLoadError: Loading chunk 3 failed."));
    assert_eq!(rec.details["origin"], "panic");
    assert_eq!(rec.details["staleAsset"], true);

    assert_eq!(presenter.active_title().as_deref(), Some(UNEXPECTED_TITLE));
    let handle = presenter.active_handle().unwrap();
    assert!(presenter.click(handle, &ButtonId::new(ButtonId::OK)));
    assert_eq!(reloader.count(), 1);

    let plain = thread::spawn(|| panic!("index out of bounds")).join();
    assert!(plain.is_err());
    assert_eq!(sink.len(), 2);
    assert_eq!(sink.last().unwrap().details["staleAsset"], false);
}
