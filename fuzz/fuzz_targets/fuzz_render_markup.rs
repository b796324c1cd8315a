// SPDX-License-Identifier: MIT OR Apache-2.0
//! Fuzz dialog rendering with arbitrary titles and messages.
//!
//! Caller text never reaches the markup unescaped.
#![no_main]
use awui_dialog::{DialogOptions, DialogPresenter};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let text = String::from_utf8_lossy(data);
    let mid = text.len() / 2;
    if !text.is_char_boundary(mid) {
        return;
    }
    let (title, message) = text.split_at(mid);

    let (presenter, overlay) = DialogPresenter::headless();
    presenter.error(title, message, DialogOptions::new());
    let markup = overlay.markup();
    assert!(!markup.contains("<script"), "caller text must be escaped");
});
