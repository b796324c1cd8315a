// SPDX-License-Identifier: MIT OR Apache-2.0
//! Fuzz validation-bag decoding from JSON.
//!
//! Decoding never panics, and every decoded bag renders a message that
//! starts with the fixed header and has one bullet line per error.
#![no_main]
use awui_normalizer::{VALIDATION_HEADER, ValidationErrors};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(s) = std::str::from_utf8(data) else {
        return;
    };
    let Ok(errors) = ValidationErrors::from_json(s) else {
        return;
    };

    let message = errors.to_message();
    assert!(message.starts_with(VALIDATION_HEADER));
    for bullet in errors.bullets() {
        assert!(message.contains(bullet));
    }

    let json = serde_json::to_string(&errors).expect("validation bags serialize");
    let _ = ValidationErrors::from_json(&json);
});
