// SPDX-License-Identifier: MIT OR Apache-2.0
//! Fuzz catalog lookup with arbitrary keys.
//!
//! Lookup is total: every key yields a non-empty message, and keys that
//! resolve to a category round-trip through `as_str`.
#![no_main]
use awui_error::{ErrorCategory, lookup_message};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let key = String::from_utf8_lossy(data);
    let message = lookup_message(&key);
    assert!(!message.is_empty());

    match ErrorCategory::from_key(&key) {
        Some(category) => {
            assert_eq!(category.as_str(), key);
            assert_eq!(category.message(), message);
        }
        None => assert_eq!(message, ErrorCategory::UnknownError.message()),
    }

    if data.len() >= 2 {
        let status = u16::from_le_bytes([data[0], data[1]]);
        let _ = ErrorCategory::for_status(status).message();
    }
});
