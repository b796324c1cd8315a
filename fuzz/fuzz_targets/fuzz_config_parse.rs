// SPDX-License-Identifier: MIT OR Apache-2.0
//! Fuzz UiConfig TOML parsing and validation.
//!
//! 1. `parse_toml` never panics on arbitrary input.
//! 2. Parsed configs validate without panicking.
//! 3. Serializing back to TOML and re-parsing is lossless.
#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(s) = std::str::from_utf8(data) else {
        return;
    };
    let Ok(config) = awui_config::parse_toml(s) else {
        return;
    };

    match awui_config::validate_config(&config) {
        Ok(warnings) => {
            for w in &warnings {
                let _ = format!("{w}");
            }
        }
        Err(e) => {
            let _ = format!("{e}");
        }
    }
    let _ = config.endpoint();
    let _ = config.stale_signatures();

    if let Ok(toml_str) = toml::to_string(&config) {
        if let Ok(rt) = awui_config::parse_toml(&toml_str) {
            assert_eq!(config, rt, "TOML round-trip must be lossless");
        }
    }
});
