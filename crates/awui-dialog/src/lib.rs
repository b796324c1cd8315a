// SPDX-License-Identifier: MIT OR Apache-2.0
#![doc = include_str!("../README.md")]
#![deny(unsafe_code)]
#![warn(missing_docs)]

/// Dialog descriptions, buttons and preset options.
pub mod descriptor;
/// Render targets.
pub mod overlay;
/// Presenter lifecycle and confirmation futures.
pub mod presenter;
/// HTML rendering of descriptors.
pub mod render;

pub use descriptor::{
    ButtonAction, ButtonDescriptor, ButtonId, ButtonStyle, DialogBuilder, DialogDescriptor,
    DialogError, DialogKind, DialogOptions, icons,
};
pub use overlay::{MemoryOverlay, Overlay, OverlaySnapshot};
pub use presenter::{
    ALERT_TITLE, CONFIRM_TITLE, Confirmation, DEFAULT_LOADING_MESSAGE, DialogHandle,
    DialogPresenter, Key, PresenterPhase,
};
pub use render::render_markup;
