// SPDX-License-Identifier: MIT OR Apache-2.0
//! The render target owned by the presenter.

use std::sync::Mutex;

/// The single shared overlay region.
///
/// Implementations must not call back into the presenter or panic: both
/// methods are invoked while the presenter holds its state lock.
pub trait Overlay: Send + Sync {
    /// Replace the dialog content with `markup`.
    fn render(&self, markup: &str);
    /// Show or hide the overlay.
    fn set_visible(&self, visible: bool);
}

/// Point-in-time view of a [`MemoryOverlay`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OverlaySnapshot {
    /// Latest rendered markup.
    pub markup: String,
    /// Whether the overlay is visible.
    pub visible: bool,
    /// Number of renders so far.
    pub renders: usize,
}

/// Overlay that keeps its content in memory, for headless hosts and tests.
#[derive(Debug, Default)]
pub struct MemoryOverlay {
    inner: Mutex<OverlaySnapshot>,
}

impl MemoryOverlay {
    /// Create an empty, hidden overlay.
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of the current state.
    pub fn snapshot(&self) -> OverlaySnapshot {
        self.inner.lock().expect("overlay lock poisoned").clone()
    }

    /// Latest rendered markup.
    pub fn markup(&self) -> String {
        self.snapshot().markup
    }

    /// Whether the overlay is visible.
    pub fn is_visible(&self) -> bool {
        self.snapshot().visible
    }
}

impl Overlay for MemoryOverlay {
    fn render(&self, markup: &str) {
        let mut state = self.inner.lock().expect("overlay lock poisoned");
        state.markup = markup.to_string();
        state.renders += 1;
    }

    fn set_visible(&self, visible: bool) {
        self.inner.lock().expect("overlay lock poisoned").visible = visible;
    }
}
