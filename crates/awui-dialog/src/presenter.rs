// SPDX-License-Identifier: MIT OR Apache-2.0
//! The dialog presenter and its two-state lifecycle.
//!
//! ```text
//!   Hidden --show/preset/confirm/loading--> Showing
//!   Showing --show--> Showing            (content and bindings replaced)
//!   Showing --close/button close/Escape--> Hidden
//! ```
//!
//! There is never more than one active dialog. Every show hands out a fresh
//! [`DialogHandle`]; clicks and dismissals carry the handle they were
//! rendered with and are ignored once that dialog has been replaced.

use crate::descriptor::{
    ButtonAction, ButtonDescriptor, ButtonId, ButtonStyle, DialogDescriptor, DialogKind,
    DialogOptions, icons,
};
use crate::overlay::{MemoryOverlay, Overlay};
use crate::render::render_markup;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex, MutexGuard};
use std::task::{Context, Poll};
use tokio::sync::oneshot;
use tracing::{debug, trace};

/// Body text of [`DialogPresenter::loading`] when the caller has none.
pub const DEFAULT_LOADING_MESSAGE: &str = "Please wait...";

/// Default title of [`DialogPresenter::alert`].
pub const ALERT_TITLE: &str = "Alert";

/// Default title of [`DialogPresenter::ask`].
pub const CONFIRM_TITLE: &str = "Confirm";

// ---------------------------------------------------------------------------
// Handles, keys, phases
// ---------------------------------------------------------------------------

/// Opaque identifier of one shown dialog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DialogHandle(u64);

impl DialogHandle {
    /// Rebuild a handle from the value rendered into `data-dialog`.
    pub fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    /// The numeric value rendered into `data-dialog`.
    pub fn get(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for DialogHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "dialog-{}", self.0)
    }
}

/// Keyboard input forwarded by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    /// The escape key.
    Escape,
    /// The enter key.
    Enter,
    /// The tab key.
    Tab,
    /// Any printable character.
    Char(char),
}

/// Visible state of the overlay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PresenterPhase {
    /// No dialog is displayed.
    Hidden,
    /// Exactly one dialog is displayed.
    Showing,
}

// ---------------------------------------------------------------------------
// State
// ---------------------------------------------------------------------------

struct ActiveDialog {
    handle: DialogHandle,
    descriptor: DialogDescriptor,
    escape_armed: bool,
}

#[derive(Default)]
struct PresenterState {
    active: Option<ActiveDialog>,
    last_handle: u64,
}

struct Inner {
    overlay: Arc<dyn Overlay>,
    state: Mutex<PresenterState>,
}

/// Owns the overlay region and the bindings of the active dialog.
///
/// Cloning is cheap and every clone drives the same overlay; construct one
/// at application start and hand clones to whoever needs to present.
#[derive(Clone)]
pub struct DialogPresenter {
    inner: Arc<Inner>,
}

impl fmt::Debug for DialogPresenter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DialogPresenter")
            .field("phase", &self.phase())
            .field("active", &self.active_handle())
            .finish()
    }
}

impl DialogPresenter {
    /// Create a presenter drawing into `overlay`. The overlay starts hidden.
    pub fn new(overlay: Arc<dyn Overlay>) -> Self {
        overlay.set_visible(false);
        Self {
            inner: Arc::new(Inner {
                overlay,
                state: Mutex::new(PresenterState::default()),
            }),
        }
    }

    /// Create a presenter backed by a fresh [`MemoryOverlay`].
    pub fn headless() -> (Self, Arc<MemoryOverlay>) {
        let overlay = Arc::new(MemoryOverlay::new());
        (Self::new(overlay.clone()), overlay)
    }

    fn lock(&self) -> MutexGuard<'_, PresenterState> {
        self.inner.state.lock().expect("presenter lock poisoned")
    }

    // -- Core operations -------------------------------------------------

    /// Render `descriptor`, make the overlay visible and return its handle.
    ///
    /// Any dialog already showing is replaced together with its bindings.
    pub fn show(&self, descriptor: DialogDescriptor) -> DialogHandle {
        let mut state = self.lock();
        state.last_handle += 1;
        let handle = DialogHandle(state.last_handle);

        let markup = render_markup(handle, &descriptor);
        self.inner.overlay.render(&markup);
        self.inner.overlay.set_visible(true);

        debug!(
            target: "awui.dialog",
            %handle,
            kind = %descriptor.kind(),
            title = descriptor.title(),
            buttons = descriptor.buttons().len(),
            "dialog shown"
        );

        let escape_armed = descriptor.is_closable();
        let replaced = state.active.replace(ActiveDialog {
            handle,
            descriptor,
            escape_armed,
        });
        drop(state);

        if let Some(old) = replaced {
            trace!(target: "awui.dialog", replaced = %old.handle, "previous dialog discarded");
        }
        handle
    }

    /// Hide the overlay and drop the active dialog's bindings.
    ///
    /// Closing while hidden is a no-op.
    pub fn close(&self) {
        self.close_if(|_| true);
    }

    /// Close when `predicate` accepts the active dialog. Returns whether a
    /// dialog was closed.
    fn close_if(&self, predicate: impl FnOnce(&ActiveDialog) -> bool) -> bool {
        let mut state = self.lock();
        let accept = state.active.as_ref().map(predicate).unwrap_or(false);
        if !accept {
            return false;
        }
        let closed = state.active.take();
        self.inner.overlay.set_visible(false);
        drop(state);

        if let Some(old) = closed {
            debug!(target: "awui.dialog", handle = %old.handle, "dialog closed");
        }
        true
    }

    /// Dispatch a click on `button` of the dialog identified by `handle`.
    ///
    /// Returns `false` without side effects when the dialog is no longer
    /// active or has no such button.
    pub fn click(&self, handle: DialogHandle, button: &ButtonId) -> bool {
        let action = {
            let state = self.lock();
            state
                .active
                .as_ref()
                .filter(|a| a.handle == handle)
                .and_then(|a| a.descriptor.button(button))
                .map(|b| b.action.clone())
        };
        match action {
            Some(action) => {
                trace!(target: "awui.dialog", %handle, button = %button, "button dispatched");
                action.invoke(self);
                true
            }
            None => {
                debug!(target: "awui.dialog", %handle, button = %button, "stale click ignored");
                false
            }
        }
    }

    /// Header close control. Closes only a closable, still-active dialog.
    pub fn dismiss(&self, handle: DialogHandle) -> bool {
        self.close_if(|a| a.handle == handle && a.descriptor.is_closable())
    }

    /// Forward a key press. `Escape` closes a closable dialog; every other
    /// key is ignored.
    pub fn handle_key(&self, key: Key) -> bool {
        match key {
            Key::Escape => self.close_if(|a| a.escape_armed),
            _ => false,
        }
    }

    // -- Presets ---------------------------------------------------------

    /// Success dialog with a single OK button.
    pub fn success(
        &self,
        title: impl Into<String>,
        message: impl Into<String>,
        options: DialogOptions,
    ) -> DialogHandle {
        self.acknowledge(
            DialogKind::Success,
            icons::SUCCESS,
            ButtonStyle::Success,
            title.into(),
            message.into(),
            options,
        )
    }

    /// Error dialog with a single OK button.
    pub fn error(
        &self,
        title: impl Into<String>,
        message: impl Into<String>,
        options: DialogOptions,
    ) -> DialogHandle {
        self.acknowledge(
            DialogKind::Error,
            icons::ERROR,
            ButtonStyle::Danger,
            title.into(),
            message.into(),
            options,
        )
    }

    /// Warning dialog with a single OK button.
    pub fn warning(
        &self,
        title: impl Into<String>,
        message: impl Into<String>,
        options: DialogOptions,
    ) -> DialogHandle {
        self.acknowledge(
            DialogKind::Warning,
            icons::WARNING,
            ButtonStyle::Warning,
            title.into(),
            message.into(),
            options,
        )
    }

    /// Info dialog with a single OK button.
    pub fn info(
        &self,
        title: impl Into<String>,
        message: impl Into<String>,
        options: DialogOptions,
    ) -> DialogHandle {
        self.acknowledge(
            DialogKind::Info,
            icons::INFO,
            ButtonStyle::Primary,
            title.into(),
            message.into(),
            options,
        )
    }

    fn acknowledge(
        &self,
        kind: DialogKind,
        icon: &str,
        style: ButtonStyle,
        title: String,
        message: String,
        options: DialogOptions,
    ) -> DialogHandle {
        let label = options.confirm_text.unwrap_or_else(|| "OK".to_string());
        let action = options.on_confirm.unwrap_or_else(ButtonAction::close);
        let ok = ButtonDescriptor::new(ButtonId::OK, label, style).with_action(action);
        self.show(DialogDescriptor::preset(
            kind,
            title,
            message,
            icon,
            true,
            vec![ok],
        ))
    }

    /// Two-button confirmation. The returned [`Confirmation`] resolves to
    /// `true` when confirmed and `false` when cancelled.
    ///
    /// The dialog is rendered immediately. If it is closed or replaced
    /// without a button press the confirmation resolves to `false`.
    pub fn confirm(
        &self,
        title: impl Into<String>,
        message: impl Into<String>,
        options: DialogOptions,
    ) -> Confirmation {
        let (tx, rx) = oneshot::channel();
        let slot = Arc::new(Mutex::new(Some(tx)));

        let resolve = |value: bool| {
            let slot = Arc::clone(&slot);
            ButtonAction::new(move |presenter| {
                let sender = slot.lock().expect("confirm slot poisoned").take();
                if let Some(sender) = sender {
                    let _ = sender.send(value);
                }
                presenter.close();
            })
        };

        let cancel = ButtonDescriptor::new(
            ButtonId::CANCEL,
            options.cancel_text.unwrap_or_else(|| "Cancel".to_string()),
            ButtonStyle::Secondary,
        )
        .with_action(resolve(false));
        let confirm = ButtonDescriptor::new(
            ButtonId::CONFIRM,
            options.confirm_text.unwrap_or_else(|| "Confirm".to_string()),
            ButtonStyle::Danger,
        )
        .with_action(resolve(true));

        let handle = self.show(DialogDescriptor::preset(
            DialogKind::Warning,
            title.into(),
            message.into(),
            icons::QUESTION,
            true,
            vec![cancel, confirm],
        ));
        Confirmation { handle, rx }
    }

    /// Message-first info dialog, titled [`ALERT_TITLE`] unless `title` is
    /// given.
    pub fn alert(&self, message: impl Into<String>, title: Option<&str>) -> DialogHandle {
        self.info(
            title.unwrap_or(ALERT_TITLE),
            message,
            DialogOptions::new(),
        )
    }

    /// Message-first [`DialogPresenter::confirm`], titled [`CONFIRM_TITLE`]
    /// unless `title` is given.
    pub fn ask(&self, message: impl Into<String>, title: Option<&str>) -> Confirmation {
        self.confirm(
            title.unwrap_or(CONFIRM_TITLE),
            message,
            DialogOptions::new(),
        )
    }

    /// Non-closable progress dialog without buttons. Stays up until
    /// [`DialogPresenter::close`] or another show.
    pub fn loading(&self, title: impl Into<String>, message: impl Into<String>) -> DialogHandle {
        self.show(DialogDescriptor::preset(
            DialogKind::Info,
            title.into(),
            message.into(),
            icons::SPINNER,
            false,
            Vec::new(),
        ))
    }

    // -- Introspection ---------------------------------------------------

    /// Current phase.
    pub fn phase(&self) -> PresenterPhase {
        if self.lock().active.is_some() {
            PresenterPhase::Showing
        } else {
            PresenterPhase::Hidden
        }
    }

    /// Whether a dialog is displayed.
    pub fn is_showing(&self) -> bool {
        self.phase() == PresenterPhase::Showing
    }

    /// Handle of the displayed dialog.
    pub fn active_handle(&self) -> Option<DialogHandle> {
        self.lock().active.as_ref().map(|a| a.handle)
    }

    /// Title of the displayed dialog.
    pub fn active_title(&self) -> Option<String> {
        self.lock()
            .active
            .as_ref()
            .map(|a| a.descriptor.title().to_string())
    }

    /// Body text of the displayed dialog.
    pub fn active_message(&self) -> Option<String> {
        self.lock()
            .active
            .as_ref()
            .map(|a| a.descriptor.message().to_string())
    }

    /// Kind of the displayed dialog.
    pub fn active_kind(&self) -> Option<DialogKind> {
        self.lock().active.as_ref().map(|a| a.descriptor.kind())
    }

    /// `(id, label)` of every dispatchable button, in display order.
    pub fn active_buttons(&self) -> Vec<(ButtonId, String)> {
        self.lock()
            .active
            .as_ref()
            .map(|a| {
                a.descriptor
                    .buttons()
                    .iter()
                    .map(|b| (b.id.clone(), b.label.clone()))
                    .collect()
            })
            .unwrap_or_default()
    }
}

// ---------------------------------------------------------------------------
// Confirmation
// ---------------------------------------------------------------------------

/// Pending answer of a [`DialogPresenter::confirm`] call.
#[must_use = "a confirmation does nothing unless awaited or polled"]
#[derive(Debug)]
pub struct Confirmation {
    handle: DialogHandle,
    rx: oneshot::Receiver<bool>,
}

impl Confirmation {
    /// Handle of the confirmation dialog.
    pub fn handle(&self) -> DialogHandle {
        self.handle
    }

    /// Non-blocking check. `None` while the user has not answered.
    pub fn try_result(&mut self) -> Option<bool> {
        match self.rx.try_recv() {
            Ok(value) => Some(value),
            Err(oneshot::error::TryRecvError::Empty) => None,
            Err(oneshot::error::TryRecvError::Closed) => Some(false),
        }
    }
}

impl Future for Confirmation {
    type Output = bool;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<bool> {
        let this = self.get_mut();
        Pin::new(&mut this.rx).poll(cx).map(|r| r.unwrap_or(false))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn ok() -> ButtonId {
        ButtonId::new(ButtonId::OK)
    }

    #[test]
    fn starts_hidden() {
        let (p, overlay) = DialogPresenter::headless();
        assert_eq!(p.phase(), PresenterPhase::Hidden);
        assert!(!overlay.is_visible());
        assert_eq!(p.active_handle(), None);
    }

    #[test]
    fn alert_defaults_title() {
        let (p, _overlay) = DialogPresenter::headless();
        p.alert("Session saved.", None);
        assert_eq!(p.active_title().as_deref(), Some(ALERT_TITLE));
        assert_eq!(p.active_kind(), Some(DialogKind::Info));
        assert_eq!(p.active_message().as_deref(), Some("Session saved."));

        p.alert("Session saved.", Some("Saved"));
        assert_eq!(p.active_title().as_deref(), Some("Saved"));
    }

    #[tokio::test]
    async fn ask_defaults_title_and_resolves() {
        let (p, _overlay) = DialogPresenter::headless();
        let pending = p.ask("Leave this module?", None);
        assert_eq!(p.active_title().as_deref(), Some(CONFIRM_TITLE));
        assert_eq!(
            p.active_buttons(),
            vec![
                (ButtonId::new(ButtonId::CANCEL), "Cancel".to_string()),
                (ButtonId::new(ButtonId::CONFIRM), "Confirm".to_string()),
            ]
        );
        assert!(p.click(pending.handle(), &ButtonId::new(ButtonId::CONFIRM)));
        assert!(pending.await);

        let _pending = p.ask("Leave this module?", Some("Leave"));
        assert_eq!(p.active_title().as_deref(), Some("Leave"));
    }

    #[test]
    fn show_then_close() {
        let (p, overlay) = DialogPresenter::headless();
        let h = p.info("Hello", "World", DialogOptions::new());
        assert_eq!(p.active_handle(), Some(h));
        assert!(overlay.is_visible());
        assert!(overlay.markup().contains("World"));
        p.close();
        assert!(!p.is_showing());
        assert!(!overlay.is_visible());
    }

    #[test]
    fn close_is_idempotent() {
        let (p, overlay) = DialogPresenter::headless();
        p.close();
        p.close();
        assert!(!p.is_showing());
        assert_eq!(overlay.snapshot().renders, 0);
    }

    #[test]
    fn handles_increase() {
        let (p, _) = DialogPresenter::headless();
        let a = p.info("a", "", DialogOptions::new());
        let b = p.info("b", "", DialogOptions::new());
        assert!(b > a);
        assert_eq!(b.to_string(), format!("dialog-{}", b.get()));
    }

    #[test]
    fn ok_button_closes_by_default() {
        let (p, _) = DialogPresenter::headless();
        let h = p.success("Saved", "All good", DialogOptions::new());
        assert!(p.click(h, &ok()));
        assert!(!p.is_showing());
    }

    #[test]
    fn on_confirm_replaces_close() {
        let (p, _) = DialogPresenter::headless();
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&hits);
        let h = p.warning(
            "Careful",
            "Really?",
            DialogOptions::new()
                .confirm_text("Proceed")
                .on_confirm(move |_| {
                    counter.fetch_add(1, Ordering::SeqCst);
                }),
        );
        assert_eq!(p.active_buttons(), vec![(ok(), "Proceed".to_string())]);
        assert!(p.click(h, &ok()));
        assert_eq!(hits.load(Ordering::SeqCst), 1);
        assert!(p.is_showing(), "custom action did not close");
    }

    #[test]
    fn unknown_button_is_noop() {
        let (p, _) = DialogPresenter::headless();
        let h = p.error("Oops", "", DialogOptions::new());
        assert!(!p.click(h, &ButtonId::new("nope")));
        assert!(p.is_showing());
    }

    #[test]
    fn escape_respects_closable() {
        let (p, _) = DialogPresenter::headless();
        p.info("x", "", DialogOptions::new());
        assert!(!p.handle_key(Key::Enter));
        assert!(p.handle_key(Key::Escape));
        assert!(!p.is_showing());

        p.loading("Working", DEFAULT_LOADING_MESSAGE);
        assert!(!p.handle_key(Key::Escape));
        assert!(p.is_showing());
    }

    #[test]
    fn dismiss_requires_active_handle() {
        let (p, _) = DialogPresenter::headless();
        let first = p.info("1", "", DialogOptions::new());
        let second = p.info("2", "", DialogOptions::new());
        assert!(!p.dismiss(first));
        assert!(p.is_showing());
        assert!(p.dismiss(second));
        assert!(!p.is_showing());
    }

    #[test]
    fn loading_has_no_buttons_and_no_dismiss() {
        let (p, overlay) = DialogPresenter::headless();
        let h = p.loading("Please Wait", "Loading...");
        assert!(p.active_buttons().is_empty());
        assert!(!p.dismiss(h));
        assert!(overlay.markup().contains(icons::SPINNER));
        p.close();
        assert!(!p.is_showing());
    }

    #[test]
    fn confirm_try_result() {
        let (p, _) = DialogPresenter::headless();
        let mut c = p.confirm("Delete?", "Are you sure?", DialogOptions::new());
        assert_eq!(c.try_result(), None);
        assert!(p.click(c.handle(), &ButtonId::new(ButtonId::CONFIRM)));
        assert_eq!(c.try_result(), Some(true));
        assert!(!p.is_showing());
    }

    #[test]
    fn action_may_show_follow_up() {
        let (p, _) = DialogPresenter::headless();
        let h = p.info(
            "Step 1",
            "",
            DialogOptions::new().on_confirm(|presenter| {
                presenter.info("Step 2", "", DialogOptions::new());
            }),
        );
        assert!(p.click(h, &ok()));
        assert_eq!(p.active_title().as_deref(), Some("Step 2"));
    }
}
