// SPDX-License-Identifier: MIT OR Apache-2.0
//! Declarative dialog descriptions.

use crate::DialogPresenter;
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

/// Icon classes used by the built-in dialog presets.
pub mod icons {
    /// Check mark for success dialogs.
    pub const SUCCESS: &str = "fas fa-check-circle";
    /// Warning triangle for error dialogs.
    pub const ERROR: &str = "fas fa-exclamation-triangle";
    /// Exclamation circle for warning dialogs.
    pub const WARNING: &str = "fas fa-exclamation-circle";
    /// Info circle for info dialogs.
    pub const INFO: &str = "fas fa-info-circle";
    /// Question mark for confirmation dialogs.
    pub const QUESTION: &str = "fas fa-question-circle";
    /// Spinning indicator for loading dialogs.
    pub const SPINNER: &str = "fas fa-spinner fa-spin";
}

/// Errors raised while assembling a [`DialogDescriptor`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DialogError {
    /// Two buttons in one dialog share an id.
    #[error("duplicate button id '{id}'")]
    DuplicateButton {
        /// The repeated id.
        id: String,
    },
    /// A button id is empty or whitespace.
    #[error("button id must not be empty")]
    EmptyButtonId,
}

// ---------------------------------------------------------------------------
// Kinds and styles
// ---------------------------------------------------------------------------

/// Visual flavour of a dialog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DialogKind {
    /// Operation succeeded.
    Success,
    /// Operation failed.
    Error,
    /// Caution or confirmation.
    Warning,
    /// Neutral information or progress.
    Info,
}

impl DialogKind {
    /// CSS modifier used on the icon container.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Error => "error",
            Self::Warning => "warning",
            Self::Info => "info",
        }
    }
}

impl fmt::Display for DialogKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Visual style of a dialog button.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ButtonStyle {
    /// Default call to action.
    Primary,
    /// De-emphasised action, typically cancel.
    Secondary,
    /// Destructive or error acknowledgement.
    Danger,
    /// Positive acknowledgement.
    Success,
    /// Caution acknowledgement.
    Warning,
}

impl ButtonStyle {
    /// Full class list for the rendered button.
    pub fn class(&self) -> &'static str {
        match self {
            Self::Primary => "modal-btn modal-btn-primary",
            Self::Secondary => "modal-btn modal-btn-secondary",
            Self::Danger => "modal-btn modal-btn-danger",
            Self::Success => "modal-btn modal-btn-success",
            Self::Warning => "modal-btn modal-btn-warning",
        }
    }
}

// ---------------------------------------------------------------------------
// Buttons
// ---------------------------------------------------------------------------

/// Stable routing key for a button, independent of its label.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ButtonId(String);

impl ButtonId {
    /// Id of the single acknowledgement button of the preset dialogs.
    pub const OK: &'static str = "ok";
    /// Id of the cancel button of confirmation dialogs.
    pub const CANCEL: &'static str = "cancel";
    /// Id of the confirm button of confirmation dialogs.
    pub const CONFIRM: &'static str = "confirm";

    /// Create an id.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ButtonId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl fmt::Display for ButtonId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Callback bound to a button. Receives the presenter so it can close the
/// dialog or show a follow-up.
#[derive(Clone)]
pub struct ButtonAction(Arc<dyn Fn(&DialogPresenter) + Send + Sync>);

impl ButtonAction {
    /// Wrap a callback.
    pub fn new(f: impl Fn(&DialogPresenter) + Send + Sync + 'static) -> Self {
        Self(Arc::new(f))
    }

    /// The default action: close the active dialog.
    pub fn close() -> Self {
        Self::new(|presenter| presenter.close())
    }

    pub(crate) fn invoke(&self, presenter: &DialogPresenter) {
        (self.0)(presenter)
    }
}

impl fmt::Debug for ButtonAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ButtonAction(..)")
    }
}

/// One button of a dialog.
#[derive(Debug, Clone)]
pub struct ButtonDescriptor {
    /// Routing key, unique within the dialog.
    pub id: ButtonId,
    /// Display label.
    pub label: String,
    /// Visual style.
    pub style: ButtonStyle,
    /// Callback invoked on click.
    pub action: ButtonAction,
}

impl ButtonDescriptor {
    /// Create a button that closes the dialog when clicked.
    pub fn new(id: impl Into<ButtonId>, label: impl Into<String>, style: ButtonStyle) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            style,
            action: ButtonAction::close(),
        }
    }

    /// Replace the click action.
    pub fn on_click(mut self, f: impl Fn(&DialogPresenter) + Send + Sync + 'static) -> Self {
        self.action = ButtonAction::new(f);
        self
    }

    /// Replace the click action with an existing [`ButtonAction`].
    pub fn with_action(mut self, action: ButtonAction) -> Self {
        self.action = action;
        self
    }
}

// ---------------------------------------------------------------------------
// DialogDescriptor
// ---------------------------------------------------------------------------

/// Everything needed to render one dialog.
///
/// Invariant: button ids are unique and non-empty. Only
/// [`DialogBuilder::build`] and the presets construct descriptors.
#[derive(Debug, Clone)]
pub struct DialogDescriptor {
    kind: DialogKind,
    title: String,
    message: String,
    icon: String,
    closable: bool,
    buttons: Vec<ButtonDescriptor>,
}

impl DialogDescriptor {
    /// Start a custom dialog.
    pub fn builder(kind: DialogKind, title: impl Into<String>) -> DialogBuilder {
        DialogBuilder {
            kind,
            title: title.into(),
            message: String::new(),
            icon: default_icon(kind).to_string(),
            closable: true,
            buttons: Vec::new(),
        }
    }

    /// Preset constructor; callers guarantee unique ids.
    pub(crate) fn preset(
        kind: DialogKind,
        title: String,
        message: String,
        icon: &str,
        closable: bool,
        buttons: Vec<ButtonDescriptor>,
    ) -> Self {
        Self {
            kind,
            title,
            message,
            icon: icon.to_string(),
            closable,
            buttons,
        }
    }

    /// Dialog kind.
    pub fn kind(&self) -> DialogKind {
        self.kind
    }

    /// Title text.
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Body text; may span several lines.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Icon class list.
    pub fn icon(&self) -> &str {
        &self.icon
    }

    /// Whether escape and the header close control may dismiss the dialog.
    pub fn is_closable(&self) -> bool {
        self.closable
    }

    /// Buttons in display order.
    pub fn buttons(&self) -> &[ButtonDescriptor] {
        &self.buttons
    }

    /// Find a button by id.
    pub fn button(&self, id: &ButtonId) -> Option<&ButtonDescriptor> {
        self.buttons.iter().find(|b| &b.id == id)
    }
}

fn default_icon(kind: DialogKind) -> &'static str {
    match kind {
        DialogKind::Success => icons::SUCCESS,
        DialogKind::Error => icons::ERROR,
        DialogKind::Warning => icons::WARNING,
        DialogKind::Info => icons::INFO,
    }
}

/// Builder for custom dialogs.
#[derive(Debug)]
pub struct DialogBuilder {
    kind: DialogKind,
    title: String,
    message: String,
    icon: String,
    closable: bool,
    buttons: Vec<ButtonDescriptor>,
}

impl DialogBuilder {
    /// Set the body text.
    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    /// Override the icon class list.
    pub fn icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = icon.into();
        self
    }

    /// Allow or forbid keyboard and header dismissal.
    pub fn closable(mut self, closable: bool) -> Self {
        self.closable = closable;
        self
    }

    /// Append a button.
    pub fn button(mut self, button: ButtonDescriptor) -> Self {
        self.buttons.push(button);
        self
    }

    /// Validate button ids and produce the descriptor.
    pub fn build(self) -> Result<DialogDescriptor, DialogError> {
        let mut seen = HashSet::new();
        for b in &self.buttons {
            if b.id.as_str().trim().is_empty() {
                return Err(DialogError::EmptyButtonId);
            }
            if !seen.insert(b.id.as_str()) {
                return Err(DialogError::DuplicateButton {
                    id: b.id.to_string(),
                });
            }
        }
        Ok(DialogDescriptor {
            kind: self.kind,
            title: self.title,
            message: self.message,
            icon: self.icon,
            closable: self.closable,
            buttons: self.buttons,
        })
    }
}

// ---------------------------------------------------------------------------
// DialogOptions
// ---------------------------------------------------------------------------

/// Optional overrides accepted by the preset dialogs.
#[derive(Debug, Clone, Default)]
pub struct DialogOptions {
    pub(crate) confirm_text: Option<String>,
    pub(crate) cancel_text: Option<String>,
    pub(crate) on_confirm: Option<ButtonAction>,
}

impl DialogOptions {
    /// No overrides.
    pub fn new() -> Self {
        Self::default()
    }

    /// Label of the acknowledge / confirm button.
    pub fn confirm_text(mut self, text: impl Into<String>) -> Self {
        self.confirm_text = Some(text.into());
        self
    }

    /// Label of the cancel button (confirmation dialogs only).
    pub fn cancel_text(mut self, text: impl Into<String>) -> Self {
        self.cancel_text = Some(text.into());
        self
    }

    /// Replace the acknowledge button's default close action.
    pub fn on_confirm(mut self, f: impl Fn(&DialogPresenter) + Send + Sync + 'static) -> Self {
        self.on_confirm = Some(ButtonAction::new(f));
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_defaults() {
        let d = DialogDescriptor::builder(DialogKind::Warning, "Heads up")
            .build()
            .unwrap();
        assert_eq!(d.title(), "Heads up");
        assert_eq!(d.icon(), icons::WARNING);
        assert!(d.is_closable());
        assert!(d.buttons().is_empty());
    }

    #[test]
    fn duplicate_ids_rejected() {
        let err = DialogDescriptor::builder(DialogKind::Info, "t")
            .button(ButtonDescriptor::new("go", "Go", ButtonStyle::Primary))
            .button(ButtonDescriptor::new("go", "Go again", ButtonStyle::Secondary))
            .build()
            .unwrap_err();
        assert_eq!(err, DialogError::DuplicateButton { id: "go".into() });
    }

    #[test]
    fn shared_labels_are_fine() {
        let d = DialogDescriptor::builder(DialogKind::Info, "t")
            .button(ButtonDescriptor::new("a", "OK", ButtonStyle::Primary))
            .button(ButtonDescriptor::new("b", "OK", ButtonStyle::Secondary))
            .build()
            .unwrap();
        assert_eq!(d.buttons().len(), 2);
        assert_eq!(d.button(&ButtonId::new("b")).unwrap().style, ButtonStyle::Secondary);
    }

    #[test]
    fn empty_id_rejected() {
        let err = DialogDescriptor::builder(DialogKind::Info, "t")
            .button(ButtonDescriptor::new(" ", "Blank", ButtonStyle::Primary))
            .build()
            .unwrap_err();
        assert_eq!(err, DialogError::EmptyButtonId);
    }

    #[test]
    fn style_classes() {
        assert_eq!(ButtonStyle::Danger.class(), "modal-btn modal-btn-danger");
        assert_eq!(ButtonStyle::Warning.class(), "modal-btn modal-btn-warning");
        assert_eq!(DialogKind::Error.to_string(), "error");
    }
}
