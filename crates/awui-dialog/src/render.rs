// SPDX-License-Identifier: MIT OR Apache-2.0
//! Markup rendering for the overlay region.
//!
//! The structure matches the stylesheet shipped with the page
//! (`modal-header`, `modal-body`, `modal-footer`). Every piece of caller text
//! is HTML-escaped. Routing keys travel as `data-*` attributes so host glue
//! can call [`crate::DialogPresenter::click`] and
//! [`crate::DialogPresenter::dismiss`].

use crate::DialogHandle;
use crate::descriptor::DialogDescriptor;
use v_htmlescape::escape;

/// Render `descriptor` for the dialog identified by `handle`.
pub fn render_markup(handle: DialogHandle, descriptor: &DialogDescriptor) -> String {
    let id = handle.get();
    let mut out = String::with_capacity(256);

    out.push_str(&format!(
        r#"<div class="modal-header"><div class="modal-icon {kind}"><i class="{icon}"></i></div><h3 class="modal-title">{title}</h3>"#,
        kind = descriptor.kind().as_str(),
        icon = escape(descriptor.icon()),
        title = escape(descriptor.title()),
    ));
    if descriptor.is_closable() {
        out.push_str(&format!(
            r#"<button class="modal-close" data-dialog="{id}" data-action="dismiss">&times;</button>"#
        ));
    }
    out.push_str("</div>");

    out.push_str(r#"<div class="modal-body">"#);
    out.push_str(&render_body(descriptor.message()));
    out.push_str("</div>");

    if !descriptor.buttons().is_empty() {
        out.push_str(r#"<div class="modal-footer">"#);
        for button in descriptor.buttons() {
            out.push_str(&format!(
                r#"<button class="{class}" data-dialog="{id}" data-button="{key}">{label}</button>"#,
                class = button.style.class(),
                key = escape(button.id.as_str()),
                label = escape(&button.label),
            ));
        }
        out.push_str("</div>");
    }

    out
}

fn render_body(message: &str) -> String {
    message
        .lines()
        .map(|line| escape(line).to_string())
        .collect::<Vec<_>>()
        .join("<br>")
}
