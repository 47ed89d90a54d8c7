//! Text/keyboard node generators. `start`, `message` and `keyboard` nodes
//! share one body shape: substituted text, an optional keyboard built from
//! the node's buttons, a safe edit-or-send, then input/auto transitions.

use std::fmt::Write;

use ahash::AHashSet;

use crate::graph::{TransitionGraph, goto_buttons};
use crate::project::{ButtonAction, KeyboardKind, Node};
use crate::templates::escape_py_string;

use super::{GenerationContext, NodeGenerator, emit_auto_transition, emit_input_wait};

pub struct MessageGenerator;

impl NodeGenerator for MessageGenerator {
    fn capability(&self) -> &'static str {
        "message"
    }

    fn generate(
        &self,
        node: &Node,
        ctx: &GenerationContext,
        graph: &TransitionGraph,
        indent: &str,
    ) -> String {
        let mut visited = AHashSet::new();
        visited.insert(node.id.clone());
        emit_body(node, ctx, graph, indent, &mut visited, false)
    }
}

/// The `start` node is a message node triggered by /start; only the handler
/// capability name differs.
pub struct StartGenerator;

impl NodeGenerator for StartGenerator {
    fn capability(&self) -> &'static str {
        "start"
    }

    fn generate(
        &self,
        node: &Node,
        ctx: &GenerationContext,
        graph: &TransitionGraph,
        indent: &str,
    ) -> String {
        let mut visited = AHashSet::new();
        visited.insert(node.id.clone());
        emit_body(node, ctx, graph, indent, &mut visited, false)
    }
}

pub(super) fn emit_body(
    node: &Node,
    ctx: &GenerationContext,
    graph: &TransitionGraph,
    indent: &str,
    visited: &mut AHashSet<String>,
    via_auto: bool,
) -> String {
    let mut out = String::new();
    let text = escape_py_string(node.data.effective_text());
    let _ = writeln!(
        out,
        "{indent}text = substitute_variables(\"{}\", user_id)",
        text
    );

    let keyboard = emit_keyboard(node, indent);
    out.push_str(&keyboard.code);

    // Auto-transitions skip editing outright; everything else tries to edit
    // the triggering message in place first.
    let prefer_edit = if via_auto { "False" } else { "True" };
    let _ = writeln!(
        out,
        "{indent}await safe_edit_or_send(message, text, reply_markup={}, prefer_edit={})",
        keyboard.markup_expr, prefer_edit
    );

    emit_input_wait(node, indent, &mut out);
    out.push_str(&emit_auto_transition(node, ctx, graph, indent, visited));
    out
}

pub(super) struct KeyboardCode {
    pub code: String,
    /// Expression naming the markup, or `None` when the node has no
    /// keyboard.
    pub markup_expr: &'static str,
}

/// Builds an inline or reply keyboard from the node's buttons. Goto buttons
/// carry `goto:<target>` callback data, input buttons `input:<target>`, url
/// buttons open the url directly.
pub(super) fn emit_keyboard(node: &Node, indent: &str) -> KeyboardCode {
    let buttons = &node.data.buttons;
    if buttons.is_empty() || node.data.keyboard_type == KeyboardKind::None {
        return KeyboardCode {
            code: String::new(),
            markup_expr: "None",
        };
    }

    let mut out = String::new();
    match node.data.keyboard_type {
        KeyboardKind::Reply => {
            let _ = writeln!(out, "{indent}keyboard = ReplyKeyboardMarkup(");
            let _ = writeln!(out, "{indent}    keyboard=[");
            for button in buttons {
                let _ = writeln!(
                    out,
                    "{indent}        [KeyboardButton(text=\"{}\")],",
                    escape_py_string(&button.text)
                );
            }
            let _ = writeln!(out, "{indent}    ],");
            let _ = writeln!(out, "{indent}    resize_keyboard=True,");
            let _ = writeln!(out, "{indent})");
        }
        _ => {
            let _ = writeln!(out, "{indent}keyboard = InlineKeyboardMarkup(");
            let _ = writeln!(out, "{indent}    inline_keyboard=[");
            // Goto buttons first in display order, then the rest as stored.
            let ordered = goto_buttons(node);
            let others = buttons
                .iter()
                .filter(|b| !(b.action == ButtonAction::Goto && b.target.is_some()));
            for button in ordered.into_iter().chain(others) {
                let text = escape_py_string(&button.text);
                let line = match button.action {
                    ButtonAction::Url => {
                        let url = escape_py_string(button.url.as_deref().unwrap_or(""));
                        format!("InlineKeyboardButton(text=\"{text}\", url=\"{url}\")")
                    }
                    ButtonAction::Input => {
                        let target =
                            escape_py_string(button.target.as_deref().unwrap_or_default());
                        format!(
                            "InlineKeyboardButton(text=\"{text}\", callback_data=\"input:{target}\")"
                        )
                    }
                    _ => {
                        let target =
                            escape_py_string(button.target.as_deref().unwrap_or_default());
                        format!(
                            "InlineKeyboardButton(text=\"{text}\", callback_data=\"goto:{target}\")"
                        )
                    }
                };
                let _ = writeln!(out, "{indent}        [{line}],");
            }
            let _ = writeln!(out, "{indent}    ],");
            let _ = writeln!(out, "{indent})");
        }
    }

    KeyboardCode {
        code: out,
        markup_expr: "keyboard",
    }
}
