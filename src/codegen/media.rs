//! Media-family node generators: photo, video, audio, document, sticker,
//! voice, animation, location, contact. Media nodes honor the same
//! variable-bound-media-first policy as broadcasts and fall back to a plain
//! text message when nothing resolves.

use std::fmt::Write;

use ahash::AHashSet;

use crate::graph::TransitionGraph;
use crate::project::{Node, NodeKind};
use crate::templates::escape_py_string;

use super::{GenerationContext, NodeGenerator, emit_auto_transition, emit_input_wait};

pub struct MediaGenerator {
    kind: NodeKind,
}

impl MediaGenerator {
    pub fn new(kind: NodeKind) -> Self {
        Self { kind }
    }
}

impl NodeGenerator for MediaGenerator {
    fn capability(&self) -> &'static str {
        match self.kind {
            NodeKind::Photo => "photo",
            NodeKind::Video => "video",
            NodeKind::Audio => "audio",
            NodeKind::Document => "document",
            NodeKind::Sticker => "sticker",
            NodeKind::Voice => "voice",
            NodeKind::Animation => "animation",
            NodeKind::Location => "location",
            NodeKind::Contact => "contact",
            _ => "media",
        }
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
        emit_body(node, ctx, graph, indent, &mut visited)
    }
}

pub(super) fn emit_body(
    node: &Node,
    ctx: &GenerationContext,
    graph: &TransitionGraph,
    indent: &str,
    visited: &mut AHashSet<String>,
) -> String {
    let mut out = String::new();
    let text = escape_py_string(node.data.effective_text());
    let _ = writeln!(
        out,
        "{indent}text = substitute_variables(\"{}\", user_id)",
        text
    );

    match node.kind {
        NodeKind::Location => {
            let lat = node.data.latitude.unwrap_or(0.0);
            let lon = node.data.longitude.unwrap_or(0.0);
            let _ = writeln!(out, "{indent}await bot.send_location(user_id, {lat}, {lon})");
            let _ = writeln!(out, "{indent}if text:");
            let _ = writeln!(out, "{indent}    await message.answer(text)");
        }
        NodeKind::Contact => {
            let phone = escape_py_string(node.data.phone_number.as_deref().unwrap_or(""));
            let name = escape_py_string(node.data.first_name.as_deref().unwrap_or(""));
            let _ = writeln!(
                out,
                "{indent}await bot.send_contact(user_id, phone_number=\"{phone}\", first_name=\"{name}\")"
            );
        }
        NodeKind::Sticker => {
            let url = escape_py_string(node.data.sticker_url.as_deref().unwrap_or(""));
            let _ = writeln!(out, "{indent}await bot.send_sticker(user_id, \"{url}\")");
        }
        NodeKind::Voice => {
            let url = escape_py_string(node.data.audio_url.as_deref().unwrap_or(""));
            let _ = writeln!(
                out,
                "{indent}await bot.send_voice(user_id, \"{url}\", caption=text)"
            );
        }
        NodeKind::Animation => {
            let url = escape_py_string(node.data.video_url.as_deref().unwrap_or(""));
            let _ = writeln!(
                out,
                "{indent}await bot.send_animation(user_id, \"{url}\", caption=text)"
            );
        }
        _ => {
            let descriptor = media_descriptor(node);
            let _ = writeln!(out, "{indent}media = resolve_user_media(user_id, {descriptor})");
            let _ = writeln!(out, "{indent}if media:");
            let _ = writeln!(out, "{indent}    await send_media_to(bot, user_id, media, text)");
            let _ = writeln!(out, "{indent}else:");
            let _ = writeln!(out, "{indent}    await message.answer(text)");
        }
    }

    emit_input_wait(node, indent, &mut out);
    out.push_str(&emit_auto_transition(node, ctx, graph, indent, visited));
    out
}

/// The Python dict literal describing this node's media for
/// `resolve_user_media`: attached variable names plus static URL fields.
pub(super) fn media_descriptor(node: &Node) -> String {
    let attached = node
        .data
        .attached_media
        .iter()
        .map(|name| format!("\"{}\"", escape_py_string(name)))
        .collect::<Vec<_>>()
        .join(", ");

    format!(
        "{{\"attached\": [{}], \"media\": {{{}}}}}",
        attached,
        static_media_fields(node)
    )
}

/// The node's static URL fields as Python dict entries, type key to url.
pub(super) fn static_media_fields(node: &Node) -> String {
    let mut fields = Vec::new();
    for (key, value) in [
        ("photo", &node.data.image_url),
        ("video", &node.data.video_url),
        ("audio", &node.data.audio_url),
        ("document", &node.data.document_url),
    ] {
        if let Some(url) = value {
            if !url.is_empty() {
                fields.push(format!("\"{}\": \"{}\"", key, escape_py_string(url)));
            }
        }
    }
    fields.join(", ")
}
