//! Broadcast node generator.
//!
//! Emits an async handler that gathers recipients from the configured source
//! tables, walks the ordered broadcast-node chain for each recipient, and
//! accumulates three disjoint counters: success, error and blocked. The
//! per-recipient loop must stay sequential; parallel delivery would break
//! the rate-limit semantics.
//!
//! Two delivery backends exist with distinct behavior, including different
//! blocked-detection substrings. The Bot API backend
//! uses the bot's own send methods and simply continues past failures. The
//! Client API backend drives a separately authorized userbot session and
//! treats its transport as a scoped resource: connect once before the loop,
//! disconnect in a finally block no matter what the loop raised.

use std::fmt::Write;

use ahash::AHashSet;

use crate::graph::TransitionGraph;
use crate::project::{DeliveryMethod, Node, NodeKind, RecipientSource};
use crate::templates::escape_py_string;

use super::{GenerationContext, NodeGenerator, media};

/// Error substrings that mean "this recipient blocked the bot" on the Bot
/// API path.
const BOT_API_BLOCKED_MARKERS: &[&str] = &[
    "bot was blocked",
    "user is deactivated",
    "chat not found",
    "peer_id_invalid",
];

/// The client path surfaces different exception texts for the same
/// condition.
const CLIENT_API_BLOCKED_MARKERS: &[&str] = &[
    "privacy",
    "user_is_blocked",
    "peer id invalid",
    "input_user_deactivated",
];

pub struct BroadcastGenerator;

impl NodeGenerator for BroadcastGenerator {
    fn capability(&self) -> &'static str {
        "broadcast"
    }

    fn generate(
        &self,
        node: &Node,
        ctx: &GenerationContext,
        graph: &TransitionGraph,
        indent: &str,
    ) -> String {
        emit_body(node, ctx, graph, indent)
    }
}

/// Assembles the ordered list of broadcast nodes for one broadcast: message
/// nodes flagged `enableBroadcast` that target this node or "all" (an
/// untargeted flag participates everywhere), expanded by fixed-point
/// iteration over `autoTransitionTo` chains until no new nodes are
/// discovered. Initial members keep input order; discovered members are
/// appended in discovery order.
pub fn collect_broadcast_nodes<'a>(
    graph: &TransitionGraph<'a>,
    broadcast: &Node,
) -> Vec<&'a Node> {
    let mut result: Vec<&Node> = graph
        .nodes()
        .iter()
        .filter(|n| {
            n.kind == NodeKind::Message
                && n.data.enable_broadcast
                && match n.data.broadcast_target_node.as_deref() {
                    Some("all") | None => true,
                    Some(target) => target == broadcast.id,
                }
        })
        .collect();

    let mut seen: AHashSet<String> = result.iter().map(|n| n.id.clone()).collect();
    loop {
        let mut discovered = Vec::new();
        for node in &result {
            if let Some(target) = &node.data.auto_transition_to {
                if let Some(next) = graph.node(target) {
                    if next.kind == NodeKind::Message && !seen.contains(&next.id) {
                        discovered.push(next);
                    }
                }
            }
        }
        if discovered.is_empty() {
            break;
        }
        for node in discovered {
            if seen.insert(node.id.clone()) {
                result.push(node);
            }
        }
    }
    result
}

fn recipient_tables(source: RecipientSource) -> &'static [&'static str] {
    match source {
        RecipientSource::BotUsers => &["bot_users"],
        RecipientSource::UserIds => &["user_ids"],
        RecipientSource::Both => &["bot_users", "user_ids"],
    }
}

pub(super) fn emit_body(
    node: &Node,
    _ctx: &GenerationContext,
    graph: &TransitionGraph,
    indent: &str,
) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "{indent}success_count = 0");
    let _ = writeln!(out, "{indent}error_count = 0");
    let _ = writeln!(out, "{indent}blocked_count = 0");

    // Recipient sources: union across tables, order-preserving dedup.
    let _ = writeln!(out, "{indent}recipients = []");
    for table in recipient_tables(node.data.id_source_type) {
        let _ = writeln!(
            out,
            "{indent}recipients.extend(await fetch_recipients(\"{table}\"))"
        );
    }
    let _ = writeln!(out, "{indent}recipients = list(dict.fromkeys(recipients))");

    // The ordered broadcast-node chain, resolved at generation time.
    let broadcast_nodes = collect_broadcast_nodes(graph, node);
    let _ = writeln!(out, "{indent}broadcast_nodes = [");
    for bnode in &broadcast_nodes {
        let _ = writeln!(
            out,
            "{indent}    {{\"id\": \"{}\", \"text\": \"{}\", \"attached\": {}, \"media\": {}}},",
            escape_py_string(&bnode.id),
            escape_py_string(bnode.data.effective_text()),
            attached_list(bnode),
            static_media_dict(bnode),
        );
    }
    let _ = writeln!(out, "{indent}]");

    match node.data.delivery_method {
        DeliveryMethod::BotApi => emit_bot_api_loop(indent, &mut out),
        DeliveryMethod::ClientApi => emit_client_api_loop(indent, &mut out),
    }

    emit_summary(node, indent, &mut out);
    out
}

/// Bot API delivery: the bot's own send methods, one recipient at a time,
/// loop continues past errors.
fn emit_bot_api_loop(indent: &str, out: &mut String) {
    let markers = marker_tuple(BOT_API_BLOCKED_MARKERS);
    let _ = writeln!(out, "{indent}for recipient_id in recipients:");
    let _ = writeln!(out, "{indent}    try:");
    let _ = writeln!(out, "{indent}        for bnode in broadcast_nodes:");
    let _ = writeln!(
        out,
        "{indent}            text = substitute_variables(bnode[\"text\"], recipient_id)"
    );
    let _ = writeln!(
        out,
        "{indent}            media = resolve_user_media(recipient_id, bnode)"
    );
    let _ = writeln!(out, "{indent}            if media:");
    let _ = writeln!(
        out,
        "{indent}                await send_media_to(bot, recipient_id, media, text)"
    );
    let _ = writeln!(out, "{indent}            else:");
    let _ = writeln!(
        out,
        "{indent}                await bot.send_message(recipient_id, text)"
    );
    let _ = writeln!(out, "{indent}        success_count += 1");
    let _ = writeln!(out, "{indent}    except Exception as e:");
    let _ = writeln!(out, "{indent}        reason = str(e).lower()");
    let _ = writeln!(
        out,
        "{indent}        if any(marker in reason for marker in {markers}):"
    );
    let _ = writeln!(out, "{indent}            blocked_count += 1");
    let _ = writeln!(out, "{indent}        else:");
    let _ = writeln!(out, "{indent}            error_count += 1");
}

/// Client API delivery: a separately authorized Telethon session. One
/// transport connection is opened for the whole broadcast and released in a
/// finally block, so a failed broadcast never leaks the connection.
fn emit_client_api_loop(indent: &str, out: &mut String) {
    let markers = marker_tuple(CLIENT_API_BLOCKED_MARKERS);
    let _ = writeln!(out, "{indent}from telethon import TelegramClient");
    let _ = writeln!(out);
    let _ = writeln!(
        out,
        "{indent}client = TelegramClient(f\"broadcast_{{PROJECT_ID}}\", int(os.getenv(\"TG_API_ID\", \"0\")), os.getenv(\"TG_API_HASH\", \"\"))"
    );
    let _ = writeln!(out, "{indent}await client.connect()");
    let _ = writeln!(out, "{indent}try:");
    let _ = writeln!(out, "{indent}    for recipient_id in recipients:");
    let _ = writeln!(out, "{indent}        try:");
    let _ = writeln!(out, "{indent}            for bnode in broadcast_nodes:");
    let _ = writeln!(
        out,
        "{indent}                text = substitute_variables(bnode[\"text\"], recipient_id)"
    );
    let _ = writeln!(
        out,
        "{indent}                media = resolve_user_media(recipient_id, bnode)"
    );
    let _ = writeln!(out, "{indent}                if media:");
    let _ = writeln!(
        out,
        "{indent}                    await client.send_file(int(recipient_id), media[\"url\"], caption=text)"
    );
    let _ = writeln!(out, "{indent}                else:");
    let _ = writeln!(
        out,
        "{indent}                    await client.send_message(int(recipient_id), text)"
    );
    let _ = writeln!(out, "{indent}            success_count += 1");
    let _ = writeln!(out, "{indent}        except Exception as e:");
    let _ = writeln!(out, "{indent}            reason = str(e).lower()");
    let _ = writeln!(
        out,
        "{indent}            if any(marker in reason for marker in {markers}):"
    );
    let _ = writeln!(out, "{indent}                blocked_count += 1");
    let _ = writeln!(out, "{indent}            else:");
    let _ = writeln!(out, "{indent}                error_count += 1");
    let _ = writeln!(out, "{indent}finally:");
    let _ = writeln!(out, "{indent}    await client.disconnect()");
}

fn emit_summary(node: &Node, indent: &str, out: &mut String) {
    let success = escape_py_string(
        node.data
            .success_message
            .as_deref()
            .unwrap_or("Broadcast finished"),
    );
    let error = escape_py_string(
        node.data
            .error_message
            .as_deref()
            .unwrap_or("Broadcast finished with errors"),
    );
    let _ = writeln!(out, "{indent}if error_count == 0:");
    let _ = writeln!(out, "{indent}    summary = \"{success}\"");
    let _ = writeln!(out, "{indent}else:");
    let _ = writeln!(out, "{indent}    summary = \"{error}\"");
    let _ = writeln!(
        out,
        "{indent}summary += f\" ({{success_count}} sent, {{error_count}} failed, {{blocked_count}} blocked)\""
    );
    let _ = writeln!(
        out,
        "{indent}await safe_edit_or_send(message, summary, prefer_edit=False)"
    );
}

fn marker_tuple(markers: &[&str]) -> String {
    let quoted: Vec<String> = markers.iter().map(|m| format!("\"{m}\"")).collect();
    format!("({})", quoted.join(", "))
}

fn attached_list(node: &Node) -> String {
    let names: Vec<String> = node
        .data
        .attached_media
        .iter()
        .map(|name| format!("\"{}\"", escape_py_string(name)))
        .collect();
    format!("[{}]", names.join(", "))
}

fn static_media_dict(node: &Node) -> String {
    format!("{{{}}}", media::static_media_fields(node))
}
