use serde::{Deserialize, Serialize};

/// The complete, canonical definition of a bot flow, ready for layout or
/// code generation. This is the target structure for any custom data model
/// conversion and matches the stored-project JSON shape.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProjectGraph {
    #[serde(default)]
    pub nodes: Vec<Node>,
    #[serde(default)]
    pub connections: Vec<Connection>,
}

/// One unit of bot behavior in the visual graph.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Node {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: NodeKind,
    #[serde(default)]
    pub position: Position,
    #[serde(default)]
    pub data: NodeData,
}

impl Node {
    pub fn new(id: impl Into<String>, kind: NodeKind) -> Self {
        Self {
            id: id.into(),
            kind,
            position: Position::default(),
            data: NodeData::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

/// Node capability. The kind decides which `data` fields are meaningful;
/// fields that do not apply to a kind are ignored, never errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    Start,
    Message,
    Keyboard,
    Photo,
    Video,
    Audio,
    Document,
    Sticker,
    Voice,
    Animation,
    Location,
    Contact,
    Condition,
    Broadcast,
    /// Catch-all for node kinds this compiler does not know. Generation
    /// degrades these to a visible placeholder instead of failing.
    #[serde(other)]
    Unknown,
}

impl NodeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeKind::Start => "start",
            NodeKind::Message => "message",
            NodeKind::Keyboard => "keyboard",
            NodeKind::Photo => "photo",
            NodeKind::Video => "video",
            NodeKind::Audio => "audio",
            NodeKind::Document => "document",
            NodeKind::Sticker => "sticker",
            NodeKind::Voice => "voice",
            NodeKind::Animation => "animation",
            NodeKind::Location => "location",
            NodeKind::Contact => "contact",
            NodeKind::Condition => "condition",
            NodeKind::Broadcast => "broadcast",
            NodeKind::Unknown => "unknown",
        }
    }
}

/// Per-node payload. Every field is optional or defaulted so that partially
/// filled editor state still parses; generators substitute safe defaults for
/// anything missing.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NodeData {
    pub text: Option<String>,
    pub message_text: Option<String>,
    pub buttons: Vec<Button>,
    pub keyboard_type: KeyboardKind,
    pub auto_transition_to: Option<String>,
    pub input_target_node_id: Option<String>,
    pub input_variable: Option<String>,

    // Media fields
    pub image_url: Option<String>,
    pub audio_url: Option<String>,
    pub video_url: Option<String>,
    pub document_url: Option<String>,
    pub sticker_url: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub phone_number: Option<String>,
    pub first_name: Option<String>,
    /// Variable names referencing uploaded media, resolved per recipient at
    /// runtime before the static URL fields are consulted.
    pub attached_media: Vec<String>,

    // Condition fields
    pub condition_variable: Option<String>,
    pub condition_value: Option<String>,
    pub true_target_node_id: Option<String>,
    pub false_target_node_id: Option<String>,

    // Broadcast fields
    pub id_source_type: RecipientSource,
    pub success_message: Option<String>,
    pub error_message: Option<String>,
    pub enable_broadcast: bool,
    pub broadcast_target_node: Option<String>,
    pub delivery_method: DeliveryMethod,
}

impl NodeData {
    /// The node's display text; `text` wins over the legacy `messageText`.
    pub fn effective_text(&self) -> &str {
        self.text
            .as_deref()
            .or(self.message_text.as_deref())
            .unwrap_or("")
    }
}

/// One keyboard button. A button with `action == Goto` and a `target` defines
/// an outgoing edge of the graph.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Button {
    pub text: String,
    pub target: Option<String>,
    pub action: ButtonAction,
    pub url: Option<String>,
    pub order: Option<i64>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ButtonAction {
    #[default]
    Goto,
    Input,
    Url,
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeyboardKind {
    Inline,
    Reply,
    #[default]
    None,
}

/// Origin table(s) from which broadcast recipient ids are drawn.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecipientSource {
    #[default]
    BotUsers,
    UserIds,
    Both,
}

/// Transport used by a broadcast node.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryMethod {
    #[default]
    BotApi,
    ClientApi,
}

/// An explicit directed edge between two nodes in the stored graph, distinct
/// from the edges implied by `autoTransitionTo`, `inputTargetNodeId` and
/// button targets.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Connection {
    pub source: String,
    pub target: String,
}
