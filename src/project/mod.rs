//! Canonical project data model: nodes, buttons, connections, and the
//! conversion trait for custom storage formats.

mod conversion;
mod definition;

pub use conversion::IntoGraph;
pub use definition::{
    Button, ButtonAction, Connection, DeliveryMethod, KeyboardKind, Node, NodeData, NodeKind,
    Position, ProjectGraph, RecipientSource,
};
