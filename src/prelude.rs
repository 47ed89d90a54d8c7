//! Prelude module for convenient imports
//!
//! Re-exports the most commonly used types and functions so callers can get
//! the core functionality from a single `use botforge::prelude::*;`.

// Assembly and generation
pub use crate::assembler::{GeneratedProgram, ProgramAssembler};
pub use crate::codegen::{GenerationContext, MediaVariable, NodeGenerator, handler_name};

// Layout
pub use crate::layout::{LayoutOptions, NodeSize, compute_levels, layout};

// Data model
pub use crate::project::{
    Button, ButtonAction, Connection, IntoGraph, KeyboardKind, Node, NodeData, NodeKind, Position,
    ProjectGraph, RecipientSource,
};

// Templates and text utilities
pub use crate::templates::{
    TemplateLibrary, extract_placeholders, replace_placeholders, validate_template,
};

// Error types
pub use crate::error::{GraphConversionError, ProjectParseError};

// Result type alias for convenience
pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;
