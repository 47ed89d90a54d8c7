//! # Botforge - Graph-to-Code Compiler for Visual Telegram Bots
//!
//! **Botforge** turns a directed graph of bot-behavior nodes (start, message,
//! keyboard, media, condition, broadcast) into two things: 2D coordinates for
//! canvas display, and a standalone Python program implementing the bot on an
//! async Telegram framework. The compiler itself is synchronous, CPU-bound
//! string and tree work: safe to run repeatedly and concurrently for
//! different projects.
//!
//! ## Core Workflow
//!
//! 1.  **Load Your Data**: Parse the stored project record into a
//!     [`ProjectGraph`](project::ProjectGraph) (directly via
//!     `ProjectGraph::from_json`, or from your own format through the
//!     [`IntoGraph`](project::IntoGraph) trait).
//! 2.  **Lay out** the graph for display with [`layout::layout`], or
//! 3.  **Generate** the bot program: build a
//!     [`GenerationContext`](codegen::GenerationContext), construct a
//!     [`ProgramAssembler`](assembler::ProgramAssembler) over a shared
//!     [`TemplateLibrary`](templates::TemplateLibrary), and call `assemble`.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use botforge::prelude::*;
//!
//! fn main() -> Result<()> {
//!     let json = std::fs::read_to_string("project.json")?;
//!     let graph = ProjectGraph::from_json(&json)?;
//!
//!     // Coordinates for the canvas.
//!     let placed = layout(&graph.nodes, &graph.connections, &LayoutOptions::default());
//!     println!("placed {} nodes", placed.len());
//!
//!     // The runnable bot program.
//!     let templates = TemplateLibrary::new();
//!     let ctx = GenerationContext::new("my_bot", graph, 42)
//!         .with_user_database(true)
//!         .with_comments(true);
//!     let program = ProgramAssembler::new(&templates).assemble(&ctx);
//!     std::fs::write(&program.filename, &program.source)?;
//!     Ok(())
//! }
//! ```
//!
//! Structural anomalies in a graph (cycles, orphan nodes, unknown node
//! kinds) never abort a run: they are logged as warnings and degrade to
//! deterministic fallbacks or visible placeholder comments in the emitted
//! source.

pub mod assembler;
pub mod codegen;
pub mod error;
pub mod graph;
pub mod layout;
pub mod prelude;
pub mod project;
pub mod templates;
