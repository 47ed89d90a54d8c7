use serde::Deserialize;

use super::definition::ProjectGraph;
use crate::error::{GraphConversionError, ProjectParseError};

/// A trait for custom data models that can be converted into a botforge
/// `ProjectGraph`.
///
/// This is the extension point for making the compiler format-agnostic: parse
/// your own storage format into your own structs, then implement `IntoGraph`
/// to provide the translation into the canonical node/connection shape.
pub trait IntoGraph {
    /// Consumes the object and converts it into a compilable project graph.
    fn into_graph(self) -> Result<ProjectGraph, GraphConversionError>;
}

#[derive(Deserialize)]
struct RawSheet {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    nodes: Vec<super::definition::Node>,
    #[serde(default)]
    connections: Vec<super::definition::Connection>,
}

#[derive(Deserialize)]
struct RawMultiSheetProject {
    sheets: Vec<RawSheet>,
    #[serde(default, alias = "activeSheetId")]
    active_sheet_id: Option<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawProject {
    MultiSheet(RawMultiSheetProject),
    Flat(ProjectGraph),
}

impl ProjectGraph {
    /// Parses a stored project record. Both the flat
    /// `{ nodes, connections }` shape and the multi-sheet variant
    /// `{ sheets: [...], activeSheetId }` are accepted; for multi-sheet
    /// records the active sheet (or the first, if none is marked active)
    /// supplies the graph.
    pub fn from_json(json: &str) -> Result<Self, ProjectParseError> {
        let raw: RawProject = serde_json::from_str(json)
            .map_err(|e| ProjectParseError::JsonParseError(e.to_string()))?;

        match raw {
            RawProject::Flat(graph) => Ok(graph),
            RawProject::MultiSheet(project) => {
                let active = project.active_sheet_id;
                let mut sheets = project.sheets;
                if sheets.is_empty() {
                    return Err(ProjectParseError::EmptyProject);
                }
                let index = active
                    .and_then(|id| sheets.iter().position(|s| s.id.as_deref() == Some(&id)))
                    .unwrap_or(0);
                let sheet = sheets.swap_remove(index);
                Ok(ProjectGraph {
                    nodes: sheet.nodes,
                    connections: sheet.connections,
                })
            }
        }
    }
}
