use thiserror::Error;

/// Errors that can occur while parsing a stored project record into a graph.
///
/// Layout and code generation themselves never fail: structural anomalies in
/// an already-parsed graph (cycles, orphans, unknown node kinds) are logged
/// and degraded instead of surfaced as errors.
#[derive(Error, Debug, Clone)]
pub enum ProjectParseError {
    #[error("Failed to parse project JSON: {0}")]
    JsonParseError(String),

    #[error("Project record contains no sheets")]
    EmptyProject,
}

/// Errors that can occur when converting a custom user format into a
/// botforge `ProjectGraph`.
#[derive(Error, Debug, Clone)]
pub enum GraphConversionError {
    #[error("Invalid project data: {0}")]
    ValidationError(String),
}
