//! JSON snapshots of a model graph.

use super::ModelGraph;
use crate::error::TranslateError;
use std::io::Read;
use std::path::Path;

impl ModelGraph {
    pub fn from_json_str(source: &str) -> Result<Self, TranslateError> {
        serde_json::from_str(source).map_err(|err| unreadable("<string>", err))
    }

    pub fn from_json_reader<R: Read>(reader: R) -> Result<Self, TranslateError> {
        serde_json::from_reader(reader).map_err(|err| unreadable("<reader>", err))
    }

    pub fn from_json_path(path: impl AsRef<Path>) -> Result<Self, TranslateError> {
        let path = path.as_ref();
        let shown = path.display().to_string();
        let file = std::fs::File::open(path).map_err(|err| unreadable(&shown, err))?;
        let graph: ModelGraph = serde_json::from_reader(std::io::BufReader::new(file))
            .map_err(|err| unreadable(&shown, err))?;
        tracing::debug!(
            component = "model_graph",
            operation = "load",
            status = "success",
            path = shown.as_str(),
            variables = graph.variables.len(),
            nodes = graph.nodes.len(),
            constraints = graph.constraints.len(),
            "Loaded model graph"
        );
        Ok(graph)
    }

    pub fn to_json_string(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

fn unreadable(path: &str, err: impl std::fmt::Display) -> TranslateError {
    TranslateError::FileUnreadable {
        path: path.to_string(),
        reason: err.to_string(),
    }
}
