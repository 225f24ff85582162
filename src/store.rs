//! Reading and writing dialogue document files.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result, bail};

use crate::document::{export, import};
use crate::graph::model::Graph;

/// File name commands default to when none is given.
pub const DEFAULT_FILE: &str = "dialogue.json";

/// Read and normalize a document. The returned report says what defensive
/// normalization had to change (see `import::ImportReport`).
pub fn load(path: &Path) -> Result<(Graph, import::ImportReport)> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    import::from_str(&text).with_context(|| format!("failed to load {}", path.display()))
}

pub fn save(graph: &Graph, path: &Path) -> Result<()> {
    let text = export::to_json_string(graph)?;
    fs::write(path, text).with_context(|| format!("failed to write {}", path.display()))
}

/// Write a fresh empty document. Refuses to clobber an existing file.
pub fn create_empty(path: &Path) -> Result<()> {
    if path.exists() {
        bail!("{} already exists", path.display());
    }
    save(&Graph::new(), path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::model::NodeKind;
    use tempfile::TempDir;

    #[test]
    fn save_then_load_round_trips() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("dialogue.json");

        let mut graph = Graph::new();
        graph.create_node(NodeKind::Dialogue);
        graph.create_node(NodeKind::Outcome);
        save(&graph, &path).unwrap();

        let (loaded, report) = load(&path).unwrap();
        assert!(report.is_clean());
        assert_eq!(loaded.nodes.len(), 2);
        assert_eq!(loaded.nodes[0].data, graph.nodes[0].data);
    }

    #[test]
    fn create_empty_refuses_to_overwrite() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("dialogue.json");
        create_empty(&path).unwrap();
        assert!(create_empty(&path).is_err());
    }

    #[test]
    fn load_missing_file_fails_with_path_context() {
        let dir = TempDir::new().unwrap();
        let err = load(&dir.path().join("absent.json")).unwrap_err();
        assert!(format!("{err:#}").contains("absent.json"));
    }

    #[test]
    fn load_rejects_garbage() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("broken.json");
        fs::write(&path, "{ not json").unwrap();
        assert!(load(&path).is_err());
    }
}
