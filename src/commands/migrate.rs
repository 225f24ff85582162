//! `dlgedit migrate` — normalize a document and write it back.
//!
//! Import already runs every migration; this command just persists the
//! result, either in place or to a separate output file.

use std::path::Path;

use anyhow::Result;

use crate::commands::check;
use crate::store;

pub fn run(file: &Path, output: Option<&Path>) -> Result<()> {
    let (graph, report) = store::load(file)?;
    let target = output.unwrap_or(file);
    store::save(&graph, target)?;

    for line in check::report_lines(&report) {
        println!("  {}", line);
    }
    println!(
        "  Wrote {} ({} nodes, {} edges).",
        target.display(),
        graph.nodes.len(),
        graph.edges.len()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    const LEGACY_DOC: &str = r#"{
        "version": 1,
        "startNodeId": 1,
        "nodes": [
            { "id": 1, "type": "outcome", "x": 0, "y": 0,
              "data": { "rewardIds": ["r1", "r2"], "stableSuccess": true } }
        ],
        "edges": []
    }"#;

    #[test]
    fn migrated_document_reloads_clean() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("dialogue.json");
        fs::write(&path, LEGACY_DOC).unwrap();

        run(&path, None).unwrap();

        let (_, report) = store::load(&path).unwrap();
        assert!(report.is_clean());

        let text = fs::read_to_string(&path).unwrap();
        assert!(text.contains("outcomeRewards"));
        assert!(!text.contains("rewardIds"));
    }

    #[test]
    fn output_flag_leaves_source_untouched() {
        let dir = TempDir::new().unwrap();
        let source = dir.path().join("legacy.json");
        let target = dir.path().join("migrated.json");
        fs::write(&source, LEGACY_DOC).unwrap();

        run(&source, Some(&target)).unwrap();

        assert_eq!(fs::read_to_string(&source).unwrap(), LEGACY_DOC);
        let (_, report) = store::load(&target).unwrap();
        assert!(report.is_clean());
    }
}
