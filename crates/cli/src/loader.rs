//! Reads declaration files from disk.

use std::path::Path;

use anyhow::{Context, Result};
use integrity::DeclarationSource;
use tracing::debug;

/// Every `*.json` file directly under `dir`, sorted by path.
pub fn load_sources(dir: &Path) -> Result<Vec<DeclarationSource>> {
    let entries = std::fs::read_dir(dir)
        .with_context(|| format!("cannot read directory {}", dir.display()))?;

    let mut paths = Vec::new();
    for entry in entries {
        let path = entry?.path();
        if path.is_file() && path.extension().is_some_and(|ext| ext == "json") {
            paths.push(path);
        }
    }
    paths.sort();

    paths
        .into_iter()
        .map(|path| {
            debug!("loading {}", path.display());
            let contents = std::fs::read_to_string(&path)
                .with_context(|| format!("cannot read file {}", path.display()))?;
            Ok(DeclarationSource::new(path.display().to_string(), contents))
        })
        .collect()
}
