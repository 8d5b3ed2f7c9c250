//! Import stage: turn declarations into a registry, isolating failures.
//!
//! A broken declaration is recorded in [`ImportReport::failures`] and the
//! rest keep loading.

use std::fmt::Display;

use serde::{Deserialize, Serialize, Serializer};
use taskgraph::{DagDeclaration, DagRegistry, GraphError};
use thiserror::Error;
use tracing::{info, instrument, warn};

/// Why a single declaration didn't make it into the registry.
///
/// Serialises as `{"kind": "parse" | "build", "detail": "<message>"}`.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum ImportError {
    /// The declaration text was not valid.
    #[error("parse error: {0}")]
    Parse(String),

    /// The declaration parsed but its graph could not be built.
    #[error(transparent)]
    Build(
        #[from]
        #[serde(serialize_with = "display")]
        GraphError,
    ),
}

fn display<T: Display, S: Serializer>(value: &T, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(value)
}

/// A declaration that failed to import.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImportFailure {
    /// Where the declaration came from (file path, or the graph ID).
    pub origin: String,
    /// The graph ID, when the declaration got far enough to have one.
    pub dag_id: Option<String>,
    pub error: ImportError,
}

/// Raw declaration text plus where it came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeclarationSource {
    pub origin: String,
    pub contents: String,
}

impl DeclarationSource {
    pub fn new(origin: impl Into<String>, contents: impl Into<String>) -> Self {
        Self {
            origin: origin.into(),
            contents: contents.into(),
        }
    }
}

/// Outcome of an import: every graph that built, and every one that didn't.
///
/// Serialises the registry as the sorted list of loaded graph IDs.
#[derive(Debug, Default, Serialize)]
pub struct ImportReport {
    #[serde(rename = "loaded", serialize_with = "loaded_ids")]
    pub registry: DagRegistry,
    pub failures: Vec<ImportFailure>,
}

fn loaded_ids<S: Serializer>(registry: &DagRegistry, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_seq(registry.dag_ids())
}

impl ImportReport {
    /// `true` when every declaration imported.
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }

    /// IDs of the graphs that failed to build, where known.
    pub fn failed_dag_ids(&self) -> Vec<&str> {
        self.failures
            .iter()
            .filter_map(|failure| failure.dag_id.as_deref())
            .collect()
    }

    fn import(&mut self, origin: String, declaration: &DagDeclaration) {
        match self.registry.declare(declaration) {
            Ok(dag) => info!(%origin, dag_id = dag.id(), "graph imported"),
            Err(err) => {
                warn!(%origin, dag_id = %declaration.dag_id, error = %err, "graph import failed");
                self.failures.push(ImportFailure {
                    origin,
                    dag_id: Some(declaration.dag_id.clone()),
                    error: err.into(),
                });
            }
        }
    }
}

/// Build every declaration into a fresh registry.
#[instrument(skip_all)]
pub fn validate_import<I>(declarations: I) -> ImportReport
where
    I: IntoIterator<Item = DagDeclaration>,
{
    let mut report = ImportReport::default();
    for declaration in declarations {
        report.import(declaration.dag_id.clone(), &declaration);
    }
    report
}

/// Parse and build raw JSON declarations into a fresh registry.  Parse
/// errors are recorded per source like build errors.
#[instrument(skip_all)]
pub fn validate_import_sources<I>(sources: I) -> ImportReport
where
    I: IntoIterator<Item = DeclarationSource>,
{
    let mut report = ImportReport::default();
    for source in sources {
        match DagDeclaration::from_json(&source.contents) {
            Ok(declaration) => report.import(source.origin, &declaration),
            Err(err) => {
                warn!(origin = %source.origin, error = %err, "declaration parse failed");
                report.failures.push(ImportFailure {
                    origin: source.origin,
                    dag_id: None,
                    error: ImportError::Parse(err.to_string()),
                });
            }
        }
    }
    report
}

// ============================================================
// Unit tests
// ============================================================
#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parse_failure_does_not_block_other_sources() {
        let report = validate_import_sources([
            DeclarationSource::new("broken.json", "{ not json"),
            DeclarationSource::new("ok.json", r#"{ "dag_id": "ok", "tasks": [{ "task_id": "t" }] }"#),
        ]);

        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].origin, "broken.json");
        assert!(matches!(report.failures[0].error, ImportError::Parse(_)));
        assert!(report.failed_dag_ids().is_empty());
        assert_eq!(report.registry.dag_ids(), vec!["ok"]);
    }

    #[test]
    fn duplicate_graph_ids_across_sources_fail_the_second() {
        let source = r#"{ "dag_id": "same", "tasks": [] }"#;
        let report = validate_import_sources([
            DeclarationSource::new("a.json", source),
            DeclarationSource::new("b.json", source),
        ]);

        assert_eq!(report.registry.len(), 1);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].origin, "b.json");
        assert!(matches!(
            report.failures[0].error,
            ImportError::Build(GraphError::DuplicateGraph(_))
        ));
    }

    #[test]
    fn report_serialises_loaded_ids_and_failures() {
        let report = validate_import_sources([
            DeclarationSource::new("broken.json", "{ not json"),
            DeclarationSource::new("loop.json", r#"{ "dag_id": "loop", "tasks": [{ "task_id": "t", "upstream": ["t"] }] }"#),
            DeclarationSource::new("ok.json", r#"{ "dag_id": "ok", "tasks": [] }"#),
        ]);

        let value = serde_json::to_value(&report).expect("report should serialise");
        assert_eq!(value["loaded"], json!(["ok"]));
        assert_eq!(value["failures"][0]["origin"], "broken.json");
        assert_eq!(value["failures"][0]["dag_id"], json!(null));
        assert_eq!(value["failures"][0]["error"]["kind"], "parse");
        assert_eq!(
            value["failures"][1],
            json!({
                "origin": "loop.json",
                "dag_id": "loop",
                "error": { "kind": "build", "detail": "task 't' cannot depend on itself" },
            })
        );
    }

    #[test]
    fn empty_input_is_clean() {
        let report = validate_import(Vec::new());
        assert!(report.is_clean());
        assert!(report.registry.is_empty());
    }
}
