//! Runs every integrity rule under one policy.

use std::collections::BTreeMap;

use serde::Serialize;
use taskgraph::{Dag, DagDeclaration, DagRegistry};
use tracing::{debug, info, instrument};

use crate::{
    import::{validate_import, validate_import_sources, DeclarationSource, ImportReport},
    rules, IntegrityPolicy, Violation,
};

/// Import outcome plus the violations of every graph that imported.
#[derive(Debug, Serialize)]
pub struct IntegrityReport {
    pub import: ImportReport,
    /// Violations keyed by graph ID; graphs with none map to an empty list.
    pub violations: BTreeMap<String, Vec<Violation>>,
}

impl IntegrityReport {
    /// No import failures and no violations.
    pub fn is_clean(&self) -> bool {
        self.import.is_clean() && self.violation_count() == 0
    }

    pub fn violation_count(&self) -> usize {
        self.violations.values().map(Vec::len).sum()
    }
}


/// Applies an [`IntegrityPolicy`] to graphs.
#[derive(Debug, Clone, Default)]
pub struct IntegrityValidator {
    policy: IntegrityPolicy,
}

impl IntegrityValidator {
    pub fn new(policy: IntegrityPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &IntegrityPolicy {
        &self.policy
    }

    /// All violations of `dag`, graph-level ones first, then by task ID and
    /// rule.
    #[instrument(skip_all, fields(dag_id = dag.id()))]
    pub fn validate(&self, dag: &Dag) -> Vec<Violation> {
        let fallback = Some(&self.policy.fallback_targets);

        let mut violations = rules::validate_owners(dag, &self.policy.valid_owners);
        violations.extend(rules::validate_targets(dag, &self.policy.valid_targets));
        violations.extend(rules::validate_notifications(dag, fallback));
        if let Some(required) = &self.policy.required_alert_target {
            violations.extend(rules::validate_alert_target(dag, required));
        }

        violations.sort_by(|a, b| (&a.task_id, a.rule).cmp(&(&b.task_id, b.rule)));
        debug!(count = violations.len(), "graph validated");
        violations
    }

    /// Validate every graph in `registry`.
    pub fn validate_registry(&self, registry: &DagRegistry) -> BTreeMap<String, Vec<Violation>> {
        registry
            .iter()
            .map(|dag| (dag.id().to_owned(), self.validate(dag)))
            .collect()
    }

    /// Import parsed declarations, then validate what imported.
    pub fn check(&self, declarations: impl IntoIterator<Item = DagDeclaration>) -> IntegrityReport {
        self.finish(validate_import(declarations))
    }

    /// Import raw JSON declarations, then validate what imported.
    pub fn check_sources(
        &self,
        sources: impl IntoIterator<Item = DeclarationSource>,
    ) -> IntegrityReport {
        self.finish(validate_import_sources(sources))
    }

    fn finish(&self, import: ImportReport) -> IntegrityReport {
        let violations = self.validate_registry(&import.registry);
        let report = IntegrityReport { import, violations };
        info!(
            graphs = report.violations.len(),
            import_failures = report.import.failures.len(),
            violations = report.violation_count(),
            "integrity check finished"
        );
        report
    }
}
