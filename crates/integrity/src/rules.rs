//! Individual integrity rules.
//!
//! Each rule is a pure function of a frozen graph and its policy inputs.  It
//! never stops at the first problem: every violation is returned, graph
//! defaults first, then tasks in ID order.

use std::collections::BTreeSet;

use taskgraph::{Dag, NotificationTargets};

use crate::{Rule, Violation};

fn describe(allowed: &BTreeSet<String>) -> String {
    let joined: Vec<&str> = allowed.iter().map(String::as_str).collect();
    format!("{{{}}}", joined.join(", "))
}

/// Every task must resolve to at least one notification target.
///
/// Resolution order: the task's own targets, then the graph defaults, then
/// `fallback` (a platform-wide default, if the caller has one).
pub fn validate_notifications(
    dag: &Dag,
    fallback: Option<&NotificationTargets>,
) -> Vec<Violation> {
    let fallback_empty = fallback.map_or(true, NotificationTargets::is_empty);

    dag.tasks()
        .filter(|task| dag.effective_email(task).is_empty() && fallback_empty)
        .map(|task| {
            Violation::for_task(
                dag.id(),
                task.id(),
                Rule::NotificationMissing,
                "either the task or default_args must set an email",
            )
        })
        .collect()
}

/// The graph default owner (if set) and every task's resolved owner must be
/// in `allowed_owners`.  A task with no owner at all is a violation.
pub fn validate_owners(dag: &Dag, allowed_owners: &BTreeSet<String>) -> Vec<Violation> {
    let mut violations = Vec::new();

    if let Some(owner) = dag.default_args().owner.as_deref() {
        if !allowed_owners.contains(owner) {
            violations.push(Violation::for_defaults(
                dag.id(),
                Rule::Owner,
                format!("owner '{owner}' is not one of {}", describe(allowed_owners)),
            ));
        }
    }

    for task in dag.tasks() {
        match dag.effective_owner(task) {
            Some(owner) if allowed_owners.contains(owner) => {}
            Some(owner) => violations.push(Violation::for_task(
                dag.id(),
                task.id(),
                Rule::Owner,
                format!("owner '{owner}' is not one of {}", describe(allowed_owners)),
            )),
            None => violations.push(Violation::for_task(
                dag.id(),
                task.id(),
                Rule::Owner,
                format!("no owner set; expected one of {}", describe(allowed_owners)),
            )),
        }
    }

    violations
}

/// The graph default targets and every task's resolved targets must be a
/// subset of `allowed_targets`.
pub fn validate_targets(dag: &Dag, allowed_targets: &BTreeSet<String>) -> Vec<Violation> {
    let unknown = |targets: &NotificationTargets| -> Vec<String> {
        targets
            .iter()
            .filter(|target| !allowed_targets.contains(*target))
            .map(str::to_owned)
            .collect()
    };

    let mut violations = Vec::new();

    let bad = unknown(&dag.default_args().email);
    if !bad.is_empty() {
        violations.push(Violation::for_defaults(
            dag.id(),
            Rule::NotificationTarget,
            format!(
                "email {bad:?} not in allowed targets {}",
                describe(allowed_targets)
            ),
        ));
    }

    for task in dag.tasks() {
        let bad = unknown(dag.effective_email(task));
        if !bad.is_empty() {
            violations.push(Violation::for_task(
                dag.id(),
                task.id(),
                Rule::NotificationTarget,
                format!(
                    "email {bad:?} not in allowed targets {}",
                    describe(allowed_targets)
                ),
            ));
        }
    }

    violations
}

/// The graph defaults must include `required` so failures always alert
/// someone.
pub fn validate_alert_target(dag: &Dag, required: &str) -> Vec<Violation> {
    if dag.default_args().email.contains(required) {
        return Vec::new();
    }

    vec![Violation::for_defaults(
        dag.id(),
        Rule::AlertTarget,
        format!("alert email '{required}' not set in default_args"),
    )]
}
