//! Structured validation findings.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Which integrity rule a [`Violation`] came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rule {
    /// Owner missing or not in the allow-list.
    Owner,
    /// A resolved notification target is not in the allow-list.
    NotificationTarget,
    /// A task has no notification target at all.
    NotificationMissing,
    /// The graph defaults lack the mandatory alert address.
    AlertTarget,
}

impl Rule {
    pub fn name(self) -> &'static str {
        match self {
            Self::Owner => "owner",
            Self::NotificationTarget => "notification_target",
            Self::NotificationMissing => "notification_missing",
            Self::AlertTarget => "alert_target",
        }
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One failed check.  `task_id` is `None` when the graph defaults themselves
/// are at fault.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Violation {
    pub dag_id: String,
    pub task_id: Option<String>,
    pub rule: Rule,
    pub detail: String,
}

impl Violation {
    pub(crate) fn for_task(
        dag_id: &str,
        task_id: &str,
        rule: Rule,
        detail: impl Into<String>,
    ) -> Self {
        Self {
            dag_id: dag_id.to_owned(),
            task_id: Some(task_id.to_owned()),
            rule,
            detail: detail.into(),
        }
    }

    pub(crate) fn for_defaults(dag_id: &str, rule: Rule, detail: impl Into<String>) -> Self {
        Self {
            dag_id: dag_id.to_owned(),
            task_id: None,
            rule,
            detail: detail.into(),
        }
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.task_id {
            Some(task_id) => write!(
                f,
                "[{}] dag_id={}, task_id={}: {}",
                self.rule, self.dag_id, task_id, self.detail
            ),
            None => write!(
                f,
                "[{}] dag_id={} (default_args): {}",
                self.rule, self.dag_id, self.detail
            ),
        }
    }
}
