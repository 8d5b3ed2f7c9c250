//! Validation policy: the allow-lists every graph is checked against.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use taskgraph::NotificationTargets;

/// Tuning knobs for the integrity checks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IntegrityPolicy {
    /// Owners a task or graph default may name.
    pub valid_owners: BTreeSet<String>,
    /// Addresses a resolved notification target may name.
    pub valid_targets: BTreeSet<String>,
    /// Address every graph's defaults must include, if any.
    pub required_alert_target: Option<String>,
    /// Platform-wide targets used when neither a task nor its graph sets any.
    pub fallback_targets: NotificationTargets,
}

impl Default for IntegrityPolicy {
    fn default() -> Self {
        Self {
            valid_owners: BTreeSet::from(["airflow".to_owned()]),
            valid_targets: BTreeSet::from(["airflow@example.com".to_owned()]),
            required_alert_target: Some("airflow@example.com".to_owned()),
            fallback_targets: NotificationTargets::new(),
        }
    }
}

impl IntegrityPolicy {
    /// Parse a JSON policy; omitted fields keep their defaults.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Replace the owner allow-list.
    pub fn with_owners<I, S>(mut self, owners: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.valid_owners = owners.into_iter().map(Into::into).collect();
        self
    }

    /// Replace the target allow-list.
    pub fn with_targets<I, S>(mut self, targets: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.valid_targets = targets.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_required_alert_target(mut self, target: Option<String>) -> Self {
        self.required_alert_target = target;
        self
    }
}
