//! The execution descriptor carried by each task.

use serde::{Deserialize, Serialize};

use crate::PodSpec;

/// What a task does when the external platform executes it.
///
/// Serialised with a `type` tag so declarations read like
/// `{ "type": "kubernetes_pod", "image": "python:3.6", ... }`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ExecutionDescriptor {
    /// Placeholder that does nothing; used for fan-out roots and joins.
    #[default]
    Dummy,
    /// Run a container pod on the cluster.
    KubernetesPod(PodSpec),
}

impl ExecutionDescriptor {
    /// Short label for logs and reports.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Dummy => "dummy",
            Self::KubernetesPod(_) => "kubernetes_pod",
        }
    }

    /// Container image, when the task runs one.
    pub fn image(&self) -> Option<&str> {
        match self {
            Self::Dummy => None,
            Self::KubernetesPod(pod) => Some(pod.image.as_str()),
        }
    }
}

impl From<PodSpec> for ExecutionDescriptor {
    fn from(pod: PodSpec) -> Self {
        Self::KubernetesPod(pod)
    }
}
