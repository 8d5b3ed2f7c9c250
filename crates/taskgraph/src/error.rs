//! Graph construction error types.

use thiserror::Error;

/// Errors raised while building a graph.
///
/// Each one is fatal to the `add_*` call that produced it and leaves the
/// graph exactly as it was before the call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GraphError {
    /// The registry already holds a graph with this ID.
    #[error("duplicate graph ID: '{0}'")]
    DuplicateGraph(String),

    /// Two tasks in the same graph share an ID.
    #[error("duplicate task ID '{task_id}' in graph '{dag_id}'")]
    DuplicateNode { dag_id: String, task_id: String },

    /// A dependency references a task that isn't in the graph.
    #[error("unknown task '{task_id}' in graph '{dag_id}'")]
    UnknownNode { dag_id: String, task_id: String },

    /// A task was wired as its own upstream.
    #[error("task '{task_id}' cannot depend on itself")]
    SelfDependency { task_id: String },

    /// The edge `upstream -> downstream` would close a cycle.
    #[error("dependency '{upstream}' -> '{downstream}' would create a cycle")]
    Cycle { upstream: String, downstream: String },
}
