//! Stable snapshot of a graph's shape.

use serde::{Deserialize, Serialize};
use taskgraph::Dag;

/// Neighbours of one task, both lists sorted by ID.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskTopology {
    pub task_id: String,
    pub upstream: Vec<String>,
    pub downstream: Vec<String>,
}

/// Every task of a graph in ID order, with its neighbours.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopologyView {
    pub dag_id: String,
    pub tasks: Vec<TaskTopology>,
    /// Execution order with lexicographic tie-breaking.
    pub order: Vec<String>,
}

impl TopologyView {
    pub fn task_ids(&self) -> Vec<&str> {
        self.tasks.iter().map(|task| task.task_id.as_str()).collect()
    }

    pub fn task(&self, task_id: &str) -> Option<&TaskTopology> {
        self.tasks
            .binary_search_by(|task| task.task_id.as_str().cmp(task_id))
            .ok()
            .map(|idx| &self.tasks[idx])
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}

fn owned<'a>(ids: impl IntoIterator<Item = &'a str>) -> Vec<String> {
    ids.into_iter().map(str::to_owned).collect()
}

/// Take a snapshot of `dag`.
pub fn topology(dag: &Dag) -> TopologyView {
    TopologyView {
        dag_id: dag.id().to_owned(),
        tasks: dag
            .tasks()
            .map(|task| TaskTopology {
                task_id: task.id().to_owned(),
                upstream: owned(task.upstream()),
                downstream: owned(task.downstream()),
            })
            .collect(),
        order: owned(dag.topological_order()),
    }
}
