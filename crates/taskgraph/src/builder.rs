//! Graph construction.
//!
//! [`DagBuilder`] owns an in-progress graph.  Every mutating call either
//! succeeds completely or leaves the graph untouched, and [`DagBuilder::build`]
//! hands back the frozen [`Dag`].
//!
//! Cycle detection walks the downstream edges from the new edge's target on
//! every insertion, so one insertion costs O(V+E).  That is fine for workflow
//! definitions of a few hundred tasks; much larger graphs would want an
//! incremental reachability index instead.

use std::collections::{BTreeMap, HashSet};
use std::fmt;

use tracing::{debug, instrument};

use crate::{Dag, DefaultArgs, GraphError, Task};

/// Lightweight handle to a task added through [`DagBuilder::add_node`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeRef(String);

impl NodeRef {
    pub fn id(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for NodeRef {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Builds a single [`Dag`].
#[derive(Debug)]
pub struct DagBuilder {
    dag: Dag,
}

impl DagBuilder {
    /// Start an empty graph.  Prefer [`crate::DagRegistry::create_graph`],
    /// which also rejects IDs the registry already holds.
    pub fn new(id: impl Into<String>, default_args: DefaultArgs) -> Self {
        Self {
            dag: Dag {
                id: id.into(),
                default_args,
                tasks: BTreeMap::new(),
            },
        }
    }

    pub fn id(&self) -> &str {
        &self.dag.id
    }

    pub fn get_task(&self, task_id: &str) -> Option<&Task> {
        self.dag.tasks.get(task_id)
    }

    /// Add a task.
    ///
    /// # Errors
    /// [`GraphError::DuplicateNode`] if the graph already has a task with
    /// this ID.
    #[instrument(skip(self, task), fields(dag_id = %self.dag.id, task_id = %task.id()))]
    pub fn add_node(&mut self, task: Task) -> Result<NodeRef, GraphError> {
        if self.dag.tasks.contains_key(task.id()) {
            return Err(GraphError::DuplicateNode {
                dag_id: self.dag.id.clone(),
                task_id: task.id().to_owned(),
            });
        }

        let handle = NodeRef(task.id().to_owned());
        debug!(kind = task.descriptor().kind(), "task added");
        self.dag.tasks.insert(handle.0.clone(), task);
        Ok(handle)
    }

    /// Declare that `downstream` runs after `upstream`.
    ///
    /// Returns `Ok(false)` when the edge already exists; re-declaring an
    /// edge is a no-op.
    ///
    /// # Errors
    /// - [`GraphError::UnknownNode`] if either task is missing.
    /// - [`GraphError::SelfDependency`] if both IDs are the same.
    /// - [`GraphError::Cycle`] if `upstream` is already reachable from
    ///   `downstream`.
    #[instrument(skip_all, fields(dag_id = %self.dag.id))]
    pub fn add_dependency(
        &mut self,
        upstream: impl AsRef<str>,
        downstream: impl AsRef<str>,
    ) -> Result<bool, GraphError> {
        let (upstream, downstream) = (upstream.as_ref(), downstream.as_ref());

        for task_id in [upstream, downstream] {
            if !self.dag.tasks.contains_key(task_id) {
                return Err(GraphError::UnknownNode {
                    dag_id: self.dag.id.clone(),
                    task_id: task_id.to_owned(),
                });
            }
        }

        if upstream == downstream {
            return Err(GraphError::SelfDependency {
                task_id: upstream.to_owned(),
            });
        }

        if self.dag.tasks[upstream].downstream.contains(downstream) {
            debug!(upstream, downstream, "dependency already declared");
            return Ok(false);
        }

        if self.reaches(downstream, upstream) {
            return Err(GraphError::Cycle {
                upstream: upstream.to_owned(),
                downstream: downstream.to_owned(),
            });
        }

        // Both endpoints were checked above; commit the two halves together.
        if let Some(task) = self.dag.tasks.get_mut(upstream) {
            task.downstream.insert(downstream.to_owned());
        }
        if let Some(task) = self.dag.tasks.get_mut(downstream) {
            task.upstream.insert(upstream.to_owned());
        }

        debug!(upstream, downstream, "dependency added");
        Ok(true)
    }

    /// `task` runs after `upstream`.
    pub fn set_upstream(
        &mut self,
        task: impl AsRef<str>,
        upstream: impl AsRef<str>,
    ) -> Result<bool, GraphError> {
        self.add_dependency(upstream, task)
    }

    /// `downstream` runs after `task`.
    pub fn set_downstream(
        &mut self,
        task: impl AsRef<str>,
        downstream: impl AsRef<str>,
    ) -> Result<bool, GraphError> {
        self.add_dependency(task, downstream)
    }

    /// Freeze the graph.
    pub fn build(self) -> Dag {
        self.dag
    }

    /// Depth-first search along downstream edges.
    fn reaches(&self, from: &str, to: &str) -> bool {
        let mut stack = vec![from];
        let mut visited: HashSet<&str> = HashSet::new();

        while let Some(current) = stack.pop() {
            if current == to {
                return true;
            }
            if !visited.insert(current) {
                continue;
            }
            if let Some(task) = self.dag.tasks.get(current) {
                stack.extend(task.downstream());
            }
        }

        false
    }
}

// ============================================================
// Unit tests
// ============================================================
#[cfg(test)]
mod tests {
    use super::*;
    use operators::ExecutionDescriptor;

    fn builder_with(ids: &[&str]) -> DagBuilder {
        let mut builder = DagBuilder::new("test", DefaultArgs::default());
        for id in ids {
            builder
                .add_node(Task::new(*id, ExecutionDescriptor::Dummy))
                .expect("unique task id");
        }
        builder
    }

    fn ids<'a>(iter: impl Iterator<Item = &'a str>) -> Vec<&'a str> {
        iter.collect()
    }

    #[test]
    fn add_node_returns_handle() {
        let mut builder = DagBuilder::new("test", DefaultArgs::default());
        let handle = builder
            .add_node(Task::new("a", ExecutionDescriptor::Dummy))
            .expect("should add");
        assert_eq!(handle.id(), "a");
        assert!(builder.get_task("a").is_some());
    }

    #[test]
    fn duplicate_node_is_rejected() {
        let mut builder = builder_with(&["a"]);
        let err = builder
            .add_node(Task::new("a", ExecutionDescriptor::Dummy))
            .unwrap_err();
        assert!(matches!(err, GraphError::DuplicateNode { task_id, .. } if task_id == "a"));
    }

    #[test]
    fn dependency_updates_both_sides() {
        let mut builder = builder_with(&["a", "b"]);
        assert!(builder.add_dependency("a", "b").expect("valid edge"));

        let dag = builder.build();
        assert_eq!(ids(dag.get_task("a").unwrap().downstream()), vec!["b"]);
        assert_eq!(ids(dag.get_task("b").unwrap().upstream()), vec!["a"]);
        assert!(dag.get_task("a").unwrap().upstream().next().is_none());
    }

    #[test]
    fn handles_can_be_used_as_ids() {
        let mut builder = DagBuilder::new("test", DefaultArgs::default());
        let a = builder.add_node(Task::new("a", ExecutionDescriptor::Dummy)).unwrap();
        let b = builder.add_node(Task::new("b", ExecutionDescriptor::Dummy)).unwrap();
        builder.set_upstream(&b, &a).expect("b after a");

        let dag = builder.build();
        assert_eq!(ids(dag.get_task("b").unwrap().upstream()), vec!["a"]);
    }

    #[test]
    fn set_downstream_mirrors_set_upstream() {
        let mut builder = builder_with(&["a", "b"]);
        builder.set_downstream("a", "b").expect("b after a");
        assert_eq!(ids(builder.get_task("a").unwrap().downstream()), vec!["b"]);
    }

    #[test]
    fn unknown_node_is_rejected() {
        let mut builder = builder_with(&["a"]);
        let err = builder.add_dependency("a", "ghost").unwrap_err();
        assert!(matches!(err, GraphError::UnknownNode { task_id, .. } if task_id == "ghost"));

        let err = builder.add_dependency("ghost", "a").unwrap_err();
        assert!(matches!(err, GraphError::UnknownNode { task_id, .. } if task_id == "ghost"));
    }

    #[test]
    fn self_dependency_is_rejected() {
        let mut builder = builder_with(&["a"]);
        assert!(matches!(
            builder.add_dependency("a", "a"),
            Err(GraphError::SelfDependency { task_id }) if task_id == "a"
        ));
    }

    #[test]
    fn duplicate_edge_is_a_no_op() {
        let mut builder = builder_with(&["a", "b"]);
        assert!(builder.add_dependency("a", "b").unwrap());
        assert!(!builder.add_dependency("a", "b").unwrap());
        assert_eq!(ids(builder.get_task("b").unwrap().upstream()), vec!["a"]);
    }

    #[test]
    fn cycle_is_rejected_and_graph_unchanged() {
        // a → b → c, then c → a closes the loop
        let mut builder = builder_with(&["a", "b", "c"]);
        builder.add_dependency("a", "b").unwrap();
        builder.add_dependency("b", "c").unwrap();
        let before = builder.dag.clone();

        let err = builder.add_dependency("c", "a").unwrap_err();
        assert!(matches!(
            err,
            GraphError::Cycle { ref upstream, ref downstream } if upstream == "c" && downstream == "a"
        ));
        assert_eq!(builder.build(), before);
    }

    #[test]
    fn diamond_is_not_a_cycle() {
        //   a
        //  / \
        // b   c
        //  \ /
        //   d
        let mut builder = builder_with(&["a", "b", "c", "d"]);
        for (from, to) in [("a", "b"), ("a", "c"), ("b", "d"), ("c", "d")] {
            builder.add_dependency(from, to).expect("diamond edges are acyclic");
        }
        assert!(builder.add_dependency("a", "d").expect("shortcut is acyclic"));
        assert!(matches!(
            builder.add_dependency("d", "a"),
            Err(GraphError::Cycle { .. })
        ));
    }
}
