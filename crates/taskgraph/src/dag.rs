//! Ordering queries over a frozen graph.
//!
//! The builder already guarantees acyclicity, so these never fail; they only
//! promise a deterministic answer for a given graph regardless of the order
//! tasks and edges were declared in.

use std::collections::{BTreeSet, HashMap};

use crate::Dag;

impl Dag {
    /// Task IDs in execution order.
    ///
    /// Kahn's algorithm; among tasks that are ready at the same time the
    /// lexicographically smallest ID goes first.
    pub fn topological_order(&self) -> Vec<&str> {
        let mut in_degree: HashMap<&str, usize> = self
            .tasks()
            .map(|task| (task.id(), task.upstream().count()))
            .collect();

        // Seed with the tasks that have no upstream.
        let mut ready: BTreeSet<&str> = in_degree
            .iter()
            .filter(|(_, &d)| d == 0)
            .map(|(&id, _)| id)
            .collect();

        let mut sorted: Vec<&str> = Vec::with_capacity(self.len());

        while let Some(task_id) = ready.pop_first() {
            sorted.push(task_id);

            if let Some(task) = self.get_task(task_id) {
                for next in task.downstream() {
                    if let Some(deg) = in_degree.get_mut(next) {
                        *deg -= 1;
                        if *deg == 0 {
                            ready.insert(next);
                        }
                    }
                }
            }
        }

        sorted
    }

    /// Tasks with no upstream, sorted.
    pub fn roots(&self) -> Vec<&str> {
        self.tasks()
            .filter(|task| task.upstream().next().is_none())
            .map(|task| task.id())
            .collect()
    }

    /// Tasks with no downstream, sorted.
    pub fn leaves(&self) -> Vec<&str> {
        self.tasks()
            .filter(|task| task.downstream().next().is_none())
            .map(|task| task.id())
            .collect()
    }
}

// ============================================================
// Unit tests
// ============================================================
#[cfg(test)]
mod tests {
    use crate::{DagBuilder, DefaultArgs, Task};
    use operators::ExecutionDescriptor;

    fn build(ids: &[&str], edges: &[(&str, &str)]) -> crate::Dag {
        let mut builder = DagBuilder::new("test", DefaultArgs::default());
        for id in ids {
            builder
                .add_node(Task::new(*id, ExecutionDescriptor::Dummy))
                .expect("unique task id");
        }
        for (from, to) in edges {
            builder.add_dependency(from, to).expect("acyclic edge");
        }
        builder.build()
    }

    #[test]
    fn linear_graph_sorts_in_chain_order() {
        // c → b → a
        let dag = build(&["a", "b", "c"], &[("c", "b"), ("b", "a")]);
        assert_eq!(dag.topological_order(), vec!["c", "b", "a"]);
    }

    #[test]
    fn ties_break_lexicographically() {
        let dag = build(
            &["python-task", "first-task", "bash-task", "nodejs-task"],
            &[
                ("first-task", "python-task"),
                ("first-task", "bash-task"),
                ("first-task", "nodejs-task"),
            ],
        );
        assert_eq!(
            dag.topological_order(),
            vec!["first-task", "bash-task", "nodejs-task", "python-task"]
        );
        assert_eq!(dag.roots(), vec!["first-task"]);
        assert_eq!(dag.leaves(), vec!["bash-task", "nodejs-task", "python-task"]);
    }

    #[test]
    fn order_ignores_declaration_order() {
        let edges = [("a", "b"), ("a", "c"), ("b", "d"), ("c", "d")];
        let forward = build(&["a", "b", "c", "d"], &edges);
        let mut reversed_edges = edges;
        reversed_edges.reverse();
        let backward = build(&["d", "c", "b", "a"], &reversed_edges);

        assert_eq!(forward.topological_order(), backward.topological_order());
        assert_eq!(forward.topological_order(), vec!["a", "b", "c", "d"]);
    }

    #[test]
    fn empty_graph_has_empty_order() {
        let dag = build(&[], &[]);
        assert!(dag.topological_order().is_empty());
        assert!(dag.roots().is_empty());
    }

    #[test]
    fn single_task_is_root_and_leaf() {
        let dag = build(&["solo"], &[]);
        assert_eq!(dag.topological_order(), vec!["solo"]);
        assert_eq!(dag.roots(), dag.leaves());
    }
}
