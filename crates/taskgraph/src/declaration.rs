//! Declarative graph definitions.
//!
//! This is the boundary where external workflow files enter the system.
//! Declarations are plain serde structs; [`DagDeclaration::build`] turns one
//! into a frozen [`Dag`] through the same builder calls a hand-written graph
//! would use.

use operators::ExecutionDescriptor;
use serde::{Deserialize, Serialize};

use crate::{Dag, DagBuilder, DefaultArgs, GraphError, NotificationTargets, Task};

/// One task as written in a declaration file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskDeclaration {
    pub task_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,
    /// A single address or a list of addresses.
    #[serde(default, skip_serializing_if = "NotificationTargets::is_empty")]
    pub email: NotificationTargets,
    /// IDs of tasks that must finish before this one.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub upstream: Vec<String>,
    #[serde(default)]
    pub operator: ExecutionDescriptor,
}

impl TaskDeclaration {
    fn to_task(&self) -> Task {
        let mut task = Task::new(self.task_id.clone(), self.operator.clone())
            .email(self.email.clone());
        if let Some(owner) = &self.owner {
            task = task.owner(owner.clone());
        }
        task
    }
}

/// A whole graph as written in a declaration file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DagDeclaration {
    pub dag_id: String,
    #[serde(default)]
    pub default_args: DefaultArgs,
    #[serde(default)]
    pub tasks: Vec<TaskDeclaration>,
}

impl DagDeclaration {
    /// Parse a JSON declaration.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Build this declaration outside any registry.
    ///
    /// # Errors
    /// Any [`GraphError`] raised while adding its tasks or dependencies.
    pub fn build(&self) -> Result<Dag, GraphError> {
        self.populate(DagBuilder::new(self.dag_id.clone(), self.default_args.clone()))
    }

    /// Add every task first, then every `upstream` edge, so tasks may refer
    /// to ones declared later in the file.
    pub(crate) fn populate(&self, mut builder: DagBuilder) -> Result<Dag, GraphError> {
        for task in &self.tasks {
            builder.add_node(task.to_task())?;
        }
        for task in &self.tasks {
            for upstream in &task.upstream {
                builder.add_dependency(upstream, &task.task_id)?;
            }
        }
        Ok(builder.build())
    }
}

// ============================================================
// Unit tests
// ============================================================
#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn declaration(value: serde_json::Value) -> DagDeclaration {
        serde_json::from_value(value).expect("declaration should parse")
    }

    #[test]
    fn forward_references_are_resolved() {
        let decl = declaration(json!({
            "dag_id": "forward",
            "tasks": [
                { "task_id": "child", "upstream": ["parent"] },
                { "task_id": "parent" },
            ],
        }));

        let dag = decl.build().expect("should build");
        assert_eq!(dag.topological_order(), vec!["parent", "child"]);
    }

    #[test]
    fn operator_defaults_to_dummy() {
        let decl = declaration(json!({
            "dag_id": "d",
            "tasks": [{ "task_id": "t" }],
        }));
        let dag = decl.build().unwrap();
        assert_eq!(dag.get_task("t").unwrap().descriptor(), &ExecutionDescriptor::Dummy);
    }

    #[test]
    fn task_email_accepts_single_string() {
        let decl = declaration(json!({
            "dag_id": "d",
            "tasks": [{ "task_id": "t", "email": "ops@example.com", "owner": "ops" }],
        }));
        let dag = decl.build().unwrap();
        let task = dag.get_task("t").unwrap();
        assert_eq!(task.own_email(), &NotificationTargets::single("ops@example.com"));
        assert_eq!(task.own_owner(), Some("ops"));
    }

    #[test]
    fn duplicate_task_fails_build() {
        let decl = declaration(json!({
            "dag_id": "dup",
            "tasks": [{ "task_id": "t" }, { "task_id": "t" }],
        }));
        assert!(matches!(decl.build(), Err(GraphError::DuplicateNode { .. })));
    }

    #[test]
    fn cyclic_declaration_fails_build() {
        let decl = declaration(json!({
            "dag_id": "loop",
            "tasks": [
                { "task_id": "a", "upstream": ["b"] },
                { "task_id": "b", "upstream": ["a"] },
            ],
        }));
        assert!(matches!(decl.build(), Err(GraphError::Cycle { .. })));
    }

    #[test]
    fn unknown_upstream_fails_build() {
        let decl = declaration(json!({
            "dag_id": "d",
            "tasks": [{ "task_id": "a", "upstream": ["ghost"] }],
        }));
        assert!(matches!(
            decl.build(),
            Err(GraphError::UnknownNode { task_id, .. }) if task_id == "ghost"
        ));
    }

    #[test]
    fn missing_dag_id_is_a_parse_error() {
        assert!(DagDeclaration::from_json(r#"{ "tasks": [] }"#).is_err());
    }
}
