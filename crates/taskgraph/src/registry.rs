//! Explicit registry of built graphs.
//!
//! Callers create one at start-up, fill it while loading declarations, and
//! drop it when done.  Graph IDs are unique within a registry.

use std::collections::BTreeMap;

use tracing::info;

use crate::{Dag, DagBuilder, DagDeclaration, DefaultArgs, GraphError};

#[derive(Debug, Default)]
pub struct DagRegistry {
    dags: BTreeMap<String, Dag>,
}

impl DagRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start building a graph whose ID isn't taken yet.
    ///
    /// # Errors
    /// [`GraphError::DuplicateGraph`] if the registry already holds `id`.
    pub fn create_graph(
        &self,
        id: impl Into<String>,
        default_args: DefaultArgs,
    ) -> Result<DagBuilder, GraphError> {
        let id = id.into();
        if self.dags.contains_key(&id) {
            return Err(GraphError::DuplicateGraph(id));
        }
        Ok(DagBuilder::new(id, default_args))
    }

    /// Store a finished graph.
    ///
    /// # Errors
    /// [`GraphError::DuplicateGraph`] if a graph with the same ID was
    /// registered since its builder was created.
    pub fn register(&mut self, dag: Dag) -> Result<&Dag, GraphError> {
        use std::collections::btree_map::Entry;

        match self.dags.entry(dag.id.clone()) {
            Entry::Occupied(_) => Err(GraphError::DuplicateGraph(dag.id)),
            Entry::Vacant(slot) => {
                info!(dag_id = %dag.id, tasks = dag.len(), "graph registered");
                Ok(&*slot.insert(dag))
            }
        }
    }

    /// Build and register a declaration in one step.
    ///
    /// # Errors
    /// The first [`GraphError`] hit while building; nothing is registered.
    pub fn declare(&mut self, declaration: &DagDeclaration) -> Result<&Dag, GraphError> {
        let builder =
            self.create_graph(declaration.dag_id.clone(), declaration.default_args.clone())?;
        let dag = declaration.populate(builder)?;
        self.register(dag)
    }

    pub fn get(&self, dag_id: &str) -> Option<&Dag> {
        self.dags.get(dag_id)
    }

    pub fn contains(&self, dag_id: &str) -> bool {
        self.dags.contains_key(dag_id)
    }

    /// Registered graph IDs, sorted.
    pub fn dag_ids(&self) -> Vec<&str> {
        self.dags.keys().map(String::as_str).collect()
    }

    /// Registered graphs ordered by ID.
    pub fn iter(&self) -> impl Iterator<Item = &Dag> {
        self.dags.values()
    }

    pub fn len(&self) -> usize {
        self.dags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dags.is_empty()
    }
}
