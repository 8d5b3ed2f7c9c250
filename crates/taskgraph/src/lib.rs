//! `taskgraph` crate — task graph models, construction, and ordering queries.

pub mod builder;
pub mod dag;
pub mod declaration;
pub mod error;
pub mod models;
pub mod registry;

pub use builder::{DagBuilder, NodeRef};
pub use declaration::{DagDeclaration, TaskDeclaration};
pub use error::GraphError;
pub use models::{Dag, DefaultArgs, NotificationTargets, Task};
pub use registry::DagRegistry;
