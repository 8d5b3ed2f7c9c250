//! `integrity` crate — structural checks over built task graphs.
//!
//! Nothing here fails fast.  Import collects per-graph failures into an
//! [`ImportReport`], and each rule returns the full list of [`Violation`]s so
//! a workflow author can fix everything in one pass.

pub mod import;
pub mod policy;
pub mod rules;
pub mod topology;
pub mod validator;
pub mod violation;

pub use import::{
    validate_import, validate_import_sources, DeclarationSource, ImportError, ImportFailure,
    ImportReport,
};
pub use policy::IntegrityPolicy;
pub use rules::{validate_alert_target, validate_notifications, validate_owners, validate_targets};
pub use topology::{topology, TaskTopology, TopologyView};
pub use validator::{IntegrityReport, IntegrityValidator};
pub use violation::{Rule, Violation};
