//! Core domain models for task graphs.
//!
//! A [`Dag`] is only ever produced by [`crate::DagBuilder::build`], so once a
//! caller holds one it is frozen: tasks and edges can be read but not changed.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::time::Duration;

use chrono::{DateTime, Utc};
use operators::ExecutionDescriptor;
use serde::{Deserialize, Deserializer, Serialize};

// ---------------------------------------------------------------------------
// NotificationTargets
// ---------------------------------------------------------------------------

/// A set of notification addresses (usually e-mail).
///
/// Declarations may give either a single string or a list; both normalise to
/// a set here and always serialise back as a sorted list.  Blank entries are
/// dropped, so `""` means "not set".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct NotificationTargets(BTreeSet<String>);

impl NotificationTargets {
    pub fn new() -> Self {
        Self::default()
    }

    /// A set holding `target`, or an empty set when it is blank.
    pub fn single(target: impl Into<String>) -> Self {
        std::iter::once(target).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn contains(&self, target: &str) -> bool {
        self.0.contains(target)
    }

    /// Targets in lexicographic order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

impl<'de> Deserialize<'de> for NotificationTargets {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum OneOrMany {
            One(String),
            Many(Vec<String>),
        }

        Ok(match OneOrMany::deserialize(deserializer)? {
            OneOrMany::One(target) => Self::single(target),
            OneOrMany::Many(targets) => targets.into_iter().collect(),
        })
    }
}

impl<S: Into<String>> FromIterator<S> for NotificationTargets {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(Into::<String>::into)
                .filter(|target| !target.trim().is_empty())
                .collect(),
        )
    }
}

impl fmt::Display for NotificationTargets {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let joined: Vec<&str> = self.iter().collect();
        write!(f, "[{}]", joined.join(", "))
    }
}

// ---------------------------------------------------------------------------
// DefaultArgs
// ---------------------------------------------------------------------------

/// Graph-wide defaults that fall through to tasks which don't override them.
///
/// Only `owner` and `email` are resolved by this crate; the retry and
/// scheduling fields are carried for the external platform.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DefaultArgs {
    pub owner: Option<String>,
    pub email: NotificationTargets,
    pub depends_on_past: bool,
    pub start_date: Option<DateTime<Utc>>,
    pub email_on_failure: bool,
    pub email_on_retry: bool,
    pub retries: u32,
    /// Delay between retries, serialised as whole seconds.
    #[serde(with = "duration_secs")]
    pub retry_delay: Duration,
    /// How often the graph is scheduled, serialised as whole seconds.
    #[serde(with = "option_duration_secs")]
    pub schedule_interval: Option<Duration>,
}

impl DefaultArgs {
    pub fn owner(mut self, owner: impl Into<String>) -> Self {
        self.owner = Some(owner.into());
        self
    }

    pub fn email<I, S>(mut self, targets: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.email = targets.into_iter().collect();
        self
    }

    pub fn retries(mut self, retries: u32, retry_delay: Duration) -> Self {
        self.retries = retries;
        self.retry_delay = retry_delay;
        self
    }

    pub fn schedule_interval(mut self, interval: Duration) -> Self {
        self.schedule_interval = Some(interval);
        self
    }
}

mod duration_secs {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(value.as_secs())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_secs)
    }
}

mod option_duration_secs {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(
        value: &Option<Duration>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match value {
            Some(d) => serializer.serialize_some(&d.as_secs()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<Duration>, D::Error> {
        Ok(Option::<u64>::deserialize(deserializer)?.map(Duration::from_secs))
    }
}

// ---------------------------------------------------------------------------
// Task
// ---------------------------------------------------------------------------

/// A single unit of work in a graph.
///
/// Build one with [`Task::new`] and hand it to
/// [`crate::DagBuilder::add_node`]; edges are managed by the builder only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Task {
    id: String,
    owner: Option<String>,
    email: NotificationTargets,
    descriptor: ExecutionDescriptor,
    pub(crate) upstream: BTreeSet<String>,
    pub(crate) downstream: BTreeSet<String>,
}

impl Task {
    pub fn new(id: impl Into<String>, descriptor: impl Into<ExecutionDescriptor>) -> Self {
        Self {
            id: id.into(),
            owner: None,
            email: NotificationTargets::new(),
            descriptor: descriptor.into(),
            upstream: BTreeSet::new(),
            downstream: BTreeSet::new(),
        }
    }

    /// Override the graph default owner for this task.
    pub fn owner(mut self, owner: impl Into<String>) -> Self {
        self.owner = Some(owner.into());
        self
    }

    /// Override the graph default notification targets for this task.
    pub fn email(mut self, targets: NotificationTargets) -> Self {
        self.email = targets;
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// The task's own owner, without falling back to graph defaults.
    pub fn own_owner(&self) -> Option<&str> {
        self.owner.as_deref()
    }

    /// The task's own targets, without falling back to graph defaults.
    pub fn own_email(&self) -> &NotificationTargets {
        &self.email
    }

    pub fn descriptor(&self) -> &ExecutionDescriptor {
        &self.descriptor
    }

    /// IDs of the tasks this one depends on, sorted.
    pub fn upstream(&self) -> impl Iterator<Item = &str> {
        self.upstream.iter().map(String::as_str)
    }

    /// IDs of the tasks that depend on this one, sorted.
    pub fn downstream(&self) -> impl Iterator<Item = &str> {
        self.downstream.iter().map(String::as_str)
    }
}

// ---------------------------------------------------------------------------
// Dag
// ---------------------------------------------------------------------------

/// A frozen task graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dag {
    pub(crate) id: String,
    pub(crate) default_args: DefaultArgs,
    pub(crate) tasks: BTreeMap<String, Task>,
}

impl Dag {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn default_args(&self) -> &DefaultArgs {
        &self.default_args
    }

    pub fn get_task(&self, task_id: &str) -> Option<&Task> {
        self.tasks.get(task_id)
    }

    /// Tasks ordered by ID.
    pub fn tasks(&self) -> impl Iterator<Item = &Task> {
        self.tasks.values()
    }

    /// Task IDs in lexicographic order.
    pub fn task_ids(&self) -> Vec<&str> {
        self.tasks.keys().map(String::as_str).collect()
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Owner of `task`, falling back to the graph default.
    pub fn effective_owner<'a>(&'a self, task: &'a Task) -> Option<&'a str> {
        task.own_owner().or(self.default_args.owner.as_deref())
    }

    /// Notification targets of `task`: its own when non-empty, otherwise the
    /// graph default.
    pub fn effective_email<'a>(&'a self, task: &'a Task) -> &'a NotificationTargets {
        if task.own_email().is_empty() {
            &self.default_args.email
        } else {
            task.own_email()
        }
    }
}
