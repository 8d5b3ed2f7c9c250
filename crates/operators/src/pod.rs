//! Container pod descriptor.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

fn default_namespace() -> String {
    "default".into()
}

/// A container launched as a pod on the cluster by the external platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PodSpec {
    /// Cluster namespace the pod is created in.
    #[serde(default = "default_namespace")]
    pub namespace: String,
    /// Container image reference, e.g. `python:3.6`.
    pub image: String,
    /// Entrypoint override.
    #[serde(default)]
    pub cmds: Vec<String>,
    /// Arguments passed to the entrypoint.
    #[serde(default)]
    pub arguments: Vec<String>,
    #[serde(default)]
    pub labels: BTreeMap<String, String>,
    /// Pod name as seen by the cluster.
    pub name: String,
    /// Stream container logs back into the task log.
    #[serde(default)]
    pub get_logs: bool,
}

impl PodSpec {
    /// Pod in the `default` namespace with no command, arguments or labels.
    pub fn new(name: impl Into<String>, image: impl Into<String>) -> Self {
        Self {
            namespace: default_namespace(),
            image: image.into(),
            cmds: Vec::new(),
            arguments: Vec::new(),
            labels: BTreeMap::new(),
            name: name.into(),
            get_logs: false,
        }
    }

    pub fn namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = namespace.into();
        self
    }

    pub fn cmds<I, S>(mut self, cmds: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.cmds = cmds.into_iter().map(Into::into).collect();
        self
    }

    pub fn arguments<I, S>(mut self, arguments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.arguments = arguments.into_iter().map(Into::into).collect();
        self
    }

    pub fn label(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.labels.insert(key.into(), value.into());
        self
    }

    pub fn get_logs(mut self, get_logs: bool) -> Self {
        self.get_logs = get_logs;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn builder_sets_every_field() {
        let pod = PodSpec::new("python-k8s-task", "python:3.6")
            .cmds(["python", "-c"])
            .arguments(["print('hello')"])
            .label("foo", "bar")
            .get_logs(true);

        assert_eq!(pod.namespace, "default");
        assert_eq!(pod.cmds, vec!["python", "-c"]);
        assert_eq!(pod.arguments, vec!["print('hello')"]);
        assert_eq!(pod.labels.get("foo").map(String::as_str), Some("bar"));
        assert!(pod.get_logs);
    }

    #[test]
    fn omitted_fields_take_defaults() {
        let pod: PodSpec = serde_json::from_value(json!({
            "image": "ubuntu:16.04",
            "name": "bash-k8s-task",
        }))
        .expect("minimal pod should parse");

        assert_eq!(pod, PodSpec::new("bash-k8s-task", "ubuntu:16.04"));
    }

    #[test]
    fn missing_image_is_rejected() {
        let parsed = serde_json::from_value::<PodSpec>(json!({ "name": "no-image" }));
        assert!(parsed.is_err());
    }
}
