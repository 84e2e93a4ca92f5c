//! Kubernetes primitive types used by compiled descriptors
//!
//! These are the subset of the core/v1 schema that a Knative revision
//! template carries. Field names serialize in the camelCase form the API
//! server expects; empty collections and unset options are skipped so the
//! serialized output only contains what was set.
//!
//! Types that are copied from the deployment model into the descriptor
//! (volumes, mounts, env vars, spread constraints) keep every field they do
//! not model in an `extra` map, so they pass through without loss.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::LabelSet;

/// Fields of a pass-through type that are not modelled explicitly
pub type ExtraFields = BTreeMap<String, serde_json::Value>;

// =============================================================================
// API identity
// =============================================================================

/// Trait for resource types with a compile-time known apiVersion and kind.
///
/// # Example
/// ```ignore
/// impl HasApiResource for KnativeService {
///     const API_VERSION: &'static str = "serving.knative.dev/v1";
///     const KIND: &'static str = "Service";
/// }
/// ```
pub trait HasApiResource {
    /// Full API version (e.g., "serving.knative.dev/v1", "v1")
    const API_VERSION: &'static str;
    /// Resource kind (e.g., "Service")
    const KIND: &'static str;
}

// =============================================================================
// Metadata
// =============================================================================

/// Object metadata for a top-level, namespaced resource
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ObjectMeta {
    /// Resource name
    pub name: String,
    /// Resource namespace
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub namespace: String,
    /// Labels
    #[serde(default, skip_serializing_if = "LabelSet::is_empty")]
    pub labels: LabelSet,
    /// Annotations
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub annotations: BTreeMap<String, String>,
}

impl ObjectMeta {
    /// Create metadata with a name and namespace and no labels
    pub fn new(name: impl Into<String>, namespace: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            namespace: namespace.into(),
            labels: LabelSet::new(),
            annotations: BTreeMap::new(),
        }
    }

    /// Replace the labels
    pub fn with_labels(mut self, labels: LabelSet) -> Self {
        self.labels = labels;
        self
    }
}

// =============================================================================
// Container
// =============================================================================

/// Container spec
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Container {
    /// Container name
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
    /// Image
    pub image: String,
    /// Args
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub args: Vec<String>,
    /// Environment variables
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub env: Vec<EnvVar>,
    /// Ports
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub ports: Vec<ContainerPort>,
    /// Resource requirements
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resources: Option<ResourceRequirements>,
    /// Liveness probe - restarts container when it fails
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub liveness_probe: Option<Probe>,
    /// Readiness probe - removes from service endpoints when it fails
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub readiness_probe: Option<Probe>,
    /// Volume mounts
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub volume_mounts: Vec<VolumeMount>,
}

/// Environment variable -- either a literal value or a reference
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EnvVar {
    /// Variable name
    pub name: String,
    /// Literal value (mutually exclusive with `value_from`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    /// Reference to a secret or config map key (mutually exclusive with `value`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value_from: Option<EnvVarSource>,
    /// Unmodelled fields
    #[serde(flatten)]
    pub extra: ExtraFields,
}

impl EnvVar {
    /// Create an env var with a literal value
    pub fn literal(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: Some(value.into()),
            ..Default::default()
        }
    }
}

/// Source for an environment variable value
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EnvVarSource {
    /// Reference to a specific key in a Secret
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secret_key_ref: Option<KeySelector>,
    /// Reference to a specific key in a ConfigMap
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config_map_key_ref: Option<KeySelector>,
    /// Other sources (`fieldRef`, `resourceFieldRef`)
    #[serde(flatten)]
    pub extra: ExtraFields,
}

/// Selector for a key within a Secret or ConfigMap
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct KeySelector {
    /// Name of the Secret or ConfigMap
    pub name: String,
    /// Key within it
    pub key: String,
    /// Unmodelled fields (`optional`)
    #[serde(flatten)]
    pub extra: ExtraFields,
}

/// Container port
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ContainerPort {
    /// Port name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Port number
    pub container_port: u16,
}

// =============================================================================
// Resource requirements
// =============================================================================

/// Resource requirements
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ResourceRequirements {
    /// Requests
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub requests: Option<ResourceQuantity>,
    /// Limits
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limits: Option<ResourceQuantity>,
}

/// Resource quantity
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct ResourceQuantity {
    /// CPU quantity (e.g. "500m")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cpu: Option<String>,
    /// Memory quantity (e.g. "512Mi")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memory: Option<String>,
}

impl ResourceQuantity {
    /// Whether neither cpu nor memory is set
    pub fn is_empty(&self) -> bool {
        self.cpu.is_none() && self.memory.is_none()
    }
}

// =============================================================================
// Probes
// =============================================================================

/// Probe specification
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Probe {
    /// HTTP GET probe
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub http_get: Option<HttpGetAction>,
    /// TCP socket probe
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tcp_socket: Option<TcpSocketAction>,
    /// Seconds after container start before probes begin
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub initial_delay_seconds: Option<i32>,
    /// Seconds between probe attempts
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub period_seconds: Option<i32>,
    /// Seconds before the probe times out
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_seconds: Option<i32>,
    /// Consecutive failures before marking unhealthy
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure_threshold: Option<i32>,
    /// Consecutive successes before marking healthy
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub success_threshold: Option<i32>,
}

/// HTTP GET action for probe
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct HttpGetAction {
    /// Path
    pub path: String,
    /// Port (0 lets the platform pick the serving port)
    #[serde(default, skip_serializing_if = "is_zero_port")]
    pub port: u16,
}

/// TCP socket action for probe
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TcpSocketAction {
    /// Port (0 lets the platform pick the serving port)
    #[serde(default, skip_serializing_if = "is_zero_port")]
    pub port: u16,
}

fn is_zero_port(port: &u16) -> bool {
    *port == 0
}

// =============================================================================
// Volumes
// =============================================================================

/// Volume
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Volume {
    /// Volume name
    pub name: String,
    /// ConfigMap source
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config_map: Option<ConfigMapVolumeSource>,
    /// Secret source
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secret: Option<SecretVolumeSource>,
    /// EmptyDir source
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub empty_dir: Option<EmptyDirVolumeSource>,
    /// Other sources (`persistentVolumeClaim`, `projected`, ...)
    #[serde(flatten)]
    pub extra: ExtraFields,
}

impl Volume {
    /// Create a Volume backed by a ConfigMap.
    pub fn from_config_map(name: impl Into<String>, cm_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            config_map: Some(ConfigMapVolumeSource {
                name: cm_name.into(),
                extra: ExtraFields::new(),
            }),
            ..Default::default()
        }
    }
}

/// ConfigMap volume source
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ConfigMapVolumeSource {
    /// ConfigMap name
    pub name: String,
    /// Unmodelled fields (`items`, `defaultMode`)
    #[serde(flatten)]
    pub extra: ExtraFields,
}

/// Secret volume source
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SecretVolumeSource {
    /// Secret name
    pub secret_name: String,
    /// Unmodelled fields (`items`, `defaultMode`)
    #[serde(flatten)]
    pub extra: ExtraFields,
}

/// EmptyDir volume source
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EmptyDirVolumeSource {
    /// Size limit for the emptyDir (e.g., "1Gi")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size_limit: Option<String>,
    /// Unmodelled fields (`medium`)
    #[serde(flatten)]
    pub extra: ExtraFields,
}

/// Volume mount
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct VolumeMount {
    /// Volume name
    pub name: String,
    /// Mount path
    pub mount_path: String,
    /// Sub path within the volume
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub_path: Option<String>,
    /// Read only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub read_only: Option<bool>,
    /// Unmodelled fields (`mountPropagation`, `subPathExpr`)
    #[serde(flatten)]
    pub extra: ExtraFields,
}

// =============================================================================
// Scheduling
// =============================================================================

/// Topology spread constraint for distributing pods across failure domains
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TopologySpreadConstraint {
    /// Maximum difference in pod count between topology domains
    pub max_skew: i32,
    /// Topology key (e.g., topology.kubernetes.io/zone)
    pub topology_key: String,
    /// What to do when constraint can't be satisfied
    pub when_unsatisfiable: String,
    /// Label selector to find pods to spread
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label_selector: Option<LabelSelector>,
    /// Minimum number of eligible domains
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_domains: Option<i32>,
    /// Unmodelled fields (`nodeAffinityPolicy`, `matchLabelKeys`, ...)
    #[serde(flatten)]
    pub extra: ExtraFields,
}

/// Label selector
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LabelSelector {
    /// Match labels
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub match_labels: BTreeMap<String, String>,
    /// Match expressions
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub match_expressions: Vec<LabelSelectorRequirement>,
}

/// A single set-based selector requirement
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LabelSelectorRequirement {
    /// Label key
    pub key: String,
    /// In, NotIn, Exists or DoesNotExist
    pub operator: String,
    /// Values for In / NotIn
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub values: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unset_fields_are_not_serialized() {
        let container = Container {
            image: "img:v1".to_string(),
            ports: vec![ContainerPort {
                name: None,
                container_port: 8080,
            }],
            ..Default::default()
        };
        let json = serde_json::to_value(&container).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "image": "img:v1",
                "ports": [{"containerPort": 8080}]
            })
        );
    }

    #[test]
    fn topology_constraint_uses_camel_case() {
        let tsc = TopologySpreadConstraint {
            max_skew: 1,
            topology_key: "topology.kubernetes.io/zone".to_string(),
            when_unsatisfiable: "ScheduleAnyway".to_string(),
            label_selector: Some(LabelSelector {
                match_labels: [("app".to_string(), "svc-0".to_string())]
                    .into_iter()
                    .collect(),
                match_expressions: vec![],
            }),
            ..Default::default()
        };
        let json = serde_json::to_value(&tsc).unwrap();
        assert_eq!(json["maxSkew"], 1);
        assert_eq!(json["whenUnsatisfiable"], "ScheduleAnyway");
        assert_eq!(json["labelSelector"]["matchLabels"]["app"], "svc-0");
        assert!(json.get("minDomains").is_none());
    }

    // =========================================================================
    // Story: pass-through types keep fields they do not model
    // =========================================================================

    fn round_trip<T: serde::de::DeserializeOwned + Serialize>(
        value: serde_json::Value,
    ) -> serde_json::Value {
        let typed: T = serde_json::from_value(value).unwrap();
        serde_json::to_value(&typed).unwrap()
    }

    #[test]
    fn volumes_keep_unmodelled_sources() {
        let pvc = serde_json::json!({
            "name": "data",
            "persistentVolumeClaim": {"claimName": "model-store", "readOnly": true}
        });
        assert_eq!(round_trip::<Volume>(pvc.clone()), pvc);

        let config_map = serde_json::json!({
            "name": "cfg",
            "configMap": {
                "name": "c",
                "items": [{"key": "app.yaml", "path": "app.yaml"}],
                "defaultMode": 420
            }
        });
        assert_eq!(round_trip::<Volume>(config_map.clone()), config_map);

        let volume: Volume = serde_json::from_value(pvc).unwrap();
        assert!(volume.empty_dir.is_none());
        assert!(volume.extra.contains_key("persistentVolumeClaim"));
    }

    #[test]
    fn env_vars_keep_field_refs() {
        let env = serde_json::json!({
            "name": "POD_IP",
            "valueFrom": {"fieldRef": {"fieldPath": "status.podIP"}}
        });
        assert_eq!(round_trip::<EnvVar>(env.clone()), env);

        let secret = serde_json::json!({
            "name": "TOKEN",
            "valueFrom": {"secretKeyRef": {"name": "creds", "key": "token", "optional": true}}
        });
        assert_eq!(round_trip::<EnvVar>(secret.clone()), secret);
    }

    #[test]
    fn mounts_and_constraints_keep_unmodelled_fields() {
        let mount = serde_json::json!({
            "name": "data",
            "mountPath": "/data",
            "mountPropagation": "HostToContainer"
        });
        assert_eq!(round_trip::<VolumeMount>(mount.clone()), mount);

        let tsc = serde_json::json!({
            "maxSkew": 1,
            "topologyKey": "topology.kubernetes.io/zone",
            "whenUnsatisfiable": "DoNotSchedule",
            "nodeAffinityPolicy": "Honor",
            "matchLabelKeys": ["pod-template-hash"]
        });
        assert_eq!(round_trip::<TopologySpreadConstraint>(tsc.clone()), tsc);
    }

    #[test]
    fn object_meta_builder() {
        let meta = ObjectMeta::new("svc", "ns").with_labels(LabelSet::new().with("team", "ml"));
        assert_eq!(meta.name, "svc");
        assert_eq!(meta.namespace, "ns");
        assert_eq!(meta.labels.get("team"), Some("ml"));
        assert!(meta.annotations.is_empty());
    }
}
