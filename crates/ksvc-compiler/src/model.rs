//! Deployment model: the platform-agnostic description of one service
//!
//! A [`DeploymentModel`] is produced upstream (usually by loading a YAML or
//! JSON document) and handed read-only to the compiler. Quantities are
//! validated while the model is built, so a model that exists is always
//! compilable apart from its autoscaling target.

use ksvc_common::k8s::{EnvVar, TopologySpreadConstraint, Volume, VolumeMount};
use ksvc_common::{Error, LabelSet, Quantity};
use serde::{Deserialize, Serialize};

use crate::autoscaling::AutoscalingMetric;

/// Wire protocol served by the container
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Protocol {
    /// Plain HTTP with JSON payloads
    #[default]
    #[serde(rename = "HTTP_JSON", alias = "http")]
    HttpJson,
    /// Universal Prediction Interface over gRPC
    #[serde(rename = "UPI_V1", alias = "upi")]
    UpiV1,
}

impl Protocol {
    /// Whether the protocol needs an HTTP/2 cleartext port
    pub fn is_streaming(&self) -> bool {
        matches!(self, Self::UpiV1)
    }
}

/// Timing settings shared by the liveness and readiness probes
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProbeSettings {
    /// Seconds after container start before probes begin
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub initial_delay_seconds: Option<i32>,
    /// Seconds between probe attempts
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub period_seconds: Option<i32>,
    /// Seconds before a probe attempt times out
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_seconds: Option<i32>,
    /// Consecutive failures before the container is marked unhealthy
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure_threshold: Option<i32>,
}

/// An init container to run before the serving container
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitContainerSpec {
    /// Container name
    pub name: String,
    /// Image reference
    pub image: String,
    /// Arguments
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub args: Vec<String>,
    /// Environment variables
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub envs: Vec<EnvVar>,
    /// Requested CPU
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cpu_requests: Option<Quantity>,
    /// Requested memory
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memory_requests: Option<Quantity>,
}

/// Everything needed to compile one Knative Service
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentModel {
    // Identity
    /// Service name
    pub name: String,
    /// Service namespace
    pub namespace: String,
    /// Labels applied to the service and its revisions
    #[serde(default)]
    pub labels: LabelSet,

    // Runtime
    /// Container image reference
    pub image: String,
    /// Port the container listens on
    pub container_port: u16,
    /// Wire protocol served on `container_port`
    #[serde(default)]
    pub protocol: Protocol,

    // Resources
    /// Requested CPU
    #[serde(default)]
    pub cpu_requests: Quantity,
    /// Requested memory
    #[serde(default)]
    pub memory_requests: Quantity,
    /// CPU limit
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cpu_limit: Option<Quantity>,
    /// Memory limit
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memory_limit: Option<Quantity>,
    /// Percentage of container resources for the queue-proxy sidecar (0 = platform default)
    #[serde(default)]
    pub queue_proxy_resource_percentage: i32,

    // Scaling
    /// Lower replica bound
    #[serde(default)]
    pub min_replicas: u32,
    /// Upper replica bound
    #[serde(default)]
    pub max_replicas: u32,
    /// Replicas created for a new revision
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub initial_scale: Option<u32>,
    /// Metric driving the autoscaler
    #[serde(default)]
    pub autoscaling_metric: AutoscalingMetric,
    /// Raw target for the metric; absolute for concurrency/rps, a percentage for cpu/memory
    #[serde(default, deserialize_with = "ksvc_common::yaml::string_or_number")]
    pub autoscaling_target: String,

    // Scheduling
    /// Spread constraints for revision pods
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub topology_spread_constraints: Vec<TopologySpreadConstraint>,

    /// Restrict the service to in-cluster traffic
    #[serde(default, rename = "is_cluster_local", alias = "isClusterLocal")]
    pub is_cluster_local: bool,

    // Probes
    /// HTTP path for the liveness probe; empty disables it
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub liveness_http_get_path: String,
    /// HTTP path for the readiness probe; empty disables it
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub readiness_http_get_path: String,
    /// Port both probes target
    #[serde(default)]
    pub probe_port: u16,
    /// Probe timing settings
    #[serde(default)]
    pub probe: ProbeSettings,

    // Extras
    /// Init containers
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub init_containers: Vec<InitContainerSpec>,
    /// Pod volumes
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub volumes: Vec<Volume>,
    /// Mounts for the serving container
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub volume_mounts: Vec<VolumeMount>,
    /// Environment for the serving container
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub envs: Vec<EnvVar>,
}

impl DeploymentModel {
    /// Load a model from a YAML document
    pub fn from_yaml(input: &str) -> Result<Self, Error> {
        ksvc_common::yaml::from_yaml(input)
    }

    /// Load a model from a JSON document
    pub fn from_json(input: &str) -> Result<Self, Error> {
        Ok(serde_json::from_str(input)?)
    }

    /// Check the model for values the platform would reject.
    ///
    /// The compiler only calls this in strict mode; by default malformed
    /// models are left to the platform's admission checks.
    pub fn validate(&self) -> Result<(), Error> {
        let field_error =
            |field: &str, msg: String| Error::validation_for_field(&self.name, field, msg);

        if self.name.is_empty() {
            return Err(field_error("name", "must not be empty".to_string()));
        }
        if self.namespace.is_empty() {
            return Err(field_error("namespace", "must not be empty".to_string()));
        }
        if self.image.is_empty() {
            return Err(field_error("image", "must not be empty".to_string()));
        }
        if self.container_port == 0 {
            return Err(field_error("containerPort", "must be set".to_string()));
        }
        if self.min_replicas > self.max_replicas {
            return Err(field_error(
                "maxReplicas",
                format!(
                    "maxReplicas ({}) must be >= minReplicas ({})",
                    self.max_replicas, self.min_replicas
                ),
            ));
        }
        if let Some(initial) = self.initial_scale {
            if initial > self.max_replicas {
                return Err(field_error(
                    "initialScale",
                    format!(
                        "initialScale ({}) must be <= maxReplicas ({})",
                        initial, self.max_replicas
                    ),
                ));
            }
        }
        if !(0..=100).contains(&self.queue_proxy_resource_percentage) {
            return Err(field_error(
                "queueProxyResourcePercentage",
                format!(
                    "must be between 0 and 100, got {}",
                    self.queue_proxy_resource_percentage
                ),
            ));
        }
        Ok(())
    }
}
