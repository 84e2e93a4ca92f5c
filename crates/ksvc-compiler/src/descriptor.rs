//! Knative Service descriptor types (`serving.knative.dev/v1`)

use std::collections::BTreeMap;

use ksvc_common::k8s::{Container, HasApiResource, ObjectMeta, TopologySpreadConstraint, Volume};
use ksvc_common::LabelSet;
use serde::{Deserialize, Serialize};

/// Knative Service
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct KnativeService {
    /// API version
    pub api_version: String,
    /// Kind
    pub kind: String,
    /// Metadata
    pub metadata: ObjectMeta,
    /// Spec
    pub spec: ServiceSpec,
}

impl HasApiResource for KnativeService {
    const API_VERSION: &'static str = "serving.knative.dev/v1";
    const KIND: &'static str = "Service";
}

impl KnativeService {
    /// Create a service with the given metadata and spec
    pub fn new(metadata: ObjectMeta, spec: ServiceSpec) -> Self {
        Self {
            api_version: Self::API_VERSION.to_string(),
            kind: Self::KIND.to_string(),
            metadata,
            spec,
        }
    }

    /// The serving (first) container of the revision template
    pub fn user_container(&self) -> Option<&Container> {
        self.spec.template.spec.pod_spec.containers.first()
    }
}

/// Service spec: a configuration template plus routing
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ServiceSpec {
    /// Revision template
    pub template: RevisionTemplateSpec,
    /// Traffic split across revisions
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub traffic: Vec<TrafficTarget>,
}

/// Revision template
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RevisionTemplateSpec {
    /// Revision metadata
    pub metadata: RevisionMeta,
    /// Revision spec
    pub spec: RevisionSpec,
}

/// Revision metadata (no namespace; revisions inherit the service's)
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RevisionMeta {
    /// Revision name
    pub name: String,
    /// Labels
    #[serde(default, skip_serializing_if = "LabelSet::is_empty")]
    pub labels: LabelSet,
    /// Annotations
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub annotations: BTreeMap<String, String>,
}

/// Revision spec: a pod spec plus Knative serving fields
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RevisionSpec {
    /// Pod spec, inlined
    #[serde(flatten)]
    pub pod_spec: PodSpec,
    /// Maximum in-flight requests per container (0 = unlimited)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub container_concurrency: Option<i64>,
    /// Maximum duration of a request, in seconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_seconds: Option<i64>,
}

/// Pod spec
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PodSpec {
    /// Containers
    pub containers: Vec<Container>,
    /// Init containers (run before main containers)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub init_containers: Vec<Container>,
    /// Volumes
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub volumes: Vec<Volume>,
    /// Topology spread constraints
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub topology_spread_constraints: Vec<TopologySpreadConstraint>,
    /// Inject service environment variables into containers
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enable_service_links: Option<bool>,
}

/// One entry of a traffic split
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TrafficTarget {
    /// Route to whatever revision is newest
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latest_revision: Option<bool>,
    /// Pinned revision
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub revision_name: Option<String>,
    /// Share of traffic, 0-100
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub percent: Option<i64>,
    /// Named sub-route
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
}
