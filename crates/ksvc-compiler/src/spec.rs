//! Spec assembly
//!
//! Builds the service spec (revision template, container, init containers,
//! scheduling) from a deployment model, the derived metadata and the
//! autoscaling annotations. Nothing here reads from or writes to the model
//! beyond borrowing it; every collection in the output is freshly built.

use std::collections::BTreeMap;

use ksvc_common::k8s::{
    Container, ContainerPort, HttpGetAction, LabelSelector, Probe, ResourceQuantity,
    ResourceRequirements, TopologySpreadConstraint,
};
use ksvc_common::POD_SPREAD_LABEL_KEY;
use tracing::trace;

use crate::descriptor::{PodSpec, RevisionMeta, RevisionSpec, RevisionTemplateSpec, ServiceSpec};
use crate::metadata::CompiledMetadata;
use crate::model::{DeploymentModel, InitContainerSpec, ProbeSettings};

/// Maximum time a revision may take to respond to a request, in seconds
pub const DEFAULT_REQUEST_TIMEOUT_SECONDS: i64 = 30;

/// Port name Knative requires for HTTP/2 cleartext (gRPC) traffic
pub const H2C_PORT_NAME: &str = "h2c";

/// Assemble the service spec.
///
/// `annotations` become the revision template's annotations as-is.
pub fn build(
    model: &DeploymentModel,
    metadata: &CompiledMetadata,
    annotations: BTreeMap<String, String>,
) -> ServiceSpec {
    let pod_spec = PodSpec {
        containers: vec![build_container(model)],
        init_containers: model.init_containers.iter().map(build_init_container).collect(),
        volumes: model.volumes.clone(),
        topology_spread_constraints: spread_constraints(
            &model.topology_spread_constraints,
            &metadata.revision_name,
        ),
        enable_service_links: None,
    };

    ServiceSpec {
        template: RevisionTemplateSpec {
            metadata: RevisionMeta {
                name: metadata.revision_name.clone(),
                labels: metadata.revision_labels.clone(),
                annotations,
            },
            spec: RevisionSpec {
                pod_spec,
                container_concurrency: None,
                timeout_seconds: Some(DEFAULT_REQUEST_TIMEOUT_SECONDS),
            },
        },
        traffic: Vec::new(),
    }
}

/// Build the serving container
pub fn build_container(model: &DeploymentModel) -> Container {
    let port_name = model
        .protocol
        .is_streaming()
        .then(|| H2C_PORT_NAME.to_string());

    Container {
        name: String::new(),
        image: model.image.clone(),
        args: Vec::new(),
        env: model.envs.clone(),
        ports: vec![ContainerPort {
            name: port_name,
            container_port: model.container_port,
        }],
        resources: Some(build_resources(model)),
        liveness_probe: http_probe(&model.liveness_http_get_path, model.probe_port, &model.probe),
        readiness_probe: http_probe(
            &model.readiness_http_get_path,
            model.probe_port,
            &model.probe,
        ),
        volume_mounts: model.volume_mounts.clone(),
    }
}

fn build_resources(model: &DeploymentModel) -> ResourceRequirements {
    let requests = ResourceQuantity {
        cpu: Some(model.cpu_requests.to_string()),
        memory: Some(model.memory_requests.to_string()),
    };
    let limits = ResourceQuantity {
        cpu: model.cpu_limit.as_ref().map(ToString::to_string),
        memory: model.memory_limit.as_ref().map(ToString::to_string),
    };

    ResourceRequirements {
        requests: Some(requests),
        limits: (!limits.is_empty()).then_some(limits),
    }
}

/// An HTTP GET probe against `port`, or `None` when `path` is empty
fn http_probe(path: &str, port: u16, settings: &ProbeSettings) -> Option<Probe> {
    if path.is_empty() {
        return None;
    }
    Some(Probe {
        http_get: Some(HttpGetAction {
            path: path.to_string(),
            port,
        }),
        tcp_socket: None,
        initial_delay_seconds: settings.initial_delay_seconds,
        period_seconds: settings.period_seconds,
        timeout_seconds: settings.timeout_seconds,
        failure_threshold: settings.failure_threshold,
        success_threshold: None,
    })
}

fn build_init_container(spec: &InitContainerSpec) -> Container {
    let requests = ResourceQuantity {
        cpu: spec.cpu_requests.as_ref().map(ToString::to_string),
        memory: spec.memory_requests.as_ref().map(ToString::to_string),
    };

    Container {
        name: spec.name.clone(),
        image: spec.image.clone(),
        args: spec.args.clone(),
        env: spec.envs.clone(),
        resources: (!requests.is_empty()).then(|| ResourceRequirements {
            requests: Some(requests),
            limits: None,
        }),
        ..Default::default()
    }
}

/// Copy the constraints, scoping each selector to the revision's pods.
///
/// A constraint without a selector gets one matching only `app: <revision>`;
/// an existing selector keeps its other match labels and expressions.
pub fn spread_constraints(
    constraints: &[TopologySpreadConstraint],
    revision_name: &str,
) -> Vec<TopologySpreadConstraint> {
    constraints
        .iter()
        .map(|constraint| {
            let mut patched = constraint.clone();
            let selector = patched.label_selector.get_or_insert_with(LabelSelector::default);
            selector
                .match_labels
                .insert(POD_SPREAD_LABEL_KEY.to_string(), revision_name.to_string());
            trace!(
                topology_key = %patched.topology_key,
                revision = revision_name,
                "scoped topology spread constraint to revision"
            );
            patched
        })
        .collect()
}
