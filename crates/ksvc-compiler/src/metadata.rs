//! Object identity for the compiled service and its revision template

use ksvc_common::k8s::ObjectMeta;
use ksvc_common::{LabelSet, VISIBILITY_CLUSTER_LOCAL, VISIBILITY_LABEL_KEY};

use crate::model::DeploymentModel;

/// Suffix appended to the service name to form the revision name
pub const REVISION_NAME_SUFFIX: &str = "-0";

/// Name of the single revision template of a service
pub fn revision_name(service_name: &str) -> String {
    format!("{}{}", service_name, REVISION_NAME_SUFFIX)
}

/// Labels for the top-level service.
///
/// Cluster-local services get the visibility marker; the input set is never
/// modified.
pub fn service_labels(labels: &LabelSet, is_cluster_local: bool) -> LabelSet {
    let mut labels = labels.clone();
    if is_cluster_local {
        labels.insert(VISIBILITY_LABEL_KEY, VISIBILITY_CLUSTER_LOCAL);
    }
    labels
}

/// Labels for the revision template.
///
/// The visibility marker is a property of the service's route, so it is not
/// copied onto revisions.
pub fn revision_labels(labels: &LabelSet) -> LabelSet {
    labels.clone()
}

/// Metadata of the top-level service
pub fn service_metadata(model: &DeploymentModel, labels: LabelSet) -> ObjectMeta {
    ObjectMeta::new(&model.name, &model.namespace).with_labels(labels)
}

/// Metadata derived from a deployment model
#[derive(Clone, Debug, PartialEq)]
pub struct CompiledMetadata {
    /// Metadata of the top-level service
    pub service: ObjectMeta,
    /// Name of the revision template
    pub revision_name: String,
    /// Labels of the revision template
    pub revision_labels: LabelSet,
}

/// Build service and revision metadata for a model
pub fn build(model: &DeploymentModel) -> CompiledMetadata {
    CompiledMetadata {
        service: service_metadata(
            model,
            service_labels(&model.labels, model.is_cluster_local),
        ),
        revision_name: revision_name(&model.name),
        revision_labels: revision_labels(&model.labels),
    }
}
