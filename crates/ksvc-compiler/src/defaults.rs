//! Platform default-filling
//!
//! The platform fills unset fields of a service when it is admitted. The
//! compiler applies the same defaults before returning so that what it hands
//! back is what the platform will store.

use ksvc_common::k8s::{Probe, TcpSocketAction};

use crate::descriptor::{KnativeService, TrafficTarget};

/// Name given to the serving container when none is set
pub const KNATIVE_USER_CONTAINER_NAME: &str = "user-container";

/// Revision timeout used when none is set, in seconds
pub const DEFAULT_REVISION_TIMEOUT_SECONDS: i64 = 300;

/// Fills platform defaults into a compiled service.
///
/// Implementations must be idempotent.
#[cfg_attr(test, mockall::automock)]
pub trait Defaulter: Send + Sync {
    /// Fill unset fields of `service` in place
    fn set_defaults(&self, service: &mut KnativeService);
}

/// Defaults applied by Knative Serving's admission webhook
#[derive(Clone, Copy, Debug, Default)]
pub struct KnativeDefaulter;

impl Defaulter for KnativeDefaulter {
    fn set_defaults(&self, service: &mut KnativeService) {
        let revision = &mut service.spec.template.spec;
        revision.container_concurrency.get_or_insert(0);
        revision
            .timeout_seconds
            .get_or_insert(DEFAULT_REVISION_TIMEOUT_SECONDS);

        let pod = &mut revision.pod_spec;
        pod.enable_service_links.get_or_insert(false);

        if let Some(container) = pod.containers.first_mut() {
            if container.name.is_empty() {
                container.name = KNATIVE_USER_CONTAINER_NAME.to_string();
            }

            let readiness = container.readiness_probe.get_or_insert_with(|| Probe {
                tcp_socket: Some(TcpSocketAction::default()),
                ..Default::default()
            });
            readiness.success_threshold.get_or_insert(1);
        }

        if service.spec.traffic.is_empty() {
            service.spec.traffic.push(TrafficTarget {
                latest_revision: Some(true),
                percent: Some(100),
                ..Default::default()
            });
        }
    }
}
