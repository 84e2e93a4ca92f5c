//! Autoscaling policy translation
//!
//! Turns a `(metric, target)` pair from the deployment model into the
//! annotation values the Knative autoscaler expects. Each metric has its own
//! unit and format rules:
//!
//! | metric | target format |
//! |---|---|
//! | `rps`, `cpu` | whole number |
//! | `memory` | percent of requested memory, emitted in Mi |
//! | `concurrency` | two decimal places, at least `0.01` |
//! | anything else | passed through verbatim |

use std::collections::BTreeMap;
use std::fmt;

use ksvc_common::quantity::MEBIBYTE;
use ksvc_common::Quantity;
use serde::{Deserialize, Serialize};

use crate::error::CompileError;
use crate::model::DeploymentModel;

/// Annotation: lower replica bound
pub const MIN_SCALE_ANNOTATION: &str = "autoscaling.knative.dev/minScale";
/// Annotation: upper replica bound
pub const MAX_SCALE_ANNOTATION: &str = "autoscaling.knative.dev/maxScale";
/// Annotation: metric driving the autoscaler
pub const METRIC_ANNOTATION: &str = "autoscaling.knative.dev/metric";
/// Annotation: per-replica target for the metric
pub const TARGET_ANNOTATION: &str = "autoscaling.knative.dev/target";
/// Annotation: autoscaler implementation class
pub const CLASS_ANNOTATION: &str = "autoscaling.knative.dev/class";
/// Annotation: replicas created for a new revision
pub const INITIAL_SCALE_ANNOTATION: &str = "autoscaling.knative.dev/initial-scale";
/// Annotation: share of container resources given to the queue-proxy sidecar
pub const QUEUE_PROXY_RESOURCE_PERCENTAGE_ANNOTATION: &str =
    "queue.sidecar.serving.knative.dev/resourcePercentage";

/// Metric driving autoscaling decisions.
///
/// Anything other than the four well-known metrics is kept verbatim as
/// [`AutoscalingMetric::Custom`].
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum AutoscalingMetric {
    /// In-flight requests per replica
    #[default]
    Concurrency,
    /// Requests per second per replica
    Rps,
    /// CPU utilization percentage
    Cpu,
    /// Memory usage as a percentage of requested memory
    Memory,
    /// Platform-specific metric name
    Custom(String),
}

impl AutoscalingMetric {
    /// Metric name as written in the `metric` annotation
    pub fn as_str(&self) -> &str {
        match self {
            Self::Concurrency => "concurrency",
            Self::Rps => "rps",
            Self::Cpu => "cpu",
            Self::Memory => "memory",
            Self::Custom(name) => name,
        }
    }

    /// Autoscaler implementation class for this metric.
    ///
    /// Returns `None` for custom metrics; no class annotation is emitted for
    /// them and the platform picks its default.
    pub fn class(&self) -> Option<AutoscalingClass> {
        match self {
            Self::Concurrency | Self::Rps => Some(AutoscalingClass::Kpa),
            Self::Cpu | Self::Memory => Some(AutoscalingClass::Hpa),
            Self::Custom(_) => None,
        }
    }
}

impl From<String> for AutoscalingMetric {
    fn from(value: String) -> Self {
        match value.as_str() {
            "concurrency" => Self::Concurrency,
            "rps" => Self::Rps,
            "cpu" => Self::Cpu,
            "memory" => Self::Memory,
            _ => Self::Custom(value),
        }
    }
}

impl From<&str> for AutoscalingMetric {
    fn from(value: &str) -> Self {
        Self::from(value.to_string())
    }
}

impl From<AutoscalingMetric> for String {
    fn from(metric: AutoscalingMetric) -> Self {
        match metric {
            AutoscalingMetric::Custom(name) => name,
            other => other.as_str().to_string(),
        }
    }
}

impl fmt::Display for AutoscalingMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Knative autoscaler implementation family
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AutoscalingClass {
    /// Knative Pod Autoscaler (request-driven)
    Kpa,
    /// Kubernetes Horizontal Pod Autoscaler (resource-driven)
    Hpa,
}

impl AutoscalingClass {
    /// Value of the `class` annotation
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Kpa => "kpa.autoscaling.knative.dev",
            Self::Hpa => "hpa.autoscaling.knative.dev",
        }
    }
}

impl fmt::Display for AutoscalingClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Translate a raw target into the value of the `target` annotation.
///
/// `memory_requests` is only consulted for the memory metric, whose target
/// is a percentage of the requested memory.
pub fn autoscaling_target(
    metric: &AutoscalingMetric,
    raw: &str,
    memory_requests: &Quantity,
) -> Result<String, CompileError> {
    let parse = |raw: &str| {
        raw.parse::<f64>()
            .map_err(|e| CompileError::invalid_target(metric.as_str(), raw, e))
    };

    match metric {
        AutoscalingMetric::Cpu | AutoscalingMetric::Rps => Ok(format!("{:.0}", parse(raw)?)),
        AutoscalingMetric::Memory => {
            let percent = parse(raw)?;
            let target_bytes = (memory_requests.as_f64() * percent / 100.0).ceil();
            Ok(format!("{:.0}", target_bytes / MEBIBYTE))
        }
        AutoscalingMetric::Concurrency => {
            let target = format!("{:.2}", parse(raw)?);
            if target == "0.00" {
                return Err(CompileError::concurrency_too_low(raw));
            }
            Ok(target)
        }
        AutoscalingMetric::Custom(_) => Ok(raw.to_string()),
    }
}

/// Compute the full autoscaling annotation set for a model.
pub fn autoscaling_annotations(
    model: &DeploymentModel,
) -> Result<BTreeMap<String, String>, CompileError> {
    let metric = &model.autoscaling_metric;
    let target = autoscaling_target(metric, &model.autoscaling_target, &model.memory_requests)?;

    let mut annotations = BTreeMap::new();
    annotations.insert(
        MIN_SCALE_ANNOTATION.to_string(),
        model.min_replicas.to_string(),
    );
    annotations.insert(
        MAX_SCALE_ANNOTATION.to_string(),
        model.max_replicas.to_string(),
    );
    annotations.insert(METRIC_ANNOTATION.to_string(), metric.to_string());
    annotations.insert(TARGET_ANNOTATION.to_string(), target);

    if let Some(class) = metric.class() {
        annotations.insert(CLASS_ANNOTATION.to_string(), class.to_string());
    }

    if let Some(initial_scale) = model.initial_scale {
        annotations.insert(
            INITIAL_SCALE_ANNOTATION.to_string(),
            initial_scale.to_string(),
        );
    }

    if model.queue_proxy_resource_percentage > 0 {
        annotations.insert(
            QUEUE_PROXY_RESOURCE_PERCENTAGE_ANNOTATION.to_string(),
            model.queue_proxy_resource_percentage.to_string(),
        );
    }

    Ok(annotations)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn target(metric: &str, raw: &str) -> Result<String, CompileError> {
        autoscaling_target(&metric.into(), raw, &Quantity::default())
    }

    fn memory_target(requests: &str, raw: &str) -> Result<String, CompileError> {
        autoscaling_target(
            &AutoscalingMetric::Memory,
            raw,
            &Quantity::parse(requests).unwrap(),
        )
    }

    // =========================================================================
    // Story: rps and cpu targets are whole numbers
    // =========================================================================

    #[test]
    fn rps_and_cpu_round_to_integers() {
        assert_eq!(target("rps", "37.4").unwrap(), "37");
        assert_eq!(target("cpu", "37.4").unwrap(), "37");
        assert_eq!(target("cpu", "80").unwrap(), "80");
        assert_eq!(target("rps", "99.9").unwrap(), "100");
    }

    #[test]
    fn rps_and_cpu_reject_non_numbers() {
        let err = target("cpu", "eighty").unwrap_err();
        assert!(matches!(err, CompileError::InvalidTarget { ref value, .. } if value == "eighty"));
        assert!(err.to_string().contains("eighty"));
        assert!(target("rps", "").is_err());
    }

    // =========================================================================
    // Story: memory targets are a percentage of requested memory, in Mi
    // =========================================================================

    #[test]
    fn memory_percentage_converts_to_mebibytes() {
        assert_eq!(memory_target("2Gi", "50").unwrap(), "1024");
        assert_eq!(memory_target("4Gi", "50").unwrap(), "2048");
        assert_eq!(memory_target("512Mi", "75").unwrap(), "384");
    }

    #[test]
    fn memory_target_rounds_to_whole_mebibytes() {
        // 1000Mi * 33.3% = 333Mi
        assert_eq!(memory_target("1000Mi", "33.3").unwrap(), "333");
    }

    #[test]
    fn memory_rejects_non_numbers() {
        let err = memory_target("1Gi", "half").unwrap_err();
        assert_eq!(err.code(), "parse_error");
    }

    // =========================================================================
    // Story: concurrency targets keep two decimals and must be positive
    // =========================================================================

    #[test]
    fn concurrency_keeps_two_decimals() {
        assert_eq!(target("concurrency", "12.345").unwrap(), "12.35");
        assert_eq!(target("concurrency", "10").unwrap(), "10.00");
        assert_eq!(target("concurrency", "0.005").unwrap(), "0.01");
    }

    #[test]
    fn concurrency_rounding_to_zero_is_a_policy_violation() {
        let err = target("concurrency", "0.001").unwrap_err();
        assert!(matches!(err, CompileError::ConcurrencyTooLow { ref value } if value == "0.001"));
        assert_eq!(err.code(), "policy_violation");

        assert!(target("concurrency", "0").is_err());
    }

    #[test]
    fn concurrency_rejects_non_numbers() {
        let err = target("concurrency", "many").unwrap_err();
        assert_eq!(err.code(), "parse_error");
    }

    // =========================================================================
    // Story: custom metrics pass through untouched
    // =========================================================================

    #[test]
    fn custom_metric_passes_raw_value_through() {
        assert_eq!(target("custom-metric", "not a number").unwrap(), "not a number");
        assert_eq!(target("custom-metric", "").unwrap(), "");
        assert_eq!(target("custom-metric", "0.001").unwrap(), "0.001");
    }

    // =========================================================================
    // Story: metric selects the implementation class
    // =========================================================================

    #[test]
    fn metric_selects_class() {
        assert_eq!(
            AutoscalingMetric::Concurrency.class(),
            Some(AutoscalingClass::Kpa)
        );
        assert_eq!(AutoscalingMetric::Rps.class(), Some(AutoscalingClass::Kpa));
        assert_eq!(AutoscalingMetric::Cpu.class(), Some(AutoscalingClass::Hpa));
        assert_eq!(AutoscalingMetric::Memory.class(), Some(AutoscalingClass::Hpa));
        assert_eq!(AutoscalingMetric::from("custom-metric").class(), None);
    }

    #[test]
    fn metric_round_trips_through_strings() {
        assert_eq!(AutoscalingMetric::from("rps"), AutoscalingMetric::Rps);
        assert_eq!(
            AutoscalingMetric::from("queue-depth"),
            AutoscalingMetric::Custom("queue-depth".to_string())
        );
        let json = serde_json::to_string(&AutoscalingMetric::Memory).unwrap();
        assert_eq!(json, r#""memory""#);
        let back: AutoscalingMetric = serde_json::from_str(r#""queue-depth""#).unwrap();
        assert_eq!(back.as_str(), "queue-depth");
    }

    // =========================================================================
    // Story: annotation set
    // =========================================================================

    fn model(metric: &str, target: &str) -> DeploymentModel {
        DeploymentModel {
            name: "svc1".to_string(),
            namespace: "ns1".to_string(),
            min_replicas: 1,
            max_replicas: 5,
            autoscaling_metric: metric.into(),
            autoscaling_target: target.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn annotations_for_cpu() {
        let annotations = autoscaling_annotations(&model("cpu", "80")).unwrap();
        assert_eq!(annotations[MIN_SCALE_ANNOTATION], "1");
        assert_eq!(annotations[MAX_SCALE_ANNOTATION], "5");
        assert_eq!(annotations[METRIC_ANNOTATION], "cpu");
        assert_eq!(annotations[TARGET_ANNOTATION], "80");
        assert_eq!(annotations[CLASS_ANNOTATION], "hpa.autoscaling.knative.dev");
        assert!(!annotations.contains_key(INITIAL_SCALE_ANNOTATION));
        assert!(!annotations.contains_key(QUEUE_PROXY_RESOURCE_PERCENTAGE_ANNOTATION));
    }

    #[test]
    fn annotations_include_optional_entries_when_set() {
        let mut m = model("rps", "10");
        m.initial_scale = Some(3);
        m.queue_proxy_resource_percentage = 20;

        let annotations = autoscaling_annotations(&m).unwrap();
        assert_eq!(annotations[INITIAL_SCALE_ANNOTATION], "3");
        assert_eq!(annotations[QUEUE_PROXY_RESOURCE_PERCENTAGE_ANNOTATION], "20");
        assert_eq!(annotations[CLASS_ANNOTATION], "kpa.autoscaling.knative.dev");
    }

    #[test]
    fn non_positive_queue_proxy_percentage_is_omitted() {
        let mut m = model("rps", "10");
        m.queue_proxy_resource_percentage = -5;
        let annotations = autoscaling_annotations(&m).unwrap();
        assert!(!annotations.contains_key(QUEUE_PROXY_RESOURCE_PERCENTAGE_ANNOTATION));
    }

    #[test]
    fn initial_scale_of_zero_is_emitted() {
        let mut m = model("rps", "10");
        m.initial_scale = Some(0);
        let annotations = autoscaling_annotations(&m).unwrap();
        assert_eq!(annotations[INITIAL_SCALE_ANNOTATION], "0");
    }

    #[test]
    fn custom_metric_omits_class() {
        let annotations = autoscaling_annotations(&model("custom-metric", "abc")).unwrap();
        assert_eq!(annotations[METRIC_ANNOTATION], "custom-metric");
        assert_eq!(annotations[TARGET_ANNOTATION], "abc");
        assert!(!annotations.contains_key(CLASS_ANNOTATION));
    }

    #[test]
    fn translation_failure_propagates() {
        assert!(autoscaling_annotations(&model("concurrency", "0.001")).is_err());
    }
}
