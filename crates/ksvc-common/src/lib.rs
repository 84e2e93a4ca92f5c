//! Common types for ksvc: errors, labels, quantities, and Kubernetes primitives

#![deny(missing_docs)]

pub mod error;
pub mod k8s;
pub mod labels;
pub mod quantity;
pub mod telemetry;
pub mod yaml;

pub use error::Error;
pub use labels::LabelSet;
pub use quantity::Quantity;

/// Result type alias using our custom Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Label that restricts a Knative Service to in-cluster traffic
pub const VISIBILITY_LABEL_KEY: &str = "networking.knative.dev/visibility";

/// Value of [`VISIBILITY_LABEL_KEY`] for cluster-local services
pub const VISIBILITY_CLUSTER_LOCAL: &str = "cluster-local";

/// Match-label key used to spread revision pods across a topology
pub const POD_SPREAD_LABEL_KEY: &str = "app";
