//! Knative Service compilation for ksvc
//!
//! This crate compiles deployment models into `serving.knative.dev/v1`
//! Service descriptors:
//!
//! - **Model**: The platform-agnostic input, loadable from YAML or JSON
//! - **Metadata**: Service and revision identity, visibility labels
//! - **Autoscaling**: Metric/target translation into autoscaler annotations
//! - **Spec**: Container, init containers and scheduling for the revision
//! - **Defaults**: Platform default-filling applied to the finished service

#![deny(missing_docs)]

pub mod autoscaling;
pub mod compiler;
pub mod config;
pub mod defaults;
pub mod descriptor;
pub mod error;
pub mod metadata;
pub mod model;
pub mod spec;

pub use autoscaling::{AutoscalingClass, AutoscalingMetric};
pub use compiler::ServiceCompiler;
pub use config::CompilerConfig;
pub use defaults::{Defaulter, KnativeDefaulter};
pub use descriptor::KnativeService;
pub use error::CompileError;
pub use model::{DeploymentModel, Protocol};
