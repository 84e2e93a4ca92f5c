//! Service compiler
//!
//! Compiles a [`DeploymentModel`] into a [`KnativeService`] by running the
//! metadata builder, the autoscaling translator and the service spec assembler, then
//! handing the result to a [`Defaulter`].

use tracing::debug;

use crate::autoscaling;
use crate::config::CompilerConfig;
use crate::defaults::{Defaulter, KnativeDefaulter};
use crate::descriptor::KnativeService;
use crate::error::CompileError;
use crate::metadata;
use crate::model::DeploymentModel;
use crate::spec;

/// Compiles deployment models into Knative Services.
///
/// A compiler holds no per-call state and can be shared across threads.
pub struct ServiceCompiler {
    config: CompilerConfig,
    defaulter: Box<dyn Defaulter>,
}

impl Default for ServiceCompiler {
    fn default() -> Self {
        Self::new(CompilerConfig::default())
    }
}

impl std::fmt::Debug for ServiceCompiler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceCompiler")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl ServiceCompiler {
    /// Create a compiler that applies Knative's defaults
    pub fn new(config: CompilerConfig) -> Self {
        Self {
            config,
            defaulter: Box::new(KnativeDefaulter),
        }
    }

    /// Replace the default-filling hook
    pub fn with_defaulter(mut self, defaulter: impl Defaulter + 'static) -> Self {
        self.defaulter = Box::new(defaulter);
        self
    }

    /// Configuration in effect
    pub fn config(&self) -> &CompilerConfig {
        &self.config
    }

    /// Compile a model into a fresh service descriptor.
    ///
    /// The model is only borrowed; compiling the same model twice yields equal
    /// descriptors.
    pub fn compile(&self, model: &DeploymentModel) -> Result<KnativeService, CompileError> {
        if self.config.strict_validation {
            model.validate()?;
        }

        debug!(
            service = %model.name,
            namespace = %model.namespace,
            metric = %model.autoscaling_metric,
            "compiling knative service"
        );

        let metadata = metadata::build(model);
        let annotations = autoscaling::autoscaling_annotations(model)?;
        let spec = spec::build(model, &metadata, annotations);

        let mut service = KnativeService::new(metadata.service, spec);
        self.defaulter.set_defaults(&mut service);

        debug!(
            service = %service.metadata.name,
            revision = %service.spec.template.metadata.name,
            "compiled knative service"
        );
        Ok(service)
    }
}
