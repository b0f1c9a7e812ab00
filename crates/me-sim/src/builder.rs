//! Fluent builder for constructing a [`Sim`].

use std::sync::Arc;

use me_core::SimConfig;
use me_fmu::{Fmu, SharedLogger, TracingLogger};
use tracing::warn;

use crate::{Sim, SimResult};

/// Fluent builder for [`Sim<F>`].
///
/// # Required inputs
///
/// - [`SimConfig`]: interval, step size, tolerance, logging flags
/// - `F: Fmu`: the component package to instantiate
///
/// # Optional inputs (have defaults)
///
/// | Method                    | Default                                  |
/// |---------------------------|------------------------------------------|
/// | `.instance_name(s)`       | The metadata's model identifier          |
/// | `.resource_location(s)`   | Empty string                             |
/// | `.logger(l)`              | [`TracingLogger`] over the model metadata |
///
/// # Example
///
/// ```rust,ignore
/// let mut sim = SimBuilder::new(config, fmu)
///     .instance_name("ball1")
///     .build()?;
/// sim.run(&mut sink)?;
/// ```
pub struct SimBuilder<F: Fmu> {
    config:            SimConfig,
    fmu:               F,
    instance_name:     Option<String>,
    resource_location: Option<String>,
    logger:            Option<SharedLogger>,
}

impl<F: Fmu> SimBuilder<F> {
    /// Create a builder with all required inputs.
    pub fn new(config: SimConfig, fmu: F) -> Self {
        Self {
            config,
            fmu,
            instance_name:     None,
            resource_location: None,
            logger:            None,
        }
    }

    /// Override the instance name passed to `instantiate`.
    pub fn instance_name(mut self, name: impl Into<String>) -> Self {
        self.instance_name = Some(name.into());
        self
    }

    /// Location of the component's unpacked resources, as a URI.
    pub fn resource_location(mut self, location: impl Into<String>) -> Self {
        self.resource_location = Some(location.into());
        self
    }

    /// Replace the default tracing-backed component logger.
    pub fn logger(mut self, logger: SharedLogger) -> Self {
        self.logger = Some(logger);
        self
    }

    /// Validate configuration and metadata and return a ready-to-run [`Sim`].
    pub fn build(self) -> SimResult<Sim<F>> {
        self.config.validate()?;
        let metadata = self.fmu.metadata();
        metadata.validate()?;

        // Unknown categories are passed through; the component decides.
        if !metadata.log_categories.is_empty() {
            for category in &self.config.log_categories {
                if !metadata.log_categories.contains(category) {
                    warn!(%category, model = %metadata.model_identifier, "log category not declared by model");
                }
            }
        }

        let instance_name = self
            .instance_name
            .unwrap_or_else(|| metadata.model_identifier.clone());
        let logger: SharedLogger = match self.logger {
            Some(l) => l,
            None => Arc::new(TracingLogger::new(metadata)),
        };

        Ok(Sim::new(
            self.config,
            self.fmu,
            instance_name,
            self.resource_location.unwrap_or_default(),
            logger,
        ))
    }
}
