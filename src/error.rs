//! Error types for newtonian.
//!
//! Every fallible operation returns `Result<T, SimError>` instead of
//! panicking. Configuration mistakes are rejected before any integration
//! work starts; numerical failures carry the step and time at which the
//! run stopped.

use thiserror::Error;

/// Result type alias for newtonian operations.
pub type SimResult<T> = Result<T, SimError>;

/// Unified error type for all newtonian operations.
#[derive(Debug, Error)]
pub enum SimError {
    // ===== Configuration Errors =====
    /// A configuration parameter is out of its valid domain.
    #[error("Invalid configuration: {parameter}: {message}")]
    InvalidConfiguration {
        /// Name of the offending parameter (e.g. `h`, `mass`, `force.k`).
        parameter: String,
        /// What is wrong with it.
        message: String,
    },

    /// YAML parsing error.
    #[error("YAML parsing error: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    /// Schema validation error.
    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),

    // ===== Numerical Errors =====
    /// A force law needing nonzero separation was evaluated at zero separation.
    #[error("Numerical singularity in {law} force law: {location}")]
    NumericalSingularity {
        /// Name of the force law.
        law: String,
        /// Description of where the singularity was hit.
        location: String,
    },

    /// Integration stopped at a given step.
    #[error("Integration failed at step {step} (t = {time}): {source}")]
    IntegrationFailed {
        /// Index of the sample the integrator was advancing from.
        step: usize,
        /// Simulation time of that sample.
        time: f64,
        /// Underlying failure.
        #[source]
        source: Box<SimError>,
    },

    // ===== Jidoka Violations =====
    /// Numerical instability detected (NaN or Inf).
    #[error("Jidoka: non-finite value detected at {location}")]
    NonFiniteValue {
        /// Location where the non-finite value was detected.
        location: String,
    },

    /// Energy conservation violated beyond tolerance.
    #[error("Jidoka: energy drift {drift:.6e} exceeds tolerance {tolerance:.6e}")]
    EnergyDrift {
        /// Relative energy drift from initial state.
        drift: f64,
        /// Configured tolerance threshold.
        tolerance: f64,
    },

    // ===== I/O Errors =====
    /// File I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl SimError {
    /// Create an invalid-configuration error for a named parameter.
    #[must_use]
    pub fn invalid(parameter: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidConfiguration {
            parameter: parameter.into(),
            message: message.into(),
        }
    }

    /// Create a numerical-singularity error.
    #[must_use]
    pub fn singularity(law: impl Into<String>, location: impl Into<String>) -> Self {
        Self::NumericalSingularity {
            law: law.into(),
            location: location.into(),
        }
    }

    /// Attach the step index and time at which this error stopped a run.
    #[must_use]
    pub fn at_step(self, step: usize, time: f64) -> Self {
        Self::IntegrationFailed {
            step,
            time,
            source: Box::new(self),
        }
    }

    /// Check if this error is (or wraps) a numerical singularity.
    #[must_use]
    pub fn is_singularity(&self) -> bool {
        match self {
            Self::NumericalSingularity { .. } => true,
            Self::IntegrationFailed { source, .. } => source.is_singularity(),
            _ => false,
        }
    }

    /// Check if this error is an invalid configuration.
    #[must_use]
    pub const fn is_invalid_configuration(&self) -> bool {
        matches!(
            self,
            Self::InvalidConfiguration { .. } | Self::YamlParse(_) | Self::Validation(_)
        )
    }

    /// Check if this error is (or wraps) a Jidoka violation.
    #[must_use]
    pub fn is_jidoka_violation(&self) -> bool {
        match self {
            Self::NonFiniteValue { .. } | Self::EnergyDrift { .. } => true,
            Self::IntegrationFailed { source, .. } => source.is_jidoka_violation(),
            _ => false,
        }
    }
}
