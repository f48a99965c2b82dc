//! Jidoka (自働化) - Autonomous anomaly detection.
//!
//! The guard runs after every integration step and stops the run the
//! moment a sample goes bad, so that no NaN or Inf ever lands in a
//! trajectory.
//!
//! # Anomaly Types
//!
//! 1. **Non-finite values**: NaN or Inf in position or velocity (always fatal)
//! 2. **Energy drift**: total energy deviates from the initial value beyond
//!    tolerance (opt-in, graduated)
//!
//! # Severity Levels
//!
//! - **Acceptable**: Within tolerance, continue normally
//! - **Warning**: Approaching tolerance, log and continue
//! - **Critical**: Tolerance exceeded, stop the line
//! - **Fatal**: Unrecoverable state, halt immediately

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::domains::diagnostics::{relative_drift, MACHINE_PRECISION};
use crate::engine::state::PhaseState;
use crate::error::{SimError, SimResult};

/// Severity levels for Jidoka violations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ViolationSeverity {
    /// Acceptable variance within tolerance (continue).
    Acceptable,
    /// Warning: approaching tolerance boundary (log, continue).
    Warning,
    /// Critical: tolerance exceeded (stop the line).
    Critical,
    /// Fatal: unrecoverable state (halt immediately).
    Fatal,
}

/// Warning from Jidoka check (non-critical issue).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum JidokaWarning {
    /// Energy drift approaching tolerance.
    EnergyDriftApproaching {
        /// Sample index.
        step: usize,
        /// Current drift value.
        drift: f64,
        /// Tolerance threshold.
        tolerance: f64,
    },
}

impl std::fmt::Display for JidokaWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EnergyDriftApproaching {
                step,
                drift,
                tolerance,
            } => write!(
                f,
                "energy drift {drift:.3e} at step {step} approaching tolerance {tolerance:.3e}"
            ),
        }
    }
}

/// Classifier for graduated Jidoka responses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct SeverityClassifier {
    /// Warning threshold as fraction of tolerance (e.g., 0.8 = warn at 80%).
    #[validate(range(min = 0.0, max = 1.0))]
    pub warning_fraction: f64,
}

impl Default for SeverityClassifier {
    fn default() -> Self {
        Self {
            warning_fraction: 0.8,
        }
    }
}

impl SeverityClassifier {
    /// Create a new severity classifier.
    #[must_use]
    pub const fn new(warning_fraction: f64) -> Self {
        Self { warning_fraction }
    }

    /// Classify energy drift severity.
    #[must_use]
    pub fn classify_energy_drift(&self, drift: f64, tolerance: f64) -> ViolationSeverity {
        if drift.is_nan() || drift.is_infinite() {
            ViolationSeverity::Fatal
        } else if drift > tolerance {
            ViolationSeverity::Critical
        } else if drift > tolerance * self.warning_fraction {
            ViolationSeverity::Warning
        } else {
            ViolationSeverity::Acceptable
        }
    }
}

/// Jidoka guard configuration.
///
/// NaN/Inf detection is not configurable: every sample is checked.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default, deny_unknown_fields)]
pub struct JidokaConfig {
    /// Enable energy conservation check.
    pub check_energy: bool,
    /// Maximum allowed relative energy drift.
    #[validate(range(min = 0.0))]
    pub energy_tolerance: f64,
    /// Severity classifier for graduated responses.
    #[validate(nested)]
    pub severity_classifier: SeverityClassifier,
}

impl Default for JidokaConfig {
    fn default() -> Self {
        Self {
            check_energy: false,
            energy_tolerance: 1e-6,
            severity_classifier: SeverityClassifier::default(),
        }
    }
}

/// Jidoka guard for autonomous anomaly detection.
///
/// # Example
///
/// ```rust
/// use newtonian::engine::jidoka::{JidokaConfig, JidokaGuard};
/// use newtonian::engine::state::PhaseState;
///
/// let mut guard = JidokaGuard::new(JidokaConfig::default());
/// let state = PhaseState::new(1.0, 0.0);
///
/// assert!(guard.check(0, &state, None).is_ok());
/// assert!(guard.check(1, &PhaseState::new(f64::NAN, 0.0), None).is_err());
/// ```
#[derive(Debug, Clone)]
pub struct JidokaGuard {
    /// Configuration.
    config: JidokaConfig,
    /// Initial energy (set on first energy check).
    initial_energy: Option<f64>,
}

impl JidokaGuard {
    /// Create a new Jidoka guard with given configuration.
    #[must_use]
    pub const fn new(config: JidokaConfig) -> Self {
        Self {
            config,
            initial_energy: None,
        }
    }

    /// Whether the caller needs to supply energies to [`Self::check`].
    #[must_use]
    pub const fn wants_energy(&self) -> bool {
        self.config.check_energy
    }

    /// Inspect sample `step`.
    ///
    /// `energy` is the total energy of the sample; it is ignored unless
    /// energy checking is enabled. The first energy seen becomes the
    /// reference.
    ///
    /// # Errors
    ///
    /// - `NonFiniteValue`: NaN or Inf found
    /// - `EnergyDrift`: drift is critical or fatal
    pub fn check(
        &mut self,
        step: usize,
        state: &PhaseState,
        energy: Option<f64>,
    ) -> SimResult<Vec<JidokaWarning>> {
        Self::check_finite(step, state)?;

        let mut warnings = Vec::new();
        if self.config.check_energy {
            if let Some(energy) = energy {
                warnings.extend(self.check_energy(step, energy)?);
            }
        }
        Ok(warnings)
    }

    fn check_finite(step: usize, state: &PhaseState) -> SimResult<()> {
        if let Some(j) = state.position.first_non_finite() {
            return Err(SimError::NonFiniteValue {
                location: format!("states[{step}].position[{j}]"),
            });
        }
        if let Some(j) = state.velocity.first_non_finite() {
            return Err(SimError::NonFiniteValue {
                location: format!("states[{step}].velocity[{j}]"),
            });
        }
        Ok(())
    }

    fn check_energy(&mut self, step: usize, energy: f64) -> SimResult<Option<JidokaWarning>> {
        let Some(initial) = self.initial_energy else {
            self.initial_energy = Some(energy);
            return Ok(None);
        };

        let drift = relative_drift(&[initial, energy], MACHINE_PRECISION)
            .last()
            .copied()
            .unwrap_or(f64::NAN);
        let tolerance = self.config.energy_tolerance;

        match self
            .config
            .severity_classifier
            .classify_energy_drift(drift, tolerance)
        {
            ViolationSeverity::Acceptable => Ok(None),
            ViolationSeverity::Warning => Ok(Some(JidokaWarning::EnergyDriftApproaching {
                step,
                drift,
                tolerance,
            })),
            ViolationSeverity::Critical | ViolationSeverity::Fatal => {
                Err(SimError::EnergyDrift { drift, tolerance })
            }
        }
    }

    /// Reset the guard (clear initial energy).
    pub fn reset(&mut self) {
        self.initial_energy = None;
    }
}
