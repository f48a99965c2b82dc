//! Core simulation engine.
//!
//! Implements the time loop that integrates Newton's equations:
//! - builds the ODE right-hand side `f(t, (x, v)) = (v, F(x)/m)` from the
//!   configured force law
//! - preallocates the trajectory (`floor(t_max / h)` samples)
//! - applies the configured integrator one step at a time
//! - runs Jidoka guards after every step (stop-on-error)
//!
//! Sample `i + 1` is computed from sample `i` alone. The integrator only
//! ever borrows the recorded sample, so history cannot be rewritten by a
//! step.

pub mod jidoka;
pub mod state;
pub mod trajectory;

pub use jidoka::{JidokaConfig, JidokaGuard, JidokaWarning};
pub use state::{PhaseState, Vector};
pub use trajectory::Trajectory;

use crate::config::SimulationConfig;
use crate::domains::diagnostics::kinetic_energy;
use crate::domains::forces::ForceField;
use crate::domains::integrators::Integrator;
use crate::error::{SimError, SimResult};

/// Main simulation engine.
///
/// Owns a validated configuration and produces a fresh [`Trajectory`] on
/// every [`run`](Self::run). Engines share no state, so independent runs
/// (different step sizes, integrators or initial conditions) can be moved
/// to separate threads.
#[derive(Debug, Clone)]
pub struct SimEngine {
    config: SimulationConfig,
}

impl SimEngine {
    /// Create a new simulation engine from configuration.
    ///
    /// # Errors
    ///
    /// Returns error if configuration validation fails.
    pub fn new(config: SimulationConfig) -> SimResult<Self> {
        config.check()?;
        Ok(Self { config })
    }

    /// Get the configuration.
    #[must_use]
    pub const fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// ODE right-hand side in standard form: `(v, F(x)/m)`.
    ///
    /// The system is autonomous; `t` is accepted so the signature matches
    /// [`Derivative`](crate::domains::integrators::Derivative).
    ///
    /// # Errors
    ///
    /// Returns `NumericalSingularity` where the force law is undefined or
    /// `F/m` overflows.
    pub fn derivative(&self, _t: f64, y: &PhaseState) -> SimResult<PhaseState> {
        let force = self.config.force().force(&y.position)?;
        let acceleration = force.scale(1.0 / self.config.mass());
        if !acceleration.is_finite() {
            return Err(SimError::singularity(
                self.config.force().name(),
                format!("acceleration F/m is not finite (m = {:e})", self.config.mass()),
            ));
        }
        Ok(PhaseState {
            position: y.velocity.clone(),
            velocity: acceleration,
        })
    }

    fn total_energy(&self, state: &PhaseState) -> SimResult<f64> {
        let potential = self.config.force().potential(&state.position)?;
        Ok(kinetic_energy(&state.velocity, self.config.mass()) + potential)
    }

    /// Integrate from `(x0, v0)` over `[0, t_max)`.
    ///
    /// The loop itself validates nothing; the configuration was checked in
    /// [`SimEngine::new`]. Force laws and `F/m` report overflow as a
    /// `NumericalSingularity`. The Jidoka guard inspects every new sample:
    /// it rejects a non-finite one (`NonFiniteValue`, e.g. `x + h v`
    /// overflowing) and, only when `check_energy` is enabled (off by
    /// default), stops on energy drift past tolerance (`EnergyDrift`).
    ///
    /// # Errors
    ///
    /// Returns `IntegrationFailed` wrapping a `NumericalSingularity` or a
    /// Jidoka violation, with the index and time of the last good sample.
    pub fn run(&self) -> SimResult<Trajectory> {
        let n = self.config.num_steps();
        let h = self.config.h();
        let integrator = self.config.integrator();
        let mut guard = JidokaGuard::new(self.config.jidoka().clone());

        log::info!(
            "newtonian {} ({}): integrating {} samples with {} (h = {h}) under {} force",
            crate::VERSION,
            crate::GIT_HASH,
            n,
            integrator,
            self.config.force().name()
        );
        log::debug!(
            "x0 = {:?}, v0 = {:?}, mass = {}",
            self.config.x0().as_slice(),
            self.config.v0().as_slice(),
            self.config.mass()
        );

        let mut trajectory = Trajectory::with_capacity(n);

        let initial = self.config.initial_state();
        let energy = self
            .energy_for(&guard, &initial)
            .map_err(|e| e.at_step(0, 0.0))?;
        guard
            .check(0, &initial, energy)
            .map_err(|e| e.at_step(0, 0.0))?;
        trajectory.push(0.0, initial);

        let derivative = |t: f64, y: &PhaseState| self.derivative(t, y);
        let mut warnings = 0_usize;

        for i in 0..n.saturating_sub(1) {
            let t = i as f64 * h;
            let next = integrator
                .step(&trajectory.states()[i], &derivative, t, h)
                .map_err(|e| e.at_step(i, t))?;

            let t_next = (i + 1) as f64 * h;
            let energy = self
                .energy_for(&guard, &next)
                .map_err(|e| e.at_step(i + 1, t_next))?;
            for warning in guard
                .check(i + 1, &next, energy)
                .map_err(|e| e.at_step(i + 1, t_next))?
            {
                log::warn!("jidoka: {warning}");
                warnings += 1;
            }

            trajectory.push(t_next, next);
        }

        log::info!(
            "integration finished: {} samples, {} jidoka warnings",
            trajectory.len(),
            warnings
        );

        Ok(trajectory)
    }

    fn energy_for(&self, guard: &JidokaGuard, state: &PhaseState) -> SimResult<Option<f64>> {
        if guard.wants_energy() {
            self.total_energy(state).map(Some)
        } else {
            Ok(None)
        }
    }
}

/// Integrate a configured simulation.
///
/// # Errors
///
/// See [`SimEngine::run`].
pub fn run(config: &SimulationConfig) -> SimResult<Trajectory> {
    SimEngine::new(config.clone())?.run()
}
