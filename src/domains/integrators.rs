//! Fixed-step explicit integrators.
//!
//! Implements single-step update rules for the ODE standard form
//! `dy/dt = f(t, y)` with `y = (x, v)`:
//! - Euler (1st order)
//! - RK2 midpoint (2nd order)
//! - RK4 (4th order, classical tableau)
//! - Velocity Verlet (symplectic, 2nd order)
//!
//! # Energy Conservation
//!
//! Velocity Verlet preserves phase-space volume, so its energy error stays
//! bounded over long runs. Euler's energy error grows monotonically for
//! oscillatory systems; the Runge-Kutta methods drift slowly.
//!
//! # Value semantics
//!
//! Every integrator borrows its input state immutably and returns a new
//! one. A caller that keeps the previous state (the driver keeps the whole
//! history) can never see it changed by a step.

use serde::{Deserialize, Serialize};

use crate::engine::state::PhaseState;
use crate::error::SimResult;

/// Right-hand side `f(t, y)` of the ODE in standard form.
///
/// For Newton's equations the returned state holds `(v, F(x)/m)`: its
/// `position` field is dx/dt and its `velocity` field is dv/dt.
pub type Derivative<'a> = dyn Fn(f64, &PhaseState) -> SimResult<PhaseState> + 'a;

/// Numerical integrator trait.
pub trait Integrator {
    /// Advance `state` from time `t` to `t + h`.
    ///
    /// # Errors
    ///
    /// Propagates any failure of the derivative (a force singularity).
    fn step(
        &self,
        state: &PhaseState,
        derivative: &Derivative<'_>,
        t: f64,
        h: f64,
    ) -> SimResult<PhaseState>;

    /// Get the error order of this integrator.
    fn error_order(&self) -> u32;

    /// Check if integrator is symplectic (preserves phase space volume).
    fn is_symplectic(&self) -> bool;

    /// Short name used in logs.
    fn name(&self) -> &'static str;
}

/// Explicit Euler integrator (1st order, non-symplectic).
///
/// ```text
/// y_{n+1} = y_n + h * f(t_n, y_n)
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct EulerIntegrator;

impl EulerIntegrator {
    /// Create a new Euler integrator.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Integrator for EulerIntegrator {
    fn step(
        &self,
        state: &PhaseState,
        derivative: &Derivative<'_>,
        t: f64,
        h: f64,
    ) -> SimResult<PhaseState> {
        let k1 = derivative(t, state)?;
        Ok(state.add_scaled(&k1, h))
    }

    fn error_order(&self) -> u32 {
        1
    }

    fn is_symplectic(&self) -> bool {
        false
    }

    fn name(&self) -> &'static str {
        "euler"
    }
}

/// Runge-Kutta midpoint integrator (2nd order).
///
/// ```text
/// k1 = f(t, y)
/// k2 = f(t + h/2, y + h/2 * k1)
/// y_{n+1} = y_n + h * k2
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct Rk2Integrator;

impl Rk2Integrator {
    /// Create a new RK2 integrator.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Integrator for Rk2Integrator {
    fn step(
        &self,
        state: &PhaseState,
        derivative: &Derivative<'_>,
        t: f64,
        h: f64,
    ) -> SimResult<PhaseState> {
        let half_h = 0.5 * h;
        let k1 = derivative(t, state)?;
        let k2 = derivative(t + half_h, &state.add_scaled(&k1, half_h))?;
        Ok(state.add_scaled(&k2, h))
    }

    fn error_order(&self) -> u32 {
        2
    }

    fn is_symplectic(&self) -> bool {
        false
    }

    fn name(&self) -> &'static str {
        "rk2"
    }
}

/// Runge-Kutta 4th order integrator.
///
/// Fourth-order accurate, non-symplectic. Excellent for smooth problems
/// but energy may drift in long-term simulations.
///
/// ```text
/// k1 = f(t, y)
/// k2 = f(t + h/2, y + h/2 * k1)
/// k3 = f(t + h/2, y + h/2 * k2)
/// k4 = f(t + h, y + h * k3)
/// y_{n+1} = y_n + h/6 * (k1 + 2*k2 + 2*k3 + k4)
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct Rk4Integrator;

impl Rk4Integrator {
    /// Create a new RK4 integrator.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Integrator for Rk4Integrator {
    fn step(
        &self,
        state: &PhaseState,
        derivative: &Derivative<'_>,
        t: f64,
        h: f64,
    ) -> SimResult<PhaseState> {
        let half_h = 0.5 * h;
        let sixth_h = h / 6.0;

        let k1 = derivative(t, state)?;
        let k2 = derivative(t + half_h, &state.add_scaled(&k1, half_h))?;
        let k3 = derivative(t + half_h, &state.add_scaled(&k2, half_h))?;
        let k4 = derivative(t + h, &state.add_scaled(&k3, h))?;

        Ok(state
            .add_scaled(&k1, sixth_h)
            .add_scaled(&k2, 2.0 * sixth_h)
            .add_scaled(&k3, 2.0 * sixth_h)
            .add_scaled(&k4, sixth_h))
    }

    fn error_order(&self) -> u32 {
        4
    }

    fn is_symplectic(&self) -> bool {
        false
    }

    fn name(&self) -> &'static str {
        "rk4"
    }
}

/// Velocity Verlet symplectic integrator.
///
/// Second-order, symplectic method with bounded energy error.
///
/// ```text
/// v_{n+1/2} = v_n + h/2 * a(x_n)
/// x_{n+1}   = x_n + h * v_{n+1/2}
/// v_{n+1}   = v_{n+1/2} + h/2 * a(x_{n+1})
/// ```
///
/// The force at `x_{n+1}` is evaluated again at the start of the next step;
/// nothing is carried between steps.
#[derive(Debug, Clone, Copy, Default)]
pub struct VelocityVerletIntegrator;

impl VelocityVerletIntegrator {
    /// Create a new Velocity Verlet integrator.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Integrator for VelocityVerletIntegrator {
    fn step(
        &self,
        state: &PhaseState,
        derivative: &Derivative<'_>,
        t: f64,
        h: f64,
    ) -> SimResult<PhaseState> {
        let half_h = 0.5 * h;
        let mut next = state.clone();

        // Half-step velocity
        let a0 = derivative(t, &next)?;
        next.velocity = next.velocity.add_scaled(&a0.velocity, half_h);

        // Full-step position with the half-step velocity
        next.position = next.position.add_scaled(&next.velocity, h);

        // Half-step velocity with the force at the updated position
        let a1 = derivative(t + h, &next)?;
        next.velocity = next.velocity.add_scaled(&a1.velocity, half_h);

        Ok(next)
    }

    fn error_order(&self) -> u32 {
        2
    }

    fn is_symplectic(&self) -> bool {
        true
    }

    fn name(&self) -> &'static str {
        "velocity-verlet"
    }
}

/// Integrator type, selectable from configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum IntegratorType {
    /// Explicit Euler (1st order).
    #[default]
    Euler,
    /// Runge-Kutta midpoint (2nd order).
    Rk2,
    /// Runge-Kutta classical (4th order).
    Rk4,
    /// Velocity Verlet (2nd order, symplectic).
    VelocityVerlet,
}

impl IntegratorType {
    /// All integrator types.
    #[must_use]
    pub const fn all() -> [Self; 4] {
        [Self::Euler, Self::Rk2, Self::Rk4, Self::VelocityVerlet]
    }

    fn integrator(self) -> &'static dyn Integrator {
        match self {
            Self::Euler => &EulerIntegrator,
            Self::Rk2 => &Rk2Integrator,
            Self::Rk4 => &Rk4Integrator,
            Self::VelocityVerlet => &VelocityVerletIntegrator,
        }
    }
}

impl Integrator for IntegratorType {
    fn step(
        &self,
        state: &PhaseState,
        derivative: &Derivative<'_>,
        t: f64,
        h: f64,
    ) -> SimResult<PhaseState> {
        self.integrator().step(state, derivative, t, h)
    }

    fn error_order(&self) -> u32 {
        self.integrator().error_order()
    }

    fn is_symplectic(&self) -> bool {
        self.integrator().is_symplectic()
    }

    fn name(&self) -> &'static str {
        self.integrator().name()
    }
}

impl std::fmt::Display for IntegratorType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
