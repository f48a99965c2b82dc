//! Energy-conservation diagnostics.
//!
//! Post-processes a [`Trajectory`] into kinetic, potential and total energy
//! series and a log-scale relative drift, `log10 |E(t)/E(0) - 1|`, which
//! reads as the (negative) number of correct digits in the energy at each
//! sample. Lower is better; `-15` is machine precision.
//!
//! Degenerate references are handled internally: a zero initial energy is
//! replaced by [`MACHINE_PRECISION`] and zero drift is floored to it before
//! taking the logarithm. Neither case is an error.

use serde::{Deserialize, Serialize};

use crate::domains::forces::ForceField;
use crate::engine::state::Vector;
use crate::engine::trajectory::Trajectory;
use crate::error::SimResult;

/// Floor used for degenerate energies and drifts.
pub const MACHINE_PRECISION: f64 = 1e-15;

/// `|a - b| <= atol + rtol * |b|`.
#[must_use]
pub fn is_close(a: f64, b: f64, atol: f64, rtol: f64) -> bool {
    (a - b).abs() <= atol + rtol * b.abs()
}

fn is_zero(value: f64, eps: f64) -> bool {
    is_close(value, 0.0, eps, eps)
}

/// Kinetic energy `m |v|^2 / 2`.
#[must_use]
pub fn kinetic_energy(velocity: &Vector, mass: f64) -> f64 {
    0.5 * mass * velocity.norm_squared()
}

/// Kinetic energy of every velocity sample.
#[must_use]
pub fn kinetic_energies(velocities: &[Vector], mass: f64) -> Vec<f64> {
    velocities.iter().map(|v| kinetic_energy(v, mass)).collect()
}

/// Potential energy of every position sample.
///
/// # Errors
///
/// Returns `NumericalSingularity` if a sample sits on a singularity of the
/// force law.
pub fn potential_energies(positions: &[Vector], field: &dyn ForceField) -> SimResult<Vec<f64>> {
    field.potentials(positions)
}

/// Elementwise `kinetic + potential`.
#[must_use]
pub fn total_energies(kinetic: &[f64], potential: &[f64]) -> Vec<f64> {
    kinetic.iter().zip(potential).map(|(k, u)| k + u).collect()
}

/// `|E/E0 - 1|` for every sample, substituting `eps` for a zero `E0`.
///
/// The caller's series is left untouched.
#[must_use]
pub fn relative_drift(energy: &[f64], eps: f64) -> Vec<f64> {
    let Some(&first) = energy.first() else {
        return Vec::new();
    };

    if is_zero(first, eps) {
        // Expect poor estimates when the reference vanishes.
        std::iter::once(0.0)
            .chain(energy[1..].iter().map(|e| (e / eps - 1.0).abs()))
            .collect()
    } else {
        energy.iter().map(|e| (e / first - 1.0).abs()).collect()
    }
}

/// `log10` of the relative energy drift, with `eps = 1e-15`.
#[must_use]
pub fn energy_precision(energy: &[f64]) -> Vec<f64> {
    energy_precision_with(energy, MACHINE_PRECISION)
}

/// `log10` of the relative energy drift with a custom precision floor.
#[must_use]
pub fn energy_precision_with(energy: &[f64], eps: f64) -> Vec<f64> {
    relative_drift(energy, eps)
        .into_iter()
        .map(|delta| if is_zero(delta, eps) { eps } else { delta })
        .map(f64::log10)
        .collect()
}

/// Mean relative energy drift `mean(|E/E0 - 1|)` of a run.
///
/// A single-number quality score: smaller means better conservation.
///
/// # Errors
///
/// Returns `NumericalSingularity` if the potential cannot be evaluated at
/// some sample.
pub fn energy_conservation(
    trajectory: &Trajectory,
    field: &dyn ForceField,
    mass: f64,
) -> SimResult<f64> {
    let report = analyze(trajectory, field, mass)?;
    Ok(report.mean_drift())
}

/// Energy series of one run.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct EnergyReport {
    /// Sample times.
    pub times: Vec<f64>,
    /// Kinetic energy per sample.
    pub kinetic: Vec<f64>,
    /// Potential energy per sample.
    pub potential: Vec<f64>,
    /// Total energy per sample.
    pub total: Vec<f64>,
    /// `log10` relative drift of the total energy per sample.
    pub precision: Vec<f64>,
}

impl EnergyReport {
    /// Number of samples.
    #[must_use]
    pub fn len(&self) -> usize {
        self.total.len()
    }

    /// True if the report has no samples.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.total.is_empty()
    }

    /// `mean(|E/E0 - 1|)` over the run; `0.0` for an empty report.
    #[must_use]
    pub fn mean_drift(&self) -> f64 {
        if self.total.is_empty() {
            return 0.0;
        }
        let drift = relative_drift(&self.total, MACHINE_PRECISION);
        drift.iter().sum::<f64>() / drift.len() as f64
    }

    /// Largest `log10` drift, i.e. the fewest correct digits seen.
    #[must_use]
    pub fn worst_precision(&self) -> Option<f64> {
        self.precision.iter().copied().reduce(f64::max)
    }

    /// Every `step`-th sample, for plotting long runs.
    #[must_use]
    pub fn subsample(&self, step: usize) -> Self {
        let step = step.max(1);
        let pick = |series: &[f64]| series.iter().copied().step_by(step).collect::<Vec<_>>();
        Self {
            times: pick(&self.times),
            kinetic: pick(&self.kinetic),
            potential: pick(&self.potential),
            total: pick(&self.total),
            precision: pick(&self.precision),
        }
    }
}

/// Kinetic, potential, total energy and log drift for a trajectory.
///
/// # Errors
///
/// Returns `NumericalSingularity` if the potential cannot be evaluated at
/// some sample.
pub fn analyze(
    trajectory: &Trajectory,
    field: &dyn ForceField,
    mass: f64,
) -> SimResult<EnergyReport> {
    let kinetic = kinetic_energies(&trajectory.velocities(), mass);
    let potential = potential_energies(&trajectory.positions(), field)?;
    let total = total_energies(&kinetic, &potential);
    let precision = energy_precision(&total);

    Ok(EnergyReport {
        times: trajectory.times().to_vec(),
        kinetic,
        potential,
        total,
        precision,
    })
}
