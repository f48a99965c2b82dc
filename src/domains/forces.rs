//! Force and potential-energy models.
//!
//! Every law is a pure function of position and a parameter object that is
//! validated once, when the simulation is configured. Laws accept a single
//! n-dimensional position or a batch of them, and share the
//! length/direction decomposition of [`unit_vector`].
//!
//! | Law | Force | Potential |
//! |---|---|---|
//! | harmonic | `-k x` | `k |x|^2 / 2` |
//! | anharmonic | `-k x (1 - a x)` | `k x^2 (1 - 2a x / 3) / 2` |
//! | power law | `-k |x|^(p-1) x_hat` | `k |x|^p / p` |
//! | central gravity | `-G m M / |r|^2 r_hat` | `-G m M / |r|` |
//!
//! Laws that need a nonzero separation fail with
//! [`SimError::NumericalSingularity`] at the origin instead of returning
//! inf or NaN.

use serde::{Deserialize, Serialize};

use crate::engine::state::Vector;
use crate::error::{SimError, SimResult};

/// Gravitational constant in AU^3 / (solar mass * year^2).
pub const G_ASTRONOMICAL: f64 = 4.0 * std::f64::consts::PI * std::f64::consts::PI;

/// Solar mass in solar masses.
pub const M_SUN: f64 = 1.0;

/// Earth mass in solar masses.
pub const M_EARTH: f64 = 3.003_467e-6;

/// Return `(|r|, r / |r|)`.
///
/// # Errors
///
/// Returns `NumericalSingularity` if `r` has zero or non-finite length.
pub fn unit_vector(r: &Vector) -> SimResult<(f64, Vector)> {
    let rr = r.norm();
    if rr == 0.0 || !rr.is_finite() {
        return Err(SimError::singularity(
            "unit-vector",
            format!("cannot normalize vector of length {rr}"),
        ));
    }
    Ok((rr, r.scale(1.0 / rr)))
}

/// Batch form of [`unit_vector`] over N positions.
///
/// # Errors
///
/// Returns `NumericalSingularity` naming the first offending row.
pub fn unit_vectors(rs: &[Vector]) -> SimResult<(Vec<f64>, Vec<Vector>)> {
    let mut lengths = Vec::with_capacity(rs.len());
    let mut directions = Vec::with_capacity(rs.len());
    for (i, r) in rs.iter().enumerate() {
        let (rr, rhat) = unit_vector(r).map_err(|_| {
            SimError::singularity("unit-vector", format!("cannot normalize vector at row {i}"))
        })?;
        lengths.push(rr);
        directions.push(rhat);
    }
    Ok((lengths, directions))
}

/// Force field trait for computing forces and potential energies.
pub trait ForceField {
    /// Short name used in logs and error messages.
    fn name(&self) -> &'static str;

    /// Force at a single position.
    ///
    /// # Errors
    ///
    /// Returns `NumericalSingularity` where the law is undefined.
    fn force(&self, position: &Vector) -> SimResult<Vector>;

    /// Potential energy at a single position.
    ///
    /// # Errors
    ///
    /// Returns `NumericalSingularity` where the law is undefined.
    fn potential(&self, position: &Vector) -> SimResult<f64>;

    /// Forces for a batch of positions (N x n).
    ///
    /// # Errors
    ///
    /// Propagates the first failing evaluation.
    fn forces(&self, positions: &[Vector]) -> SimResult<Vec<Vector>> {
        positions.iter().map(|x| self.force(x)).collect()
    }

    /// Potential energies for a batch of positions.
    ///
    /// # Errors
    ///
    /// Propagates the first failing evaluation.
    fn potentials(&self, positions: &[Vector]) -> SimResult<Vec<f64>> {
        positions.iter().map(|x| self.potential(x)).collect()
    }
}

fn finite_force(law: &str, rr: f64, force: Vector) -> SimResult<Vector> {
    if force.is_finite() {
        Ok(force)
    } else {
        Err(SimError::singularity(
            law,
            format!("force is not finite at |r| = {rr:e}"),
        ))
    }
}

fn finite_potential(law: &str, rr: f64, u: f64) -> SimResult<f64> {
    if u.is_finite() {
        Ok(u)
    } else {
        Err(SimError::singularity(
            law,
            format!("potential is not finite at |r| = {rr:e}"),
        ))
    }
}

/// Attribute a `unit_vectors` failure to the law that needed it.
fn relabel(law: &str, err: SimError) -> SimError {
    match err {
        SimError::NumericalSingularity { location, .. } => SimError::singularity(law, location),
        other => other,
    }
}

fn require_positive(parameter: &str, value: f64) -> SimResult<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(SimError::invalid(
            parameter,
            format!("must be positive and finite, got {value}"),
        ))
    }
}

/// Harmonic spring toward the origin.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HarmonicForce {
    /// Spring constant.
    pub k: f64,
}

impl Default for HarmonicForce {
    fn default() -> Self {
        Self { k: 1.0 }
    }
}

impl HarmonicForce {
    /// Create a harmonic force with spring constant `k`.
    #[must_use]
    pub const fn new(k: f64) -> Self {
        Self { k }
    }
}

impl ForceField for HarmonicForce {
    fn name(&self) -> &'static str {
        "harmonic"
    }

    fn force(&self, position: &Vector) -> SimResult<Vector> {
        finite_force(self.name(), position.norm(), position.scale(-self.k))
    }

    fn potential(&self, position: &Vector) -> SimResult<f64> {
        let u = 0.5 * self.k * position.norm_squared();
        finite_potential(self.name(), position.norm(), u)
    }
}

/// Spring with a cubic correction, applied per component.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnharmonicForce {
    /// Spring constant.
    pub k: f64,
    /// Anharmonicity.
    pub alpha: f64,
}

impl Default for AnharmonicForce {
    fn default() -> Self {
        Self { k: 1.0, alpha: 0.5 }
    }
}

impl AnharmonicForce {
    /// Create an anharmonic force.
    #[must_use]
    pub const fn new(k: f64, alpha: f64) -> Self {
        Self { k, alpha }
    }
}

impl ForceField for AnharmonicForce {
    fn name(&self) -> &'static str {
        "anharmonic"
    }

    fn force(&self, position: &Vector) -> SimResult<Vector> {
        let (k, alpha) = (self.k, self.alpha);
        let f = position.map(|x| -k * x * (1.0 - alpha * x));
        finite_force(self.name(), position.norm(), f)
    }

    fn potential(&self, position: &Vector) -> SimResult<f64> {
        let u: f64 = position
            .iter()
            .map(|&x| 0.5 * self.k * x * x * (1.0 - 2.0 / 3.0 * self.alpha * x))
            .sum();
        finite_potential(self.name(), position.norm(), u)
    }
}

/// Central power-law force derived from `U = k |x|^p / p`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PowerLawForce {
    /// Strength.
    pub k: f64,
    /// Exponent of the potential (nonzero).
    pub p: f64,
}

impl Default for PowerLawForce {
    fn default() -> Self {
        Self { k: 1.0, p: 6.0 }
    }
}

impl PowerLawForce {
    /// Create a power-law force.
    #[must_use]
    pub const fn new(k: f64, p: f64) -> Self {
        Self { k, p }
    }
}

impl ForceField for PowerLawForce {
    fn name(&self) -> &'static str {
        "power-law"
    }

    fn force(&self, position: &Vector) -> SimResult<Vector> {
        if position.norm() == 0.0 {
            // Limit is the zero vector only when |x|^(p-1) vanishes.
            return if self.p > 1.0 {
                Ok(Vector::zeros(position.dim()))
            } else {
                Err(SimError::singularity(
                    self.name(),
                    format!("force with p = {} evaluated at |r| = 0", self.p),
                ))
            };
        }
        let (rr, rhat) = unit_vector(position)?;
        let f = rhat.scale(-self.k * rr.powf(self.p - 1.0));
        finite_force(self.name(), rr, f)
    }

    fn potential(&self, position: &Vector) -> SimResult<f64> {
        let rr = position.norm();
        if rr == 0.0 && self.p < 0.0 {
            return Err(SimError::singularity(
                self.name(),
                format!("potential with p = {} evaluated at |r| = 0", self.p),
            ));
        }
        finite_potential(self.name(), rr, self.k / self.p * rr.powf(self.p))
    }
}

/// Newtonian gravity toward a fixed mass at the origin.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CentralGravity {
    /// Gravitational constant.
    pub g: f64,
    /// Mass of the orbiting particle.
    pub m: f64,
    /// Mass of the central body.
    pub central_mass: f64,
}

impl Default for CentralGravity {
    fn default() -> Self {
        Self {
            g: 1.0,
            m: 1.0,
            central_mass: 1.0,
        }
    }
}

impl CentralGravity {
    /// Create a central gravity force.
    #[must_use]
    pub const fn new(g: f64, m: f64, central_mass: f64) -> Self {
        Self { g, m, central_mass }
    }

    /// Earth around the Sun, in AU, solar masses and years.
    #[must_use]
    pub const fn solar_earth() -> Self {
        Self::new(G_ASTRONOMICAL, M_EARTH, M_SUN)
    }

    fn strength(&self) -> f64 {
        self.g * self.m * self.central_mass
    }

    fn force_at(&self, rr: f64, rhat: &Vector) -> SimResult<Vector> {
        finite_force(self.name(), rr, rhat.scale(-self.strength() / (rr * rr)))
    }

    fn potential_at(&self, rr: f64) -> SimResult<f64> {
        finite_potential(self.name(), rr, -self.strength() / rr)
    }
}

impl ForceField for CentralGravity {
    fn name(&self) -> &'static str {
        "gravity"
    }

    fn force(&self, position: &Vector) -> SimResult<Vector> {
        let (rr, rhat) = unit_vector(position)
            .map_err(|_| SimError::singularity(self.name(), "force evaluated at |r| = 0"))?;
        self.force_at(rr, &rhat)
    }

    fn potential(&self, position: &Vector) -> SimResult<f64> {
        let rr = position.norm();
        if rr == 0.0 {
            return Err(SimError::singularity(
                self.name(),
                "potential evaluated at |r| = 0",
            ));
        }
        self.potential_at(rr)
    }

    fn forces(&self, positions: &[Vector]) -> SimResult<Vec<Vector>> {
        let (lengths, directions) =
            unit_vectors(positions).map_err(|e| relabel(self.name(), e))?;
        lengths
            .iter()
            .zip(&directions)
            .map(|(&rr, rhat)| self.force_at(rr, rhat))
            .collect()
    }

    fn potentials(&self, positions: &[Vector]) -> SimResult<Vec<f64>> {
        let (lengths, _) = unit_vectors(positions).map_err(|e| relabel(self.name(), e))?;
        lengths.iter().map(|&rr| self.potential_at(rr)).collect()
    }
}

/// Closed set of force laws, selectable from configuration.
///
/// ```yaml
/// force:
///   law: power-law
///   k: 1.0
///   p: 6.0
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "law", rename_all = "kebab-case")]
pub enum ForceLaw {
    /// Harmonic spring.
    Harmonic(HarmonicForce),
    /// Anharmonic spring.
    Anharmonic(AnharmonicForce),
    /// Central power law.
    PowerLaw(PowerLawForce),
    /// Central Newtonian gravity.
    Gravity(CentralGravity),
}

impl Default for ForceLaw {
    fn default() -> Self {
        Self::Harmonic(HarmonicForce::default())
    }
}

impl ForceLaw {
    /// Check the bound parameters.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfiguration` naming the offending parameter.
    pub fn validate(&self) -> SimResult<()> {
        match self {
            Self::Harmonic(f) => require_positive("force.k", f.k),
            Self::Anharmonic(f) => {
                require_positive("force.k", f.k)?;
                if f.alpha.is_finite() {
                    Ok(())
                } else {
                    Err(SimError::invalid(
                        "force.alpha",
                        format!("must be finite, got {}", f.alpha),
                    ))
                }
            }
            Self::PowerLaw(f) => {
                require_positive("force.k", f.k)?;
                if f.p.is_finite() && f.p != 0.0 {
                    Ok(())
                } else {
                    Err(SimError::invalid(
                        "force.p",
                        format!("exponent must be finite and nonzero, got {}", f.p),
                    ))
                }
            }
            Self::Gravity(f) => {
                require_positive("force.g", f.g)?;
                require_positive("force.m", f.m)?;
                require_positive("force.central_mass", f.central_mass)
            }
        }
    }

    fn field(&self) -> &dyn ForceField {
        match self {
            Self::Harmonic(f) => f,
            Self::Anharmonic(f) => f,
            Self::PowerLaw(f) => f,
            Self::Gravity(f) => f,
        }
    }
}

impl ForceField for ForceLaw {
    fn name(&self) -> &'static str {
        self.field().name()
    }

    fn force(&self, position: &Vector) -> SimResult<Vector> {
        self.field().force(position)
    }

    fn potential(&self, position: &Vector) -> SimResult<f64> {
        self.field().potential(position)
    }

    fn forces(&self, positions: &[Vector]) -> SimResult<Vec<Vector>> {
        self.field().forces(positions)
    }

    fn potentials(&self, positions: &[Vector]) -> SimResult<Vec<f64>> {
        self.field().potentials(positions)
    }
}

impl From<HarmonicForce> for ForceLaw {
    fn from(f: HarmonicForce) -> Self {
        Self::Harmonic(f)
    }
}

impl From<AnharmonicForce> for ForceLaw {
    fn from(f: AnharmonicForce) -> Self {
        Self::Anharmonic(f)
    }
}

impl From<PowerLawForce> for ForceLaw {
    fn from(f: PowerLawForce) -> Self {
        Self::PowerLaw(f)
    }
}

impl From<CentralGravity> for ForceLaw {
    fn from(f: CentralGravity) -> Self {
        Self::Gravity(f)
    }
}
