//! Phase-space state.
//!
//! Implements the particle state with:
//! - n-dimensional position and velocity vectors
//! - the ODE standard form `y = (x, v)` used by every integrator
//! - finiteness checks for Jidoka inspection
//!
//! A scalar problem is a one-dimensional [`Vector`]; nothing in the
//! integrators distinguishes the two cases.

use serde::{Deserialize, Serialize};

/// n-dimensional real vector for positions, velocities and forces.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Vector(Vec<f64>);

impl Vector {
    /// Create a vector from its components.
    #[must_use]
    pub fn new(components: Vec<f64>) -> Self {
        Self(components)
    }

    /// Zero vector of the given dimension.
    #[must_use]
    pub fn zeros(dim: usize) -> Self {
        Self(vec![0.0; dim])
    }

    /// Number of components.
    #[must_use]
    pub fn dim(&self) -> usize {
        self.0.len()
    }

    /// Components as a slice.
    #[must_use]
    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    /// Magnitude squared.
    #[must_use]
    pub fn norm_squared(&self) -> f64 {
        self.0.iter().map(|c| c * c).sum()
    }

    /// Magnitude (Euclidean length).
    #[must_use]
    pub fn norm(&self) -> f64 {
        self.norm_squared().sqrt()
    }

    /// Dot product. Components beyond the shorter vector are ignored.
    #[must_use]
    pub fn dot(&self, other: &Self) -> f64 {
        self.0.iter().zip(&other.0).map(|(a, b)| a * b).sum()
    }

    /// Scale by scalar.
    #[must_use]
    pub fn scale(&self, s: f64) -> Self {
        self.map(|c| c * s)
    }

    /// Apply `f` to every component.
    #[must_use]
    pub fn map(&self, f: impl Fn(f64) -> f64) -> Self {
        Self(self.0.iter().map(|&c| f(c)).collect())
    }

    /// Combine two vectors component by component.
    #[must_use]
    pub fn zip_map(&self, other: &Self, f: impl Fn(f64, f64) -> f64) -> Self {
        debug_assert_eq!(self.dim(), other.dim(), "dimension mismatch");
        Self(self.0.iter().zip(&other.0).map(|(&a, &b)| f(a, b)).collect())
    }

    /// `self + s * other`, without mutating either operand.
    #[must_use]
    pub fn add_scaled(&self, other: &Self, s: f64) -> Self {
        self.zip_map(other, |a, b| s.mul_add(b, a))
    }

    /// Index of the first non-finite component, if any.
    #[must_use]
    pub fn first_non_finite(&self) -> Option<usize> {
        self.0.iter().position(|c| !c.is_finite())
    }

    /// Check if all components are finite.
    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.first_non_finite().is_none()
    }

    /// Iterate over components.
    pub fn iter(&self) -> std::slice::Iter<'_, f64> {
        self.0.iter()
    }
}

impl From<f64> for Vector {
    fn from(value: f64) -> Self {
        Self(vec![value])
    }
}

impl From<Vec<f64>> for Vector {
    fn from(components: Vec<f64>) -> Self {
        Self(components)
    }
}

impl<const N: usize> From<[f64; N]> for Vector {
    fn from(components: [f64; N]) -> Self {
        Self(components.to_vec())
    }
}

impl std::ops::Index<usize> for Vector {
    type Output = f64;

    fn index(&self, i: usize) -> &Self::Output {
        &self.0[i]
    }
}

impl std::ops::Add for &Vector {
    type Output = Vector;

    fn add(self, rhs: Self) -> Self::Output {
        self.zip_map(rhs, |a, b| a + b)
    }
}

impl std::ops::Sub for &Vector {
    type Output = Vector;

    fn sub(self, rhs: Self) -> Self::Output {
        self.zip_map(rhs, |a, b| a - b)
    }
}

impl std::ops::Mul<f64> for &Vector {
    type Output = Vector;

    fn mul(self, rhs: f64) -> Self::Output {
        self.scale(rhs)
    }
}

impl std::ops::Neg for &Vector {
    type Output = Vector;

    fn neg(self) -> Self::Output {
        self.map(|c| -c)
    }
}

/// Phase-space state of a point particle.
///
/// Also used for the time derivative in ODE standard form, where
/// `position` holds dx/dt (the velocity) and `velocity` holds dv/dt
/// (the acceleration).
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PhaseState {
    /// Position vector.
    pub position: Vector,
    /// Velocity vector.
    pub velocity: Vector,
}

impl PhaseState {
    /// Create a new phase-space state.
    #[must_use]
    pub fn new(position: impl Into<Vector>, velocity: impl Into<Vector>) -> Self {
        Self {
            position: position.into(),
            velocity: velocity.into(),
        }
    }

    /// Spatial dimension (of the position vector).
    #[must_use]
    pub fn dim(&self) -> usize {
        self.position.dim()
    }

    /// Runge-Kutta stage update `y + h * k`.
    ///
    /// Returns a new state; `self` is never touched.
    #[must_use]
    pub fn add_scaled(&self, k: &Self, h: f64) -> Self {
        Self {
            position: self.position.add_scaled(&k.position, h),
            velocity: self.velocity.add_scaled(&k.velocity, h),
        }
    }

    /// Check if all components are finite.
    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.position.is_finite() && self.velocity.is_finite()
    }
}
