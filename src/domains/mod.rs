//! Physics of a single point particle.
//!
//! - Forces: conservative force laws with matching potentials
//! - Integrators: fixed-step Euler, RK2, RK4 and Velocity Verlet
//! - Diagnostics: energy series and log-scale conservation error

pub mod diagnostics;
pub mod forces;
pub mod integrators;

pub use diagnostics::{analyze, energy_conservation, energy_precision, EnergyReport};
pub use forces::{
    AnharmonicForce, CentralGravity, ForceField, ForceLaw, HarmonicForce, PowerLawForce,
};
pub use integrators::{
    EulerIntegrator, Integrator, IntegratorType, Rk2Integrator, Rk4Integrator,
    VelocityVerletIntegrator,
};
