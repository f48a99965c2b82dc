//! # newtonian
//!
//! Fixed-step integration of Newton's equations of motion for a single
//! point particle, with energy-conservation diagnostics.
//!
//! - Force laws: harmonic, anharmonic, power-law and central gravity, each
//!   paired with its potential
//! - Integrators: Euler, RK2 (midpoint), RK4 and Velocity Verlet
//! - Driver: `floor(t_max / h)` samples from `(x0, v0)`, guarded by Jidoka
//!   checks that stop the run on NaN/Inf
//! - Diagnostics: kinetic, potential and total energy plus the log10 relative
//!   drift `log10 |E(t)/E(0) - 1|`
//!
//! ## Example
//!
//! ```rust
//! use newtonian::prelude::*;
//!
//! let config = configure(
//!     0.0,
//!     1.0,
//!     10.0,
//!     0.01,
//!     1.0,
//!     HarmonicForce::new(1.0),
//!     IntegratorType::VelocityVerlet,
//! )?;
//! let trajectory = run(&config)?;
//! assert_eq!(trajectory.len(), config.num_steps());
//!
//! let report = analyze(&trajectory, config.force(), config.mass())?;
//! assert!(report.worst_precision().unwrap_or(0.0) < -3.0);
//! # Ok::<(), newtonian::SimError>(())
//! ```

#![forbid(unsafe_code)]
#![deny(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![warn(clippy::pedantic, clippy::nursery)]
#![allow(
    clippy::module_name_repetitions,
    clippy::similar_names,
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::suboptimal_flops,  // Explicit a + h * b reads like the textbook scheme
    clippy::imprecise_flops,
    clippy::many_single_char_names,
    clippy::missing_const_for_fn,
    clippy::needless_range_loop,
)]

pub mod config;
pub mod domains;
pub mod engine;
pub mod error;

/// Crate version embedded at build time.
pub const VERSION: &str = match option_env!("NEWTONIAN_VERSION") {
    Some(v) => v,
    None => env!("CARGO_PKG_VERSION"),
};

/// Git revision embedded at build time, or `"unknown"`.
pub const GIT_HASH: &str = match option_env!("NEWTONIAN_GIT_HASH") {
    Some(h) => h,
    None => "unknown",
};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::config::{configure, SimulationConfig, SimulationConfigBuilder};
    pub use crate::domains::diagnostics::{
        analyze, energy_conservation, energy_precision, EnergyReport,
    };
    pub use crate::domains::forces::{
        AnharmonicForce, CentralGravity, ForceField, ForceLaw, HarmonicForce, PowerLawForce,
    };
    pub use crate::domains::integrators::{Integrator, IntegratorType};
    pub use crate::engine::jidoka::{JidokaConfig, JidokaGuard};
    pub use crate::engine::state::{PhaseState, Vector};
    pub use crate::engine::trajectory::Trajectory;
    pub use crate::engine::{run, SimEngine};
    pub use crate::error::{SimError, SimResult};
}

/// Re-export for public API
pub use error::{SimError, SimResult};
