//! Long-run energy behaviour of symplectic and non-symplectic integrators.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use newtonian::domains::diagnostics::{relative_drift, MACHINE_PRECISION};
use newtonian::domains::forces::{CentralGravity, G_ASTRONOMICAL};
use newtonian::prelude::*;

fn oscillator_report(integrator: IntegratorType, h: f64, t_max: f64) -> EnergyReport {
    let config = configure(0.0, 1.0, t_max, h, 1.0, HarmonicForce::new(1.0), integrator).unwrap();
    let trajectory = run(&config).unwrap();
    analyze(&trajectory, config.force(), config.mass()).unwrap()
}

fn max(values: &[f64]) -> f64 {
    values.iter().copied().fold(0.0, f64::max)
}

// H0: Velocity Verlet drifts secularly like Euler
// Falsification: h = 0.001, t_max = 1000; Verlet drift bounded, Euler drift
// grows monotonically
#[test]
fn h0_verlet_bounded_euler_monotonic() {
    let h = 0.001;
    let t_max = 1000.0;

    let verlet = oscillator_report(IntegratorType::VelocityVerlet, h, t_max);
    let drift = relative_drift(&verlet.total, MACHINE_PRECISION);
    let tenth = drift.len() / 10;
    let early = max(&drift[..tenth]);
    let late = max(&drift[drift.len() - tenth..]);
    assert!(max(&drift) < 1e-6, "verlet drift {}", max(&drift));
    assert!(late < 2.0 * early, "verlet drift grew from {early} to {late}");
    drop(verlet);

    let euler = oscillator_report(IntegratorType::Euler, h, t_max);
    let coarse = euler.subsample(1000);
    for pair in coarse.total.windows(2) {
        assert!(pair[1] > pair[0], "euler energy decreased: {pair:?}");
    }
    // E grows by exactly (1 + h^2) per step, so ~e after 1e6 steps.
    let final_drift = euler.total[euler.len() - 1] / euler.total[0] - 1.0;
    assert!(
        (final_drift - (std::f64::consts::E - 1.0)).abs() < 0.01,
        "euler final drift {final_drift}"
    );
}

// H0: Energy precision does not reflect integrator quality
#[test]
fn h0_precision_ranks_integrators() {
    let euler = oscillator_report(IntegratorType::Euler, 0.01, 10.0);
    let rk4 = oscillator_report(IntegratorType::Rk4, 0.01, 10.0);

    let euler_worst = euler.worst_precision().unwrap();
    let rk4_worst = rk4.worst_precision().unwrap();
    assert!(euler_worst > -2.0, "euler {euler_worst}");
    assert!(rk4_worst < -9.0, "rk4 {rk4_worst}");
    assert!(rk4.mean_drift() < euler.mean_drift());
}

// H0: A circular Earth orbit is not reproduced in astronomical units
// Falsification: after one year the planet is not back at its start
#[test]
fn h0_earth_orbit_closes_after_one_year() {
    let gravity = CentralGravity::solar_earth();
    let speed = G_ASTRONOMICAL.sqrt();
    let config = configure(
        [1.0, 0.0],
        [0.0, speed],
        1.0,
        0.001,
        gravity.m,
        gravity,
        IntegratorType::VelocityVerlet,
    )
    .unwrap();
    let trajectory = run(&config).unwrap();

    let (t, state) = trajectory.last().unwrap();
    let angle = speed * t;
    let dx = state.position[0] - angle.cos();
    let dy = state.position[1] - angle.sin();
    assert!(dx.hypot(dy) < 1e-3, "orbit error {}", dx.hypot(dy));

    let report = analyze(&trajectory, config.force(), config.mass()).unwrap();
    assert!(report.total[0] < 0.0, "bound orbit has negative energy");
    assert!(report.worst_precision().unwrap() < -4.0);
}

// H0: Anharmonic and power-law runs leak energy under RK4
#[test]
fn h0_rk4_conserves_nonlinear_springs() {
    let laws: [ForceLaw; 2] = [
        AnharmonicForce::new(1.0, 0.5).into(),
        PowerLawForce::new(1.0, 4.0).into(),
    ];
    for law in laws {
        let config = configure(0.5, 0.0, 20.0, 0.01, 1.0, law, IntegratorType::Rk4).unwrap();
        let trajectory = run(&config).unwrap();
        let score = energy_conservation(&trajectory, config.force(), config.mass()).unwrap();
        assert!(score < 1e-6, "{}: mean drift {score}", law.name());
    }
}
