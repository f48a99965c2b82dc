//! End-to-end contract of `configure` + `run`.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use newtonian::prelude::*;

fn oscillator(integrator: IntegratorType, t_max: f64, h: f64) -> SimulationConfig {
    configure(0.0, 1.0, t_max, h, 1.0, HarmonicForce::new(1.0), integrator).unwrap()
}

// H0: Trajectory length is not floor(t_max / h)
// Falsification: t_max = 10, h = 1 must give exactly 10 samples
#[test]
fn h0_trajectory_length_and_initial_sample() {
    for integrator in IntegratorType::all() {
        let trajectory = run(&oscillator(integrator, 10.0, 1.0)).unwrap();
        assert_eq!(trajectory.len(), 10, "{integrator}");

        let (t0, s0) = trajectory.first().unwrap();
        assert!(t0.abs() < f64::EPSILON);
        assert_eq!(s0, &PhaseState::new(0.0, 1.0));

        let (t_last, _) = trajectory.last().unwrap();
        assert!((t_last - 9.0).abs() < f64::EPSILON);
    }
}

// H0: Stepping mutates or depends on hidden state
// Falsification: two steps from the same state differ, or the input changes
#[test]
fn h0_step_is_pure() {
    let config = oscillator(IntegratorType::Rk4, 1.0, 0.1);
    let engine = SimEngine::new(config).unwrap();
    let f = |t: f64, y: &PhaseState| engine.derivative(t, y);

    let state = PhaseState::new([0.3, -0.2], [1.0, 0.5]);
    let before = state.clone();
    for integrator in IntegratorType::all() {
        let a = integrator.step(&state, &f, 0.0, 0.1).unwrap();
        let b = integrator.step(&state, &f, 0.0, 0.1).unwrap();
        assert_eq!(a, b, "{integrator}");
        assert_eq!(state, before, "{integrator} touched its input");
    }
}

// H0: Runs are not reproducible
#[test]
fn h0_runs_are_bitwise_reproducible() {
    let config = oscillator(IntegratorType::VelocityVerlet, 20.0, 0.01);
    let first = run(&config).unwrap();
    let second = run(&config).unwrap();
    assert_eq!(first, second);
}

// H0: Independent runs interfere when executed concurrently
#[test]
fn h0_concurrent_runs_match_sequential() {
    let configs: Vec<SimulationConfig> = IntegratorType::all()
        .into_iter()
        .map(|integrator| oscillator(integrator, 5.0, 0.01))
        .collect();

    let sequential: Vec<Trajectory> = configs.iter().map(|c| run(c).unwrap()).collect();
    let concurrent: Vec<Trajectory> = std::thread::scope(|scope| {
        let handles: Vec<_> = configs
            .iter()
            .map(|c| scope.spawn(move || run(c).unwrap()))
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    assert_eq!(sequential, concurrent);
}

// H0: Invalid parameters reach the integration loop
#[test]
fn h0_invalid_parameters_are_named() {
    let cases: [(Result<SimulationConfig, SimError>, &str); 6] = [
        (
            configure(0.0, 1.0, 1.0, 0.0, 1.0, HarmonicForce::default(), IntegratorType::Euler),
            "h",
        ),
        (
            configure(0.0, 1.0, -1.0, 0.1, 1.0, HarmonicForce::default(), IntegratorType::Euler),
            "t_max",
        ),
        (
            configure(0.0, 1.0, 1.0, 0.1, 0.0, HarmonicForce::default(), IntegratorType::Euler),
            "mass",
        ),
        (
            configure(
                [0.0, 0.0],
                1.0,
                1.0,
                0.1,
                1.0,
                HarmonicForce::default(),
                IntegratorType::Euler,
            ),
            "v0",
        ),
        (
            configure(0.0, 1.0, 0.5, 1.0, 1.0, HarmonicForce::default(), IntegratorType::Euler),
            "t_max",
        ),
        (
            configure(0.0, 1.0, 1.0, 0.1, 1.0, PowerLawForce::new(1.0, 0.0), IntegratorType::Euler),
            "force.p",
        ),
    ];

    for (result, expected) in cases {
        match result {
            Err(SimError::InvalidConfiguration { parameter, .. }) => {
                assert_eq!(parameter, expected);
            }
            other => panic!("expected InvalidConfiguration for {expected}, got {other:?}"),
        }
    }
}

// H0: A singular force silently produces garbage
// Falsification: radial infall onto the centre must fail with the step index
#[test]
fn h0_singularity_stops_the_run() {
    let config = configure(
        [1.0, 0.0],
        [-2.0, 0.0],
        5.0,
        0.5,
        1.0,
        CentralGravity::default(),
        IntegratorType::Euler,
    )
    .unwrap();

    let err = run(&config).unwrap_err();
    assert!(err.is_singularity());
    assert!(!err.is_jidoka_violation());
    let SimError::IntegrationFailed { step, source, .. } = err else {
        panic!("expected IntegrationFailed");
    };
    assert_eq!(step, 1);
    assert!(matches!(*source, SimError::NumericalSingularity { .. }));
}

// H0: Floating-point overflow leaks NaN/Inf into a trajectory
// Falsification: a stiff spring far from the origin (k = 1e300, x0 = 1e10)
// overflows the force; the run must stop with a singularity instead
#[test]
fn h0_overflow_never_reaches_the_trajectory() {
    for integrator in IntegratorType::all() {
        let config = configure(
            1e10,
            0.0,
            1.0,
            0.1,
            1.0,
            HarmonicForce::new(1e300),
            integrator,
        )
        .unwrap();
        let err = run(&config).unwrap_err();
        assert!(err.is_singularity(), "{integrator}: {err}");
    }

    // Overflow in the update itself (x + h v) is caught by the guard.
    let config = configure(
        0.0,
        1e308,
        100.0,
        10.0,
        1.0,
        HarmonicForce::new(1.0),
        IntegratorType::Euler,
    )
    .unwrap();
    let err = run(&config).unwrap_err();
    assert!(err.is_jidoka_violation(), "{err}");
}

// H0: YAML-configured runs differ from programmatic ones
#[test]
fn h0_yaml_config_matches_builder() {
    let yaml = r"
x0: [1.0, 0.0]
v0: [0.0, 0.5]
t_max: 4.0
h: 0.0625
mass: 2.0
force:
  law: anharmonic
  k: 3.0
  alpha: 0.1
integrator: rk4
";
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("run.yaml");
    std::fs::write(&path, yaml).unwrap();

    let from_file = SimulationConfig::load(&path).unwrap();
    let built = SimulationConfig::builder()
        .x0([1.0, 0.0])
        .v0([0.0, 0.5])
        .t_max(4.0)
        .h(0.0625)
        .mass(2.0)
        .force(AnharmonicForce::new(3.0, 0.1))
        .integrator(IntegratorType::Rk4)
        .build()
        .unwrap();

    assert_eq!(from_file, built);
    assert_eq!(from_file.num_steps(), 64);
    assert_eq!(run(&from_file).unwrap(), run(&built).unwrap());
}

// H0: Missing config file is not reported as an I/O error
#[test]
fn h0_missing_config_file() {
    let dir = tempfile::tempdir().unwrap();
    let err = SimulationConfig::load(dir.path().join("absent.yaml")).unwrap_err();
    assert!(matches!(err, SimError::Io(_)));
}
