//! Simulation configuration with YAML loading and validation.
//!
//! Implements Poka-Yoke (mistake-proofing) through:
//! - Type-safe configuration structs
//! - Schema validation via serde and `validator`
//! - Semantic validation of every physical parameter before a run starts
//!
//! A [`SimulationConfig`] can only be obtained through [`configure`], the
//! builder, or YAML loading, all of which validate. It is immutable
//! afterwards.
//!
//! ```yaml
//! x0: [1.0, 0.0]
//! v0: [0.0, 6.283]
//! t_max: 10.0
//! h: 0.001
//! mass: 3.003467e-6
//! force:
//!   law: gravity
//!   g: 39.478
//!   m: 3.003467e-6
//!   central_mass: 1.0
//! integrator: velocity-verlet
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;
use validator::Validate;

use crate::domains::forces::ForceLaw;
use crate::domains::integrators::IntegratorType;
use crate::engine::jidoka::JidokaConfig;
use crate::engine::state::{PhaseState, Vector};
use crate::error::{SimError, SimResult};

/// Upper bound on the number of trajectory samples of a single run.
pub const MAX_SAMPLES: usize = 10_000_000;

/// Upper bound on the memory a single trajectory may occupy (1 GiB).
pub const MAX_TRAJECTORY_BYTES: usize = 1 << 30;

/// Approximate heap footprint of one trajectory sample in `dim` dimensions.
#[must_use]
pub const fn sample_bytes(dim: usize) -> usize {
    std::mem::size_of::<f64>()
        + std::mem::size_of::<PhaseState>()
        + 2 * dim * std::mem::size_of::<f64>()
}

/// Validated configuration of one simulation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct SimulationConfig {
    /// Initial position.
    x0: Vector,
    /// Initial velocity.
    v0: Vector,
    /// Total integration time.
    t_max: f64,
    /// Step size.
    h: f64,
    /// Particle mass.
    mass: f64,
    /// Force law with bound parameters.
    #[serde(default)]
    force: ForceLaw,
    /// Integration scheme.
    #[serde(default)]
    integrator: IntegratorType,
    /// Per-step anomaly detection.
    #[validate(nested)]
    #[serde(default)]
    jidoka: JidokaConfig,
}

/// Build and validate a [`SimulationConfig`].
///
/// # Errors
///
/// Returns `InvalidConfiguration` if `h`, `t_max` or `mass` is not
/// positive and finite, if `x0` and `v0` differ in dimension (or are
/// empty), if the force-law parameters are invalid, or if `t_max / h`
/// yields no samples.
pub fn configure(
    x0: impl Into<Vector>,
    v0: impl Into<Vector>,
    t_max: f64,
    h: f64,
    mass: f64,
    force: impl Into<ForceLaw>,
    integrator: IntegratorType,
) -> SimResult<SimulationConfig> {
    let config = SimulationConfig {
        x0: x0.into(),
        v0: v0.into(),
        t_max,
        h,
        mass,
        force: force.into(),
        integrator,
        jidoka: JidokaConfig::default(),
    };
    config.check()?;
    Ok(config)
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

impl SimulationConfig {
    /// Load configuration from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - File cannot be read
    /// - YAML parsing fails
    /// - Validation fails
    pub fn load<P: AsRef<Path>>(path: P) -> SimResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse configuration from YAML string.
    ///
    /// # Errors
    ///
    /// Returns error if parsing or validation fails.
    pub fn from_yaml(yaml: &str) -> SimResult<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.check()?;
        Ok(config)
    }

    /// Serialize to YAML.
    ///
    /// # Errors
    ///
    /// Returns error if serialization fails.
    pub fn to_yaml(&self) -> SimResult<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Create a builder for configuration.
    #[must_use]
    pub fn builder() -> SimulationConfigBuilder {
        SimulationConfigBuilder::default()
    }

    /// Run schema and semantic validation.
    ///
    /// # Errors
    ///
    /// Returns the first violated constraint.
    pub fn check(&self) -> SimResult<()> {
        self.validate()?;
        self.validate_semantic()
    }

    fn validate_semantic(&self) -> SimResult<()> {
        require_positive("h", self.h)?;
        require_positive("t_max", self.t_max)?;
        require_positive("mass", self.mass)?;

        if self.x0.dim() == 0 {
            return Err(SimError::invalid("x0", "position must have at least one component"));
        }
        if self.x0.dim() != self.v0.dim() {
            return Err(SimError::invalid(
                "v0",
                format!(
                    "dimension {} does not match position dimension {}",
                    self.v0.dim(),
                    self.x0.dim()
                ),
            ));
        }
        if !self.x0.is_finite() {
            return Err(SimError::invalid("x0", "components must be finite"));
        }
        if !self.v0.is_finite() {
            return Err(SimError::invalid("v0", "components must be finite"));
        }

        self.force.validate()?;

        let samples = (self.t_max / self.h).floor();
        if samples < 1.0 {
            return Err(SimError::invalid(
                "t_max",
                format!("t_max = {} is shorter than one step h = {}", self.t_max, self.h),
            ));
        }
        if samples > MAX_SAMPLES as f64 {
            return Err(SimError::invalid(
                "h",
                format!("t_max / h = {samples} exceeds {MAX_SAMPLES} samples"),
            ));
        }
        let bytes = samples * sample_bytes(self.x0.dim()) as f64;
        if bytes > MAX_TRAJECTORY_BYTES as f64 {
            return Err(SimError::invalid(
                "h",
                format!(
                    "trajectory of {samples} samples in {} dimensions needs about {} MiB, limit is {} MiB",
                    self.x0.dim(),
                    (bytes / f64::from(1 << 20)).ceil(),
                    MAX_TRAJECTORY_BYTES >> 20
                ),
            ));
        }

        Ok(())
    }

    /// Initial position.
    #[must_use]
    pub const fn x0(&self) -> &Vector {
        &self.x0
    }

    /// Initial velocity.
    #[must_use]
    pub const fn v0(&self) -> &Vector {
        &self.v0
    }

    /// Initial phase-space state `(x0, v0)`.
    #[must_use]
    pub fn initial_state(&self) -> PhaseState {
        PhaseState::new(self.x0.clone(), self.v0.clone())
    }

    /// Total integration time.
    #[must_use]
    pub const fn t_max(&self) -> f64 {
        self.t_max
    }

    /// Step size.
    #[must_use]
    pub const fn h(&self) -> f64 {
        self.h
    }

    /// Particle mass.
    #[must_use]
    pub const fn mass(&self) -> f64 {
        self.mass
    }

    /// Force law.
    #[must_use]
    pub const fn force(&self) -> &ForceLaw {
        &self.force
    }

    /// Integration scheme.
    #[must_use]
    pub const fn integrator(&self) -> IntegratorType {
        self.integrator
    }

    /// Jidoka configuration.
    #[must_use]
    pub const fn jidoka(&self) -> &JidokaConfig {
        &self.jidoka
    }

    /// Number of trajectory samples, `floor(t_max / h)`.
    #[must_use]
    pub fn num_steps(&self) -> usize {
        (self.t_max / self.h).floor() as usize
    }
}

/// Configuration builder for programmatic construction.
///
/// Unset fields take the defaults `x0 = 0`, `v0 = 1`, `t_max = 100`,
/// `h = 0.001`, `mass = 1`, harmonic force, Euler integrator.
#[derive(Debug, Default)]
pub struct SimulationConfigBuilder {
    x0: Option<Vector>,
    v0: Option<Vector>,
    t_max: Option<f64>,
    h: Option<f64>,
    mass: Option<f64>,
    force: Option<ForceLaw>,
    integrator: Option<IntegratorType>,
    jidoka: Option<JidokaConfig>,
}

impl SimulationConfigBuilder {
    /// Set the initial position.
    #[must_use]
    pub fn x0(mut self, x0: impl Into<Vector>) -> Self {
        self.x0 = Some(x0.into());
        self
    }

    /// Set the initial velocity.
    #[must_use]
    pub fn v0(mut self, v0: impl Into<Vector>) -> Self {
        self.v0 = Some(v0.into());
        self
    }

    /// Set the total integration time.
    #[must_use]
    pub const fn t_max(mut self, t_max: f64) -> Self {
        self.t_max = Some(t_max);
        self
    }

    /// Set the step size.
    #[must_use]
    pub const fn h(mut self, h: f64) -> Self {
        self.h = Some(h);
        self
    }

    /// Set the particle mass.
    #[must_use]
    pub const fn mass(mut self, mass: f64) -> Self {
        self.mass = Some(mass);
        self
    }

    /// Set the force law.
    #[must_use]
    pub fn force(mut self, force: impl Into<ForceLaw>) -> Self {
        self.force = Some(force.into());
        self
    }

    /// Set the integrator.
    #[must_use]
    pub const fn integrator(mut self, integrator: IntegratorType) -> Self {
        self.integrator = Some(integrator);
        self
    }

    /// Set Jidoka configuration.
    #[must_use]
    pub fn jidoka(mut self, config: JidokaConfig) -> Self {
        self.jidoka = Some(config);
        self
    }

    /// Build and validate the configuration.
    ///
    /// # Errors
    ///
    /// Same as [`configure`].
    pub fn build(self) -> SimResult<SimulationConfig> {
        let dim = self
            .x0
            .as_ref()
            .or(self.v0.as_ref())
            .map_or(1, Vector::dim);

        let config = SimulationConfig {
            x0: self.x0.unwrap_or_else(|| Vector::zeros(dim)),
            v0: self.v0.unwrap_or_else(|| Vector::new(vec![1.0; dim])),
            t_max: self.t_max.unwrap_or(100.0),
            h: self.h.unwrap_or(0.001),
            mass: self.mass.unwrap_or(1.0),
            force: self.force.unwrap_or_default(),
            integrator: self.integrator.unwrap_or_default(),
            jidoka: self.jidoka.unwrap_or_default(),
        };
        config.check()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domains::forces::{CentralGravity, HarmonicForce, PowerLawForce};

    #[test]
    fn test_builder_defaults() {
        let config = SimulationConfig::builder().build().unwrap();
        assert_eq!(config.x0(), &Vector::from(0.0));
        assert_eq!(config.v0(), &Vector::from(1.0));
        assert!((config.t_max() - 100.0).abs() < f64::EPSILON);
        assert!((config.h() - 0.001).abs() < f64::EPSILON);
        assert!((config.mass() - 1.0).abs() < f64::EPSILON);
        assert_eq!(config.force(), &ForceLaw::default());
        assert_eq!(config.integrator(), IntegratorType::Euler);
    }

    #[test]
    fn test_builder_infers_dimension() {
        let config = SimulationConfig::builder()
            .x0([1.0, 0.0, 0.0])
            .build()
            .unwrap();
        assert_eq!(config.v0(), &Vector::from([1.0, 1.0, 1.0]));
    }

    #[test]
    fn test_num_steps_is_floor() {
        let config = configure(0.0, 1.0, 10.0, 1.0, 1.0, HarmonicForce::default(), IntegratorType::Rk4)
            .unwrap();
        assert_eq!(config.num_steps(), 10);

        let config = configure(0.0, 1.0, 2.5, 1.0, 1.0, HarmonicForce::default(), IntegratorType::Rk4)
            .unwrap();
        assert_eq!(config.num_steps(), 2);
    }

    #[test]
    fn test_rejects_non_positive_parameters() {
        let cases = [
            (1.0, 0.0, 1.0, "h"),
            (1.0, -0.1, 1.0, "h"),
            (0.0, 0.1, 1.0, "t_max"),
            (-5.0, 0.1, 1.0, "t_max"),
            (1.0, 0.1, 0.0, "mass"),
            (1.0, 0.1, -2.0, "mass"),
            (1.0, f64::NAN, 1.0, "h"),
            (f64::INFINITY, 0.1, 1.0, "t_max"),
        ];

        for (t_max, h, mass, parameter) in cases {
            let err = configure(0.0, 1.0, t_max, h, mass, HarmonicForce::default(), IntegratorType::Euler)
                .unwrap_err();
            assert!(err.is_invalid_configuration());
            match err {
                SimError::InvalidConfiguration { parameter: p, .. } => assert_eq!(p, parameter),
                other => panic!("unexpected error {other}"),
            }
        }
    }

    #[test]
    fn test_rejects_dimension_mismatch() {
        let err = configure(
            [1.0, 0.0],
            [0.0, 1.0, 0.0],
            1.0,
            0.1,
            1.0,
            HarmonicForce::default(),
            IntegratorType::Euler,
        )
        .unwrap_err();
        assert!(err.to_string().contains("dimension 3 does not match position dimension 2"));

        let err = configure(
            Vector::new(vec![]),
            Vector::new(vec![]),
            1.0,
            0.1,
            1.0,
            HarmonicForce::default(),
            IntegratorType::Euler,
        )
        .unwrap_err();
        assert!(err.is_invalid_configuration());
    }

    #[test]
    fn test_rejects_too_short_run() {
        let err = configure(0.0, 1.0, 0.5, 1.0, 1.0, HarmonicForce::default(), IntegratorType::Euler)
            .unwrap_err();
        assert!(err.to_string().contains("shorter than one step"));
    }

    #[test]
    fn test_rejects_too_many_samples() {
        let err = configure(0.0, 1.0, 1e9, 1e-3, 1.0, HarmonicForce::default(), IntegratorType::Euler)
            .unwrap_err();
        assert!(err.to_string().contains("exceeds"));
    }

    #[test]
    fn test_sample_cap_fits_memory_budget_in_1d() {
        assert!(MAX_SAMPLES * sample_bytes(1) <= MAX_TRAJECTORY_BYTES);

        let config = configure(0.0, 1.0, 10_000.0, 0.001, 1.0, HarmonicForce::default(), IntegratorType::Euler);
        assert!(config.is_ok());
    }

    #[test]
    fn test_rejects_trajectory_over_memory_budget() {
        // 1e6 samples of a 1000-dimensional state is ~16 GB.
        let x0 = Vector::zeros(1000);
        let v0 = Vector::zeros(1000);
        let err = configure(x0, v0, 1000.0, 0.001, 1.0, HarmonicForce::default(), IntegratorType::Euler)
            .unwrap_err();
        match err {
            SimError::InvalidConfiguration { parameter, message } => {
                assert_eq!(parameter, "h");
                assert!(message.contains("MiB"), "{message}");
            }
            other => panic!("unexpected error {other}"),
        }
    }

    #[test]
    fn test_rejects_invalid_force_parameters() {
        let err = configure(1.0, 0.0, 1.0, 0.1, 1.0, PowerLawForce::new(1.0, 0.0), IntegratorType::Euler)
            .unwrap_err();
        assert!(err.to_string().contains("force.p"));
    }

    #[test]
    fn test_from_yaml() {
        let yaml = r"
x0: [1.0, 0.0]
v0: [0.0, 1.0]
t_max: 6.5
h: 0.125
mass: 1.0
force:
  law: gravity
integrator: velocity-verlet
";
        let config = SimulationConfig::from_yaml(yaml).unwrap();
        assert_eq!(config.force(), &ForceLaw::Gravity(CentralGravity::default()));
        assert_eq!(config.integrator(), IntegratorType::VelocityVerlet);
        assert_eq!(config.num_steps(), 52);
        assert_eq!(config.jidoka(), &JidokaConfig::default());
    }

    #[test]
    fn test_from_yaml_scalar_problem() {
        let yaml = "x0: 0.0\nv0: 1.0\nt_max: 1.0\nh: 0.1\nmass: 1.0\n";
        let err = SimulationConfig::from_yaml(yaml);
        // Scalars must be written as one-element sequences.
        assert!(err.is_err());

        let yaml = "x0: [0.0]\nv0: [1.0]\nt_max: 1.0\nh: 0.1\nmass: 1.0\n";
        let config = SimulationConfig::from_yaml(yaml).unwrap();
        assert_eq!(config.initial_state(), PhaseState::new(0.0, 1.0));
    }

    #[test]
    fn test_from_yaml_rejects_unknown_fields() {
        let yaml = "x0: [0.0]\nv0: [1.0]\nt_max: 1.0\nh: 0.1\nmass: 1.0\nkwargs: {k: 2}\n";
        assert!(matches!(
            SimulationConfig::from_yaml(yaml),
            Err(SimError::YamlParse(_))
        ));
    }

    #[test]
    fn test_from_yaml_runs_semantic_validation() {
        let yaml = "x0: [0.0]\nv0: [1.0]\nt_max: 1.0\nh: -0.1\nmass: 1.0\n";
        let err = SimulationConfig::from_yaml(yaml).unwrap_err();
        assert!(matches!(err, SimError::InvalidConfiguration { .. }));
    }

    #[test]
    fn test_from_yaml_runs_schema_validation() {
        let yaml = r"
x0: [0.0]
v0: [1.0]
t_max: 1.0
h: 0.1
mass: 1.0
jidoka:
  severity_classifier:
    warning_fraction: 2.0
";
        let err = SimulationConfig::from_yaml(yaml).unwrap_err();
        assert!(matches!(err, SimError::Validation(_)));
    }

    #[test]
    fn test_yaml_round_trip_and_load() {
        let config = SimulationConfig::builder()
            .x0([1.0, 0.0])
            .v0([0.0, 1.0])
            .t_max(2.0)
            .h(0.01)
            .force(PowerLawForce::new(2.0, 4.0))
            .integrator(IntegratorType::Rk2)
            .build()
            .unwrap();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("run.yaml");
        std::fs::write(&path, config.to_yaml().unwrap()).unwrap();

        let loaded = SimulationConfig::load(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_load_missing_file() {
        let err = SimulationConfig::load("/nonexistent/run.yaml").unwrap_err();
        assert!(matches!(err, SimError::Io(_)));
    }
}
