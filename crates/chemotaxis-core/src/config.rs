use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Parameters of one simulation run. Fixed at construction.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Lattice side length N.
    pub grid_size: usize,
    pub dx: f64,
    pub dy: f64,
    /// Chemotactic sensitivity.
    pub chi: f64,
    /// D_u, population diffusion coefficient.
    pub diffusion_population: f64,
    /// D_v, attractant diffusion coefficient.
    pub diffusion_attractant: f64,
    pub dt: f64,
    pub steps: usize,
    /// Seed for the uniform initial-condition sampler.
    pub seed: u64,
    /// Metrics are sampled every `sample_every` steps and after the last one.
    pub sample_every: usize,
    /// Fail the run with `NumericalDivergence` as soon as a field goes non-finite.
    pub check_finite: bool,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            grid_size: 1000,
            dx: 1.0,
            dy: 1.0,
            chi: 1.0,
            diffusion_population: 1.0,
            diffusion_attractant: 1.0,
            dt: 0.1,
            steps: 1000,
            seed: 42,
            sample_every: 1,
            check_finite: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SimConfigError {
    #[error("grid_size must be positive")]
    ZeroGridSize,
    #[error("grid_size ({actual}) exceeds supported maximum ({max})")]
    GridTooLarge { max: usize, actual: usize },
    #[error("{name} must be finite and > 0 (got {value})")]
    NonPositive { name: &'static str, value: f64 },
    #[error("{name} must be finite (got {value})")]
    NonFinite { name: &'static str, value: f64 },
    #[error("{name} must be >= 0 (got {value})")]
    NegativeDiffusion { name: &'static str, value: f64 },
    #[error("sample_every must be positive")]
    ZeroSampleEvery,
    #[error("steps ({actual}) exceed supported maximum ({max})")]
    TooManySteps { max: usize, actual: usize },
    #[error("invalid config JSON: {0}")]
    Parse(String),
}

impl SimConfig {
    pub const MAX_GRID_SIZE: usize = 8192;
    pub const MAX_STEPS: usize = 10_000_000;

    pub fn validate(&self) -> Result<(), SimConfigError> {
        if self.grid_size == 0 {
            return Err(SimConfigError::ZeroGridSize);
        }
        if self.grid_size > Self::MAX_GRID_SIZE {
            return Err(SimConfigError::GridTooLarge {
                max: Self::MAX_GRID_SIZE,
                actual: self.grid_size,
            });
        }
        for (name, value) in [("dx", self.dx), ("dy", self.dy), ("dt", self.dt)] {
            if !(value.is_finite() && value > 0.0) {
                return Err(SimConfigError::NonPositive { name, value });
            }
        }
        if !self.chi.is_finite() {
            return Err(SimConfigError::NonFinite {
                name: "chi",
                value: self.chi,
            });
        }
        for (name, value) in [
            ("diffusion_population", self.diffusion_population),
            ("diffusion_attractant", self.diffusion_attractant),
        ] {
            if !value.is_finite() {
                return Err(SimConfigError::NonFinite { name, value });
            }
            if value < 0.0 {
                return Err(SimConfigError::NegativeDiffusion { name, value });
            }
        }
        if self.sample_every == 0 {
            return Err(SimConfigError::ZeroSampleEvery);
        }
        if self.steps > Self::MAX_STEPS {
            return Err(SimConfigError::TooManySteps {
                max: Self::MAX_STEPS,
                actual: self.steps,
            });
        }
        Ok(())
    }

    /// Parse a JSON document; missing keys take their default values.
    pub fn from_json_str(json: &str) -> Result<Self, SimConfigError> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| SimConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Largest `dt` for which explicit diffusion with the `dx*dy` stencil stays stable.
    pub fn stability_limit(&self) -> f64 {
        let d_max = self.diffusion_population.max(self.diffusion_attractant);
        if d_max <= 0.0 {
            return f64::INFINITY;
        }
        self.dx * self.dy / (4.0 * d_max)
    }

    pub fn exceeds_stability_limit(&self) -> bool {
        self.dt > self.stability_limit()
    }
}
