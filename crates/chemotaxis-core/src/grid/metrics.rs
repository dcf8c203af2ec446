use super::FieldGrid;
use crate::field::Field;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepTimings {
    pub derivative_us: u64,
    pub update_us: u64,
    pub total_us: u64,
}

/// Summary statistics of one field.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct FieldStats {
    pub mean: f64,
    pub min: f64,
    pub max: f64,
    /// Integral over the torus: sum of cell values times `dx * dy`.
    pub total: f64,
}

impl FieldStats {
    pub fn from_field(field: &Field, cell_area: f64) -> Self {
        let values = field.as_slice();
        if values.is_empty() {
            return Self::default();
        }
        let mut sum = 0.0f64;
        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;
        for &v in values {
            sum += v;
            min = min.min(v);
            max = max.max(v);
        }
        Self {
            mean: sum / values.len() as f64,
            min,
            max,
            total: sum * cell_area,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StepMetrics {
    /// Completed steps at sampling time.
    pub step: usize,
    pub population: FieldStats,
    pub attractant: FieldStats,
}

fn default_schema_version() -> u32 {
    1
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,
    pub steps: usize,
    pub sample_every: usize,
    pub samples: Vec<StepMetrics>,
    pub final_metrics: StepMetrics,
    #[serde(default)]
    pub total_step_us: u64,
}

impl FieldGrid {
    pub fn collect_step_metrics(&self) -> StepMetrics {
        let cell_area = self.config.dx * self.config.dy;
        StepMetrics {
            step: self.step_index,
            population: FieldStats::from_field(&self.population, cell_area),
            attractant: FieldStats::from_field(&self.attractant, cell_area),
        }
    }
}
