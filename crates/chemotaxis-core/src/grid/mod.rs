pub mod metrics;

pub use metrics::*;

use crate::config::{SimConfig, SimConfigError};
use crate::field::{Field, Wrap};
use crate::stencil::{self, Gradient};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Instant;
use thiserror::Error;

/// The two evolved quantities.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FieldKind {
    /// Population density `u`.
    Population,
    /// Attractant concentration `v`.
    Attractant,
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldKind::Population => write!(f, "population"),
            FieldKind::Attractant => write!(f, "attractant"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum GridError {
    #[error(transparent)]
    Config(#[from] SimConfigError),
    #[error(
        "{field} field has shape {}x{}, expected {}x{}",
        .actual.0, .actual.1, .expected.0, .expected.1
    )]
    ShapeMismatch {
        field: FieldKind,
        expected: (usize, usize),
        actual: (usize, usize),
    },
    #[error("cell ({row}, {col}) is outside the {size}x{size} grid")]
    CellOutOfBounds { row: usize, col: usize, size: usize },
    #[error("{field} field became non-finite at ({row}, {col}) after step {step}")]
    NumericalDivergence {
        step: usize,
        field: FieldKind,
        row: usize,
        col: usize,
    },
}

/// Current values at one lattice cell.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct CellInfo {
    pub row: usize,
    pub col: usize,
    pub population: f64,
    pub attractant: f64,
}

impl fmt::Display for CellInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Cell ({}, {}): cell density {}, chemoattractant concentration {}",
            self.row, self.col, self.population, self.attractant
        )
    }
}

/// Derivatives of both fields taken from one snapshot.
#[derive(Clone, Debug)]
pub struct Derivatives {
    pub grad_population: Gradient,
    pub grad_attractant: Gradient,
    pub lap_population: Field,
    pub lap_attractant: Field,
}

/// Population and attractant fields on an N×N torus, advanced by forward Euler.
pub struct FieldGrid {
    pub(crate) config: SimConfig,
    pub(crate) population: Field,
    pub(crate) attractant: Field,
    pub(crate) next_population: Field,
    pub(crate) next_attractant: Field,
    pub(crate) wrap: Wrap,
    pub(crate) step_index: usize,
}

impl FieldGrid {
    /// Grid with both fields zeroed.
    pub fn new(config: SimConfig) -> Self {
        Self::try_new(config).unwrap_or_else(|e| panic!("{e}"))
    }

    pub fn try_new(config: SimConfig) -> Result<Self, GridError> {
        config.validate()?;
        let n = config.grid_size;
        Ok(Self {
            population: Field::zeros(n),
            attractant: Field::zeros(n),
            next_population: Field::zeros(n),
            next_attractant: Field::zeros(n),
            wrap: Wrap::new(n),
            step_index: 0,
            config,
        })
    }

    /// Grid initialised from two supplied fields.
    pub fn with_fields(
        config: SimConfig,
        population: &Field,
        attractant: &Field,
    ) -> Result<Self, GridError> {
        let mut grid = Self::try_new(config)?;
        grid.check_shape(FieldKind::Population, population)?;
        grid.check_shape(FieldKind::Attractant, attractant)?;
        grid.set(FieldKind::Population, population)?;
        grid.set(FieldKind::Attractant, attractant)?;
        Ok(grid)
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn size(&self) -> usize {
        self.config.grid_size
    }

    /// Number of completed `step()` calls.
    pub fn step_index(&self) -> usize {
        self.step_index
    }

    pub fn population(&self) -> &Field {
        &self.population
    }

    pub fn attractant(&self) -> &Field {
        &self.attractant
    }

    pub fn field(&self, kind: FieldKind) -> &Field {
        match kind {
            FieldKind::Population => &self.population,
            FieldKind::Attractant => &self.attractant,
        }
    }

    fn check_shape(&self, kind: FieldKind, values: &Field) -> Result<(), GridError> {
        let n = self.size();
        if values.shape() != (n, n) {
            return Err(GridError::ShapeMismatch {
                field: kind,
                expected: (n, n),
                actual: values.shape(),
            });
        }
        Ok(())
    }

    /// Replace one field by copying `values`. The stored field is left untouched on error.
    pub fn set(&mut self, kind: FieldKind, values: &Field) -> Result<(), GridError> {
        self.check_shape(kind, values)?;
        let target = match kind {
            FieldKind::Population => &mut self.population,
            FieldKind::Attractant => &mut self.attractant,
        };
        target.clone_from(values);
        Ok(())
    }

    /// Same as `set`, from nested rows.
    pub fn set_rows(&mut self, kind: FieldKind, rows: &[Vec<f64>]) -> Result<(), GridError> {
        let n = self.size();
        let ragged = rows.iter().find(|r| r.len() != n);
        if rows.len() != n || ragged.is_some() {
            let cols = ragged.or(rows.first()).map_or(0, Vec::len);
            return Err(GridError::ShapeMismatch {
                field: kind,
                expected: (n, n),
                actual: (rows.len(), cols),
            });
        }
        let target = match kind {
            FieldKind::Population => &mut self.population,
            FieldKind::Attractant => &mut self.attractant,
        };
        for (dst, src) in target.as_mut_slice().chunks_exact_mut(n).zip(rows) {
            dst.copy_from_slice(src);
        }
        Ok(())
    }

    /// Laplacian of one of the grid's own fields. Use [`stencil::laplacian`] for other fields.
    pub fn compute_laplacian(&self, kind: FieldKind) -> Field {
        stencil::laplacian_with(self.field(kind), &self.wrap, self.config.dx, self.config.dy)
    }

    pub fn compute_gradient(&self, kind: FieldKind) -> Gradient {
        stencil::gradient_with(self.field(kind), &self.wrap, self.config.dx, self.config.dy)
    }

    /// Gradients and Laplacians of the current fields.
    pub fn derivatives(&self) -> Derivatives {
        Derivatives {
            grad_population: self.compute_gradient(FieldKind::Population),
            grad_attractant: self.compute_gradient(FieldKind::Attractant),
            lap_population: self.compute_laplacian(FieldKind::Population),
            lap_attractant: self.compute_laplacian(FieldKind::Attractant),
        }
    }

    /// Advance both fields by one explicit time step.
    ///
    /// `u' = u + dt (chi grad u . grad v + D_u lap u)` and `v' = v + dt (D_v lap v + u - v)`,
    /// both evaluated from the pre-step snapshot.
    pub fn step(&mut self) -> StepTimings {
        let total_start = Instant::now();

        let t0 = Instant::now();
        let d = self.derivatives();
        let derivative_us = t0.elapsed().as_micros() as u64;

        let t1 = Instant::now();
        let chi = self.config.chi;
        let d_u = self.config.diffusion_population;
        let d_v = self.config.diffusion_attractant;
        let dt = self.config.dt;
        let taxis = d.grad_population.dot(&d.grad_attractant);
        let cells = self
            .population
            .as_slice()
            .iter()
            .zip(self.attractant.as_slice())
            .zip(taxis.as_slice())
            .zip(d.lap_population.as_slice())
            .zip(d.lap_attractant.as_slice());
        let outputs = self
            .next_population
            .as_mut_slice()
            .iter_mut()
            .zip(self.next_attractant.as_mut_slice());
        for ((u_next, v_next), ((((&u, &v), &drift), &lap_u), &lap_v)) in outputs.zip(cells) {
            *u_next = u + dt * (chi * drift + d_u * lap_u);
            *v_next = v + dt * (d_v * lap_v + u - v);
        }
        std::mem::swap(&mut self.population, &mut self.next_population);
        std::mem::swap(&mut self.attractant, &mut self.next_attractant);
        self.step_index = self.step_index.saturating_add(1);
        let update_us = t1.elapsed().as_micros() as u64;

        StepTimings {
            derivative_us,
            update_us,
            total_us: total_start.elapsed().as_micros() as u64,
        }
    }

    /// `step()` followed by a finite-value scan of both fields.
    pub fn try_step(&mut self) -> Result<StepTimings, GridError> {
        let timings = self.step();
        self.check_finite()?;
        Ok(timings)
    }

    pub fn check_finite(&self) -> Result<(), GridError> {
        for kind in [FieldKind::Population, FieldKind::Attractant] {
            if let Some((row, col)) = self.field(kind).first_non_finite() {
                return Err(GridError::NumericalDivergence {
                    step: self.step_index,
                    field: kind,
                    row,
                    col,
                });
            }
        }
        Ok(())
    }

    pub fn describe_cell(&self, row: usize, col: usize) -> Result<CellInfo, GridError> {
        match (self.population.try_get(row, col), self.attractant.try_get(row, col)) {
            (Some(population), Some(attractant)) => Ok(CellInfo {
                row,
                col,
                population,
                attractant,
            }),
            _ => Err(GridError::CellOutOfBounds {
                row,
                col,
                size: self.size(),
            }),
        }
    }
}
