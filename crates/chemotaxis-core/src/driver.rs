use crate::config::{SimConfig, SimConfigError};
use crate::field::Field;
use crate::grid::{FieldGrid, GridError, RunSummary};
use crate::init;
use log::{debug, info, warn};
use thiserror::Error;

pub type SinkError = Box<dyn std::error::Error + Send + Sync>;

/// Population snapshot handed out before step `step` is applied.
#[derive(Clone, Debug, PartialEq)]
pub struct Frame {
    pub step: usize,
    pub population: Field,
}

/// Consumer of per-step snapshots (renderers, exporters).
pub trait FrameSink {
    fn emit(&mut self, frame: Frame) -> Result<(), SinkError>;
}

/// Discards every frame.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullSink;

impl FrameSink for NullSink {
    fn emit(&mut self, _frame: Frame) -> Result<(), SinkError> {
        Ok(())
    }
}

/// Keeps every `every`-th frame in memory.
#[derive(Clone, Debug)]
pub struct FrameRecorder {
    every: usize,
    frames: Vec<Frame>,
}

impl FrameRecorder {
    pub fn new() -> Self {
        Self::every(1)
    }

    pub fn every(every: usize) -> Self {
        Self {
            every: every.max(1),
            frames: Vec::new(),
        }
    }

    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    pub fn into_frames(self) -> Vec<Frame> {
        self.frames
    }
}

impl Default for FrameRecorder {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameSink for FrameRecorder {
    fn emit(&mut self, frame: Frame) -> Result<(), SinkError> {
        if frame.step % self.every == 0 {
            self.frames.push(frame);
        }
        Ok(())
    }
}

#[derive(Debug, Error)]
pub enum SimulationError {
    #[error(transparent)]
    Config(#[from] SimConfigError),
    #[error(transparent)]
    Grid(#[from] GridError),
    #[error("sample count ({actual}) exceeds supported maximum ({max})")]
    TooManySamples { max: usize, actual: usize },
    #[error("frame sink failed at step {step}")]
    Sink {
        step: usize,
        #[source]
        source: SinkError,
    },
}

/// Owns a `FieldGrid` and drives it for a fixed number of steps.
pub struct Simulation {
    grid: FieldGrid,
}

impl Simulation {
    pub const MAX_SAMPLES: usize = 50_000;

    pub fn new(grid: FieldGrid) -> Self {
        Self { grid }
    }

    /// Grid seeded with uniform `[0, 1)` fields drawn from `config.seed`.
    pub fn from_config(config: SimConfig) -> Result<Self, SimulationError> {
        config.validate()?;
        let (population, attractant) = init::seeded_pair(config.grid_size, config.seed);
        let grid = FieldGrid::with_fields(config, &population, &attractant)?;
        Ok(Self::new(grid))
    }

    pub fn grid(&self) -> &FieldGrid {
        &self.grid
    }

    pub fn grid_mut(&mut self) -> &mut FieldGrid {
        &mut self.grid
    }

    pub fn into_grid(self) -> FieldGrid {
        self.grid
    }

    /// Run for `config.steps` iterations.
    pub fn run_configured<S: FrameSink + ?Sized>(
        &mut self,
        sink: &mut S,
    ) -> Result<RunSummary, SimulationError> {
        let steps = self.grid.config().steps;
        self.run(steps, sink)
    }

    /// For `t` in `0..steps`: emit the current population tagged `t`, then advance one step.
    pub fn run<S: FrameSink + ?Sized>(
        &mut self,
        steps: usize,
        sink: &mut S,
    ) -> Result<RunSummary, SimulationError> {
        if steps > SimConfig::MAX_STEPS {
            return Err(SimConfigError::TooManySteps {
                max: SimConfig::MAX_STEPS,
                actual: steps,
            }
            .into());
        }
        let config = self.grid.config().clone();
        let sample_every = config.sample_every;
        let estimated_samples = if steps == 0 {
            0
        } else {
            ((steps - 1) / sample_every) + 1
        };
        if estimated_samples > Self::MAX_SAMPLES {
            return Err(SimulationError::TooManySamples {
                max: Self::MAX_SAMPLES,
                actual: estimated_samples,
            });
        }
        if config.exceeds_stability_limit() {
            warn!(
                "dt = {} exceeds the diffusion stability limit {:.4e}; fields may diverge",
                config.dt,
                config.stability_limit()
            );
        }
        info!(
            "running {} steps on a {}x{} grid (dt = {}, chi = {})",
            steps, config.grid_size, config.grid_size, config.dt, config.chi
        );

        let mut samples = Vec::with_capacity(estimated_samples);
        let mut total_step_us = 0u64;

        for t in 0..steps {
            let frame = Frame {
                step: t,
                population: self.grid.population().clone(),
            };
            sink.emit(frame)
                .map_err(|source| SimulationError::Sink { step: t, source })?;

            let timings = if config.check_finite {
                self.grid.try_step().inspect_err(|e| warn!("{e}"))?
            } else {
                self.grid.step()
            };
            total_step_us = total_step_us.saturating_add(timings.total_us);

            let done = t + 1;
            if done % sample_every == 0 || done == steps {
                let metrics = self.grid.collect_step_metrics();
                debug!(
                    "step {}: population mean {:.6} [{:.6}, {:.6}], attractant mean {:.6}",
                    done,
                    metrics.population.mean,
                    metrics.population.min,
                    metrics.population.max,
                    metrics.attractant.mean
                );
                samples.push(metrics);
            }
        }

        let final_metrics = self.grid.collect_step_metrics();
        info!(
            "finished {} steps in {} us; population total {:.6}",
            steps, total_step_us, final_metrics.population.total
        );
        Ok(RunSummary {
            schema_version: 1,
            steps,
            sample_every,
            samples,
            final_metrics,
            total_step_us,
        })
    }
}
