//! Two-species chemotaxis reaction–diffusion on a periodic square lattice.
//!
//! [`grid::FieldGrid`] owns the population and attractant fields and advances them with an
//! explicit Euler step; [`driver::Simulation`] runs it for a fixed number of steps and hands a
//! population snapshot to a [`driver::FrameSink`] before every step.

pub mod config;
pub mod driver;
pub mod field;
pub mod grid;
pub mod init;
pub mod stencil;

pub use config::{SimConfig, SimConfigError};
pub use driver::{Frame, FrameRecorder, FrameSink, NullSink, Simulation, SimulationError, SinkError};
pub use field::{Field, FieldError};
pub use grid::{CellInfo, FieldGrid, FieldKind, GridError, RunSummary, StepMetrics, StepTimings};
pub use stencil::Gradient;
