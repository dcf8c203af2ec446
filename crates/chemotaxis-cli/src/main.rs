use anyhow::{bail, Context, Result};
use chemotaxis_core::driver::{Frame, FrameSink, Simulation, SinkError};
use chemotaxis_core::grid::{CellInfo, FieldStats, RunSummary};
use chemotaxis_core::SimConfig;
use clap::Parser;
use log::info;
use serde::Serialize;
use std::fs;
use std::io::Write;
use std::path::PathBuf;

/// Run a chemotaxis reaction-diffusion simulation and print a JSON run summary.
#[derive(Parser, Debug)]
#[command(name = "chemotaxis", version)]
struct Cli {
    /// JSON config file; flags below override its values.
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long)]
    grid_size: Option<usize>,
    #[arg(long)]
    dx: Option<f64>,
    #[arg(long)]
    dy: Option<f64>,
    #[arg(long)]
    chi: Option<f64>,
    #[arg(long)]
    diffusion_population: Option<f64>,
    #[arg(long)]
    diffusion_attractant: Option<f64>,
    #[arg(long)]
    dt: Option<f64>,
    #[arg(long)]
    steps: Option<usize>,
    #[arg(long)]
    seed: Option<u64>,
    #[arg(long)]
    sample_every: Option<usize>,
    /// Stop with an error as soon as a field becomes NaN or infinite.
    #[arg(long)]
    check_finite: bool,
    /// Record population statistics for every K-th emitted frame (0 disables).
    #[arg(long, default_value_t = 0)]
    frame_every: usize,
    /// Print the final state of one cell, given as ROW,COL.
    #[arg(long, value_parser = parse_cell)]
    describe: Option<(usize, usize)>,
    /// Write the report here instead of stdout.
    #[arg(long)]
    output: Option<PathBuf>,
    #[arg(long)]
    pretty: bool,
}

fn parse_cell(s: &str) -> Result<(usize, usize), String> {
    let (row, col) = s
        .split_once(',')
        .ok_or_else(|| format!("expected ROW,COL, got '{s}'"))?;
    let row = row
        .trim()
        .parse()
        .map_err(|e| format!("invalid row '{row}': {e}"))?;
    let col = col
        .trim()
        .parse()
        .map_err(|e| format!("invalid column '{col}': {e}"))?;
    Ok((row, col))
}

#[derive(Serialize)]
struct FrameRecord {
    step: usize,
    population: FieldStats,
}

/// Reduces every K-th frame to summary statistics.
struct FrameStatsSink {
    every: usize,
    cell_area: f64,
    records: Vec<FrameRecord>,
}

impl FrameSink for FrameStatsSink {
    fn emit(&mut self, frame: Frame) -> Result<(), SinkError> {
        if self.every > 0 && frame.step % self.every == 0 {
            self.records.push(FrameRecord {
                step: frame.step,
                population: FieldStats::from_field(&frame.population, self.cell_area),
            });
        }
        Ok(())
    }
}

#[derive(Serialize)]
struct Report {
    config: SimConfig,
    summary: RunSummary,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    frames: Vec<FrameRecord>,
    #[serde(skip_serializing_if = "Option::is_none")]
    cell: Option<CellInfo>,
}

fn load_config(cli: &Cli) -> Result<SimConfig> {
    let mut config = match &cli.config {
        Some(path) => {
            let json = fs::read_to_string(path)
                .with_context(|| format!("reading config {}", path.display()))?;
            SimConfig::from_json_str(&json)
                .with_context(|| format!("parsing config {}", path.display()))?
        }
        None => SimConfig::default(),
    };
    if let Some(v) = cli.grid_size {
        config.grid_size = v;
    }
    if let Some(v) = cli.dx {
        config.dx = v;
    }
    if let Some(v) = cli.dy {
        config.dy = v;
    }
    if let Some(v) = cli.chi {
        config.chi = v;
    }
    if let Some(v) = cli.diffusion_population {
        config.diffusion_population = v;
    }
    if let Some(v) = cli.diffusion_attractant {
        config.diffusion_attractant = v;
    }
    if let Some(v) = cli.dt {
        config.dt = v;
    }
    if let Some(v) = cli.steps {
        config.steps = v;
    }
    if let Some(v) = cli.seed {
        config.seed = v;
    }
    if let Some(v) = cli.sample_every {
        config.sample_every = v;
    }
    if cli.check_finite {
        config.check_finite = true;
    }
    config.validate().context("invalid simulation config")?;
    Ok(config)
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();
    let config = load_config(&cli)?;

    if let Some((row, col)) = cli.describe {
        if row >= config.grid_size || col >= config.grid_size {
            bail!(
                "--describe {row},{col} is outside the {n}x{n} grid",
                n = config.grid_size
            );
        }
    }

    let mut sim = Simulation::from_config(config.clone()).context("building simulation")?;
    let mut sink = FrameStatsSink {
        every: cli.frame_every,
        cell_area: config.dx * config.dy,
        records: Vec::new(),
    };
    let summary = sim.run_configured(&mut sink).context("simulation run failed")?;

    let cell = cli
        .describe
        .map(|(row, col)| sim.grid().describe_cell(row, col))
        .transpose()?;
    if let Some(info) = &cell {
        info!("{info}");
    }

    let report = Report {
        config,
        summary,
        frames: sink.records,
        cell,
    };
    let json = if cli.pretty {
        serde_json::to_string_pretty(&report)?
    } else {
        serde_json::to_string(&report)?
    };
    match &cli.output {
        Some(path) => {
            fs::write(path, json).with_context(|| format!("writing {}", path.display()))?;
            info!("report written to {}", path.display());
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            writeln!(stdout, "{json}").context("writing report to stdout")?;
        }
    }
    Ok(())
}
