use chemotaxis_core::driver::{NullSink, Simulation};
use chemotaxis_core::SimConfig;
use std::time::Instant;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let grid_size = 512;
    let steps = 20;
    println!(
        "Benchmarking {} steps on a {}x{} grid ({} cells)",
        steps,
        grid_size,
        grid_size,
        grid_size * grid_size
    );

    let config = SimConfig {
        grid_size,
        steps,
        seed: 42,
        ..SimConfig::default()
    };
    let mut sim1 = Simulation::from_config(config.clone()).expect("valid benchmark config");
    let mut sim2 = Simulation::from_config(SimConfig {
        sample_every: 1,
        check_finite: true,
        ..config
    })
    .expect("valid benchmark config");

    // Bare grid steps
    let start = Instant::now();
    let mut derivative_us = 0u64;
    let mut update_us = 0u64;
    for _ in 0..steps {
        let t = sim1.grid_mut().step();
        derivative_us += t.derivative_us;
        update_us += t.update_us;
    }
    let duration_bare = start.elapsed();
    println!("Time for {} steps (bare): {:?}", steps, duration_bare);
    println!("Avg time per step (bare): {:?}", duration_bare / steps as u32);
    println!(
        "  derivatives: {} us/step, update: {} us/step",
        derivative_us / steps as u64,
        update_us / steps as u64
    );

    // Full driver loop: snapshot, finite check, metrics every step
    let start = Instant::now();
    sim2.run(steps, &mut NullSink).expect("benchmark run diverged");
    let duration_driver = start.elapsed();
    println!("Time for {} steps (driver): {:?}", steps, duration_driver);
    println!("Avg time per step (driver): {:?}", duration_driver / steps as u32);

    let diff = duration_driver.saturating_sub(duration_bare);
    println!("Total driver overhead: {:?}", diff);
    println!("Avg driver overhead per step: {:?}", diff / steps as u32);
}
