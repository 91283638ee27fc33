// Sampling-based MPC driving a point-mass vehicle around a waypoint track.
//
// Headless stand-in for the interactive page: runs the control loop for a
// fixed number of ticks, logs the per-tick table and plots the trajectory.
use clap::Parser;
use log::{error, info, LevelFilter};
use rand::rngs::StdRng;
use rand::SeedableRng;

use sampling_mpc::utils::TrackPlotter;
use sampling_mpc::{
    MotionModel, MpcResult, ProgressTieBreak, SamplingMpcConfig, Simulation, TrackPreset,
    VehicleConfig,
};

#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Cli {
    /// Track preset: `ring` or `acceleration`
    #[arg(long, default_value = "ring")]
    track: TrackPreset,

    /// Number of control ticks to simulate
    #[arg(long, default_value_t = 600)]
    ticks: usize,

    /// Seed of the controller's random source
    #[arg(long, default_value_t = 0)]
    seed: u64,

    /// Steps per rollout
    #[arg(long, default_value_t = 15)]
    horizon: usize,

    /// Random candidates per tick
    #[arg(long, default_value_t = 25)]
    tries: usize,

    /// Keep the original never-updated progress flag during selection
    #[arg(long)]
    legacy_tie_break: bool,

    /// Log every tick
    #[arg(short, long)]
    verbose: bool,

    /// Write an SVG of the run to this path
    #[arg(long)]
    plot: Option<String>,
}

fn logger_init(level: LevelFilter) -> Result<(), log::SetLoggerError> {
    fern::Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!("[{:5}] {}", record.level(), message))
        })
        .level(level)
        .chain(std::io::stdout())
        .apply()
}

fn run(cli: &Cli) -> MpcResult<()> {
    let mpc_config = SamplingMpcConfig {
        horizon: cli.horizon,
        tries: cli.tries,
        tie_break: if cli.legacy_tie_break { ProgressTieBreak::Legacy } else { ProgressTieBreak::Tracked },
        ..Default::default()
    };
    let vehicle_config = VehicleConfig::default();
    let (width, height) = (vehicle_config.domain_width, vehicle_config.domain_height);

    let mut sim = Simulation::new(cli.track, vehicle_config, mpc_config, StdRng::seed_from_u64(cli.seed))?;
    info!("track length: {:.1}, waypoints: {}", sim.track().total_length(), sim.track().len());

    let mut trajectory = vec![sim.state().position()];
    let mut captured = 0;
    for report in sim.run(cli.ticks)? {
        trajectory.push(report.state.position());
        if report.advanced {
            captured += 1;
        }
    }

    info!("final state: {}", sim.state());
    let elapsed = sim.ticks() as f64 * sim.controller().model().dt();
    info!("waypoints captured in {} ticks ({:.1} s): {}", sim.ticks(), elapsed, captured);

    if let Some(path) = &cli.plot {
        let mut plotter = TrackPlotter::new(&format!("Sampling MPC on {} track", cli.track));
        plotter
            .plot_track(sim.track())
            .plot_trajectory(&trajectory)
            .plot_vehicle(sim.state())
            .plot_target(sim.track().target(sim.state().path_index)?)
            .set_domain(width, height);
        plotter.save_svg(path)?;
        info!("plot saved to: {}", path);
    }

    Ok(())
}

fn main() {
    let cli = Cli::parse();

    let level = if cli.verbose { LevelFilter::Debug } else { LevelFilter::Info };
    if let Err(e) = logger_init(level) {
        eprintln!("Failed to initialise logging: {}", e);
    }

    if let Err(e) = run(&cli) {
        error!("{}", e);
        std::process::exit(1);
    }
}
