mod app;

use std::path::PathBuf;

use clap::Parser;

/// Headless desktop-pet simulation: spawns pets in a virtual display,
/// runs them for a while and prints where they ended up.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Number of pets to spawn
    #[arg(long, default_value_t = 10)]
    pets: usize,
    /// Simulated seconds
    #[arg(long, default_value_t = 60.0)]
    seconds: f64,
    /// Display width
    #[arg(long, default_value_t = 1920.0)]
    width: f32,
    /// Display height
    #[arg(long, default_value_t = 1080.0)]
    height: f32,
    /// RNG seed (random when omitted)
    #[arg(long)]
    seed: Option<u64>,
    /// Settings JSON file
    #[arg(long)]
    config: Option<PathBuf>,
    /// Species table JSON file (built-in species when omitted)
    #[arg(long)]
    species_file: Option<PathBuf>,
    /// Species to spawn, round-robin (repeatable)
    #[arg(long = "species")]
    species: Vec<String>,
    /// Start every pet wall-walking
    #[arg(long)]
    wall_walking: bool,
    /// Start every pet chasing an orbiting pointer
    #[arg(long, conflicts_with = "wall_walking")]
    chase: bool,
    /// Pace the simulation in wall-clock time
    #[arg(long)]
    realtime: bool,
    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() {
    let args = Args::parse();
    petengine::logging::init(args.verbose);
    log::info!("petengine starting up");

    let opts = app::RunOptions {
        pets: args.pets,
        seconds: args.seconds,
        width: args.width,
        height: args.height,
        seed: args.seed,
        config: args.config,
        species_file: args.species_file,
        species: args.species,
        wall_walking: args.wall_walking,
        chase: args.chase,
        realtime: args.realtime,
    };
    if let Err(e) = app::run(&opts) {
        log::error!("Fatal error: {e}");
        std::process::exit(1);
    }
}
