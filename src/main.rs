use anyhow::{Context, Result};
use beamnet::{Config, Manager};
use clap::{Parser, Subcommand};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::Deserialize;
use std::path::PathBuf;
use tracing::info;

#[derive(Parser)]
#[command(name = "beamnet")]
#[command(about = "Geometric visibility search and min-conflicts satellite beam assignment", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Assign users to satellite beams
    Run {
        /// Scenario file (TOML) with `users`, `satellites`, and an
        /// optional `[config]` table. Overrides the synthetic generator.
        #[arg(short, long)]
        scenario: Option<PathBuf>,

        /// Number of synthetic users to scatter on the user sphere
        #[arg(long, default_value_t = 2000)]
        users: usize,

        /// Number of synthetic satellites to scatter above the user sphere
        #[arg(long, default_value_t = 24)]
        satellites: usize,

        /// User sphere radius, for the synthetic generator
        #[arg(long, default_value_t = 1.0)]
        user_radius: f64,

        /// Satellite shell radius, for the synthetic generator (must exceed user_radius)
        #[arg(long, default_value_t = 1.1)]
        satellite_radius: f64,

        #[arg(long)]
        seed: Option<u64>,

        #[arg(long, default_value_t = 45.0)]
        user_angle_degrees: f64,

        #[arg(long, default_value_t = 10.0)]
        satellite_angle_degrees: f64,

        #[arg(long, default_value_t = 32)]
        beams_per_satellite: usize,

        #[arg(long, default_value_t = 2)]
        max_steps_multiplier: usize,

        /// Print the result as JSON instead of plain `satellite,user` lines
        #[arg(short, long)]
        json: bool,
    },
}

#[derive(Deserialize)]
struct Scenario {
    #[serde(default)]
    config: Config,
    users: Vec<[f64; 3]>,
    satellites: Vec<[f64; 3]>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            scenario,
            users,
            satellites,
            user_radius,
            satellite_radius,
            seed,
            user_angle_degrees,
            satellite_angle_degrees,
            beams_per_satellite,
            max_steps_multiplier,
            json,
        } => {
            let (user_coords, satellite_coords, cfg) = match scenario {
                Some(path) => load_scenario(&path)?,
                None => {
                    let cfg = Config {
                        user_angle_degrees,
                        satellite_angle_degrees,
                        beams_per_satellite,
                        max_steps_multiplier,
                        seed,
                    };
                    let (u, s) = generate_synthetic_scenario(
                        users,
                        satellites,
                        user_radius,
                        satellite_radius,
                        seed,
                    );
                    (u, s, cfg)
                }
            };

            info!(
                users = user_coords.len(),
                satellites = satellite_coords.len(),
                "starting assignment run"
            );

            let mut manager = Manager::new(&user_coords, &satellite_coords, cfg)?;
            let result = manager.run();

            if json {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                for (sat_id, user_id) in &result {
                    println!("{},{}", sat_id, user_id);
                }
            }

            info!(connections = result.len(), "assignment run complete");
        }
    }

    Ok(())
}

fn load_scenario(path: &PathBuf) -> Result<(Vec<[f64; 3]>, Vec<[f64; 3]>, Config)> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading scenario file {}", path.display()))?;
    let scenario: Scenario = toml::from_str(&text)
        .with_context(|| format!("parsing scenario file {}", path.display()))?;
    Ok((scenario.users, scenario.satellites, scenario.config))
}

/// Scatters `n` points uniformly on a sphere of radius `radius` using the
/// Marsaglia method. Standalone synthetic-scenario stand-in for whatever
/// constellation/user-distribution generator a real deployment supplies.
fn sample_sphere(n: usize, radius: f64, rng: &mut impl Rng) -> Vec<[f64; 3]> {
    (0..n)
        .map(|_| loop {
            let x1: f64 = rng.gen_range(-1.0..1.0);
            let x2: f64 = rng.gen_range(-1.0..1.0);
            let s = x1 * x1 + x2 * x2;
            if s < 1.0 {
                let factor = 2.0 * (1.0 - s).sqrt();
                break [
                    radius * x1 * factor,
                    radius * x2 * factor,
                    radius * (1.0 - 2.0 * s),
                ];
            }
        })
        .collect()
}

fn generate_synthetic_scenario(
    num_users: usize,
    num_satellites: usize,
    user_radius: f64,
    satellite_radius: f64,
    seed: Option<u64>,
) -> (Vec<[f64; 3]>, Vec<[f64; 3]>) {
    let mut rng = match seed {
        Some(s) => ChaCha8Rng::seed_from_u64(s),
        None => ChaCha8Rng::from_entropy(),
    };
    let users = sample_sphere(num_users, user_radius, &mut rng);
    let satellites = sample_sphere(num_satellites, satellite_radius, &mut rng);
    (users, satellites)
}
