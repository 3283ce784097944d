use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use glam::Vec3;
use orrery_app::{AppConfig, Application, ScriptedPlatform};
use orrery_common::Time;
use orrery_kernel::{SolarSystem, SystemDesc};
use orrery_render::RecordingBackend;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "orrery-cli", about = "CLI tool for the orrery demo")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print crate info
    Info,
    /// Step the solar system and print where every body ends up
    Simulate {
        /// Simulated time in seconds
        #[arg(long, default_value = "10")]
        seconds: f32,
        /// Step length in milliseconds
        #[arg(long, default_value = "16")]
        step: i64,
        /// YAML body table replacing the built-in one
        #[arg(long)]
        system: Option<PathBuf>,
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Write shaders, textures and skybox faces into a data directory
    Scaffold {
        dir: PathBuf,
        /// YAML body table whose textures to generate
        #[arg(long)]
        system: Option<PathBuf>,
    },
    /// Run startup and a few frames without a GPU and print every backend call
    Trace {
        #[arg(long, default_value = "data")]
        data_dir: PathBuf,
        #[arg(short, long, default_value = "1")]
        frames: usize,
    },
}

#[derive(Debug, Serialize)]
struct BodyReport {
    name: String,
    position: Vec3,
    world: Vec3,
    scale: f32,
}

fn load_system(path: Option<&Path>) -> Result<SystemDesc> {
    match path {
        Some(path) => SystemDesc::load(path)
            .with_context(|| format!("loading body table {}", path.display())),
        None => Ok(SystemDesc::builtin()),
    }
}

fn simulate(desc: &SystemDesc, seconds: f32, step: i64) -> Result<Vec<BodyReport>> {
    anyhow::ensure!(step > 0, "step must be positive");
    let mut system = SolarSystem::new(desc)?;
    let dt = Time::from_millis(step);
    let steps = (seconds * 1000.0 / step as f32).round() as u64;
    for _ in 0..steps {
        system.advance(dt.as_seconds());
    }
    tracing::debug!(steps, "simulation finished");

    Ok(system
        .bodies()
        .iter()
        .zip(system.transforms())
        .map(|(body, transform)| BodyReport {
            name: body.name.clone(),
            position: body.position,
            world: transform.transform_point3(Vec3::ZERO),
            scale: body.scale,
        })
        .collect())
}

/// Runs startup and `frames` frames against the recording backend.
fn trace(data_dir: PathBuf, frames: usize) -> Result<Application<RecordingBackend>> {
    let config = AppConfig::default().with_data_dir(data_dir);
    let mut app = Application::new(config, RecordingBackend::new())?;
    app.run(&mut ScriptedPlatform::idle(frames))?;
    Ok(app)
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Info => {
            println!("orrery-cli v{}", env!("CARGO_PKG_VERSION"));
            println!("common: {}", orrery_common::crate_info());
            println!("input: {}", orrery_input::crate_info());
            println!("kernel: {}", orrery_kernel::crate_info());
            println!("assets: {}", orrery_assets::crate_info());
            println!("render: {}", orrery_render::crate_info());
            println!("render-wgpu: {}", orrery_render_wgpu::crate_info());
            println!("app: {}", orrery_app::crate_info());
        }
        Commands::Simulate {
            seconds,
            step,
            system,
            json,
        } => {
            let desc = load_system(system.as_deref())?;
            let report = simulate(&desc, seconds, step)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                println!("after {seconds}s in {step}ms steps:");
                for body in &report {
                    println!(
                        "  {:<10} x={:>9.3} y={:>9.3} z={:>9.3}",
                        body.name, body.world.x, body.world.y, body.world.z
                    );
                }
            }
        }
        Commands::Scaffold { dir, system } => {
            let desc = load_system(system.as_deref())?;
            orrery_assets::scaffold_data_dir(&dir, &desc.textures())?;
            println!("wrote data directory {}", dir.display());
        }
        Commands::Trace { data_dir, frames } => {
            let app = trace(data_dir, frames)?;
            for command in app.backend().commands() {
                println!("{command:?}");
            }
            println!(
                "frames={} draws={}",
                app.backend().frame_count(),
                app.backend().draw_count()
            );
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn simulate_reports_every_body() {
        let report = simulate(&SystemDesc::builtin(), 1.0, 16).unwrap();
        assert_eq!(report.len(), 10);
        assert_eq!(report[0].name, "sun");
        assert!(report[3].position.length() > 0.0);
    }

    #[test]
    fn simulate_rejects_zero_step() {
        assert!(simulate(&SystemDesc::builtin(), 1.0, 0).is_err());
    }

    #[test]
    fn trace_runs_against_scaffolded_data() {
        let dir = tempfile::tempdir().unwrap();
        orrery_assets::scaffold_data_dir(dir.path(), &SystemDesc::builtin().textures()).unwrap();

        let app = trace(dir.path().to_path_buf(), 2).unwrap();
        assert_eq!(app.frames(), 2);
        assert_eq!(app.backend().frame_count(), 2);
        assert!(app.backend().draw_count() > 0);
    }

    #[test]
    fn trace_fails_without_data() {
        let dir = tempfile::tempdir().unwrap();
        assert!(trace(dir.path().join("missing"), 1).is_err());
    }

    #[test]
    fn report_serializes_to_json() {
        let report = simulate(&SystemDesc::builtin(), 0.0, 16).unwrap();
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json[0]["name"], "sun");
        assert!(json[0]["world"].is_array());
    }
}
