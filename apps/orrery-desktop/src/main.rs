mod platform;

use anyhow::{Context, Result};
use clap::Parser;
use orrery_app::{AppConfig, Application};
use orrery_render_wgpu::WgpuBackend;
use platform::DesktopPlatform;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "orrery-desktop", about = "Solar system demo")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Directory with shaders, textures and the skybox
    #[arg(long, default_value = "data")]
    data_dir: PathBuf,

    /// YAML body table replacing the built-in solar system
    #[arg(long)]
    system: Option<PathBuf>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .init();

    tracing::info!("orrery-desktop starting");

    let config = AppConfig {
        system: cli.system,
        ..AppConfig::default().with_data_dir(cli.data_dir)
    };

    let mut platform = DesktopPlatform::new(&config.title, config.width, config.height)?;
    let window = platform
        .window()
        .context("could not initialize context!")?;
    let backend = WgpuBackend::new(window, config.width, config.height)?;

    let mut app = Application::new(config, backend)?;
    let result = app.run(&mut platform);
    app.destroy_resources();
    result?;

    tracing::info!(frames = app.frames(), "orrery-desktop finished");
    Ok(())
}
