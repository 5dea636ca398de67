//! Emberwood client entry point

mod host;
mod presenter;

use ember_core::SystemClock;
use ember_game::{Game, GameConfig, TomlZoneLoader, ZoneLoader};
use host::WinitHost;
use std::rc::Rc;
use thiserror::Error;

/// Fatal runtime errors.
#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("event loop error: {0}")]
    EventLoop(#[from] winit::error::EventLoopError),

    #[error("failed to create rendering surface: {0}")]
    CreateSurface(#[from] wgpu::CreateSurfaceError),

    #[error("no suitable graphics adapter")]
    NoAdapter,

    #[error("failed to acquire graphics device: {0}")]
    RequestDevice(#[from] wgpu::RequestDeviceError),

    #[error("surface configuration unsupported")]
    SurfaceConfig,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    if let Err(error) = run() {
        log::error!("{error}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "config.toml".to_string());
    let config = GameConfig::load(&config_path)?;

    let mut zones: Vec<Box<dyn ZoneLoader>> = Vec::with_capacity(config.zone_files.len());
    for zone_file in &config.zone_files {
        zones.push(Box::new(TomlZoneLoader::from_path(zone_file)?));
    }

    let clock = Rc::new(SystemClock::new());
    let mut game = Game::new(config.clone(), zones, clock)?;
    let mut host = WinitHost::new(&config)?;

    game.run(&mut host)?;
    Ok(())
}
