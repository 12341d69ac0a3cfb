mod app;

use anyhow::Context;
use clap::Parser;
use winit::event_loop::{ControlFlow, EventLoop};

use fbm_terrain::terrain::{TerrainParameters, TerrainSettings};

/// fBm terrain - GPU-displaced height field with live parameter tuning
#[derive(Parser, Debug)]
#[command(name = "fbm-terrain", version, about)]
struct Cli {
    /// Window width in pixels
    #[arg(long, default_value_t = 1024)]
    width: u32,

    /// Window height in pixels
    #[arg(long, default_value_t = 768)]
    height: u32,

    /// Grid tessellation per axis (1-255)
    #[arg(long, default_value_t = 255)]
    resolution: u32,

    /// Initial fBm parameters as JSON, e.g. '{"h":0.8,"octaves":8}'
    #[arg(long, value_name = "JSON")]
    params: Option<String>,

    /// Run without the parameter overlay
    #[arg(long)]
    no_overlay: bool,
}

impl Cli {
    fn into_config(self) -> anyhow::Result<app::AppConfig> {
        let params = match &self.params {
            Some(json) => serde_json::from_str::<TerrainParameters>(json)
                .context("invalid --params JSON")?,
            None => TerrainParameters::default(),
        };

        Ok(app::AppConfig {
            width: self.width,
            height: self.height,
            terrain: TerrainSettings {
                resolution: self.resolution,
                params,
                ..Default::default()
            },
            overlay: !self.no_overlay,
        })
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let config = Cli::parse().into_config()?;

    let event_loop = EventLoop::new().context("failed to create event loop")?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = app::App::new(config);
    event_loop
        .run_app(&mut app)
        .context("event loop terminated abnormally")?;

    match app.init_error.take() {
        Some(e) => Err(e),
        None => Ok(()),
    }
}
