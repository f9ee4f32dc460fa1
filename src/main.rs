use anyhow::Context;
use env_logger::Env;
use scenic::{DemoConfig, ScenicApp};

fn main() -> anyhow::Result<()> {
    let env = Env::default().default_filter_or("info,wgpu_core=warn,wgpu_hal=warn");
    env_logger::Builder::from_env(env).init();

    let config = DemoConfig::from_env().context("reading SCENIC_* configuration")?;
    log::info!(
        "Starting scenic: {} models, {} planets, seed {}",
        config.models.len(),
        config.planets.len(),
        config.orrery_seed
    );

    ScenicApp::new(config)?.run()
}
