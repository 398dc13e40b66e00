mod app;
mod color;
mod config;
mod data;
mod embed;
mod error;
mod export;
mod pipeline;
mod state;
mod ui;

use clap::Parser;

use config::Config;
use embed::TsneEmbedder;

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = Config::parse();
    log::debug!("{config:?}");

    let output_path = config.output_path();
    pipeline::run(&config, &TsneEmbedder::default(), |result| {
        if let Err(e) = app::show(result.clone(), output_path.clone()) {
            log::warn!("Could not open the plot window: {e}");
        }
    })?;
    Ok(())
}
