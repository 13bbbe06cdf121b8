use std::path::PathBuf;

use clap::Parser;
use xsnip::Config;
use xsnip::backend;
use xsnip::capture::CaptureOutcome;

#[derive(Parser, Debug)]
#[command(name = "xsnip")]
#[command(
    version,
    long_version = concat!(env!("CARGO_PKG_VERSION"), " (", env!("XSNIP_GIT_HASH"), ")"),
    about = "Interactive region screenshots for X11",
    long_about = "Interactive region screenshots for X11.\n\n\
        Drag with the left mouse button to copy the region to the clipboard,\n\
        or with the right mouse button to save it under ~/Pictures."
)]
struct Cli {
    /// Delay between pointer polls in milliseconds (overrides the config file)
    #[arg(long, value_name = "MS")]
    poll_interval: Option<u64>,

    /// Read settings from this file instead of ~/.config/xsnip/config.toml
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    if let Some(millis) = cli.poll_interval {
        config.set_poll_interval_ms(millis);
    }

    if std::env::var_os("DISPLAY").is_none() {
        log::error!("DISPLAY not set - xsnip requires an X11 session.");
        return Err(anyhow::anyhow!("DISPLAY not set; an X11 session is required"));
    }

    match backend::run_x11(&config)? {
        CaptureOutcome::Saved(result) => {
            log::info!(
                "Captured {}x{} region ({:?})",
                result.width,
                result.height,
                result.target.mode
            );
            println!("{}", result.target.path.display());
        }
        CaptureOutcome::Empty => log::info!("Empty selection, nothing written"),
    }

    Ok(())
}
