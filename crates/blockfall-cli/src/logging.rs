use std::{fs::File, path::Path};

use anyhow::Context;
use env_logger::{Builder, Env, Target};

/// Sends log records to `path`; `RUST_LOG` selects the level, `info` by default.
///
/// The terminal is owned by the game screen, so without a log file nothing is
/// logged at all.
pub fn init(path: Option<&Path>) -> anyhow::Result<()> {
    let Some(path) = path else {
        return Ok(());
    };
    let file = File::create(path)
        .with_context(|| format!("Failed to create log file: {}", path.display()))?;

    Builder::from_env(Env::default().default_filter_or("info"))
        .target(Target::Pipe(Box::new(file)))
        .try_init()
        .context("Failed to initialize logger")?;
    log::info!("logging to {}", path.display());
    Ok(())
}
