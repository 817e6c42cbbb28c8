use std::path::PathBuf;

use anyhow::Context;
use blockfall_engine::{PieceSeed, SessionConfig};

use crate::util;

/// Options that build the [`SessionConfig`] of a game.
#[derive(Default, Debug, Clone, clap::Args)]
pub(crate) struct SessionConfigArg {
    /// Session configuration file (JSON); fields it omits keep their defaults
    #[clap(long)]
    config: Option<PathBuf>,
    /// Board width in cells
    #[clap(long)]
    width: Option<usize>,
    /// Board height in cells
    #[clap(long)]
    height: Option<usize>,
    /// Game logic ticks per second
    #[clap(long)]
    tick_rate: Option<u32>,
    /// Number of upcoming pieces shown next to the board
    #[clap(long)]
    preview: Option<usize>,
    /// Seed of the piece sequence, as 32 hex digits
    #[clap(long)]
    seed: Option<PieceSeed>,
}

impl SessionConfigArg {
    /// Reads the configuration file, if any, and applies the command line overrides.
    pub(crate) fn session_config(&self) -> anyhow::Result<SessionConfig> {
        let Self {
            config,
            width,
            height,
            tick_rate,
            preview,
            seed,
        } = self;

        let mut session_config = match config {
            Some(path) => util::read_config_file(path)?,
            None => SessionConfig::default(),
        };
        if let Some(width) = width {
            session_config.board_width = *width;
        }
        if let Some(height) = height {
            session_config.board_height = *height;
        }
        if let Some(tick_rate) = tick_rate {
            session_config.tick_rate = *tick_rate;
        }
        if let Some(preview) = preview {
            session_config.preview_len = *preview;
        }
        if seed.is_some() {
            session_config.seed = *seed;
        }

        session_config
            .validate()
            .context("Invalid session configuration")?;
        Ok(session_config)
    }
}
