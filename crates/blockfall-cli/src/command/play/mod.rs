use std::path::PathBuf;

use anyhow::Context;
use blockfall_engine::GameSession;

use crate::{command::session_config::SessionConfigArg, logging, tui::Tui};

use self::app::PlayApp;

mod app;

#[derive(Default, Debug, Clone, clap::Args)]
pub(crate) struct PlayArg {
    #[clap(flatten)]
    session: SessionConfigArg,
    /// Write log records to this file (level from RUST_LOG, default info)
    #[clap(long)]
    log_file: Option<PathBuf>,
}

pub(crate) fn run(arg: &PlayArg) -> anyhow::Result<()> {
    let PlayArg { session, log_file } = arg;

    logging::init(log_file.as_deref())?;

    let mut config = session.session_config()?;
    let seed = *config.seed.get_or_insert_with(rand::random);
    log::info!("starting game with piece seed {seed}");

    let session = GameSession::new(config).context("Failed to start game session")?;
    let mut app = PlayApp::new(session);
    Tui::new().run(&mut app)?;

    let session = app.session();
    let stats = session.stats();
    log::info!(
        "session ended after {:.1}s: score {}, lines {}, pieces {}",
        session.duration().as_secs_f64(),
        stats.score(),
        stats.lines(),
        stats.settled_pieces()
    );
    Ok(())
}
