use std::path::PathBuf;

use crate::{command::session_config::SessionConfigArg, util::Output};

#[derive(Default, Debug, Clone, clap::Args)]
pub(crate) struct PrintConfigArg {
    #[clap(flatten)]
    session: SessionConfigArg,
    /// Output file path (defaults to stdout)
    #[clap(long)]
    output: Option<PathBuf>,
}

pub(crate) fn run(arg: &PrintConfigArg) -> anyhow::Result<()> {
    let PrintConfigArg { session, output } = arg;

    let config = session.session_config()?;
    Output::save_json(&config, output.clone())
}
