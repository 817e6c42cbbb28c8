use clap::{Parser, Subcommand};

use self::{play::PlayArg, print_config::PrintConfigArg};

mod play;
mod print_config;
mod session_config;

#[derive(Debug, Clone, Parser)]
#[command(author, version, about, long_about = None)]
pub struct CommandArgs {
    /// What mode to run the program in
    #[command(subcommand)]
    mode: Option<Mode>,
}

#[derive(Debug, Clone, Subcommand)]
enum Mode {
    /// Play a game in the terminal (the default)
    Play(#[clap(flatten)] PlayArg),
    /// Print the effective session configuration as JSON
    PrintConfig(#[clap(flatten)] PrintConfigArg),
}

pub fn run() -> anyhow::Result<()> {
    let args = CommandArgs::parse();
    match args.mode.unwrap_or(Mode::Play(PlayArg::default())) {
        Mode::Play(arg) => play::run(&arg)?,
        Mode::PrintConfig(arg) => print_config::run(&arg)?,
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_command_definition() {
        CommandArgs::command().debug_assert();
    }

    #[test]
    fn test_play_is_default() {
        let args = CommandArgs::try_parse_from(["blockfall"]).unwrap();
        assert!(args.mode.is_none());
    }

    #[test]
    fn test_parse_seed() {
        let args = CommandArgs::try_parse_from([
            "blockfall",
            "play",
            "--width",
            "12",
            "--seed",
            "000102030405060708090a0b0c0d0e0f",
        ])
        .unwrap();
        assert!(matches!(args.mode, Some(Mode::Play(_))));

        let bad = CommandArgs::try_parse_from(["blockfall", "play", "--seed", "xyz"]);
        assert!(bad.is_err());
    }

    #[test]
    fn test_parse_print_config() {
        let args =
            CommandArgs::try_parse_from(["blockfall", "print-config", "--preview", "2"]).unwrap();
        assert!(matches!(args.mode, Some(Mode::PrintConfig(_))));
    }
}
