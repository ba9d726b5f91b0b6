//! CLI Argument Parsing
//!
//! One positional argument (the script to keep alive) and one flag.
//! Everything else comes from `iterast.toml` or `ITERAST_*` variables.

use std::path::PathBuf;

use clap::Parser;

/// iterast - keep a script's state alive while you edit it
#[derive(Parser, Debug)]
#[command(name = "iterast")]
#[command(author, version, about, long_about = None)]
#[command(after_help = "Type 'r' and Enter to force a full reload. Ctrl+C stops watching.")]
pub struct Cli {
    /// Script to watch and re-run
    pub script: PathBuf,

    /// Do not clear the screen before logging [reset]
    #[arg(long)]
    pub no_clear: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_script_only() {
        let cli = Cli::try_parse_from(["iterast", "main.it"]).unwrap();
        assert_eq!(cli.script, PathBuf::from("main.it"));
        assert!(!cli.no_clear);
    }

    #[test]
    fn test_parse_no_clear() {
        let cli = Cli::try_parse_from(["iterast", "--no-clear", "main.it"]).unwrap();
        assert!(cli.no_clear);
    }

    #[test]
    fn test_script_is_required() {
        assert!(Cli::try_parse_from(["iterast"]).is_err());
    }

    #[test]
    fn test_unknown_flag_is_rejected() {
        assert!(Cli::try_parse_from(["iterast", "--json", "main.it"]).is_err());
    }
}
