//! Core CLI definitions

use clap::{ArgGroup, Parser, Subcommand};
use std::path::PathBuf;

use super::extract::ExtractArgs;

#[derive(Parser, Debug)]
#[command(name = "crp")]
#[command(about = "Organize extracted CRP assets into instances", long_about = None)]
#[command(version)]
#[command(group(ArgGroup::new("source").args(["input", "file"])))]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Directory containing extracted CRP files
    #[arg(short, long)]
    pub input: Option<PathBuf>,

    /// File containing a list of extracted CRP folders (one per line)
    #[arg(short, long)]
    pub file: Option<PathBuf>,

    /// Output directory for organized files (default: <input>/organized)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Show detailed processing information
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to config file (default: <config dir>/crp/config.toml)
    #[arg(long, global = true, env = "CRP_CONFIG")]
    pub config: Option<PathBuf>,

    /// Extraction-index distance for the nearby-texture fallback (0 disables it)
    #[arg(long)]
    pub proximity_window: Option<u64>,

    /// Fail when manifest assets and entry files don't line up one to one
    #[arg(long)]
    pub strict: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the external CRP extractor over a list of .crp files
    #[command(visible_alias = "x")]
    Extract(ExtractArgs),
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_input_and_file_conflict() {
        let result = Cli::try_parse_from(["crp", "--input", "a", "--file", "b"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_single_directory_args() {
        let cli = Cli::try_parse_from(["crp", "-i", "in", "-o", "out", "-v"]).unwrap();
        assert_eq!(cli.input, Some(PathBuf::from("in")));
        assert_eq!(cli.output, Some(PathBuf::from("out")));
        assert!(cli.verbose);
        assert!(cli.command.is_none());
    }

    #[test]
    fn test_extract_subcommand() {
        let cli = Cli::try_parse_from([
            "crp", "extract", "-i", "list.txt", "-d", "/usr/bin/dotnet", "-p", "/opt/crp",
        ])
        .unwrap();
        match cli.command {
            Some(Commands::Extract(args)) => {
                assert_eq!(args.input, PathBuf::from("list.txt"));
                assert_eq!(args.dotnet, Some(PathBuf::from("/usr/bin/dotnet")));
                assert_eq!(args.parser_dir, Some(PathBuf::from("/opt/crp")));
            }
            None => panic!("expected extract subcommand"),
        }
    }
}
