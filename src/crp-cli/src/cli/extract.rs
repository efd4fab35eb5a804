//! Extract subcommand definitions

use clap::Args;
use std::path::PathBuf;

#[derive(Args, Debug)]
pub struct ExtractArgs {
    /// File containing a list of CRP files (one per line)
    #[arg(short, long)]
    pub input: PathBuf,

    /// Path to the dotnet executable (falls back to [extract] dotnet in the config)
    #[arg(short, long)]
    pub dotnet: Option<PathBuf>,

    /// Directory containing CrpParser.dll (falls back to [extract] parser_dir in the config)
    #[arg(short, long)]
    pub parser_dir: Option<PathBuf>,
}
