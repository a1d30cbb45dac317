use std::path::PathBuf;

pub use clap::{ArgAction, Parser, Subcommand};

#[derive(Parser, Debug)]
#[clap(version, disable_version_flag = true)]
pub struct Args {
    #[clap(subcommand)]
    pub command: Commands,

    /// Read settings from this file instead of the default config dir
    #[clap(long, short, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Print version
    #[clap(long, short = 'v', action = ArgAction::Version)]
    pub version: Option<bool>,
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Commands {
    /// Create a sub-project from the cloudt ice2 template
    #[clap(name = "create-sub", visible_alias = "create")]
    CreateSub,
}
