use std::path::PathBuf;

use clap::{ArgAction, Parser, ValueHint};

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about,
    help_template = "{before-help}{name} {version}
{author-with-newline}{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}"
)]
pub struct Args {
    /// Directory holding the APKs; product.inf and product.infz are written here
    #[arg(default_value = ".", value_hint = ValueHint::DirPath)]
    pub dir: PathBuf,

    /// Set output verbosity
    #[arg(short = 'v', long, action = ArgAction::Count)]
    pub verbose: u8,

    /// Suppress outputs
    #[arg(short, long)]
    pub quiet: bool,

    /// Output as json
    #[arg(long)]
    pub json: bool,

    /// Disable colors in output
    #[arg(long)]
    pub no_color: bool,

    /// Provide custom config file
    #[arg(short, long, value_hint = ValueHint::FilePath)]
    pub config: Option<PathBuf>,

    /// Number of packages to read in parallel
    #[arg(short, long)]
    pub jobs: Option<usize>,
}
