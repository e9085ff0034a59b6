//! lastfm-titlecase-package - Build store archives for the extension
//!
//! Run from the extension root with no arguments to write
//! `lastfm-titlecase-{chrome,edge,firefox}.zip` next to `manifest.json`.

use clap::Parser;
use tracing_subscriber::EnvFilter;

mod package;

#[derive(Parser)]
#[command(name = "lastfm-titlecase-package")]
#[command(author, version, about = "Package the extension for each browser store", long_about = None)]
struct Cli {
    /// Extension source directory (default: current directory)
    #[arg(short = 'C', long = "dir")]
    dir: Option<String>,

    /// Directory to write archives to (default: the source directory)
    #[arg(short, long)]
    out_dir: Option<String>,

    /// Only package these platforms (chrome, edge, firefox); repeatable
    #[arg(short, long = "platform")]
    platforms: Vec<String>,

    /// TOML file overriding the output directory or platforms
    #[arg(short, long)]
    config: Option<String>,

    /// Re-open each archive and check it against its sources
    #[arg(long)]
    verify: bool,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    package::run(package::Options {
        dir: cli.dir,
        out_dir: cli.out_dir,
        platforms: cli.platforms,
        config: cli.config,
        verify: cli.verify,
    })
}
