use clap::Parser;
use cli::Args;
use logging::setup_logging;
use takup_core::{
    config::{BuildConfig, FileConfig},
    run_build, BuildResult,
};
use takup_package::ApkFile;
use tracing::{debug, info};

mod cli;
mod logging;
mod utils;

fn handle_cli() -> BuildResult<()> {
    let args = Args::parse();

    if args.no_color {
        utils::set_color(false);
    }

    setup_logging(&args);

    let mut config = BuildConfig::new(&args.dir);
    if let Some(ref path) = args.config {
        config = config.merge(FileConfig::from_path(path)?);
    }
    let config = config.with_jobs(args.jobs);
    debug!(?config, "build configuration");

    let summary = run_build::<ApkFile>(&config)?;

    info!("");
    info!(
        "Successfully processed {} package(s)!",
        summary.records.len()
    );
    if summary.skipped() > 0 {
        info!("Skipped {} unreadable package(s)", summary.skipped());
    }
    info!("");
    info!("Files created:");
    info!("  - {}", summary.manifest_path.display());
    info!("  - {}", summary.archive_path.display());

    Ok(())
}

fn main() {
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(2)
                .build(),
        )
    }))
    .ok();

    if let Err(err) = handle_cli() {
        eprintln!("{:?}", miette::Report::new(err));
        std::process::exit(1);
    }
}
