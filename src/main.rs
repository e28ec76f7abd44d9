#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

use anyhow::Result;
use clap::Parser;
use hkexport::cli;
use hkexport::utils;

#[macro_use]
extern crate hkexport;

fn main() -> Result<()> {
    let cli = cli::Cli::parse();
    utils::init_logging(cli.verbose, cli.quiet);

    let config = cli.into_config();
    dlog!(
        "mode=extract export={} activity={} output={}",
        config.export.display(),
        config.activity,
        config.output.display()
    );

    let rows = hkexport::run(&config)?;
    if rows == 0 {
        tracing::warn!(activity = %config.activity, "no matching workouts in export");
    }

    println!("Data has been successfully saved to {}", config.output.display());
    Ok(())
}
