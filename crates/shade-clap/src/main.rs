//! `shade` - view and change the appearance preference from a terminal.

mod cli;
mod commands;
mod logging;

use clap::Parser;

fn main() -> anyhow::Result<()> {
    logging::init_logging();
    commands::run(cli::Cli::parse())
}
