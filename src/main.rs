mod calendar;
mod cli;
mod commands;
mod config;
mod form;
mod layout;
mod logging;
mod model;
mod planner;
mod scroll;
mod storage;
mod store;
mod ui;
mod validate;
mod window;

use anyhow::Result;
use clap::Parser;

fn main() -> Result<()> {
    let args = cli::Cli::parse();
    let config = commands::prepare(&args)?;
    // init must not depend on the seed it is about to write
    if let Some(cli::Command::Init { force }) = args.command {
        return commands::init(force);
    }
    let ctx = commands::Context::load(&args, config)?;
    let command = args.command.unwrap_or(cli::Command::Tui);
    match command {
        cli::Command::Init { force } => commands::init(force),
        cli::Command::Lanes { lane, status } => commands::lanes(&ctx, lane, status),
        cli::Command::Layout { view, viewport } => commands::layout(&ctx, view, viewport),
        cli::Command::Check {
            lane,
            start,
            end,
            task,
        } => commands::check(&ctx, lane, start, end, task),
        cli::Command::Tui => commands::tui(ctx),
    }
}
