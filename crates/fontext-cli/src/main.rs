//! fontext CLI - inspect and transform UFO fonts through cached extensions

mod cli;
mod commands;

use std::io::Write;

use anyhow::Result;
use clap::Parser;

use fontext::FontSession;
use fontext_core::CacheConfig;

use cli::Cli;

fn cache_config(cli: &Cli) -> CacheConfig {
    let config = CacheConfig::from_env();
    if cli.no_cache {
        config.with_enabled(false)
    } else {
        config
    }
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let session = FontSession::new(cache_config(&cli))?;
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    commands::run(&cli.command, &session, &mut out)?;
    out.flush()?;

    if cli.stats {
        eprintln!("{}", session.metrics().report());
    }
    Ok(())
}
