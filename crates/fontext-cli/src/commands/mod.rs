//! Subcommand implementations
//!
//! Every command writes its report to `out` so the binary and the tests
//! share one code path.

pub mod anchors;
pub mod extensions;
pub mod info;
pub mod install;
pub mod kerning;
pub mod scale;
pub mod shape;

use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};

use fontext::FontSession;
use fontext_host::Font;

use crate::cli::Commands;

pub fn run(command: &Commands, session: &FontSession, out: &mut dyn Write) -> Result<()> {
    match command {
        Commands::Extensions(args) => extensions::run(args, session, out),
        Commands::Info(args) => info::run(args, session, out),
        Commands::Anchors(args) => anchors::run(args, session, out),
        Commands::Kerning(args) => kerning::run(args, session, out),
        Commands::Shape(args) => shape::run(args, session, out),
        Commands::Scale(args) => scale::run(args, session, out),
        Commands::Install(args) => install::run_install(args, session, out),
        Commands::Uninstall(args) => install::run_uninstall(args, out),
    }
}

pub(crate) fn load_font(session: &FontSession, path: &Path) -> Result<Font> {
    session
        .load_ufo(path)
        .with_context(|| format!("failed to load {}", path.display()))
}
