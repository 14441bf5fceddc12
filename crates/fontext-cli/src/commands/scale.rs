//! Scale command: scale_font, then write a new UFO

use std::io::Write;

use anyhow::{Context, Result};

use fontext::FontSession;

use crate::cli::ScaleArgs;
use crate::commands::load_font;

pub fn run(args: &ScaleArgs, session: &FontSession, out: &mut dyn Write) -> Result<()> {
    let font = load_font(session, &args.font)?;
    let scaled = session
        .extensions()
        .scale_font
        .call(session.context(), &font, args.factor)?;
    font.write_ufo(&args.output)
        .with_context(|| format!("failed to write {}", args.output.display()))?;
    writeln!(
        out,
        "Scaled {} glyphs by {} into {} ({} units per em)",
        scaled,
        args.factor,
        args.output.display(),
        font.units_per_em()
    )?;
    Ok(())
}
