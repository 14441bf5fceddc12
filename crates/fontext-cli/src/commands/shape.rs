//! Shape command

use std::io::Write;

use anyhow::Result;

use fontext::FontSession;

use crate::cli::ShapeArgs;
use crate::commands::load_font;

pub fn run(args: &ShapeArgs, session: &FontSession, out: &mut dyn Write) -> Result<()> {
    let font = load_font(session, &args.font)?;
    let run = session
        .extensions()
        .shape_text
        .call(session.context(), &font, args.text.clone())?;

    if args.json {
        serde_json::to_writer_pretty(&mut *out, &run)?;
        writeln!(out)?;
        return Ok(());
    }
    for glyph in &run.glyphs {
        writeln!(
            out,
            "{:<16} x={:<8} advance={:<8} cluster={}",
            glyph.name, glyph.x, glyph.advance, glyph.cluster
        )?;
    }
    writeln!(out, "advance width: {}", run.advance_width)?;
    Ok(())
}
