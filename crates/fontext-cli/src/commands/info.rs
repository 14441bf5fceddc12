//! Info command implementation
//!
//! Displays a summary of a font, read through the cached extensions.

use std::io::Write;

use anyhow::Result;

use fontext::FontSession;

use crate::cli::FontArgs;
use crate::commands::load_font;

pub fn run(args: &FontArgs, session: &FontSession, out: &mut dyn Write) -> Result<()> {
    let font = load_font(session, &args.font)?;
    let (ext, fx) = (session.context(), session.extensions());
    let info = font.info();
    let kerning = font.kerning();

    let cmap = fx.unicode_map.get(ext, &font)?;
    let flat = fx.flattened_kerning.get(ext, &kerning)?;
    let with_anchors = font
        .glyphs()
        .iter()
        .map(|glyph| fx.anchors_map.get(ext, glyph))
        .collect::<fontext_core::Result<Vec<_>>>()?
        .iter()
        .filter(|anchors| !anchors.is_empty())
        .count();

    writeln!(out, "Font:           {}", info.display_name())?;
    writeln!(out, "Units per em:   {}", info.units_per_em)?;
    if let (Some(ascender), Some(descender)) = (info.ascender, info.descender) {
        writeln!(out, "Ascender:       {}", ascender)?;
        writeln!(out, "Descender:      {}", descender)?;
    }
    writeln!(out, "Glyphs:         {}", font.len())?;
    writeln!(out, "Encoded chars:  {}", cmap.len())?;
    writeln!(out, "With anchors:   {}", with_anchors)?;
    writeln!(out, "Groups:         {}", font.groups().len())?;
    writeln!(
        out,
        "Kerning:        {} entries, {} glyph pairs",
        kerning.len(),
        flat.len()
    )?;
    Ok(())
}
