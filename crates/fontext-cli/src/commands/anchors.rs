//! Anchors command: anchors_map for some or all glyphs

use std::collections::BTreeMap;
use std::io::Write;

use anyhow::{anyhow, Result};

use fontext::FontSession;

use crate::cli::AnchorsArgs;
use crate::commands::load_font;

pub fn run(args: &AnchorsArgs, session: &FontSession, out: &mut dyn Write) -> Result<()> {
    let font = load_font(session, &args.font)?;
    let (ext, fx) = (session.context(), session.extensions());

    let glyphs = if args.glyphs.is_empty() {
        font.glyphs()
    } else {
        args.glyphs
            .iter()
            .map(|name| {
                font.glyph(name)
                    .ok_or_else(|| anyhow!("no glyph named `{}`", name))
            })
            .collect::<Result<Vec<_>>>()?
    };

    let mut report: BTreeMap<String, BTreeMap<String, Vec<[f64; 2]>>> = BTreeMap::new();
    for glyph in &glyphs {
        let anchors = fx.anchors_map.get(ext, glyph)?;
        if anchors.is_empty() && args.glyphs.is_empty() {
            continue;
        }
        let positions = anchors
            .iter()
            .map(|(name, points)| (name.clone(), points.iter().map(|p| [p.x, p.y]).collect()))
            .collect();
        report.insert(glyph.name(), positions);
    }

    if args.json {
        serde_json::to_writer_pretty(&mut *out, &report)?;
        writeln!(out)?;
        return Ok(());
    }

    for (glyph, anchors) in &report {
        let listed: Vec<String> = anchors
            .iter()
            .map(|(name, points)| {
                let points: Vec<String> = points
                    .iter()
                    .map(|[x, y]| format!("({}, {})", x, y))
                    .collect();
                format!("{} {}", name, points.join(" "))
            })
            .collect();
        writeln!(out, "{}: {}", glyph, listed.join("; "))?;
    }
    Ok(())
}
