//! Kerning command: flattened table or a single expanded pair

use std::io::Write;

use anyhow::{bail, Result};
use serde::Serialize;

use fontext::FontSession;

use crate::cli::KerningArgs;
use crate::commands::load_font;

#[derive(Debug, Serialize)]
struct KernRow {
    first: String,
    second: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    value: Option<f64>,
}

pub fn run(args: &KerningArgs, session: &FontSession, out: &mut dyn Write) -> Result<()> {
    let font = load_font(session, &args.font)?;
    let (ext, fx) = (session.context(), session.extensions());
    let kerning = font.kerning();
    let flat = fx.flattened_kerning.get(ext, &kerning)?;

    let rows: Vec<KernRow> = match args.pair.as_deref() {
        Some([first, second]) => fx
            .flatten_pair
            .call(ext, &kerning, (first.clone(), second.clone()))?
            .into_iter()
            .map(|pair| KernRow {
                value: flat.get(&pair).copied(),
                first: pair.0,
                second: pair.1,
            })
            .collect(),
        Some(other) => bail!("--pair takes two sides, got {}", other.len()),
        None => flat
            .iter()
            .map(|((first, second), value)| KernRow {
                first: first.clone(),
                second: second.clone(),
                value: Some(*value),
            })
            .collect(),
    };

    if args.json {
        serde_json::to_writer_pretty(&mut *out, &rows)?;
        writeln!(out)?;
        return Ok(());
    }
    for row in &rows {
        match row.value {
            Some(value) => writeln!(out, "{} {} {}", row.first, row.second, value)?,
            None => writeln!(out, "{} {} -", row.first, row.second)?,
        }
    }
    Ok(())
}
