//! Extensions command: what is declared and what invalidates it

use std::io::Write;

use anyhow::Result;

use fontext::FontSession;
use fontext_core::{DependencyDescriptor, ExtensionDescriptor};

use crate::cli::ExtensionsArgs;

pub fn run(args: &ExtensionsArgs, session: &FontSession, out: &mut dyn Write) -> Result<()> {
    let descriptors: Vec<&ExtensionDescriptor> = session
        .context()
        .registry()
        .iter()
        .filter(|d| !matches!(args.target, Some(target) if target != d.target))
        .collect();

    if args.json {
        serde_json::to_writer_pretty(&mut *out, &descriptors)?;
        writeln!(out)?;
        return Ok(());
    }

    for descriptor in descriptors {
        let dependencies: Vec<String> = descriptor.dependencies.iter().map(describe).collect();
        let dependencies = if dependencies.is_empty() {
            "-".to_string()
        } else {
            dependencies.join(", ")
        };
        writeln!(
            out,
            "{:<8} {:<22} {:<16} {}",
            descriptor.target.as_str(),
            descriptor.name,
            descriptor.kind.as_str(),
            dependencies
        )?;
    }
    Ok(())
}

fn describe(dependency: &DependencyDescriptor) -> String {
    match dependency.via {
        Some(via) => format!("{} (via {})", dependency.event, via),
        None => dependency.event.to_string(),
    }
}
