//! Install and uninstall into a host plugin directory
//!
//! An install is a `fontext/` folder inside the plugin directory holding a
//! `manifest.json` and one descriptor file per owner kind. Every file is
//! attempted; the ones that fail go on a retry list, are tried once more
//! after the rest, and whatever still fails is reported as a warning rather
//! than aborting the install.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, bail, Result};
use serde::Serialize;

use fontext::FontSession;
use fontext_core::{ExtensionDescriptor, ExtensionRegistry, OwnerKind};

use crate::cli::{InstallArgs, PluginDirArgs};

pub const PLUGIN_NAME: &str = "fontext";
pub const PLUGIN_DIR_ENV: &str = "FONTEXT_PLUGIN_DIR";
const MANIFEST: &str = "manifest.json";

#[derive(Debug, Serialize)]
struct Manifest<'a> {
    name: &'a str,
    version: &'a str,
    extensions: Vec<String>,
}

/// One file of an install, relative to the plugin folder
#[derive(Debug, Clone)]
pub struct Component {
    pub path: PathBuf,
    pub contents: String,
}

#[derive(Debug, Default)]
pub struct InstallReport {
    pub installed: Vec<PathBuf>,
    pub failed: Vec<(PathBuf, String)>,
}

/// Files describing the extensions of `registry`
pub fn components(registry: &ExtensionRegistry) -> Result<Vec<Component>> {
    let manifest = Manifest {
        name: PLUGIN_NAME,
        version: env!("CARGO_PKG_VERSION"),
        extensions: registry
            .iter()
            .map(|d| format!("{}.{}", d.target, d.name))
            .collect(),
    };
    let mut components = vec![Component {
        path: PathBuf::from(MANIFEST),
        contents: serde_json::to_string_pretty(&manifest)?,
    }];

    for kind in OwnerKind::ALL {
        let descriptors: Vec<&ExtensionDescriptor> = registry.for_target(kind).collect();
        if descriptors.is_empty() {
            continue;
        }
        components.push(Component {
            path: Path::new("extensions").join(format!("{}.json", kind.as_str().to_lowercase())),
            contents: serde_json::to_string_pretty(&descriptors)?,
        });
    }
    Ok(components)
}

fn write_component(root: &Path, component: &Component) -> std::io::Result<PathBuf> {
    let target = root.join(&component.path);
    if let Some(parent) = target.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(&target, &component.contents)?;
    Ok(target)
}

/// Write every component under `root`, retrying failures once
pub fn install(root: &Path, components: &[Component]) -> InstallReport {
    let mut report = InstallReport::default();
    let mut retry = Vec::new();

    for component in components {
        match write_component(root, component) {
            Ok(path) => report.installed.push(path),
            Err(err) => {
                log::debug!("{} failed, will retry: {}", component.path.display(), err);
                retry.push(component);
            }
        }
    }

    for component in retry {
        match write_component(root, component) {
            Ok(path) => report.installed.push(path),
            Err(err) => {
                log::warn!("could not install {}: {}", component.path.display(), err);
                report.failed.push((component.path.clone(), err.to_string()));
            }
        }
    }
    report
}

/// Remove the plugin folder; false when nothing was installed
pub fn uninstall(root: &Path) -> std::io::Result<bool> {
    if !root.exists() {
        return Ok(false);
    }
    fs::remove_dir_all(root)?;
    Ok(true)
}

pub fn plugin_root(args: &PluginDirArgs) -> Result<PathBuf> {
    let dir = match &args.plugin_dir {
        Some(dir) => dir.clone(),
        None => std::env::var_os(PLUGIN_DIR_ENV)
            .map(PathBuf::from)
            .or_else(|| dirs::data_dir().map(|dir| dir.join("fontext").join("plugins")))
            .ok_or_else(|| anyhow!("no plugin directory; pass --plugin-dir or set {}", PLUGIN_DIR_ENV))?,
    };
    Ok(dir.join(PLUGIN_NAME))
}

pub fn run_install(args: &InstallArgs, session: &FontSession, out: &mut dyn Write) -> Result<()> {
    let root = plugin_root(&args.dir)?;
    if root.join(MANIFEST).exists() && !args.force {
        bail!(
            "{} is already installed in {} (use --force to replace it)",
            PLUGIN_NAME,
            root.display()
        );
    }
    if args.force && uninstall(&root)? {
        log::info!("removed previous install at {}", root.display());
    }

    let report = install(&root, &components(session.context().registry())?);
    writeln!(
        out,
        "Installed {} files into {}",
        report.installed.len(),
        root.display()
    )?;
    for (path, err) in &report.failed {
        writeln!(out, "warning: {} not installed: {}", path.display(), err)?;
    }
    Ok(())
}

pub fn run_uninstall(args: &PluginDirArgs, out: &mut dyn Write) -> Result<()> {
    let root = plugin_root(args)?;
    if uninstall(&root)? {
        writeln!(out, "Removed {}", root.display())?;
    } else {
        log::warn!("nothing installed at {}", root.display());
        writeln!(out, "Nothing installed at {}", root.display())?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use fontext_core::CacheConfig;

    fn registry_components() -> Vec<Component> {
        let session = FontSession::new(CacheConfig::default()).unwrap();
        components(session.context().registry()).unwrap()
    }

    #[test]
    fn manifest_first_then_one_file_per_kind() {
        let components = registry_components();
        let paths: Vec<String> = components
            .iter()
            .map(|c| c.path.to_string_lossy().replace('\\', "/"))
            .collect();
        assert_eq!(
            paths,
            vec![
                "manifest.json",
                "extensions/font.json",
                "extensions/glyph.json",
                "extensions/kerning.json",
            ]
        );
        assert!(components[0].contents.contains("\"Kerning.flatten_pair\""));
        assert!(components[3].contents.contains("Groups.Changed"));
    }

    #[test]
    fn install_then_uninstall() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join(PLUGIN_NAME);
        let components = registry_components();

        let report = install(&root, &components);
        assert!(report.failed.is_empty());
        assert_eq!(report.installed.len(), components.len());
        assert!(root.join("manifest.json").is_file());

        assert!(uninstall(&root).unwrap());
        assert!(!root.exists());
        assert!(!uninstall(&root).unwrap());
    }

    #[test]
    fn force_replaces_the_previous_install() {
        let dir = tempfile::tempdir().unwrap();
        let session = FontSession::new(CacheConfig::default()).unwrap();
        let args = |force| InstallArgs {
            dir: PluginDirArgs {
                plugin_dir: Some(dir.path().to_path_buf()),
            },
            force,
        };
        let root = dir.path().join(PLUGIN_NAME);

        run_install(&args(false), &session, &mut Vec::new()).unwrap();
        // A descriptor the current registry no longer produces
        let leftover = root.join("extensions").join("contour.json");
        fs::write(&leftover, "[]").unwrap();

        assert!(run_install(&args(false), &session, &mut Vec::new()).is_err());
        assert!(leftover.is_file());

        let mut out = Vec::new();
        run_install(&args(true), &session, &mut out).unwrap();
        assert!(!leftover.exists());
        assert!(root.join(MANIFEST).is_file());
        assert!(String::from_utf8(out).unwrap().starts_with("Installed 4 files"));
    }

    #[test]
    fn failures_become_warnings_not_errors() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join(PLUGIN_NAME);
        // A directory where a descriptor file should go cannot be overwritten
        fs::create_dir_all(root.join("extensions").join("glyph.json")).unwrap();

        let components = registry_components();
        let report = install(&root, &components);
        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].0, Path::new("extensions").join("glyph.json"));
        assert_eq!(report.installed.len(), components.len() - 1);
    }
}
