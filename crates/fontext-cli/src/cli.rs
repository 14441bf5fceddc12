//! CLI argument definitions using Clap v4

use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;

use fontext_core::OwnerKind;

/// fontext - cached font extensions from the command line
#[derive(Parser, Debug)]
#[command(name = "fontext")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Recompute cached extensions on every call (overrides FONTEXT_CACHE)
    #[arg(long = "no-cache", global = true, action = ArgAction::SetTrue)]
    pub no_cache: bool,

    /// Print cache statistics to stderr when done
    #[arg(long, global = true, action = ArgAction::SetTrue)]
    pub stats: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List the declared extensions and what invalidates them
    #[command(alias = "ls")]
    Extensions(ExtensionsArgs),

    /// Display a summary of a UFO font
    #[command(alias = "i")]
    Info(FontArgs),

    /// Print glyph anchors grouped by name
    Anchors(AnchorsArgs),

    /// Print the flattened kerning table, or the expansion of one pair
    Kerning(KerningArgs),

    /// Map text to glyphs with the font's character map
    Shape(ShapeArgs),

    /// Scale a font and write the result as a new UFO
    Scale(ScaleArgs),

    /// Install the extension manifest into a host plugin directory
    Install(InstallArgs),

    /// Remove a previous install
    Uninstall(PluginDirArgs),
}

#[derive(Parser, Debug)]
pub struct ExtensionsArgs {
    /// Only list extensions on one kind of owner: Font, Glyph, Kerning, Groups
    #[arg(long, value_parser = parse_owner_kind)]
    pub target: Option<OwnerKind>,

    /// Print JSON instead of a table
    #[arg(long)]
    pub json: bool,
}

#[derive(Parser, Debug)]
pub struct FontArgs {
    /// UFO source directory
    pub font: PathBuf,
}

#[derive(Parser, Debug)]
pub struct AnchorsArgs {
    /// UFO source directory
    pub font: PathBuf,

    /// Glyphs to report (all glyphs with anchors if omitted)
    pub glyphs: Vec<String>,

    #[arg(long)]
    pub json: bool,
}

#[derive(Parser, Debug)]
pub struct KerningArgs {
    /// UFO source directory
    pub font: PathBuf,

    /// Expand a single pair instead of the whole table
    #[arg(long, num_args = 2, value_names = ["FIRST", "SECOND"])]
    pub pair: Option<Vec<String>>,

    #[arg(long)]
    pub json: bool,
}

#[derive(Parser, Debug)]
pub struct ShapeArgs {
    /// UFO source directory
    pub font: PathBuf,

    /// Text to shape
    pub text: String,

    #[arg(long)]
    pub json: bool,
}

#[derive(Parser, Debug)]
pub struct ScaleArgs {
    /// UFO source directory
    pub font: PathBuf,

    /// Scale factor, e.g. 2.048 to go from 1000 to 2048 units per em
    #[arg(short = 'f', long)]
    pub factor: f64,

    /// Output UFO path
    #[arg(short = 'o', long = "output")]
    pub output: PathBuf,
}

#[derive(Parser, Debug)]
pub struct PluginDirArgs {
    /// Host plugin directory (defaults to FONTEXT_PLUGIN_DIR, then the user data dir)
    #[arg(long = "plugin-dir")]
    pub plugin_dir: Option<PathBuf>,
}

#[derive(Parser, Debug)]
pub struct InstallArgs {
    #[command(flatten)]
    pub dir: PluginDirArgs,

    /// Replace an existing install
    #[arg(long)]
    pub force: bool,
}

fn parse_owner_kind(name: &str) -> Result<OwnerKind, String> {
    OwnerKind::parse(name).ok_or_else(|| {
        let known: Vec<&str> = OwnerKind::ALL.iter().map(|k| k.as_str()).collect();
        format!("unknown owner kind `{}` (expected one of {})", name, known.join(", "))
    })
}
