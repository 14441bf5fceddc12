//! CLI Smoke Tests
//!
//! Runs the `fontext` binary against a small UFO written to a temp dir.

use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use std::sync::Arc;

use fontext_core::EventBus;
use fontext_host::{Anchor, Contour, Font, GlyphData};

fn fontext(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_fontext"))
        .args(args)
        .env_remove("FONTEXT_CACHE")
        .env_remove("FONTEXT_PLUGIN_DIR")
        .output()
        .expect("Failed to execute fontext")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

/// "a" (anchors, 'a'), "a.alt" and "b" ('b'); group A = [a, a.alt]; A/b kerned
fn write_sample(dir: &Path) -> PathBuf {
    let font = Font::new(Arc::new(EventBus::new()));
    font.add_glyph(
        GlyphData::new("a")
            .with_width(500.0)
            .with_unicodes(['a'])
            .with_contour(Contour::rect(0.0, 0.0, 400.0, 500.0))
            .with_anchor(Anchor::new("top", 200.0, 700.0)),
    )
    .unwrap();
    font.add_glyph(GlyphData::new("a.alt").with_width(500.0))
        .unwrap();
    font.add_glyph(
        GlyphData::new("b")
            .with_width(600.0)
            .with_unicodes(['b'])
            .with_contour(Contour::rect(0.0, 0.0, 500.0, 700.0)),
    )
    .unwrap();
    font.groups().set("public.kern1.A", ["a", "a.alt"]);
    font.kerning().set("public.kern1.A", "b", -30.0);

    let path = dir.join("Sample.ufo");
    font.write_ufo(&path).unwrap();
    path
}

#[test]
fn test_extensions_json_lists_everything() {
    let output = fontext(&["extensions", "--json"]);
    assert!(output.status.success());
    let listed: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(listed.as_array().map(Vec::len), Some(11));
}

#[test]
fn test_extensions_filtered_by_target() {
    let output = fontext(&["extensions", "--target", "Kerning"]);
    assert!(output.status.success());
    let text = stdout(&output);
    assert_eq!(text.lines().count(), 2);
    assert!(text.contains("Groups.Changed (via groups)"));
}

#[test]
fn test_info_summarizes_the_font() {
    let dir = tempfile::tempdir().unwrap();
    let font = write_sample(dir.path());
    let output = fontext(&["info", font.to_str().unwrap()]);
    assert!(output.status.success());
    let text = stdout(&output);
    assert!(text.contains("Glyphs:         3"));
    assert!(text.contains("Encoded chars:  2"));
    assert!(text.contains("1 entries, 2 glyph pairs"));
}

#[test]
fn test_kerning_pair_expands_group() {
    let dir = tempfile::tempdir().unwrap();
    let font = write_sample(dir.path());
    let output = fontext(&[
        "kerning",
        font.to_str().unwrap(),
        "--pair",
        "public.kern1.A",
        "b",
    ]);
    assert!(output.status.success());
    assert_eq!(stdout(&output), "a b -30\na.alt b -30\n");
}

#[test]
fn test_anchors_and_shape() {
    let dir = tempfile::tempdir().unwrap();
    let font = write_sample(dir.path());

    let output = fontext(&["anchors", font.to_str().unwrap()]);
    assert!(output.status.success());
    assert_eq!(stdout(&output), "a: top (200, 700)\n");

    let output = fontext(&["shape", font.to_str().unwrap(), "ab", "--json"]);
    assert!(output.status.success());
    let run: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(run["advance_width"], 1100.0);
    assert_eq!(run["glyphs"][1]["name"], "b");
}

#[test]
fn test_scale_writes_a_new_ufo() {
    let dir = tempfile::tempdir().unwrap();
    let font = write_sample(dir.path());
    let scaled = dir.path().join("Scaled.ufo");
    let output = fontext(&[
        "scale",
        font.to_str().unwrap(),
        "--factor",
        "2",
        "-o",
        scaled.to_str().unwrap(),
        "--stats",
    ]);
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Cache Performance"));

    let loaded = Font::load_ufo(&scaled, Arc::new(EventBus::new())).unwrap();
    assert_eq!(loaded.units_per_em(), 2000.0);
    assert_eq!(loaded.glyph("b").unwrap().width(), 1200.0);
    assert_eq!(loaded.kerning().get("public.kern1.A", "b"), Some(-60.0));
}

#[test]
fn test_install_and_uninstall() {
    let dir = tempfile::tempdir().unwrap();
    let plugins = dir.path().to_str().unwrap();

    let output = fontext(&["install", "--plugin-dir", plugins]);
    assert!(output.status.success());
    assert!(dir.path().join("fontext").join("manifest.json").is_file());

    // A second install needs --force
    assert!(!fontext(&["install", "--plugin-dir", plugins]).status.success());
    assert!(fontext(&["install", "--plugin-dir", plugins, "--force"])
        .status
        .success());

    let output = fontext(&["uninstall", "--plugin-dir", plugins]);
    assert!(output.status.success());
    assert!(!dir.path().join("fontext").exists());
}

#[test]
fn test_missing_font_fails() {
    let output = fontext(&["info", "/definitely/not/here.ufo"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("failed to load"));
}
