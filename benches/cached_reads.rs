//! Cached read path - what a redraw pays for derived font data
//!
//! Compares a warm cache hit against the same extension with caching
//! disabled, and measures the cost of an edit followed by a recompute.

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use fontext::host::{Anchor, Contour, Font, GlyphData};
use fontext::FontSession;
use fontext_core::CacheConfig;

/// 26 glyphs with outlines and anchors, grouped and kerned against each other
fn bench_font(session: &FontSession) -> Font {
    let font = session.new_font();
    for (i, c) in ('a'..='z').enumerate() {
        let x = i as f64 * 10.0;
        font.add_glyph(
            GlyphData::new(c.to_string())
                .with_width(500.0 + x)
                .with_unicodes([c])
                .with_contour(Contour::rect(x, 0.0, 400.0 + x, 500.0))
                .with_contour(Contour::rect(x + 50.0, 50.0, 350.0 + x, 450.0))
                .with_anchor(Anchor::new("top", 200.0 + x, 700.0))
                .with_anchor(Anchor::new("bottom", 200.0 + x, 0.0)),
        )
        .unwrap();
    }
    let groups = font.groups();
    groups.set("public.kern1.round", ["c", "e", "o"]);
    groups.set("public.kern2.round", ["c", "e", "o", "q"]);
    let kerning = font.kerning();
    kerning.set("public.kern1.round", "public.kern2.round", -10.0);
    for first in ["a", "b", "d", "o"] {
        for second in ["t", "v", "w", "y"] {
            kerning.set(first, second, -25.0);
        }
    }
    font
}

fn bench_cached_reads(c: &mut Criterion) {
    for (label, config) in [
        ("cached", CacheConfig::default()),
        ("uncached", CacheConfig::disabled()),
    ] {
        let session = FontSession::new(config).unwrap();
        let (ext, fx) = (session.context(), session.extensions());
        let font = bench_font(&session);
        let glyph = font.glyph("o").unwrap();
        let kerning = font.kerning();
        let text = "the quick brown fox jumps over the lazy dog".to_string();

        c.bench_function(&format!("anchors_map_{label}"), |b| {
            b.iter(|| fx.anchors_map.get(ext, black_box(&glyph)).unwrap())
        });
        c.bench_function(&format!("bounds_{label}"), |b| {
            b.iter(|| fx.bounds.get(ext, black_box(&glyph)).unwrap())
        });
        c.bench_function(&format!("flattened_kerning_{label}"), |b| {
            b.iter(|| fx.flattened_kerning.get(ext, black_box(&kerning)).unwrap())
        });
        c.bench_function(&format!("shape_text_{label}"), |b| {
            b.iter(|| fx.shape_text.call(ext, &font, black_box(text.clone())).unwrap())
        });
    }
}

fn bench_edit_then_read(c: &mut Criterion) {
    let session = FontSession::new(CacheConfig::default()).unwrap();
    let (ext, fx) = (session.context(), session.extensions());
    let font = bench_font(&session);
    let glyph = font.glyph("o").unwrap();

    c.bench_function("anchor_edit_then_anchors_map", |b| {
        b.iter(|| {
            glyph.set_anchors(vec![Anchor::new("top", 250.0, 700.0)]);
            fx.anchors_map.get(ext, &glyph).unwrap()
        })
    });
    c.bench_function("group_edit_then_flatten_pair", |b| {
        let groups = font.groups();
        let kerning = font.kerning();
        let pair = ("public.kern1.round".to_string(), "t".to_string());
        b.iter(|| {
            groups.set("public.kern1.round", ["c", "e", "o"]);
            fx.flatten_pair.call(ext, &kerning, pair.clone()).unwrap()
        })
    });
}

criterion_group!(benches, bench_cached_reads, bench_edit_then_read);
criterion_main!(benches);
