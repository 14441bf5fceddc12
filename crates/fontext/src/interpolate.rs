//! Linear interpolation between the outlines of two compatible glyphs

use kurbo::{CubicBez, Line, PathSeg, QuadBez};

use fontext_core::{CachedProperty, ExtError, Method, RegistryBuilder, Result};
use fontext_host::Glyph;

use crate::outline::Segments;

/// Interpolate towards `other`: `factor` 0 gives the glyph itself, 1 gives `other`
#[derive(Debug, Clone)]
pub struct Interpolation {
    pub other: Glyph,
    pub factor: f64,
}

impl Interpolation {
    pub fn new(other: Glyph, factor: f64) -> Self {
        Self { other, factor }
    }
}

/// `None` when the two outlines are not point compatible
pub fn interpolate(from: &[Vec<PathSeg>], to: &[Vec<PathSeg>], t: f64) -> Option<Segments> {
    if from.len() != to.len() {
        return None;
    }
    from.iter()
        .zip(to)
        .map(|(a, b)| {
            if a.len() != b.len() {
                return None;
            }
            a.iter()
                .zip(b)
                .map(|(a, b)| lerp_segment(*a, *b, t))
                .collect::<Option<Vec<_>>>()
        })
        .collect()
}

fn lerp_segment(a: PathSeg, b: PathSeg, t: f64) -> Option<PathSeg> {
    let seg = match (a, b) {
        (PathSeg::Line(a), PathSeg::Line(b)) => {
            PathSeg::Line(Line::new(a.p0.lerp(b.p0, t), a.p1.lerp(b.p1, t)))
        }
        (PathSeg::Quad(a), PathSeg::Quad(b)) => PathSeg::Quad(QuadBez::new(
            a.p0.lerp(b.p0, t),
            a.p1.lerp(b.p1, t),
            a.p2.lerp(b.p2, t),
        )),
        (PathSeg::Cubic(a), PathSeg::Cubic(b)) => PathSeg::Cubic(CubicBez::new(
            a.p0.lerp(b.p0, t),
            a.p1.lerp(b.p1, t),
            a.p2.lerp(b.p2, t),
            a.p3.lerp(b.p3, t),
        )),
        _ => return None,
    };
    Some(seg)
}

pub(crate) fn declare(
    builder: &mut RegistryBuilder,
    segments: CachedProperty<Glyph, Segments>,
) -> Result<Method<Glyph, Interpolation, Segments>> {
    builder.font_method(
        "interpolate_segments",
        move |ext, glyph: &Glyph, target: &Interpolation| {
            let from = segments.get(ext, glyph)?;
            let to = segments.get(ext, &target.other)?;
            interpolate(&from, &to, target.factor).ok_or_else(|| {
                ExtError::compute(
                    "interpolate_segments",
                    format!(
                        "{} and {} are not compatible",
                        glyph.name(),
                        target.other.name()
                    ),
                )
            })
        },
    )
}
