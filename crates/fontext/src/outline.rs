//! Outline-derived values: bounds and segments

// this_file: crates/fontext/src/outline.rs

use kurbo::{PathSeg, Rect, Shape};

use fontext_core::events::GlyphEvent;
use fontext_core::{CachedProperty, Dependencies, RegistryBuilder, Result};
use fontext_host::{Contour, Glyph};

/// Segments of each contour, one list per contour
pub type Segments = Vec<Vec<PathSeg>>;

/// Control box of the outlines, `None` for a glyph without points
pub fn bounds(contours: &[Contour]) -> Option<Rect> {
    contours
        .iter()
        .filter(|contour| !contour.points.is_empty())
        .map(|contour| contour.to_bezpath().bounding_box())
        .reduce(|acc, rect| acc.union(rect))
}

pub fn segments(contours: &[Contour]) -> Segments {
    contours
        .iter()
        .map(|contour| contour.to_bezpath().segments().collect())
        .collect()
}

fn contour_dependencies() -> Dependencies<Glyph> {
    Dependencies::new().on(GlyphEvent::ContoursChanged)
}

pub(crate) fn declare_bounds(
    builder: &mut RegistryBuilder,
) -> Result<CachedProperty<Glyph, Option<Rect>>> {
    builder.font_cached_property("bounds", contour_dependencies(), |_, glyph| {
        Ok(glyph.read(|data| bounds(&data.contours)))
    })
}

pub(crate) fn declare_segments(
    builder: &mut RegistryBuilder,
) -> Result<CachedProperty<Glyph, Segments>> {
    builder.font_cached_property("segments", contour_dependencies(), |_, glyph| {
        Ok(glyph.read(|data| segments(&data.contours)))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use fontext_host::{ContourPoint, PointKind};

    #[test]
    fn bounds_cover_every_contour() {
        let rect = bounds(&[
            Contour::rect(10.0, 0.0, 100.0, 200.0),
            Contour::rect(-20.0, 50.0, 40.0, 400.0),
        ])
        .unwrap();
        assert_eq!(rect, Rect::new(-20.0, 0.0, 100.0, 400.0));
        assert_eq!(bounds(&[]), None);
    }

    #[test]
    fn closed_rect_has_four_lines() {
        let segs = segments(&[Contour::rect(0.0, 0.0, 10.0, 10.0)]);
        assert_eq!(segs.len(), 1);
        assert_eq!(segs[0].len(), 4);
        assert!(segs[0].iter().all(|seg| matches!(seg, PathSeg::Line(_))));
    }

    #[test]
    fn off_curves_make_cubics() {
        let contour = Contour::new(vec![
            ContourPoint::new(0.0, 0.0, PointKind::Line),
            ContourPoint::new(0.0, 50.0, PointKind::OffCurve),
            ContourPoint::new(50.0, 100.0, PointKind::OffCurve),
            ContourPoint::new(100.0, 100.0, PointKind::Curve),
        ]);
        let segs = segments(&[contour]);
        assert!(matches!(segs[0][0], PathSeg::Cubic(_)));
        assert!(matches!(segs[0][1], PathSeg::Line(_)));
    }
}
