//! Outline and anchor data stored in glyphs

use kurbo::{Affine, BezPath, Point};

/// UFO point types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PointKind {
    Move,
    Line,
    OffCurve,
    Curve,
    QCurve,
}

impl PointKind {
    pub fn is_on_curve(self) -> bool {
        !matches!(self, PointKind::OffCurve)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContourPoint {
    pub x: f64,
    pub y: f64,
    pub kind: PointKind,
    pub smooth: bool,
}

impl ContourPoint {
    pub fn new(x: f64, y: f64, kind: PointKind) -> Self {
        Self {
            x,
            y,
            kind,
            smooth: false,
        }
    }

    pub fn point(&self) -> Point {
        Point::new(self.x, self.y)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Contour {
    pub points: Vec<ContourPoint>,
}

impl Contour {
    pub fn new(points: Vec<ContourPoint>) -> Self {
        Self { points }
    }

    /// Closed rectangle made of line points, handy for tests and demos
    pub fn rect(x0: f64, y0: f64, x1: f64, y1: f64) -> Self {
        Self::new(vec![
            ContourPoint::new(x0, y0, PointKind::Line),
            ContourPoint::new(x1, y0, PointKind::Line),
            ContourPoint::new(x1, y1, PointKind::Line),
            ContourPoint::new(x0, y1, PointKind::Line),
        ])
    }

    /// An open contour starts with a move point
    pub fn is_closed(&self) -> bool {
        self.points
            .first()
            .map(|p| p.kind != PointKind::Move)
            .unwrap_or(false)
    }

    pub fn transform(&mut self, affine: Affine) {
        for p in &mut self.points {
            let moved = affine * p.point();
            p.x = moved.x;
            p.y = moved.y;
        }
    }

    pub fn to_bezpath(&self) -> BezPath {
        let mut path = BezPath::new();
        let mut pending: Vec<Point> = Vec::new();
        let Some(first) = self.points.first() else {
            return path;
        };
        path.move_to(first.point());

        for point in &self.points[1..] {
            let pt = point.point();
            match point.kind {
                PointKind::Move => path.move_to(pt),
                PointKind::Line => path.line_to(pt),
                PointKind::OffCurve => pending.push(pt),
                PointKind::Curve | PointKind::QCurve => {
                    emit_curve(&mut path, point.kind, &mut pending, pt)
                }
            }
        }

        // The first point's type says how the last segment closes the contour
        if first.kind != PointKind::Move {
            emit_curve(&mut path, first.kind, &mut pending, first.point());
            path.close_path();
        }
        path
    }
}

fn emit_curve(path: &mut BezPath, kind: PointKind, pending: &mut Vec<Point>, end: Point) {
    match (kind, pending.len()) {
        (_, 0) => path.line_to(end),
        (PointKind::Curve, 1) | (PointKind::QCurve, 1) => path.quad_to(pending[0], end),
        (PointKind::Curve, n) => path.curve_to(pending[n - 2], pending[n - 1], end),
        (PointKind::QCurve, n) => {
            // Implied on-curve points sit halfway between consecutive off-curves
            for i in 0..n {
                let cp = pending[i];
                let to = if i == n - 1 {
                    end
                } else {
                    cp.midpoint(pending[i + 1])
                };
                path.quad_to(cp, to);
            }
        }
        _ => path.line_to(end),
    }
    pending.clear();
}

/// A named position in a glyph
#[derive(Debug, Clone, PartialEq)]
pub struct Anchor {
    pub name: String,
    pub position: Point,
}

impl Anchor {
    pub fn new(name: impl Into<String>, x: f64, y: f64) -> Self {
        Self {
            name: name.into(),
            position: Point::new(x, y),
        }
    }
}
