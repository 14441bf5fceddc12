//! Loading and writing UFO sources through norad
//!
//! Only part of a UFO is modelled by the graph (metrics, outlines, anchors,
//! kerning, groups). The loaded `norad::Font` is kept next to the graph and
//! written back with the modelled parts synced into it, so components,
//! guidelines, libs and extra layers survive a load/write round trip.

use std::collections::{BTreeMap, HashSet};
use std::path::Path;
use std::sync::Arc;

use kurbo::Point;

use fontext_core::EventBus;

use crate::error::{HostError, Result};
use crate::font::{Font, FontInfo};
use crate::geometry::{Anchor, Contour, ContourPoint, PointKind};
use crate::glyph::GlyphData;

impl Font {
    /// Load a UFO from disk into a new graph on `bus`
    pub fn load_ufo(path: impl AsRef<Path>, bus: Arc<EventBus>) -> Result<Font> {
        let path = path.as_ref();
        let source = norad::Font::load(path).map_err(|err| HostError::Load {
            path: path.display().to_string(),
            message: err.to_string(),
        })?;

        let font = Font::with_info(bus, info_from_norad(&source.font_info));
        for glyph in source.default_layer().iter() {
            font.add_glyph(glyph_from_norad(glyph))?;
        }

        let pairs: BTreeMap<(String, String), f64> = source
            .kerning
            .iter()
            .flat_map(|(first, seconds)| {
                seconds
                    .iter()
                    .map(move |(second, value)| ((first.to_string(), second.to_string()), *value))
            })
            .collect();
        if !pairs.is_empty() {
            font.kerning().edit(|table| *table = pairs);
        }

        let groups = font.groups();
        for (name, members) in source.groups.iter() {
            groups.set(name.to_string(), members.iter().map(|m| m.to_string()));
        }

        log::debug!(
            "loaded {} from {}: {} glyphs, {} kerning pairs, {} groups",
            font.info().display_name(),
            path.display(),
            font.len(),
            font.kerning().len(),
            groups.len()
        );
        *font.inner().source.lock() = Some(source);
        Ok(font)
    }

    /// Write the font as a UFO at `path`
    pub fn write_ufo(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let mut source_slot = self.inner().source.lock();
        let source = source_slot.get_or_insert_with(norad::Font::new);

        sync_info(&mut source.font_info, &self.info());

        let layer = source.default_layer_mut();
        let keep: HashSet<String> = self.glyph_names().into_iter().collect();
        let stale: Vec<String> = layer
            .iter()
            .map(|glyph| glyph.name().to_string())
            .filter(|name| !keep.contains(name))
            .collect();
        for name in &stale {
            layer.remove_glyph(name);
        }
        for glyph in self.glyphs() {
            let data = glyph.data();
            match layer.get_glyph_mut(&data.name) {
                Some(target) => sync_glyph(target, &data),
                None => {
                    let mut target = norad::Glyph::new(&data.name);
                    sync_glyph(&mut target, &data);
                    layer.insert_glyph(target);
                }
            }
        }

        let mut kerning: BTreeMap<norad::Name, BTreeMap<norad::Name, f64>> = BTreeMap::new();
        for ((first, second), value) in self.kerning().pairs() {
            kerning
                .entry(parse_name(&first)?)
                .or_default()
                .insert(parse_name(&second)?, value);
        }
        source.kerning = kerning;

        let mut groups: BTreeMap<norad::Name, Vec<norad::Name>> = BTreeMap::new();
        for (name, members) in self.groups().all() {
            let members = members
                .iter()
                .map(|member| parse_name(member))
                .collect::<Result<Vec<_>>>()?;
            groups.insert(parse_name(&name)?, members);
        }
        source.groups = groups;

        source.save(path).map_err(|err| HostError::Write {
            path: path.display().to_string(),
            message: err.to_string(),
        })?;
        log::info!("wrote {} to {}", self.info().display_name(), path.display());
        Ok(())
    }
}

fn parse_name(name: &str) -> Result<norad::Name> {
    name.parse()
        .map_err(|_| HostError::InvalidName(name.to_string()))
}

fn info_from_norad(info: &norad::FontInfo) -> FontInfo {
    FontInfo {
        family_name: info.family_name.clone(),
        style_name: info.style_name.clone(),
        units_per_em: info
            .units_per_em
            .map(|upm| upm.to_string().parse().unwrap_or(1000.0))
            .unwrap_or(1000.0),
        ascender: info.ascender,
        descender: info.descender,
    }
}

fn sync_info(target: &mut norad::FontInfo, info: &FontInfo) {
    target.family_name = info.family_name.clone();
    target.style_name = info.style_name.clone();
    target.units_per_em = norad::fontinfo::NonNegativeIntegerOrFloat::new(info.units_per_em);
    target.ascender = info.ascender;
    target.descender = info.descender;
}

fn glyph_from_norad(glyph: &norad::Glyph) -> GlyphData {
    GlyphData {
        name: glyph.name().to_string(),
        width: glyph.width,
        unicodes: glyph.codepoints.iter().collect(),
        contours: glyph.contours.iter().map(contour_from_norad).collect(),
        anchors: glyph
            .anchors
            .iter()
            .map(|anchor| Anchor {
                name: anchor
                    .name
                    .as_ref()
                    .map(|name| name.to_string())
                    .unwrap_or_default(),
                position: Point::new(anchor.x, anchor.y),
            })
            .collect(),
    }
}

fn contour_from_norad(contour: &norad::Contour) -> Contour {
    Contour::new(
        contour
            .points
            .iter()
            .map(|point| ContourPoint {
                x: point.x,
                y: point.y,
                kind: kind_from_norad(&point.typ),
                smooth: point.smooth,
            })
            .collect(),
    )
}

fn kind_from_norad(typ: &norad::PointType) -> PointKind {
    match typ {
        norad::PointType::Move => PointKind::Move,
        norad::PointType::Line => PointKind::Line,
        norad::PointType::OffCurve => PointKind::OffCurve,
        norad::PointType::Curve => PointKind::Curve,
        norad::PointType::QCurve => PointKind::QCurve,
    }
}

fn kind_to_norad(kind: PointKind) -> norad::PointType {
    match kind {
        PointKind::Move => norad::PointType::Move,
        PointKind::Line => norad::PointType::Line,
        PointKind::OffCurve => norad::PointType::OffCurve,
        PointKind::Curve => norad::PointType::Curve,
        PointKind::QCurve => norad::PointType::QCurve,
    }
}

/// Copy modelled glyph data into a norad glyph, editing in place where the
/// structure still matches so point names and identifiers are kept
fn sync_glyph(target: &mut norad::Glyph, data: &GlyphData) {
    target.width = data.width;

    let current: Vec<char> = target.codepoints.iter().collect();
    if current != data.unicodes {
        let mut fresh = norad::Glyph::new(&data.name);
        for c in &data.unicodes {
            fresh.codepoints.insert(*c);
        }
        target.codepoints = fresh.codepoints;
    }

    let same_shape = target.contours.len() == data.contours.len()
        && target
            .contours
            .iter()
            .zip(&data.contours)
            .all(|(a, b)| a.points.len() == b.points.len());
    if same_shape {
        for (contour, modelled) in target.contours.iter_mut().zip(&data.contours) {
            for (point, p) in contour.points.iter_mut().zip(&modelled.points) {
                point.x = p.x;
                point.y = p.y;
                point.typ = kind_to_norad(p.kind);
                point.smooth = p.smooth;
            }
        }
    } else {
        target.contours = data
            .contours
            .iter()
            .map(|contour| {
                let points = contour
                    .points
                    .iter()
                    .map(|p| norad::ContourPoint::new(p.x, p.y, kind_to_norad(p.kind), p.smooth, None, None))
                    .collect();
                norad::Contour::new(points, None)
            })
            .collect();
    }

    if target.anchors.len() > data.anchors.len() {
        target.anchors.truncate(data.anchors.len());
    }
    for (anchor, modelled) in target.anchors.iter_mut().zip(&data.anchors) {
        anchor.x = modelled.position.x;
        anchor.y = modelled.position.y;
    }
    if data.anchors.len() > target.anchors.len() {
        log::warn!(
            "{}: {} anchors added in memory are not written",
            data.name,
            data.anchors.len() - target.anchors.len()
        );
    }
}
