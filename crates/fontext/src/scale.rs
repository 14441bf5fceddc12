//! Geometric scaling of glyphs and whole fonts

use kurbo::Affine;

use fontext_core::{ExtError, Method, RegistryBuilder, Result};
use fontext_host::{Font, Glyph};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Horizontal and vertical scale factors
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Scale {
    pub x: f64,
    pub y: f64,
}

impl Scale {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn uniform(factor: f64) -> Self {
        Self::new(factor, factor)
    }

    pub fn affine(self) -> Affine {
        Affine::scale_non_uniform(self.x, self.y)
    }

    pub fn is_valid(self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.x != 0.0 && self.y != 0.0
    }
}

pub(crate) fn declare_glyph(builder: &mut RegistryBuilder) -> Result<Method<Glyph, Scale, ()>> {
    builder.font_method("scale", |_, glyph: &Glyph, scale: &Scale| {
        if !scale.is_valid() {
            return Err(ExtError::compute(
                "scale",
                format!("invalid scale {} x {}", scale.x, scale.y),
            ));
        }
        glyph.edit_geometry(|geometry| geometry.transform(scale.affine()));
        Ok(())
    })
}

/// Scale every glyph, the kerning and the vertical metrics by `factor`
///
/// Returns the number of glyphs scaled.
pub(crate) fn declare_font(
    builder: &mut RegistryBuilder,
    scale: Method<Glyph, Scale, ()>,
) -> Result<Method<Font, f64, usize>> {
    builder.font_method("scale_font", move |ext, font: &Font, factor: &f64| {
        let factor = *factor;
        let step = Scale::uniform(factor);
        if !step.is_valid() || factor < 0.0 {
            return Err(ExtError::compute(
                "scale_font",
                format!("invalid factor {factor}"),
            ));
        }

        let glyphs = font.glyphs();
        for_each_glyph(&glyphs, |glyph| scale.call(ext, glyph, step))?;

        font.kerning().edit(|table| {
            for value in table.values_mut() {
                *value *= factor;
            }
        });

        let mut info = font.info();
        info.units_per_em *= factor;
        info.ascender = info.ascender.map(|v| v * factor);
        info.descender = info.descender.map(|v| v * factor);
        font.set_info(info);

        log::info!("scaled {} glyphs by {}", glyphs.len(), factor);
        Ok(glyphs.len())
    })
}

#[cfg(feature = "parallel")]
fn for_each_glyph<F>(glyphs: &[Glyph], f: F) -> Result<()>
where
    F: Fn(&Glyph) -> Result<()> + Send + Sync,
{
    glyphs.par_iter().try_for_each(f)
}

#[cfg(not(feature = "parallel"))]
fn for_each_glyph<F>(glyphs: &[Glyph], f: F) -> Result<()>
where
    F: Fn(&Glyph) -> Result<()>,
{
    glyphs.iter().try_for_each(f)
}
