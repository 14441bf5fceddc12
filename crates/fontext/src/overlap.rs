//! Overlap removal behind a pluggable boolean-operations engine

use std::sync::Arc;

use fontext_core::{Method, RegistryBuilder, Result};
use fontext_host::{Contour, Glyph};

/// Merges overlapping contours
pub trait OverlapRemover: Send + Sync {
    fn name(&self) -> &'static str;

    fn remove_overlap(&self, contours: &[Contour]) -> Result<Vec<Contour>>;
}

/// Leaves contours untouched, for hosts without a boolean engine
pub struct NoOverlapRemover;

impl OverlapRemover for NoOverlapRemover {
    fn name(&self) -> &'static str {
        "none"
    }

    fn remove_overlap(&self, contours: &[Contour]) -> Result<Vec<Contour>> {
        Ok(contours.to_vec())
    }
}

/// Returns whether the glyph's outlines changed
pub(crate) fn declare(
    builder: &mut RegistryBuilder,
    remover: Arc<dyn OverlapRemover>,
) -> Result<Method<Glyph, (), bool>> {
    builder.font_method("remove_overlap", move |_, glyph: &Glyph, _: &()| {
        let contours = glyph.contours();
        let merged = remover.remove_overlap(&contours)?;
        if merged == contours {
            return Ok(false);
        }
        log::debug!(
            "{}: {} removed overlaps, {} -> {} contours",
            glyph.name(),
            remover.name(),
            contours.len(),
            merged.len()
        );
        glyph.set_contours(merged);
        Ok(true)
    })
}
