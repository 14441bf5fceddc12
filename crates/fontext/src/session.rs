// this_file: crates/fontext/src/session.rs

use std::path::Path;
use std::sync::Arc;

use fontext_core::{CacheConfig, CacheMetrics, EventBus, Extensions, RegistryBuilder, Result};
use fontext_host::Font;

use crate::{FontExtensions, FontExtensionsBuilder};

/// A bus, the extensions declared on it and the context holding their caches
///
/// Fonts created or loaded through the session report on its bus, so the
/// extension caches follow their edits.
pub struct FontSession {
    bus: Arc<EventBus>,
    context: Extensions,
    extensions: FontExtensions,
}

impl FontSession {
    pub fn new(config: CacheConfig) -> Result<Self> {
        Self::with_extensions(config, FontExtensions::builder())
    }

    pub fn with_extensions(config: CacheConfig, builder: FontExtensionsBuilder) -> Result<Self> {
        let mut registry = RegistryBuilder::new();
        let extensions = builder.declare(&mut registry)?;
        let bus = Arc::new(EventBus::new());
        let context = Extensions::new(Arc::new(registry.build()), bus.clone(), config);
        Ok(Self {
            bus,
            context,
            extensions,
        })
    }

    pub fn bus(&self) -> &Arc<EventBus> {
        &self.bus
    }

    pub fn context(&self) -> &Extensions {
        &self.context
    }

    pub fn extensions(&self) -> &FontExtensions {
        &self.extensions
    }

    pub fn metrics(&self) -> CacheMetrics {
        self.context.metrics()
    }

    pub fn new_font(&self) -> Font {
        Font::new(self.bus.clone())
    }

    pub fn load_ufo(&self, path: impl AsRef<Path>) -> Result<Font> {
        Ok(Font::load_ufo(path, self.bus.clone())?)
    }
}
