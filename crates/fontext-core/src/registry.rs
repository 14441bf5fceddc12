//! Declaring extensions and freezing them into a registry

// this_file: crates/fontext-core/src/registry.rs

use std::hash::Hash;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::{
    cache::FunctionId,
    context::Extensions,
    error::{ConfigError, Result},
    extension::{
        CachedMethod, CachedProperty, Declared, Dependencies, ExtensionDescriptor, ExtensionKind,
        Method, Property,
    },
    owner::{Owner, OwnerKind},
};

static NEXT_REGISTRY_ID: AtomicU64 = AtomicU64::new(1);

/// Identity of a registry; handles remember the one that declared them
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RegistryId(u64);

/// Collects extension declarations
///
/// Each `font_*` call validates its declaration on the spot and returns the
/// handle used to call the extension. [`build`](Self::build) freezes the
/// descriptors into an [`ExtensionRegistry`].
///
/// ```
/// use fontext_core::{Dependencies, Owner, OwnerId, OwnerKind, RegistryBuilder};
/// use fontext_core::events::GlyphEvent;
///
/// struct Glyph(OwnerId);
/// impl Owner for Glyph {
///     const KIND: OwnerKind = OwnerKind::Glyph;
///     fn owner_id(&self) -> OwnerId { self.0 }
/// }
///
/// let mut builder = RegistryBuilder::new();
/// let doubled = builder.font_cached_property(
///     "doubled",
///     Dependencies::<Glyph>::new().on(GlyphEvent::Changed),
///     |_, glyph| Ok(glyph.0.get() * 2),
/// )?;
/// let registry = builder.build();
/// assert_eq!(registry.len(), 1);
/// assert_eq!(doubled.name(), "doubled");
/// # Ok::<(), fontext_core::ExtError>(())
/// ```
pub struct RegistryBuilder {
    id: RegistryId,
    descriptors: Vec<ExtensionDescriptor>,
}

impl RegistryBuilder {
    pub fn new() -> Self {
        Self {
            id: RegistryId(NEXT_REGISTRY_ID.fetch_add(1, Ordering::Relaxed)),
            descriptors: Vec::new(),
        }
    }

    /// Declare an uncached method on `O`
    pub fn font_method<O, A, V, F>(&mut self, name: &str, body: F) -> Result<Method<O, A, V>>
    where
        O: Owner,
        F: Fn(&Extensions, &O, &A) -> Result<V> + Send + Sync + 'static,
    {
        let declared = self.declare(name, O::KIND, ExtensionKind::Method, Vec::new())?;
        Ok(Method {
            declared,
            body: Arc::new(body),
        })
    }

    /// Declare an uncached property on `O`
    pub fn font_property<O, V, F>(&mut self, name: &str, body: F) -> Result<Property<O, V>>
    where
        O: Owner,
        F: Fn(&Extensions, &O) -> Result<V> + Send + Sync + 'static,
    {
        let declared = self.declare(name, O::KIND, ExtensionKind::Property, Vec::new())?;
        Ok(Property {
            declared,
            body: Arc::new(body),
        })
    }

    /// Declare a cached method on `O`, keyed by its argument
    pub fn font_cached_method<O, A, V, F>(
        &mut self,
        name: &str,
        dependencies: Dependencies<O>,
        body: F,
    ) -> Result<CachedMethod<O, A, V>>
    where
        O: Owner,
        A: Hash + Eq + Clone + Send + Sync + 'static,
        V: Clone + Send + Sync + 'static,
        F: Fn(&Extensions, &O, &A) -> Result<V> + Send + Sync + 'static,
    {
        let dependencies = dependencies.validate(name)?;
        let declared = self.declare(
            name,
            O::KIND,
            ExtensionKind::CachedMethod,
            dependencies.describe(),
        )?;
        Ok(CachedMethod {
            declared,
            dependencies: Arc::new(dependencies),
            body: Arc::new(body),
        })
    }

    /// Declare a cached property on `O`
    pub fn font_cached_property<O, V, F>(
        &mut self,
        name: &str,
        dependencies: Dependencies<O>,
        body: F,
    ) -> Result<CachedProperty<O, V>>
    where
        O: Owner,
        V: Clone + Send + Sync + 'static,
        F: Fn(&Extensions, &O) -> Result<V> + Send + Sync + 'static,
    {
        let dependencies = dependencies.validate(name)?;
        let declared = self.declare(
            name,
            O::KIND,
            ExtensionKind::CachedProperty,
            dependencies.describe(),
        )?;
        Ok(CachedProperty {
            declared,
            dependencies: Arc::new(dependencies),
            body: Arc::new(body),
        })
    }

    fn declare(
        &mut self,
        name: &str,
        target: OwnerKind,
        kind: ExtensionKind,
        dependencies: Vec<crate::extension::DependencyDescriptor>,
    ) -> Result<Declared> {
        if self
            .descriptors
            .iter()
            .any(|d| d.target == target && d.name == name)
        {
            return Err(ConfigError::DuplicateExtension {
                name: name.to_string(),
                target,
            }
            .into());
        }

        let id = FunctionId(self.descriptors.len() as u32);
        log::debug!("declared {} `{}` on {}", kind, name, target);
        self.descriptors.push(ExtensionDescriptor {
            id,
            name: name.to_string(),
            target,
            kind,
            dependencies,
        });
        Ok(Declared {
            registry: self.id,
            id,
            name: Arc::from(name),
        })
    }

    /// Freeze the declarations
    pub fn build(self) -> ExtensionRegistry {
        ExtensionRegistry {
            id: self.id,
            descriptors: self.descriptors,
        }
    }
}

impl Default for RegistryBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Immutable table of declared extensions, by owner kind
#[derive(Debug)]
pub struct ExtensionRegistry {
    id: RegistryId,
    descriptors: Vec<ExtensionDescriptor>,
}

impl ExtensionRegistry {
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::new()
    }

    pub fn id(&self) -> RegistryId {
        self.id
    }

    pub fn lookup(&self, target: OwnerKind, name: &str) -> Option<&ExtensionDescriptor> {
        self.descriptors
            .iter()
            .find(|d| d.target == target && d.name == name)
    }

    pub fn descriptor(&self, id: FunctionId) -> Option<&ExtensionDescriptor> {
        self.descriptors.get(id.index())
    }

    /// Extensions available on one kind of owner
    pub fn for_target(&self, target: OwnerKind) -> impl Iterator<Item = &ExtensionDescriptor> {
        self.descriptors.iter().filter(move |d| d.target == target)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ExtensionDescriptor> {
        self.descriptors.iter()
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }
}
