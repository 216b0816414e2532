//! Registry of named palettes plus the document-local swatches.

use std::collections::HashMap;
use std::sync::Arc;

use crate::color::Color;
use crate::palettes;

use super::manager::ColorManager;
use super::traits::ColorRegistry;
use super::{LoadError, RegistryError};

/// Category name under which the local swatches are reachable through
/// [`MetaColorManager::get`].
pub const LOCAL_SWATCHES_ID: &str = "local";

/// All palettes known to the application.
///
/// Built-in catalogs are loaded by an explicit [`populate_my_colors`] call
/// and are read-only afterwards. The local swatch palette always exists and
/// cannot be removed or replaced.
///
/// [`populate_my_colors`]: MetaColorManager::populate_my_colors
#[derive(Debug)]
pub struct MetaColorManager {
    managers: Vec<ColorManager>,
    index: HashMap<String, usize>,
    local: ColorManager,
}

impl Default for MetaColorManager {
    fn default() -> Self {
        Self::new()
    }
}

impl MetaColorManager {
    pub fn new() -> Self {
        Self::with_local_name("Local Swatches")
    }

    /// Create a registry whose local swatch palette has the given name.
    pub fn with_local_name(name: impl Into<String>) -> Self {
        Self {
            managers: Vec::new(),
            index: HashMap::new(),
            local: ColorManager::with_id(LOCAL_SWATCHES_ID, name),
        }
    }

    /// Load every built-in catalog. Catalogs already loaded are skipped.
    ///
    /// Returns the number of catalogs loaded by this call.
    pub fn populate_my_colors(&mut self) -> Result<usize, LoadError> {
        self.populate_from(&palettes::list_builtins())
    }

    /// Load the named built-in catalogs. Catalogs already loaded are skipped.
    ///
    /// # Errors
    ///
    /// `LoadError::UnknownCatalog` for an id with no built-in catalog. Catalogs
    /// listed before the unknown id stay loaded.
    pub fn populate_from(&mut self, ids: &[&str]) -> Result<usize, LoadError> {
        let mut loaded = 0;
        for id in ids {
            if self.index.contains_key(*id) {
                continue;
            }
            let catalog =
                palettes::get_builtin(id).ok_or_else(|| LoadError::UnknownCatalog(id.to_string()))?;

            let mut manager = ColorManager::with_id(catalog.id, catalog.name);
            let count = manager.extend(catalog.records())?;
            log::debug!("loaded palette '{}' with {} colors", catalog.id, count);
            self.push(manager);
            loaded += 1;
        }
        Ok(loaded)
    }

    /// Look up a color by palette category and color id.
    ///
    /// The local swatches answer to [`LOCAL_SWATCHES_ID`] unless a palette
    /// was explicitly registered under that id.
    pub fn get(&self, category: &str, id: &str) -> Option<&Arc<Color>> {
        match self.color_manager(category) {
            Some(manager) => manager.get(id),
            None if category == LOCAL_SWATCHES_ID => self.local.get(id),
            None => None,
        }
    }

    /// Resolve a `"category:id"` reference. A bare id is looked up in
    /// `default_category`.
    pub fn resolve(&self, reference: &str, default_category: &str) -> Option<&Arc<Color>> {
        match reference.split_once(':') {
            Some((category, id)) => self.get(category.trim(), id.trim()),
            None => self.get(default_category, reference.trim()),
        }
    }

    /// Register a new empty palette.
    ///
    /// # Errors
    ///
    /// `RegistryError::DuplicateKey` if a palette with that id exists.
    pub fn create_color_manager(
        &mut self,
        id: &str,
        name: &str,
    ) -> Result<&mut ColorManager, RegistryError> {
        if self.index.contains_key(id) {
            return Err(RegistryError::DuplicateKey(id.to_string()));
        }
        let mut manager = ColorManager::with_id(id, name);
        manager.set_dependent(true);
        let slot = self.push(manager);
        Ok(&mut self.managers[slot])
    }

    /// Palette registered under `id`. Never returns the local swatches
    /// unless they were registered under that id explicitly.
    pub fn color_manager(&self, id: &str) -> Option<&ColorManager> {
        self.index.get(id).map(|&slot| &self.managers[slot])
    }

    pub fn color_manager_mut(&mut self, id: &str) -> Option<&mut ColorManager> {
        let slot = *self.index.get(id)?;
        self.managers.get_mut(slot)
    }

    /// Registered palettes in registration order.
    pub fn color_managers(&self) -> &[ColorManager] {
        &self.managers
    }

    pub fn local_swatches(&self) -> &ColorManager {
        &self.local
    }

    pub fn local_swatches_mut(&mut self) -> &mut ColorManager {
        &mut self.local
    }

    fn push(&mut self, manager: ColorManager) -> usize {
        let slot = self.managers.len();
        self.index.insert(manager.id().to_string(), slot);
        self.managers.push(manager);
        slot
    }
}
