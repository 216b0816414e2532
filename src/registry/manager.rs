//! Ordered, id-keyed color list with change notifications.

use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::color::{parse_hex, Color};

use super::traits::ColorRegistry;
use super::{LoadError, RegistryError};

/// Change notification fired after a successful mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorEvent {
    /// The list changed wholesale (clear, bulk load).
    ListChanged,
    /// A color was added at the end.
    Appended,
    /// A color was inserted before the given position.
    Inserted { before: usize },
    /// The color at the given position was removed.
    Deleted { index: usize },
    /// Two positions exchanged their colors.
    Swapped(usize, usize),
}

/// Handle returned by [`ColorManager::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObserverId(u64);

/// Callback receiving every event together with the post-mutation list.
pub type Observer = Box<dyn FnMut(&ColorEvent, &ColorManager)>;

/// One entry of a palette load list.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ColorRecord {
    pub id: String,
    pub name: String,
    /// Hex value, `#RRGGBB` or `RRGGBB`.
    #[serde(alias = "rgb")]
    pub color: String,
}

impl ColorRecord {
    pub fn new(id: impl Into<String>, name: impl Into<String>, color: impl Into<String>) -> Self {
        Self { id: id.into(), name: name.into(), color: color.into() }
    }

    fn to_color(&self) -> Result<Color, LoadError> {
        let rgb = parse_hex(&self.color)
            .map_err(|source| LoadError::Color { id: self.id.clone(), source })?;
        Ok(Color::new(self.id.clone(), self.name.clone(), rgb))
    }
}

/// A named, user-reorderable list of unique colors.
///
/// Display order is the order of the internal list; the id index only
/// provides O(1) lookup. A palette keys its colors by bare id. A
/// [`qualified`](Self::qualified) list keys them by `category:id` so that
/// same-id colors from different palettes can sit side by side.
///
/// Observers are notified synchronously after each successful mutation and
/// never for rejected or no-op calls.
pub struct ColorManager {
    id: String,
    name: String,
    dependent: bool,
    qualified: bool,
    list: Vec<Arc<Color>>,
    index: HashMap<String, Arc<Color>>,
    observers: Vec<(ObserverId, Observer)>,
    next_observer: u64,
}

impl Default for ColorManager {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ColorManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ColorManager")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("dependent", &self.dependent)
            .field("colors", &self.list.iter().map(|c| self.key_of(c)).collect::<Vec<_>>())
            .field("observers", &self.observers.len())
            .finish()
    }
}

impl ColorManager {
    /// Create an anonymous, empty manager.
    pub fn new() -> Self {
        Self::with_id("", "")
    }

    /// Create an empty manager with an id and display name.
    pub fn with_id(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            dependent: false,
            qualified: false,
            list: Vec::new(),
            index: HashMap::new(),
            observers: Vec::new(),
            next_observer: 0,
        }
    }

    /// Create an anonymous, empty manager keyed by `category:id`.
    pub fn qualified() -> Self {
        Self { qualified: true, ..Self::new() }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether this palette is derived from a document rather than a catalog.
    pub fn is_dependent(&self) -> bool {
        self.dependent
    }

    pub fn set_dependent(&mut self, dependent: bool) {
        self.dependent = dependent;
    }

    /// Colors in display order.
    pub fn colors(&self) -> &[Arc<Color>] {
        &self.list
    }

    /// Register an observer. Observers are called in registration order.
    pub fn subscribe<F>(&mut self, observer: F) -> ObserverId
    where
        F: FnMut(&ColorEvent, &ColorManager) + 'static,
    {
        let id = ObserverId(self.next_observer);
        self.next_observer += 1;
        self.observers.push((id, Box::new(observer)));
        id
    }

    /// Remove an observer. Returns false if it was not registered.
    pub fn unsubscribe(&mut self, id: ObserverId) -> bool {
        let before = self.observers.len();
        self.observers.retain(|(observer_id, _)| *observer_id != id);
        self.observers.len() != before
    }

    /// Append a color. A color without a category joins this palette's
    /// category.
    ///
    /// # Errors
    ///
    /// `RegistryError::DuplicateKey` if the id is already registered; the
    /// list is left unchanged.
    pub fn add(&mut self, color: Arc<Color>) -> Result<(), RegistryError> {
        let color = self.adopt(color);
        let key = self.check_unique(&color)?;
        log::debug!("palette '{}': append {}", self.id, key);
        self.index.insert(key, Arc::clone(&color));
        self.list.push(color);
        self.emit(ColorEvent::Appended);
        Ok(())
    }

    /// Insert a color before position `before` (`before == count()` appends
    /// at the end).
    ///
    /// # Panics
    ///
    /// Panics if `before > count()`.
    pub fn insert(&mut self, color: Arc<Color>, before: usize) -> Result<(), RegistryError> {
        assert!(
            before <= self.list.len(),
            "insert position {} out of range for {} colors",
            before,
            self.list.len()
        );
        let color = self.adopt(color);
        let key = self.check_unique(&color)?;
        log::debug!("palette '{}': insert {} before {}", self.id, key, before);
        self.index.insert(key, Arc::clone(&color));
        self.list.insert(before, color);
        self.emit(ColorEvent::Inserted { before });
        Ok(())
    }

    /// Remove a color by id, returning it.
    ///
    /// # Errors
    ///
    /// `RegistryError::NotFound` if no color has that id.
    pub fn remove(&mut self, id: &str) -> Result<Arc<Color>, RegistryError> {
        let Some(index) = self.index_of(id) else {
            return Err(RegistryError::NotFound(id.to_string()));
        };
        log::debug!("palette '{}': remove {} at {}", self.id, id, index);
        self.index.remove(id);
        let color = self.list.remove(index);
        self.emit(ColorEvent::Deleted { index });
        Ok(color)
    }

    /// Exchange the colors at two positions.
    ///
    /// # Panics
    ///
    /// Panics if either index is out of range.
    pub fn swap(&mut self, i: usize, j: usize) {
        let len = self.list.len();
        assert!(i < len && j < len, "swap ({}, {}) out of range for {} colors", i, j, len);
        self.list.swap(i, j);
        self.emit(ColorEvent::Swapped(i, j));
    }

    /// Remove every color. Clearing an empty list is a no-op.
    pub fn clear(&mut self) {
        if self.list.is_empty() {
            return;
        }
        log::debug!("palette '{}': clear {} colors", self.id, self.list.len());
        self.list.clear();
        self.index.clear();
        self.emit(ColorEvent::ListChanged);
    }

    /// Load a structured list of `{ "id", "name", "color" }` records.
    ///
    /// Duplicate ids are skipped with a warning. Returns the number of colors
    /// added.
    ///
    /// # Errors
    ///
    /// Fails without modifying the list if `data` is not an array, if any
    /// entry is not a valid record, or if any color value is malformed.
    pub fn load(&mut self, data: &Value) -> Result<usize, LoadError> {
        let Some(entries) = data.as_array() else {
            return Err(LoadError::NotAList);
        };
        let records = entries
            .iter()
            .enumerate()
            .map(|(index, entry)| {
                ColorRecord::deserialize(entry)
                    .map_err(|e| LoadError::InvalidRecord { index, message: e.to_string() })
            })
            .collect::<Result<Vec<_>, _>>()?;
        self.extend(records)
    }

    /// Append every record in order, skipping ids that are already present.
    ///
    /// All records are validated before anything is added.
    pub fn extend<I>(&mut self, records: I) -> Result<usize, LoadError>
    where
        I: IntoIterator<Item = ColorRecord>,
    {
        let colors = records
            .into_iter()
            .map(|record| record.to_color())
            .collect::<Result<Vec<_>, _>>()?;

        let mut added = 0;
        for color in colors {
            match self.add(Arc::new(color)) {
                Ok(()) => added += 1,
                Err(e) => log::warn!("palette '{}': skipping color: {}", self.id, e),
            }
        }
        if added > 0 {
            self.emit(ColorEvent::ListChanged);
        }
        Ok(added)
    }

    fn key_of(&self, color: &Color) -> String {
        if self.qualified {
            color.key().to_string()
        } else {
            color.id().to_string()
        }
    }

    fn adopt(&self, color: Arc<Color>) -> Arc<Color> {
        if self.qualified || self.id.is_empty() || !color.category().is_empty() {
            return color;
        }
        Arc::new(Color::clone(&color).with_category(self.id.as_str()))
    }

    fn check_unique(&self, color: &Color) -> Result<String, RegistryError> {
        let key = self.key_of(color);
        if self.index.contains_key(&key) {
            log::debug!("palette '{}': duplicate color {}", self.id, key);
            return Err(RegistryError::DuplicateKey(key));
        }
        Ok(key)
    }

    fn emit(&mut self, event: ColorEvent) {
        if self.observers.is_empty() {
            return;
        }
        let mut observers = std::mem::take(&mut self.observers);
        for (_, observer) in observers.iter_mut() {
            observer(&event, self);
        }
        self.observers = observers;
    }
}

impl ColorRegistry for ColorManager {
    fn get(&self, id: &str) -> Option<&Arc<Color>> {
        self.index.get(id)
    }

    fn item_at(&self, index: usize) -> Option<&Arc<Color>> {
        self.list.get(index)
    }

    fn count(&self) -> usize {
        self.list.len()
    }

    fn index_of(&self, id: &str) -> Option<usize> {
        if !self.index.contains_key(id) {
            return None;
        }
        self.list.iter().position(|c| self.key_of(c) == id)
    }

    fn iter(&self) -> Box<dyn Iterator<Item = &Arc<Color>> + '_> {
        Box::new(self.list.iter())
    }
}
