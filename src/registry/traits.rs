//! Common read-only interface for ordered color lists.

use std::sync::Arc;

use crate::color::Color;

/// Read access shared by every ordered, id-keyed color list.
///
/// Implemented by [`ColorManager`](super::ColorManager) and
/// [`ColorUsageTracker`](super::ColorUsageTracker) so that presentation code
/// can render either one without caring which it has.
///
/// # Example
///
/// ```
/// use stitchbook::color::{Color, Rgb};
/// use stitchbook::registry::{ColorManager, ColorRegistry};
/// use std::sync::Arc;
///
/// let mut manager = ColorManager::new();
/// manager.add(Arc::new(Color::new("310", "Black", Rgb::new(0, 0, 0)))).unwrap();
///
/// assert!(manager.contains("310"));
/// assert_eq!(manager.count(), 1);
/// ```
pub trait ColorRegistry {
    /// Look up a color by key: the bare id in a palette, `category:id` in a
    /// qualified list.
    fn get(&self, id: &str) -> Option<&Arc<Color>>;

    /// Color at a display position, `None` when out of range.
    fn item_at(&self, index: usize) -> Option<&Arc<Color>>;

    /// Number of registered colors.
    fn count(&self) -> usize;

    /// Check if a color with the given id is registered.
    fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    /// Check if the list is empty.
    fn is_empty(&self) -> bool {
        self.count() == 0
    }

    /// Display position of a color id.
    fn index_of(&self, id: &str) -> Option<usize>;

    /// Iterate colors in display order.
    fn iter(&self) -> Box<dyn Iterator<Item = &Arc<Color>> + '_>;
}
