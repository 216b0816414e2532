//! Color list with per-color usage accounting.

use serde::Serialize;
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use std::ops::Deref;
use std::sync::Arc;

use crate::color::{Color, ColorKey};
use crate::stitch::{Element, ElementId};

use super::manager::{ColorEvent, ColorManager, ColorRecord, ObserverId};
use super::traits::ColorRegistry;
use super::{LoadError, RegistryError, UsageError};

/// Back-references from each color to the elements using it.
pub type BackRefMap = HashMap<ColorKey, HashSet<ElementId>>;

/// What an element contributed when it was acquired.
#[derive(Debug, Clone)]
struct Acquisition {
    color: Arc<Color>,
    weight: u32,
}

/// One legend row: a color and how much of it the document uses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColorUsage {
    pub id: String,
    pub palette: String,
    pub name: String,
    pub hex: String,
    pub stitches: usize,
    pub weight: u64,
}

/// A [`ColorManager`] that also tracks which elements use each color.
///
/// For every color `C`:
/// `weight_of(C) == sum(weight(e) for e in items(C))`, and
/// `total_weight()` is the sum over all colors. An element is registered
/// under at most one color at a time.
///
/// Colors are told apart by [`ColorKey`], so `dmc:310` and a custom
/// palette's `310` are tracked separately. The color list is
/// [qualified](ColorManager::qualified): `get` and `remove` take
/// `category:id` keys.
///
/// Elements are never owned. The tracker keeps the color and weight recorded
/// at acquire time, so [`release`](Self::release) stays correct after the
/// element itself has been recolored or dropped.
///
/// Read access to the color list goes through `Deref<Target = ColorManager>`;
/// list mutations are re-exposed here so that removal can be refused while a
/// color is still in use.
#[derive(Debug)]
pub struct ColorUsageTracker {
    colors: ColorManager,
    backrefs: BackRefMap,
    weights: HashMap<ColorKey, u64>,
    owners: HashMap<ElementId, Acquisition>,
    total: u64,
}

impl Default for ColorUsageTracker {
    fn default() -> Self {
        Self {
            colors: ColorManager::qualified(),
            backrefs: HashMap::new(),
            weights: HashMap::new(),
            owners: HashMap::new(),
            total: 0,
        }
    }
}

impl Deref for ColorUsageTracker {
    type Target = ColorManager;

    fn deref(&self) -> &ColorManager {
        &self.colors
    }
}

impl ColorUsageTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `element` as a user of its current color.
    ///
    /// Unknown colors are added to the list first. Acquiring an element that
    /// is already registered under the same color is a no-op.
    ///
    /// # Errors
    ///
    /// - `UsageError::AlreadyAcquired` if the element is registered under a
    ///   different color and was not released first.
    /// - `UsageError::IdConflict` if a different color is already registered
    ///   under the same key.
    ///
    /// Nothing is modified on error.
    pub fn acquire<E: Element + ?Sized>(&mut self, element: &E) -> Result<(), UsageError> {
        let element_id = element.id();
        let color = element.color();
        let key = color.key();

        if let Some(current) = self.owners.get(&element_id) {
            let current = current.color.key();
            if current == key {
                return Ok(());
            }
            log::warn!("element {} acquired for {} while still using {}", element_id, key, current);
            return Err(UsageError::AlreadyAcquired {
                element: element_id,
                current: current.to_string(),
            });
        }

        let registered = match self.colors.get(&key.to_string()) {
            Some(existing) if existing != color => {
                return Err(UsageError::IdConflict(key.to_string()));
            }
            Some(existing) => Arc::clone(existing),
            None => {
                self.colors.add(Arc::clone(color))?;
                Arc::clone(color)
            }
        };

        let weight = element.weight();
        log::debug!("acquire {} -> {} (+{})", element_id, key, weight);
        self.backrefs.entry(key.clone()).or_default().insert(element_id);
        *self.weights.entry(key).or_default() += u64::from(weight);
        self.total += u64::from(weight);
        self.owners.insert(element_id, Acquisition { color: registered, weight });
        Ok(())
    }

    /// Unregister an element from whatever color it was acquired under.
    ///
    /// Returns false (and changes nothing) if the element was never acquired.
    /// The color stays registered even when its last user goes away.
    pub fn release(&mut self, element: ElementId) -> bool {
        let Some(Acquisition { color, weight }) = self.owners.remove(&element) else {
            return false;
        };
        let key = color.key();

        if let Some(users) = self.backrefs.get_mut(&key) {
            users.remove(&element);
            if users.is_empty() {
                self.backrefs.remove(&key);
                self.weights.remove(&key);
            } else if let Some(w) = self.weights.get_mut(&key) {
                *w -= u64::from(weight);
            }
        }
        self.total -= u64::from(weight);
        log::debug!("release {} from {} (-{})", element, key, weight);
        true
    }

    /// Elements currently using a color, `None` when it has no users.
    pub fn items(&self, color: &Color) -> Option<&HashSet<ElementId>> {
        self.backrefs.get(&color.key())
    }

    /// Full back-reference accounting.
    pub fn backref_map(&self) -> &BackRefMap {
        &self.backrefs
    }

    /// Summed weight of a color's users (0 if unused or unknown).
    pub fn weight_of(&self, color: &Color) -> u64 {
        self.weights.get(&color.key()).copied().unwrap_or(0)
    }

    /// Summed weight across all colors.
    pub fn total_weight(&self) -> u64 {
        self.total
    }

    pub fn user_count(&self, color: &Color) -> usize {
        self.items(color).map_or(0, HashSet::len)
    }

    pub fn is_used(&self, color: &Color) -> bool {
        self.backrefs.contains_key(&color.key())
    }

    /// Color an element was acquired under.
    pub fn color_of(&self, element: ElementId) -> Option<&Arc<Color>> {
        self.owners.get(&element).map(|a| &a.color)
    }

    /// Drop all usage accounting while keeping the color list.
    pub fn reset_usage(&mut self) {
        self.backrefs.clear();
        self.weights.clear();
        self.owners.clear();
        self.total = 0;
    }

    /// Legend rows for every used color, in display order.
    pub fn usage_report(&self) -> Vec<ColorUsage> {
        self.colors
            .colors()
            .iter()
            .filter(|c| self.is_used(c))
            .map(|c| ColorUsage {
                id: c.id().to_string(),
                palette: c.category().to_string(),
                name: c.name().to_string(),
                hex: c.rgb().to_hex(),
                stitches: self.user_count(c),
                weight: self.weight_of(c),
            })
            .collect()
    }

    /// Recompute every aggregate from the back-references and compare.
    pub fn is_consistent(&self) -> bool {
        let mut total = 0;
        for (key, users) in &self.backrefs {
            if users.is_empty() || !self.colors.contains(&key.to_string()) {
                return false;
            }
            let expected: u64 = users
                .iter()
                .filter_map(|e| self.owners.get(e))
                .filter(|a| a.color.key() == *key)
                .map(|a| u64::from(a.weight))
                .sum();
            let owned = users.iter().filter(|e| self.owners.contains_key(*e)).count();
            if owned != users.len() || self.weights.get(key).copied() != Some(expected) {
                return false;
            }
            total += expected;
        }
        let referenced: usize = self.backrefs.values().map(HashSet::len).sum();
        referenced == self.owners.len()
            && self.weights.len() == self.backrefs.len()
            && total == self.total
    }

    pub fn add(&mut self, color: Arc<Color>) -> Result<(), RegistryError> {
        self.colors.add(color)
    }

    pub fn insert(&mut self, color: Arc<Color>, before: usize) -> Result<(), RegistryError> {
        self.colors.insert(color, before)
    }

    /// Remove a color that has no users.
    ///
    /// # Errors
    ///
    /// `RegistryError::InUse` while any element is still acquired under the
    /// color, `RegistryError::NotFound` if it is not registered.
    pub fn remove(&mut self, key: &str) -> Result<Arc<Color>, RegistryError> {
        let Some(color) = self.colors.get(key) else {
            return Err(RegistryError::NotFound(key.to_string()));
        };
        let users = self.user_count(color);
        if users > 0 {
            log::warn!("refusing to remove color {} with {} users", key, users);
            return Err(RegistryError::InUse { id: key.to_string(), users });
        }
        self.colors.remove(key)
    }

    pub fn swap(&mut self, i: usize, j: usize) {
        self.colors.swap(i, j);
    }

    /// Clear colors and usage together. Back-references are discarded
    /// without individual releases.
    pub fn clear(&mut self) {
        self.reset_usage();
        self.colors.clear();
    }

    pub fn load(&mut self, data: &Value) -> Result<usize, LoadError> {
        self.colors.load(data)
    }

    pub fn extend<I>(&mut self, records: I) -> Result<usize, LoadError>
    where
        I: IntoIterator<Item = ColorRecord>,
    {
        self.colors.extend(records)
    }

    pub fn subscribe<F>(&mut self, observer: F) -> ObserverId
    where
        F: FnMut(&ColorEvent, &ColorManager) + 'static,
    {
        self.colors.subscribe(observer)
    }

    pub fn unsubscribe(&mut self, id: ObserverId) -> bool {
        self.colors.unsubscribe(id)
    }
}

impl ColorRegistry for ColorUsageTracker {
    fn get(&self, id: &str) -> Option<&Arc<Color>> {
        self.colors.get(id)
    }

    fn item_at(&self, index: usize) -> Option<&Arc<Color>> {
        self.colors.item_at(index)
    }

    fn count(&self) -> usize {
        self.colors.count()
    }

    fn index_of(&self, id: &str) -> Option<usize> {
        self.colors.index_of(id)
    }

    fn iter(&self) -> Box<dyn Iterator<Item = &Arc<Color>> + '_> {
        self.colors.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Rgb;
    use std::cell::RefCell;
    use std::rc::Rc;

    struct Item {
        id: ElementId,
        color: Arc<Color>,
        weight: u32,
    }

    impl Element for Item {
        fn id(&self) -> ElementId {
            self.id
        }

        fn color(&self) -> &Arc<Color> {
            &self.color
        }

        fn weight(&self) -> u32 {
            self.weight
        }
    }

    fn red() -> Arc<Color> {
        Arc::new(Color::new("Red", "Red", Rgb::new(255, 0, 0)))
    }

    fn blue() -> Arc<Color> {
        Arc::new(Color::new("Blue", "Blue", Rgb::new(0, 0, 255)))
    }

    fn item(id: u64, color: &Arc<Color>, weight: u32) -> Item {
        Item { id: ElementId(id), color: Arc::clone(color), weight }
    }

    #[test]
    fn test_acquire_release_scenario() {
        let red = red();
        let mut tracker = ColorUsageTracker::new();
        let e1 = item(1, &red, 8);
        let e2 = item(2, &red, 4);

        tracker.acquire(&e1).unwrap();
        assert_eq!(tracker.items(&red), Some(&HashSet::from([ElementId(1)])));
        assert_eq!(tracker.total_weight(), 8);

        tracker.acquire(&e2).unwrap();
        assert_eq!(tracker.total_weight(), 12);
        assert_eq!(tracker.weight_of(&red), 12);

        assert!(tracker.release(e1.id()));
        assert_eq!(tracker.total_weight(), 4);
        assert_eq!(tracker.items(&red), Some(&HashSet::from([ElementId(2)])));

        assert!(tracker.release(e2.id()));
        assert_eq!(tracker.total_weight(), 0);
        assert!(tracker.get("Red").is_some());
        assert!(tracker.items(&red).is_none());
        assert_eq!(tracker.weight_of(&red), 0);
        assert!(tracker.is_consistent());
    }

    #[test]
    fn test_acquire_registers_color_once() {
        let red = red();
        let mut tracker = ColorUsageTracker::new();
        let events = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&events);
        tracker.subscribe(move |event, _| sink.borrow_mut().push(*event));

        tracker.acquire(&item(1, &red, 8)).unwrap();
        tracker.acquire(&item(2, &red, 8)).unwrap();
        assert_eq!(tracker.count(), 1);
        assert_eq!(*events.borrow(), vec![ColorEvent::Appended]);
    }

    #[test]
    fn test_reacquire_same_color_is_noop() {
        let red = red();
        let mut tracker = ColorUsageTracker::new();
        let e1 = item(1, &red, 8);
        tracker.acquire(&e1).unwrap();
        tracker.acquire(&e1).unwrap();
        assert_eq!(tracker.total_weight(), 8);
        assert_eq!(tracker.user_count(&red), 1);
    }

    #[test]
    fn test_acquire_under_second_color_rejected() {
        let (red, blue) = (red(), blue());
        let mut tracker = ColorUsageTracker::new();
        tracker.acquire(&item(1, &red, 8)).unwrap();

        let result = tracker.acquire(&item(1, &blue, 8));
        assert_eq!(
            result,
            Err(UsageError::AlreadyAcquired { element: ElementId(1), current: "Red".to_string() })
        );
        assert!(!tracker.contains("Blue"));
        assert_eq!(tracker.total_weight(), 8);
        assert!(tracker.is_consistent());
    }

    #[test]
    fn test_acquire_id_conflict() {
        let red = red();
        let mut tracker = ColorUsageTracker::new();
        tracker.acquire(&item(1, &red, 8)).unwrap();

        let other_red = Arc::new(Color::new("Red", "Crimson", Rgb::new(200, 0, 0)));
        let result = tracker.acquire(&item(2, &other_red, 8));
        assert_eq!(result, Err(UsageError::IdConflict("Red".to_string())));
        assert_eq!(tracker.user_count(&red), 1);
    }

    #[test]
    fn test_same_id_in_two_palettes_tracked_apart() {
        let black = Arc::new(Color::new("310", "Black", Rgb::new(0, 0, 0)).with_category("dmc"));
        let navy = Arc::new(Color::new("310", "Navy", Rgb::new(0, 0, 128)).with_category("mine"));
        let mut tracker = ColorUsageTracker::new();

        tracker.acquire(&item(1, &black, 8)).unwrap();
        tracker.acquire(&item(2, &navy, 4)).unwrap();
        tracker.acquire(&item(3, &navy, 4)).unwrap();

        assert_eq!(tracker.count(), 2);
        assert_eq!(tracker.weight_of(&black), 8);
        assert_eq!(tracker.weight_of(&navy), 8);
        assert_eq!(tracker.items(&black), Some(&HashSet::from([ElementId(1)])));
        assert_eq!(tracker.total_weight(), 16);
        assert!(Arc::ptr_eq(tracker.get("mine:310").unwrap(), &navy));
        assert!(tracker.is_consistent());

        let report = tracker.usage_report();
        let palettes: Vec<&str> = report.iter().map(|r| r.palette.as_str()).collect();
        assert_eq!(palettes, vec!["dmc", "mine"]);

        assert_eq!(
            tracker.remove("mine:310"),
            Err(RegistryError::InUse { id: "mine:310".to_string(), users: 2 })
        );
        tracker.release(ElementId(1));
        assert!(tracker.remove("dmc:310").is_ok());
        assert_eq!(tracker.weight_of(&navy), 8);
    }

    #[test]
    fn test_release_twice_is_noop() {
        let red = red();
        let mut tracker = ColorUsageTracker::new();
        tracker.acquire(&item(1, &red, 8)).unwrap();
        tracker.acquire(&item(2, &red, 2)).unwrap();

        assert!(tracker.release(ElementId(1)));
        assert!(!tracker.release(ElementId(1)));
        assert!(!tracker.release(ElementId(99)));
        assert_eq!(tracker.total_weight(), 2);
        assert!(tracker.is_consistent());
    }

    #[test]
    fn test_release_uses_recorded_color() {
        let (red, blue) = (red(), blue());
        let mut tracker = ColorUsageTracker::new();
        let mut e1 = item(1, &red, 8);
        tracker.acquire(&e1).unwrap();

        // Element recolored before the tracker hears about it.
        e1.color = Arc::clone(&blue);
        assert_eq!(tracker.color_of(e1.id()).map(|c| c.id()), Some("Red"));
        assert!(tracker.release(e1.id()));
        tracker.acquire(&e1).unwrap();

        assert_eq!(tracker.weight_of(&red), 0);
        assert_eq!(tracker.weight_of(&blue), 8);
        assert!(tracker.is_consistent());
    }

    #[test]
    fn test_remove_refused_while_in_use() {
        let red = red();
        let mut tracker = ColorUsageTracker::new();
        tracker.acquire(&item(1, &red, 8)).unwrap();

        assert_eq!(
            tracker.remove("Red"),
            Err(RegistryError::InUse { id: "Red".to_string(), users: 1 })
        );
        tracker.release(ElementId(1));
        assert!(tracker.remove("Red").is_ok());
        assert_eq!(tracker.remove("Red"), Err(RegistryError::NotFound("Red".to_string())));
    }

    #[test]
    fn test_clear_discards_usage() {
        let red = red();
        let mut tracker = ColorUsageTracker::new();
        tracker.acquire(&item(1, &red, 8)).unwrap();
        tracker.clear();

        assert!(tracker.is_empty());
        assert_eq!(tracker.total_weight(), 0);
        assert!(tracker.backref_map().is_empty());
        assert!(!tracker.release(ElementId(1)));
    }

    #[test]
    fn test_usage_report_in_display_order() {
        let (red, blue) = (red(), blue());
        let mut tracker = ColorUsageTracker::new();
        tracker.add(Arc::new(Color::new("White", "White", Rgb::new(255, 255, 255)))).unwrap();
        tracker.acquire(&item(1, &red, 8)).unwrap();
        tracker.acquire(&item(2, &blue, 4)).unwrap();
        tracker.acquire(&item(3, &blue, 1)).unwrap();
        tracker.swap(1, 2);

        let report = tracker.usage_report();
        assert_eq!(
            report,
            vec![
                ColorUsage {
                    id: "Blue".to_string(),
                    palette: String::new(),
                    name: "Blue".to_string(),
                    hex: "#0000FF".to_string(),
                    stitches: 2,
                    weight: 5,
                },
                ColorUsage {
                    id: "Red".to_string(),
                    palette: String::new(),
                    name: "Red".to_string(),
                    hex: "#FF0000".to_string(),
                    stitches: 1,
                    weight: 8,
                },
            ]
        );
    }

    #[test]
    fn test_invariants_hold_under_churn() {
        let palette: Vec<Arc<Color>> = (0..5)
            .map(|i| Arc::new(Color::new(format!("c{}", i), "c", Rgb::new(i, i, i))))
            .collect();
        let mut tracker = ColorUsageTracker::new();
        let mut live: Vec<u64> = Vec::new();

        // Deterministic pseudo-random sequence of acquires and releases.
        let mut state: u64 = 0x2545_F491_4F6C_DD1D;
        for step in 0..2000u64 {
            state ^= state << 13;
            state ^= state >> 7;
            state ^= state << 17;
            if state % 3 == 0 && !live.is_empty() {
                let victim = live.swap_remove((state as usize / 3) % live.len());
                assert!(tracker.release(ElementId(victim)));
            } else {
                let color = &palette[(state % 5) as usize];
                let weight = [8, 4, 1, 2][(state % 4) as usize];
                tracker.acquire(&item(step, color, weight)).unwrap();
                live.push(step);
            }
            if step % 97 == 0 {
                assert!(tracker.is_consistent());
            }
        }

        assert!(tracker.is_consistent());
        let sum: u64 = palette.iter().map(|c| tracker.weight_of(c)).sum();
        assert_eq!(sum, tracker.total_weight());
        let users: usize = tracker.backref_map().values().map(HashSet::len).sum();
        assert_eq!(users, live.len());
    }
}
