//! Layered keyed store with id-scoped speculative overlays
//!
//! Values live in two layers: a confirmed layer written by the
//! authoritative sync, and a stack of overlays, one per in-flight action.
//! Reads see the topmost overlay entry for a key, falling back to the
//! confirmed value. Overlays never touch the confirmed layer, so removing
//! one restores exactly what was visible before it was applied.

use std::hash::Hash;

use ahash::AHashMap;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Opaque overlay identifier, generated per submission
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OverlayId(Uuid);

impl OverlayId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for OverlayId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for OverlayId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Removal granularity for overlay fields
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FieldCategory {
    /// What the player sees on the map (position, tile occupancy)
    Visual,
    /// Resources and other bookkeeping
    NonVisual,
}

/// Fields that belong to a removal category
pub trait Categorized {
    fn category(&self) -> FieldCategory;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OverlayStatus {
    /// Submission not yet resolved
    Pending,
    /// Submission confirmed; remaining fields wait for the sync layer
    Settled,
}

/// One field write
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mutation<K, F, V> {
    pub key: K,
    pub field: F,
    pub value: V,
}

impl<K, F, V> Mutation<K, F, V> {
    pub fn new(key: K, field: F, value: V) -> Self {
        Self { key, field, value }
    }
}

#[derive(Debug, Clone)]
struct Overlay<K, F, V> {
    id: OverlayId,
    status: OverlayStatus,
    entries: Vec<Mutation<K, F, V>>,
}

impl<K: PartialEq, F: PartialEq, V> Overlay<K, F, V> {
    fn lookup(&self, key: &K, field: &F) -> Option<&V> {
        self.entries
            .iter()
            .rev()
            .find(|m| m.key == *key && m.field == *field)
            .map(|m| &m.value)
    }
}

#[derive(Debug, Clone)]
pub struct OverlayStore<K, F, V> {
    confirmed: AHashMap<(K, F), V>,
    /// Application order, oldest first
    overlays: Vec<Overlay<K, F, V>>,
}

impl<K, F, V> Default for OverlayStore<K, F, V> {
    fn default() -> Self {
        Self {
            confirmed: AHashMap::new(),
            overlays: Vec::new(),
        }
    }
}

impl<K, F, V> OverlayStore<K, F, V>
where
    K: Clone + Eq + Hash,
    F: Clone + Eq + Hash + Categorized,
{
    pub fn new() -> Self {
        Self::default()
    }

    /// Write an authoritative value, leaving overlays in place
    pub fn confirm(&mut self, key: K, field: F, value: V) {
        self.confirmed.insert((key, field), value);
    }

    pub fn confirmed(&self, key: &K, field: &F) -> Option<&V> {
        self.confirmed.get(&(key.clone(), field.clone()))
    }

    /// Topmost overlay value for a key, ignoring the confirmed layer
    pub fn speculative(&self, key: &K, field: &F) -> Option<&V> {
        self.overlays.iter().rev().find_map(|o| o.lookup(key, field))
    }

    /// Effective value: topmost overlay entry, else the confirmed value
    pub fn get(&self, key: &K, field: &F) -> Option<&V> {
        self.speculative(key, field)
            .or_else(|| self.confirmed(key, field))
    }

    pub fn is_speculative(&self, key: &K, field: &F) -> bool {
        self.speculative(key, field).is_some()
    }

    /// Every overlaid key with its effective overlay value
    pub fn overlaid(&self) -> AHashMap<(K, F), &V> {
        let mut view = AHashMap::new();
        for overlay in &self.overlays {
            for m in &overlay.entries {
                view.insert((m.key.clone(), m.field.clone()), &m.value);
            }
        }
        view
    }

    /// Apply mutations under `id`
    ///
    /// Applying to an id that already exists appends to it; later writes
    /// to the same key win within the overlay.
    pub fn apply(&mut self, id: OverlayId, mutations: impl IntoIterator<Item = Mutation<K, F, V>>) {
        let mutations: Vec<_> = mutations.into_iter().collect();
        tracing::trace!(%id, fields = mutations.len(), "applying overlay");

        match self.overlays.iter_mut().find(|o| o.id == id) {
            Some(overlay) => overlay.entries.extend(mutations),
            None => self.overlays.push(Overlay {
                id,
                status: OverlayStatus::Pending,
                entries: mutations,
            }),
        }
    }

    /// Drop every field of an overlay; returns how many were removed
    ///
    /// Unknown ids are a no-op.
    pub fn remove_all(&mut self, id: &OverlayId) -> usize {
        let Some(index) = self.overlays.iter().position(|o| o.id == *id) else {
            return 0;
        };
        let removed = self.overlays.remove(index).entries.len();
        tracing::trace!(%id, removed, "removed overlay");
        removed
    }

    /// Drop the fields of one category from an overlay
    ///
    /// An overlay left with no fields is discarded. Unknown ids are a no-op.
    pub fn remove_by_category(&mut self, id: &OverlayId, category: FieldCategory) -> usize {
        let Some(index) = self.overlays.iter().position(|o| o.id == *id) else {
            return 0;
        };

        let overlay = &mut self.overlays[index];
        let before = overlay.entries.len();
        overlay.entries.retain(|m| m.field.category() != category);
        let removed = before - overlay.entries.len();

        if overlay.entries.is_empty() {
            self.overlays.remove(index);
        }
        tracing::trace!(%id, ?category, removed, "removed overlay fields");
        removed
    }

    /// Mark an overlay as confirmed by the authoritative call
    pub fn settle(&mut self, id: &OverlayId) -> bool {
        match self.overlays.iter_mut().find(|o| o.id == *id) {
            Some(overlay) => {
                overlay.status = OverlayStatus::Settled;
                true
            }
            None => false,
        }
    }

    pub fn status(&self, id: &OverlayId) -> Option<OverlayStatus> {
        self.overlays.iter().find(|o| o.id == *id).map(|o| o.status)
    }

    /// Authoritative update arriving from the sync layer
    ///
    /// Writes the confirmed value and drops the entries of *settled*
    /// overlays for that key. Pending overlays keep shadowing it.
    pub fn supersede(&mut self, key: K, field: F, value: V) {
        for overlay in self
            .overlays
            .iter_mut()
            .filter(|o| o.status == OverlayStatus::Settled)
        {
            overlay.entries.retain(|m| m.key != key || m.field != field);
        }
        self.overlays.retain(|o| !o.entries.is_empty());
        self.confirm(key, field, value);
    }

    pub fn contains(&self, id: &OverlayId) -> bool {
        self.overlays.iter().any(|o| o.id == *id)
    }

    /// Number of live overlays
    pub fn overlay_count(&self) -> usize {
        self.overlays.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    enum Field {
        Shown,
        Hidden,
    }

    impl Categorized for Field {
        fn category(&self) -> FieldCategory {
            match self {
                Field::Shown => FieldCategory::Visual,
                Field::Hidden => FieldCategory::NonVisual,
            }
        }
    }

    type Store = OverlayStore<u8, Field, i32>;

    fn m(key: u8, field: Field, value: i32) -> Mutation<u8, Field, i32> {
        Mutation::new(key, field, value)
    }

    #[test]
    fn test_topmost_overlay_wins() {
        let mut store = Store::new();
        store.confirm(1, Field::Shown, 10);
        let a = OverlayId::new();
        let b = OverlayId::new();
        store.apply(a, [m(1, Field::Shown, 20)]);
        store.apply(b, [m(1, Field::Shown, 30)]);
        assert_eq!(store.get(&1, &Field::Shown), Some(&30));

        store.remove_all(&b);
        assert_eq!(store.get(&1, &Field::Shown), Some(&20));
        store.remove_all(&a);
        assert_eq!(store.get(&1, &Field::Shown), Some(&10));
    }

    #[test]
    fn test_removing_middle_overlay_keeps_top() {
        let mut store = Store::new();
        let a = OverlayId::new();
        let b = OverlayId::new();
        store.apply(a, [m(1, Field::Shown, 20)]);
        store.apply(b, [m(1, Field::Shown, 30)]);
        store.remove_all(&a);
        assert_eq!(store.get(&1, &Field::Shown), Some(&30));
    }

    #[test]
    fn test_remove_by_category() {
        let mut store = Store::new();
        let id = OverlayId::new();
        store.apply(id, [m(1, Field::Shown, 1), m(1, Field::Hidden, 2)]);

        assert_eq!(store.remove_by_category(&id, FieldCategory::NonVisual), 1);
        assert_eq!(store.get(&1, &Field::Hidden), None);
        assert_eq!(store.get(&1, &Field::Shown), Some(&1));
        assert!(store.contains(&id));

        assert_eq!(store.remove_by_category(&id, FieldCategory::Visual), 1);
        assert!(!store.contains(&id));
    }

    #[test]
    fn test_unknown_id_is_noop() {
        let mut store = Store::new();
        store.confirm(1, Field::Shown, 5);
        let ghost = OverlayId::new();
        assert_eq!(store.remove_all(&ghost), 0);
        assert_eq!(store.remove_by_category(&ghost, FieldCategory::Visual), 0);
        assert!(!store.settle(&ghost));
        assert_eq!(store.get(&1, &Field::Shown), Some(&5));
    }

    #[test]
    fn test_supersede_only_drops_settled() {
        let mut store = Store::new();
        let settled = OverlayId::new();
        let pending = OverlayId::new();
        store.apply(settled, [m(1, Field::Shown, 20)]);
        store.apply(pending, [m(2, Field::Shown, 40)]);
        assert!(store.settle(&settled));
        assert_eq!(store.status(&settled), Some(OverlayStatus::Settled));
        assert_eq!(store.status(&pending), Some(OverlayStatus::Pending));

        store.supersede(1, Field::Shown, 21);
        store.supersede(2, Field::Shown, 41);
        assert_eq!(store.get(&1, &Field::Shown), Some(&21));
        assert!(!store.contains(&settled));
        assert_eq!(store.get(&2, &Field::Shown), Some(&40));
        assert_eq!(store.confirmed(&2, &Field::Shown), Some(&41));
    }

    #[test]
    fn test_overlaid_view_prefers_later_overlays() {
        let mut store = Store::new();
        store.apply(OverlayId::new(), [m(1, Field::Shown, 1), m(2, Field::Shown, 2)]);
        store.apply(OverlayId::new(), [m(1, Field::Shown, 3)]);
        let view = store.overlaid();
        assert_eq!(view.len(), 2);
        assert_eq!(view.get(&(1, Field::Shown)), Some(&&3));
    }

    fn field() -> impl Strategy<Value = Field> {
        prop_oneof![Just(Field::Shown), Just(Field::Hidden)]
    }

    proptest! {
        #[test]
        fn apply_then_remove_restores_every_field(
            confirmed in prop::collection::vec((0u8..8, field(), any::<i32>()), 0..16),
            earlier in prop::collection::vec((0u8..8, field(), any::<i32>()), 0..16),
            writes in prop::collection::vec((0u8..8, field(), any::<i32>()), 0..16),
        ) {
            let mut store = Store::new();
            for (k, f, v) in confirmed {
                store.confirm(k, f, v);
            }
            store.apply(OverlayId::new(), earlier.into_iter().map(|(k, f, v)| m(k, f, v)));

            let snapshot: Vec<Option<i32>> = (0u8..8)
                .flat_map(|k| [Field::Shown, Field::Hidden].map(|f| store.get(&k, &f).copied()))
                .collect();

            let id = OverlayId::new();
            store.apply(id, writes.into_iter().map(|(k, f, v)| m(k, f, v)));
            store.remove_all(&id);
            store.remove_all(&id);

            let after: Vec<Option<i32>> = (0u8..8)
                .flat_map(|k| [Field::Shown, Field::Hidden].map(|f| store.get(&k, &f).copied()))
                .collect();
            prop_assert_eq!(snapshot, after);
        }
    }
}
