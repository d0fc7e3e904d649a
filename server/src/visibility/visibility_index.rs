use std::{
    collections::{BTreeMap, HashMap, HashSet},
    hash::Hash,
};

use replicant_shared::ViewerKey;

/// Per (object, viewer) replication state. A pair that is not tracked at all
/// is `Unknown`: the viewer has never been handed the object.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PairState {
    /// The viewer can see the object but holds no baseline yet; the next
    /// sweep sends it a full Init
    JustBecameVisible,
    /// The viewer holds the latest baseline and only needs deltas
    Synced,
}

/// Which viewers can currently observe which objects, fed by the external
/// interest-management system.
pub struct VisibilityIndex<O: Copy + Eq + Hash> {
    viewers_of_object: HashMap<O, BTreeMap<ViewerKey, PairState>>,
    objects_of_viewer: HashMap<ViewerKey, HashSet<O>>,
}

impl<O: Copy + Eq + Hash> VisibilityIndex<O> {
    pub fn new() -> Self {
        Self {
            viewers_of_object: HashMap::new(),
            objects_of_viewer: HashMap::new(),
        }
    }

    pub fn state(&self, object: &O, viewer: &ViewerKey) -> Option<PairState> {
        self.viewers_of_object
            .get(object)
            .and_then(|viewers| viewers.get(viewer))
            .copied()
    }

    /// Starts tracking the pair as `JustBecameVisible`. Returns false if the
    /// pair was already tracked, in which case its state is left alone.
    pub fn gain(&mut self, object: O, viewer: ViewerKey) -> bool {
        let viewers = self.viewers_of_object.entry(object).or_default();
        if viewers.contains_key(&viewer) {
            return false;
        }
        viewers.insert(viewer, PairState::JustBecameVisible);
        self.objects_of_viewer
            .entry(viewer)
            .or_default()
            .insert(object);
        true
    }

    /// Stops tracking the pair, returning the state it was in
    pub fn lose(&mut self, object: &O, viewer: &ViewerKey) -> Option<PairState> {
        let viewers = self.viewers_of_object.get_mut(object)?;
        let state = viewers.remove(viewer)?;
        if viewers.is_empty() {
            self.viewers_of_object.remove(object);
        }
        if let Some(objects) = self.objects_of_viewer.get_mut(viewer) {
            objects.remove(object);
            if objects.is_empty() {
                self.objects_of_viewer.remove(viewer);
            }
        }
        Some(state)
    }

    /// Moves a `JustBecameVisible` pair to `Synced`. Returns false if the
    /// pair is not awaiting its Init.
    pub fn mark_synced(&mut self, object: &O, viewer: &ViewerKey) -> bool {
        let Some(state) = self
            .viewers_of_object
            .get_mut(object)
            .and_then(|viewers| viewers.get_mut(viewer))
        else {
            return false;
        };
        if *state != PairState::JustBecameVisible {
            return false;
        }
        *state = PairState::Synced;
        true
    }

    /// Every viewer of `object` goes back to awaiting a full Init, returning
    /// the viewers that were `Synced`
    pub fn reset_object(&mut self, object: &O) -> Vec<ViewerKey> {
        let Some(viewers) = self.viewers_of_object.get_mut(object) else {
            return Vec::new();
        };
        let mut were_synced = Vec::new();
        for (viewer, state) in viewers.iter_mut() {
            if *state == PairState::Synced {
                were_synced.push(*viewer);
            }
            *state = PairState::JustBecameVisible;
        }
        were_synced
    }

    /// Forgets the object entirely, returning every pair it had
    pub fn remove_object(&mut self, object: &O) -> Vec<(ViewerKey, PairState)> {
        let Some(viewers) = self.viewers_of_object.remove(object) else {
            return Vec::new();
        };
        for viewer in viewers.keys() {
            if let Some(objects) = self.objects_of_viewer.get_mut(viewer) {
                objects.remove(object);
                if objects.is_empty() {
                    self.objects_of_viewer.remove(viewer);
                }
            }
        }
        viewers.into_iter().collect()
    }

    /// Forgets the viewer entirely, returning every pair it had
    pub fn remove_viewer(&mut self, viewer: &ViewerKey) -> Vec<(O, PairState)> {
        let Some(objects) = self.objects_of_viewer.remove(viewer) else {
            return Vec::new();
        };
        let mut removed = Vec::with_capacity(objects.len());
        for object in objects {
            if let Some(viewers) = self.viewers_of_object.get_mut(&object) {
                if let Some(state) = viewers.remove(viewer) {
                    removed.push((object, state));
                }
                if viewers.is_empty() {
                    self.viewers_of_object.remove(&object);
                }
            }
        }
        removed
    }

    /// Viewers of `object` in viewer order
    pub fn viewers(&self, object: &O) -> impl Iterator<Item = (ViewerKey, PairState)> + '_ {
        self.viewers_of_object
            .get(object)
            .into_iter()
            .flat_map(|viewers| viewers.iter().map(|(viewer, state)| (*viewer, *state)))
    }

    pub fn viewer_count(&self, object: &O) -> usize {
        self.viewers_of_object
            .get(object)
            .map_or(0, |viewers| viewers.len())
    }

    pub fn objects_of(&self, viewer: &ViewerKey) -> impl Iterator<Item = &O> + '_ {
        self.objects_of_viewer
            .get(viewer)
            .into_iter()
            .flat_map(|objects| objects.iter())
    }
}

impl<O: Copy + Eq + Hash> Default for VisibilityIndex<O> {
    fn default() -> Self {
        Self::new()
    }
}
