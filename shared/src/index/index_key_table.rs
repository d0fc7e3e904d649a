use std::{collections::HashMap, fmt::Debug, hash::Hash};

use log::trace;

use crate::{sync::SyncError, ObjectIndex};

/// Bidirectional mapping between an object key and a dense, session-stable
/// [`ObjectIndex`], scoped to a single object type.
///
/// The table is append-only: indices are handed out sequentially and are
/// never reassigned or reused while the table lives, even after the object
/// behind a key has been removed. Assigning a key a second time returns the
/// index it was first given.
pub struct IndexKeyTable<K: Clone + Eq + Hash + Debug> {
    object_type: &'static str,
    key_to_index: HashMap<K, ObjectIndex>,
    index_to_key: Vec<K>,
}

impl<K: Clone + Eq + Hash + Debug> IndexKeyTable<K> {
    pub fn new(object_type: &'static str) -> Self {
        Self {
            object_type,
            key_to_index: HashMap::new(),
            index_to_key: Vec::new(),
        }
    }

    pub fn object_type(&self) -> &'static str {
        self.object_type
    }

    /// Returns the index of `key`, allocating the next sequential index if
    /// the key has never been seen
    pub fn assign(&mut self, key: &K) -> Result<ObjectIndex, SyncError> {
        if let Some(index) = self.key_to_index.get(key) {
            return Ok(*index);
        }

        let next = u32::try_from(self.index_to_key.len()).map_err(|_| {
            SyncError::IndexExhausted {
                object_type: self.object_type,
            }
        })?;
        let index = ObjectIndex::new(next);

        trace!(
            "IndexKeyTable({}): assigning index {} to {:?}",
            self.object_type,
            index,
            key
        );
        self.key_to_index.insert(key.clone(), index);
        self.index_to_key.push(key.clone());

        Ok(index)
    }

    pub fn index_of(&self, key: &K) -> Option<ObjectIndex> {
        self.key_to_index.get(key).copied()
    }

    pub fn key_of(&self, index: ObjectIndex) -> Option<&K> {
        self.index_to_key.get(index.as_usize())
    }

    /// Like [`Self::index_of`], but reports a missing key as a consistency error
    pub fn try_index_of(&self, key: &K) -> Result<ObjectIndex, SyncError> {
        self.index_of(key).ok_or_else(|| SyncError::UnknownKey {
            object_type: self.object_type,
            key: format!("{:?}", key),
        })
    }

    pub fn try_key_of(&self, index: ObjectIndex) -> Result<&K, SyncError> {
        self.key_of(index).ok_or(SyncError::UnknownIndex {
            object_type: self.object_type,
            index: index.get(),
        })
    }

    pub fn contains_key(&self, key: &K) -> bool {
        self.key_to_index.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.index_to_key.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index_to_key.is_empty()
    }

    /// Iterates every assignment in index order
    pub fn iter(&self) -> impl Iterator<Item = (ObjectIndex, &K)> {
        self.index_to_key
            .iter()
            .enumerate()
            .map(|(index, key)| (ObjectIndex::new(index as u32), key))
    }
}
