use std::collections::BTreeMap;

use log::info;

use replicant_shared::{Asset, IndexKeyTable, ObjectIndex, ObjectTypeConfig};

use crate::ReplicationError;

/// A batch of asset keys whose state viewers must be told about
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AssetChangeSet {
    pub updated: Vec<String>,
    pub removed: Vec<String>,
}

impl AssetChangeSet {
    pub fn record_updated(&mut self, key: &str) {
        self.removed.retain(|removed| removed != key);
        if !self.updated.iter().any(|updated| updated == key) {
            self.updated.push(key.to_string());
        }
    }

    pub fn record_removed(&mut self, key: &str) {
        self.updated.retain(|updated| updated != key);
        if !self.removed.iter().any(|removed| removed == key) {
            self.removed.push(key.to_string());
        }
    }

    /// Applies `other` after this set, later records winning
    pub fn merge(&mut self, other: AssetChangeSet) {
        for key in &other.updated {
            self.record_updated(key);
        }
        for key in &other.removed {
            self.record_removed(key);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.updated.is_empty() && self.removed.is_empty()
    }
}

/// The loaded assets of one type together with their index table
pub struct AssetRegistry<T: Asset> {
    config: ObjectTypeConfig,
    table: IndexKeyTable<String>,
    assets: BTreeMap<ObjectIndex, (String, T)>,
}

impl<T: Asset> AssetRegistry<T> {
    pub fn new(config: ObjectTypeConfig) -> Self {
        let table = IndexKeyTable::new(config.name);
        Self {
            config,
            table,
            assets: BTreeMap::new(),
        }
    }

    pub fn config(&self) -> &ObjectTypeConfig {
        &self.config
    }

    pub fn table(&self) -> &IndexKeyTable<String> {
        &self.table
    }

    /// Loads or replaces assets. Nothing is loaded if the resulting count
    /// would exceed the type's declared bound.
    pub fn load(&mut self, assets: Vec<T>) -> Result<AssetChangeSet, ReplicationError> {
        let mut incoming: BTreeMap<String, T> = BTreeMap::new();
        for asset in assets {
            incoming.insert(asset.id().to_string(), asset);
        }

        let new_count = incoming
            .keys()
            .filter(|key| !self.contains(key))
            .count();
        self.config.check_count(self.assets.len() + new_count)?;

        let mut changes = AssetChangeSet::default();
        for (key, asset) in incoming {
            let index = self.table.assign(&key)?;
            changes.record_updated(&key);
            self.assets.insert(index, (key, asset));
        }

        info!(
            "Loaded {} {} assets, {} total",
            changes.updated.len(),
            self.config.name,
            self.assets.len()
        );
        Ok(changes)
    }

    /// Unloads assets. Every key must be loaded or nothing is removed.
    /// Their indices stay reserved in the table.
    pub fn remove(&mut self, keys: &[String]) -> Result<AssetChangeSet, ReplicationError> {
        let mut indices = Vec::with_capacity(keys.len());
        for key in keys {
            match self.table.index_of(key) {
                Some(index) if self.assets.contains_key(&index) => indices.push(index),
                _ => {
                    return Err(ReplicationError::AssetNotLoaded {
                        object_type: self.config.name,
                        key: key.clone(),
                    })
                }
            }
        }

        let mut changes = AssetChangeSet::default();
        for index in indices {
            if let Some((key, _)) = self.assets.remove(&index) {
                changes.record_removed(&key);
            }
        }
        Ok(changes)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn get(&self, key: &str) -> Option<&T> {
        let index = self.table.index_of(&key.to_string())?;
        self.assets.get(&index).map(|(_, asset)| asset)
    }

    /// Loaded assets in index order
    pub fn iter(&self) -> impl Iterator<Item = (&String, &T)> {
        self.assets.values().map(|(key, asset)| (key, asset))
    }

    pub fn len(&self) -> usize {
        self.assets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }
}
