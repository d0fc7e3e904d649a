use std::{collections::BTreeMap, marker::PhantomData};

use log::trace;

use crate::{change::DiffMask, index::IndexKeyTable, ObjectIndex};

use super::{
    error::{ConfigError, SyncError},
    object::{ObjectTypeConfig, RemovalSemantics, SyncObject, SyncStrategy},
    packet::{RemoveOutcome, SyncEntry, SyncPacket, UpdateOutcome},
};

/// One changed object handed to [`SyncGenerator::generate_update`]
pub struct Change<'a, T: SyncObject> {
    pub key: &'a T::Key,
    pub object: &'a T,
    /// Fields that changed. None means the whole object changed.
    pub mask: Option<&'a DiffMask>,
}

impl<'a, T: SyncObject> Change<'a, T> {
    pub fn whole(key: &'a T::Key, object: &'a T) -> Self {
        Self {
            key,
            object,
            mask: None,
        }
    }

    pub fn fields(key: &'a T::Key, object: &'a T, mask: &'a DiffMask) -> Self {
        Self {
            key,
            object,
            mask: Some(mask),
        }
    }
}

/// Builds Init / Update / Remove packets for one object type.
///
/// Generators hold nothing but their type's configuration, so every call is
/// a pure function of the table and objects passed in. Entries are emitted in
/// index order and a key that appears more than once is emitted once.
pub struct SyncGenerator<T: SyncObject> {
    config: ObjectTypeConfig,
    phantom_t: PhantomData<fn() -> T>,
}

impl<T: SyncObject> SyncGenerator<T> {
    pub fn new(config: ObjectTypeConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            config,
            phantom_t: PhantomData,
        })
    }

    /// A generator using the object type's declared configuration
    pub fn for_type() -> Result<Self, ConfigError> {
        Self::new(T::type_config())
    }

    pub fn config(&self) -> &ObjectTypeConfig {
        &self.config
    }

    pub fn object_type(&self) -> &'static str {
        self.config.name
    }

    /// Full snapshot of every object passed in. Used only to bring a viewer
    /// from nothing to fully synced, never for a partial set.
    pub fn generate_init<'a, I>(
        &self,
        table: &IndexKeyTable<T::Key>,
        objects: I,
    ) -> Result<SyncPacket<T::Payload>, SyncError>
    where
        I: IntoIterator<Item = (&'a T::Key, &'a T)>,
        T: 'a,
    {
        let mut entries = BTreeMap::new();
        for (key, object) in objects {
            let index = table.try_index_of(key)?;
            entries.insert(index, object.snapshot());
        }

        Ok(SyncPacket::Init {
            entries: into_entries(entries),
        })
    }

    /// Builds the Update for a batch of changes.
    ///
    /// With [`SyncStrategy::Delta`] only `changed` is sent, each object
    /// limited to its changed fields. With [`SyncStrategy::FullResync`] the
    /// whole `collection` is sent as full snapshots. An empty `changed` set
    /// yields [`UpdateOutcome::NoOp`] under both strategies.
    pub fn generate_update<'a>(
        &self,
        table: &IndexKeyTable<T::Key>,
        changed: &[Change<'a, T>],
        collection: &[(&'a T::Key, &'a T)],
    ) -> Result<UpdateOutcome<T::Payload>, SyncError> {
        if changed.is_empty() {
            trace!("SyncGenerator({}): no changes, skipping update", self.config.name);
            return Ok(UpdateOutcome::NoOp);
        }

        let mut entries = BTreeMap::new();
        match self.config.strategy {
            SyncStrategy::Delta => {
                for change in changed {
                    let index = table.try_index_of(change.key)?;
                    let payload = match change.mask {
                        Some(mask) => change.object.diff(mask),
                        None => change.object.snapshot(),
                    };
                    entries.insert(index, payload);
                }
            }
            SyncStrategy::FullResync => {
                // the hint still has to be consistent with the table
                for change in changed {
                    table.try_index_of(change.key)?;
                }
                for (key, object) in collection {
                    let index = table.try_index_of(key)?;
                    entries.insert(index, object.snapshot());
                }
            }
        }

        Ok(UpdateOutcome::Packet(SyncPacket::Update {
            entries: into_entries(entries),
        }))
    }

    pub fn generate_remove(
        &self,
        table: &IndexKeyTable<T::Key>,
        keys: &[T::Key],
    ) -> Result<RemoveOutcome<T::Payload>, SyncError> {
        if self.config.removal == RemovalSemantics::None {
            return Ok(RemoveOutcome::Absent);
        }
        if keys.is_empty() {
            trace!("SyncGenerator({}): no removals, skipping remove", self.config.name);
            return Ok(RemoveOutcome::Absent);
        }

        let mut indices = Vec::with_capacity(keys.len());
        for key in keys {
            indices.push(table.try_index_of(key)?);
        }
        indices.sort();
        indices.dedup();

        Ok(RemoveOutcome::Packet(SyncPacket::Remove { indices }))
    }

    /// Builds a Remove from indices already resolved by the caller
    pub fn generate_remove_indices(
        &self,
        table: &IndexKeyTable<T::Key>,
        indices: &[ObjectIndex],
    ) -> Result<RemoveOutcome<T::Payload>, SyncError> {
        if self.config.removal == RemovalSemantics::None || indices.is_empty() {
            return Ok(RemoveOutcome::Absent);
        }

        let mut indices = indices.to_vec();
        for index in &indices {
            table.try_key_of(*index)?;
        }
        indices.sort();
        indices.dedup();

        Ok(RemoveOutcome::Packet(SyncPacket::Remove { indices }))
    }
}

fn into_entries<P>(entries: BTreeMap<ObjectIndex, P>) -> Vec<SyncEntry<P>> {
    entries
        .into_iter()
        .map(|(index, payload)| SyncEntry { index, payload })
        .collect()
}
