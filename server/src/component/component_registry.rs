use std::{
    collections::{BTreeMap, HashMap},
    sync::Arc,
};

use log::{info, trace, warn};

use replicant_shared::{
    ChangeTracker, GlobalEntity, IndexKeyTable, ObjectIndex, ObjectTypeConfig, PacketCache,
    RemovalSemantics, SharedPacket, SyncError, SyncGenerator, SyncObject, Tick, ViewerKey,
};

use crate::{
    outbound::OutboundQueues,
    server_config::ReplicationConfig,
    visibility::{PairState, VisibilityIndex},
    ReplicationError, SweepReport,
};

use super::sweep::{run_batches, SweepContext, TrackedComponent};

/// Every instance of one component type, who can see them, and what each
/// viewer still has to be told.
///
/// Visibility is tracked per entity, so a viewer that can already see an
/// entity receives an Init as soon as the component is attached to it.
pub struct ComponentRegistry<T: SyncObject<Key = GlobalEntity>> {
    generator: SyncGenerator<T>,
    table: IndexKeyTable<GlobalEntity>,
    components: HashMap<GlobalEntity, TrackedComponent<T>>,
    visibility: VisibilityIndex<GlobalEntity>,
    pending_removals: BTreeMap<ViewerKey, Vec<ObjectIndex>>,
    init_cache: PacketCache<T::Payload>,
}

impl<T: SyncObject<Key = GlobalEntity>> ComponentRegistry<T> {
    pub fn new(config: &ReplicationConfig) -> Result<Self, ReplicationError> {
        Self::with_type_config(T::type_config(), config)
    }

    pub fn with_type_config(
        type_config: ObjectTypeConfig,
        config: &ReplicationConfig,
    ) -> Result<Self, ReplicationError> {
        let generator = SyncGenerator::new(type_config)?;
        info!("Component registry registered for {}", generator.object_type());
        Ok(Self {
            table: IndexKeyTable::new(generator.object_type()),
            generator,
            components: HashMap::new(),
            visibility: VisibilityIndex::new(),
            pending_removals: BTreeMap::new(),
            init_cache: PacketCache::new(config.packet_cache.clone()),
        })
    }

    pub fn object_type(&self) -> &'static str {
        self.generator.object_type()
    }

    pub fn type_config(&self) -> &ObjectTypeConfig {
        self.generator.config()
    }

    pub fn table(&self) -> &IndexKeyTable<GlobalEntity> {
        &self.table
    }

    // Components

    /// Starts tracking `value` on `entity`. The value's properties are wired
    /// to a fresh dirty tracker; viewers of the entity get an Init on the
    /// next sweep.
    pub fn attach(&mut self, entity: GlobalEntity, mut value: T) -> Result<ObjectIndex, ReplicationError> {
        if self.components.contains_key(&entity) {
            return Err(ReplicationError::ComponentAlreadyAttached {
                object_type: self.object_type(),
                entity,
            });
        }
        self.type_config().check_count(self.components.len() + 1)?;

        let index = self.table.assign(&entity)?;
        let (sender, tracker) = ChangeTracker::new_channel(T::FIELD_COUNT);
        value.set_mutator(&sender);
        self.components.insert(
            entity,
            TrackedComponent {
                entity,
                index,
                value,
                tracker,
            },
        );

        trace!("{} attached to {} at {}", self.object_type(), entity, index);
        Ok(index)
    }

    /// Stops tracking the component. Every viewer holding it receives a
    /// Remove on the next sweep; viewers that still see the entity go back
    /// to awaiting an Init.
    pub fn detach(&mut self, entity: &GlobalEntity) -> Result<T, ReplicationError> {
        let Some(component) = self.components.remove(entity) else {
            return Err(ReplicationError::ComponentNotAttached {
                object_type: self.object_type(),
                entity: *entity,
            });
        };

        for viewer in self.visibility.reset_object(entity) {
            self.queue_removal(viewer, component.index);
        }
        self.init_cache.invalidate(component.index);

        trace!("{} detached from {}", self.object_type(), entity);
        Ok(component.value)
    }

    pub fn notify_removed(&mut self, entity: &GlobalEntity) -> Result<T, ReplicationError> {
        self.detach(entity)
    }

    /// Marks every field of the component dirty, for changes made without
    /// going through a property
    pub fn notify_changed(&mut self, entity: &GlobalEntity) -> Result<(), ReplicationError> {
        let component = self.tracked(entity)?;
        component.tracker.mark_all().map_err(|source| SyncError::ChangeTracker {
            object_type: self.generator.object_type(),
            key: format!("{:?}", entity),
            source,
        })?;
        Ok(())
    }

    pub fn contains(&self, entity: &GlobalEntity) -> bool {
        self.components.contains_key(entity)
    }

    pub fn get(&self, entity: &GlobalEntity) -> Option<&T> {
        self.components.get(entity).map(|component| &component.value)
    }

    /// Property writes through the returned reference mark their field dirty
    pub fn get_mut(&mut self, entity: &GlobalEntity) -> Option<&mut T> {
        self.components
            .get_mut(entity)
            .map(|component| &mut component.value)
    }

    pub fn index_of(&self, entity: &GlobalEntity) -> Option<ObjectIndex> {
        self.components.get(entity).map(|component| component.index)
    }

    pub fn is_dirty(&self, entity: &GlobalEntity) -> Result<bool, ReplicationError> {
        let component = self.tracked(entity)?;
        component.tracker.is_dirty().map_err(|source| {
            SyncError::ChangeTracker {
                object_type: self.generator.object_type(),
                key: format!("{:?}", entity),
                source,
            }
            .into()
        })
    }

    pub fn len(&self) -> usize {
        self.components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    fn tracked(&self, entity: &GlobalEntity) -> Result<&TrackedComponent<T>, ReplicationError> {
        self.components
            .get(entity)
            .ok_or(ReplicationError::ComponentNotAttached {
                object_type: self.generator.object_type(),
                entity: *entity,
            })
    }

    // Visibility

    pub fn viewer_gained_visibility(&mut self, entity: GlobalEntity, viewer: ViewerKey) {
        if !self.visibility.gain(entity, viewer) {
            trace!("{} already sees {}", viewer, entity);
        }
    }

    pub fn viewer_lost_visibility(&mut self, entity: GlobalEntity, viewer: ViewerKey) {
        let Some(state) = self.visibility.lose(&entity, &viewer) else {
            return;
        };
        if state != PairState::Synced || !self.type_config().unload_on_lost_visibility {
            return;
        }
        if let Some(index) = self.index_of(&entity) {
            self.queue_removal(viewer, index);
        }
    }

    pub fn viewer_disconnected(&mut self, viewer: &ViewerKey) {
        let dropped = self.visibility.remove_viewer(viewer);
        self.pending_removals.remove(viewer);
        trace!(
            "{}: dropped {} pairs of disconnected {}",
            self.object_type(),
            dropped.len(),
            viewer
        );
    }

    /// Detaches the entity's component, if any, and forgets the entity's
    /// viewers
    pub fn entity_despawned(&mut self, entity: &GlobalEntity) {
        if let Some(component) = self.components.remove(entity) {
            for (viewer, state) in self.visibility.remove_object(entity) {
                if state == PairState::Synced {
                    self.queue_removal(viewer, component.index);
                }
            }
            self.init_cache.invalidate(component.index);
        } else {
            self.visibility.remove_object(entity);
        }
    }

    pub fn pair_state(&self, entity: &GlobalEntity, viewer: &ViewerKey) -> Option<PairState> {
        self.visibility.state(entity, viewer)
    }

    pub fn viewers(&self, entity: &GlobalEntity) -> impl Iterator<Item = (ViewerKey, PairState)> + '_ {
        self.visibility.viewers(entity)
    }

    fn queue_removal(&mut self, viewer: ViewerKey, index: ObjectIndex) {
        if self.type_config().removal == RemovalSemantics::None {
            return;
        }
        self.pending_removals.entry(viewer).or_default().push(index);
    }

    // Sweep

    /// Sends this tick's Removes, Inits and Updates.
    ///
    /// Removals go first, one packet per viewer. Components are then swept
    /// in index order, in batches that may run in parallel; nothing in the
    /// registry is written until every batch is done.
    pub fn sweep<M>(
        &mut self,
        tick: Tick,
        config: &ReplicationConfig,
        outbound: &mut OutboundQueues<M>,
    ) -> SweepReport
    where
        M: From<SharedPacket<T::Payload>> + Send,
    {
        let mut report = SweepReport::default();
        self.sweep_removals(outbound, &mut report);

        let mut components: Vec<&TrackedComponent<T>> = self.components.values().collect();
        components.sort_by_key(|component| component.index);

        let context = SweepContext {
            tick,
            generator: &self.generator,
            table: &self.table,
            visibility: &self.visibility,
            init_cache: &self.init_cache,
        };
        let outcomes = run_batches::<M, T>(
            &context,
            &components,
            config.sweep_batch_size.max(1),
            config.parallel_sweep,
        );

        let mut promotions = Vec::new();
        let mut clears = Vec::new();
        let mut cache_inserts = Vec::new();
        for outcome in outcomes {
            report.dropped += outbound.append(outcome.segment);
            report.merge(outcome.report);
            promotions.extend(outcome.promotions);
            clears.extend(outcome.clears);
            cache_inserts.extend(outcome.cache_inserts);
        }

        for (entity, viewer) in promotions {
            self.visibility.mark_synced(&entity, &viewer);
        }
        for (entity, version) in clears {
            let Some(component) = self.components.get(&entity) else {
                continue;
            };
            match component.tracker.clear_if_version(version) {
                Ok(true) => {}
                Ok(false) => trace!("{} changed during sweep, staying dirty", entity),
                Err(source) => report.errors.push(
                    SyncError::ChangeTracker {
                        object_type: self.generator.object_type(),
                        key: format!("{:?}", entity),
                        source,
                    }
                    .into(),
                ),
            }
        }
        for (index, version, packet) in cache_inserts {
            self.init_cache.insert(index, version, packet, tick);
        }
        self.init_cache.evict_expired(tick);

        if !report.is_clean() {
            warn!(
                "{}: {} objects failed to sync on tick {}",
                self.object_type(),
                report.errors.len(),
                tick
            );
        }
        report
    }

    fn sweep_removals<M>(&mut self, outbound: &mut OutboundQueues<M>, report: &mut SweepReport)
    where
        M: From<SharedPacket<T::Payload>>,
    {
        let pending = std::mem::take(&mut self.pending_removals);
        for (viewer, indices) in pending {
            match self.generator.generate_remove_indices(&self.table, &indices) {
                Ok(outcome) => {
                    let Some(packet) = outcome.into_packet() else {
                        continue;
                    };
                    report.removes_sent += 1;
                    if !outbound.enqueue(viewer, M::from(Arc::new(packet))) {
                        report.dropped += 1;
                    }
                }
                Err(error) => report.errors.push(error.into()),
            }
        }
    }
}
