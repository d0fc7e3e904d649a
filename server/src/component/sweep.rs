use std::sync::Arc;

use replicant_shared::{
    Change, ChangeTracker, GlobalEntity, IndexKeyTable, ObjectIndex, PacketCache, SharedPacket,
    SyncError, SyncGenerator, SyncObject, Tick, UpdateOutcome, ViewerKey,
};

use crate::{
    outbound::OutboundSegment,
    visibility::{PairState, VisibilityIndex},
    ReplicationError, SweepReport,
};

/// A component instance together with its dirty bookkeeping
pub(crate) struct TrackedComponent<T> {
    pub entity: GlobalEntity,
    pub index: ObjectIndex,
    pub value: T,
    pub tracker: ChangeTracker,
}

/// Read-only view of a registry handed to every sweep worker
pub(crate) struct SweepContext<'a, T: SyncObject<Key = GlobalEntity>> {
    pub tick: Tick,
    pub generator: &'a SyncGenerator<T>,
    pub table: &'a IndexKeyTable<GlobalEntity>,
    pub visibility: &'a VisibilityIndex<GlobalEntity>,
    pub init_cache: &'a PacketCache<T::Payload>,
}

/// Everything one worker decided, applied to the registry after the merge
pub(crate) struct BatchOutcome<M, P> {
    pub segment: OutboundSegment<M>,
    pub promotions: Vec<(GlobalEntity, ViewerKey)>,
    pub clears: Vec<(GlobalEntity, u64)>,
    pub cache_inserts: Vec<(ObjectIndex, u64, SharedPacket<P>)>,
    pub report: SweepReport,
}

impl<M, P> BatchOutcome<M, P> {
    fn new() -> Self {
        Self {
            segment: OutboundSegment::new(),
            promotions: Vec::new(),
            clears: Vec::new(),
            cache_inserts: Vec::new(),
            report: SweepReport::default(),
        }
    }

    fn absorb(&mut self, object: BatchOutcome<M, P>) {
        self.segment.extend(object.segment);
        self.promotions.extend(object.promotions);
        self.clears.extend(object.clears);
        self.cache_inserts.extend(object.cache_inserts);
        self.report.merge(object.report);
    }
}

impl<'a, T: SyncObject<Key = GlobalEntity>> SweepContext<'a, T> {
    pub fn sweep_batch<M>(&self, batch: &[&TrackedComponent<T>]) -> BatchOutcome<M, T::Payload>
    where
        M: From<SharedPacket<T::Payload>>,
    {
        let mut outcome = BatchOutcome::new();
        for component in batch {
            outcome.report.objects_visited += 1;
            match self.sweep_object(component) {
                Ok(object) => outcome.absorb(object),
                // nothing of a failed object leaves the worker
                Err(error) => outcome.report.errors.push(error),
            }
        }
        outcome
    }

    fn sweep_object<M>(
        &self,
        component: &TrackedComponent<T>,
    ) -> Result<BatchOutcome<M, T::Payload>, ReplicationError>
    where
        M: From<SharedPacket<T::Payload>>,
    {
        let mut outcome = BatchOutcome::new();
        let dirty = component
            .tracker
            .snapshot()
            .map_err(|source| SyncError::ChangeTracker {
                object_type: self.generator.object_type(),
                key: format!("{:?}", component.entity),
                source,
            })?;

        let mut init: Option<SharedPacket<T::Payload>> = None;
        let mut synced = Vec::new();
        for (viewer, state) in self.visibility.viewers(&component.entity) {
            match state {
                PairState::JustBecameVisible => {
                    let packet = match &init {
                        Some(packet) => packet.clone(),
                        None => {
                            let packet = self.init_packet(component, dirty.version, &mut outcome)?;
                            init = Some(packet.clone());
                            packet
                        }
                    };
                    outcome.segment.push(viewer, M::from(packet));
                    outcome.promotions.push((component.entity, viewer));
                    outcome.report.inits_sent += 1;
                }
                PairState::Synced => synced.push(viewer),
            }
        }

        if dirty.is_dirty() {
            if !synced.is_empty() {
                let change = Change::fields(&component.entity, &component.value, &dirty.mask);
                let collection = [(&component.entity, &component.value)];
                if let UpdateOutcome::Packet(packet) =
                    self.generator
                        .generate_update(self.table, &[change], &collection)?
                {
                    let packet = Arc::new(packet);
                    for viewer in synced {
                        outcome.segment.push(viewer, M::from(packet.clone()));
                        outcome.report.updates_sent += 1;
                    }
                }
            }
            outcome.clears.push((component.entity, dirty.version));
        }

        Ok(outcome)
    }

    fn init_packet<M>(
        &self,
        component: &TrackedComponent<T>,
        version: u64,
        outcome: &mut BatchOutcome<M, T::Payload>,
    ) -> Result<SharedPacket<T::Payload>, ReplicationError> {
        if let Some(packet) = self.init_cache.get(component.index, version, self.tick) {
            outcome.report.cache_hits += 1;
            return Ok(packet);
        }
        let packet = Arc::new(
            self.generator
                .generate_init(self.table, [(&component.entity, &component.value)])?,
        );
        outcome
            .cache_inserts
            .push((component.index, version, packet.clone()));
        Ok(packet)
    }
}

cfg_if! {
    if #[cfg(feature = "parallel_sweep")] {
        use rayon::prelude::*;

        /// Sweeps every batch, on the rayon pool when `parallel` is set.
        /// Outcomes come back in batch order either way.
        pub(crate) fn run_batches<M, T>(
            context: &SweepContext<'_, T>,
            components: &[&TrackedComponent<T>],
            batch_size: usize,
            parallel: bool,
        ) -> Vec<BatchOutcome<M, T::Payload>>
        where
            M: From<SharedPacket<T::Payload>> + Send,
            T: SyncObject<Key = GlobalEntity>,
        {
            if parallel {
                components
                    .par_chunks(batch_size)
                    .map(|batch| context.sweep_batch(batch))
                    .collect()
            } else {
                components
                    .chunks(batch_size)
                    .map(|batch| context.sweep_batch(batch))
                    .collect()
            }
        }
    } else {
        pub(crate) fn run_batches<M, T>(
            context: &SweepContext<'_, T>,
            components: &[&TrackedComponent<T>],
            batch_size: usize,
            _parallel: bool,
        ) -> Vec<BatchOutcome<M, T::Payload>>
        where
            M: From<SharedPacket<T::Payload>> + Send,
            T: SyncObject<Key = GlobalEntity>,
        {
            components
                .chunks(batch_size)
                .map(|batch| context.sweep_batch(batch))
                .collect()
        }
    }
}
