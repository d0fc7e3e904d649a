use std::{collections::BTreeSet, sync::Arc};

use log::{info, trace};

use replicant_shared::{
    Asset, Change, ObjectTypeConfig, SharedPacket, SyncGenerator, ViewerKey,
};

use crate::{outbound::OutboundQueues, ReplicationError, SweepReport};

use super::asset_registry::{AssetChangeSet, AssetRegistry};

/// Keeps every subscribed viewer's copy of one asset type in sync.
///
/// Driven by the caller: changes accumulate through `load`, `unload` and
/// the `notify_*` calls and go out as one shared packet per batch on
/// `flush`. Subscribing hands the viewer an Init of the full collection, so
/// every subscriber is always fully synced.
pub struct AssetService<T: Asset> {
    registry: AssetRegistry<T>,
    generator: SyncGenerator<T>,
    subscribers: BTreeSet<ViewerKey>,
    pending: AssetChangeSet,
    // keys every current subscriber holds
    announced: BTreeSet<String>,
}

impl<T: Asset> AssetService<T> {
    pub fn new() -> Result<Self, ReplicationError> {
        Self::with_config(T::type_config())
    }

    pub fn with_config(config: ObjectTypeConfig) -> Result<Self, ReplicationError> {
        let generator = SyncGenerator::new(config.clone())?;
        info!("Asset service registered for {}", config.name);
        Ok(Self {
            registry: AssetRegistry::new(config),
            generator,
            subscribers: BTreeSet::new(),
            pending: AssetChangeSet::default(),
            announced: BTreeSet::new(),
        })
    }

    pub fn registry(&self) -> &AssetRegistry<T> {
        &self.registry
    }

    pub fn object_type(&self) -> &'static str {
        self.generator.object_type()
    }

    pub fn get(&self, key: &str) -> Option<&T> {
        self.registry.get(key)
    }

    pub fn load(&mut self, assets: Vec<T>) -> Result<(), ReplicationError> {
        let changes = self.registry.load(assets)?;
        self.pending.merge(changes);
        Ok(())
    }

    pub fn unload(&mut self, keys: &[String]) -> Result<(), ReplicationError> {
        let changes = self.registry.remove(keys)?;
        self.pending.merge(changes);
        Ok(())
    }

    /// Queues a loaded asset to be re-sent on the next flush
    pub fn notify_changed(&mut self, key: &str) -> Result<(), ReplicationError> {
        if !self.registry.contains(key) {
            return Err(ReplicationError::AssetNotLoaded {
                object_type: self.object_type(),
                key: key.to_string(),
            });
        }
        self.pending.record_updated(key);
        Ok(())
    }

    pub fn notify_removed(&mut self, key: &str) -> Result<(), ReplicationError> {
        self.unload(&[key.to_string()])
    }

    pub fn pending(&self) -> &AssetChangeSet {
        &self.pending
    }

    /// Whether subscribers have been sent this key and not yet told to
    /// remove it
    pub fn is_announced(&self, key: &str) -> bool {
        self.announced.contains(key)
    }

    pub fn is_subscribed(&self, viewer: &ViewerKey) -> bool {
        self.subscribers.contains(viewer)
    }

    pub fn subscribers(&self) -> impl Iterator<Item = &ViewerKey> {
        self.subscribers.iter()
    }

    /// Subscribes the viewer and queues an Init of every loaded asset.
    /// Subscribing twice sends nothing.
    ///
    /// Pending changes are flushed to the existing subscribers first, so the
    /// new viewer's Init and everyone else's state agree afterwards. The
    /// returned report covers that flush too.
    pub fn subscribe<M>(
        &mut self,
        viewer: ViewerKey,
        outbound: &mut OutboundQueues<M>,
    ) -> Result<SweepReport, ReplicationError>
    where
        M: From<SharedPacket<T::Payload>>,
    {
        if self.subscribers.contains(&viewer) {
            trace!("{} already subscribed to {}", viewer, self.object_type());
            return Ok(SweepReport::default());
        }

        let mut report = self.flush(outbound)?;
        let packet = self
            .generator
            .generate_init(self.registry.table(), self.registry.iter())?;
        self.subscribers.insert(viewer);
        self.announced = self.registry.iter().map(|(key, _)| key.clone()).collect();
        info!(
            "{} subscribed to {} ({} assets)",
            viewer,
            self.object_type(),
            packet.len()
        );

        report.inits_sent += 1;
        if !outbound.enqueue(viewer, M::from(Arc::new(packet))) {
            report.dropped += 1;
        }
        Ok(report)
    }

    pub fn unsubscribe(&mut self, viewer: &ViewerKey) -> bool {
        let removed = self.subscribers.remove(viewer);
        if removed {
            info!("{} unsubscribed from {}", viewer, self.object_type());
        }
        removed
    }

    /// Broadcasts everything accumulated since the last flush
    pub fn flush<M>(
        &mut self,
        outbound: &mut OutboundQueues<M>,
    ) -> Result<SweepReport, ReplicationError>
    where
        M: From<SharedPacket<T::Payload>>,
    {
        let changes = std::mem::take(&mut self.pending);
        match self.broadcast(&changes, outbound) {
            Ok(report) => {
                self.record_broadcast(&changes);
                Ok(report)
            }
            Err(error) => {
                // a failed batch stays pending
                self.pending = changes;
                Err(error)
            }
        }
    }

    fn record_broadcast(&mut self, changes: &AssetChangeSet) {
        if self.subscribers.is_empty() {
            self.announced.clear();
            return;
        }
        for key in &changes.removed {
            self.announced.remove(key);
        }
        for key in &changes.updated {
            self.announced.insert(key.clone());
        }
    }

    /// Builds at most one Remove and one Update for the batch and sends the
    /// same packets to every subscriber. Both packets are built before
    /// anything is queued, so a failure sends nothing.
    ///
    /// Removals of keys no subscriber was ever sent are left out.
    fn broadcast<M>(
        &self,
        changes: &AssetChangeSet,
        outbound: &mut OutboundQueues<M>,
    ) -> Result<SweepReport, ReplicationError>
    where
        M: From<SharedPacket<T::Payload>>,
    {
        let mut report = SweepReport::default();
        if changes.is_empty() {
            trace!("{}: empty change set, nothing to broadcast", self.object_type());
            return Ok(report);
        }
        if self.subscribers.is_empty() {
            trace!("{}: no subscribers, dropping change set", self.object_type());
            return Ok(report);
        }

        let table = self.registry.table();

        let removed: Vec<String> = changes
            .removed
            .iter()
            .filter(|key| self.announced.contains(*key))
            .cloned()
            .collect();
        if removed.len() < changes.removed.len() {
            trace!(
                "{}: {} removals were never announced",
                self.object_type(),
                changes.removed.len() - removed.len()
            );
        }
        let remove = self
            .generator
            .generate_remove(table, &removed)?
            .into_packet()
            .map(Arc::new);

        let mut changed = Vec::with_capacity(changes.updated.len());
        for key in &changes.updated {
            let Some(asset) = self.registry.get(key) else {
                return Err(ReplicationError::AssetNotLoaded {
                    object_type: self.object_type(),
                    key: key.clone(),
                });
            };
            changed.push(Change::whole(key, asset));
        }
        let collection: Vec<(&String, &T)> = self.registry.iter().collect();
        let update = self
            .generator
            .generate_update(table, &changed, &collection)?
            .into_packet()
            .map(Arc::new);

        for viewer in &self.subscribers {
            if let Some(packet) = &remove {
                report.removes_sent += 1;
                if !outbound.enqueue(*viewer, M::from(packet.clone())) {
                    report.dropped += 1;
                }
            }
            if let Some(packet) = &update {
                report.updates_sent += 1;
                if !outbound.enqueue(*viewer, M::from(packet.clone())) {
                    report.dropped += 1;
                }
            }
        }
        Ok(report)
    }
}
