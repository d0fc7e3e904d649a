use log::{info, warn};

use replicant_shared::{GlobalEntity, Tick, ViewerKey};

use crate::{
    asset::AssetSync, component::ComponentSync, outbound::OutboundQueues,
    server_config::ReplicationConfig, ReplicationError, SweepReport,
};

/// Owns the tick counter and the per-viewer outbound queues, and drives
/// every component registry once per tick.
///
/// Registries are owned by the caller and passed in on each call, so no
/// object type is ever registered globally.
pub struct SyncDriver<M> {
    config: ReplicationConfig,
    tick: Tick,
    outbound: OutboundQueues<M>,
}

impl<M> SyncDriver<M> {
    pub fn new(config: ReplicationConfig) -> Self {
        Self {
            config,
            tick: 0,
            outbound: OutboundQueues::new(),
        }
    }

    pub fn config(&self) -> &ReplicationConfig {
        &self.config
    }

    /// The tick the next call to [`tick`](Self::tick) will sweep
    pub fn current_tick(&self) -> Tick {
        self.tick
    }

    // Viewers

    pub fn connect_viewer(&mut self, viewer: ViewerKey) -> Result<(), ReplicationError> {
        if !self.outbound.connect(viewer) {
            return Err(ReplicationError::ViewerAlreadyConnected { viewer });
        }
        info!("{} connected", viewer);
        Ok(())
    }

    /// Tears down the viewer's queue, every visibility pair it had and
    /// every asset subscription. Returns how many undelivered messages were
    /// discarded.
    pub fn disconnect_viewer(
        &mut self,
        viewer: &ViewerKey,
        registries: &mut [&mut dyn ComponentSync<M>],
        assets: &mut [&mut dyn AssetSync<M>],
    ) -> Result<usize, ReplicationError> {
        let Some(undelivered) = self.outbound.disconnect(viewer) else {
            return Err(ReplicationError::ViewerNotConnected { viewer: *viewer });
        };
        for registry in registries.iter_mut() {
            registry.viewer_disconnected(viewer);
        }
        for service in assets.iter_mut() {
            service.viewer_disconnected(viewer);
        }
        info!("{} disconnected", viewer);
        Ok(undelivered)
    }

    pub fn is_connected(&self, viewer: &ViewerKey) -> bool {
        self.outbound.is_connected(viewer)
    }

    /// Subscribes a connected viewer to every asset service
    pub fn subscribe_viewer(
        &mut self,
        viewer: ViewerKey,
        assets: &mut [&mut dyn AssetSync<M>],
    ) -> Result<SweepReport, ReplicationError> {
        if !self.outbound.is_connected(&viewer) {
            return Err(ReplicationError::ViewerNotConnected { viewer });
        }
        let mut report = SweepReport::default();
        for service in assets.iter_mut() {
            report.merge(service.subscribe(viewer, &mut self.outbound)?);
        }
        Ok(report)
    }

    // Interest management

    pub fn viewer_gained_visibility(
        &mut self,
        entity: GlobalEntity,
        viewer: ViewerKey,
        registries: &mut [&mut dyn ComponentSync<M>],
    ) {
        for registry in registries.iter_mut() {
            registry.viewer_gained_visibility(entity, viewer);
        }
    }

    pub fn viewer_lost_visibility(
        &mut self,
        entity: GlobalEntity,
        viewer: ViewerKey,
        registries: &mut [&mut dyn ComponentSync<M>],
    ) {
        for registry in registries.iter_mut() {
            registry.viewer_lost_visibility(entity, viewer);
        }
    }

    pub fn entity_despawned(
        &mut self,
        entity: &GlobalEntity,
        registries: &mut [&mut dyn ComponentSync<M>],
    ) {
        for registry in registries.iter_mut() {
            registry.entity_despawned(entity);
        }
    }

    // Tick

    /// Sweeps every registry for the current tick, then advances it
    pub fn tick(&mut self, registries: &mut [&mut dyn ComponentSync<M>]) -> SweepReport {
        let mut report = SweepReport::default();
        for registry in registries.iter_mut() {
            let registry_report = registry.sweep(self.tick, &self.config, &mut self.outbound);
            for error in &registry_report.errors {
                warn!(
                    "Tick {}: {} sync aborted: {}",
                    self.tick,
                    registry.object_type(),
                    error
                );
            }
            report.merge(registry_report);
        }
        self.tick = self.tick.wrapping_add(1);
        report
    }

    /// Broadcasts every asset service's pending batch. A failed batch is
    /// reported and stays pending in its service.
    pub fn flush_assets(&mut self, assets: &mut [&mut dyn AssetSync<M>]) -> SweepReport {
        let mut report = SweepReport::default();
        for service in assets.iter_mut() {
            match service.flush(&mut self.outbound) {
                Ok(service_report) => report.merge(service_report),
                Err(error) => {
                    warn!("{} flush failed: {}", service.object_type(), error);
                    report.errors.push(error);
                }
            }
        }
        report
    }

    // Egress

    pub fn outbound(&self) -> &OutboundQueues<M> {
        &self.outbound
    }

    /// For asset services, which queue directly on subscribe and flush
    pub fn outbound_mut(&mut self) -> &mut OutboundQueues<M> {
        &mut self.outbound
    }

    pub fn drain(&mut self, viewer: &ViewerKey) -> Vec<M> {
        self.outbound.drain(viewer)
    }
}
