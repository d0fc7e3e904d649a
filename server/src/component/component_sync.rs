use replicant_shared::{GlobalEntity, SharedPacket, SyncObject, Tick, ViewerKey};

use crate::{
    outbound::OutboundQueues, server_config::ReplicationConfig, SweepReport,
};

use super::component_registry::ComponentRegistry;

/// A component registry as seen by the [`SyncDriver`](crate::SyncDriver),
/// erased over the component type so one driver ticks every registered type
pub trait ComponentSync<M>: Send {
    fn object_type(&self) -> &'static str;

    fn viewer_gained_visibility(&mut self, entity: GlobalEntity, viewer: ViewerKey);

    fn viewer_lost_visibility(&mut self, entity: GlobalEntity, viewer: ViewerKey);

    fn viewer_disconnected(&mut self, viewer: &ViewerKey);

    fn entity_despawned(&mut self, entity: &GlobalEntity);

    fn sweep(
        &mut self,
        tick: Tick,
        config: &ReplicationConfig,
        outbound: &mut OutboundQueues<M>,
    ) -> SweepReport;
}

impl<M, T> ComponentSync<M> for ComponentRegistry<T>
where
    T: SyncObject<Key = GlobalEntity>,
    M: From<SharedPacket<T::Payload>> + Send,
{
    fn object_type(&self) -> &'static str {
        ComponentRegistry::object_type(self)
    }

    fn viewer_gained_visibility(&mut self, entity: GlobalEntity, viewer: ViewerKey) {
        ComponentRegistry::viewer_gained_visibility(self, entity, viewer);
    }

    fn viewer_lost_visibility(&mut self, entity: GlobalEntity, viewer: ViewerKey) {
        ComponentRegistry::viewer_lost_visibility(self, entity, viewer);
    }

    fn viewer_disconnected(&mut self, viewer: &ViewerKey) {
        ComponentRegistry::viewer_disconnected(self, viewer);
    }

    fn entity_despawned(&mut self, entity: &GlobalEntity) {
        ComponentRegistry::entity_despawned(self, entity);
    }

    fn sweep(
        &mut self,
        tick: Tick,
        config: &ReplicationConfig,
        outbound: &mut OutboundQueues<M>,
    ) -> SweepReport {
        ComponentRegistry::sweep(self, tick, config, outbound)
    }
}
