use replicant_shared::{Asset, SharedPacket, ViewerKey};

use crate::{outbound::OutboundQueues, ReplicationError, SweepReport};

use super::asset_service::AssetService;

/// An asset service as seen by the [`SyncDriver`](crate::SyncDriver),
/// erased over the asset type so viewer lifecycle reaches every service
pub trait AssetSync<M>: Send {
    fn object_type(&self) -> &'static str;

    fn subscribe(
        &mut self,
        viewer: ViewerKey,
        outbound: &mut OutboundQueues<M>,
    ) -> Result<SweepReport, ReplicationError>;

    /// Forgets the viewer's subscription. A viewer that connects again
    /// starts over with a fresh Init.
    fn viewer_disconnected(&mut self, viewer: &ViewerKey);

    fn flush(&mut self, outbound: &mut OutboundQueues<M>) -> Result<SweepReport, ReplicationError>;
}

impl<M, T> AssetSync<M> for AssetService<T>
where
    T: Asset,
    M: From<SharedPacket<T::Payload>>,
{
    fn object_type(&self) -> &'static str {
        AssetService::object_type(self)
    }

    fn subscribe(
        &mut self,
        viewer: ViewerKey,
        outbound: &mut OutboundQueues<M>,
    ) -> Result<SweepReport, ReplicationError> {
        AssetService::subscribe(self, viewer, outbound)
    }

    fn viewer_disconnected(&mut self, viewer: &ViewerKey) {
        self.unsubscribe(viewer);
    }

    fn flush(&mut self, outbound: &mut OutboundQueues<M>) -> Result<SweepReport, ReplicationError> {
        AssetService::flush(self, outbound)
    }
}
