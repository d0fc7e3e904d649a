use std::default::Default;

use replicant_shared::PacketCacheConfig;

/// Contains Config properties which will be used by the replication server
#[derive(Clone, Debug)]
pub struct ReplicationConfig {
    /// Number of component instances handed to one sweep worker at a time
    pub sweep_batch_size: usize,
    /// Whether the per-tick component sweep runs batches in parallel.
    /// Only takes effect when built with the `parallel_sweep` feature.
    pub parallel_sweep: bool,
    /// Bounds on the per-object Init packet cache
    pub packet_cache: PacketCacheConfig,
}

impl Default for ReplicationConfig {
    fn default() -> Self {
        Self {
            sweep_batch_size: 256,
            parallel_sweep: true,
            packet_cache: PacketCacheConfig::default(),
        }
    }
}
