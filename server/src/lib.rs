//! # Replicant Server
//! Keeps every connected viewer's copy of server-owned assets and
//! components consistent with the server, once per tick, sending full
//! Inits to viewers that just gained visibility and deltas to the rest.

#![deny(
    trivial_casts,
    trivial_numeric_casts,
    unstable_features,
    unused_import_braces
)]

#[macro_use]
extern crate cfg_if;

pub mod shared {
    pub use replicant_shared::{
        objects, Asset, Cardinality, ChangeTracker, DiffMask, GlobalEntity, ObjectIndex,
        ObjectTypeConfig, PacketCacheConfig, Property, RemovalSemantics, SharedPacket, SyncKind,
        SyncObject, SyncPacket, SyncStrategy, Tick, ViewerKey,
    };
}

mod asset;
mod component;
mod error;
mod outbound;
mod server_config;
mod sweep_report;
mod sync_driver;
mod visibility;

pub use asset::{AssetChangeSet, AssetRegistry, AssetService, AssetSync};
pub use component::{ComponentRegistry, ComponentSync};
pub use error::ReplicationError;
pub use outbound::{OutboundQueues, OutboundSegment};
pub use server_config::ReplicationConfig;
pub use sweep_report::SweepReport;
pub use sync_driver::SyncDriver;
pub use visibility::{PairState, VisibilityIndex};
