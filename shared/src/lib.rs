//! # Replicant Shared
//! Index tables, change tracking and Init/Update/Remove packet generation,
//! shared by the replicant server and the egress layer that serializes its
//! packets.

#![deny(trivial_numeric_casts, unstable_features, unused_import_braces)]

mod change;
mod index;
mod sync;
mod types;

pub mod objects;

pub use change::{ChangeTracker, ChangeTrackerError, DiffMask, DirtySender, DirtySnapshot, Property};
pub use index::IndexKeyTable;
pub use sync::{
    Asset, Cardinality, Change, ConfigError, ObjectTypeConfig, PacketCache, PacketCacheConfig,
    RemovalSemantics, RemoveOutcome, SharedPacket, SyncEntry, SyncError, SyncGenerator, SyncKind,
    SyncObject, SyncPacket, SyncStrategy, UpdateOutcome,
};
pub use types::{GlobalEntity, ObjectIndex, Tick, ViewerKey};
