//! # Init / Update / Remove packet generation
//!
//! Every replicated object type, asset or component, goes through the same
//! three operations:
//!
//! | Operation | Sent when | Body |
//! |-----------|-----------|------|
//! | Init      | a viewer first sees the object(s) | complete state |
//! | Update    | a viewer already holds the baseline | changed subset, or everything under full-resync |
//! | Remove    | the object is destroyed / unloaded | indices only |
//!
//! Keys never travel on the wire: each packet references objects through the
//! [`ObjectIndex`](crate::ObjectIndex) assigned by the type's
//! [`IndexKeyTable`](crate::IndexKeyTable), and a key missing from that table
//! is reported as [`SyncError::UnknownKey`] instead of producing a packet.

mod error;
mod generator;
mod object;
mod packet;
mod packet_cache;

pub use error::{ConfigError, SyncError};
pub use generator::{Change, SyncGenerator};
pub use object::{
    Asset, Cardinality, ObjectTypeConfig, RemovalSemantics, SyncObject, SyncStrategy,
};
pub use packet::{RemoveOutcome, SharedPacket, SyncEntry, SyncKind, SyncPacket, UpdateOutcome};
pub use packet_cache::{PacketCache, PacketCacheConfig};
