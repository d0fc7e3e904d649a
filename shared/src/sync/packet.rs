use std::sync::Arc;

use crate::ObjectIndex;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SyncKind {
    Init,
    Update,
    Remove,
}

#[derive(Clone, Debug, PartialEq)]
pub struct SyncEntry<P> {
    pub index: ObjectIndex,
    pub payload: P,
}

/// An immutable replication payload for one object type.
///
/// Every index it references was resolved through that type's
/// IndexKeyTable when the packet was built.
#[derive(Clone, Debug, PartialEq)]
pub enum SyncPacket<P> {
    Init { entries: Vec<SyncEntry<P>> },
    Update { entries: Vec<SyncEntry<P>> },
    Remove { indices: Vec<ObjectIndex> },
}

/// Packets are built once and fanned out to every viewer that needs them
pub type SharedPacket<P> = Arc<SyncPacket<P>>;

impl<P> SyncPacket<P> {
    pub fn kind(&self) -> SyncKind {
        match self {
            SyncPacket::Init { .. } => SyncKind::Init,
            SyncPacket::Update { .. } => SyncKind::Update,
            SyncPacket::Remove { .. } => SyncKind::Remove,
        }
    }

    /// Entries of an Init or Update packet; empty for Remove
    pub fn entries(&self) -> &[SyncEntry<P>] {
        match self {
            SyncPacket::Init { entries } | SyncPacket::Update { entries } => entries,
            SyncPacket::Remove { .. } => &[],
        }
    }

    /// Every index the packet references, in packet order
    pub fn indices(&self) -> Vec<ObjectIndex> {
        match self {
            SyncPacket::Init { entries } | SyncPacket::Update { entries } => {
                entries.iter().map(|entry| entry.index).collect()
            }
            SyncPacket::Remove { indices } => indices.clone(),
        }
    }

    pub fn references(&self, index: ObjectIndex) -> bool {
        match self {
            SyncPacket::Init { entries } | SyncPacket::Update { entries } => {
                entries.iter().any(|entry| entry.index == index)
            }
            SyncPacket::Remove { indices } => indices.contains(&index),
        }
    }

    pub fn payload(&self, index: ObjectIndex) -> Option<&P> {
        self.entries()
            .iter()
            .find(|entry| entry.index == index)
            .map(|entry| &entry.payload)
    }

    pub fn len(&self) -> usize {
        match self {
            SyncPacket::Init { entries } | SyncPacket::Update { entries } => entries.len(),
            SyncPacket::Remove { indices } => indices.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Result of `generate_update`: an empty change set is an explicit no-op
#[derive(Clone, Debug, PartialEq)]
pub enum UpdateOutcome<P> {
    Packet(SyncPacket<P>),
    NoOp,
}

impl<P> UpdateOutcome<P> {
    pub fn into_packet(self) -> Option<SyncPacket<P>> {
        match self {
            UpdateOutcome::Packet(packet) => Some(packet),
            UpdateOutcome::NoOp => None,
        }
    }

    pub fn is_noop(&self) -> bool {
        matches!(self, UpdateOutcome::NoOp)
    }
}

/// Result of `generate_remove`: `Absent` means there is nothing to send
#[derive(Clone, Debug, PartialEq)]
pub enum RemoveOutcome<P> {
    Packet(SyncPacket<P>),
    Absent,
}

impl<P> RemoveOutcome<P> {
    pub fn into_packet(self) -> Option<SyncPacket<P>> {
        match self {
            RemoveOutcome::Packet(packet) => Some(packet),
            RemoveOutcome::Absent => None,
        }
    }

    pub fn is_absent(&self) -> bool {
        matches!(self, RemoveOutcome::Absent)
    }
}
