use std::collections::{HashMap, VecDeque};

use log::{info, trace};

use replicant_shared::ViewerKey;

/// Packets produced by one sweep worker, merged into the per-viewer queues
/// once the parallel phase is over
pub struct OutboundSegment<M> {
    packets: Vec<(ViewerKey, M)>,
}

impl<M> OutboundSegment<M> {
    pub fn new() -> Self {
        Self {
            packets: Vec::new(),
        }
    }

    pub fn push(&mut self, viewer: ViewerKey, message: M) {
        self.packets.push((viewer, message));
    }

    /// Appends another segment after this one, keeping both orders
    pub fn extend(&mut self, other: OutboundSegment<M>) {
        self.packets.extend(other.packets);
    }

    pub fn len(&self) -> usize {
        self.packets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.packets.is_empty()
    }
}

impl<M> Default for OutboundSegment<M> {
    fn default() -> Self {
        Self::new()
    }
}

/// Per-viewer FIFO of outgoing replication messages, drained by egress
pub struct OutboundQueues<M> {
    queues: HashMap<ViewerKey, VecDeque<M>>,
    dropped: usize,
}

impl<M> OutboundQueues<M> {
    pub fn new() -> Self {
        Self {
            queues: HashMap::new(),
            dropped: 0,
        }
    }

    /// Opens a queue for the viewer. Returns false if one already exists.
    pub fn connect(&mut self, viewer: ViewerKey) -> bool {
        if self.queues.contains_key(&viewer) {
            return false;
        }
        info!("Outbound queue opened for {}", viewer);
        self.queues.insert(viewer, VecDeque::new());
        true
    }

    /// Tears down the viewer's queue, returning how many undelivered
    /// messages went with it
    pub fn disconnect(&mut self, viewer: &ViewerKey) -> Option<usize> {
        let queue = self.queues.remove(viewer)?;
        info!(
            "Outbound queue closed for {} with {} pending messages",
            viewer,
            queue.len()
        );
        Some(queue.len())
    }

    pub fn is_connected(&self, viewer: &ViewerKey) -> bool {
        self.queues.contains_key(viewer)
    }

    /// Non-blocking append. A message for a viewer without a queue is
    /// dropped and counted.
    pub fn enqueue(&mut self, viewer: ViewerKey, message: M) -> bool {
        match self.queues.get_mut(&viewer) {
            Some(queue) => {
                queue.push_back(message);
                true
            }
            None => {
                trace!("Dropping message for unknown {}", viewer);
                self.dropped += 1;
                false
            }
        }
    }

    /// Merges a worker segment in order, returning how many of its messages
    /// were dropped
    pub fn append(&mut self, segment: OutboundSegment<M>) -> usize {
        let mut dropped = 0;
        for (viewer, message) in segment.packets {
            if !self.enqueue(viewer, message) {
                dropped += 1;
            }
        }
        dropped
    }

    /// Takes every queued message for the viewer, oldest first
    pub fn drain(&mut self, viewer: &ViewerKey) -> Vec<M> {
        self.queues
            .get_mut(viewer)
            .map(|queue| queue.drain(..).collect())
            .unwrap_or_default()
    }

    pub fn pending(&self, viewer: &ViewerKey) -> usize {
        self.queues.get(viewer).map_or(0, VecDeque::len)
    }

    pub fn viewers(&self) -> impl Iterator<Item = &ViewerKey> {
        self.queues.keys()
    }

    /// Total messages dropped for unknown viewers since creation
    pub fn dropped(&self) -> usize {
        self.dropped
    }
}

impl<M> Default for OutboundQueues<M> {
    fn default() -> Self {
        Self::new()
    }
}
