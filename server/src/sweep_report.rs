use crate::ReplicationError;

/// What one sweep or broadcast did. Packet counts include packets that
/// were dropped for lack of a queue.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SweepReport {
    pub objects_visited: usize,
    pub inits_sent: usize,
    pub updates_sent: usize,
    pub removes_sent: usize,
    pub cache_hits: usize,
    /// Packets addressed to viewers whose queue no longer exists
    pub dropped: usize,
    /// Consistency errors, one per object whose sync was aborted
    pub errors: Vec<ReplicationError>,
}

impl SweepReport {
    pub fn merge(&mut self, other: SweepReport) {
        self.objects_visited += other.objects_visited;
        self.inits_sent += other.inits_sent;
        self.updates_sent += other.updates_sent;
        self.removes_sent += other.removes_sent;
        self.cache_hits += other.cache_hits;
        self.dropped += other.dropped;
        self.errors.extend(other.errors);
    }

    pub fn packets_sent(&self) -> usize {
        self.inits_sent + self.updates_sent + self.removes_sent
    }

    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }
}
