mod outbound_queue;

pub use outbound_queue::{OutboundQueues, OutboundSegment};
