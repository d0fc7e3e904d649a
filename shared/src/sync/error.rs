use thiserror::Error;

use crate::change::ChangeTrackerError;

/// Errors raised while building Init / Update / Remove packets
///
/// Every variant is a consistency error: the caller's view of its objects
/// has diverged from the object type's IndexKeyTable. The enclosing sync
/// operation for that object is aborted, other objects are unaffected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SyncError {
    /// A key was handed to a generator before it was ever assigned an index
    #[error("Unknown key {key} for object type {object_type}")]
    UnknownKey {
        object_type: &'static str,
        key: String,
    },

    /// An index does not map to any key in the table
    #[error("Unknown index {index} for object type {object_type}")]
    UnknownIndex {
        object_type: &'static str,
        index: u32,
    },

    /// The table has handed out every representable index
    #[error("IndexKeyTable for object type {object_type} is exhausted")]
    IndexExhausted { object_type: &'static str },

    /// The object's change tracker could not be read
    #[error("Change tracker for {key} ({object_type}) is unavailable: {source}")]
    ChangeTracker {
        object_type: &'static str,
        key: String,
        #[source]
        source: ChangeTrackerError,
    },
}

/// Errors raised while registering an object type
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// Full-resync was requested for a type whose instance count is not bounded
    #[error("Object type {object_type} uses the full-resync strategy but declares unbounded cardinality")]
    FullResyncUnbounded { object_type: &'static str },

    /// A bounded object type grew past its declared bound
    #[error("Object type {object_type} is bounded to {bound} objects, but {count} were loaded")]
    CardinalityExceeded {
        object_type: &'static str,
        bound: usize,
        count: usize,
    },

    /// A bound of zero objects can never be satisfied
    #[error("Object type {object_type} declares a cardinality bound of zero")]
    ZeroBound { object_type: &'static str },
}
