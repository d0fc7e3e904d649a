use thiserror::Error;

/// Errors that can occur while reading or writing an object's dirty state
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChangeTrackerError {
    /// The tracker's lock was poisoned by a panic on another thread
    #[error("Change tracker lock is poisoned")]
    LockPoisoned,

    /// A field index outside of the object's diff mask was marked
    #[error("Field index {field} is out of range for a diff mask of {field_count} fields")]
    FieldOutOfRange { field: u8, field_count: u8 },
}
