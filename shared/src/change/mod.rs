mod change_tracker;
mod diff_mask;
mod error;
mod property;

pub use change_tracker::{ChangeTracker, DirtySender, DirtySnapshot};
pub use diff_mask::DiffMask;
pub use error::ChangeTrackerError;
pub use property::Property;
