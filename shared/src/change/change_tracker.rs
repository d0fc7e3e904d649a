use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use super::{diff_mask::DiffMask, error::ChangeTrackerError};

struct DirtyState {
    mask: DiffMask,
    version: u64,
}

/// Dirty bookkeeping for a single tracked object.
///
/// Created as a pair through [`ChangeTracker::new_channel`]: the
/// [`DirtySender`] half is handed to the object's fields so every observable
/// mutation sets a bit and bumps the version, the `ChangeTracker` half stays
/// with the registry and is read by the sync sweep.
#[derive(Clone)]
pub struct ChangeTracker {
    state: Arc<RwLock<DirtyState>>,
}

/// A consistent read of an object's dirty mask together with the version it was taken at
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DirtySnapshot {
    pub mask: DiffMask,
    pub version: u64,
}

impl DirtySnapshot {
    pub fn is_dirty(&self) -> bool {
        !self.mask.is_clear()
    }
}

impl ChangeTracker {
    pub fn new_channel(field_count: u8) -> (DirtySender, ChangeTracker) {
        let tracker = Self {
            state: Arc::new(RwLock::new(DirtyState {
                mask: DiffMask::new(field_count),
                version: 0,
            })),
        };
        let sender = DirtySender {
            state: tracker.state.clone(),
        };
        (sender, tracker)
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, DirtyState>, ChangeTrackerError> {
        self.state
            .as_ref()
            .read()
            .map_err(|_| ChangeTrackerError::LockPoisoned)
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, DirtyState>, ChangeTrackerError> {
        self.state
            .as_ref()
            .write()
            .map_err(|_| ChangeTrackerError::LockPoisoned)
    }

    pub fn new_sender(&self) -> DirtySender {
        DirtySender {
            state: self.state.clone(),
        }
    }

    pub fn is_dirty(&self) -> Result<bool, ChangeTrackerError> {
        Ok(!self.read()?.mask.is_clear())
    }

    pub fn version(&self) -> Result<u64, ChangeTrackerError> {
        Ok(self.read()?.version)
    }

    pub fn snapshot(&self) -> Result<DirtySnapshot, ChangeTrackerError> {
        let state = self.read()?;
        Ok(DirtySnapshot {
            mask: state.mask.clone(),
            version: state.version,
        })
    }

    /// Marks every field dirty, used when the owner reports a change without
    /// going through a field
    pub fn mark_all(&self) -> Result<(), ChangeTrackerError> {
        let mut state = self.write()?;
        state.mask.set_all();
        state.version += 1;
        Ok(())
    }

    /// Clears the dirty mask only if no mutation landed after `version` was read.
    /// Returns whether the mask was cleared.
    pub fn clear_if_version(&self, version: u64) -> Result<bool, ChangeTrackerError> {
        let mut state = self.write()?;
        if state.version != version {
            return Ok(false);
        }
        state.mask.clear();
        Ok(true)
    }
}

/// The mutation side of a [`ChangeTracker`]
#[derive(Clone)]
pub struct DirtySender {
    state: Arc<RwLock<DirtyState>>,
}

impl DirtySender {
    pub fn mutate(&self, field: u8) -> Result<(), ChangeTrackerError> {
        let Ok(mut state) = self.state.as_ref().write() else {
            return Err(ChangeTrackerError::LockPoisoned);
        };
        let field_count = state.mask.field_count();
        if !state.mask.set_bit(field, true) {
            return Err(ChangeTrackerError::FieldOutOfRange { field, field_count });
        }
        state.version += 1;
        Ok(())
    }
}
