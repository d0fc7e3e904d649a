use std::fmt;

/// One bit per replicated field of an object. A set bit means the field has
/// been mutated since the object was last swept.
#[derive(Clone, PartialEq, Eq)]
pub struct DiffMask {
    field_count: u8,
    mask: Vec<u8>,
}

impl DiffMask {
    /// Create a cleared DiffMask able to track `field_count` fields
    pub fn new(field_count: u8) -> Self {
        let bytes = (field_count as usize).div_ceil(8);
        Self {
            field_count,
            mask: vec![0; bytes],
        }
    }

    /// Create a DiffMask with every field set
    pub fn full(field_count: u8) -> Self {
        let mut mask = Self::new(field_count);
        mask.set_all();
        mask
    }

    pub fn field_count(&self) -> u8 {
        self.field_count
    }

    /// Gets the bit for `field`, or None if out of range
    pub fn bit(&self, field: u8) -> Option<bool> {
        if field >= self.field_count {
            return None;
        }
        let byte = self.mask[(field / 8) as usize];
        Some(byte & (1 << (field % 8)) != 0)
    }

    /// Returns whether the bit for `field` is set. Out of range fields read as clear.
    pub fn is_set(&self, field: u8) -> bool {
        self.bit(field).unwrap_or(false)
    }

    /// Sets the bit for `field`; returns false if `field` is out of range
    pub fn set_bit(&mut self, field: u8, value: bool) -> bool {
        if field >= self.field_count {
            return false;
        }
        let byte = &mut self.mask[(field / 8) as usize];
        let bit_mask = 1 << (field % 8);
        if value {
            *byte |= bit_mask;
        } else {
            *byte &= !bit_mask;
        }
        true
    }

    pub fn set_all(&mut self) {
        for field in 0..self.field_count {
            self.set_bit(field, true);
        }
    }

    pub fn clear(&mut self) {
        self.mask.iter_mut().for_each(|byte| *byte = 0);
    }

    pub fn is_clear(&self) -> bool {
        self.mask.iter().all(|byte| *byte == 0)
    }

    /// Sets every bit that is set in `other`. Masks of different length are ignored.
    pub fn or(&mut self, other: &DiffMask) {
        if other.field_count != self.field_count {
            return;
        }
        for (mine, theirs) in self.mask.iter_mut().zip(other.mask.iter()) {
            *mine |= *theirs;
        }
    }

    /// Clears every bit that is set in `other`. Masks of different length are ignored.
    pub fn nand(&mut self, other: &DiffMask) {
        if other.field_count != self.field_count {
            return;
        }
        for (mine, theirs) in self.mask.iter_mut().zip(other.mask.iter()) {
            *mine &= !*theirs;
        }
    }

    /// Iterates the indices of all set fields, lowest first
    pub fn set_fields(&self) -> impl Iterator<Item = u8> + '_ {
        (0..self.field_count).filter(move |field| self.is_set(*field))
    }
}

impl fmt::Debug for DiffMask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DiffMask({})", self)
    }
}

impl fmt::Display for DiffMask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for field in 0..self.field_count {
            let bit = if self.is_set(field) { '1' } else { '0' };
            write!(f, "{}", bit)?;
        }
        Ok(())
    }
}
