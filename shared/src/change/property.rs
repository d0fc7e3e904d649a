use std::ops::{Deref, DerefMut};

use log::warn;

use super::change_tracker::DirtySender;

/// A replicated field of a component.
///
/// Reading goes through `Deref`. Any mutable access through `DerefMut` or
/// [`Property::set`] marks the field's bit in the owning object's
/// [`ChangeTracker`](super::ChangeTracker), once the object has been attached
/// to a registry and handed a [`DirtySender`].
pub struct Property<T> {
    inner: T,
    field: u8,
    mutator: Option<DirtySender>,
}

impl<T> Property<T> {
    pub fn new(value: T, field: u8) -> Self {
        Self {
            inner: value,
            field,
            mutator: None,
        }
    }

    pub fn field(&self) -> u8 {
        self.field
    }

    pub fn set_mutator(&mut self, mutator: &DirtySender) {
        self.mutator = Some(mutator.clone());
    }

    pub fn set(&mut self, value: T) {
        self.mutate();
        self.inner = value;
    }

    fn mutate(&mut self) {
        // not attached yet, nothing to track
        let Some(mutator) = &self.mutator else {
            return;
        };
        if let Err(error) = mutator.mutate(self.field) {
            warn!("Property {}: could not mark dirty: {}", self.field, error);
        }
    }
}

// A clone is a detached copy and must not mark the original's tracker
impl<T: Clone> Clone for Property<T> {
    fn clone(&self) -> Self {
        Self::new(self.inner.clone(), self.field)
    }
}

impl<T> Deref for Property<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl<T> DerefMut for Property<T> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.mutate();
        &mut self.inner
    }
}

impl<T: std::fmt::Debug> std::fmt::Debug for Property<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.inner.fmt(f)
    }
}
