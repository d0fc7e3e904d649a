use std::{fmt::Debug, hash::Hash};

use crate::change::{DiffMask, DirtySender};

use super::error::ConfigError;

/// How Update packets are built for an object type
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SyncStrategy {
    /// Update packets carry only the changed objects, each with only its changed fields
    Delta,
    /// Init and Update packets always carry the entire current collection.
    /// Only valid for object types with a bounded instance count.
    FullResync,
}

/// Upper bound on how many instances of an object type may exist at once
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Cardinality {
    Bounded(usize),
    Unbounded,
}

/// Whether removing an object has a client-visible representation to tear down
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RemovalSemantics {
    Explicit,
    None,
}

/// Per object type replication settings, declared once per type
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ObjectTypeConfig {
    pub name: &'static str,
    pub strategy: SyncStrategy,
    pub cardinality: Cardinality,
    pub removal: RemovalSemantics,
    /// Send a Remove to a viewer that loses visibility of an object it holds
    pub unload_on_lost_visibility: bool,
}

impl ObjectTypeConfig {
    pub fn delta(name: &'static str) -> Self {
        Self {
            name,
            strategy: SyncStrategy::Delta,
            cardinality: Cardinality::Unbounded,
            removal: RemovalSemantics::Explicit,
            unload_on_lost_visibility: false,
        }
    }

    pub fn full_resync(name: &'static str, bound: usize) -> Self {
        Self {
            name,
            strategy: SyncStrategy::FullResync,
            cardinality: Cardinality::Bounded(bound),
            removal: RemovalSemantics::Explicit,
            unload_on_lost_visibility: false,
        }
    }

    pub fn with_cardinality(mut self, cardinality: Cardinality) -> Self {
        self.cardinality = cardinality;
        self
    }

    pub fn with_removal(mut self, removal: RemovalSemantics) -> Self {
        self.removal = removal;
        self
    }

    pub fn with_unload_on_lost_visibility(mut self, unload: bool) -> Self {
        self.unload_on_lost_visibility = unload;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        match (self.strategy, self.cardinality) {
            (_, Cardinality::Bounded(0)) => Err(ConfigError::ZeroBound {
                object_type: self.name,
            }),
            (SyncStrategy::FullResync, Cardinality::Unbounded) => {
                Err(ConfigError::FullResyncUnbounded {
                    object_type: self.name,
                })
            }
            _ => Ok(()),
        }
    }

    /// Checks a prospective instance count against the declared bound
    pub fn check_count(&self, count: usize) -> Result<(), ConfigError> {
        if let Cardinality::Bounded(bound) = self.cardinality {
            if count > bound {
                return Err(ConfigError::CardinalityExceeded {
                    object_type: self.name,
                    bound,
                    count,
                });
            }
        }
        Ok(())
    }
}

/// A unit of replicated state: an asset or a component instance.
pub trait SyncObject: Send + Sync + 'static {
    type Key: Clone + Eq + Hash + Debug + Send + Sync;
    type Payload: Clone + Debug + PartialEq + Send + Sync;

    /// Number of independently tracked fields
    const FIELD_COUNT: u8 = 1;

    fn type_config() -> ObjectTypeConfig
    where
        Self: Sized;

    /// The complete current state
    fn snapshot(&self) -> Self::Payload;

    /// The state of the fields set in `mask`. Objects without per-field
    /// tracking send their full snapshot.
    fn diff(&self, _mask: &DiffMask) -> Self::Payload {
        self.snapshot()
    }

    /// Hands the object the sender its fields use to report mutation
    fn set_mutator(&mut self, _mutator: &DirtySender) {}
}

/// A static, string-keyed object loaded by an asset service
pub trait Asset: SyncObject<Key = String> {
    fn id(&self) -> &str;
}
