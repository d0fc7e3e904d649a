use crate::{
    change::{DiffMask, DirtySender, Property},
    sync::{ObjectTypeConfig, SyncObject},
    GlobalEntity,
};

/// Stat values of a living entity
#[derive(Clone, Debug)]
pub struct EntityStats {
    pub health: Property<f32>,
    pub max_health: Property<f32>,
    pub stamina: Property<f32>,
    pub mana: Property<f32>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct EntityStatsPayload {
    pub health: Option<f32>,
    pub max_health: Option<f32>,
    pub stamina: Option<f32>,
    pub mana: Option<f32>,
}

impl EntityStats {
    pub const HEALTH: u8 = 0;
    pub const MAX_HEALTH: u8 = 1;
    pub const STAMINA: u8 = 2;
    pub const MANA: u8 = 3;

    pub fn new(max_health: f32, stamina: f32, mana: f32) -> Self {
        Self {
            health: Property::new(max_health, Self::HEALTH),
            max_health: Property::new(max_health, Self::MAX_HEALTH),
            stamina: Property::new(stamina, Self::STAMINA),
            mana: Property::new(mana, Self::MANA),
        }
    }

    /// Applies damage, never dropping below zero. Untouched if already dead.
    pub fn damage(&mut self, amount: f32) {
        if *self.health <= 0.0 {
            return;
        }
        let health = (*self.health - amount).max(0.0);
        self.health.set(health);
    }

    pub fn is_dead(&self) -> bool {
        *self.health <= 0.0
    }
}

impl SyncObject for EntityStats {
    type Key = GlobalEntity;
    type Payload = EntityStatsPayload;

    const FIELD_COUNT: u8 = 4;

    fn type_config() -> ObjectTypeConfig {
        ObjectTypeConfig::delta("EntityStats")
    }

    fn snapshot(&self) -> EntityStatsPayload {
        self.diff(&DiffMask::full(Self::FIELD_COUNT))
    }

    fn diff(&self, mask: &DiffMask) -> EntityStatsPayload {
        EntityStatsPayload {
            health: mask.is_set(Self::HEALTH).then_some(*self.health),
            max_health: mask.is_set(Self::MAX_HEALTH).then_some(*self.max_health),
            stamina: mask.is_set(Self::STAMINA).then_some(*self.stamina),
            mana: mask.is_set(Self::MANA).then_some(*self.mana),
        }
    }

    fn set_mutator(&mut self, mutator: &DirtySender) {
        self.health.set_mutator(mutator);
        self.max_health.set_mutator(mutator);
        self.stamina.set_mutator(mutator);
        self.mana.set_mutator(mutator);
    }
}
