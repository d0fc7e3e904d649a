use crate::{
    change::{DiffMask, DirtySender, Property},
    sync::{ObjectTypeConfig, SyncObject},
    GlobalEntity,
};

/// Movement flags of an entity, written by the movement integrator every tick
#[derive(Clone, Debug)]
pub struct MovementStates {
    pub on_ground: Property<bool>,
    pub walking: Property<bool>,
    pub sprinting: Property<bool>,
    pub crouching: Property<bool>,
    pub jumping: Property<bool>,
    pub flying: Property<bool>,
}

/// Absent fields are unchanged since the viewer's last baseline
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MovementStatesPayload {
    pub on_ground: Option<bool>,
    pub walking: Option<bool>,
    pub sprinting: Option<bool>,
    pub crouching: Option<bool>,
    pub jumping: Option<bool>,
    pub flying: Option<bool>,
}

impl MovementStates {
    pub const ON_GROUND: u8 = 0;
    pub const WALKING: u8 = 1;
    pub const SPRINTING: u8 = 2;
    pub const CROUCHING: u8 = 3;
    pub const JUMPING: u8 = 4;
    pub const FLYING: u8 = 5;

    pub fn new() -> Self {
        Self {
            on_ground: Property::new(true, Self::ON_GROUND),
            walking: Property::new(false, Self::WALKING),
            sprinting: Property::new(false, Self::SPRINTING),
            crouching: Property::new(false, Self::CROUCHING),
            jumping: Property::new(false, Self::JUMPING),
            flying: Property::new(false, Self::FLYING),
        }
    }
}

impl Default for MovementStates {
    fn default() -> Self {
        Self::new()
    }
}

fn masked(mask: &DiffMask, field: u8, value: &Property<bool>) -> Option<bool> {
    mask.is_set(field).then_some(**value)
}

impl SyncObject for MovementStates {
    type Key = GlobalEntity;
    type Payload = MovementStatesPayload;

    const FIELD_COUNT: u8 = 6;

    fn type_config() -> ObjectTypeConfig {
        ObjectTypeConfig::delta("MovementStates")
    }

    fn snapshot(&self) -> MovementStatesPayload {
        self.diff(&DiffMask::full(Self::FIELD_COUNT))
    }

    fn diff(&self, mask: &DiffMask) -> MovementStatesPayload {
        MovementStatesPayload {
            on_ground: masked(mask, Self::ON_GROUND, &self.on_ground),
            walking: masked(mask, Self::WALKING, &self.walking),
            sprinting: masked(mask, Self::SPRINTING, &self.sprinting),
            crouching: masked(mask, Self::CROUCHING, &self.crouching),
            jumping: masked(mask, Self::JUMPING, &self.jumping),
            flying: masked(mask, Self::FLYING, &self.flying),
        }
    }

    fn set_mutator(&mut self, mutator: &DirtySender) {
        self.on_ground.set_mutator(mutator);
        self.walking.set_mutator(mutator);
        self.sprinting.set_mutator(mutator);
        self.crouching.set_mutator(mutator);
        self.jumping.set_mutator(mutator);
        self.flying.set_mutator(mutator);
    }
}
