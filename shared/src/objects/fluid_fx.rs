use crate::sync::{Asset, ObjectTypeConfig, RemovalSemantics, SyncObject};

/// Fog and tint applied while the camera is submerged in a fluid.
///
/// Clients only sample these by index while rendering, so there is nothing
/// to tear down when one is removed.
#[derive(Clone, Debug, PartialEq)]
pub struct FluidFx {
    id: String,
    fog_color: [u8; 3],
    fog_distance: f32,
}

#[derive(Clone, Debug, PartialEq)]
pub struct FluidFxPayload {
    pub id: String,
    pub fog_color: [u8; 3],
    pub fog_distance: f32,
}

impl FluidFx {
    pub fn new(id: &str, fog_color: [u8; 3], fog_distance: f32) -> Self {
        Self {
            id: id.to_string(),
            fog_color,
            fog_distance,
        }
    }
}

impl SyncObject for FluidFx {
    type Key = String;
    type Payload = FluidFxPayload;

    fn type_config() -> ObjectTypeConfig {
        ObjectTypeConfig::delta("FluidFx").with_removal(RemovalSemantics::None)
    }

    fn snapshot(&self) -> FluidFxPayload {
        FluidFxPayload {
            id: self.id.clone(),
            fog_color: self.fog_color,
            fog_distance: self.fog_distance,
        }
    }
}

impl Asset for FluidFx {
    fn id(&self) -> &str {
        &self.id
    }
}
