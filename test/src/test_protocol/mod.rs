use replicant_shared::{
    objects::{
        AudioCategoryPayload, EntityStatsPayload, FluidFxPayload, MovementStatesPayload,
        ParticleSystemPayload,
    },
    ObjectIndex, SharedPacket, SyncKind,
};

/// The application protocol the tests egress: one variant per replicated
/// payload type
#[derive(Clone, Debug)]
pub enum TestPacket {
    AudioCategory(SharedPacket<AudioCategoryPayload>),
    ParticleSystem(SharedPacket<ParticleSystemPayload>),
    FluidFx(SharedPacket<FluidFxPayload>),
    MovementStates(SharedPacket<MovementStatesPayload>),
    EntityStats(SharedPacket<EntityStatsPayload>),
}

macro_rules! impl_from_packet {
    ($variant:ident, $payload:ty) => {
        impl From<SharedPacket<$payload>> for TestPacket {
            fn from(packet: SharedPacket<$payload>) -> Self {
                TestPacket::$variant(packet)
            }
        }
    };
}

impl_from_packet!(AudioCategory, AudioCategoryPayload);
impl_from_packet!(ParticleSystem, ParticleSystemPayload);
impl_from_packet!(FluidFx, FluidFxPayload);
impl_from_packet!(MovementStates, MovementStatesPayload);
impl_from_packet!(EntityStats, EntityStatsPayload);

macro_rules! on_packet {
    ($self:expr, $packet:ident => $body:expr) => {
        match $self {
            TestPacket::AudioCategory($packet) => $body,
            TestPacket::ParticleSystem($packet) => $body,
            TestPacket::FluidFx($packet) => $body,
            TestPacket::MovementStates($packet) => $body,
            TestPacket::EntityStats($packet) => $body,
        }
    };
}

impl TestPacket {
    pub fn object_type(&self) -> &'static str {
        match self {
            TestPacket::AudioCategory(_) => "AudioCategory",
            TestPacket::ParticleSystem(_) => "ParticleSystem",
            TestPacket::FluidFx(_) => "FluidFx",
            TestPacket::MovementStates(_) => "MovementStates",
            TestPacket::EntityStats(_) => "EntityStats",
        }
    }

    /// Asset packets are broadcast to subscribers rather than swept per
    /// visibility pair
    pub fn is_asset(&self) -> bool {
        matches!(
            self,
            TestPacket::AudioCategory(_) | TestPacket::ParticleSystem(_) | TestPacket::FluidFx(_)
        )
    }

    pub fn kind(&self) -> SyncKind {
        on_packet!(self, packet => packet.kind())
    }

    pub fn indices(&self) -> Vec<ObjectIndex> {
        on_packet!(self, packet => packet.indices())
    }

    pub fn len(&self) -> usize {
        on_packet!(self, packet => packet.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn audio(&self) -> Option<&SharedPacket<AudioCategoryPayload>> {
        match self {
            TestPacket::AudioCategory(packet) => Some(packet),
            _ => None,
        }
    }

    pub fn particles(&self) -> Option<&SharedPacket<ParticleSystemPayload>> {
        match self {
            TestPacket::ParticleSystem(packet) => Some(packet),
            _ => None,
        }
    }

    pub fn movement(&self) -> Option<&SharedPacket<MovementStatesPayload>> {
        match self {
            TestPacket::MovementStates(packet) => Some(packet),
            _ => None,
        }
    }

    pub fn stats(&self) -> Option<&SharedPacket<EntityStatsPayload>> {
        match self {
            TestPacket::EntityStats(packet) => Some(packet),
            _ => None,
        }
    }
}
