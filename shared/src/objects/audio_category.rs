use crate::sync::{Asset, ObjectTypeConfig, SyncObject};

/// Upper bound on audio categories a server may define
pub const MAX_AUDIO_CATEGORIES: usize = 256;

/// A global mixing group (music, ambience, ...). There are few of them and
/// they rarely change, so the whole set is resent on every change.
#[derive(Clone, Debug, PartialEq)]
pub struct AudioCategory {
    id: String,
    volume: f32,
    muted: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub struct AudioCategoryPayload {
    pub id: String,
    pub volume: f32,
    pub muted: bool,
}

impl AudioCategory {
    pub fn new(id: &str, volume: f32) -> Self {
        Self {
            id: id.to_string(),
            volume: volume.clamp(0.0, 1.0),
            muted: false,
        }
    }

    pub fn muted(mut self) -> Self {
        self.muted = true;
        self
    }

    pub fn volume(&self) -> f32 {
        self.volume
    }

    pub fn is_muted(&self) -> bool {
        self.muted
    }
}

impl SyncObject for AudioCategory {
    type Key = String;
    type Payload = AudioCategoryPayload;

    fn type_config() -> ObjectTypeConfig {
        ObjectTypeConfig::full_resync("AudioCategory", MAX_AUDIO_CATEGORIES)
    }

    fn snapshot(&self) -> AudioCategoryPayload {
        AudioCategoryPayload {
            id: self.id.clone(),
            volume: self.volume,
            muted: self.muted,
        }
    }
}

impl Asset for AudioCategory {
    fn id(&self) -> &str {
        &self.id
    }
}
