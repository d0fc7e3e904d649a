use crate::sync::{Asset, ObjectTypeConfig, SyncObject};

/// A VFX definition. Servers may ship any number of them.
#[derive(Clone, Debug, PartialEq)]
pub struct ParticleSystem {
    id: String,
    spawners: Vec<String>,
    lifespan_secs: f32,
    max_particles: u32,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ParticleSystemPayload {
    pub id: String,
    pub spawners: Vec<String>,
    pub lifespan_secs: f32,
    pub max_particles: u32,
}

impl ParticleSystem {
    pub fn new(id: &str, lifespan_secs: f32, max_particles: u32) -> Self {
        Self {
            id: id.to_string(),
            spawners: Vec::new(),
            lifespan_secs,
            max_particles,
        }
    }

    pub fn with_spawner(mut self, spawner: &str) -> Self {
        self.spawners.push(spawner.to_string());
        self
    }

    pub fn max_particles(&self) -> u32 {
        self.max_particles
    }
}

impl SyncObject for ParticleSystem {
    type Key = String;
    type Payload = ParticleSystemPayload;

    fn type_config() -> ObjectTypeConfig {
        ObjectTypeConfig::delta("ParticleSystem")
    }

    fn snapshot(&self) -> ParticleSystemPayload {
        ParticleSystemPayload {
            id: self.id.clone(),
            spawners: self.spawners.clone(),
            lifespan_secs: self.lifespan_secs,
            max_particles: self.max_particles,
        }
    }
}

impl Asset for ParticleSystem {
    fn id(&self) -> &str {
        &self.id
    }
}
