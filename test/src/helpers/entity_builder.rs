use replicant_shared::{GlobalEntity, ViewerKey};

/// Hands out fresh entity and viewer keys so tests never collide
pub struct TestEntityBuilder {
    next_entity: u64,
    next_viewer: u64,
}

impl TestEntityBuilder {
    pub fn new() -> Self {
        Self {
            next_entity: 1,
            next_viewer: 1,
        }
    }

    pub fn entity(&mut self) -> GlobalEntity {
        let entity = GlobalEntity::from_u64(self.next_entity);
        self.next_entity += 1;
        entity
    }

    pub fn entities(&mut self, count: usize) -> Vec<GlobalEntity> {
        (0..count).map(|_| self.entity()).collect()
    }

    pub fn viewer(&mut self) -> ViewerKey {
        let viewer = ViewerKey::new(self.next_viewer);
        self.next_viewer += 1;
        viewer
    }
}

impl Default for TestEntityBuilder {
    fn default() -> Self {
        Self::new()
    }
}
