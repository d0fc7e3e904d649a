/// PROPERTY-BASED TESTS: replication invariants
///
/// Uses proptest to drive random visibility, mutation, asset and viewer
/// lifecycle sequences and checks what every viewer receives.
///
/// Key invariants:
/// 1. No viewer receives an Update or Remove for an index before an Init for it
/// 2. A sweep right after a sweep, with no mutation in between, sends no Update
/// 3. Indices handed out by a table never change and are never reused
use std::collections::{HashMap, HashSet};

use proptest::prelude::*;
use replicant_shared::{
    objects::{AudioCategory, MovementStates, ParticleSystem},
    GlobalEntity, IndexKeyTable, ObjectIndex, SyncKind, ViewerKey,
};
use replicant_test::{TestPacket, TestServer};

const ENTITIES: usize = 4;
const VIEWERS: usize = 3;
const ASSETS: usize = 4;

#[derive(Clone, Debug)]
enum Op {
    Show(usize, usize),
    Hide(usize, usize),
    Walk(usize),
    Damage(usize),
    Toggle(usize),
    Despawn(usize),
    Load(usize, bool),
    Unload(usize, bool),
    NotifyAsset(usize, bool),
    Subscribe(usize),
    Reconnect(usize),
    Tick,
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        (0..ENTITIES, 0..VIEWERS).prop_map(|(e, v)| Op::Show(e, v)),
        (0..ENTITIES, 0..VIEWERS).prop_map(|(e, v)| Op::Hide(e, v)),
        (0..ENTITIES).prop_map(Op::Walk),
        (0..ENTITIES).prop_map(Op::Damage),
        (0..ENTITIES).prop_map(Op::Toggle),
        (0..ENTITIES).prop_map(Op::Despawn),
        (0..ASSETS, any::<bool>()).prop_map(|(a, audio)| Op::Load(a, audio)),
        (0..ASSETS, any::<bool>()).prop_map(|(a, audio)| Op::Unload(a, audio)),
        (0..ASSETS, any::<bool>()).prop_map(|(a, audio)| Op::NotifyAsset(a, audio)),
        (0..VIEWERS).prop_map(Op::Subscribe),
        (0..VIEWERS).prop_map(Op::Reconnect),
        Just(Op::Tick),
    ]
}

fn asset_key(id: usize) -> String {
    format!("asset-{}", id)
}

/// What each viewer holds, per object type, as reconstructed from its packets.
///
/// Components are introduced one object at a time by Init. Asset types are
/// introduced as a whole by the subscription Init, after which Updates may
/// carry newly loaded assets.
#[derive(Default)]
struct ClientModel {
    held: HashMap<(ViewerKey, &'static str), HashSet<ObjectIndex>>,
    subscribed: HashSet<(ViewerKey, &'static str)>,
}

impl ClientModel {
    fn receive(&mut self, viewer: ViewerKey, packet: &TestPacket) -> Result<(), TestCaseError> {
        let object_type = packet.object_type();
        let subscribed = self.subscribed.contains(&(viewer, object_type));
        let held = self.held.entry((viewer, object_type)).or_default();
        match packet.kind() {
            SyncKind::Init if packet.is_asset() => {
                *held = packet.indices().into_iter().collect();
                self.subscribed.insert((viewer, object_type));
            }
            SyncKind::Init => held.extend(packet.indices()),
            SyncKind::Update if packet.is_asset() => {
                prop_assert!(
                    subscribed,
                    "{} got a {} Update before its subscription Init",
                    viewer,
                    object_type
                );
                held.extend(packet.indices());
            }
            SyncKind::Update => {
                for index in packet.indices() {
                    prop_assert!(
                        held.contains(&index),
                        "{} got an Update for {} {} before its Init",
                        viewer,
                        object_type,
                        index
                    );
                }
            }
            SyncKind::Remove => {
                for index in packet.indices() {
                    prop_assert!(
                        held.remove(&index),
                        "{} got a Remove for {} {} it never held",
                        viewer,
                        object_type,
                        index
                    );
                }
            }
        }
        Ok(())
    }

    /// A reconnecting client starts from nothing
    fn forget(&mut self, viewer: ViewerKey) {
        self.held.retain(|(held_by, _), _| *held_by != viewer);
        self.subscribed.retain(|(held_by, _)| *held_by != viewer);
    }
}

fn apply(
    server: &mut TestServer,
    entities: &[GlobalEntity],
    viewers: &[ViewerKey],
    op: &Op,
) {
    match op {
        Op::Show(e, v) => server.show(entities[*e], viewers[*v]),
        Op::Hide(e, v) => server.hide(entities[*e], viewers[*v]),
        Op::Walk(e) => {
            if let Some(states) = server.movement.get_mut(&entities[*e]) {
                let walking = *states.walking;
                *states.walking = !walking;
            }
        }
        Op::Damage(e) => {
            if let Some(stats) = server.stats.get_mut(&entities[*e]) {
                stats.damage(7.5);
            }
        }
        Op::Toggle(e) => {
            let entity = entities[*e];
            if server.movement.contains(&entity) {
                let _ = server.movement.detach(&entity);
            } else {
                let _ = server.movement.attach(entity, MovementStates::new());
            }
        }
        Op::Despawn(e) => server.despawn(&entities[*e]),
        Op::Load(a, audio) => {
            let key = asset_key(*a);
            let _ = if *audio {
                server.audio.load(vec![AudioCategory::new(&key, 0.5)])
            } else {
                server.particles.load(vec![ParticleSystem::new(&key, 1.0, 8)])
            };
        }
        Op::Unload(a, audio) => {
            // unloading an asset that is not loaded fails and changes nothing
            let keys = [asset_key(*a)];
            let _ = if *audio {
                server.audio.unload(&keys)
            } else {
                server.particles.unload(&keys)
            };
        }
        Op::NotifyAsset(a, audio) => {
            let key = asset_key(*a);
            let _ = if *audio {
                server.audio.notify_changed(&key)
            } else {
                server.particles.notify_changed(&key)
            };
        }
        Op::Subscribe(v) => {
            server.subscribe(viewers[*v]);
        }
        Op::Reconnect(v) => {
            server.disconnect(&viewers[*v]);
            server.reconnect(viewers[*v]);
        }
        Op::Tick => {
            server.tick();
        }
    }
}

proptest! {
    /// Every Update and Remove a viewer receives refers to an index it was
    /// given an Init for
    #[test]
    fn prop_init_always_precedes_update(ops in prop::collection::vec(op_strategy(), 1..80)) {
        let mut server = TestServer::new();
        let viewers: Vec<ViewerKey> = (0..VIEWERS).map(|_| server.connect()).collect();
        let entities: Vec<GlobalEntity> = (0..ENTITIES).map(|_| server.spawn()).collect();
        let mut model = ClientModel::default();

        for op in ops.iter().chain(std::iter::once(&Op::Tick)) {
            apply(&mut server, &entities, &viewers, op);
            if let Op::Reconnect(v) = op {
                model.forget(viewers[*v]);
            }
            for viewer in &viewers {
                for packet in server.drain(viewer) {
                    model.receive(*viewer, &packet)?;
                }
            }
        }
    }

    /// Once a sweep has run, sweeping again without any mutation sends no Update
    #[test]
    fn prop_idle_sweep_sends_no_update(ops in prop::collection::vec(op_strategy(), 1..60)) {
        let mut server = TestServer::new();
        let viewers: Vec<ViewerKey> = (0..VIEWERS).map(|_| server.connect()).collect();
        let entities: Vec<GlobalEntity> = (0..ENTITIES).map(|_| server.spawn()).collect();

        for op in &ops {
            apply(&mut server, &entities, &viewers, op);
        }
        server.tick();
        let idle = server.tick();

        prop_assert_eq!(idle.updates_sent, 0);
        prop_assert_eq!(idle.inits_sent, 0);
        prop_assert_eq!(idle.removes_sent, 0);
    }

    /// Repeated lookups after assign always return the first index, and
    /// indices are dense in first-assignment order
    #[test]
    fn prop_index_of_is_stable(keys in prop::collection::vec("[a-e]{1,2}", 1..60)) {
        let mut table = IndexKeyTable::new("Prop");
        let mut first_seen: Vec<String> = Vec::new();

        for key in &keys {
            let index = table.assign(key).expect("table has room");
            let repeat = table.assign(key).expect("table has room");
            prop_assert_eq!(index, repeat);
            if !first_seen.contains(key) {
                first_seen.push(key.clone());
            }
        }

        for (position, key) in first_seen.iter().enumerate() {
            let index = ObjectIndex::new(position as u32);
            prop_assert_eq!(table.index_of(key), Some(index));
            prop_assert_eq!(table.key_of(index), Some(key));
        }
        prop_assert_eq!(table.len(), first_seen.len());
    }

    /// Loading and unloading assets never moves or reuses an index
    #[test]
    fn prop_asset_indices_survive_unload(
        batches in prop::collection::vec((prop::collection::vec(0..8usize, 0..5), any::<bool>()), 1..30)
    ) {
        let mut server = TestServer::new();
        let mut assigned: HashMap<String, ObjectIndex> = HashMap::new();

        for (ids, unload) in batches {
            let keys: Vec<String> = ids.iter().map(|id| format!("cat-{}", id)).collect();
            if unload {
                let loaded: Vec<String> = keys
                    .iter()
                    .filter(|key| server.audio.get(key).is_some())
                    .cloned()
                    .collect::<HashSet<_>>()
                    .into_iter()
                    .collect();
                server.audio.unload(&loaded).expect("only loaded keys are unloaded");
            } else {
                let assets = keys.iter().map(|key| AudioCategory::new(key, 1.0)).collect();
                server.audio.load(assets).expect("well under the bound");
            }
            server.tick();

            for (index, key) in server.audio.registry().table().iter() {
                if let Some(previous) = assigned.insert(key.clone(), index) {
                    prop_assert_eq!(previous, index);
                }
            }
            let distinct: HashSet<ObjectIndex> = assigned.values().copied().collect();
            prop_assert_eq!(distinct.len(), assigned.len());
        }
    }
}
