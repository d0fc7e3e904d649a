/// Asset replication: subscribe-time Inits, per-batch broadcasts, and the
/// full-resync and delta strategies.
use replicant_server::{ReplicationError, SweepReport};
use replicant_shared::{
    objects::{AudioCategory, FluidFx, ParticleSystem},
    ObjectIndex,
};
use replicant_test::{assert_indices, assert_kinds, TestServer};

fn names(keys: &[&str]) -> Vec<String> {
    keys.iter().map(|key| key.to_string()).collect()
}

#[test]
fn test_subscribe_to_empty_service_sends_empty_init() {
    let mut server = TestServer::new();

    let viewer = server.connect_subscribed();

    let packets = server.drain_type(&viewer, "AudioCategory");
    assert_kinds!(packets, [Init]);
    assert!(packets[0].is_empty());
}

#[test]
fn test_full_resync_update_carries_whole_collection() {
    let mut server = TestServer::new();
    let viewer = server.connect_subscribed();
    server.drain(&viewer);

    server
        .audio
        .load(vec![AudioCategory::new("a", 1.0), AudioCategory::new("b", 0.5)])
        .expect("load audio");
    server.tick();
    server.drain(&viewer);

    let table = server.audio.registry().table();
    assert_eq!(table.index_of(&"a".to_string()), Some(ObjectIndex::new(0)));
    assert_eq!(table.index_of(&"b".to_string()), Some(ObjectIndex::new(1)));

    // only "a" changed, but the whole set goes out
    server.audio.notify_changed("a").expect("a is loaded");
    server.tick();

    let packets = server.drain_type(&viewer, "AudioCategory");
    assert_kinds!(packets, [Update]);
    assert_indices!(packets[0], [0, 1]);
    let audio = packets[0].audio().expect("audio packet");
    assert_eq!(
        audio.payload(ObjectIndex::new(1)).map(|payload| payload.volume),
        Some(0.5)
    );
}

#[test]
fn test_delta_update_carries_only_changed_assets() {
    let mut server = TestServer::new();
    server
        .particles
        .load(vec![
            ParticleSystem::new("smoke", 2.0, 64),
            ParticleSystem::new("spark", 0.5, 16),
            ParticleSystem::new("rain", 4.0, 512),
        ])
        .expect("load particles");
    server.tick();
    let viewer = server.connect_subscribed();

    let packets = server.drain_type(&viewer, "ParticleSystem");
    assert_kinds!(packets, [Init]);
    assert_eq!(packets[0].len(), 3);

    server
        .particles
        .load(vec![ParticleSystem::new("spark", 0.75, 32).with_spawner("anvil")])
        .expect("reload spark");
    server.tick();

    let packets = server.drain_type(&viewer, "ParticleSystem");
    assert_kinds!(packets, [Update]);
    let spark = server
        .particles
        .registry()
        .table()
        .index_of(&"spark".to_string())
        .expect("spark has an index");
    assert_eq!(packets[0].indices(), vec![spark]);
    let particles = packets[0].particles().expect("particle packet");
    assert_eq!(
        particles.payload(spark).map(|payload| payload.spawners.clone()),
        Some(vec!["anvil".to_string()])
    );
}

#[test]
fn test_one_packet_per_batch_shared_by_all_subscribers() {
    let mut server = TestServer::new();
    let first = server.connect_subscribed();
    let second = server.connect_subscribed();
    server.drain(&first);
    server.drain(&second);

    server
        .audio
        .load(vec![AudioCategory::new("music", 0.8), AudioCategory::new("sfx", 1.0)])
        .expect("load audio");
    server.audio.notify_changed("music").expect("music is loaded");
    let report = server.tick();

    assert_eq!(report.updates_sent, 2);
    let a = server.drain_type(&first, "AudioCategory");
    let b = server.drain_type(&second, "AudioCategory");
    assert_kinds!(a, [Update]);
    assert_kinds!(b, [Update]);
    match (a[0].audio(), b[0].audio()) {
        (Some(a), Some(b)) => assert!(std::sync::Arc::ptr_eq(a, b)),
        _ => panic!("expected audio packets"),
    }
}

#[test]
fn test_unload_sends_remove_to_every_subscriber() {
    let mut server = TestServer::new();
    server
        .audio
        .load(vec![AudioCategory::new("a", 1.0), AudioCategory::new("b", 1.0)])
        .expect("load audio");
    server.tick();
    let first = server.connect_subscribed();
    let second = server.connect_subscribed();
    server.drain(&first);
    server.drain(&second);

    server.audio.unload(&names(&["a"])).expect("a is loaded");
    server.tick();

    for viewer in [first, second] {
        let packets = server.drain_type(&viewer, "AudioCategory");
        assert_kinds!(packets, [Remove]);
        assert_indices!(packets[0], [0]);
    }

    // "a" keeps its index, a new asset gets the next one
    server
        .audio
        .load(vec![AudioCategory::new("c", 1.0)])
        .expect("load c");
    assert_eq!(
        server.audio.registry().table().index_of(&"c".to_string()),
        Some(ObjectIndex::new(2))
    );
}

#[test]
fn test_asset_without_client_removal_sends_nothing_on_unload() {
    let mut server = TestServer::new();
    server
        .fluids
        .load(vec![FluidFx::new("water", [20, 40, 200], 16.0)])
        .expect("load fluid");
    let viewer = server.connect_subscribed();
    server.tick();
    server.drain(&viewer);

    server.fluids.notify_removed("water").expect("water is loaded");
    server.tick();

    assert!(server.drain_type(&viewer, "FluidFx").is_empty());
    assert!(server.fluids.get("water").is_none());
}

#[test]
fn test_batch_without_subscribers_is_dropped() {
    let mut server = TestServer::new();
    server
        .audio
        .load(vec![AudioCategory::new("music", 0.8)])
        .expect("load audio");

    let report = server.tick();
    assert_eq!(report, SweepReport::default());

    // a later subscriber still receives the current state
    let viewer = server.connect_subscribed();
    let packets = server.drain_type(&viewer, "AudioCategory");
    assert_kinds!(packets, [Init]);
    assert_indices!(packets[0], [0]);
}

#[test]
fn test_bounded_asset_type_rejects_overflow() {
    let mut server = TestServer::new();
    let too_many: Vec<AudioCategory> = (0..=replicant_shared::objects::MAX_AUDIO_CATEGORIES)
        .map(|id| AudioCategory::new(&format!("category-{}", id), 1.0))
        .collect();

    let error = server.audio.load(too_many).expect_err("over the bound");

    assert!(matches!(error, ReplicationError::Config(_)));
    assert!(server.audio.registry().is_empty());
}

#[test]
fn test_notify_changed_on_unloaded_asset_fails() {
    let mut server = TestServer::new();

    let result = server.audio.notify_changed("missing");

    assert_eq!(
        result,
        Err(ReplicationError::AssetNotLoaded {
            object_type: "AudioCategory",
            key: "missing".to_string()
        })
    );
}

#[test]
fn test_reconnected_viewer_starts_with_fresh_init() {
    let mut server = TestServer::new();
    server
        .audio
        .load(vec![AudioCategory::new("a", 1.0)])
        .expect("load audio");
    let viewer = server.connect_subscribed();
    server.tick();
    server.disconnect(&viewer);
    assert!(!server.audio.is_subscribed(&viewer));

    server.reconnect(viewer);
    server.subscribe(viewer);
    server.audio.notify_changed("a").expect("a is loaded");
    server.tick();

    let packets = server.drain_type(&viewer, "AudioCategory");
    assert_kinds!(packets, [Init, Update]);
    assert_indices!(packets[0], [0]);
}

#[test]
fn test_asset_loaded_and_unloaded_in_one_batch_sends_nothing() {
    let mut server = TestServer::new();
    let viewer = server.connect_subscribed();
    server.drain(&viewer);

    server
        .audio
        .load(vec![AudioCategory::new("a", 1.0)])
        .expect("load audio");
    server.audio.unload(&names(&["a"])).expect("a is loaded");
    let report = server.tick();

    assert_eq!(report.packets_sent(), 0);
    assert!(server.drain(&viewer).is_empty());
    assert!(!server.audio.is_announced("a"));
}

#[test]
fn test_subscribe_flushes_pending_removal_to_existing_subscribers() {
    let mut server = TestServer::new();
    server
        .audio
        .load(vec![AudioCategory::new("a", 1.0), AudioCategory::new("b", 1.0)])
        .expect("load audio");
    let first = server.connect_subscribed();
    server.drain(&first);

    server.audio.unload(&names(&["a"])).expect("a is loaded");
    let second = server.connect_subscribed();

    let packets = server.drain_type(&first, "AudioCategory");
    assert_kinds!(packets, [Remove]);
    assert_indices!(packets[0], [0]);
    let packets = server.drain_type(&second, "AudioCategory");
    assert_kinds!(packets, [Init]);
    assert_indices!(packets[0], [1]);

    // nothing is left over for the next tick
    server.tick();
    assert!(server.drain(&first).is_empty());
    assert!(server.drain(&second).is_empty());
}
