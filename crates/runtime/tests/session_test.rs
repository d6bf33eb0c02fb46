//! End-to-end session scenarios: attach, rearrange, weight propagation,
//! movement penalties, and persistence across detach/re-attach.
//!
//! Tests run on a paused tokio clock; `wait_for` advances it one worker
//! tick at a time, so event timing is fully deterministic.

use std::io::Write;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::broadcast;

use inventory_content::loaders::CatalogLoader;
use inventory_core::{
    CharacterStats, ContainerKey, ItemDescriptor, ItemId, ItemKind, MovementProfile, SlotCommand,
};
use runtime::{
    InventoryEvent, InventorySession, MovementSink, SessionError, StaticStatsProvider,
};

fn bag(id: &str, slots: usize) -> ItemDescriptor {
    ItemDescriptor::container(id, "Leather Bag", 2.0, slots, 0.0)
}

fn potion() -> ItemDescriptor {
    ItemDescriptor::new("potion", "Potion", ItemKind::Consumable, 0.5, 20)
}

/// Drains events until one matches `pred`, skipping unrelated ones. While
/// the stream is empty the paused clock is advanced one worker tick at a
/// time, so debounce windows elapse deterministically; a bounded number of
/// ticks keeps a missing event from hanging the test.
async fn wait_for(
    rx: &mut broadcast::Receiver<InventoryEvent>,
    pred: impl Fn(&InventoryEvent) -> bool,
) -> InventoryEvent {
    for _ in 0..200 {
        match rx.try_recv() {
            Ok(event) if pred(&event) => return event,
            Ok(_) | Err(broadcast::error::TryRecvError::Lagged(_)) => {}
            Err(broadcast::error::TryRecvError::Empty) => {
                tokio::time::advance(Duration::from_millis(50)).await;
                tokio::task::yield_now().await;
            }
            Err(broadcast::error::TryRecvError::Closed) => panic!("event channel closed"),
        }
    }
    panic!("event did not arrive within the advanced window");
}

#[derive(Default)]
struct RecordingSink {
    updates: Mutex<Vec<(f32, MovementProfile)>>,
}

#[async_trait]
impl MovementSink for RecordingSink {
    async fn apply_movement(&self, multiplier: f32, profile: MovementProfile) {
        self.updates.lock().unwrap().push((multiplier, profile));
    }
}

#[tokio::test(start_paused = true)]
async fn catalog_backed_session_round_trip() {
    let mut catalog_file = tempfile::NamedTempFile::new().expect("temp file");
    write!(
        catalog_file,
        r#"(
    items: [
        (
            id: ("potion"),
            display_name: "Potion",
            kind: Consumable,
            weight: 0.5,
            max_stack_size: 20,
            slot_count: 0,
            weight_reduction_percent: 0.0,
        ),
        (
            id: ("bag1"),
            display_name: "Leather Bag",
            kind: Container,
            weight: 2.0,
            max_stack_size: 1,
            slot_count: 4,
            weight_reduction_percent: 0.0,
        ),
    ],
)"#
    )
    .expect("write catalog");
    let catalog = CatalogLoader::load(catalog_file.path()).expect("catalog loads");

    let session = InventorySession::builder()
        .catalog(catalog)
        .start()
        .await
        .expect("session starts");
    let handle = session.handle();
    let mut events = session.subscribe();

    handle
        .attach_by_id(ItemId::new("bag1"))
        .await
        .expect("bag attaches");
    let key = ContainerKey::for_item(&ItemId::new("bag1"));

    handle.open(key.clone()).await.expect("bag opens");
    wait_for(&mut events, |e| {
        matches!(e, InventoryEvent::ContainerOpened { key: k } if k == &key)
    })
    .await;

    handle
        .apply(
            key.clone(),
            SlotCommand::Add {
                item: potion(),
                quantity: 5,
                target_slot: None,
            },
        )
        .await
        .expect("potions stow");
    let event = wait_for(&mut events, |e| {
        matches!(e, InventoryEvent::SlotUpdated { index: 0, .. })
    })
    .await;
    if let InventoryEvent::SlotUpdated { slot, .. } = event {
        assert_eq!(slot.quantity(), 5);
    }

    // The debounced weight recompute fires: 2.0 + 0.5 * 5 = 4.5
    wait_for(&mut events, |e| {
        matches!(e, InventoryEvent::ContainerWeightChanged { weight, .. } if (weight - 4.5).abs() < 1.0e-3)
    })
    .await;
    wait_for(&mut events, |e| {
        matches!(e, InventoryEvent::TotalWeightChanged { total } if (total - 4.5).abs() < 1.0e-3)
    })
    .await;

    let report = handle.weight_report().await.expect("weight report");
    assert!((report.total - 4.5).abs() < 1.0e-3);
    assert_eq!(report.capacity, 100.0);
    assert_eq!(report.multiplier, 1.0);

    // Items that are not in the catalog cannot be attached
    let missing = handle.attach_by_id(ItemId::new("crate_of_lies")).await;
    assert!(matches!(missing, Err(SessionError::UnknownItem { .. })));

    drop(handle);
    session.shutdown().await.expect("clean shutdown");
}

#[tokio::test(start_paused = true)]
async fn overweight_penalty_reaches_the_movement_sink() {
    let sink = Arc::new(RecordingSink::default());
    let session = InventorySession::builder()
        .stats_provider(Arc::new(StaticStatsProvider(CharacterStats::new(1.0))))
        .movement_sink(sink.clone())
        .start()
        .await
        .expect("session starts");
    let handle = session.handle();
    let mut events = session.subscribe();

    handle.attach(bag("bag1", 4)).await.expect("bag attaches");
    let key = ContainerKey::for_item(&ItemId::new("bag1"));

    // Capacity 10; load 2.0 + 0.5 * 26 = 15, ratio 1.5, multiplier 0.75
    for (slot, quantity) in [(0, 20), (1, 6)] {
        handle
            .apply(
                key.clone(),
                SlotCommand::Add {
                    item: potion(),
                    quantity,
                    target_slot: Some(slot),
                },
            )
            .await
            .expect("potions stow");
    }

    let event = wait_for(&mut events, |e| {
        matches!(e, InventoryEvent::MovementChanged { .. })
    })
    .await;
    if let InventoryEvent::MovementChanged {
        multiplier,
        profile,
    } = event
    {
        assert!((multiplier - 0.75).abs() < 1.0e-3);
        assert!((profile.max_walk_speed - 450.0).abs() < 1.0e-2);
        assert!((profile.ground_friction - 6.0).abs() < 1.0e-2);
    }

    let report = handle.weight_report().await.expect("weight report");
    assert!(report.total > report.capacity);
    assert!((report.multiplier - 0.75).abs() < 1.0e-3);

    let updates = sink.updates.lock().unwrap().clone();
    assert!(!updates.is_empty());
    assert!((updates.last().unwrap().0 - 0.75).abs() < 1.0e-3);

    drop(handle);
    session.shutdown().await.expect("clean shutdown");
}

#[tokio::test(start_paused = true)]
async fn rejected_requests_surface_reasons() {
    let session = InventorySession::builder()
        .start()
        .await
        .expect("session starts");
    let handle = session.handle();
    let mut events = session.subscribe();

    handle.attach(bag("bag1", 4)).await.expect("bag attaches");
    let key = ContainerKey::for_item(&ItemId::new("bag1"));

    let result = handle
        .apply(
            key.clone(),
            SlotCommand::Add {
                item: potion(),
                quantity: 1,
                target_slot: Some(9),
            },
        )
        .await;
    assert!(result.is_err());
    let event = wait_for(&mut events, |e| {
        matches!(e, InventoryEvent::InteractionFailed { .. })
    })
    .await;
    if let InventoryEvent::InteractionFailed { key: k, reason } = event {
        assert_eq!(k, key);
        assert!(reason.contains("out of range"));
    }

    // Commands addressed to keys with no live container are rejected too
    let ghost = ContainerKey::for_item(&ItemId::new("ghost"));
    assert!(handle.open(ghost.clone()).await.is_err());

    // Containers are never stowed inside containers
    assert!(handle.pickup(bag("pouch", 2), 1).await.is_err());

    drop(handle);
    session.shutdown().await.expect("clean shutdown");
}

#[tokio::test(start_paused = true)]
async fn detach_persists_and_reattach_restores() {
    let session = InventorySession::builder()
        .start()
        .await
        .expect("session starts");
    let handle = session.handle();

    let id = handle.attach(bag("bag1", 4)).await.expect("bag attaches");
    let key = ContainerKey::for_item(&ItemId::new("bag1"));

    handle
        .apply(
            key.clone(),
            SlotCommand::Add {
                item: potion(),
                quantity: 7,
                target_slot: Some(2),
            },
        )
        .await
        .expect("potions stow");

    assert!(handle.detach(key.clone(), id).await.expect("detach"));
    // A second detach with the old id finds nothing
    assert!(!handle.detach(key.clone(), id).await.expect("detach"));

    // The record outlives the instance
    let snapshot = handle.registry_snapshot().await.expect("snapshot");
    let saved = snapshot.get(&key).expect("record survives");
    assert_eq!(saved.slots()[2].quantity(), 7);

    let new_id = handle.attach(bag("bag1", 4)).await.expect("re-attach");
    assert_ne!(new_id, id);

    let mut events = session.subscribe();
    handle.open(key.clone()).await.expect("bag opens");
    let event = wait_for(&mut events, |e| {
        matches!(e, InventoryEvent::SlotUpdated { index: 2, .. })
    })
    .await;
    if let InventoryEvent::SlotUpdated { slot, .. } = event {
        assert_eq!(slot.quantity(), 7);
    }

    drop(handle);
    session.shutdown().await.expect("clean shutdown");
}
