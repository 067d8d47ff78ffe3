//! Integration tests for the task lifecycle and persistence.

use chrono::{DateTime, Duration, TimeZone, Utc};
use flowtrack_core::{
    Config, Database, Event, FlowStore, KvStore, MemoryKv, NewTask, StoreSettings, TaskState,
};

fn morning() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 2, 16, 8, 30, 0).unwrap()
}

fn create(store: &mut FlowStore, title: &str, minutes: u32) -> String {
    store
        .create_task(NewTask::new(title, minutes), morning())
        .unwrap()
        .task_id()
        .unwrap()
        .to_string()
}

#[test]
fn test_full_task_lifecycle() {
    let mut store = FlowStore::new();
    let id = create(&mut store, "Write report", 60);
    assert_eq!(store.task_state(&id), Some(TaskState::Pending));

    let t = morning();
    store.start_task(&id, t, Some(4.0));
    assert_eq!(store.task_state(&id), Some(TaskState::Active));

    store.pause_task(t + Duration::minutes(25));
    assert_eq!(store.task_state(&id), Some(TaskState::Paused));

    store.start_task(&id, t + Duration::minutes(30), None);
    let event = store.complete_task(&id, 1.2, t + Duration::minutes(70)).unwrap();

    assert!(matches!(event, Event::TaskCompleted { actual_minutes: 65, .. }));
    assert_eq!(store.task_state(&id), Some(TaskState::Completed));
    assert_eq!(store.blocks().len(), 2);
    assert_eq!(store.blocks_for(&id).map(|b| b.duration).sum::<u32>(), 65);
}

#[test]
fn test_start_then_immediate_pause_adds_zero() {
    let mut store = FlowStore::new();
    let id = create(&mut store, "Quick", 10);
    store.start_task(&id, morning(), None);
    store.pause_task(morning());
    assert_eq!(store.task(&id).unwrap().actual_minutes, 0);
}

#[test]
fn test_single_active_task_invariant() {
    let mut store = FlowStore::new();
    let ids: Vec<String> = ["A", "B", "C"]
        .iter()
        .map(|t| create(&mut store, t, 30))
        .collect();

    for (i, id) in ids.iter().enumerate() {
        store.start_task(id, morning() + Duration::minutes(10 * i as i64), None);
        let active: Vec<_> = store
            .tasks_with_state()
            .filter(|(_, s)| *s == TaskState::Active)
            .map(|(t, _)| t.id.clone())
            .collect();
        assert_eq!(active, vec![id.clone()]);
    }

    // A and B were each paused after 10 minutes.
    assert_eq!(store.task(&ids[0]).unwrap().actual_minutes, 10);
    assert_eq!(store.task(&ids[1]).unwrap().actual_minutes, 10);
}

#[test]
fn test_deleted_task_leaves_blocks_behind() {
    let mut store = FlowStore::new();
    let id = create(&mut store, "Temp", 20);
    store.start_task(&id, morning(), None);
    store.pause_task(morning() + Duration::minutes(12));
    store.delete_task(&id, morning() + Duration::minutes(13));

    assert!(store.task(&id).is_none());
    assert_eq!(store.blocks().len(), 1);
    assert_eq!(store.blocks()[0].task_id, id);
}

#[test]
fn test_state_survives_sqlite_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("flowtrack.db");

    let id = {
        let db = Database::open_at(&path).unwrap();
        let mut store = FlowStore::new();
        let id = create(&mut store, "Persisted", 45);
        store.start_task(&id, morning(), None);
        assert_eq!(store.persist(&db), 3);
        id
    };

    let db = Database::open_at(&path).unwrap();
    let mut store = FlowStore::load(&db, StoreSettings::default());
    assert_eq!(store.task_state(&id), Some(TaskState::Active));

    store.pause_task(morning() + Duration::minutes(30));
    store.persist(&db);
    assert!(db.get("active_session").unwrap().is_none());

    let store = FlowStore::load(&db, StoreSettings::default());
    assert_eq!(store.task(&id).unwrap().actual_minutes, 30);
    assert_eq!(store.task_state(&id), Some(TaskState::Paused));
}

#[test]
fn test_unavailable_store_keeps_memory_state() {
    let kv = MemoryKv::failing_writes();
    let mut store = FlowStore::new();
    let id = create(&mut store, "Offline", 30);
    store.start_task(&id, morning(), None);

    assert_eq!(store.persist(&kv), 0);
    assert_eq!(store.task_state(&id), Some(TaskState::Active));
    assert!(kv.is_empty());
}

#[test]
fn test_config_defaults_flow_into_new_tasks() {
    let mut cfg = Config::default();
    cfg.set("tasks.default_context_switch_cost", "12").unwrap();
    cfg.set("tasks.default_flow_intensity", "0.9").unwrap();

    let mut store = FlowStore::with_settings(cfg.store_settings());
    let id = store
        .create_task(cfg.new_task("Configured", 30), morning())
        .unwrap()
        .task_id()
        .unwrap()
        .to_string();
    store.start_task(&id, morning(), None);

    assert_eq!(store.task(&id).unwrap().context_switch_cost, 12.0);
    assert_eq!(store.blocks()[0].flow_intensity, 0.9);
}
