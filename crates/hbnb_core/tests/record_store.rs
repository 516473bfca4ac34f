use chrono::{NaiveDate, TimeDelta};
use hbnb_core::{ManualClock, Record, RecordKind, RecordStore, StoreError};
use serde_json::{json, Value};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn clock() -> ManualClock {
    let start = NaiveDate::from_ymd_opt(2024, 3, 1)
        .and_then(|date| date.and_hms_micro_opt(9, 30, 0, 250))
        .unwrap();
    ManualClock::stepping(start, TimeDelta::microseconds(1500))
}

fn store_at(path: &Path) -> RecordStore {
    RecordStore::with_clock(path, Box::new(clock()))
}

fn store_file(dir: &TempDir) -> PathBuf {
    dir.path().join("file.json")
}

fn read_document(path: &Path) -> serde_json::Map<String, Value> {
    let text = std::fs::read_to_string(path).unwrap();
    match serde_json::from_str(&text).unwrap() {
        Value::Object(entries) => entries,
        other => panic!("expected object document, got {other}"),
    }
}

#[test]
fn insert_then_all_contains_key() {
    let dir = TempDir::new().unwrap();
    let mut store = store_at(&store_file(&dir));

    let record = Record::new(RecordKind::Amenity, store.now());
    let expected = format!("Amenity.{}", record.id());
    let key = store.insert(record);

    assert_eq!(key, expected);
    assert!(store.all().contains_key(&key));
}

#[test]
fn insert_overwrites_same_key() {
    let dir = TempDir::new().unwrap();
    let mut store = store_at(&store_file(&dir));

    let mut record = Record::new(RecordKind::State, store.now());
    let key = store.insert(record.clone());
    record.set_field("name", "Nevada").unwrap();
    store.insert(record);

    assert_eq!(store.len(), 1);
    assert_eq!(store.get(&key).unwrap().field("name"), Some("Nevada"));
}

#[test]
fn all_is_a_live_view() {
    let dir = TempDir::new().unwrap();
    let mut store = store_at(&store_file(&dir));

    let key = store.create(RecordKind::City);
    assert_eq!(store.all().len(), 1);

    store.get_mut(&key).unwrap().set_field("name", "Reno").unwrap();
    assert_eq!(store.all()[&key].field("name"), Some("Reno"));
}

#[test]
fn create_user_persists_one_entry_under_composite_key() {
    let dir = TempDir::new().unwrap();
    let path = store_file(&dir);
    let mut store = store_at(&path);

    let key = store.create(RecordKind::User);
    store.touch_and_save(&key).unwrap();

    let document = read_document(&path);
    assert_eq!(document.len(), 1);
    let id = store.get(&key).unwrap().id().to_string();
    let entry = &document[&format!("User.{id}")];
    assert_eq!(entry["__class__"], "User");
    assert_eq!(entry["id"], json!(id));
}

#[test]
fn save_then_reload_round_trips_every_record() {
    let dir = TempDir::new().unwrap();
    let path = store_file(&dir);
    let mut store = store_at(&path);

    let user = store.create(RecordKind::User);
    store
        .get_mut(&user)
        .unwrap()
        .set_field("email", "a@b.c")
        .unwrap();
    let place = store.create(RecordKind::Place);
    store
        .get_mut(&place)
        .unwrap()
        .set_field("description", "quiet, sunny")
        .unwrap();
    store.create(RecordKind::BaseModel);
    assert_eq!(store.save().unwrap(), 3);

    let reloaded = RecordStore::open_with_clock(&path, Box::new(clock())).unwrap();
    assert!(reloaded.is_loaded());
    assert_eq!(reloaded.all(), store.all());
}

#[test]
fn repeated_save_refreshes_updated_at_only() {
    let dir = TempDir::new().unwrap();
    let path = store_file(&dir);
    let mut store = store_at(&path);

    let key = store.create(RecordKind::Review);
    store.get_mut(&key).unwrap().set_field("text", "ok").unwrap();
    let before = store.get(&key).unwrap().clone();

    store.touch_and_save(&key).unwrap();
    let first = store.get(&key).unwrap().clone();
    store.touch_and_save(&key).unwrap();
    let second = store.get(&key).unwrap().clone();

    assert!(first.updated_at() > before.updated_at());
    assert!(second.updated_at() > first.updated_at());
    assert_eq!(second.created_at(), before.created_at());
    assert_eq!(second.id(), before.id());
    assert_eq!(second.field("text"), Some("ok"));
    assert_eq!(read_document(&path).len(), 1);
}

#[test]
fn delete_is_durable_only_after_save() {
    let dir = TempDir::new().unwrap();
    let path = store_file(&dir);
    let mut store = store_at(&path);

    let kept = store.create(RecordKind::User);
    let dropped = store.create(RecordKind::User);
    store.save().unwrap();

    assert!(store.delete(&dropped).is_some());
    assert!(store.delete(&dropped).is_none());

    let before_save = RecordStore::open(&path).unwrap();
    assert!(before_save.all().contains_key(&dropped));

    store.save().unwrap();
    let fresh = RecordStore::open(&path).unwrap();
    assert!(!fresh.all().contains_key(&dropped));
    assert!(fresh.all().contains_key(&kept));
}

#[test]
fn reload_without_file_yields_empty_store() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("missing.json");

    let store = RecordStore::open(&path).unwrap();
    assert!(store.is_loaded());
    assert!(store.is_empty());
    assert!(!path.exists());
}

#[test]
fn reload_skips_unknown_and_missing_discriminators() {
    let dir = TempDir::new().unwrap();
    let path = store_file(&dir);
    let document = json!({
        "MyModel.1": {
            "id": "1",
            "created_at": "2017-09-28T21:03:54.052298",
            "updated_at": "2017-09-28T21:03:54.052298",
            "__class__": "MyModel"
        },
        "Ghost.2": { "id": "2" },
        "City.3": {
            "id": "3",
            "created_at": "2017-09-28T21:03:54.052298",
            "updated_at": "2017-09-28T21:03:54.052298",
            "name": "San Francisco",
            "__class__": "City"
        }
    });
    std::fs::write(&path, document.to_string()).unwrap();

    let store = RecordStore::open(&path).unwrap();
    assert_eq!(store.len(), 1);
    assert_eq!(store.get("City.3").unwrap().field("name"), Some("San Francisco"));
}

#[test]
fn reload_rederives_keys_from_records() {
    let dir = TempDir::new().unwrap();
    let path = store_file(&dir);
    let document = json!({
        "stale-key": {
            "id": "abc",
            "created_at": "2017-09-28T21:03:54.052298",
            "updated_at": "2017-09-28T21:03:54.052298",
            "__class__": "State"
        }
    });
    std::fs::write(&path, document.to_string()).unwrap();

    let store = RecordStore::open(&path).unwrap();
    assert!(store.get("State.abc").is_some());
    assert!(store.get("stale-key").is_none());
}

#[test]
fn reload_fails_hard_on_malformed_timestamp() {
    let dir = TempDir::new().unwrap();
    let path = store_file(&dir);
    let document = json!({
        "User.1": {
            "id": "1",
            "created_at": "yesterday",
            "updated_at": "2017-09-28T21:03:54.052298",
            "__class__": "User"
        }
    });
    std::fs::write(&path, document.to_string()).unwrap();

    let err = match RecordStore::open(&path) {
        Ok(_) => panic!("malformed timestamp must fail reload"),
        Err(err) => err,
    };
    match err {
        StoreError::Model { key, .. } => assert_eq!(key, "User.1"),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn reload_rejects_non_object_documents() {
    let dir = TempDir::new().unwrap();
    let path = store_file(&dir);

    std::fs::write(&path, "[1, 2, 3]").unwrap();
    assert!(matches!(
        RecordStore::open(&path),
        Err(StoreError::InvalidData(_))
    ));

    std::fs::write(&path, r#"{"User.1": "not an object"}"#).unwrap();
    assert!(matches!(
        RecordStore::open(&path),
        Err(StoreError::InvalidData(_))
    ));

    std::fs::write(&path, "{ truncated").unwrap();
    assert!(matches!(RecordStore::open(&path), Err(StoreError::Json(_))));
}

#[test]
fn reload_replaces_in_memory_table_and_keeps_it_on_error() {
    let dir = TempDir::new().unwrap();
    let path = store_file(&dir);
    let mut store = store_at(&path);

    let saved = store.create(RecordKind::Amenity);
    store.save().unwrap();
    let unsaved = store.create(RecordKind::Amenity);

    assert_eq!(store.reload().unwrap(), 1);
    assert!(store.get(&saved).is_some());
    assert!(store.get(&unsaved).is_none());

    std::fs::write(&path, "not json").unwrap();
    assert!(store.reload().is_err());
    assert!(store.get(&saved).is_some());
}
