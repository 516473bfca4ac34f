use chrono::{NaiveDate, NaiveDateTime};
use hbnb_core::{
    format_timestamp, ModelError, Record, RecordBody, RecordKind, CLASS_KEY,
};
use serde_json::json;
use std::collections::HashSet;

fn at(hour: u32, micros: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2017, 9, 28)
        .and_then(|date| date.and_hms_micro_opt(hour, 3, 54, micros))
        .unwrap()
}

#[test]
fn fresh_records_have_unique_ids_and_equal_timestamps() {
    let mut ids = HashSet::new();
    for kind in RecordKind::all() {
        for _ in 0..50 {
            let record = Record::new(kind, at(21, 52_298));
            assert_eq!(record.created_at(), record.updated_at());
            assert!(!record.id().is_empty());
            assert!(ids.insert(record.id().to_string()), "duplicate id generated");
        }
    }
}

#[test]
fn field_mapping_contains_timestamps_fields_and_class() {
    let mut record = Record::new(RecordKind::User, at(21, 52_298));
    record.set_field("first_name", "Betty").unwrap();

    let mapping = record.to_field_mapping();
    assert_eq!(mapping["id"], json!(record.id()));
    assert_eq!(mapping["created_at"], json!("2017-09-28T21:03:54.052298"));
    assert_eq!(mapping["updated_at"], json!("2017-09-28T21:03:54.052298"));
    assert_eq!(mapping["first_name"], json!("Betty"));
    assert_eq!(mapping[CLASS_KEY], json!("User"));
    assert!(!mapping.contains_key("email"), "unset fields must be omitted");
}

#[test]
fn field_mapping_round_trip_preserves_identity_fields_and_timestamps() {
    let mut record = Record::new(RecordKind::Place, at(9, 1));
    record.set_field("name", "Tiny house").unwrap();
    record.set_field("max_guest", "3").unwrap();
    record.touch(at(10, 999_999));

    let rebuilt =
        Record::from_field_mapping(RecordKind::Place, &record.to_field_mapping(), at(23, 0))
            .unwrap();

    assert_eq!(rebuilt, record);
    assert_eq!(rebuilt.id(), record.id());
    assert_eq!(rebuilt.field("name"), Some("Tiny house"));
    assert_eq!(rebuilt.created_at(), at(9, 1));
    assert_eq!(rebuilt.updated_at(), at(10, 999_999));
}

#[test]
fn rebuild_fails_on_malformed_timestamp() {
    let mapping = json!({
        "id": "b6a6e15c-c67d-4312-9a75-9d084935e579",
        "created_at": "2017-09-28 21:03:54",
        "updated_at": "2017-09-28T21:03:54.052302",
        "__class__": "BaseModel"
    });

    let err = Record::from_field_mapping(
        RecordKind::BaseModel,
        mapping.as_object().unwrap(),
        at(0, 0),
    )
    .unwrap_err();

    assert_eq!(
        err,
        ModelError::InvalidTimestamp {
            field: "created_at".to_string(),
            value: "2017-09-28 21:03:54".to_string(),
        }
    );
}

#[test]
fn rebuild_skips_unknown_keys_and_renders_scalars() {
    let mapping = json!({
        "id": "r-1",
        "created_at": "2017-09-28T21:03:54.052298",
        "updated_at": "2017-09-28T21:05:54.119427",
        "text": "Great stay",
        "place_id": 42,
        "rating": 5,
        "__class__": "Review"
    });

    let record =
        Record::from_field_mapping(RecordKind::Review, mapping.as_object().unwrap(), at(0, 0))
            .unwrap();

    assert_eq!(record.key(), "Review.r-1");
    assert_eq!(record.field("text"), Some("Great stay"));
    assert_eq!(record.field("place_id"), Some("42"));
    assert_eq!(record.field("user_id"), Some(""));
    assert_eq!(record.field("rating"), None);
    assert!(!record.to_field_mapping().contains_key("rating"));
}

#[test]
fn rebuild_without_identity_uses_fresh_defaults() {
    let mapping = json!({ "name": "California", "__class__": "State" });
    let record =
        Record::from_field_mapping(RecordKind::State, mapping.as_object().unwrap(), at(7, 0))
            .unwrap();

    assert!(!record.id().is_empty());
    assert_eq!(record.created_at(), at(7, 0));
    assert_eq!(record.updated_at(), at(7, 0));
    assert_eq!(record.field("name"), Some("California"));
}

#[test]
fn set_field_is_validated_against_kind_fields() {
    let mut city = Record::new(RecordKind::City, at(1, 0));
    city.set_field("state_id", "CA").unwrap();
    assert!(matches!(city.body(), RecordBody::City(body) if body.state_id.as_deref() == Some("CA")));

    let err = city.set_field("email", "x@y.z").unwrap_err();
    assert_eq!(
        err,
        ModelError::UnknownField {
            kind: RecordKind::City,
            field: "email".to_string(),
        }
    );

    let mut base = Record::new(RecordKind::BaseModel, at(1, 0));
    assert!(base.set_field("name", "anything").is_err());
}

#[test]
fn check_writable_matches_set_field() {
    assert!(Record::check_writable(RecordKind::User, "email").is_ok());
    assert!(matches!(
        Record::check_writable(RecordKind::User, "updated_at"),
        Err(ModelError::ReadOnlyField(_))
    ));
    assert!(matches!(
        Record::check_writable(RecordKind::Amenity, "city_id"),
        Err(ModelError::UnknownField { .. })
    ));
}

#[test]
fn representation_shows_kind_id_and_attributes() {
    let mut record = Record::new(RecordKind::User, at(21, 52_298));
    record.set_field("email", "airbnb@mail.com").unwrap();

    let rendered = record.to_string();
    let prefix = format!("[User] ({}) ", record.id());
    assert!(rendered.starts_with(&prefix), "unexpected repr: {rendered}");

    let attributes: serde_json::Value = serde_json::from_str(&rendered[prefix.len()..]).unwrap();
    assert_eq!(attributes["email"], "airbnb@mail.com");
    assert_eq!(
        attributes["created_at"],
        format_timestamp(&record.created_at())
    );
    assert!(attributes.get("__class__").is_none());
    assert!(attributes.get("password").is_none());
}
