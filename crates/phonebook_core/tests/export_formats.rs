use phonebook_core::db::open_db_in_memory;
use phonebook_core::export::record_key;
use phonebook_core::{
    export_records, ExportError, ExportRow, PhonebookService, Record, RecordStore, SerialFormat,
    ServiceError, SqliteRecordStore,
};
use std::collections::BTreeMap;

fn seeded(conn: &rusqlite::Connection) -> SqliteRecordStore<'_> {
    let store = SqliteRecordStore::try_new(conn).unwrap();
    store
        .insert(&Record::new("John Kal", "6445221234", "1554 Long St"))
        .unwrap();
    store
        .insert(&Record::new("Tim Cook", "6474478145", "1665 Test Court"))
        .unwrap();
    store
}

#[test]
fn json_export_round_trips_one_entry_per_record() {
    let conn = open_db_in_memory().unwrap();
    let store = seeded(&conn);
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("records.json");

    let count = export_records(&store, SerialFormat::Json, &path).unwrap();
    assert_eq!(count, 2);

    let content = std::fs::read_to_string(&path).unwrap();
    let parsed: BTreeMap<String, ExportRow> = serde_json::from_str(&content).unwrap();
    assert_eq!(parsed.len(), 2);

    let john = &parsed[&record_key(&Record::new("John Kal", "6445221234", "1554 Long St"))];
    assert_eq!(john.phone.as_deref(), Some("(644) 522-1234"));
    assert!(parsed
        .values()
        .any(|row| row.phone.as_deref() == Some("(647) 447-8145")));
}

#[test]
fn absent_and_empty_names_export_as_separate_entries() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteRecordStore::try_new(&conn).unwrap();
    let absent = Record::query()
        .with_phone("6445221234")
        .with_address("1554 Long St");
    let empty = absent.clone().with_name("");
    store.insert(&absent).unwrap();
    store.insert(&empty).unwrap();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("records.json");

    let count = export_records(&store, SerialFormat::Json, &path).unwrap();
    assert_eq!(count, 2);

    let parsed: BTreeMap<String, ExportRow> =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(parsed.len(), 2);
    assert_eq!(parsed[&record_key(&absent)].name, None);
    assert_eq!(parsed[&record_key(&empty)].name.as_deref(), Some(""));
}

#[test]
fn identical_records_report_the_entries_actually_written() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteRecordStore::try_new(&conn).unwrap();
    let record = Record::new("John Kal", "6445221234", "1554 Long St");
    store.insert(&record).unwrap();
    store.insert(&record).unwrap();
    let dir = tempfile::tempdir().unwrap();

    let json = dir.path().join("records.json");
    assert_eq!(export_records(&store, SerialFormat::Json, &json).unwrap(), 1);

    let csv = dir.path().join("records.csv");
    assert_eq!(export_records(&store, SerialFormat::Csv, &csv).unwrap(), 2);
}

#[test]
fn yaml_export_matches_json_content() {
    let conn = open_db_in_memory().unwrap();
    let store = seeded(&conn);
    let dir = tempfile::tempdir().unwrap();
    let json_path = dir.path().join("records.json");
    let yaml_path = dir.path().join("records.yaml");

    export_records(&store, SerialFormat::Json, &json_path).unwrap();
    export_records(&store, SerialFormat::Yaml, &yaml_path).unwrap();

    let from_json: BTreeMap<String, ExportRow> =
        serde_json::from_str(&std::fs::read_to_string(&json_path).unwrap()).unwrap();
    let from_yaml: BTreeMap<String, ExportRow> =
        serde_yaml::from_str(&std::fs::read_to_string(&yaml_path).unwrap()).unwrap();
    assert_eq!(from_json, from_yaml);
}

#[test]
fn csv_export_writes_header_and_rows() {
    let conn = open_db_in_memory().unwrap();
    let store = seeded(&conn);
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("records.csv");

    export_records(&store, SerialFormat::Csv, &path).unwrap();

    let content = std::fs::read_to_string(&path).unwrap();
    let lines = content.lines().collect::<Vec<_>>();
    assert_eq!(
        lines,
        vec![
            "Name,Phone,Address",
            "John Kal,(644) 522-1234,1554 Long St",
            "Tim Cook,(647) 447-8145,1665 Test Court",
        ]
    );
}

#[test]
fn html_export_does_not_escape_field_text() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteRecordStore::try_new(&conn).unwrap();
    store
        .insert(&Record::new("<b>Bold</b>", "6445221234", "1554 Long St"))
        .unwrap();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("records.html");

    export_records(&store, SerialFormat::Html, &path).unwrap();

    let content = std::fs::read_to_string(&path).unwrap();
    assert!(content.contains("<h5>Name: <b>Bold</b></h5>"));
    assert!(content.contains("<h5>Phone: (644) 522-1234</h5>"));
}

#[test]
fn export_overwrites_existing_destination() {
    let conn = open_db_in_memory().unwrap();
    let store = seeded(&conn);
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("records.csv");
    std::fs::write(&path, "stale content that is longer than nothing").unwrap();

    export_records(&store, SerialFormat::Csv, &path).unwrap();

    let content = std::fs::read_to_string(&path).unwrap();
    assert!(content.starts_with("Name,Phone,Address\n"));
    assert!(!content.contains("stale"));
}

#[test]
fn invalid_phone_aborts_export_without_touching_destination() {
    let conn = open_db_in_memory().unwrap();
    let store = seeded(&conn);
    store
        .insert(&Record::new("Short Phone", "123", "Nowhere"))
        .unwrap();
    let dir = tempfile::tempdir().unwrap();

    for format in SerialFormat::ALL {
        let path = dir.path().join(format!("records.{}", format.extension()));
        std::fs::write(&path, "previous export").unwrap();

        let err = export_records(&store, format, &path).unwrap_err();
        assert!(matches!(err, ExportError::InvalidPhoneFormat(ref phone) if phone.value == "123"));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "previous export");
    }
}

#[test]
fn records_without_phone_export_empty_phone() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteRecordStore::try_new(&conn).unwrap();
    store
        .insert(&Record::query().with_name("No Phone").with_address("1 Quiet Lane"))
        .unwrap();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("records.csv");

    export_records(&store, SerialFormat::Csv, &path).unwrap();

    let content = std::fs::read_to_string(&path).unwrap();
    assert!(content.contains("No Phone,,1 Quiet Lane"));
}

#[test]
fn missing_destination_directory_is_io_error() {
    let conn = open_db_in_memory().unwrap();
    let store = seeded(&conn);
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("missing").join("records.json");

    let err = export_records(&store, SerialFormat::Json, &path).unwrap_err();
    assert!(matches!(err, ExportError::Io { .. }));
}

#[test]
fn service_export_uses_requested_format() {
    let conn = open_db_in_memory().unwrap();
    let service = PhonebookService::new(seeded(&conn)).unwrap();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("out.yaml");

    assert_eq!(service.export(SerialFormat::Yaml, &path).unwrap(), 2);
    let parsed: BTreeMap<String, ExportRow> =
        serde_yaml::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(parsed.len(), 2);

    service
        .store()
        .insert(&Record::new("Bad", "12", "x"))
        .unwrap();
    let err = service.export(SerialFormat::Json, &path).unwrap_err();
    assert!(matches!(
        err,
        ServiceError::Export(ExportError::InvalidPhoneFormat(_))
    ));
}
