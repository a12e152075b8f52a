use phonebook_core::db::open_db_in_memory;
use phonebook_core::{
    PhonebookService, Record, RecordStore, SqliteRecordStore, UniquenessPolicy, WriteAuthorizer,
};

#[test]
fn empty_store_admits_every_policy() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteRecordStore::try_new(&conn).unwrap();
    let authorizer = WriteAuthorizer::new(&store);

    for record in [
        Record::new("Tim Cook", "6474478145", "1665 Test Court"),
        Record::new("Matthew Chase", "6472253364", "502 Testing Road"),
    ] {
        for policy in UniquenessPolicy::ALL {
            assert!(authorizer.can_insert(&record, policy).unwrap());
        }
    }
}

#[test]
fn unique_phone_rejects_existing_phone() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteRecordStore::try_new(&conn).unwrap();
    store
        .insert(&Record::new("Tim Cook", "6474478145", "1665 Test Court"))
        .unwrap();
    let authorizer = WriteAuthorizer::new(&store);

    let same_phone = Record::new("Someone Else", "6474478145", "1 Other Way");
    assert!(!authorizer
        .can_insert(&same_phone, UniquenessPolicy::UniquePhone)
        .unwrap());
    assert!(authorizer
        .can_insert(&same_phone, UniquenessPolicy::NoRestriction)
        .unwrap());
    assert!(authorizer
        .can_insert(&same_phone, UniquenessPolicy::UniqueName)
        .unwrap());
}

#[test]
fn no_restriction_admits_full_duplicates_through_the_same_path() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteRecordStore::try_new(&conn).unwrap();
    let record = Record::new("Tim Cook", "6474478145", "1665 Test Court");
    store.insert(&record).unwrap();
    let authorizer = WriteAuthorizer::new(&store);

    assert!(authorizer
        .can_insert(&record, UniquenessPolicy::NoRestriction)
        .unwrap());
    assert!(!authorizer
        .can_insert(&record, UniquenessPolicy::UniqueAll)
        .unwrap());
}

#[test]
fn single_field_policies_use_exact_match() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteRecordStore::try_new(&conn).unwrap();
    store
        .insert(&Record::new("Tim Cook", "6474478145", "1665 Test Court"))
        .unwrap();
    let authorizer = WriteAuthorizer::new(&store);

    let prefix_name = Record::new("Tim", "1111111111", "Elsewhere");
    assert!(authorizer
        .can_insert(&prefix_name, UniquenessPolicy::UniqueName)
        .unwrap());

    let same_name = Record::new("Tim Cook", "1111111111", "Elsewhere");
    assert!(!authorizer
        .can_insert(&same_name, UniquenessPolicy::UniqueName)
        .unwrap());

    let same_address = Record::new("Other", "1111111111", "1665 Test Court");
    assert!(!authorizer
        .can_insert(&same_address, UniquenessPolicy::UniqueAddress)
        .unwrap());
}

#[test]
fn unique_all_rejects_only_full_duplicates() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteRecordStore::try_new(&conn).unwrap();
    let existing = Record::new("Tim Cook", "6474478145", "1665 Test Court");
    store.insert(&existing).unwrap();
    let authorizer = WriteAuthorizer::new(&store);

    assert!(!authorizer
        .can_insert(&existing, UniquenessPolicy::UniqueAll)
        .unwrap());

    let two_of_three = Record::new("Tim Cook", "6474478145", "9 New Address");
    assert!(authorizer
        .can_insert(&two_of_three, UniquenessPolicy::UniqueAll)
        .unwrap());
}

#[test]
fn empty_values_collide_but_absent_values_do_not() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteRecordStore::try_new(&conn).unwrap();
    store
        .insert(&Record::query().with_name("No Phone").with_phone(""))
        .unwrap();
    store.insert(&Record::query().with_name("Null Phone")).unwrap();
    let authorizer = WriteAuthorizer::new(&store);

    let empty_phone = Record::query().with_name("Another").with_phone("");
    assert!(!authorizer
        .can_insert(&empty_phone, UniquenessPolicy::UniquePhone)
        .unwrap());

    let absent_phone = Record::query().with_name("Another");
    assert!(authorizer
        .can_insert(&absent_phone, UniquenessPolicy::UniquePhone)
        .unwrap());
}

#[test]
fn service_add_record_enforces_policy() {
    let conn = open_db_in_memory().unwrap();
    let service = PhonebookService::new(SqliteRecordStore::new(&conn)).unwrap();
    let record = Record::new("John Kal", "6445221234", "1554 Long St");

    assert!(service
        .add_record(&record, UniquenessPolicy::UniquePhone)
        .unwrap());
    assert!(!service
        .add_record(&record, UniquenessPolicy::UniquePhone)
        .unwrap());
    assert!(service
        .add_record(&record, UniquenessPolicy::NoRestriction)
        .unwrap());

    assert_eq!(service.list().unwrap().len(), 2);
}

#[test]
fn concurrent_connections_cannot_both_pass_the_check() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("phonebook.db");
    let record = Record::new("John Kal", "6445221234", "1554 Long St");
    {
        let conn = phonebook_core::db::open_db(&path).unwrap();
        SqliteRecordStore::try_new(&conn).unwrap();
    }

    let handles = (0..4)
        .map(|_| {
            let path = path.clone();
            let record = record.clone();
            std::thread::spawn(move || {
                let conn = phonebook_core::db::open_db(&path).unwrap();
                let service = PhonebookService::new(SqliteRecordStore::new(&conn)).unwrap();
                service
                    .add_record(&record, UniquenessPolicy::UniquePhone)
                    .unwrap()
            })
        })
        .collect::<Vec<_>>();

    let admitted = handles
        .into_iter()
        .map(|handle| handle.join().unwrap())
        .filter(|admitted| *admitted)
        .count();
    assert_eq!(admitted, 1);

    let conn = phonebook_core::db::open_db(&path).unwrap();
    let store = SqliteRecordStore::new(&conn);
    assert_eq!(store.count().unwrap(), 1);
}
