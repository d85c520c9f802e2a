use std::collections::BTreeMap;

use persistent_survey::{
    load, to_csv, Error, FileStorage, Gender, Likert, MemoryStorage, ResponseRecord,
    ResponseStore, CSV_HEADER,
};

fn all_agree() -> BTreeMap<u8, Likert> {
    (1..=10).map(|index| (index, Likert::Agree)).collect()
}

#[test]
fn submit_single_response() {
    let smeq = BTreeMap::from([(1, 0), (2, 1), (3, 2), (4, 1), (5, 0)]);
    let record = ResponseRecord::from_answers(Gender::Male, &smeq, &all_agree()).unwrap();
    assert_eq!(record.smeq_score(), 4);
    assert_eq!(record.self_esteem_score(), 25);

    let mut store = ResponseStore::open(MemoryStorage::new());
    store.append(record.clone()).unwrap();

    let aggregate = store.aggregate();
    assert_eq!(aggregate.count, 1);
    assert_eq!(aggregate.mean_smeq, Some(4.0));
    assert_eq!(aggregate.mean_self_esteem, Some(25.0));
    assert!(aggregate.to_string().contains("4.00 / 35"));
    assert!(aggregate.to_string().contains("25.00 / 40"));

    let loaded = load(&store.close());
    assert_eq!(loaded.records.last(), Some(&record));
}

#[test]
fn empty_store() {
    let storage = MemoryStorage::new();
    let loaded = load(&storage);
    assert!(loaded.records.is_empty());
    assert!(loaded.notice.is_none());

    let store = ResponseStore::open(storage);
    let aggregate = store.aggregate();
    assert_eq!(aggregate.count, 0);
    assert!(aggregate.mean_smeq.is_none());
    assert!(aggregate.mean_self_esteem.is_none());

    let csv = String::from_utf8(to_csv(store.records()).unwrap()).unwrap();
    assert_eq!(csv.lines().collect::<Vec<_>>(), vec![CSV_HEADER.join(",")]);
}

#[test]
fn delete_middle_of_three() {
    let dir = tempfile::tempdir().unwrap();
    let records = [
        ResponseRecord::new(Gender::Male, [1; 5], [Likert::Agree; 10]),
        ResponseRecord::new(Gender::Female, [2; 5], [Likert::Disagree; 10]),
        ResponseRecord::new(Gender::Other, [3; 5], [Likert::StronglyAgree; 10]),
    ];

    let mut store = ResponseStore::open(FileStorage::new(dir.path()));
    for record in &records {
        store.append(record.clone()).unwrap();
    }
    let removed = store.delete_at(1).unwrap();
    assert_eq!(removed, records[1]);

    // Row 1 is now the former third row; index 2 no longer exists.
    assert_eq!(store.get(1), Some(&records[2]));
    assert!(matches!(
        store.delete_at(2),
        Err(Error::IndexOutOfRange { index: 2, len: 2 })
    ));
    store.close();

    let loaded = load(&FileStorage::new(dir.path()));
    assert_eq!(loaded.records, vec![records[0].clone(), records[2].clone()]);
}

#[test]
fn corrupt_file_falls_back_to_empty() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("responses.json"), "[{\"gender\":").unwrap();

    let mut store = ResponseStore::open(FileStorage::new(dir.path()));
    assert!(store.is_empty());
    assert!(matches!(
        store.take_notice(),
        Some(Error::MalformedPersistedData(_))
    ));

    let record = ResponseRecord::new(Gender::Female, [0; 5], [Likert::Agree; 10]);
    store.append(record.clone()).unwrap();
    store.close();

    let loaded = load(&FileStorage::new(dir.path()));
    assert!(loaded.notice.is_none());
    assert_eq!(loaded.records, vec![record]);
}

#[test]
fn aggregate_is_stable() {
    let mut store = ResponseStore::open(MemoryStorage::new());
    store
        .append(ResponseRecord::new(Gender::Male, [7; 5], [Likert::StronglyAgree; 10]))
        .unwrap();
    store
        .append(ResponseRecord::new(Gender::Other, [0; 5], [Likert::Disagree; 10]))
        .unwrap();
    let first = store.aggregate();
    assert_eq!(first, store.aggregate());
    assert_eq!(first.mean_smeq, Some(17.5));
}
