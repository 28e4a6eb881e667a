//! Descriptor retrieval and iteration tests.

use descripta_store::config::layout;
use descripta_store::{DescriptorStore, StoreError, Value};

use super::common::{collision_store_base, scenario_store};

#[test]
fn test_scenario_descriptors() {
    let fixture = scenario_store();
    let store = DescriptorStore::open(fixture.root()).expect("open store");

    println!("=== GET DESCRIPTORS TEST ===");
    let data = store.get_descriptors(0, false).unwrap();
    let full = store.get_descriptors(0, true).unwrap();
    println!("VERIFY: data={:?} full={:?}", data, full);

    assert_eq!(data, vec![Value::Float(12.3), Value::Float(1.1)]);
    assert_eq!(
        full,
        vec![Value::Float(12.3), Value::Float(1.1), Value::Bool(true)]
    );
    println!("RESULT: PASSED");
}

#[test]
fn test_column_names_match_values_for_every_row() {
    let fixture = collision_store_base();
    let store = DescriptorStore::open(fixture.root()).expect("open store");

    assert_eq!(store.column_names(false), &["MW"]);
    assert_eq!(store.column_names(true), &["MW", "MW_calculated"]);
    for ordinal in 0..store.len() {
        for keep_flags in [false, true] {
            assert_eq!(
                store.get_descriptors(ordinal, keep_flags).unwrap().len(),
                store.column_names(keep_flags).len()
            );
        }
    }
}

#[test]
fn test_descriptors_as_map() {
    let fixture = scenario_store();
    let store = DescriptorStore::open(fixture.root()).expect("open store");

    let map = store.get_descriptors_as_map(0).unwrap();
    assert_eq!(map.len(), 3);
    assert_eq!(map["MW"], Value::Float(12.3));
    assert_eq!(map["MW_calculated"], Value::Bool(true));
}

#[test]
fn test_out_of_range_ordinal() {
    let fixture = scenario_store();
    let store = DescriptorStore::open(fixture.root()).expect("open store");

    assert!(matches!(
        store.get_descriptors(2, false),
        Err(StoreError::OutOfRange { ordinal: 2, len: 2 })
    ));
    assert!(matches!(
        store.get_descriptors_as_map(99),
        Err(StoreError::OutOfRange { .. })
    ));
}

#[test]
fn test_iteration_visits_every_record_in_order() {
    let fixture = scenario_store();
    let store = DescriptorStore::open(fixture.root()).expect("open store");

    println!("=== ITERATION TEST ===");
    let mut iter = store.iter();

    let (record, descriptors) = iter.next().expect("first").expect("ok");
    assert_eq!(record.moldata, "C");
    assert_eq!(record.name.as_deref(), Some("A"));
    assert_eq!(descriptors, vec![Value::Float(12.3), Value::Float(1.1)]);

    let (record, descriptors) = iter.next().expect("second").expect("ok");
    assert_eq!(record.moldata, "CCO");
    assert_eq!(record.name.as_deref(), Some("B"));
    assert_eq!(descriptors, vec![Value::Float(46.07), Value::Float(-0.31)]);

    assert!(iter.next().is_none());
    println!("RESULT: PASSED");
}

#[test]
fn test_iteration_restarts() {
    let fixture = collision_store_base();
    let store = DescriptorStore::open(fixture.root()).expect("open store");

    let first: Vec<_> = (&store).into_iter().map(|item| item.unwrap().0).collect();
    let second: Vec<_> = store.iter().map(|item| item.unwrap().0).collect();
    assert_eq!(first.len(), 10);
    assert_eq!(first, second);

    let rows = store.descriptor_rows().count();
    assert_eq!(rows, 10);
}

#[test]
fn test_iteration_reports_corrupt_row() {
    let fixture = scenario_store();
    // second row's flag byte: row width is 8 + 8 + 1
    let data_path = fixture.path(layout::RAW_DATA);
    let mut bytes = std::fs::read(&data_path).expect("read data");
    bytes[17 + 16] = 7;
    std::fs::write(&data_path, bytes).expect("write data");

    let store = DescriptorStore::open(fixture.root()).expect("open store");

    let items: Vec<_> = store.iter().collect();
    assert_eq!(items.len(), 2);
    assert!(items[0].is_ok());
    match &items[1] {
        Err(StoreError::IterationFailed { ordinal, .. }) => assert_eq!(*ordinal, 1),
        other => panic!("Expected IterationFailed, got {:?}", other),
    }
    // data-only reads still decode the full row
    assert!(matches!(
        store.get_descriptors(1, false),
        Err(StoreError::DataCorruption { .. })
    ));
}
