//! Open, close and capability tests.

use descripta_store::config::layout;
use descripta_store::{
    AccessMode, DescriptorCalculator, DescriptorEngine, DescriptorStore, IndexState, StoreConfig,
    StoreError, StoreResult, Value,
};

use super::common::{collision_store_base, scenario_store, StoreFixture};

#[test]
fn test_open_scenario_store() {
    let fixture = scenario_store();

    println!("=== OPEN STORE TEST ===");
    let store = DescriptorStore::open(fixture.root()).expect("open store");

    assert_eq!(store.len(), 2);
    assert!(!store.is_empty());
    assert_eq!(store.path(), Some(fixture.root().as_path()));
    assert_eq!(store.mode(), AccessMode::ReadOnly);
    assert_eq!(store.descriptors().len(), 2);
    assert_eq!(store.mol_index().len(), 2);

    let caps = store.capabilities();
    println!("VERIFY: capabilities = {:?}", caps);
    assert_eq!(caps.name_index, IndexState::Missing);
    assert_eq!(caps.inchikey_index, IndexState::Missing);
    assert!(caps.options_loaded);
    assert!(!caps.name_fallback_built);
    assert!(!caps.closed);
    println!("RESULT: PASSED");
}

#[test]
fn test_open_missing_directory_fails() {
    let fixture = StoreFixture::new();

    let result = DescriptorStore::open(fixture.root());
    assert!(matches!(result, Err(StoreError::OpenFailed { .. })));
}

#[test]
fn test_open_without_table_fails() {
    let fixture = scenario_store();
    std::fs::remove_file(fixture.path(layout::RAW_FORMAT)).expect("remove header");

    match DescriptorStore::open(fixture.root()) {
        Err(StoreError::OpenFailed { path, .. }) => assert!(path.contains(layout::RAW_FORMAT)),
        other => panic!("Expected OpenFailed, got {:?}", other),
    }
}

#[test]
fn test_open_without_mol_index_fails() {
    let fixture = scenario_store();
    std::fs::remove_dir_all(fixture.path(layout::MOL_INDEX)).expect("remove mol index");

    assert!(matches!(
        DescriptorStore::open(fixture.root()),
        Err(StoreError::OpenFailed { .. })
    ));
}

#[test]
fn test_open_row_count_mismatch_fails() {
    let fixture = scenario_store();
    fixture.write_mol_index(&[("C", "A"), ("CCO", "B"), ("CCN", "C")]);

    match DescriptorStore::open(fixture.root()) {
        Err(StoreError::OpenFailed { message, .. }) => {
            assert!(message.contains("3 records"), "message: {}", message);
            assert!(message.contains("2 rows"), "message: {}", message);
        }
        other => panic!("Expected OpenFailed, got {:?}", other),
    }
}

#[test]
fn test_corrupt_options_are_ignored() {
    let fixture = scenario_store();
    std::fs::write(fixture.path(layout::OPTIONS), "{not json").expect("write options");

    let store = DescriptorStore::open(fixture.root()).expect("open store");
    assert!(store.options().is_none());
    assert!(!store.capabilities().options_loaded);
}

#[test]
fn test_custom_flag_marker_from_config_file() {
    let fixture = scenario_store();
    let config_path = fixture.tmp.path().join("store.json");
    std::fs::write(&config_path, r#"{"flag_marker": "LogP"}"#).expect("write config");

    let config = StoreConfig::from_json_file(&config_path).expect("load config");
    let store = DescriptorStore::open_with_config(fixture.root(), config).expect("open store");

    assert_eq!(store.column_names(false), &["MW", "MW_calculated"]);
    assert_eq!(
        store.get_descriptors(1, false).unwrap(),
        vec![Value::Float(46.07), Value::Bool(false)]
    );
}

#[test]
fn test_open_read_write_mode() {
    let fixture = scenario_store();

    let store = DescriptorStore::open_with_mode(fixture.root(), AccessMode::ReadWrite)
        .expect("open store");
    assert_eq!(store.mode(), AccessMode::ReadWrite);
    assert_eq!(store.get_descriptors(0, false).unwrap().len(), 2);
}

#[test]
fn test_close_is_idempotent_and_final() {
    let fixture = scenario_store();
    let mut store = DescriptorStore::open(fixture.root()).expect("open store");

    println!("=== CLOSE TEST ===");
    store.close().expect("first close");
    store.close().expect("second close");

    assert!(store.is_closed());
    assert!(store.descriptors().is_closed());
    assert!(store.mol_index().is_closed());
    assert!(matches!(
        store.get_descriptors(0, false),
        Err(StoreError::Closed { .. })
    ));
    assert!(matches!(store.lookup_name("A"), Err(StoreError::Closed { .. })));
    println!("RESULT: PASSED");
}

#[test]
fn test_reopen_after_drop() {
    let fixture = collision_store_base();
    {
        let store = DescriptorStore::open(fixture.root()).expect("open store");
        assert_eq!(store.len(), 10);
    }
    let store = DescriptorStore::open(fixture.root()).expect("reopen store");
    assert_eq!(store.len(), 10);
}

struct RecordingEngine;

struct EchoCalculator(Vec<String>);

impl DescriptorCalculator for EchoCalculator {
    fn column_names(&self) -> Vec<String> {
        self.0.clone()
    }

    fn process(&self, moldata: &str) -> StoreResult<Vec<Value>> {
        Ok(vec![Value::Int(moldata.len() as i64)])
    }
}

impl DescriptorEngine for RecordingEngine {
    fn build_calculator(&self, sets: &[String]) -> StoreResult<Box<dyn DescriptorCalculator>> {
        Ok(Box::new(EchoCalculator(sets.to_vec())))
    }
}

#[test]
fn test_descriptor_calculator_from_options() {
    let fixture = scenario_store();
    let store = DescriptorStore::open(fixture.root()).expect("open store");

    let calculator = store
        .descriptor_calculator(&RecordingEngine)
        .expect("calculator");
    assert_eq!(calculator.column_names(), vec!["RDKit2D".to_string()]);
    assert_eq!(calculator.process("CCO").unwrap(), vec![Value::Int(3)]);
}

#[test]
fn test_descriptor_calculator_without_options() {
    let fixture = collision_store_base();
    let store = DescriptorStore::open(fixture.root()).expect("open store");

    assert!(store.options().is_none());
    assert!(store.descriptor_calculator(&RecordingEngine).is_none());
}
