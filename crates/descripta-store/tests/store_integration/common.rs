//! Common test utilities for integration tests.
//!
//! Builds complete on-disk stores in temporary directories: the descriptor
//! table, the mol index over a generated `.smi` file, the options blob and,
//! when the backend is compiled in, the RocksDB secondary indices.

use std::path::PathBuf;

use descripta_store::config::layout;
use descripta_store::{ColumnSpec, DType, MolIndex, MolIndexOptions, RawStoreWriter, StoreOptions, Value};
use tempfile::TempDir;

#[cfg(feature = "rocksdb")]
use descripta_store::{codec, KeyStoreConfig, RocksKeyStore};

/// Content key shared by ordinals 3, 7 and 9 of the collision store.
pub const SHARED_KEY: &str = "BCWYEXBNOWJQJV-UHFFFAOYSA-N";

/// Route `tracing` output to the test harness. Safe to call repeatedly.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// A store under construction in a temporary directory.
pub struct StoreFixture {
    pub tmp: TempDir,
}

impl StoreFixture {
    pub fn new() -> Self {
        init_tracing();
        Self {
            tmp: TempDir::new().expect("create temp dir"),
        }
    }

    /// Store root directory.
    pub fn root(&self) -> PathBuf {
        self.tmp.path().join("store")
    }

    /// Write the descriptor table.
    pub fn write_table(&self, columns: Vec<ColumnSpec>, rows: &[Vec<Value>]) {
        let mut writer = RawStoreWriter::create(self.root(), columns).expect("create table");
        for row in rows {
            writer.append_row(row).expect("append row");
        }
        writer.finish().expect("finish table");
    }

    /// Write a whitespace-delimited `.smi` source and index it.
    pub fn write_mol_index(&self, records: &[(&str, &str)]) -> usize {
        let source = self.tmp.path().join("input.smi");
        let text: String = records
            .iter()
            .map(|(smiles, name)| format!("{} {}\n", smiles, name))
            .collect();
        std::fs::write(&source, text).expect("write source");
        MolIndex::build(
            self.root().join(layout::MOL_INDEX),
            &source,
            MolIndexOptions::default(),
        )
        .expect("build mol index")
    }

    pub fn write_options(&self, options: &StoreOptions) {
        options.save(&self.root()).expect("save options");
    }

    /// Write a RocksDB key index at `sub_path`, then release it.
    #[cfg(feature = "rocksdb")]
    pub fn write_key_index(&self, sub_path: &str, entries: &[(String, String)]) {
        let store = RocksKeyStore::create(self.root().join(sub_path), &KeyStoreConfig::default())
            .expect("create key index");
        for (key, value) in entries {
            store.put(key.as_bytes(), value.as_bytes()).expect("put");
        }
        store.flush().expect("flush");
    }

    /// Plant an unopenable database at `sub_path`.
    pub fn write_broken_index(&self, sub_path: &str) {
        let dir = self.root().join(sub_path);
        std::fs::create_dir_all(&dir).expect("create index dir");
        std::fs::write(dir.join("CURRENT"), "MANIFEST-999999\n").expect("write CURRENT");
    }

    pub fn path(&self, sub_path: &str) -> PathBuf {
        self.root().join(sub_path)
    }
}

fn scenario_columns() -> Vec<ColumnSpec> {
    vec![
        ColumnSpec::new("MW", DType::F64),
        ColumnSpec::new("LogP", DType::F64),
        ColumnSpec::new("MW_calculated", DType::Bool),
    ]
}

/// N=2, columns `MW`, `LogP`, `MW_calculated`, names `A` and `B`, no secondary indices.
pub fn scenario_store() -> StoreFixture {
    let fixture = StoreFixture::new();
    fixture.write_table(
        scenario_columns(),
        &[
            vec![Value::Float(12.3), Value::Float(1.1), Value::Bool(true)],
            vec![Value::Float(46.07), Value::Float(-0.31), Value::Bool(false)],
        ],
    );
    fixture.write_mol_index(&[("C", "A"), ("CCO", "B")]);
    fixture.write_options(&StoreOptions::with_descriptors("RDKit2D"));
    fixture
}

/// Molecule name for ordinal `i` of the collision store.
pub fn mol_name(i: usize) -> String {
    format!("MOL-{:03}", i)
}

/// Content key for ordinal `i`: 3, 7 and 9 share [`SHARED_KEY`].
pub fn mol_key(i: usize) -> String {
    if matches!(i, 3 | 7 | 9) {
        SHARED_KEY.to_string()
    } else {
        format!("KEY{:011}-UHFFFAOYSA-N", i)
    }
}

/// N=10 store without secondary indices.
pub fn collision_store_base() -> StoreFixture {
    let fixture = StoreFixture::new();
    let rows: Vec<Vec<Value>> = (0..10)
        .map(|i| vec![Value::Float(16.0 + 14.0 * i as f64), Value::Bool(i % 2 == 0)])
        .collect();
    fixture.write_table(
        vec![
            ColumnSpec::new("MW", DType::F64),
            ColumnSpec::new("MW_calculated", DType::Bool),
        ],
        &rows,
    );
    let smiles: Vec<String> = (0..10).map(|i| "C".repeat(i + 1)).collect();
    let names: Vec<String> = (0..10).map(mol_name).collect();
    let records: Vec<(&str, &str)> = smiles
        .iter()
        .zip(&names)
        .map(|(s, n)| (s.as_str(), n.as_str()))
        .collect();
    fixture.write_mol_index(&records);
    fixture
}

/// N=10 store with both RocksDB secondary indices.
#[cfg(feature = "rocksdb")]
pub fn collision_store() -> StoreFixture {
    use std::collections::BTreeMap;

    let fixture = collision_store_base();

    let names: Vec<(String, String)> = (0..10)
        .map(|i| (mol_name(i), codec::encode_ordinal(i)))
        .collect();
    fixture.write_key_index(layout::NAME_INDEX, &names);

    let mut grouped: BTreeMap<String, Vec<usize>> = BTreeMap::new();
    for i in 0..10 {
        grouped.entry(mol_key(i)).or_default().push(i);
    }
    let keys: Vec<(String, String)> = grouped
        .into_iter()
        .map(|(key, ordinals)| (key, codec::encode_ordinal_set(&ordinals)))
        .collect();
    fixture.write_key_index(layout::INCHIKEY_INDEX, &keys);
    fixture
}
