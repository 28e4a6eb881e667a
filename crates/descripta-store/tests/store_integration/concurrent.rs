//! Concurrent access tests.
//!
//! Tests shared read access and the build-once name fallback.

use std::sync::{Arc, Barrier};
use std::thread;

use descripta_store::DescriptorStore;

use super::common::{collision_store_base, mol_name};

#[test]
fn test_concurrent_descriptor_reads() {
    let fixture = collision_store_base();
    let store = Arc::new(DescriptorStore::open(fixture.root()).expect("open store"));

    println!("=== CONCURRENT READS TEST ===");
    println!("TRIGGER: Spawning 32 concurrent read threads");

    let handles: Vec<_> = (0..32)
        .map(|i| {
            let store = Arc::clone(&store);
            thread::spawn(move || {
                let ordinal = i % store.len();
                let expected = store.get_descriptors(ordinal, true)?;
                let iterated = store.iter().nth(ordinal).expect("in range")?.1;
                Ok::<_, descripta_store::StoreError>(expected[..1] == iterated[..])
            })
        })
        .collect();

    let success_count: usize = handles
        .into_iter()
        .map(|h| usize::from(h.join().unwrap().unwrap_or(false)))
        .sum();

    println!("VERIFY: {}/32 reads consistent", success_count);
    assert_eq!(success_count, 32, "all reads should agree");
    println!("RESULT: PASSED");
}

#[test]
fn test_concurrent_first_name_lookups() {
    let fixture = collision_store_base();
    let store = Arc::new(DescriptorStore::open(fixture.root()).expect("open store"));
    let barrier = Arc::new(Barrier::new(16));

    println!("=== CONCURRENT NAME FALLBACK TEST ===");
    let handles: Vec<_> = (0..16)
        .map(|i| {
            let store = Arc::clone(&store);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                let ordinal = i % 10;
                store.lookup_name(&mol_name(ordinal)).ok() == Some(ordinal)
            })
        })
        .collect();

    for handle in handles {
        assert!(handle.join().unwrap(), "every thread sees the finished map");
    }
    assert!(store.capabilities().name_fallback_built);
    println!("RESULT: PASSED");
}
