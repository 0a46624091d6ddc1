//! Distributed registration through the global inventory.

#![cfg(feature = "inventory")]

mod common;

use common::Storage;
use plexus::{InventoryDiscovery, Runtime, testing::{CallLog, RecordingLoader}};

plexus::submit_provider!("storage.fast" => Storage::new("fast", 9));
plexus::submit_provider!("storage.slow" => Storage::new("slow", 2));
plexus::submit_loader!("unit.audit" => RecordingLoader::new("audit", CallLog::new()));

#[test]
fn test_submitted_entries_are_discovered() {
    let names: Vec<_> = InventoryDiscovery::entries()
        .iter()
        .map(|e| e.name())
        .collect();
    assert_eq!(names, vec!["storage.fast", "storage.slow", "unit.audit"]);
}

#[test]
fn test_boot_from_inventory() {
    let runtime = Runtime::boot([InventoryDiscovery]).unwrap();

    assert_eq!(runtime.registry().len(), 2);
    assert_eq!(runtime.units().len(), 1);
    assert_eq!(runtime.resolve("Storage").unwrap().name(), "fast");
}
