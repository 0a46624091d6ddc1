//! Shared fixtures for the integration tests.

#![allow(dead_code)]

use plexus::{Capability, DynamicObject, Event, ObjectCore, OperationTable, Provider, Value};
use std::sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
};

/// Install a test-writer subscriber, honouring `RUST_LOG`. Safe to call from
/// every test.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// A storage provider exposing a small operation surface:
///
/// - `store(&String)` procedure, fires `stored` with the stored item
/// - `count() -> usize` function
/// - `label() -> String` function
/// - `stored` event
pub struct Storage {
    label: String,
    capabilities: Vec<Capability>,
    loads: AtomicUsize,
    items: Arc<parking_lot::Mutex<Vec<String>>>,
    object: ObjectCore,
}

impl Storage {
    pub fn new(label: &str, priority: i32) -> Self {
        Self::with_capabilities(label, vec![Capability::new("Storage").with_priority(priority)])
    }

    pub fn with_capabilities(label: &str, capabilities: Vec<Capability>) -> Self {
        let items = Arc::new(parking_lot::Mutex::new(Vec::new()));
        let stored = Event::shared();

        let (writer, notify) = (items.clone(), stored.clone());
        let reader = items.clone();
        let name = label.to_string();
        let table = OperationTable::builder()
            .procedure("store", move |item: &String| {
                writer.lock().push(item.clone());
                notify.fire(&[Value::new(item.clone())]);
            })
            .function("count", move || reader.lock().len())
            .function("label", move || name.clone())
            .event("stored", stored)
            .build();

        Self {
            label: label.to_string(),
            capabilities,
            loads: AtomicUsize::new(0),
            items,
            object: ObjectCore::new(table),
        }
    }

    pub fn loads(&self) -> usize {
        self.loads.load(Ordering::SeqCst)
    }

    pub fn items(&self) -> Vec<String> {
        self.items.lock().clone()
    }
}

impl DynamicObject for Storage {
    fn object(&self) -> &ObjectCore {
        &self.object
    }
}

impl Provider for Storage {
    fn capabilities(&self) -> &[Capability] {
        &self.capabilities
    }

    fn load(&self, _capability: &str) {
        self.loads.fetch_add(1, Ordering::SeqCst);
    }

    fn name(&self) -> &str {
        &self.label
    }
}
