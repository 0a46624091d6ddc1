//! Testing utilities for Plexus.
//!
//! This module provides fakes that record every hook call they receive, so
//! tests can assert on load order and load counts.
//!
//! # Features
//!
//! - [`CallLog`]: A shared, ordered log of hook calls
//! - [`RecordingProvider`]: A provider (optionally a loader provider) that logs its hooks
//! - [`RecordingLoader`]: A plain bootstrap unit that logs its hook

use parking_lot::Mutex;
use plexus_core::{
    Capability, DynamicObject, LoadError, Loader, ObjectCore, OperationTable, Provider,
};
use std::sync::Arc;

// ============================================================================
// Call Log
// ============================================================================

/// A shared, ordered record of hook invocations.
///
/// Entries look like `"name.load(capability)"` or `"name.bootstrap"`.
#[derive(Clone, Default)]
pub struct CallLog {
    entries: Arc<Mutex<Vec<String>>>,
}

impl CallLog {
    /// Create an empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry.
    pub fn push(&self, entry: impl Into<String>) {
        self.entries.lock().push(entry.into());
    }

    /// A copy of all entries in order.
    pub fn entries(&self) -> Vec<String> {
        self.entries.lock().clone()
    }

    /// How many entries equal `entry`.
    pub fn count(&self, entry: &str) -> usize {
        self.entries.lock().iter().filter(|e| *e == entry).count()
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    /// Whether nothing was recorded.
    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    /// Drop all entries.
    pub fn clear(&self) {
        self.entries.lock().clear();
    }
}

impl std::fmt::Debug for CallLog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.entries.lock().iter()).finish()
    }
}

// ============================================================================
// Recording Provider
// ============================================================================

/// A provider that records its hooks into a [`CallLog`].
///
/// Exposes one function, `"name"`, returning the provider name as a `String`.
///
/// # Example
///
/// ```rust,ignore
/// let log = CallLog::new();
/// let provider = RecordingProvider::new("disk", log.clone())
///     .with_capability("storage", 5)
///     .loader();
/// ```
pub struct RecordingProvider {
    name: String,
    capabilities: Vec<Capability>,
    log: CallLog,
    is_loader: bool,
    fail_bootstrap: bool,
    object: ObjectCore,
}

impl RecordingProvider {
    /// A provider with no capabilities.
    pub fn new(name: impl Into<String>, log: CallLog) -> Self {
        let name = name.into();
        let reported = name.clone();
        let table = OperationTable::builder()
            .function("name", move || reported.clone())
            .build();
        Self {
            name,
            capabilities: Vec::new(),
            log,
            is_loader: false,
            fail_bootstrap: false,
            object: ObjectCore::new(table),
        }
    }

    /// Advertise `capability` at `priority`.
    pub fn with_capability(mut self, capability: &str, priority: i32) -> Self {
        self.capabilities
            .push(Capability::new(capability.to_string()).with_priority(priority));
        self
    }

    /// Make this a loader provider.
    pub fn loader(mut self) -> Self {
        self.is_loader = true;
        self
    }

    /// Make the bootstrap hook fail (implies [`loader`](Self::loader)).
    pub fn failing(mut self) -> Self {
        self.is_loader = true;
        self.fail_bootstrap = true;
        self
    }

    /// How many times `load(capability)` ran.
    pub fn load_count(&self, capability: &str) -> usize {
        self.log.count(&format!("{}.load({capability})", self.name))
    }

    /// How many times the bootstrap hook ran.
    pub fn bootstrap_count(&self) -> usize {
        self.log.count(&format!("{}.bootstrap", self.name))
    }
}

impl DynamicObject for RecordingProvider {
    fn object(&self) -> &ObjectCore {
        &self.object
    }
}

impl Provider for RecordingProvider {
    fn capabilities(&self) -> &[Capability] {
        &self.capabilities
    }

    fn load(&self, capability: &str) {
        self.log.push(format!("{}.load({capability})", self.name));
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn as_loader(&self) -> Option<&dyn Loader> {
        self.is_loader.then_some(self as &dyn Loader)
    }
}

impl Loader for RecordingProvider {
    fn bootstrap(&self) -> Result<(), LoadError> {
        self.log.push(format!("{}.bootstrap", self.name));
        if self.fail_bootstrap {
            return Err(LoadError::msg(format!("{} refused to start", self.name)));
        }
        Ok(())
    }

    fn unit_name(&self) -> &str {
        &self.name
    }
}

// ============================================================================
// Recording Loader
// ============================================================================

/// A general bootstrap unit (not a provider) that records its hook.
pub struct RecordingLoader {
    name: String,
    log: CallLog,
    fail: bool,
    object: ObjectCore,
}

impl RecordingLoader {
    /// A loader that succeeds.
    pub fn new(name: impl Into<String>, log: CallLog) -> Self {
        Self {
            name: name.into(),
            log,
            fail: false,
            object: ObjectCore::empty(),
        }
    }

    /// A loader whose hook fails.
    pub fn failing(name: impl Into<String>, log: CallLog) -> Self {
        Self {
            fail: true,
            ..Self::new(name, log)
        }
    }

    /// How many times the hook ran.
    pub fn bootstrap_count(&self) -> usize {
        self.log.count(&format!("{}.bootstrap", self.name))
    }
}

impl DynamicObject for RecordingLoader {
    fn object(&self) -> &ObjectCore {
        &self.object
    }
}

impl Loader for RecordingLoader {
    fn bootstrap(&self) -> Result<(), LoadError> {
        self.log.push(format!("{}.bootstrap", self.name));
        if self.fail {
            return Err(LoadError::msg(format!("{} refused to start", self.name)));
        }
        Ok(())
    }

    fn unit_name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use plexus_core::ObjectExt;

    #[test]
    fn test_recording_provider_logs_loads() {
        let log = CallLog::new();
        let provider = RecordingProvider::new("disk", log.clone()).with_capability("storage", 1);
        Provider::load(&provider, "storage");
        Provider::load(&provider, "storage");

        assert_eq!(provider.load_count("storage"), 2);
        assert_eq!(log.entries(), vec!["disk.load(storage)", "disk.load(storage)"]);
    }

    #[test]
    fn test_loader_flag() {
        let log = CallLog::new();
        let plain = RecordingProvider::new("plain", log.clone());
        let boot = RecordingProvider::new("boot", log.clone()).loader();
        assert!(plain.as_loader().is_none());
        assert!(boot.as_loader().is_some());
    }

    #[test]
    fn test_failing_loader() {
        let log = CallLog::new();
        let loader = RecordingLoader::failing("bad", log.clone());
        assert!(loader.bootstrap().is_err());
        assert_eq!(loader.bootstrap_count(), 1);
    }

    #[test]
    fn test_name_operation() {
        let provider = RecordingProvider::new("disk", CallLog::new());
        assert_eq!(
            provider.invoke_function::<String>("name", &[]).as_deref(),
            Some("disk")
        );
    }

    #[test]
    fn test_call_log_clear() {
        let log = CallLog::new();
        let loader = RecordingLoader::new("unit", log.clone());
        loader.bootstrap().unwrap();
        assert_eq!(log.len(), 1);

        log.clear();
        assert!(log.is_empty());
        loader.bootstrap().unwrap();
        assert_eq!(log.entries(), vec!["unit.bootstrap"]);
    }
}
