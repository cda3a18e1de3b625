// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Process-wide module registry

use crate::module::{ModuleDescriptor, ModuleRecord};
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use std::sync::Arc;

/// Registry mapping resolved addresses to module records.
///
/// Write-once per address: the first memoization of an address wins and the
/// record lives for the process lifetime. There is no invalidation.
pub struct ModuleRegistry {
    records: DashMap<String, Arc<ModuleRecord>>,
}

impl ModuleRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self {
            records: DashMap::new(),
        }
    }

    /// Get a record by resolved address
    pub fn get(&self, uri: &str) -> Option<Arc<ModuleRecord>> {
        self.records.get(uri).map(|entry| Arc::clone(entry.value()))
    }

    /// Check if an address is memoized
    pub fn has(&self, uri: &str) -> bool {
        self.records.contains_key(uri)
    }

    /// Memoize a descriptor under `uri`.
    ///
    /// Returns the record at that address plus whether this call created it.
    /// An occupied address keeps its existing record untouched.
    pub(crate) fn memoize(&self, uri: &str, descriptor: ModuleDescriptor) -> (Arc<ModuleRecord>, bool) {
        match self.records.entry(uri.to_string()) {
            Entry::Occupied(entry) => (Arc::clone(entry.get()), false),
            Entry::Vacant(entry) => {
                let record = ModuleRecord::memoized(uri.to_string(), descriptor);
                entry.insert(Arc::clone(&record));
                (record, true)
            }
        }
    }

    /// All memoized addresses
    pub fn keys(&self) -> Vec<String> {
        self.records.iter().map(|entry| entry.key().clone()).collect()
    }

    /// Number of memoized modules
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Check if the registry is empty
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl Default for ModuleRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::module::Factory;
    use crate::value::Value;

    fn descriptor(id: &str) -> ModuleDescriptor {
        ModuleDescriptor {
            id: id.to_string(),
            dependencies: Vec::new(),
            factory: Factory::value(Value::String(id.to_string())),
        }
    }

    #[test]
    fn test_memoize_and_get() {
        let registry = ModuleRegistry::new();
        assert!(registry.is_empty());

        let (record, inserted) = registry.memoize("/mods/a.js", descriptor("a"));
        assert!(inserted);
        assert_eq!(record.id(), "a");
        assert!(registry.has("/mods/a.js"));
        assert_eq!(registry.len(), 1);

        let found = registry.get("/mods/a.js").unwrap();
        assert!(Arc::ptr_eq(&record, &found));
        assert!(registry.get("/mods/missing.js").is_none());
    }

    #[test]
    fn test_first_memoization_wins() {
        let registry = ModuleRegistry::new();
        let (first, _) = registry.memoize("/mods/a.js", descriptor("a"));
        let (second, inserted) = registry.memoize("/mods/a.js", descriptor("replacement"));

        assert!(!inserted);
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(second.id(), "a");
    }
}
