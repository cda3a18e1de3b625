// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Loader-facing surface: environment hooks, the pending-definition slot
//! and the async fetch hand-off

use crate::module::ModuleDescriptor;
use crate::require::Require;
use crate::value::Value;
use parking_lot::Mutex;

/// Environment hook for define-time addressing.
///
/// When a definition executes, the environment may be able to say which
/// script is evaluating right now, synchronously, before control returns to
/// any scheduler. If it can, the definition is memoized immediately under
/// that address; if not, it is parked in the [`PendingSlot`] until the
/// loader reports load completion.
pub trait ScriptEnvironment: Send + Sync {
    /// Absolute address of the currently-evaluating script, if knowable.
    fn current_script_address(&self) -> Option<String>;
}

/// Environment with no synchronous script identity (the common case);
/// every definition goes through the pending slot.
#[derive(Debug, Default)]
pub struct DetachedEnvironment;

impl ScriptEnvironment for DetachedEnvironment {
    fn current_script_address(&self) -> Option<String> {
        None
    }
}

/// Callback invoked once asynchronously requested modules are available.
///
/// One entry per requested id, in request order; `None` marks an id whose
/// module never became available.
pub type LoadCallback = Box<dyn FnOnce(Vec<Option<Value>>) + Send>;

/// Async batch fetch + instantiate, implemented by the host loader.
pub trait ModuleFetcher: Send + Sync {
    /// Fetch `ids`, memoize their definitions, and hand the requested values
    /// to `callback`. `require` is bound to the requesting module's context
    /// so nested ids resolve against the right base address.
    fn load(&self, ids: &[String], callback: Option<LoadCallback>, require: Require);
}

/// The single definition parked between define time and load completion.
///
/// An anonymous definition evaluated without synchronous script identity
/// cannot be addressed yet. It waits here until the loader learns the
/// enclosing script's address and drains the slot. At most one definition
/// may be pending: the loader must drain between definitions, and a fill
/// that displaces an undrained descriptor is reported by the module system.
#[derive(Debug, Default)]
pub struct PendingSlot {
    parked: Mutex<Option<ModuleDescriptor>>,
}

impl PendingSlot {
    /// Create an empty slot
    pub fn new() -> Self {
        Self::default()
    }

    /// Parks a descriptor, returning the displaced one if the slot was full.
    pub fn fill(&self, descriptor: ModuleDescriptor) -> Option<ModuleDescriptor> {
        self.parked.lock().replace(descriptor)
    }

    /// Takes the parked descriptor, if any.
    pub fn take(&self) -> Option<ModuleDescriptor> {
        self.parked.lock().take()
    }

    /// True if nothing is parked.
    pub fn is_empty(&self) -> bool {
        self.parked.lock().is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::module::Factory;

    fn descriptor(id: &str) -> ModuleDescriptor {
        ModuleDescriptor {
            id: id.to_string(),
            dependencies: Vec::new(),
            factory: Factory::value(Value::Null),
        }
    }

    #[test]
    fn test_fill_and_take() {
        let slot = PendingSlot::new();
        assert!(slot.is_empty());

        assert!(slot.fill(descriptor("a")).is_none());
        assert!(!slot.is_empty());

        let taken = slot.take().unwrap();
        assert_eq!(taken.id, "a");
        assert!(slot.is_empty());
        assert!(slot.take().is_none());
    }

    #[test]
    fn test_fill_displaces_previous() {
        let slot = PendingSlot::new();
        slot.fill(descriptor("first"));
        let displaced = slot.fill(descriptor("second")).unwrap();
        assert_eq!(displaced.id, "first");
        assert_eq!(slot.take().unwrap().id, "second");
    }
}
