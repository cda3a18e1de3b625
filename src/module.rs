// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Module descriptors, factories and registered records

use crate::require::Require;
use crate::value::Value;
use parking_lot::Mutex;
use std::fmt;
use std::sync::Arc;

/// Native callable compiled from a module body.
///
/// Invoked with the module-scoped require function, the live exports
/// container and the module's own record. `Some(value)` replaces the
/// container wholesale; `None` keeps the container, mutated or not.
pub type FactoryFn =
    Arc<dyn Fn(&Require, &Value, &Arc<ModuleRecord>) -> Option<Value> + Send + Sync>;

/// A scripted factory: the module body's source text paired with the
/// callable the host compiled it to.
///
/// The source text is what static scanning runs against: dependency
/// discovery and the `exports = ...` check read it, never the callable.
#[derive(Clone)]
pub struct ScriptFunction {
    source: String,
    body: FactoryFn,
}

impl ScriptFunction {
    /// Pairs a module body's source text with its compiled callable.
    pub fn new(
        source: impl Into<String>,
        body: impl Fn(&Require, &Value, &Arc<ModuleRecord>) -> Option<Value>
        + Send
        + Sync
        + 'static,
    ) -> Self {
        Self {
            source: source.into(),
            body: Arc::new(body),
        }
    }

    /// The module body's source text.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Runs the factory.
    pub fn invoke(
        &self,
        require: &Require,
        exports: &Value,
        record: &Arc<ModuleRecord>,
    ) -> Option<Value> {
        (self.body)(require, exports, record)
    }
}

impl fmt::Debug for ScriptFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScriptFunction")
            .field("source", &self.source)
            .finish_non_exhaustive()
    }
}

/// What a module definition supplies to produce its exports
#[derive(Debug, Clone)]
pub enum Factory {
    /// A callable factory, run once at first require
    Function(ScriptFunction),
    /// A plain value used directly as exports, no invocation
    Value(Value),
}

impl Factory {
    /// Scripted factory from source text plus its compiled callable.
    pub fn function(
        source: impl Into<String>,
        body: impl Fn(&Require, &Value, &Arc<ModuleRecord>) -> Option<Value>
        + Send
        + Sync
        + 'static,
    ) -> Self {
        Factory::Function(ScriptFunction::new(source, body))
    }

    /// Plain-value factory.
    pub fn value(value: Value) -> Self {
        Factory::Value(value)
    }

    /// Source text of a scripted factory, `None` for plain values.
    pub fn source(&self) -> Option<&str> {
        match self {
            Factory::Function(function) => Some(function.source()),
            Factory::Value(_) => None,
        }
    }
}

/// Canonical output of definition normalization
///
/// Not yet addressable: a descriptor becomes a [`ModuleRecord`] when it is
/// memoized under a resolved address.
#[derive(Debug, Clone)]
pub struct ModuleDescriptor {
    /// Declared logical name, empty for anonymous modules
    pub id: String,
    /// Dependency ids as declared or statically discovered; order and
    /// duplicates preserved
    pub dependencies: Vec<String>,
    /// Exports producer
    pub factory: Factory,
}

/// Lifecycle of a registered module.
///
/// `Registered` holds the factory until the first successful require takes
/// it; the factory is gone from that point on, so a module mid-instantiation
/// has nothing left to re-invoke. `Instantiated` is terminal.
#[derive(Debug)]
enum ModuleState {
    Registered {
        factory: Factory,
        /// Loader's transient marker: dependencies fetched, instantiation
        /// may begin. Dropped with the factory.
        ready: bool,
    },
    Instantiating {
        exports: Value,
    },
    Instantiated {
        exports: Value,
    },
}

/// A registered, addressable module
#[derive(Debug)]
pub struct ModuleRecord {
    uri: String,
    id: String,
    dependencies: Vec<String>,
    state: Mutex<ModuleState>,
}

impl ModuleRecord {
    /// Builds the record for a descriptor memoized under `uri`.
    ///
    /// Anonymous descriptors take the address as their id.
    pub(crate) fn memoized(uri: String, descriptor: ModuleDescriptor) -> Arc<Self> {
        let id = if descriptor.id.is_empty() {
            uri.clone()
        } else {
            descriptor.id
        };
        Arc::new(Self {
            uri,
            id,
            dependencies: descriptor.dependencies,
            state: Mutex::new(ModuleState::Registered {
                factory: descriptor.factory,
                ready: false,
            }),
        })
    }

    /// Resolved address this record is keyed by.
    pub fn uri(&self) -> &str {
        &self.uri
    }

    /// Logical module id; the address when defined anonymously.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Declared or discovered dependency ids.
    pub fn dependencies(&self) -> &[String] {
        &self.dependencies
    }

    /// True once instantiation has completed.
    pub fn is_instantiated(&self) -> bool {
        matches!(&*self.state.lock(), ModuleState::Instantiated { .. })
    }

    /// Current exports: the final value once instantiated, the live
    /// container mid-instantiation, `None` before the factory is entered.
    pub fn exports(&self) -> Option<Value> {
        match &*self.state.lock() {
            ModuleState::Registered { .. } => None,
            ModuleState::Instantiating { exports } | ModuleState::Instantiated { exports } => {
                Some(exports.clone())
            }
        }
    }

    /// Exports as seen by a cyclic requester: whatever exists right now.
    pub(crate) fn current_exports(&self) -> Value {
        self.exports().unwrap_or(Value::Undefined)
    }

    /// Loader hook: flags that this record's dependencies have been fetched.
    ///
    /// No effect once instantiation has begun.
    pub fn mark_ready(&self) {
        if let ModuleState::Registered { ready, .. } = &mut *self.state.lock() {
            *ready = true;
        }
    }

    /// True while the record is registered and flagged ready.
    pub fn is_ready(&self) -> bool {
        matches!(&*self.state.lock(), ModuleState::Registered { ready: true, .. })
    }

    /// Consumes the factory and moves to `Instantiating` with a fresh empty
    /// container. Returns `None` if instantiation already began or finished.
    pub(crate) fn begin_instantiation(&self) -> Option<(Factory, Value)> {
        let mut state = self.state.lock();
        if !matches!(&*state, ModuleState::Registered { .. }) {
            return None;
        }
        let container = Value::new_object();
        let previous = std::mem::replace(
            &mut *state,
            ModuleState::Instantiating {
                exports: container.clone(),
            },
        );
        match previous {
            ModuleState::Registered { factory, .. } => Some((factory, container)),
            _ => unreachable!("state checked above"),
        }
    }

    /// Records the final exports value.
    pub(crate) fn finish_instantiation(&self, exports: Value) {
        *self.state.lock() = ModuleState::Instantiated { exports };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn descriptor(id: &str) -> ModuleDescriptor {
        ModuleDescriptor {
            id: id.to_string(),
            dependencies: vec!["./dep.js".to_string()],
            factory: Factory::value(Value::Number(1.0)),
        }
    }

    #[test]
    fn test_anonymous_record_derives_id_from_uri() {
        let record = ModuleRecord::memoized("/mods/a.js".into(), descriptor(""));
        assert_eq!(record.id(), "/mods/a.js");
        assert_eq!(record.uri(), "/mods/a.js");
    }

    #[test]
    fn test_declared_id_is_kept() {
        let record = ModuleRecord::memoized("/mods/a.js".into(), descriptor("a"));
        assert_eq!(record.id(), "a");
        assert_eq!(record.dependencies(), ["./dep.js"]);
    }

    #[test]
    fn test_ready_marker_is_dropped_with_the_factory() {
        let record = ModuleRecord::memoized("/mods/a.js".into(), descriptor("a"));
        record.mark_ready();
        assert!(record.is_ready());

        let taken = record.begin_instantiation();
        assert!(taken.is_some());
        assert!(!record.is_ready());

        // The factory is consumed; a second begin is refused.
        assert!(record.begin_instantiation().is_none());
    }

    #[test]
    fn test_exports_visible_mid_instantiation() {
        let record = ModuleRecord::memoized("/mods/a.js".into(), descriptor("a"));
        assert_eq!(record.exports(), None);

        let (_factory, container) = record.begin_instantiation().unwrap();
        let seen = record.exports().unwrap();
        assert!(seen.same_object(&container));

        record.finish_instantiation(Value::String("done".into()));
        assert!(record.is_instantiated());
        assert_eq!(record.exports(), Some(Value::String("done".into())));
    }
}
