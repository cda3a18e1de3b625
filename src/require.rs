// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! The require engine: resolution, cycle detection, one-time instantiation

use crate::context::ResolutionContext;
use crate::diagnostics::{Severity, Warning};
use crate::loader::LoadCallback;
use crate::module::{Factory, ModuleRecord};
use crate::scan;
use crate::system::ModuleSystem;
use crate::value::Value;
use std::sync::Arc;

/// A require function bound to one resolution context.
///
/// Every module factory receives its own instance, scoped to the module
/// being instantiated; [`ModuleSystem::require_root`] builds the top-level
/// one. Cloning preserves the binding, so a `Require` can be handed across
/// delegation layers and nested relative ids keep resolving against the
/// same base address.
#[derive(Clone)]
pub struct Require {
    system: Arc<ModuleSystem>,
    context: Arc<ResolutionContext>,
}

impl Require {
    pub(crate) fn bound(system: Arc<ModuleSystem>, context: Arc<ResolutionContext>) -> Self {
        Self { system, context }
    }

    /// The context this instance is bound to.
    pub fn context(&self) -> &Arc<ResolutionContext> {
        &self.context
    }

    /// Requires a module by id.
    ///
    /// Resolves `id` against this binding's base address, looks the record
    /// up, and returns its exports, instantiating it first if this is the
    /// first require to reach it. `None` means the module is unavailable
    /// (never defined, failed to load, malformed source); that is a valid
    /// silent outcome, not an error, and no diagnostic is emitted for it.
    ///
    /// A cyclic require (the target is already instantiating somewhere up
    /// this call chain) reports a warning and returns the target's current
    /// exports as-is, which may still be mid-population.
    pub fn call(&self, id: &str) -> Option<Value> {
        let uri = self.resolve(id);
        let record = self.system.registry().get(&uri)?;
        self.enter(&record)
    }

    /// Requires an already-resolved record directly, skipping id resolution.
    ///
    /// Loader path: after a fetch completes the loader holds records, not
    /// ids. Cycle detection and instantiation behave exactly as in
    /// [`call`](Self::call).
    pub fn require_record(&self, record: &Arc<ModuleRecord>) -> Option<Value> {
        self.enter(record)
    }

    /// Resolves an id to its canonical address without loading anything.
    ///
    /// Pure: nothing is registered or instantiated along the way.
    pub fn resolve(&self, id: &str) -> String {
        self.system.resolver().resolve(id, self.context.uri())
    }

    /// Batch form of [`resolve`](Self::resolve), preserving order.
    pub fn resolve_all(&self, ids: &[String]) -> Vec<String> {
        ids.iter().map(|id| self.resolve(id)).collect()
    }

    /// Requests modules asynchronously through the installed fetcher.
    ///
    /// The hand-off forwards a clone of this bound instance so the fetcher
    /// resolves and instantiates relative to the caller's context. Without
    /// a fetcher the request is unfulfillable: a warning is reported and
    /// the callback, if any, receives `None` for every id.
    pub fn async_load(&self, ids: &[String], callback: Option<LoadCallback>) {
        match self.system.fetcher() {
            Some(fetcher) => fetcher.load(ids, callback, self.clone()),
            None => {
                self.system.sink().report(Warning {
                    message: "no module fetcher installed, async require dropped".into(),
                    from: "require",
                    address: self.context.uri().to_string(),
                    severity: Severity::Warn,
                });
                if let Some(callback) = callback {
                    callback(ids.iter().map(|_| None).collect());
                }
            }
        }
    }

    fn enter(&self, record: &Arc<ModuleRecord>) -> Option<Value> {
        let uri = record.uri();

        // A hit anywhere up the chain means the target is mid-instantiation
        // below us; entering it again would recurse forever. Hand back
        // whatever exports exist right now instead.
        if self.context.contains(uri) {
            self.system.sink().report(Warning {
                message: format!("found cyclic dependencies at '{uri}'"),
                from: "require",
                address: uri.to_string(),
                severity: Severity::Warn,
            });
            return Some(record.current_exports());
        }

        if let Some(exports) = record.exports() {
            return Some(exports);
        }

        Some(self.instantiate(record))
    }

    /// One-time factory execution.
    ///
    /// The factory is consumed before it runs and the live container is
    /// installed first, so re-entrant requires triggered by the factory see
    /// a record that is already instantiating. The record lock is not held
    /// across the invocation.
    fn instantiate(&self, record: &Arc<ModuleRecord>) -> Value {
        let Some((factory, container)) = record.begin_instantiation() else {
            // Someone took the factory between our state check and now;
            // their container (or final exports) is the answer.
            return record.current_exports();
        };

        tracing::debug!(uri = record.uri(), "instantiating module");

        let exports = match factory {
            Factory::Function(function) => {
                // Advisory re-check: definitions normally fail this at
                // construction time, but records memoized directly (bundle
                // manifests, loader-synthesized descriptors) skip that path.
                // The module is committed to instantiation now, so this is
                // a warning rather than a failure.
                if scan::has_exports_assignment(function.source()) {
                    self.system.sink().report(Warning {
                        message: format!(
                            "found invalid setter 'exports = ...' in '{}'",
                            record.uri()
                        ),
                        from: "require",
                        address: record.uri().to_string(),
                        severity: Severity::Warn,
                    });
                }

                let scoped = Require::bound(
                    Arc::clone(&self.system),
                    self.context.child(record.uri()),
                );
                match function.invoke(&scoped, &container, record) {
                    Some(value) => value,
                    None => container,
                }
            }
            Factory::Value(value) => value,
        };

        record.finish_instantiation(exports.clone());
        exports
    }
}
