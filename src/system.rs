// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Module system wiring and definition entry points

use crate::context::ResolutionContext;
use crate::define::{self, DefineCall};
use crate::diagnostics::{DiagnosticSink, Severity, TracingSink, Warning};
use crate::error::Result;
use crate::loader::{DetachedEnvironment, ModuleFetcher, PendingSlot, ScriptEnvironment};
use crate::module::{ModuleDescriptor, ModuleRecord};
use crate::registry::ModuleRegistry;
use crate::require::Require;
use crate::resolver::{AddressResolver, UrlResolver};
use std::sync::Arc;

/// Outcome of a definition call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Registration {
    /// Memoized immediately under an environment-derived address
    Memoized(String),
    /// Parked in the pending slot, awaiting the loader's address
    Pending,
}

/// The module system: registry plus collaborators.
///
/// Owns the process-wide registry and the narrow interfaces everything else
/// is consumed through: address resolution, script-environment addressing,
/// async fetching and the diagnostic sink. Hosts construct one, install
/// their collaborators, wrap it in an [`Arc`] and hand
/// [`require_root`](Self::require_root) to top-level code.
pub struct ModuleSystem {
    registry: ModuleRegistry,
    resolver: Box<dyn AddressResolver>,
    environment: Box<dyn ScriptEnvironment>,
    fetcher: Option<Box<dyn ModuleFetcher>>,
    sink: Arc<dyn DiagnosticSink>,
    pending: PendingSlot,
}

impl ModuleSystem {
    /// System with default collaborators: [`UrlResolver`], a detached
    /// environment, no fetcher, diagnostics through `tracing`.
    pub fn new() -> Self {
        Self {
            registry: ModuleRegistry::new(),
            resolver: Box::new(UrlResolver),
            environment: Box::new(DetachedEnvironment),
            fetcher: None,
            sink: Arc::new(TracingSink),
            pending: PendingSlot::new(),
        }
    }

    /// Replaces the address resolver.
    pub fn with_resolver(mut self, resolver: impl AddressResolver + 'static) -> Self {
        self.resolver = Box::new(resolver);
        self
    }

    /// Replaces the script environment hook.
    pub fn with_environment(mut self, environment: impl ScriptEnvironment + 'static) -> Self {
        self.environment = Box::new(environment);
        self
    }

    /// Installs the async module fetcher.
    pub fn with_fetcher(mut self, fetcher: impl ModuleFetcher + 'static) -> Self {
        self.fetcher = Some(Box::new(fetcher));
        self
    }

    /// Replaces the diagnostic sink.
    pub fn with_sink(mut self, sink: Arc<dyn DiagnosticSink>) -> Self {
        self.sink = sink;
        self
    }

    /// Defines a module.
    ///
    /// Normalizes the call, then either memoizes the descriptor immediately
    /// (when the environment can name the evaluating script synchronously)
    /// or parks it for the loader to address at load completion. The only
    /// error is a factory that reassigns `exports`, raised before anything
    /// is registered.
    pub fn define(&self, call: DefineCall) -> Result<Registration> {
        let descriptor = define::normalize(call)?;

        match self.environment.current_script_address() {
            Some(uri) => {
                self.memoize(&uri, descriptor);
                Ok(Registration::Memoized(uri))
            }
            None => {
                if let Some(displaced) = self.pending.fill(descriptor) {
                    self.sink.report(Warning {
                        message: "pending definition displaced before load completion".into(),
                        from: "define",
                        address: displaced.id,
                        severity: Severity::Warn,
                    });
                }
                Ok(Registration::Pending)
            }
        }
    }

    /// Loader hook: drains the pending definition and memoizes it under the
    /// address the enclosing script loaded from. Returns `None` when nothing
    /// was pending (a script that defined nothing, or defined with
    /// synchronous addressing).
    pub fn complete_load(&self, uri: &str) -> Option<Arc<ModuleRecord>> {
        let descriptor = self.pending.take()?;
        Some(self.memoize(uri, descriptor))
    }

    /// Memoizes a descriptor under a resolved address.
    ///
    /// The first record at an address is permanent; a re-definition is
    /// dropped with a warning and the existing record is returned.
    pub fn memoize(&self, uri: &str, descriptor: ModuleDescriptor) -> Arc<ModuleRecord> {
        let (record, inserted) = self.registry.memoize(uri, descriptor);
        if inserted {
            tracing::debug!(uri, "module memoized");
        } else {
            self.sink.report(Warning {
                message: format!("module already memoized at '{uri}', keeping first definition"),
                from: "define",
                address: uri.to_string(),
                severity: Severity::Warn,
            });
        }
        record
    }

    /// A require function for top-level, non-module callers.
    ///
    /// Loaders hand this to freshly loaded scripts that are not themselves
    /// modules; its context has no address and no parent.
    pub fn require_root(self: &Arc<Self>) -> Require {
        Require::bound(Arc::clone(self), ResolutionContext::root())
    }

    /// The process-wide registry.
    pub fn registry(&self) -> &ModuleRegistry {
        &self.registry
    }

    /// The pending-definition slot (loader-owned state).
    pub fn pending(&self) -> &PendingSlot {
        &self.pending
    }

    pub(crate) fn resolver(&self) -> &dyn AddressResolver {
        self.resolver.as_ref()
    }

    pub(crate) fn fetcher(&self) -> Option<&dyn ModuleFetcher> {
        self.fetcher.as_deref()
    }

    pub(crate) fn sink(&self) -> &dyn DiagnosticSink {
        self.sink.as_ref()
    }
}

impl Default for ModuleSystem {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::CollectingSink;
    use crate::module::Factory;
    use crate::value::Value;

    /// Environment that always names the same evaluating script.
    struct PinnedEnvironment(&'static str);

    impl ScriptEnvironment for PinnedEnvironment {
        fn current_script_address(&self) -> Option<String> {
            Some(self.0.to_string())
        }
    }

    fn value_call(id: &str) -> DefineCall {
        DefineCall::Named(id.into(), None, Factory::value(Value::Number(1.0)))
    }

    #[test]
    fn test_define_with_environment_address_memoizes_immediately() {
        let system = ModuleSystem::new().with_environment(PinnedEnvironment("/mods/a.js"));
        let registration = system.define(value_call("a")).unwrap();

        assert_eq!(registration, Registration::Memoized("/mods/a.js".into()));
        assert!(system.registry().has("/mods/a.js"));
        assert!(system.pending().is_empty());
    }

    #[test]
    fn test_define_without_address_parks_until_load_completion() {
        let system = ModuleSystem::new();
        let registration = system.define(value_call("a")).unwrap();

        assert_eq!(registration, Registration::Pending);
        assert!(!system.pending().is_empty());
        assert!(system.registry().is_empty());

        let record = system.complete_load("/mods/a.js").unwrap();
        assert_eq!(record.uri(), "/mods/a.js");
        assert!(system.pending().is_empty());
        assert!(system.registry().has("/mods/a.js"));

        // Nothing pending anymore: a second completion is a no-op.
        assert!(system.complete_load("/mods/b.js").is_none());
    }

    #[test]
    fn test_undrained_definition_is_displaced_with_a_warning() {
        let sink = Arc::new(CollectingSink::new());
        let system = ModuleSystem::new().with_sink(sink.clone());

        system.define(value_call("first")).unwrap();
        system.define(value_call("second")).unwrap();

        assert_eq!(sink.len(), 1);
        assert_eq!(sink.reports()[0].from, "define");

        let record = system.complete_load("/mods/second.js").unwrap();
        assert_eq!(record.id(), "second");
    }

    #[test]
    fn test_duplicate_memoization_keeps_first_and_warns() {
        let sink = Arc::new(CollectingSink::new());
        let system = ModuleSystem::new()
            .with_environment(PinnedEnvironment("/mods/a.js"))
            .with_sink(sink.clone());

        system.define(value_call("a")).unwrap();
        system.define(value_call("replacement")).unwrap();

        assert_eq!(sink.len(), 1);
        assert_eq!(system.registry().get("/mods/a.js").unwrap().id(), "a");
    }

    #[test]
    fn test_custom_resolver_is_consulted() {
        struct AliasResolver;

        impl AddressResolver for AliasResolver {
            fn resolve(&self, id: &str, _base: &str) -> String {
                format!("/alias/{id}.js")
            }
        }

        let system = Arc::new(ModuleSystem::new().with_resolver(AliasResolver));
        system.define(value_call("tools")).unwrap();
        system.complete_load("/alias/tools.js").unwrap();

        let require = system.require_root();
        assert_eq!(require.resolve("tools"), "/alias/tools.js");
        assert!(require.call("tools").is_some());
    }

    #[test]
    fn test_define_rejects_exports_assignment_before_registering() {
        let system = ModuleSystem::new();
        let call = DefineCall::Anonymous(Factory::function(
            "function(require, exports) { exports = {}; }",
            |_require, _exports, _record| None,
        ));

        assert!(system.define(call).is_err());
        assert!(system.pending().is_empty());
        assert!(system.registry().is_empty());
    }
}
