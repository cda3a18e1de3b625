// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! # mooring
//!
//! A lazy module-definition and dependency-resolution runtime.
//!
//! Script code declares itself as a named, dependency-bearing module through
//! [`ModuleSystem::define`]; other code requests that module's exported
//! value on demand through a bound [`Require`]. The runtime instantiates
//! each module exactly once, keyed by its resolved address, and detects
//! cyclic requires with a best-effort partial result instead of a hard
//! failure.
//!
//! What stays outside: fetching module source, the policy that maps ids to
//! canonical addresses, and environment detection are collaborators behind
//! narrow traits ([`ModuleFetcher`], [`AddressResolver`],
//! [`ScriptEnvironment`]). `require` itself never waits: a module whose
//! record has not arrived yet is simply unavailable (`None`).
//!
//! ## Quick start
//!
//! ```
//! use mooring::{DefineCall, Factory, ModuleSystem, Value};
//! use std::sync::Arc;
//!
//! let system = Arc::new(ModuleSystem::new());
//!
//! // A loaded script declares itself; the loader supplies the address
//! // once the enclosing script finishes loading.
//! system.define(DefineCall::Anonymous(Factory::function(
//!     "function(require, exports) { exports.greet = 'ahoy'; }",
//!     |_require, exports, _record| {
//!         exports.set("greet", Value::String("ahoy".into()));
//!         None
//!     },
//! )))?;
//! system.complete_load("/mods/greeting.js").unwrap();
//!
//! let require = system.require_root();
//! let greeting = require.call("/mods/greeting.js").unwrap();
//! assert_eq!(greeting.get("greet"), Some(Value::String("ahoy".into())));
//! # Ok::<(), mooring::ModuleError>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod context;
pub mod define;
pub mod diagnostics;
pub mod error;
pub mod loader;
pub mod module;
pub mod registry;
pub mod require;
pub mod resolver;
pub mod scan;
pub mod system;
pub mod value;

// Re-exports
pub use context::ResolutionContext;
pub use define::DefineCall;
pub use diagnostics::{CollectingSink, DiagnosticSink, Severity, TracingSink, Warning};
pub use error::{ModuleError, Result};
pub use loader::{
    DetachedEnvironment, LoadCallback, ModuleFetcher, PendingSlot, ScriptEnvironment,
};
pub use module::{Factory, FactoryFn, ModuleDescriptor, ModuleRecord, ScriptFunction};
pub use registry::ModuleRegistry;
pub use require::Require;
pub use resolver::{AddressResolver, UrlResolver};
pub use system::{ModuleSystem, Registration};
pub use value::{ObjectRef, Value};

/// Version of the mooring runtime
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
