// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Definition normalization: author-call shapes to canonical descriptors

use crate::error::{ModuleError, Result};
use crate::module::{Factory, ModuleDescriptor};
use crate::scan;

/// The shapes a `define` call can take.
///
/// The module authoring format overloads a single entry point; each overload
/// is one variant here, matched in declaration order (first match wins).
#[derive(Debug, Clone)]
pub enum DefineCall {
    /// `define(deps, factory)`: dependency list first, anonymous id
    Deps(Vec<String>, Factory),
    /// `define(factory)`: anonymous; dependencies discovered from a
    /// scripted factory's source text
    Anonymous(Factory),
    /// `define(id, deps?, factory)`: explicit id, optional list
    Named(String, Option<Vec<String>>, Factory),
}

/// Normalizes an author call into a canonical descriptor.
///
/// A scripted factory whose source reassigns `exports` is rejected here,
/// before the descriptor exists anywhere. This is the only fatal error in
/// the runtime and it is never deferred.
pub fn normalize(call: DefineCall) -> Result<ModuleDescriptor> {
    let (id, dependencies, factory) = match call {
        DefineCall::Deps(dependencies, factory) => (String::new(), dependencies, factory),
        DefineCall::Anonymous(factory) => {
            let dependencies = match factory.source() {
                Some(source) => scan::parse_dependencies(source),
                None => Vec::new(),
            };
            (String::new(), dependencies, factory)
        }
        DefineCall::Named(id, dependencies, factory) => {
            (id, dependencies.unwrap_or_default(), factory)
        }
    };

    if let Some(source) = factory.source() {
        if scan::has_exports_assignment(source) {
            return Err(ModuleError::ExportsAssignment { id });
        }
    }

    Ok(ModuleDescriptor {
        id,
        dependencies,
        factory,
    })
}
