// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Resolution contexts for cycle detection

use std::sync::Arc;

/// One link in an in-flight require chain.
///
/// Every bound require function carries a context naming the module it
/// belongs to and the context that created it. Walking the chain from leaf
/// to root lists exactly the addresses currently being instantiated, which
/// is all the state cycle detection needs. Contexts are immutable and
/// ephemeral; they live only as long as the require calls that hold them.
#[derive(Debug)]
pub struct ResolutionContext {
    /// Resolved address of the module this context belongs to, empty for
    /// the top-level caller
    uri: String,
    /// Context that issued the require call that created this one
    parent: Option<Arc<ResolutionContext>>,
}

impl ResolutionContext {
    /// Top-level context: no address, no parent.
    pub fn root() -> Arc<Self> {
        Arc::new(Self {
            uri: String::new(),
            parent: None,
        })
    }

    /// Child context for a module entering instantiation.
    pub fn child(self: &Arc<Self>, uri: impl Into<String>) -> Arc<Self> {
        Arc::new(Self {
            uri: uri.into(),
            parent: Some(Arc::clone(self)),
        })
    }

    /// Address this context is bound to.
    pub fn uri(&self) -> &str {
        &self.uri
    }

    /// Context that created this one, if any.
    pub fn parent(&self) -> Option<&Arc<ResolutionContext>> {
        self.parent.as_ref()
    }

    /// True if `uri` appears anywhere on the chain, leaf to root.
    ///
    /// Iterative on purpose: chains can get as deep as the dependency graph
    /// and must not cost stack frames.
    pub fn contains(&self, uri: &str) -> bool {
        let mut current = Some(self);
        while let Some(context) = current {
            if context.uri == uri {
                return true;
            }
            current = context.parent.as_deref();
        }
        false
    }
}
