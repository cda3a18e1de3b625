// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Error types for the module runtime

use thiserror::Error;

/// Result type for module runtime operations
pub type Result<T> = std::result::Result<T, ModuleError>;

/// Errors that can occur in the module runtime
///
/// Only definition-time problems are errors. Everything that can go wrong
/// while requiring a module (unknown address, failed load, malformed
/// source) surfaces as a `None` exports value or a non-fatal diagnostic,
/// never through this type.
#[derive(Debug, Error)]
pub enum ModuleError {
    /// A factory's source reassigns the `exports` binding
    #[error(
        "invalid factory for module '{id}': reassigns 'exports' (mutate the exports object or return a value instead)"
    )]
    ExportsAssignment {
        /// Declared module id, empty for anonymous modules
        id: String,
    },
}
