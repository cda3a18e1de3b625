// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Non-fatal diagnostics reporting

use parking_lot::Mutex;

/// Severity of a reported diagnostic
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Best-effort recovery happened; execution continues
    Warn,
    /// The host should surface this, but the runtime does not abort
    Error,
}

/// A non-fatal diagnostic emitted by the module runtime
///
/// Cyclic requires, advisory re-validation hits and registration anomalies
/// all land here. Fatal definition-time problems go through
/// [`ModuleError`](crate::error::ModuleError) instead.
#[derive(Debug, Clone)]
pub struct Warning {
    /// Human-readable description
    pub message: String,
    /// Component that raised the diagnostic ("define" or "require")
    pub from: &'static str,
    /// Resolved address the diagnostic is about, empty if none applies
    pub address: String,
    /// Severity level
    pub severity: Severity,
}

/// Sink for non-fatal diagnostics
pub trait DiagnosticSink: Send + Sync {
    /// Receive one diagnostic; must not panic
    fn report(&self, warning: Warning);
}

/// Default sink: forwards diagnostics to `tracing`
#[derive(Debug, Default)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn report(&self, warning: Warning) {
        match warning.severity {
            Severity::Warn => tracing::warn!(
                from = warning.from,
                address = %warning.address,
                "{}",
                warning.message
            ),
            Severity::Error => tracing::error!(
                from = warning.from,
                address = %warning.address,
                "{}",
                warning.message
            ),
        }
    }
}

/// Sink that retains every diagnostic, for assertions in tests and tooling
#[derive(Debug, Default)]
pub struct CollectingSink {
    reports: Mutex<Vec<Warning>>,
}

impl CollectingSink {
    /// Create an empty collecting sink
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything reported so far
    pub fn reports(&self) -> Vec<Warning> {
        self.reports.lock().clone()
    }

    /// Number of diagnostics reported so far
    pub fn len(&self) -> usize {
        self.reports.lock().len()
    }

    /// True if nothing has been reported
    pub fn is_empty(&self) -> bool {
        self.reports.lock().is_empty()
    }
}

impl DiagnosticSink for CollectingSink {
    fn report(&self, warning: Warning) {
        self.reports.lock().push(warning);
    }
}
