use std::sync::{Arc, Mutex};

use serde::Serialize;
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuditStatus {
    Fail,
    Success,
}

/// One finalized compliance log entry. Metadata is an ordered append-only
/// list: re-adding a key appends a second entry, it never replaces the
/// first - the log consumer treats the latest entry for a key as
/// authoritative.
#[derive(Debug, Clone)]
pub struct AuditEntry {
    pub operation: String,
    pub status: AuditStatus,
    pub meta: Vec<(String, Value)>,
}

/// Destination for finalized audit entries
pub trait AuditSink: Send + Sync {
    fn log(&self, entry: AuditEntry);
}

/// Production sink: structured events under the `audit` tracing target
pub struct TracingAuditSink;

impl AuditSink for TracingAuditSink {
    fn log(&self, entry: AuditEntry) {
        let meta = serde_json::to_string(&entry.meta).unwrap_or_default();
        let status = match entry.status {
            AuditStatus::Success => "success",
            AuditStatus::Fail => "fail",
        };
        tracing::info!(target: "audit", operation = %entry.operation, status, meta = %meta);
    }
}

/// Sink that retains entries in memory so tests can assert on them
#[derive(Default)]
pub struct CapturingAuditSink {
    entries: Mutex<Vec<AuditEntry>>,
}

impl CapturingAuditSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> Vec<AuditEntry> {
        self.entries.lock().unwrap().clone()
    }
}

impl AuditSink for CapturingAuditSink {
    fn log(&self, entry: AuditEntry) {
        self.entries.lock().unwrap().push(entry);
    }
}

/// In-flight audit record for one request attempt.
///
/// Created with status Fail; `success()` flips it once the mutating call
/// has gone through. The record is emitted to its sink from `drop`, so
/// every exit path - early validation return, permission denial, upstream
/// error, panic - produces exactly one entry without the handler having to
/// remember a finalize call.
pub struct AuditRecord {
    entry: Option<AuditEntry>,
    sink: Arc<dyn AuditSink>,
}

impl AuditRecord {
    pub(crate) fn begin(operation: &str, sink: Arc<dyn AuditSink>) -> Self {
        Self {
            entry: Some(AuditEntry {
                operation: operation.to_string(),
                status: AuditStatus::Fail,
                meta: Vec::new(),
            }),
            sink,
        }
    }

    /// Append a metadata entry. Reusing a key is allowed; both entries are
    /// preserved in emission order.
    pub fn add_meta<T: Serialize>(&mut self, key: &str, value: &T) {
        let value = match serde_json::to_value(value) {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!("failed to serialize audit meta '{}': {}", key, e);
                Value::Null
            }
        };

        if let Some(entry) = self.entry.as_mut() {
            entry.meta.push((key.to_string(), value));
        }
    }

    /// Mark the attempt as successful; without this call the record is
    /// emitted with status Fail.
    pub fn success(&mut self) {
        if let Some(entry) = self.entry.as_mut() {
            entry.status = AuditStatus::Success;
        }
    }
}

impl Drop for AuditRecord {
    fn drop(&mut self) {
        if let Some(entry) = self.entry.take() {
            self.sink.log(entry);
        }
    }
}
