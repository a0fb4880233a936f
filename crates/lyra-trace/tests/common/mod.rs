//! Shared mocks for the integration suites: a scripted symbol table and
//! a scripted unwinder.

use lyra_trace::{RawSymbolRecord, SymbolSource, Unwinder};
use std::collections::HashMap;

/// Symbol table scripted per address.
pub struct ScriptedTable {
    rows: HashMap<u64, Vec<RawSymbolRecord>>,
}

impl ScriptedTable {
    pub fn new(rows: impl IntoIterator<Item = (u64, Vec<RawSymbolRecord>)>) -> ScriptedTable {
        ScriptedTable {
            rows: rows.into_iter().collect(),
        }
    }
}

impl SymbolSource for ScriptedTable {
    fn records(&self, addr: u64) -> Vec<RawSymbolRecord> {
        self.rows.get(&addr).cloned().unwrap_or_default()
    }
}

/// Unwinder scripted with fixed pointer sequences, innermost first.
pub struct ScriptedUnwinder {
    pub current: Vec<u64>,
    pub last_failure: Vec<u64>,
}

impl Unwinder for ScriptedUnwinder {
    fn backtrace(&self) -> Vec<u64> {
        self.current.clone()
    }

    fn last_failure_backtrace(&self) -> Vec<u64> {
        self.last_failure.clone()
    }
}

/// A well-formed managed-code record.
pub fn record(function: &str, file: &str, line: i64, ptr: u64) -> RawSymbolRecord {
    RawSymbolRecord {
        function: Some(function.to_string()),
        file: Some(file.to_string()),
        line: Some(line),
        adjusted_pointer: ptr,
        ..RawSymbolRecord::default()
    }
}

/// A well-formed native-code record.
pub fn native_record(function: &str, file: &str, line: i64, ptr: u64) -> RawSymbolRecord {
    RawSymbolRecord {
        from_native: true,
        ..record(function, file, line, ptr)
    }
}
