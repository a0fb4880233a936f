//! Pointer-to-frame resolution
//!
//! The resolver maps one raw return address to one or more frames by
//! querying the runtime's symbol/debug table. One machine address can
//! correspond to a whole chain of calls that inlining collapsed into a
//! single instruction address; each entry of the chain becomes a frame,
//! innermost logical call first.

use crate::frame::Frame;
use crate::symbol::Sym;
use crate::types::{SpecMeta, TypeDesc};
use std::sync::Weak;

/// One row the symbol table yields for an address.
///
/// Rows arrive loosely shaped: debug info can be partial or stale, so the
/// required fields are optional here and a row missing any of them is
/// treated as "no information".
#[derive(Debug, Clone, Default)]
pub struct RawSymbolRecord {
    /// Name of the function containing the address.
    pub function: Option<String>,
    /// Source file path.
    pub file: Option<String>,
    /// 1-based line number.
    pub line: Option<i64>,
    /// Handle to the compiled-function metadata, when known.
    pub metadata: Option<Weak<SpecMeta>>,
    /// Explicit parameter-type signature, when known.
    pub spec_signature: Option<Vec<TypeDesc>>,
    /// True for non-managed code.
    pub from_native: bool,
    /// True if the table itself knows this entry was inlined.
    pub inlined: bool,
    /// Address adjusted to the entry (may differ from the queried one).
    pub adjusted_pointer: u64,
}

/// The runtime's symbol/debug table, queried per address.
///
/// Implementations must be safe for concurrent read access if traces are
/// captured from multiple threads; any caching is the table's concern.
pub trait SymbolSource {
    /// All records for an address, innermost logical call first. Empty
    /// means the address is unresolvable.
    fn records(&self, addr: u64) -> Vec<RawSymbolRecord>;
}

/// Maps raw return addresses to frames via a [`SymbolSource`].
pub struct Resolver<'a> {
    source: &'a dyn SymbolSource,
}

impl<'a> Resolver<'a> {
    pub fn new(source: &'a dyn SymbolSource) -> Resolver<'a> {
        Resolver { source }
    }

    /// Resolve one address into its frame chain, innermost first.
    ///
    /// Every entry of the chain except the outermost is marked inlined,
    /// whatever the table reported; the outermost keeps the table's flag.
    /// A malformed record becomes the unknown sentinel rather than an
    /// error, and an unresolvable address yields the sentinel alone.
    pub fn lookup(&self, addr: u64) -> Vec<Frame> {
        let records = self.source.records(addr);
        if records.is_empty() {
            return vec![Frame::unknown()];
        }
        let last = records.len() - 1;
        records
            .into_iter()
            .enumerate()
            .map(|(i, record)| frame_from_record(record, i < last))
            .collect()
    }
}

/// Build a frame from one table row, substituting the unknown sentinel
/// when the row is missing a required field.
fn frame_from_record(record: RawSymbolRecord, inlined_by_position: bool) -> Frame {
    let (function, file, line) = match (record.function, record.file, record.line) {
        (Some(function), Some(file), Some(line)) => (function, file, line),
        _ => return Frame::unknown(),
    };
    Frame::new(
        Sym::intern(&function),
        Sym::intern(&file),
        line,
        record.metadata,
        record.spec_signature,
        record.from_native,
        record.inlined || inlined_by_position,
        record.adjusted_pointer,
    )
}
