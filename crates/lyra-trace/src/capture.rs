//! Trace assembly and self-trimming
//!
//! Turns a raw pointer sequence into an ordered trace: resolve every
//! pointer, filter native frames unless asked to keep them, then cut the
//! tracing machinery's own frames off the head so the trace starts at user
//! code. The two public entry points, [`capture_trace`] and
//! [`failure_trace`], use their own function names as the cut markers; the
//! marker frame is produced by the very routine doing the trimming, so its
//! absence is a contract violation and fails loudly.

use crate::frame::Trace;
use crate::resolver::Resolver;
use thiserror::Error;

/// Function names of the capture entry points, used as trim markers.
pub const CAPTURE_MARKERS: &[&str] = &["capture_trace", "failure_trace"];

/// The native unwinder: walks a call stack and yields raw return
/// addresses, innermost frame first. External to this crate.
pub trait Unwinder {
    /// Return addresses of the current call stack.
    fn backtrace(&self) -> Vec<u64>;

    /// Return addresses captured at the most recently thrown unhandled
    /// failure, for post-mortem reporting.
    fn last_failure_backtrace(&self) -> Vec<u64>;
}

/// Errors from trace assembly.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum TraceError {
    /// No frame in the trace matched a trim marker. The capture routine
    /// guarantees its own frame is present, so this is a broken contract,
    /// not a recoverable condition.
    #[error("no tracer marker frame found; expected one of {names:?}")]
    MarkerNotFound { names: Vec<String> },
}

/// Capture a fresh trace of the current call stack.
pub fn capture_trace(
    unwinder: &dyn Unwinder,
    resolver: &Resolver<'_>,
    include_native: bool,
) -> Result<Trace, TraceError> {
    build_trace(resolver, &unwinder.backtrace(), include_native, CAPTURE_MARKERS)
}

/// Assemble a trace of the most recent unhandled failure's stack.
pub fn failure_trace(
    unwinder: &dyn Unwinder,
    resolver: &Resolver<'_>,
    include_native: bool,
) -> Result<Trace, TraceError> {
    build_trace(
        resolver,
        &unwinder.last_failure_backtrace(),
        include_native,
        CAPTURE_MARKERS,
    )
}

/// Assemble a trace from an already-captured pointer sequence.
///
/// Resolves each pointer in order (flattening inline chains, order
/// preserved), drops native frames unless `include_native`, then trims at
/// the given marker names.
pub fn build_trace(
    resolver: &Resolver<'_>,
    raw_pointers: &[u64],
    include_native: bool,
    markers: &[&str],
) -> Result<Trace, TraceError> {
    let mut trace: Trace = raw_pointers
        .iter()
        .flat_map(|&addr| resolver.lookup(addr))
        .collect();
    if !include_native {
        trace.retain(|frame| !frame.from_native());
    }
    trim_tracer_frames(trace, markers)
}

/// Remove the tracing machinery's own frames from the head of a trace.
///
/// Finds the highest-index frame whose function is one of `names` and
/// removes it together with everything before it, leaving only the frames
/// strictly below the tracer in the logical stack. Fails with
/// [`TraceError::MarkerNotFound`] when no frame matches; silently keeping
/// (or emptying) the trace would hand the caller the tracer's own frames.
pub fn trim_tracer_frames(mut trace: Trace, names: &[&str]) -> Result<Trace, TraceError> {
    let found = trace
        .iter()
        .rposition(|frame| names.contains(&frame.function().as_str()));
    match found {
        Some(index) => {
            trace.drain(0..=index);
            Ok(trace)
        }
        None => Err(TraceError::MarkerNotFound {
            names: names.iter().map(|name| name.to_string()).collect(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::Frame;
    use crate::resolver::{RawSymbolRecord, SymbolSource};
    use crate::symbol::Sym;
    use std::collections::HashMap;

    struct FakeTable {
        rows: HashMap<u64, Vec<RawSymbolRecord>>,
    }

    impl SymbolSource for FakeTable {
        fn records(&self, addr: u64) -> Vec<RawSymbolRecord> {
            self.rows.get(&addr).cloned().unwrap_or_default()
        }
    }

    fn record(function: &str, file: &str, line: i64, ptr: u64) -> RawSymbolRecord {
        RawSymbolRecord {
            function: Some(function.to_string()),
            file: Some(file.to_string()),
            line: Some(line),
            adjusted_pointer: ptr,
            ..RawSymbolRecord::default()
        }
    }

    fn frame(function: &str, file: &str, line: i64) -> Frame {
        Frame::new(
            Sym::intern(function),
            Sym::intern(file),
            line,
            None,
            None,
            false,
            false,
            0,
        )
    }

    #[test]
    fn test_build_resolves_filters_and_trims() {
        let table = FakeTable {
            rows: HashMap::from([
                (0x1, vec![record("computeSum", "math.lyra", 42, 0x1)]),
                (0x2, vec![record("capture_trace", "capture.rs", 10, 0x2)]),
            ]),
        };
        let resolver = Resolver::new(&table);
        let trace =
            build_trace(&resolver, &[0x1, 0x2], false, CAPTURE_MARKERS).expect("marker present");
        assert_eq!(trace, vec![frame("computeSum", "math.lyra", 42)]);
    }

    #[test]
    fn test_native_frames_dropped_by_default() {
        let mut native = record("memcpy", "libc.so", 0, 0x3);
        native.from_native = true;
        let table = FakeTable {
            rows: HashMap::from([
                (0x3, vec![native]),
                (0x4, vec![record("capture_trace", "capture.rs", 10, 0x4)]),
            ]),
        };
        let resolver = Resolver::new(&table);
        let trace =
            build_trace(&resolver, &[0x3, 0x4], false, CAPTURE_MARKERS).expect("marker present");
        assert!(trace.is_empty());

        let kept =
            build_trace(&resolver, &[0x3, 0x4], true, CAPTURE_MARKERS).expect("marker present");
        assert_eq!(kept.len(), 1);
        assert!(kept[0].from_native());
    }

    #[test]
    fn test_trim_cuts_at_outermost_marker() {
        // Two marker frames: the cut happens at the outermost one, not the
        // first one scanned.
        let trace = vec![
            frame("failure_trace", "capture.rs", 90),
            frame("capture_trace", "capture.rs", 40),
            frame("userCode", "main.lyra", 3),
        ];
        let trimmed = trim_tracer_frames(trace, CAPTURE_MARKERS).expect("marker present");
        assert_eq!(trimmed, vec![frame("userCode", "main.lyra", 3)]);
    }

    #[test]
    fn test_trim_removes_strict_prefix() {
        let before = vec![
            frame("capture_trace", "capture.rs", 40),
            frame("userCode", "main.lyra", 3),
            frame("main", "main.lyra", 1),
        ];
        let after = trim_tracer_frames(before.clone(), CAPTURE_MARKERS).expect("marker present");
        assert_eq!(after.len(), 2);
        assert_eq!(after[..], before[1..]);
    }

    #[test]
    fn test_trim_fails_loudly_without_marker() {
        let trace = vec![frame("userCode", "main.lyra", 3)];
        let err = trim_tracer_frames(trace, CAPTURE_MARKERS).expect_err("no marker");
        assert_eq!(
            err,
            TraceError::MarkerNotFound {
                names: vec!["capture_trace".to_string(), "failure_trace".to_string()],
            }
        );
    }

    #[test]
    fn test_capture_and_failure_use_their_own_sequences() {
        struct FakeUnwinder;
        impl Unwinder for FakeUnwinder {
            fn backtrace(&self) -> Vec<u64> {
                vec![0x2, 0x1]
            }
            fn last_failure_backtrace(&self) -> Vec<u64> {
                vec![0x2, 0x5, 0x1]
            }
        }
        let table = FakeTable {
            rows: HashMap::from([
                (0x1, vec![record("main", "main.lyra", 1, 0x1)]),
                (0x2, vec![record("capture_trace", "capture.rs", 10, 0x2)]),
                (0x5, vec![record("throwingFn", "main.lyra", 9, 0x5)]),
            ]),
        };
        let resolver = Resolver::new(&table);

        let live = capture_trace(&FakeUnwinder, &resolver, false).expect("marker present");
        assert_eq!(live, vec![frame("main", "main.lyra", 1)]);

        // The failure stack still starts at the capture machinery; the
        // throwing frame sits just below the cut point and survives.
        let post = failure_trace(&FakeUnwinder, &resolver, false).expect("marker present");
        assert_eq!(
            post,
            vec![frame("throwingFn", "main.lyra", 9), frame("main", "main.lyra", 1)]
        );
    }
}
