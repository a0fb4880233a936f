//! Frame data model
//!
//! A `Frame` is one execution context in a stack trace: the function and
//! source location it reports, flags for native and inlined code, and the
//! raw return address it was resolved from. Frames are immutable once
//! constructed; they are created by the resolver (from a raw pointer) or by
//! the codec (from wire bytes) and consumed read-only everywhere else.
//!
//! Equality and hashing are defined over exactly (function, file, line,
//! from_native). The same logical call site can be captured with different
//! metadata references or raw addresses across invocations or processes
//! (recompilation, different inlining), so identity for deduplication is the
//! reported location, not low-level identity. Note one literal consequence:
//! for unknown-class frames where `line` has been repurposed to carry
//! positional information, two syntactically different frames compare equal
//! whenever those values coincide. Downstream deduplication relies on this,
//! so it stays.

use crate::symbol::Sym;
use crate::types::{SpecMeta, TypeDesc};
use serde::Serialize;
use std::hash::{Hash, Hasher};
use std::sync::{OnceLock, Weak};

/// Line value meaning "unknown".
pub const UNKNOWN_LINE: i64 = -1;

/// Raw-pointer value of the unknown sentinel (the 64-bit pattern of -1).
pub const UNKNOWN_POINTER: u64 = u64::MAX;

/// Schema version of the diagnostic JSON form.
pub const TRACE_JSON_VERSION: u32 = 1;

/// An ordered sequence of frames, innermost (most recent) context first.
pub type Trace = Vec<Frame>;

/// One execution context in a stack trace.
#[derive(Debug, Clone)]
pub struct Frame {
    /// Function containing the context. Empty when unresolved.
    function: Sym,
    /// Source file path. May be synthetic.
    file: Sym,
    /// 1-based line number; -1 when unknown.
    line: i64,
    /// Weak link to the compiled-function metadata, when the runtime could
    /// resolve one. Never owned by the frame.
    metadata_ref: Option<Weak<SpecMeta>>,
    /// Parameter-type signature used for display when the metadata is
    /// absent or carries no specialization records.
    spec_signature: Option<Vec<TypeDesc>>,
    /// True for non-managed (native) code.
    from_native: bool,
    /// True if this frame was inlined into its caller.
    inlined: bool,
    /// Original return-address value, widened to 64 bits so traces captured
    /// in a 32-bit process survive transfer to a 64-bit one.
    raw_pointer: u64,
}

static UNKNOWN: OnceLock<Frame> = OnceLock::new();

impl Frame {
    /// Create a frame. This is the only constructor; all fields are fixed
    /// at creation.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        function: Sym,
        file: Sym,
        line: i64,
        metadata_ref: Option<Weak<SpecMeta>>,
        spec_signature: Option<Vec<TypeDesc>>,
        from_native: bool,
        inlined: bool,
        raw_pointer: u64,
    ) -> Frame {
        Frame {
            function,
            file,
            line,
            metadata_ref,
            spec_signature,
            from_native,
            inlined,
            raw_pointer,
        }
    }

    /// The shared unknown sentinel: "this pointer produced no resolvable
    /// info". Built once per process.
    pub fn unknown() -> Frame {
        UNKNOWN
            .get_or_init(|| {
                Frame::new(
                    Sym::empty(),
                    Sym::empty(),
                    UNKNOWN_LINE,
                    None,
                    None,
                    false,
                    false,
                    UNKNOWN_POINTER,
                )
            })
            .clone()
    }

    /// Whether this frame carries no resolved information.
    pub fn is_unknown(&self) -> bool {
        *self == Frame::unknown()
    }

    pub fn function(&self) -> &Sym {
        &self.function
    }

    pub fn file(&self) -> &Sym {
        &self.file
    }

    pub fn line(&self) -> i64 {
        self.line
    }

    pub fn metadata_ref(&self) -> Option<&Weak<SpecMeta>> {
        self.metadata_ref.as_ref()
    }

    pub fn spec_signature(&self) -> Option<&[TypeDesc]> {
        self.spec_signature.as_deref()
    }

    pub fn from_native(&self) -> bool {
        self.from_native
    }

    pub fn inlined(&self) -> bool {
        self.inlined
    }

    pub fn raw_pointer(&self) -> u64 {
        self.raw_pointer
    }

    /// Diagnostic JSON form of this frame. Metadata and signatures are
    /// process-local and excluded.
    pub fn to_json_string(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(&FrameJson::from(self))
    }
}

/// Equality over exactly (function, file, line, from_native); see the
/// module docs for why the other fields are excluded.
impl PartialEq for Frame {
    fn eq(&self, other: &Self) -> bool {
        self.line == other.line
            && self.from_native == other.from_native
            && self.function == other.function
            && self.file == other.file
    }
}

impl Eq for Frame {}

/// Hash over the same four fields as equality.
impl Hash for Frame {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.function.hash(state);
        self.file.hash(state);
        self.line.hash(state);
        self.from_native.hash(state);
    }
}

#[derive(Serialize)]
struct FrameJson<'a> {
    function: &'a str,
    file: &'a str,
    line: i64,
    from_native: bool,
    inlined: bool,
    raw_pointer: u64,
}

impl<'a> From<&'a Frame> for FrameJson<'a> {
    fn from(frame: &'a Frame) -> Self {
        FrameJson {
            function: frame.function.as_str(),
            file: frame.file.as_str(),
            line: frame.line,
            from_native: frame.from_native,
            inlined: frame.inlined,
            raw_pointer: frame.raw_pointer,
        }
    }
}

#[derive(Serialize)]
struct TraceJson<'a> {
    version: u32,
    frames: Vec<FrameJson<'a>>,
}

/// Diagnostic JSON form of a whole trace, innermost frame first.
pub fn trace_to_json_string(trace: &[Frame]) -> Result<String, serde_json::Error> {
    serde_json::to_string(&TraceJson {
        version: TRACE_JSON_VERSION,
        frames: trace.iter().map(FrameJson::from).collect(),
    })
}
