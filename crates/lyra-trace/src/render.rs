//! Frame display formatting
//!
//! Renders a frame as ` in <signature> at <file>:<line>[ [inlined]]`.
//! The signature reconstructs a readable call from specialization
//! metadata when the frame still links to some: the first parameter type
//! of a specialization names the callee, and the remaining parameter
//! types print as `::T`.

use crate::frame::Frame;
use crate::types::TypeDesc;
use std::fmt::Write;

/// Placeholder printed for the empty unresolved function name.
const UNRESOLVED_NAME: &str = "?";

/// Where the parameter-type list for a signature comes from. Resolved
/// once per render; the two sources are never mixed.
enum SigSource<'a> {
    /// The metadata's own specialization records.
    FromMetadata(&'a [TypeDesc]),
    /// The frame's explicit signature, for frames whose metadata carries
    /// no type records.
    Explicit(&'a [TypeDesc]),
    /// No list obtainable at all.
    Unavailable,
}

/// Render one frame as display text. Pure: same frame and flag, same text.
///
/// `full_path` prints the file path verbatim; otherwise only its base name.
pub fn render(frame: &Frame, full_path: bool) -> String {
    let mut out = String::new();
    out.push_str(" in ");
    out.push_str(&signature(frame));
    out.push_str(" at ");
    let file = frame.file().as_str();
    out.push_str(if full_path { file } else { base_name(file) });
    let _ = write!(out, ":{}", frame.line());
    if frame.inlined() {
        out.push_str(" [inlined]");
    }
    out
}

/// Derive the call-signature text for a frame.
fn signature(frame: &Frame) -> String {
    // A dropped metadata target renders like an absent one.
    let meta = frame.metadata_ref().and_then(|weak| weak.upgrade());
    let meta = match meta {
        Some(meta) => meta,
        None => {
            return if frame.function().is_empty() {
                UNRESOLVED_NAME.to_string()
            } else {
                frame.function().to_string()
            };
        }
    };

    let source = match (meta.param_types.as_deref(), frame.spec_signature()) {
        (Some(params), _) => SigSource::FromMetadata(params),
        (None, Some(params)) => SigSource::Explicit(params),
        (None, None) => SigSource::Unavailable,
    };

    let params = match source {
        SigSource::FromMetadata(params) | SigSource::Explicit(params) => params,
        SigSource::Unavailable => return meta.name.to_string(),
    };
    // An empty list has no callee slot; fall back to the recorded name.
    let (callee, rest) = match params.split_first() {
        Some(split) => split,
        None => return meta.name.to_string(),
    };

    let mut out = callee_display(callee);
    out.push('(');
    for (i, param) in rest.iter().enumerate() {
        if i > 0 {
            out.push_str(", ");
        }
        let _ = write!(out, "::{}", param);
    }
    out.push(')');
    out
}

/// How the callee type itself prints, in priority order:
/// a named function bound in its defining scope, a construction call
/// through a concrete type, or an anonymous callee.
fn callee_display(callee: &TypeDesc) -> String {
    match callee {
        TypeDesc::Function {
            dispatch_name,
            field_count: 0,
            scope_binding: Some(binding),
            ..
        } if binding.name == *dispatch_name && binding.ty == *callee => dispatch_name.to_string(),
        TypeDesc::TypeOf(inner) if inner.is_concrete() => inner.to_string(),
        other => format!("(::{})", other),
    }
}

/// Final component of a path, for either separator style.
fn base_name(path: &str) -> &str {
    path.rsplit(['/', '\\']).next().unwrap_or(path)
}
