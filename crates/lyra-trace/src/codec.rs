//! Cross-process wire format for frames
//!
//! Lets a trace captured on one machine be decoded on another, whatever
//! either side's pointer width. The layout is fixed and big-endian:
//!
//! ```text
//! u32 function-len | function UTF-8 | u32 file-len | file UTF-8 |
//! i64 line | u8 from_native | u64 raw_pointer
//! ```
//!
//! `line` and `raw_pointer` are written at full 64-bit width even by
//! 32-bit producers, so round-trips are lossless. `metadata_ref` and
//! `spec_signature` reference process-local state (types, compiled code)
//! and are never transmitted; decoded frames have both absent. The
//! `inlined` flag is not on the wire either — a drift inherited from the
//! original field list, kept so the two sides of existing deployments keep
//! agreeing — and always decodes to `false`.

use crate::frame::Frame;
use crate::symbol::Sym;
use thiserror::Error;

/// Errors from decoding wire bytes. Decoding never yields a
/// partially-populated frame.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DecodeError {
    /// Input ended inside the named field.
    #[error("unexpected end of input while reading {0}")]
    UnexpectedEof(&'static str),
    /// A name field held invalid UTF-8.
    #[error("invalid UTF-8 in {0}")]
    InvalidUtf8(&'static str),
    /// Bytes remained after a complete frame.
    #[error("{0} trailing bytes after frame")]
    TrailingBytes(usize),
}

/// Encode one frame into wire bytes.
pub fn encode(frame: &Frame) -> Vec<u8> {
    let function = frame.function().as_str().as_bytes();
    let file = frame.file().as_str().as_bytes();
    let mut bytes = Vec::with_capacity(4 + function.len() + 4 + file.len() + 8 + 1 + 8);
    bytes.extend_from_slice(&(function.len() as u32).to_be_bytes());
    bytes.extend_from_slice(function);
    bytes.extend_from_slice(&(file.len() as u32).to_be_bytes());
    bytes.extend_from_slice(file);
    bytes.extend_from_slice(&frame.line().to_be_bytes());
    bytes.push(u8::from(frame.from_native()));
    bytes.extend_from_slice(&frame.raw_pointer().to_be_bytes());
    bytes
}

/// Decode exactly one frame; trailing bytes are an error.
pub fn decode(bytes: &[u8]) -> Result<Frame, DecodeError> {
    let (frame, consumed) = decode_frame(bytes)?;
    if consumed < bytes.len() {
        return Err(DecodeError::TrailingBytes(bytes.len() - consumed));
    }
    Ok(frame)
}

/// Decode one frame from the head of a byte stream, returning the frame
/// and the number of bytes consumed.
pub fn decode_frame(bytes: &[u8]) -> Result<(Frame, usize), DecodeError> {
    let mut offset = 0;
    let function = read_name(bytes, &mut offset, "function name")?;
    let file = read_name(bytes, &mut offset, "file name")?;
    let line = i64::from_be_bytes(read_array(bytes, &mut offset, "line")?);
    let from_native = read_array::<1>(bytes, &mut offset, "from_native flag")?[0] != 0;
    let raw_pointer = u64::from_be_bytes(read_array(bytes, &mut offset, "raw pointer")?);
    let frame = Frame::new(
        Sym::intern(&function),
        Sym::intern(&file),
        line,
        None,
        None,
        from_native,
        false,
        raw_pointer,
    );
    Ok((frame, offset))
}

fn read_array<const N: usize>(
    bytes: &[u8],
    offset: &mut usize,
    what: &'static str,
) -> Result<[u8; N], DecodeError> {
    let end = offset
        .checked_add(N)
        .filter(|&end| end <= bytes.len())
        .ok_or(DecodeError::UnexpectedEof(what))?;
    let mut out = [0u8; N];
    out.copy_from_slice(&bytes[*offset..end]);
    *offset = end;
    Ok(out)
}

fn read_name(
    bytes: &[u8],
    offset: &mut usize,
    what: &'static str,
) -> Result<String, DecodeError> {
    let len = u32::from_be_bytes(read_array(bytes, offset, what)?) as usize;
    let end = offset
        .checked_add(len)
        .filter(|&end| end <= bytes.len())
        .ok_or(DecodeError::UnexpectedEof(what))?;
    let name = std::str::from_utf8(&bytes[*offset..end])
        .map_err(|_| DecodeError::InvalidUtf8(what))?
        .to_string();
    *offset = end;
    Ok(name)
}
