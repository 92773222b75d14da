//! The pull-based byte source abstraction and the primitive decoders built on
//! top of it (§4.1 of the design).
//!
//! [`ByteSource`] is intentionally small and object-safe: a single-pass
//! `read`, a `discard` for skipping bytes without decoding them, best-effort
//! EOF detection, and a sticky flag for a transport error that occurred
//! during a previous read. [`Bounded`] restricts a source to the next *N*
//! bytes (used for every section and code-entry payload); [`Pushback`] allows
//! a single already-read byte to be re-presented (used for the one-byte
//! lookahead in [`BlockType`](crate::types::BlockType) decoding).

use crate::error::{DecodeError, Result};
use std::io;

/// A single-pass, pull-based byte stream.
pub trait ByteSource {
    /// Reads up to `dst.len()` bytes, returning the number actually read.
    /// A return value less than `dst.len()` means the source is at (or near)
    /// EOF, or that a transport error occurred — check [`ByteSource::take_error`].
    fn read(&mut self, dst: &mut [u8]) -> usize;

    /// Discards up to `n` bytes without exposing their contents. Returns
    /// `true` if all `n` bytes were discarded.
    fn discard(&mut self, n: usize) -> bool {
        let mut buf = [0u8; 256];
        let mut remaining = n;
        while remaining > 0 {
            let chunk = remaining.min(buf.len());
            let got = self.read(&mut buf[..chunk]);
            remaining -= got;
            if got < chunk {
                break;
            }
        }
        remaining == 0
    }

    /// Best-effort: `true` once the source believes it has no more bytes to
    /// give. Named "unreliable" because some sources (e.g. a growing pipe)
    /// cannot know for certain until the next read is attempted.
    fn unreliable_eof(&self) -> bool;

    /// Takes and clears a sticky transport error recorded during a previous
    /// `read`, if any. This is a diagnostic escape hatch only: decoders never
    /// branch on it, they treat every short read as [`DecodeError::UnexpectedEof`].
    fn take_error(&mut self) -> Option<io::Error> {
        None
    }
}

/// A [`ByteSource`] reading directly from an in-memory byte slice.
pub struct SliceSource<'a> {
    bytes: &'a [u8],
}

impl<'a> SliceSource<'a> {
    pub fn new(bytes: &'a [u8]) -> Self {
        Self { bytes }
    }
}

impl ByteSource for SliceSource<'_> {
    fn read(&mut self, dst: &mut [u8]) -> usize {
        let n = dst.len().min(self.bytes.len());
        let (head, tail) = self.bytes.split_at(n);
        dst[..n].copy_from_slice(head);
        self.bytes = tail;
        n
    }

    fn unreliable_eof(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// A [`ByteSource`] adapting any [`std::io::Read`], for streaming a module
/// from a file or socket instead of decoding it fully in memory first.
pub struct ReadSource<R> {
    reader: R,
    eof: bool,
    error: Option<io::Error>,
}

impl<R: io::Read> ReadSource<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            eof: false,
            error: None,
        }
    }
}

impl<R: io::Read> ByteSource for ReadSource<R> {
    fn read(&mut self, dst: &mut [u8]) -> usize {
        if dst.is_empty() {
            return 0;
        }
        let mut total = 0;
        while total < dst.len() {
            match self.reader.read(&mut dst[total..]) {
                Ok(0) => {
                    self.eof = true;
                    break;
                }
                Ok(n) => total += n,
                Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
                Err(err) => {
                    self.error = Some(err);
                    break;
                }
            }
        }
        total
    }

    fn unreliable_eof(&self) -> bool {
        self.eof
    }

    fn take_error(&mut self) -> Option<io::Error> {
        self.error.take()
    }
}

/// Restricts an inner source to at most `remaining` further bytes, reporting
/// EOF once that budget is exhausted regardless of what the inner source
/// still has to offer. Every section and code-entry payload is parsed
/// through one of these so that a successful decode can assert "no bytes
/// left unconsumed" as a postcondition.
pub struct Bounded<'a> {
    inner: &'a mut dyn ByteSource,
    remaining: usize,
}

impl<'a> Bounded<'a> {
    pub fn new(inner: &'a mut dyn ByteSource, size: usize) -> Self {
        Self {
            inner,
            remaining: size,
        }
    }

    /// Bytes not yet consumed out of the original budget.
    pub fn remaining(&self) -> usize {
        self.remaining
    }

    /// Reads every byte left in the budget as an unstructured blob, with no
    /// length prefix of its own. Used for section payloads whose tail is
    /// "whatever bytes are left", not a length-prefixed `vec(byte)` (e.g. the
    /// custom section's content after its name).
    pub fn read_remaining(&mut self) -> Result<Vec<u8>> {
        let mut out = vec![0u8; self.remaining];
        let n = self.read(&mut out);
        if n != out.len() {
            return Err(DecodeError::UnexpectedEof);
        }
        Ok(out)
    }
}

impl ByteSource for Bounded<'_> {
    fn read(&mut self, dst: &mut [u8]) -> usize {
        let cap = dst.len().min(self.remaining);
        let n = self.inner.read(&mut dst[..cap]);
        self.remaining -= n;
        n
    }

    fn unreliable_eof(&self) -> bool {
        self.remaining == 0 || self.inner.unreliable_eof()
    }

    fn take_error(&mut self) -> Option<io::Error> {
        self.inner.take_error()
    }
}

/// Allows a single already-read byte to be re-presented to the reader.
/// Sufficient for the one-byte lookahead that [`BlockType`](crate::types::BlockType)
/// decoding needs: peek a byte, and if it turns out to belong to a different
/// production, push it back before re-parsing.
pub struct Pushback<'a> {
    inner: &'a mut dyn ByteSource,
    pending: Option<u8>,
}

impl<'a> Pushback<'a> {
    pub fn new(inner: &'a mut dyn ByteSource) -> Self {
        Self {
            inner,
            pending: None,
        }
    }

    /// Re-presents `byte` as the next byte this source will yield.
    pub fn push_back(&mut self, byte: u8) {
        debug_assert!(self.pending.is_none(), "only one byte of pushback is supported");
        self.pending = Some(byte);
    }
}

impl ByteSource for Pushback<'_> {
    fn read(&mut self, dst: &mut [u8]) -> usize {
        if dst.is_empty() {
            return 0;
        }
        match self.pending.take() {
            Some(byte) => {
                dst[0] = byte;
                1 + self.inner.read(&mut dst[1..])
            }
            None => self.inner.read(dst),
        }
    }

    fn unreliable_eof(&self) -> bool {
        self.pending.is_none() && self.inner.unreliable_eof()
    }

    fn take_error(&mut self) -> Option<io::Error> {
        self.inner.take_error()
    }
}

/// The largest number of *elements* a vector-length prefix is allowed to
/// request per remaining byte of stream. A real vector entry is never
/// encoded in under this many bytes, so anything above this ratio can only
/// be a hostile or corrupt length prefix.
const MAX_ALLOCATION_RATIO: u64 = 1;

fn read_exact(src: &mut dyn ByteSource, buf: &mut [u8]) -> Result<()> {
    let n = src.read(buf);
    if n == buf.len() {
        Ok(())
    } else {
        Err(DecodeError::UnexpectedEof)
    }
}

/// Distinguishes a clean end of stream from a genuine transport error
/// surfacing through [`ByteSource::take_error`]: given the error from a just-failed
/// read, a clean EOF stays [`DecodeError::UnexpectedEof`], but if the source
/// recorded a real I/O error the caller's more specific `kind` (e.g.
/// [`DecodeError::ExpectedIndex`]) is reported instead, preserving "the
/// stream ended" vs. "the stream misbehaved" as distinct outcomes.
pub(crate) fn reclassify_eof(src: &mut dyn ByteSource, err: DecodeError, kind: DecodeError) -> DecodeError {
    if matches!(err, DecodeError::UnexpectedEof) && src.take_error().is_some() {
        kind
    } else {
        err
    }
}

/// Decodes a fixed-width little-endian `u8`.
pub fn decode_u8(src: &mut dyn ByteSource) -> Result<u8> {
    let mut buf = [0u8; 1];
    read_exact(src, &mut buf)?;
    Ok(buf[0])
}

/// Decodes a fixed-width little-endian `u32`.
pub fn decode_fixed_u32(src: &mut dyn ByteSource) -> Result<u32> {
    let mut buf = [0u8; 4];
    read_exact(src, &mut buf)?;
    Ok(u32::from_le_bytes(buf))
}

/// Decodes a fixed-width little-endian `f32`.
pub fn decode_f32(src: &mut dyn ByteSource) -> Result<f32> {
    let mut buf = [0u8; 4];
    read_exact(src, &mut buf)?;
    Ok(f32::from_le_bytes(buf))
}

/// Decodes a fixed-width little-endian `f64`.
pub fn decode_f64(src: &mut dyn ByteSource) -> Result<f64> {
    let mut buf = [0u8; 8];
    read_exact(src, &mut buf)?;
    Ok(f64::from_le_bytes(buf))
}

/// Decodes an unsigned LEB128 integer bounded to `max_bits` bits of content.
///
/// Fails with [`DecodeError::InvalidInput`] if the encoding runs longer than
/// `ceil(max_bits / 7)` bytes, or if the unused high bits of the final byte
/// are non-zero. Fails with [`DecodeError::UnexpectedEof`] on truncation.
pub fn decode_uleb128(src: &mut dyn ByteSource, max_bits: u32) -> Result<u64> {
    let mut result: u64 = 0;
    let mut shift: u32 = 0;
    loop {
        if shift >= max_bits {
            return Err(DecodeError::InvalidInput("overlong LEB128 integer"));
        }
        let byte = decode_u8(src)?;
        let content = u64::from(byte & 0x7f);

        let remaining_bits = max_bits - shift;
        if remaining_bits < 7 && content >> remaining_bits != 0 {
            return Err(DecodeError::InvalidInput("LEB128 integer overflows target width"));
        }

        result |= content << shift;
        shift += 7;

        if byte & 0x80 == 0 {
            break;
        }
    }
    Ok(result)
}

/// Decodes a signed LEB128 integer bounded to `max_bits` bits (sign included),
/// sign-extended from the highest data bit of the final group.
///
/// Fails with [`DecodeError::InvalidInput`] if the encoding runs longer than
/// `ceil(max_bits / 7)` bytes, or if the unused high bits of the final byte
/// are inconsistent with the sign bit. Fails with [`DecodeError::UnexpectedEof`]
/// on truncation.
pub fn decode_sleb128(src: &mut dyn ByteSource, max_bits: u32) -> Result<i64> {
    let mut result: i64 = 0;
    let mut shift: u32 = 0;
    let mut byte;
    loop {
        if shift >= max_bits {
            return Err(DecodeError::InvalidInput("overlong LEB128 integer"));
        }
        byte = decode_u8(src)?;
        let content = i64::from(byte & 0x7f);

        let remaining_bits = max_bits - shift;
        if remaining_bits < 7 {
            let mask = (!0i64 << (remaining_bits.saturating_sub(1))) & 0x7f;
            let masked = content & mask;
            if masked != 0 && masked != mask {
                return Err(DecodeError::InvalidInput("LEB128 integer overflows target width"));
            }
        }

        result |= content << shift;
        shift += 7;

        if byte & 0x80 == 0 {
            if shift < max_bits && byte & 0x40 != 0 {
                result |= !0i64 << shift;
            }
            break;
        }
    }
    Ok(result)
}

/// Decodes an unsigned LEB128-encoded `u32` (the common index/count encoding).
pub fn decode_u32(src: &mut dyn ByteSource) -> Result<u32> {
    let value = decode_uleb128(src, 32)?;
    Ok(value as u32)
}

/// Decodes a signed LEB128-encoded `i32` (used for `i32.const` immediates).
pub fn decode_i32(src: &mut dyn ByteSource) -> Result<i32> {
    let value = decode_sleb128(src, 32)?;
    Ok(value as i32)
}

/// Decodes a signed LEB128-encoded `i64` (used for `i64.const` immediates).
pub fn decode_i64(src: &mut dyn ByteSource) -> Result<i64> {
    decode_sleb128(src, 64)
}

/// Reads the unsigned LEB128 length prefix that precedes every `vec(T)`,
/// rejecting lengths that could only be a hostile or corrupt allocation
/// request given how many bytes remain to source `T` values from.
pub fn decode_vector_len(src: &mut dyn ByteSource, remaining_hint: Option<u64>) -> Result<u32> {
    let len = decode_u32(src)?;
    if let Some(remaining) = remaining_hint {
        let bound = remaining.saturating_mul(MAX_ALLOCATION_RATIO).max(64);
        if u64::from(len) > bound {
            return Err(DecodeError::HugeAllocationRequested {
                requested: u64::from(len),
                bound,
            });
        }
    }
    Ok(len)
}

/// Decodes a vector of `T`, calling `decode_elem` once per declared entry.
pub fn decode_vec<T>(
    src: &mut dyn ByteSource,
    remaining_hint: Option<u64>,
    mut decode_elem: impl FnMut(&mut dyn ByteSource) -> Result<T>,
) -> Result<Vec<T>> {
    let len = decode_vector_len(src, remaining_hint)?;
    let mut out = Vec::with_capacity(len.min(4096) as usize);
    for _ in 0..len {
        out.push(decode_elem(src)?);
    }
    Ok(out)
}

/// Decodes a length-prefixed raw byte range.
pub fn decode_bytes(src: &mut dyn ByteSource, remaining_hint: Option<u64>) -> Result<Vec<u8>> {
    let len = decode_vector_len(src, remaining_hint)? as usize;
    let mut out = vec![0u8; len];
    read_exact(src, &mut out)?;
    Ok(out)
}

/// Decodes a length-prefixed UTF-8 string.
pub fn decode_name(src: &mut dyn ByteSource, remaining_hint: Option<u64>) -> Result<String> {
    let bytes = decode_bytes(src, remaining_hint)?;
    String::from_utf8(bytes).map_err(|_| DecodeError::InvalidInput("malformed UTF-8 in name"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn src(bytes: &[u8]) -> SliceSource<'_> {
        SliceSource::new(bytes)
    }

    #[test]
    fn decodes_fixed_width_integers() {
        assert_eq!(decode_u8(&mut src(&[0x42])).unwrap(), 0x42);
        assert_eq!(
            decode_fixed_u32(&mut src(&[0x01, 0x00, 0x00, 0x00])).unwrap(),
            1
        );
        assert!(decode_u8(&mut src(&[])).is_err());
    }

    #[test]
    fn decodes_unsigned_leb128() {
        assert_eq!(decode_u32(&mut src(&[0x00])).unwrap(), 0);
        assert_eq!(decode_u32(&mut src(&[0x7f])).unwrap(), 127);
        assert_eq!(decode_u32(&mut src(&[0x80, 0x01])).unwrap(), 0x80);
        assert_eq!(
            decode_u32(&mut src(&[0xff, 0xff, 0xff, 0xff, 0x0f])).unwrap(),
            u32::MAX
        );
    }

    #[test]
    fn rejects_overlong_unsigned_leb128() {
        assert_eq!(
            decode_u32(&mut src(&[0x80, 0x80, 0x80, 0x80, 0x80, 0x00])),
            Err(DecodeError::InvalidInput("overlong LEB128 integer"))
        );
    }

    #[test]
    fn rejects_unsigned_leb128_with_set_unused_bits() {
        assert!(decode_u32(&mut src(&[0xff, 0xff, 0xff, 0xff, 0x1f])).is_err());
    }

    #[test]
    fn decodes_signed_leb128() {
        assert_eq!(decode_i32(&mut src(&[0x7f])).unwrap(), -1);
        assert_eq!(decode_i32(&mut src(&[0xff, 0x7f])).unwrap(), -1);
        assert_eq!(
            decode_i32(&mut src(&[0xff, 0xff, 0xff, 0xff, 0x07])).unwrap(),
            i32::MAX
        );
        assert_eq!(
            decode_i32(&mut src(&[0x80, 0x80, 0x80, 0x80, 0x78])).unwrap(),
            i32::MIN
        );
        assert_eq!(
            decode_i64(&mut src(&[0x80, 0x80, 0x80, 0x80, 0x80, 0x80, 0x80, 0x80, 0x80, 0x7f]))
                .unwrap(),
            i64::MIN
        );
    }

    #[test]
    fn bounded_view_reports_eof_at_budget() {
        let mut inner = src(&[1, 2, 3, 4, 5]);
        let mut bounded = Bounded::new(&mut inner, 3);
        let mut buf = [0u8; 10];
        let n = bounded.read(&mut buf);
        assert_eq!(n, 3);
        assert_eq!(&buf[..3], &[1, 2, 3]);
        assert!(bounded.unreliable_eof());
    }

    #[test]
    fn pushback_replays_byte() {
        let mut inner = src(&[2, 3]);
        let mut pb = Pushback::new(&mut inner);
        assert_eq!(decode_u8(&mut pb).unwrap(), 2);
        pb.push_back(2);
        assert_eq!(decode_u8(&mut pb).unwrap(), 2);
        assert_eq!(decode_u8(&mut pb).unwrap(), 3);
    }

    #[test]
    fn decodes_name() {
        let bytes = [3, b'f', b'o', b'o'];
        assert_eq!(decode_name(&mut src(&bytes), None).unwrap(), "foo");
    }

    #[test]
    fn rejects_invalid_utf8_name() {
        let bytes = [1, 0xff];
        assert!(decode_name(&mut src(&bytes), None).is_err());
    }

    #[test]
    fn rejects_huge_vector_allocation() {
        let bytes = [0xff, 0xff, 0xff, 0xff, 0x0f];
        let err = decode_vec(&mut src(&bytes), Some(4), |s| decode_u8(s)).unwrap_err();
        assert!(matches!(err, DecodeError::HugeAllocationRequested { .. }));
    }

    /// A source that runs out of bytes and, unlike [`SliceSource`], records a
    /// genuine transport error rather than a clean EOF.
    struct FailingSource {
        error: Option<io::Error>,
    }

    impl ByteSource for FailingSource {
        fn read(&mut self, _dst: &mut [u8]) -> usize {
            0
        }

        fn unreliable_eof(&self) -> bool {
            false
        }

        fn take_error(&mut self) -> Option<io::Error> {
            self.error.take()
        }
    }

    #[test]
    fn reclassifies_clean_eof_unchanged() {
        let mut empty = src(&[]);
        let err = decode_u8(&mut empty).unwrap_err();
        assert_eq!(
            reclassify_eof(&mut empty, err, DecodeError::ExpectedIndex),
            DecodeError::UnexpectedEof
        );
    }

    #[test]
    fn reclassifies_transport_error_into_requested_kind() {
        let mut failing = FailingSource {
            error: Some(io::Error::new(io::ErrorKind::Other, "disk fell over")),
        };
        let err = decode_u8(&mut failing).unwrap_err();
        assert_eq!(
            reclassify_eof(&mut failing, err, DecodeError::ExpectedIndex),
            DecodeError::ExpectedIndex
        );
    }
}
