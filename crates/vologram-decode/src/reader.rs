//! Little-endian field reading with bounds checks.

use crate::error::{DecodeError, DecodeResult};

/// Bounds-checked little-endian reader over a byte slice.
pub(crate) struct Reader<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    pub(crate) fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, pos: 0 }
    }

    pub(crate) fn position(&self) -> usize {
        self.pos
    }

    pub(crate) fn take(&mut self, what: &'static str, len: usize) -> DecodeResult<&'a [u8]> {
        let available = self.bytes.len() - self.pos;
        if len > available {
            return Err(DecodeError::Truncated {
                what,
                needed: len,
                available,
            });
        }
        let slice = &self.bytes[self.pos..self.pos + len];
        self.pos += len;
        Ok(slice)
    }

    pub(crate) fn array<const N: usize>(&mut self, what: &'static str) -> DecodeResult<[u8; N]> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.take(what, N)?);
        Ok(out)
    }

    pub(crate) fn u8(&mut self, what: &'static str) -> DecodeResult<u8> {
        Ok(self.array::<1>(what)?[0])
    }

    pub(crate) fn i32(&mut self, what: &'static str) -> DecodeResult<i32> {
        self.array(what).map(i32::from_le_bytes)
    }

    pub(crate) fn u32(&mut self, what: &'static str) -> DecodeResult<u32> {
        self.array(what).map(u32::from_le_bytes)
    }

    pub(crate) fn f32(&mut self, what: &'static str) -> DecodeResult<f32> {
        self.array(what).map(f32::from_le_bytes)
    }
}

/// Checks that `bytes` holds a whole number of `stride`-sized elements.
pub(crate) fn check_stride(what: &'static str, bytes: &[u8], stride: usize) -> DecodeResult<usize> {
    if bytes.len() % stride != 0 {
        return Err(DecodeError::BadStride {
            what,
            size: bytes.len(),
            stride,
        });
    }
    Ok(bytes.len() / stride)
}

/// Reads a little-endian `f32` from a slice that is known to be 4 bytes long.
pub(crate) fn le_f32(bytes: &[u8]) -> f32 {
    f32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reader_reports_truncation() {
        let mut reader = Reader::new(&[1, 0, 0]);
        let err = reader.u32("field").unwrap_err();
        assert_eq!(
            err,
            DecodeError::Truncated {
                what: "field",
                needed: 4,
                available: 3
            }
        );
    }

    #[test]
    fn stride_check() {
        assert_eq!(check_stride("v", &[0; 24], 12), Ok(2));
        assert!(matches!(
            check_stride("v", &[0; 25], 12),
            Err(DecodeError::BadStride { size: 25, .. })
        ));
    }
}
