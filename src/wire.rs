//! Deterministic, size-hinted wire codec.
//!
//! Mirrors the "remaining memory budget" contract described in `spec.md`
//! §6/§8: every wire type can report its exact encoded size up front
//! (`size_hint`) and refuses to marshal/unmarshal against a buffer or
//! quota smaller than that. Scalars and points defer to
//! `ark_serialize::CanonicalSerialize`/`CanonicalDeserialize` for their
//! fixed-size encodings; this module supplies the framing for composite
//! protocol types (length-prefixed sequences, field concatenation with no
//! padding) that the spec's byte layout requires.

use ark_serialize::{CanonicalDeserialize, CanonicalSerialize};
use thiserror::Error;

use crate::curve::{Fn, Point};

/// The big-endian length prefix used for every variable-length sequence,
/// per `spec.md` §6.
pub const LENGTH_PREFIX_BYTES: usize = 4;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum WireError {
    #[error("buffer too small: need {needed} bytes, have {available}")]
    BufferTooSmall { needed: usize, available: usize },
    #[error("memory quota exceeded: need {needed} bytes, quota {quota}")]
    QuotaExceeded { needed: usize, quota: usize },
    #[error("declared sequence length {declared} would exceed remaining budget {remaining}")]
    LengthAmplification { declared: usize, remaining: usize },
    #[error("underlying curve/field deserialization failed")]
    CurveDecode,
}

impl From<ark_serialize::SerializationError> for WireError {
    fn from(_: ark_serialize::SerializationError) -> Self {
        WireError::CurveDecode
    }
}

/// A type that knows its own exact encoded size and can marshal itself
/// into a caller-supplied buffer, failing rather than truncating when the
/// buffer (or an explicit memory quota) is too small.
pub trait Marshal: Sized {
    /// Exact number of bytes [`Marshal::marshal`] will write.
    fn size_hint(&self) -> usize;

    /// Appends the encoding of `self` to `buf`. `remaining` is the caller's
    /// memory quota for this call (not necessarily `buf`'s capacity);
    /// marshalling fails without writing anything if `remaining <
    /// size_hint()`.
    fn marshal(&self, buf: &mut Vec<u8>, remaining: usize) -> Result<usize, WireError>;
}

/// The dual of [`Marshal`]: decode `Self` from the front of `buf`,
/// respecting the same memory-quota contract.
pub trait Unmarshal: Sized {
    fn unmarshal(buf: &[u8], remaining: usize) -> Result<(Self, usize), WireError>;
}

pub(crate) fn check_quota(needed: usize, remaining: usize) -> Result<(), WireError> {
    if needed > remaining {
        return Err(WireError::QuotaExceeded {
            needed,
            quota: remaining,
        });
    }
    Ok(())
}

/// Marshals a fixed 32-bit big-endian integer, e.g. the `batchSize`/`kOpen`
/// fields of `MulOpen`'s serialized state (`spec.md` §6).
pub fn marshal_u32(v: u32, buf: &mut Vec<u8>, remaining: usize) -> Result<usize, WireError> {
    check_quota(LENGTH_PREFIX_BYTES, remaining)?;
    buf.extend_from_slice(&v.to_be_bytes());
    Ok(LENGTH_PREFIX_BYTES)
}

/// The dual of [`marshal_u32`].
pub fn unmarshal_u32(buf: &[u8], remaining: usize) -> Result<(u32, usize), WireError> {
    check_quota(LENGTH_PREFIX_BYTES, remaining)?;
    if buf.len() < LENGTH_PREFIX_BYTES {
        return Err(WireError::BufferTooSmall {
            needed: LENGTH_PREFIX_BYTES,
            available: buf.len(),
        });
    }
    let v = u32::from_be_bytes(buf[..LENGTH_PREFIX_BYTES].try_into().unwrap());
    Ok((v, LENGTH_PREFIX_BYTES))
}

impl<T: Marshal> Marshal for Vec<T> {
    fn size_hint(&self) -> usize {
        LENGTH_PREFIX_BYTES + self.iter().map(Marshal::size_hint).sum::<usize>()
    }

    fn marshal(&self, buf: &mut Vec<u8>, remaining: usize) -> Result<usize, WireError> {
        marshal_seq(self, buf, remaining)
    }
}

impl<T: Unmarshal> Unmarshal for Vec<T> {
    fn unmarshal(buf: &[u8], remaining: usize) -> Result<(Self, usize), WireError> {
        unmarshal_seq(buf, remaining)
    }
}

impl Marshal for Fn {
    fn size_hint(&self) -> usize {
        self.compressed_size()
    }

    fn marshal(&self, buf: &mut Vec<u8>, remaining: usize) -> Result<usize, WireError> {
        let needed = self.size_hint();
        check_quota(needed, remaining)?;
        let start = buf.len();
        self.serialize_compressed(&mut *buf)?;
        Ok(buf.len() - start)
    }
}

impl Unmarshal for Fn {
    fn unmarshal(buf: &[u8], remaining: usize) -> Result<(Self, usize), WireError> {
        let needed = <Fn as CanonicalSerialize>::compressed_size(&Fn::from(0u64));
        check_quota(needed, remaining)?;
        if buf.len() < needed {
            return Err(WireError::BufferTooSmall {
                needed,
                available: buf.len(),
            });
        }
        let value = Fn::deserialize_compressed(&buf[..needed])?;
        Ok((value, needed))
    }
}

impl Marshal for Point {
    fn size_hint(&self) -> usize {
        self.compressed_size()
    }

    fn marshal(&self, buf: &mut Vec<u8>, remaining: usize) -> Result<usize, WireError> {
        let needed = self.size_hint();
        check_quota(needed, remaining)?;
        let start = buf.len();
        self.serialize_compressed(&mut *buf)?;
        Ok(buf.len() - start)
    }
}

impl Unmarshal for Point {
    fn unmarshal(buf: &[u8], remaining: usize) -> Result<(Self, usize), WireError> {
        // Affine points have a fixed compressed size independent of value;
        // probe it via the curve's generator.
        let needed = crate::curve::generator().compressed_size();
        check_quota(needed, remaining)?;
        if buf.len() < needed {
            return Err(WireError::BufferTooSmall {
                needed,
                available: buf.len(),
            });
        }
        let value = Point::deserialize_compressed(&buf[..needed])?;
        Ok((value, needed))
    }
}

/// Marshals a length-prefixed sequence of `Marshal` items.
pub fn marshal_seq<T: Marshal>(
    items: &[T],
    buf: &mut Vec<u8>,
    remaining: usize,
) -> Result<usize, WireError> {
    let body: usize = items.iter().map(Marshal::size_hint).sum();
    let needed = LENGTH_PREFIX_BYTES + body;
    check_quota(needed, remaining)?;
    buf.extend_from_slice(&(items.len() as u32).to_be_bytes());
    let mut used = LENGTH_PREFIX_BYTES;
    for item in items {
        used += item.marshal(buf, remaining - used)?;
    }
    Ok(used)
}

/// Unmarshals a length-prefixed sequence of `Unmarshal` items.
pub fn unmarshal_seq<T: Unmarshal>(
    buf: &[u8],
    remaining: usize,
) -> Result<(Vec<T>, usize), WireError> {
    check_quota(LENGTH_PREFIX_BYTES, remaining)?;
    if buf.len() < LENGTH_PREFIX_BYTES {
        return Err(WireError::BufferTooSmall {
            needed: LENGTH_PREFIX_BYTES,
            available: buf.len(),
        });
    }
    let len = u32::from_be_bytes(buf[..LENGTH_PREFIX_BYTES].try_into().unwrap()) as usize;
    // A malicious or corrupt length prefix must not be trusted to allocate
    // before we know the remaining budget actually covers it.
    if len > remaining {
        return Err(WireError::LengthAmplification {
            declared: len,
            remaining,
        });
    }
    let mut used = LENGTH_PREFIX_BYTES;
    let mut items = Vec::with_capacity(len.min(remaining));
    for _ in 0..len {
        let (item, item_used) = T::unmarshal(&buf[used..], remaining - used)?;
        used += item_used;
        items.push(item);
    }
    Ok((items, used))
}
