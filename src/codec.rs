//! Postings byte-level codecs.
//!
//! Two variants, dispatched through a tagged enum chosen at Writer/Reader
//! construction time (a `ProfileType` -> `Box<dyn SearchProfile>`-style
//! dispatch, collapsed here to a plain enum match since there are only two
//! codecs and neither needs trait-object indirection):
//!
//! - [`PostingsEncoding::Standard`]: fixed 4-byte little-endian integers, no
//!   gap transform. Reference implementation.
//! - [`PostingsEncoding::Vbe`]: variable-byte encoding with gap-coding for
//!   doc-id lists, raw (ungapped) for term-frequency lists.

use crate::error::IndexError;

/// Selects which byte-level postings codec a Writer/Reader uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostingsEncoding {
    Standard,
    Vbe,
}

impl PostingsEncoding {
    /// Encode a strictly increasing, non-empty doc-id list.
    pub fn encode_postings(&self, doc_ids: &[u32]) -> Result<Vec<u8>, IndexError> {
        match self {
            PostingsEncoding::Standard => Ok(encode_standard(doc_ids)),
            PostingsEncoding::Vbe => encode_vbe_postings(doc_ids),
        }
    }

    /// Decode a doc-id list previously produced by [`Self::encode_postings`].
    pub fn decode_postings(&self, bytes: &[u8]) -> Result<Vec<u32>, IndexError> {
        match self {
            PostingsEncoding::Standard => decode_standard(bytes),
            PostingsEncoding::Vbe => decode_vbe_postings(bytes),
        }
    }

    /// Encode a positive-integer term-frequency list (no gap transform, ever).
    pub fn encode_tf(&self, tfs: &[u32]) -> Result<Vec<u8>, IndexError> {
        match self {
            PostingsEncoding::Standard => Ok(encode_standard(tfs)),
            PostingsEncoding::Vbe => encode_vbe_raw(tfs),
        }
    }

    /// Decode a term-frequency list previously produced by [`Self::encode_tf`].
    pub fn decode_tf(&self, bytes: &[u8]) -> Result<Vec<u32>, IndexError> {
        match self {
            PostingsEncoding::Standard => decode_standard(bytes),
            PostingsEncoding::Vbe => decode_vbe_raw(bytes),
        }
    }
}

// ---------------------------------------------------------------------
// Standard: fixed 4-byte little-endian, no gap transform.
// ---------------------------------------------------------------------

fn encode_standard(values: &[u32]) -> Vec<u8> {
    let mut out = Vec::with_capacity(values.len() * 4);
    for &v in values {
        out.extend_from_slice(&v.to_le_bytes());
    }
    out
}

fn decode_standard(bytes: &[u8]) -> Result<Vec<u32>, IndexError> {
    if bytes.len() % 4 != 0 {
        return Err(IndexError::MalformedPostings(
            "standard-encoded stream length is not a multiple of 4".to_string(),
        ));
    }
    Ok(bytes
        .chunks_exact(4)
        .map(|c| u32::from_le_bytes([c[0], c[1], c[2], c[3]]))
        .collect())
}

// ---------------------------------------------------------------------
// VBE: 7-bit groups, most-significant group first, high bit set on the
// terminating (last) byte.
// ---------------------------------------------------------------------

fn encode_vbe_u64(mut n: u64, out: &mut Vec<u8>) {
    let mut groups = Vec::with_capacity(10);
    loop {
        groups.push((n & 0x7f) as u8);
        n >>= 7;
        if n == 0 {
            break;
        }
    }
    groups.reverse(); // most-significant group first
    let last = groups.len() - 1;
    for (i, g) in groups.into_iter().enumerate() {
        if i == last {
            out.push(g | 0x80);
        } else {
            out.push(g);
        }
    }
}

fn decode_vbe_u64(bytes: &[u8]) -> Result<(u64, usize), IndexError> {
    let mut value: u64 = 0;
    for (i, &b) in bytes.iter().enumerate() {
        let continuing = b & 0x80 != 0;
        let group = (b & 0x7f) as u64;
        if value > (u64::MAX >> 7) {
            return Err(IndexError::EncodingOverflow);
        }
        value = (value << 7)
            .checked_add(group)
            .ok_or(IndexError::EncodingOverflow)?;
        if continuing {
            return Ok((value, i + 1));
        }
    }
    Err(IndexError::MalformedPostings(
        "VBE stream ended mid-number (no terminator byte)".to_string(),
    ))
}

fn encode_vbe_raw(values: &[u32]) -> Result<Vec<u8>, IndexError> {
    let mut out = Vec::with_capacity(values.len());
    for &v in values {
        encode_vbe_u64(v as u64, &mut out);
    }
    Ok(out)
}

fn decode_vbe_raw(bytes: &[u8]) -> Result<Vec<u32>, IndexError> {
    let mut out = Vec::new();
    let mut pos = 0;
    while pos < bytes.len() {
        let (value, consumed) = decode_vbe_u64(&bytes[pos..])?;
        pos += consumed;
        out.push(u32::try_from(value).map_err(|_| IndexError::EncodingOverflow)?);
    }
    Ok(out)
}

fn encode_vbe_postings(doc_ids: &[u32]) -> Result<Vec<u8>, IndexError> {
    if doc_ids.is_empty() {
        return Ok(Vec::new());
    }
    let mut gaps = Vec::with_capacity(doc_ids.len());
    gaps.push(doc_ids[0]);
    for w in doc_ids.windows(2) {
        gaps.push(
            w[1].checked_sub(w[0])
                .ok_or(IndexError::EncodingOverflow)?,
        );
    }
    encode_vbe_raw(&gaps)
}

fn decode_vbe_postings(bytes: &[u8]) -> Result<Vec<u32>, IndexError> {
    let gaps = decode_vbe_raw(bytes)?;
    let mut out = Vec::with_capacity(gaps.len());
    let mut acc: u64 = 0;
    for (i, &g) in gaps.iter().enumerate() {
        if i == 0 {
            acc = g as u64;
        } else {
            acc = acc
                .checked_add(g as u64)
                .ok_or(IndexError::EncodingOverflow)?;
        }
        out.push(u32::try_from(acc).map_err(|_| IndexError::EncodingOverflow)?);
    }
    Ok(out)
}
