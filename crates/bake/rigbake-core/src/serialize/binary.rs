//! Binary payload: the matrix buffer as consecutive little-endian `f32`s.
//! Length in bytes is `total_frames * num_bones * 16 * 4`.

use std::io::Write;

use crate::error::{ExportError, Result};
use crate::packing::MatrixBuffer;

pub fn encode_le_f32(values: &[f32]) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(values.len() * 4);
    for v in values {
        bytes.extend_from_slice(&v.to_le_bytes());
    }
    bytes
}

/// Inverse of [`encode_le_f32`]. Fails on a length that is not a multiple of 4.
pub fn decode_le_f32(bytes: &[u8]) -> Result<Vec<f32>> {
    if bytes.len() % 4 != 0 {
        return Err(ExportError::Serialization {
            reason: format!("payload length {} is not a multiple of 4", bytes.len()),
        });
    }
    Ok(bytes
        .chunks_exact(4)
        .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]))
        .collect())
}

/// Write the whole buffer; returns the number of bytes written.
pub fn write_matrix_buffer<W: Write>(buffer: &MatrixBuffer, mut out: W) -> Result<usize> {
    let bytes = encode_le_f32(buffer.as_slice());
    out.write_all(&bytes)?;
    out.flush()?;
    Ok(bytes.len())
}
