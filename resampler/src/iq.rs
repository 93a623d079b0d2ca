//! Interleaved I/Q helpers shared by the backends.

use crate::ResamplerError;

/// Returns the number of I/Q pairs in `block`, or `InvalidInput` if the
/// block has an odd number of values.
pub fn pair_count(block: &[f32]) -> Result<usize, ResamplerError> {
    if block.len() % 2 != 0 {
        return Err(ResamplerError::InvalidInput { len: block.len() });
    }
    Ok(block.len() / 2)
}

/// Appends the I values (even offsets) of `block` to `i` and the Q values
/// (odd offsets) to `q`.
pub(crate) fn split_into(block: &[f32], i: &mut Vec<f32>, q: &mut Vec<f32>) {
    i.reserve(block.len() / 2);
    q.reserve(block.len() / 2);
    for pair in block.chunks_exact(2) {
        i.push(pair[0]);
        q.push(pair[1]);
    }
}

/// Interleaves the first `len` values of `i` and `q` into a new block.
pub(crate) fn interleave(i: &[f32], q: &[f32], len: usize) -> Vec<f32> {
    let mut out = Vec::with_capacity(len * 2);
    for (&vi, &vq) in i[..len].iter().zip(&q[..len]) {
        out.push(vi);
        out.push(vq);
    }
    out
}
