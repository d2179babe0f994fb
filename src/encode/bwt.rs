// src/encode/bwt.rs

//! Burrows-Wheeler transform without a sentinel byte.
//!
//! The forward transform sorts every cyclic rotation of the block and keeps
//! the last column together with the row holding the unrotated input. The
//! inverse walks the last-to-first mapping from that row.

use crate::utils::error::{CodecError, Result};

/// Returns `(last column, primary index)`.
pub fn forward(data: &[u8]) -> (Vec<u8>, usize) {
    let len = data.len();
    if len == 0 {
        return (Vec::new(), 0);
    }

    let mut rotations: Vec<usize> = (0..len).collect();
    rotations.sort_by(|&a, &b| {
        let a_rot = data[a..].iter().chain(data[..a].iter());
        let b_rot = data[b..].iter().chain(data[..b].iter());
        a_rot.cmp(b_rot).then(a.cmp(&b))
    });

    let mut last_col = vec![0u8; len];
    let mut primary_index = 0;
    for (i, &start) in rotations.iter().enumerate() {
        if start == 0 {
            primary_index = i;
        }
        last_col[i] = data[(start + len - 1) % len];
    }

    (last_col, primary_index)
}

/// Rebuilds the block from its last column and primary index.
pub fn inverse(last_col: &[u8], primary_index: usize) -> Result<Vec<u8>> {
    let len = last_col.len();
    if len == 0 {
        return Ok(Vec::new());
    }
    if primary_index >= len {
        return Err(CodecError::ShapeMismatch(format!(
            "primary index {} outside block of {} bytes",
            primary_index, len
        )));
    }

    // first row of each symbol in the sorted first column
    let mut counts = [0usize; 256];
    for &c in last_col {
        counts[c as usize] += 1;
    }
    let mut starts = [0usize; 256];
    let mut total = 0;
    for (start, &count) in starts.iter_mut().zip(counts.iter()) {
        *start = total;
        total += count;
    }

    let mut seen = [0usize; 256];
    let lf: Vec<usize> = last_col
        .iter()
        .map(|&c| {
            let row = starts[c as usize] + seen[c as usize];
            seen[c as usize] += 1;
            row
        })
        .collect();

    let mut out = vec![0u8; len];
    let mut row = primary_index;
    for slot in out.iter_mut().rev() {
        *slot = last_col[row];
        row = lf[row];
    }
    Ok(out)
}
