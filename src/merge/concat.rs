use std::io::{self, BufRead, Write};

use super::MergeError;

/// Append every segment to `output` in the given order.
///
/// Returns the number of bytes written.
pub fn concatenate<R: BufRead, W: Write>(segments: Vec<R>, mut output: W) -> Result<u64, MergeError> {
    let mut written = 0;
    for mut segment in segments {
        written += io::copy(&mut segment, &mut output)?;
    }
    output.flush()?;
    Ok(written)
}
