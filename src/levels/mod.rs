//! # MS Level Discovery and Splitting
//!
//! Function-based acquisitions store every MS level as a separate function.
//! Converters emit one file per function, so after the first conversion pass
//! the number of levels is read from the marker files (`_FUN*.DAT`) in the
//! acquisition directory and the converter is invoked again for each further
//! level.
//!
//! ## Filesystem layout
//!
//! ```text
//! run.raw/
//! ├── _FUNC001.DAT      # level 1 marker
//! ├── _FUNC002.DAT      # level 2 marker
//! └── _FUNC003.DAT      # level 3 marker
//!
//! out/run.mzXML         # level 1 (first pass)
//! out/run.mzXML2        # level 2
//! out/run.mzXML3        # level 3
//! ```
//!
//! Filter-driven converters (Variant B) stage each further level under
//! `<working dir>/<i>/` before it is moved next to the base output.

mod discovery;
mod splitter;


pub use discovery::{discover_levels, is_marker, level_path, LevelSet, MARKER_PREFIX, MARKER_SUFFIX};
pub use splitter::LevelSplitter;
