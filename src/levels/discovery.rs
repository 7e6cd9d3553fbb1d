use std::ffi::OsString;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Prefix of per-level marker files written by function-based acquisitions.
pub const MARKER_PREFIX: &str = "_FUN";

/// Suffix of per-level marker files.
pub const MARKER_SUFFIX: &str = ".DAT";

/// Marker files found in one directory.
///
/// The number of markers is the number of MS levels in the acquisition.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LevelSet {
    dir: PathBuf,
    markers: Vec<String>,
}

impl LevelSet {
    /// Number of levels (0 when the acquisition is not split).
    pub fn count(&self) -> usize {
        self.markers.len()
    }

    /// True when no marker files were found.
    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }

    /// Whether the acquisition must go through the multi-pass path.
    pub fn is_multi_level(&self) -> bool {
        self.count() >= 2
    }

    /// Directory that was inspected.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Marker file names, sorted.
    pub fn markers(&self) -> &[String] {
        &self.markers
    }
}

/// Whether a file name is a level marker. Case-sensitive on both affixes.
pub fn is_marker(name: &str) -> bool {
    name.len() >= MARKER_PREFIX.len() + MARKER_SUFFIX.len()
        && name.starts_with(MARKER_PREFIX)
        && name.ends_with(MARKER_SUFFIX)
}

/// Count level marker files among the immediate entries of `dir`.
///
/// Subdirectories are not searched. Names that are not valid UTF-8 never
/// match. A directory without markers yields an empty set, not an error.
pub fn discover_levels(dir: &Path) -> io::Result<LevelSet> {
    let mut markers = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        if let Some(name) = entry.file_name().to_str() {
            if is_marker(name) {
                markers.push(name.to_string());
            }
        }
    }
    markers.sort();

    Ok(LevelSet {
        dir: dir.to_path_buf(),
        markers,
    })
}

/// Path of the intermediate file for `level` (1-based).
///
/// Level 1 is the base path itself; later levels append the decimal level
/// number to the file name: `run.mzXML`, `run.mzXML2`, `run.mzXML3`, ...
pub fn level_path(base: &Path, level: usize) -> PathBuf {
    if level <= 1 {
        return base.to_path_buf();
    }
    let mut name: OsString = base.as_os_str().to_os_string();
    name.push(level.to_string());
    PathBuf::from(name)
}
