//! Shared helpers for the integration tests.

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;

use lipidconv::runner::{ProcessRunner, RunReport, RunnerError, StdoutMode};

type Action = Box<dyn Fn(&[String]) -> std::io::Result<()> + Send + Sync>;

/// Converter double that records argv and writes files instead of spawning.
pub struct FakeConverter {
    calls: Mutex<Vec<Vec<String>>>,
    action: Action,
}

impl FakeConverter {
    pub fn new(action: impl Fn(&[String]) -> std::io::Result<()> + Send + Sync + 'static) -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            action: Box::new(action),
        }
    }

    pub fn calls(&self) -> Vec<Vec<String>> {
        self.calls.lock().unwrap().clone()
    }
}

impl ProcessRunner for FakeConverter {
    fn run(&self, argv: &[String], _stdout: StdoutMode) -> Result<RunReport, RunnerError> {
        self.calls.lock().unwrap().push(argv.to_vec());
        (self.action)(argv).map_err(|source| RunnerError::Launch {
            program: argv[0].clone(),
            source,
        })?;
        Ok(RunReport::succeeded(Duration::from_millis(1)))
    }
}

/// A small mzXML document with one scan per entry of `polarities`, all at
/// retention time `level` seconds.
pub fn mzxml_level(level: usize, polarities: &[char]) -> String {
    let mut doc = String::from("<?xml version=\"1.0\" encoding=\"ISO-8859-1\"?>\n<mzXML>\n");
    doc.push_str(&format!(
        "  <msRun scanCount=\"{}\">\n    <parentFile fileName=\"run.raw\"/>\n",
        polarities.len()
    ));
    for (i, p) in polarities.iter().enumerate() {
        doc.push_str(&format!(
            "    <scan num=\"{}\" msLevel=\"1\" polarity=\"{}\" retentionTime=\"PT{}S\" peaksCount=\"0\">\n      <peaks precision=\"32\"/>\n    </scan>\n",
            i + 1,
            p,
            level
        ));
    }
    doc.push_str("  </msRun>\n  <indexOffset>0</indexOffset>\n</mzXML>\n");
    doc
}

/// Acquisition directory with `levels` `_FUNC00N.DAT` markers.
pub fn acquisition(root: &Path, name: &str, levels: usize) -> PathBuf {
    let source = root.join(name);
    fs::create_dir_all(&source).unwrap();
    for i in 1..=levels {
        fs::write(source.join(format!("_FUNC{:03}.DAT", i)), b"").unwrap();
    }
    source
}
