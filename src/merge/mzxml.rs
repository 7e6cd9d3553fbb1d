//! Scan-level mzXML merging.
//!
//! The first segment supplies the document envelope. Scans of all segments
//! are emitted in segment order inside its single `msRun`, renumbered from 1.
//! `precursorScanNum` references resolve against their own segment first,
//! then against earlier segments from the first on; unresolved ones are kept.
//! Index elements are dropped because their byte offsets no longer hold.

use std::collections::HashMap;
use std::io::{BufRead, Seek, Write};

use quick_xml::events::{BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};

use super::MergeError;

const SCAN: &[u8] = b"scan";
const MS_RUN: &[u8] = b"msRun";
const PRECURSOR_MZ: &[u8] = b"precursorMz";
const DROPPED_TRAILER: [&[u8]; 3] = [b"index", b"indexOffset", b"sha1"];

/// Statistics from a completed mzXML merge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MzXmlMergeStats {
    /// Number of segments merged
    pub segments: usize,
    /// Number of scans written (nested scans included)
    pub scans: u64,
}

/// Merge mzXML segments into `output`, preserving segment order.
pub fn merge_mzxml<R, W>(mut segments: Vec<R>, output: W) -> Result<MzXmlMergeStats, MergeError>
where
    R: BufRead + Seek,
    W: Write,
{
    if segments.is_empty() {
        return Err(MergeError::NothingToMerge);
    }

    let mut total_scans = 0;
    for segment in segments.iter_mut() {
        total_scans += count_scans(&mut *segment)?;
        segment.rewind()?;
    }

    let mut writer = Writer::new(output);
    let mut numbering = ScanNumbering::default();
    let mut rest = segments.split_off(1);
    let first = segments.remove(0);

    let mut reader = Reader::from_reader(first);
    reader.config_mut().trim_text(false);
    let mut buf = Vec::new();

    // Envelope from the first segment; its scans are renumbered in place.
    let mut in_run = false;
    let mut run_depth = 0usize;
    let mut run_closed = false;
    let mut skip_depth = 0usize;
    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Eof => break,
            event if run_closed => {
                // Trailer after </msRun>: drop offset index elements.
                let keep = match &event {
                    Event::Start(e) if skip_depth > 0 || is_dropped(e.name().as_ref()) => {
                        skip_depth += 1;
                        false
                    }
                    Event::Empty(e) if skip_depth > 0 || is_dropped(e.name().as_ref()) => false,
                    Event::End(_) if skip_depth > 0 => {
                        skip_depth -= 1;
                        false
                    }
                    _ => skip_depth == 0,
                };
                if keep {
                    writer.write_event(event)?;
                }
            }
            Event::Start(e) if !in_run && e.name().as_ref() == MS_RUN => {
                in_run = true;
                writer.write_event(Event::Start(with_scan_count(&e, total_scans)?))?;
            }
            Event::Empty(e) if !in_run && e.name().as_ref() == MS_RUN => {
                // A run without scans still receives the scans of later segments.
                in_run = true;
                writer.write_event(Event::Start(with_scan_count(&e, total_scans)?))?;
                for segment in rest.drain(..) {
                    copy_scans(segment, &mut writer, &mut numbering)?;
                }
                writer.write_event(Event::End(e.to_end().into_owned()))?;
                run_closed = true;
            }
            Event::End(e) if in_run && run_depth == 0 && e.name().as_ref() == MS_RUN => {
                for segment in rest.drain(..) {
                    copy_scans(segment, &mut writer, &mut numbering)?;
                }
                writer.write_event(Event::End(e))?;
                run_closed = true;
            }
            Event::Start(e) if in_run => {
                run_depth += 1;
                let e = numbering.rewrite(&e)?;
                writer.write_event(Event::Start(e))?;
            }
            Event::Empty(e) if in_run => {
                let e = numbering.rewrite(&e)?;
                writer.write_event(Event::Empty(e))?;
            }
            Event::End(e) if in_run => {
                run_depth = run_depth.saturating_sub(1);
                writer.write_event(Event::End(e))?;
            }
            event => writer.write_event(event)?,
        }
        buf.clear();
    }

    if !run_closed {
        return Err(MergeError::InvalidStructure(
            "first segment has no closed <msRun> element".to_string(),
        ));
    }

    let mut output = writer.into_inner();
    output.flush()?;

    Ok(MzXmlMergeStats {
        segments: 1 + numbering.segments_copied,
        scans: numbering.next - 1,
    })
}

/// Count `scan` elements (nested ones included) in one segment.
pub fn count_scans<R: BufRead>(input: R) -> Result<u64, MergeError> {
    let mut reader = Reader::from_reader(input);
    let mut buf = Vec::new();
    let mut count = 0;
    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) | Event::Empty(e) if e.name().as_ref() == SCAN => count += 1,
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }
    Ok(count)
}

/// Copy the scan subtrees of one later segment into the open run.
fn copy_scans<R: BufRead, W: Write>(
    input: R,
    writer: &mut Writer<W>,
    numbering: &mut ScanNumbering,
) -> Result<(), MergeError> {
    numbering.start_segment();
    let mut reader = Reader::from_reader(input);
    reader.config_mut().trim_text(false);
    let mut buf = Vec::new();

    let mut in_run = false;
    // Depth below <msRun>; `copying` is set while inside a top-level scan.
    let mut depth = 0usize;
    let mut copying = false;
    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Eof => {
                return Err(MergeError::InvalidStructure(
                    "level segment ended before </msRun>".to_string(),
                ))
            }
            Event::Start(e) if !in_run => {
                if e.name().as_ref() == MS_RUN {
                    in_run = true;
                }
            }
            Event::Empty(e) if !in_run && e.name().as_ref() == MS_RUN => return Ok(()),
            _ if !in_run => {}
            Event::End(e) if depth == 0 && e.name().as_ref() == MS_RUN => return Ok(()),
            Event::Start(e) => {
                if depth == 0 && e.name().as_ref() == SCAN {
                    copying = true;
                    writer.write_event(Event::Text(BytesText::from_escaped("\n  ")))?;
                }
                depth += 1;
                if copying {
                    let e = numbering.rewrite(&e)?;
                    writer.write_event(Event::Start(e))?;
                }
            }
            Event::Empty(e) => {
                if depth == 0 && e.name().as_ref() == SCAN {
                    writer.write_event(Event::Text(BytesText::from_escaped("\n  ")))?;
                    let e = numbering.rewrite(&e)?;
                    writer.write_event(Event::Empty(e))?;
                } else if copying {
                    let e = numbering.rewrite(&e)?;
                    writer.write_event(Event::Empty(e))?;
                }
            }
            Event::End(e) => {
                depth = depth.saturating_sub(1);
                if copying {
                    writer.write_event(Event::End(e))?;
                    if depth == 0 {
                        copying = false;
                    }
                }
            }
            event => {
                if copying {
                    writer.write_event(event)?;
                }
            }
        }
        buf.clear();
    }
}

fn is_dropped(name: &[u8]) -> bool {
    DROPPED_TRAILER.contains(&name)
}

/// Sequential scan numbering across segments.
struct ScanNumbering {
    next: u64,
    /// Old `num` -> new `num` for the segment being written
    current: HashMap<Vec<u8>, u64>,
    /// Maps of finished segments, in segment order
    earlier: Vec<HashMap<Vec<u8>, u64>>,
    segments_copied: usize,
}

impl Default for ScanNumbering {
    fn default() -> Self {
        Self {
            next: 1,
            current: HashMap::new(),
            earlier: Vec::new(),
            segments_copied: 0,
        }
    }
}

impl ScanNumbering {
    fn start_segment(&mut self) {
        self.earlier.push(std::mem::take(&mut self.current));
        self.segments_copied += 1;
    }

    /// New number for a precursor reference. MS2-only segments point at
    /// survey scans of earlier segments.
    fn resolve(&self, old: &[u8]) -> Option<u64> {
        self.current
            .get(old)
            .or_else(|| self.earlier.iter().find_map(|map| map.get(old)))
            .copied()
    }

    fn rewrite(&mut self, e: &BytesStart) -> Result<BytesStart<'static>, MergeError> {
        match e.name().as_ref() {
            SCAN => {
                let assigned = self.next;
                self.next += 1;
                let mut saw_num = false;
                let mut out = rewrite_attributes(e, |key, value| {
                    if key == b"num" {
                        saw_num = true;
                        self.current.insert(value.to_vec(), assigned);
                        Some(assigned.to_string().into_bytes())
                    } else {
                        None
                    }
                })?;
                if !saw_num {
                    out.push_attribute(("num", assigned.to_string().as_str()));
                }
                Ok(out)
            }
            PRECURSOR_MZ => {
                let numbering = &*self;
                rewrite_attributes(e, |key, value| {
                    if key == b"precursorScanNum" {
                        numbering.resolve(value).map(|n| n.to_string().into_bytes())
                    } else {
                        None
                    }
                })
            }
            _ => Ok(e.to_owned().into_owned()),
        }
    }
}

fn with_scan_count(e: &BytesStart, total: u64) -> Result<BytesStart<'static>, MergeError> {
    let mut saw_count = false;
    let mut out = rewrite_attributes(e, |key, _| {
        if key == b"scanCount" {
            saw_count = true;
            Some(total.to_string().into_bytes())
        } else {
            None
        }
    })?;
    if !saw_count {
        out.push_attribute(("scanCount", total.to_string().as_str()));
    }
    Ok(out)
}

/// Copy an element, letting `replace` substitute raw attribute values.
fn rewrite_attributes(
    e: &BytesStart,
    mut replace: impl FnMut(&[u8], &[u8]) -> Option<Vec<u8>>,
) -> Result<BytesStart<'static>, MergeError> {
    let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
    let mut out = BytesStart::new(name);
    for attr in e.attributes() {
        let attr = attr.map_err(|e| MergeError::Xml(quick_xml::Error::from(e)))?;
        let key = attr.key.as_ref();
        match replace(key, attr.value.as_ref()) {
            Some(value) => out.push_attribute((key, value.as_slice())),
            None => out.push_attribute((key, attr.value.as_ref())),
        }
    }
    Ok(out)
}
