use std::fs::File;
use std::io::{BufRead, BufReader};

use log::debug;
use quick_xml::events::Event;
use quick_xml::Reader;

use super::{ChromatogramTranslator, TranslationError, TranslationOutcome, TranslationRequest};

/// Scan counts per polarity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PolarityCounts {
    /// Scans with `polarity="+"`
    pub positive: u64,
    /// Scans with `polarity="-"`
    pub negative: u64,
    /// Scans without a polarity attribute
    pub unknown: u64,
}

impl PolarityCounts {
    /// Both polarities were seen.
    pub fn is_switching(&self) -> bool {
        self.positive > 0 && self.negative > 0
    }

    /// Count polarities of every `scan` element in an mzXML document.
    pub fn from_reader<R: BufRead>(input: R) -> Result<Self, TranslationError> {
        let mut reader = Reader::from_reader(input);
        let mut buf = Vec::new();
        let mut counts = PolarityCounts::default();

        loop {
            match reader.read_event_into(&mut buf)? {
                Event::Start(e) | Event::Empty(e) if e.name().as_ref() == b"scan" => {
                    let polarity = e
                        .try_get_attribute("polarity")
                        .map_err(quick_xml::Error::from)?
                        .map(|a| a.value.into_owned());
                    match polarity.as_deref() {
                        Some(b"+") => counts.positive += 1,
                        Some(b"-") => counts.negative += 1,
                        _ => counts.unknown += 1,
                    }
                }
                Event::Eof => break,
                _ => {}
            }
            buf.clear();
        }
        Ok(counts)
    }
}

/// Translator that only reports whether an mzXML file switches polarity.
#[derive(Debug, Clone, Copy, Default)]
pub struct MzXmlPolarityProbe;

impl ChromatogramTranslator for MzXmlPolarityProbe {
    fn translate(&self, request: &TranslationRequest) -> Result<TranslationOutcome, TranslationError> {
        if !request.format.eq_ignore_ascii_case("mzxml") {
            return Err(TranslationError::Unsupported(format!(
                "polarity probe reads mzXML, not {}",
                request.format
            )));
        }

        let file = File::open(&request.path)?;
        let counts = PolarityCounts::from_reader(BufReader::new(file))?;
        debug!(
            "{}: {} positive, {} negative, {} unknown scans",
            request.path.display(),
            counts.positive,
            counts.negative,
            counts.unknown
        );

        Ok(TranslationOutcome {
            polarity_switched: counts.is_switching(),
        })
    }
}
