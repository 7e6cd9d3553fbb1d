use super::*;
use crate::job::JobStatus;
use std::fs;
use tempfile::tempdir;

fn scans(polarities: &[&str]) -> String {
    let mut doc = String::from("<?xml version=\"1.0\"?>\n<mzXML><msRun>\n");
    for (i, p) in polarities.iter().enumerate() {
        if p.is_empty() {
            doc.push_str(&format!("<scan num=\"{}\" msLevel=\"1\"/>\n", i + 1));
        } else {
            doc.push_str(&format!(
                "<scan num=\"{}\" msLevel=\"1\" polarity=\"{}\"><peaks/></scan>\n",
                i + 1,
                p
            ));
        }
    }
    doc.push_str("</msRun></mzXML>\n");
    doc
}

fn request_for(path: PathBuf) -> TranslationRequest {
    TranslationRequest::from_settings(path, &ConversionSettings::default())
}

#[test]
fn test_request_carries_settings() {
    let settings = ConversionSettings {
        chrom_size_threshold_mb: 250,
        scaling_factor: 10,
        ms2_enabled: true,
        thread_count: 3,
        ..ConversionSettings::default()
    };
    let request = TranslationRequest::from_settings("/out/run.mzXML", &settings);
    assert_eq!(request.format, "mzXML");
    assert_eq!(request.size_threshold_mb, 250);
    assert_eq!(request.scaling_factor, 10);
    assert_eq!(request.threads, 3);
    assert!(request.ms2);
}

#[test]
fn test_polarity_counts() {
    let counts = PolarityCounts::from_reader(scans(&["+", "+", "-", ""]).as_bytes()).unwrap();
    assert_eq!(
        counts,
        PolarityCounts {
            positive: 2,
            negative: 1,
            unknown: 1
        }
    );
    assert!(counts.is_switching());

    let counts = PolarityCounts::from_reader(scans(&["-", "-"]).as_bytes()).unwrap();
    assert!(!counts.is_switching());
}

#[test]
fn test_probe_reports_polarity_switching() {
    let dir = tempdir().unwrap();
    let switching = dir.path().join("switching.mzXML");
    let positive = dir.path().join("positive.mzXML");
    fs::write(&switching, scans(&["+", "-", "+"])).unwrap();
    fs::write(&positive, scans(&["+", "+"])).unwrap();

    let probe = MzXmlPolarityProbe;
    assert!(probe.translate(&request_for(switching)).unwrap().polarity_switched);
    assert!(!probe.translate(&request_for(positive)).unwrap().polarity_switched);
}

#[test]
fn test_probe_rejects_other_formats() {
    let mut request = request_for(PathBuf::from("run.mzML"));
    request.format = "mzML".to_string();
    let err = MzXmlPolarityProbe.translate(&request).unwrap_err();
    assert!(matches!(err, TranslationError::Unsupported(_)));
}

#[test]
fn test_probe_missing_file_is_io_error() {
    let err = MzXmlPolarityProbe
        .translate(&request_for(PathBuf::from("/nonexistent/run.mzXML")))
        .unwrap_err();
    assert!(matches!(err, TranslationError::Io(_)));
}

#[test]
fn test_translation_job_on_thread() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("run.mzXML");
    fs::write(&path, scans(&["-", "+"])).unwrap();

    let job = TranslationJob::new(request_for(path.clone()), Arc::new(MzXmlPolarityProbe));
    assert_eq!(job.request().path, path);

    let handle = job.spawn().unwrap();
    let outcome = handle.wait().unwrap();
    assert!(outcome.polarity_switched);
}

struct FailingTranslator;

impl ChromatogramTranslator for FailingTranslator {
    fn translate(&self, _: &TranslationRequest) -> Result<TranslationOutcome, TranslationError> {
        Err(TranslationError::Unsupported("no chromatogram library".to_string()))
    }
}

#[test]
fn test_failed_translation_is_reported_on_handle() {
    let job = TranslationJob::new(request_for(PathBuf::from("run.mzXML")), Arc::new(FailingTranslator));
    let handle = job.spawn().unwrap();

    assert!(handle.wait_timeout(std::time::Duration::from_secs(10)));
    assert!(matches!(handle.status(), JobStatus::Failed(_)));
    assert!(handle
        .error_description()
        .unwrap()
        .contains("no chromatogram library"));
}
