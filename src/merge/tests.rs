use super::*;
use proptest::prelude::*;
use std::io::Cursor;
use std::str::FromStr;
use tempfile::tempdir;

/// Build a small mzXML document whose scans carry the given retention times.
fn mzxml_doc(label: &str, scans: &[(u32, u8, f64)]) -> String {
    let mut doc = String::from(
        "<?xml version=\"1.0\" encoding=\"ISO-8859-1\"?>\n\
         <mzXML xmlns=\"http://sashimi.sourceforge.net/schema_revision/mzXML_3.2\">\n",
    );
    doc.push_str(&format!(
        "  <msRun scanCount=\"{}\">\n    <parentFile fileName=\"{}.raw\" fileType=\"RAWData\"/>\n",
        scans.len(),
        label
    ));
    for (num, ms_level, rt) in scans {
        doc.push_str(&format!(
            "    <scan num=\"{}\" msLevel=\"{}\" polarity=\"+\" retentionTime=\"PT{}S\" peaksCount=\"0\">\n",
            num, ms_level, rt
        ));
        if *ms_level > 1 {
            doc.push_str(&format!(
                "      <precursorMz precursorScanNum=\"{}\" precursorIntensity=\"100\">500.25</precursorMz>\n",
                num - 1
            ));
        }
        doc.push_str("      <peaks precision=\"32\" byteOrder=\"network\" pairOrder=\"m/z-int\"></peaks>\n");
        doc.push_str("    </scan>\n");
    }
    doc.push_str("  </msRun>\n  <index name=\"scan\">\n    <offset id=\"1\">123</offset>\n  </index>\n");
    doc.push_str("  <indexOffset>456</indexOffset>\n  <sha1>abc</sha1>\n</mzXML>\n");
    doc
}

fn merge_docs(docs: &[String]) -> (String, MzXmlMergeStats) {
    let segments: Vec<_> = docs.iter().map(|d| Cursor::new(d.clone().into_bytes())).collect();
    let mut out = Vec::new();
    let stats = merge_mzxml(segments, &mut out).unwrap();
    (String::from_utf8(out).unwrap(), stats)
}

fn attr_values(doc: &str, attr: &str) -> Vec<String> {
    let needle = format!("{}=\"", attr);
    doc.match_indices(&needle)
        .map(|(i, _)| {
            let rest = &doc[i + needle.len()..];
            rest[..rest.find('"').unwrap()].to_string()
        })
        .collect()
}

// ==================== Level counting ====================

#[test]
fn test_effective_level_count() {
    assert_eq!(effective_level_count(0, false), 0);
    assert_eq!(effective_level_count(1, true), 1);
    assert_eq!(effective_level_count(3, false), 3);
    assert_eq!(effective_level_count(3, true), 2);
    assert_eq!(effective_level_count(2, true), 1);
}

#[test]
fn test_merged_path() {
    assert_eq!(
        merged_path(Path::new("/out/run.mzXML")),
        Path::new("/out/run.mzXML_merged")
    );
}

#[test]
fn test_strategy_from_str() {
    assert_eq!(MergeStrategy::from_str("mzXML").unwrap(), MergeStrategy::MzXml);
    assert_eq!(
        MergeStrategy::from_str("concat").unwrap(),
        MergeStrategy::Concatenate
    );
    assert!(MergeStrategy::from_str("zip").is_err());
    assert_eq!(MergeStrategy::default(), MergeStrategy::MzXml);
}

// ==================== LevelMerger ====================

#[test]
fn test_concatenate_merges_in_ascending_order() {
    let dir = tempdir().unwrap();
    let base = dir.path().join("run.mzXML");
    fs::write(&base, "level-1\n").unwrap();
    fs::write(level_path(&base, 2), "level-2\n").unwrap();
    fs::write(level_path(&base, 3), "level-3\n").unwrap();

    let merged = LevelMerger::new(MergeStrategy::Concatenate)
        .merge(&base, 3)
        .unwrap();

    assert_eq!(merged, merged_path(&base));
    assert_eq!(
        fs::read_to_string(&merged).unwrap(),
        "level-1\nlevel-2\nlevel-3\n"
    );
    // Level files are left for the caller to clean up
    assert!(base.exists());
    assert!(level_path(&base, 3).exists());
}

#[test]
fn test_merge_ignores_levels_beyond_effective_count() {
    let dir = tempdir().unwrap();
    let base = dir.path().join("run.mzXML");
    fs::write(&base, "a").unwrap();
    fs::write(level_path(&base, 2), "b").unwrap();
    fs::write(level_path(&base, 3), "c").unwrap();

    let merged = LevelMerger::new(MergeStrategy::Concatenate)
        .merge(&base, effective_level_count(3, true))
        .unwrap();
    assert_eq!(fs::read_to_string(merged).unwrap(), "ab");
}

#[test]
fn test_single_effective_level_is_renamed_not_merged() {
    let dir = tempdir().unwrap();
    let base = dir.path().join("run.mzXML");
    fs::write(&base, "only level").unwrap();
    fs::write(level_path(&base, 2), "trailing").unwrap();

    let merged = LevelMerger::new(MergeStrategy::MzXml)
        .merge(&base, effective_level_count(2, true))
        .unwrap();

    // Not valid mzXML, so a real merge would have failed
    assert_eq!(fs::read_to_string(&merged).unwrap(), "only level");
    assert!(!base.exists());
}

#[test]
fn test_missing_level_file_creates_nothing() {
    let dir = tempdir().unwrap();
    let base = dir.path().join("run.mzXML");
    fs::write(&base, "level-1").unwrap();
    fs::write(level_path(&base, 2), "level-2").unwrap();

    let err = LevelMerger::new(MergeStrategy::Concatenate)
        .merge(&base, 3)
        .unwrap_err();

    match &err {
        MergeError::MissingLevelFile(path) => assert_eq!(path, &level_path(&base, 3)),
        other => panic!("unexpected error: {other}"),
    }
    assert!(err.to_string().contains("run.mzXML3"));
    assert!(!merged_path(&base).exists());
    assert_eq!(fs::read_to_string(&base).unwrap(), "level-1");
    assert_eq!(fs::read_to_string(level_path(&base, 2)).unwrap(), "level-2");
}

#[test]
fn test_zero_levels_is_an_error() {
    let dir = tempdir().unwrap();
    let err = LevelMerger::default()
        .merge(&dir.path().join("run.mzXML"), 0)
        .unwrap_err();
    assert!(matches!(err, MergeError::NothingToMerge));
}

#[test]
fn test_failed_mzxml_merge_removes_partial_output() {
    let dir = tempdir().unwrap();
    let base = dir.path().join("run.mzXML");
    fs::write(&base, mzxml_doc("run", &[(1, 1, 1.0)])).unwrap();
    fs::write(level_path(&base, 2), "<mzXML><msRun><scan num=\"1\">").unwrap();

    let err = LevelMerger::new(MergeStrategy::MzXml)
        .merge(&base, 2)
        .unwrap_err();
    assert!(matches!(
        err,
        MergeError::InvalidStructure(_) | MergeError::Xml(_)
    ));
    assert!(!merged_path(&base).exists());
}

proptest! {
    #[test]
    fn prop_concatenation_is_order_sensitive(
        contents in prop::collection::vec("[a-z]{1,12}", 2..6)
    ) {
        let dir = tempdir().unwrap();
        let base = dir.path().join("run.mzXML");
        for (i, content) in contents.iter().enumerate() {
            fs::write(level_path(&base, i + 1), content).unwrap();
        }

        let merged = LevelMerger::new(MergeStrategy::Concatenate)
            .merge(&base, contents.len())
            .unwrap();
        let merged = fs::read_to_string(merged).unwrap();

        prop_assert_eq!(&merged, &contents.concat());
        let mut reversed = contents.clone();
        reversed.reverse();
        if reversed.concat() != contents.concat() {
            prop_assert_ne!(&merged, &reversed.concat());
        }
    }
}

// ==================== mzXML merging ====================

#[test]
fn test_mzxml_merge_renumbers_scans_in_level_order() {
    let level1 = mzxml_doc("run", &[(1, 1, 0.5), (2, 1, 1.5)]);
    let level2 = mzxml_doc("run", &[(1, 1, 0.7), (2, 2, 0.9), (3, 1, 1.7)]);

    let (merged, stats) = merge_docs(&[level1, level2]);

    assert_eq!(stats.segments, 2);
    assert_eq!(stats.scans, 5);
    assert_eq!(attr_values(&merged, "num"), vec!["1", "2", "3", "4", "5"]);
    assert_eq!(
        attr_values(&merged, "retentionTime"),
        vec!["PT0.5S", "PT1.5S", "PT0.7S", "PT0.9S", "PT1.7S"]
    );
    assert_eq!(attr_values(&merged, "scanCount"), vec!["5"]);
    // Level 2's scan 2 referenced its scan 1, now scan 3
    assert_eq!(attr_values(&merged, "precursorScanNum"), vec!["3"]);
    assert_eq!(merged.matches("<msRun").count(), 1);
    assert_eq!(merged.matches("<parentFile").count(), 1);
}

/// One scan per `(num, msLevel, precursor)`; scans with a precursor are MS2.
fn filtered_doc(scans: &[(u32, u8, Option<u32>)]) -> String {
    let mut doc = String::from("<mzXML>\n  <msRun scanCount=\"0\">\n");
    for (num, ms_level, precursor) in scans {
        doc.push_str(&format!("    <scan num=\"{}\" msLevel=\"{}\">\n", num, ms_level));
        if let Some(precursor) = precursor {
            doc.push_str(&format!(
                "      <precursorMz precursorScanNum=\"{}\">500.25</precursorMz>\n",
                precursor
            ));
        }
        doc.push_str("    </scan>\n");
    }
    doc.push_str("  </msRun>\n</mzXML>\n");
    doc
}

#[test]
fn test_mzxml_merge_resolves_precursors_in_earlier_levels() {
    // msLevel-filtered passes keep the vendor numbering
    let level1 = filtered_doc(&[(1, 1, None), (3, 1, None)]);
    let level2 = filtered_doc(&[(2, 2, Some(1)), (4, 2, Some(3))]);

    let (merged, _) = merge_docs(&[level1, level2]);

    assert_eq!(attr_values(&merged, "num"), vec!["1", "2", "3", "4"]);
    assert_eq!(attr_values(&merged, "msLevel"), vec!["1", "1", "2", "2"]);
    assert_eq!(attr_values(&merged, "precursorScanNum"), vec!["1", "2"]);
}

#[test]
fn test_mzxml_merge_keeps_unresolved_precursor() {
    let level1 = filtered_doc(&[(1, 1, None)]);
    let level2 = filtered_doc(&[(2, 2, Some(9))]);

    let (merged, _) = merge_docs(&[level1, level2]);

    assert_eq!(attr_values(&merged, "precursorScanNum"), vec!["9"]);
}

#[test]
fn test_mzxml_merge_drops_offset_index() {
    let level1 = mzxml_doc("run", &[(1, 1, 0.5)]);
    let level2 = mzxml_doc("run", &[(1, 1, 0.6)]);

    let (merged, _) = merge_docs(&[level1, level2]);

    assert!(!merged.contains("<index"));
    assert!(!merged.contains("<indexOffset>"));
    assert!(!merged.contains("<sha1>"));
    assert!(merged.trim_end().ends_with("</mzXML>"));
    assert!(merged.starts_with("<?xml"));
}

#[test]
fn test_mzxml_merge_order_is_observable() {
    let a = mzxml_doc("run", &[(1, 1, 1.0)]);
    let b = mzxml_doc("run", &[(1, 1, 2.0)]);

    let (ab, _) = merge_docs(&[a.clone(), b.clone()]);
    let (ba, _) = merge_docs(&[b, a]);

    assert_eq!(attr_values(&ab, "retentionTime"), vec!["PT1S", "PT2S"]);
    assert_eq!(attr_values(&ba, "retentionTime"), vec!["PT2S", "PT1S"]);
}

#[test]
fn test_mzxml_merge_into_empty_run() {
    let level1 = "<mzXML><msRun scanCount=\"0\"/></mzXML>".to_string();
    let level2 = mzxml_doc("run", &[(7, 1, 3.0)]);

    let (merged, stats) = merge_docs(&[level1, level2]);
    assert_eq!(stats.scans, 1);
    assert_eq!(attr_values(&merged, "num"), vec!["1"]);
    assert!(merged.contains("</msRun>"));
}

#[test]
fn test_mzxml_merge_rejects_documents_without_run() {
    let segments = vec![Cursor::new(b"<mzXML></mzXML>".to_vec())];
    let err = merge_mzxml(segments, Vec::new()).unwrap_err();
    assert!(matches!(err, MergeError::InvalidStructure(_)));

    let segments: Vec<Cursor<Vec<u8>>> = Vec::new();
    assert!(matches!(
        merge_mzxml(segments, Vec::new()),
        Err(MergeError::NothingToMerge)
    ));
}

#[test]
fn test_count_scans_includes_nested() {
    let doc = "<mzXML><msRun><scan num=\"1\"><scan num=\"2\"/></scan><scan num=\"3\"></scan></msRun></mzXML>";
    assert_eq!(count_scans(doc.as_bytes()).unwrap(), 3);
}
