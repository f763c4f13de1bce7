use std::path::{Path, PathBuf};
use std::sync::Arc;

use arrow::array::{ArrayRef, Float64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;

use wine_explorer::config::{PipelineConfig, SourceSpec};
use wine_explorer::data::model::is_placeholder;
use wine_explorer::data::parse::read_source;
use wine_explorer::{compare, deduplicate, merge, pipeline, summarize, Error};

const RED_CSV: &str = "\
Red wine export,,,
alcohol,pH,Unnamed: 5,quality
9.4,3.51,x,5
9.6,3.20,,6
,,,
";

const WHITE_CSV: &str = "\
White wine export,,,
alcohol,pH,,quality
10.0,3.00,,6
10.4,oops,,6
";

fn write(dir: &Path, name: &str, text: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, text).unwrap();
    path
}

fn config(dir: &Path) -> PipelineConfig {
    PipelineConfig {
        sources: vec![
            SourceSpec {
                label: "red".into(),
                path: write(dir, "red.csv", RED_CSV),
            },
            SourceSpec {
                label: "white".into(),
                path: write(dir, "white.csv", WHITE_CSV),
            },
        ],
        ..PipelineConfig::default()
    }
}

#[test]
fn two_sources_become_one_clean_dataset() {
    let dir = tempfile::tempdir().unwrap();
    let analysis = pipeline::run(&config(dir.path())).unwrap();
    let ds = &analysis.dataset;

    assert_eq!(ds.len(), 4);
    assert_eq!(ds.features(), ["alcohol", "pH", "quality"]);
    assert!(ds.features().iter().all(|f| !is_placeholder(f)));
    assert!(ds.rows().iter().all(|r| !r.is_all_missing()));

    let alcohol = &analysis.summary[0];
    assert_eq!(alcohol.count, 4);
    assert_eq!(alcohol.mean, 9.85);

    let ph = &analysis.summary[1];
    assert_eq!(ph.count, 3);

    assert_eq!(analysis.means.get("red", "alcohol"), Some(9.5));
    let diff = analysis.diff.as_ref().unwrap();
    assert!((diff.get("alcohol").unwrap() - 0.7).abs() < 1e-9);
    assert_eq!(diff.get("quality"), Some(0.5));
}

#[test]
fn duplicate_rows_across_the_merge_are_removed_once() {
    let dir = tempfile::tempdir().unwrap();
    let red = read_source(&write(dir.path(), "a.csv", RED_CSV), "red", "type").unwrap();
    let merged = merge(&[red.clone(), red.clone()]).unwrap();
    assert_eq!(merged.len(), 4);
    let clean = deduplicate(&merged);
    assert_eq!(clean.len(), 2);
    assert_eq!(clean, deduplicate(&clean));
    assert_eq!(clean.rows(), red.rows());
}

#[test]
fn same_rows_with_different_labels_are_not_duplicates() {
    let dir = tempfile::tempdir().unwrap();
    let path = write(dir.path(), "a.csv", RED_CSV);
    let red = read_source(&path, "red", "type").unwrap();
    let white = read_source(&path, "white", "type").unwrap();
    assert_eq!(deduplicate(&merge(&[red, white]).unwrap()).len(), 4);
}

#[test]
fn mismatched_sources_fail_the_run() {
    let dir = tempfile::tempdir().unwrap();
    let mut cfg = config(dir.path());
    cfg.sources[1].path = write(dir.path(), "odd.csv", "banner\nalcohol,density\n10,0.99\n");
    assert!(matches!(pipeline::run(&cfg), Err(Error::SchemaMismatch { .. })));
}

#[test]
fn unreadable_source_fails_the_run() {
    let dir = tempfile::tempdir().unwrap();
    let mut cfg = config(dir.path());
    cfg.sources[0].path = dir.path().join("missing.csv");
    assert!(matches!(pipeline::run(&cfg), Err(Error::SourceRead { .. })));

    cfg.sources[0].path = write(dir.path(), "broken.json", "[[\"banner\"], [\"alcohol\"");
    assert!(matches!(pipeline::run(&cfg), Err(Error::SourceRead { .. })));
}

#[test]
fn json_and_parquet_sheets_parse_like_csv() {
    let dir = tempfile::tempdir().unwrap();
    let json = write(
        dir.path(),
        "white.json",
        r#"[["White", null], ["alcohol", "quality"], [10.0, 6], [10.4, "6"], [null, null]]"#,
    );
    let from_json = read_source(&json, "white", "type").unwrap();
    assert_eq!(from_json.len(), 2);

    // Field names are ignored; the banner and header are data rows.
    let path = dir.path().join("white.parquet");
    let schema = Arc::new(Schema::new(vec![
        Field::new("c0", DataType::Utf8, true),
        Field::new("c1", DataType::Float64, true),
    ]));
    let c0: StringArray = vec![Some("White"), Some("alcohol"), Some("10.0"), Some("10.4")]
        .into_iter()
        .collect();
    let c1 = Float64Array::from(vec![None, None, Some(6.0), Some(6.0)]);
    let batch = RecordBatch::try_new(
        schema.clone(),
        vec![Arc::new(c0) as ArrayRef, Arc::new(c1) as ArrayRef],
    )
    .unwrap();
    let mut writer = ArrowWriter::try_new(std::fs::File::create(&path).unwrap(), schema, None).unwrap();
    writer.write(&batch).unwrap();
    writer.close().unwrap();

    // Header cell of c1 is null, so that column is a placeholder.
    let from_parquet = read_source(&path, "white", "type").unwrap();
    assert_eq!(from_parquet.features(), ["alcohol"]);
    assert_eq!(from_parquet.len(), 2);
}

#[test]
fn blank_first_line_does_not_shift_the_header() {
    let dir = tempfile::tempdir().unwrap();
    let path = write(dir.path(), "red.csv", "\nalcohol,pH\n9.4,3.5\n10.0,3.1\n");
    let ds = read_source(&path, "red", "type").unwrap();
    assert_eq!(ds.features(), ["alcohol", "pH"]);
    assert_eq!(ds.len(), 2);
}

#[test]
fn xlsx_sheet_parses_like_csv() {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/red.xlsx");
    let ds = read_source(&path, "red", "type").unwrap();
    // Row 1 of the sheet is blank, the notes column has no header.
    assert_eq!(ds.features(), ["alcohol", "pH", "quality"]);
    // The notes-only row is dropped, the junk pH cell is missing.
    assert_eq!(ds.len(), 3);
    assert_eq!(ds.rows()[1].get(1), wine_explorer::Cell::Missing);
    assert_eq!(deduplicate(&ds).len(), 2);
}

#[test]
fn summary_and_compare_on_parsed_data() {
    let dir = tempfile::tempdir().unwrap();
    let text = "banner\nx\n5\n7\nabc\n9\n";
    let ds = read_source(&write(dir.path(), "x.csv", text), "red", "type").unwrap();
    // "abc" is missing in the only feature, so its row is dropped.
    assert_eq!(ds.len(), 3);
    let s = &summarize(&ds, 2)[0];
    assert_eq!((s.count, s.mean), (3, 7.0));

    let (means, diff) = compare(&ds, "type", "red", "white").unwrap();
    assert_eq!(means.categories().collect::<Vec<_>>(), ["red"]);
    assert!(diff.is_none());
}

#[test]
fn reports_and_export_are_written() {
    let dir = tempfile::tempdir().unwrap();
    let analysis = pipeline::run(&config(dir.path())).unwrap();

    let out = dir.path().join("reports");
    analysis.write_reports(&out).unwrap();
    for name in ["summary.csv", "summary.json", "means.csv", "means.json", "diff.csv"] {
        assert!(out.join(name).exists(), "{name} missing");
    }
    let summary_csv = std::fs::read_to_string(out.join("summary.csv")).unwrap();
    assert!(summary_csv.starts_with("feature,count,mean,std,min,25%,50%,75%,max"));

    let export = dir.path().join("wine.csv");
    analysis.export_dataset(&export).unwrap();
    let text = std::fs::read_to_string(&export).unwrap();
    assert_eq!(text.lines().count(), 5);
    assert!(text.starts_with("alcohol,pH,quality,type\n"));

    let rendered = analysis.render(2).unwrap();
    assert!(rendered.contains("Descriptive statistics"));
    assert!(rendered.contains("Differences (white - red)"));
}
