use formwatch_connectors::CsvRowSource;
use formwatch_core::{ExErrorKind, RowSource};
use std::io::Write;
use tempfile::NamedTempFile;

fn export(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

#[test]
fn test_reads_rows_after_header() {
    let file = export(
        "Timestamp,Name,Phone,Inquiry\n\
         t1,Kim,010-1111-2222,pricing\n\
         t2,Lee,010-3333-4444,\"demo, onsite\"\n",
    );
    let source = CsvRowSource::new(file.path(), 1);

    let rows = source.fetch_all().unwrap();

    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].key(), "t1");
    assert_eq!(rows[1].cell(3), Some("demo, onsite"));
}

#[test]
fn test_ragged_rows_are_accepted() {
    let file = export("t1,Kim\nt2,Lee,010,extra,cells\n,,\n");
    let source = CsvRowSource::new(file.path(), 0);

    let rows = source.fetch_all().unwrap();

    assert_eq!(rows.len(), 3);
    assert_eq!(rows[0].len(), 2);
    assert_eq!(rows[1].len(), 5);
    assert!(rows[2].is_blank());
}

#[test]
fn test_missing_file_is_source_unavailable() {
    let dir = tempfile::tempdir().unwrap();
    let source = CsvRowSource::new(dir.path().join("absent.csv"), 1);

    let err = source.fetch_all().unwrap_err();

    assert_eq!(err.kind(), ExErrorKind::SourceUnavailable);
    assert!(err.message().contains("absent.csv"));
}
