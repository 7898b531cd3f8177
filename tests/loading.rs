use std::io::Write as _;
use std::sync::Arc;

use dataset_engine::store::DatasetStore;
use dataset_engine::transform::{MemoryLedger, SandboxOptions, TransformationSandbox};
use dataset_engine::types::{DataType, Value};
use dataset_engine::EngineError;

#[test]
fn load_fixture_infers_schema_and_metadata() {
    let mut store = DatasetStore::new();
    store.load("tests/fixtures/people.csv").unwrap();

    let table = store.current().unwrap();
    assert_eq!(table.shape(), (5, 4));
    let types: Vec<DataType> = table.schema.fields.iter().map(|f| f.data_type).collect();
    assert_eq!(
        types,
        vec![
            DataType::Int64,
            DataType::Utf8,
            DataType::Float64,
            DataType::Bool
        ]
    );
    assert_eq!(table.rows[2][2], Value::Null);

    let meta = store.metadata().unwrap();
    assert_eq!(meta.file_name, "people.csv");
    assert_eq!(meta.original_shape, (5, 4));
}

#[test]
fn load_missing_file_is_an_io_error() {
    let mut store = DatasetStore::new();
    let err = store.load("tests/fixtures/does_not_exist.csv").unwrap_err();
    assert!(matches!(err, EngineError::Io(_)));
}

#[test]
fn current_before_any_load_fails() {
    let store = DatasetStore::new();
    assert!(matches!(store.current(), Err(EngineError::NotLoaded)));
}

#[test]
fn load_replaces_prior_table_outright() {
    let dir = tempfile::tempdir().unwrap();
    let small = dir.path().join("small.csv");
    std::fs::write(&small, "a,b\n1,2\n").unwrap();

    let mut store = DatasetStore::new();
    store.load("tests/fixtures/people.csv").unwrap();
    store.load(&small).unwrap();

    assert_eq!(store.current().unwrap().shape(), (1, 2));
    assert_eq!(store.metadata().unwrap().file_name, "small.csv");
}

#[test]
fn wide_comma_file_round_trips_shape() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("wide.csv");
    let mut f = std::fs::File::create(&path).unwrap();
    writeln!(f, "id,value,label").unwrap();
    for i in 0..100 {
        writeln!(f, "{i},{}.5,row{i}", i * 2).unwrap();
    }
    drop(f);

    let mut store = DatasetStore::new();
    store.load(&path).unwrap();
    assert_eq!(store.current().unwrap().shape(), (100, 3));
}

#[test]
fn tab_and_pipe_delimiters_are_sniffed() {
    let dir = tempfile::tempdir().unwrap();

    let tab = dir.path().join("data.tsv");
    std::fs::write(&tab, "id\tname\n1\tAda\n").unwrap();
    let mut store = DatasetStore::new();
    store.load(&tab).unwrap();
    assert_eq!(store.current().unwrap().shape(), (1, 2));

    let pipe = dir.path().join("data.psv");
    std::fs::write(&pipe, "id|name\n1|Ada\n2|Grace\n").unwrap();
    store.load(&pipe).unwrap();
    assert_eq!(store.current().unwrap().shape(), (2, 2));
}

#[test]
fn dedup_persists_reduced_row_count() {
    // 100 rows of which 10 are duplicates of earlier rows.
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("dupes.csv");
    let mut f = std::fs::File::create(&path).unwrap();
    writeln!(f, "id,value").unwrap();
    for i in 0..90 {
        writeln!(f, "{i},{}", i * 10).unwrap();
    }
    for i in 0..10 {
        writeln!(f, "{i},{}", i * 10).unwrap();
    }
    drop(f);

    let mut store = DatasetStore::new();
    store.load(&path).unwrap();
    assert_eq!(store.current().unwrap().shape(), (100, 2));

    let out_dir = dir.path().join("cleaned_data");
    let sandbox = TransformationSandbox::new(Arc::new(MemoryLedger::new())).with_options(
        SandboxOptions {
            output_dir: Some(out_dir.clone()),
            ..Default::default()
        },
    );
    let result = sandbox
        .apply(&mut store, "drop_duplicates()", "deduped")
        .unwrap();
    assert_eq!(result.shape_after, (90, 2));

    let saved = std::fs::read_to_string(out_dir.join("deduped.csv")).unwrap();
    assert_eq!(saved.lines().count(), 91); // header + 90 rows

    // Idempotence: a second pass is a no-op on row count.
    let again = sandbox
        .apply(&mut store, "drop_duplicates()", "deduped")
        .unwrap();
    assert_eq!(again.shape_after, (90, 2));
}
