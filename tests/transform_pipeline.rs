use std::sync::Arc;

use dataset_engine::store::DatasetStore;
use dataset_engine::transform::{
    FileLedger, MemoryLedger, RecordOutcome, SandboxOptions, Transformation, TransformationLedger,
    TransformationSandbox,
};
use dataset_engine::types::{DataType, Field, Schema, Table, Value};
use dataset_engine::EngineError;

fn messy_table() -> Table {
    let schema = Schema::new(vec![
        Field::new("id", DataType::Int64),
        Field::new("City", DataType::Utf8),
        Field::new("amount", DataType::Float64),
    ]);
    let row = |id: i64, city: Option<&str>, amount: Option<f64>| {
        vec![
            Value::Int64(id),
            city.map(|c| Value::Utf8(c.to_string())).unwrap_or(Value::Null),
            amount.map(Value::Float64).unwrap_or(Value::Null),
        ]
    };
    Table::new(
        schema,
        vec![
            row(1, Some("Paris"), Some(10.0)),
            row(1, Some("Paris"), Some(10.0)),
            row(2, Some("TOKYO"), None),
            row(3, None, Some(30.0)),
            row(4, Some("Lima"), Some(40.0)),
        ],
    )
}

fn memory_sandbox(ledger: Arc<MemoryLedger>) -> TransformationSandbox {
    TransformationSandbox::new(ledger).with_options(SandboxOptions {
        output_dir: None,
        ..Default::default()
    })
}

#[test]
fn ledger_shapes_match_live_table_and_replay_reproduces_it() {
    let ledger = Arc::new(MemoryLedger::new());
    let sandbox = memory_sandbox(ledger.clone());

    let original = messy_table();
    let mut store = DatasetStore::new();
    store.load_table(original.clone(), "messy.csv");

    let pipeline = [
        "drop_duplicates()",
        "fillna(amount, 0)",
        "lower(City)",
        "rename(City, city)",
    ];
    for expr in pipeline {
        let before = store.current().unwrap().shape();
        let result = sandbox.apply(&mut store, expr, "step").unwrap();
        assert_eq!(result.shape_before, before);
        assert_eq!(result.shape_after, store.current().unwrap().shape());
    }

    let history = ledger.history();
    assert_eq!(history.len(), pipeline.len());
    for (record, expr) in history.iter().zip(pipeline) {
        assert_eq!(record.expression, expr);
        assert!(record.is_accepted());
    }
    // Consecutive records chain: each starts where the previous ended.
    for pair in history.windows(2) {
        match &pair[0].outcome {
            RecordOutcome::Accepted { shape_after } => {
                assert_eq!(*shape_after, pair[1].shape_before);
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    // Replaying the ledger's expressions from the original table reproduces
    // the final table exactly.
    let mut replayed = original;
    for record in &history {
        replayed = Transformation::parse(&record.expression)
            .unwrap()
            .apply(&replayed)
            .unwrap();
    }
    assert_eq!(&replayed, store.current().unwrap());
}

#[test]
fn transformations_compose_in_issue_order() {
    let ledger = Arc::new(MemoryLedger::new());
    let sandbox = memory_sandbox(ledger);
    let mut store = DatasetStore::new();
    store.load_table(messy_table(), "messy.csv");

    // dropna() before fillna() removes the null rows, so fillna changes
    // nothing; the reverse order would have kept all five rows.
    sandbox.apply(&mut store, "dropna()", "step").unwrap();
    assert_eq!(store.current().unwrap().row_count(), 3);
    sandbox.apply(&mut store, "fillna(amount, 0)", "step").unwrap();
    assert_eq!(store.current().unwrap().row_count(), 3);
}

#[test]
fn rejected_expression_reaches_the_rejection_channel() {
    let ledger = Arc::new(MemoryLedger::new());
    let sandbox = memory_sandbox(ledger.clone());
    let mut store = DatasetStore::new();
    store.load_table(messy_table(), "messy.csv");

    let err = sandbox
        .apply(&mut store, "__import__('os').system('ls')", "bad")
        .unwrap_err();
    assert!(matches!(err, EngineError::UnsafeExpression { .. }));

    let history = ledger.history();
    assert_eq!(history.len(), 1);
    match &history[0].outcome {
        RecordOutcome::Rejected { reason } => assert!(reason.contains("unsafe expression")),
        other => panic!("unexpected outcome: {other:?}"),
    }
    // Store untouched.
    assert_eq!(store.current().unwrap().shape(), (5, 3));
}

#[test]
fn failed_execution_keeps_prior_snapshot_for_next_call() {
    let ledger = Arc::new(MemoryLedger::new());
    let sandbox = memory_sandbox(ledger.clone());
    let mut store = DatasetStore::new();
    store.load_table(messy_table(), "messy.csv");

    sandbox.apply(&mut store, "drop_duplicates()", "step").unwrap();
    let err = sandbox
        .apply(&mut store, "astype(City, int)", "step")
        .unwrap_err();
    assert!(matches!(err, EngineError::Execution { .. }));

    // The failed cast did not commit; the next transformation sees the
    // deduplicated table.
    let result = sandbox.apply(&mut store, "dropna()", "step").unwrap();
    assert_eq!(result.shape_before, (4, 3));
    assert_eq!(ledger.history().len(), 2); // the failed cast left no record
}

#[test]
fn file_ledger_survives_sandbox_lifetimes() {
    let dir = tempfile::tempdir().unwrap();
    let log_path = dir.path().join("logs").join("transformation_log.md");

    {
        let ledger = Arc::new(FileLedger::new(&log_path));
        let sandbox = TransformationSandbox::new(ledger).with_options(SandboxOptions {
            output_dir: None,
            ..Default::default()
        });
        let mut store = DatasetStore::new();
        store.load_table(messy_table(), "messy.csv");
        sandbox.apply(&mut store, "drop_duplicates()", "step").unwrap();
        sandbox.apply(&mut store, "dropna()", "step").unwrap();
    }

    let text = std::fs::read_to_string(&log_path).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].contains("EXECUTED drop_duplicates()"));
    assert!(lines[0].contains("(5, 3) -> (4, 3)"));
    assert!(lines[1].contains("EXECUTED dropna()"));
}

#[test]
fn typed_operations_bypass_the_textual_gate() {
    // A column name that trips the deny-list ("profile" contains "file") is
    // still reachable through the typed API.
    let schema = Schema::new(vec![
        Field::new("id", DataType::Int64),
        Field::new("profile", DataType::Utf8),
    ]);
    let table = Table::new(
        schema,
        vec![
            vec![Value::Int64(1), Value::Utf8("a".to_string())],
            vec![Value::Int64(2), Value::Null],
        ],
    );
    let ledger = Arc::new(MemoryLedger::new());
    let sandbox = memory_sandbox(ledger.clone());
    let mut store = DatasetStore::new();
    store.load_table(table, "profiles.csv");

    let err = sandbox.apply(&mut store, "dropna(profile)", "step").unwrap_err();
    assert!(matches!(err, EngineError::UnsafeExpression { .. }));

    let op = Transformation::DropMissing {
        column: Some("profile".to_string()),
    };
    let result = sandbox.apply_operation(&mut store, &op, "step").unwrap();
    assert_eq!(result.shape_after, (1, 2));
    assert_eq!(ledger.history().last().unwrap().expression, "dropna(profile)");
}
