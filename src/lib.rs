//! `dataset-engine` is a small library for loading a delimited text file into
//! a single in-memory [`types::Table`], mutating it through an audited
//! transformation sandbox, and analyzing the result.
//!
//! The engine is built for an external orchestrator that issues ordered
//! calls: load, inspect, transform, profile, analyze. The [`store::DatasetStore`]
//! owns the one live table; transformations go through a safety gate and an
//! append-only ledger before committing; profiling and the statistical
//! analyzers are read-only consumers of the latest snapshot.
//!
//! ## Loading
//!
//! [`store::DatasetStore::load`] sniffs the delimiter (`,` `;` tab `|`) and
//! encoding (UTF-8, Latin-1, CP1252, ISO-8859-1), infers column types, and
//! replaces any previously loaded table outright:
//!
//! ```no_run
//! use dataset_engine::store::DatasetStore;
//!
//! # fn main() -> Result<(), dataset_engine::EngineError> {
//! let mut store = DatasetStore::new();
//! let table = store.load("sales.csv")?;
//! println!("shape = {:?}", table.shape());
//! # Ok(())
//! # }
//! ```
//!
//! ## Transforming
//!
//! Transformations are a closed allow-list of typed operations
//! ([`transform::Transformation`]); expression text in method-call style is
//! screened by a deny-list ([`transform::SafetyPolicy`]) before parsing.
//! Every accepted transformation lands on the injected ledger with its
//! before/after shape:
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use dataset_engine::store::DatasetStore;
//! use dataset_engine::transform::{
//!     MemoryLedger, SandboxOptions, TransformationLedger, TransformationSandbox,
//! };
//! use dataset_engine::types::{DataType, Field, Schema, Table, Value};
//!
//! # fn main() -> Result<(), dataset_engine::EngineError> {
//! let schema = Schema::new(vec![Field::new("id", DataType::Int64)]);
//! let table = Table::new(
//!     schema,
//!     vec![vec![Value::Int64(1)], vec![Value::Int64(1)], vec![Value::Int64(2)]],
//! );
//! let mut store = DatasetStore::new();
//! store.load_table(table, "demo.csv");
//!
//! let ledger = Arc::new(MemoryLedger::new());
//! let sandbox = TransformationSandbox::new(ledger.clone()).with_options(SandboxOptions {
//!     output_dir: None, // skip the cleaned-data CSV in this example
//!     ..Default::default()
//! });
//!
//! let result = sandbox.apply(&mut store, "drop_duplicates()", "clean")?;
//! assert_eq!(result.shape_before, (3, 1));
//! assert_eq!(result.shape_after, (2, 1));
//! assert_eq!(ledger.history().len(), 1);
//!
//! // Unsafe expressions never execute.
//! assert!(sandbox.apply(&mut store, "eval('1')", "clean").is_err());
//! # Ok(())
//! # }
//! ```
//!
//! ## Profiling and analysis
//!
//! [`profile::profile`], [`analysis::detect_outliers`], and
//! [`analysis::analyze_trend`] are pure functions of the current table:
//!
//! ```rust
//! use dataset_engine::analysis::{detect_outliers, OutlierMethod};
//! use dataset_engine::profile::profile;
//! use dataset_engine::types::{DataType, Field, Schema, Table, Value};
//!
//! # fn main() -> Result<(), dataset_engine::EngineError> {
//! let schema = Schema::new(vec![Field::new("x", DataType::Float64)]);
//! let rows = [1.0, 2.0, 3.0, 4.0, 100.0]
//!     .iter()
//!     .map(|v| vec![Value::Float64(*v)])
//!     .collect();
//! let table = Table::new(schema, rows);
//!
//! let p = profile(&table);
//! assert_eq!(p.completeness_pct, 100.0);
//!
//! let report = detect_outliers(&table, "x", OutlierMethod::Iqr)?;
//! assert_eq!(report.methods[0].outlier_count, 1);
//! # Ok(())
//! # }
//! ```
//!
//! ## Modules
//!
//! - [`store`]: the dataset store (one live table + load metadata)
//! - [`ingestion`]: sniffing CSV loader and cleaned-table writer
//! - [`transform`]: safety policy, typed transformations, sandbox, ledger
//! - [`profile`]: schema/quality profiling with JSON and Markdown output
//! - [`analysis`]: outlier detection, trend analysis, descriptive statistics
//! - [`error`]: the shared error enum

pub mod analysis;
pub mod error;
pub mod ingestion;
pub mod profile;
pub mod store;
pub mod transform;
pub mod types;

pub use error::{EngineError, EngineResult};
