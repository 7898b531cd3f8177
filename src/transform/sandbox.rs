//! Sandboxed execution of transformation expressions.
//!
//! The sandbox is the only writer of the [`DatasetStore`]: an expression is
//! screened by the [`SafetyPolicy`], parsed into a typed
//! [`Transformation`], executed against a working copy of the current table,
//! and only a fully-formed result replaces the store. The ledger entry is
//! appended after the swap commits, and the new table is persisted to the
//! cleaned-data directory.

use std::path::PathBuf;
use std::sync::Arc;

use crate::error::EngineResult;
use crate::ingestion::write_csv_to_path;
use crate::store::DatasetStore;

use super::ledger::{TransformationLedger, TransformationRecord};
use super::safety::SafetyPolicy;
use super::Transformation;

/// Options controlling sandbox behavior.
#[derive(Debug, Clone)]
pub struct SandboxOptions {
    /// Textual safety gate applied to expression text before parsing.
    pub policy: SafetyPolicy,
    /// Directory cleaned tables are written to after each accepted
    /// transformation; `None` disables persistence (useful in tests).
    pub output_dir: Option<PathBuf>,
    /// Whether policy rejections are logged on the ledger's rejection
    /// channel.
    pub record_rejections: bool,
}

impl Default for SandboxOptions {
    fn default() -> Self {
        Self {
            policy: SafetyPolicy,
            output_dir: Some(PathBuf::from("outputs/cleaned_data")),
            record_rejections: true,
        }
    }
}

/// Summary of one committed transformation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransformResult {
    /// The expression as issued.
    pub expression: String,
    /// Shape before the transformation.
    pub shape_before: (usize, usize),
    /// Shape after the transformation.
    pub shape_after: (usize, usize),
    /// Where the cleaned table was written, when persistence is enabled.
    pub saved_to: Option<PathBuf>,
}

/// Executes transformation expressions against a [`DatasetStore`].
pub struct TransformationSandbox {
    options: SandboxOptions,
    ledger: Arc<dyn TransformationLedger>,
}

impl TransformationSandbox {
    /// Create a sandbox with default options and the given ledger.
    pub fn new(ledger: Arc<dyn TransformationLedger>) -> Self {
        Self {
            options: SandboxOptions::default(),
            ledger,
        }
    }

    /// Replace the sandbox options.
    pub fn with_options(mut self, options: SandboxOptions) -> Self {
        self.options = options;
        self
    }

    /// Apply a method-call-style expression to the store's current table.
    ///
    /// On success the store holds the new table, an accepted record is on the
    /// ledger, and the table is persisted as `<output_dir>/<label>.csv`. On
    /// safety rejection or execution failure the store is untouched.
    pub fn apply(
        &self,
        store: &mut DatasetStore,
        expression: &str,
        label: &str,
    ) -> EngineResult<TransformResult> {
        let shape_before = store.current()?.shape();

        if let Err(err) = self.options.policy.evaluate(expression) {
            if self.options.record_rejections {
                self.ledger.record(&TransformationRecord::rejected(
                    expression,
                    label,
                    shape_before,
                    err.to_string(),
                ));
            }
            return Err(err);
        }

        let operation = Transformation::parse(expression)?;
        self.commit(store, &operation, expression, label, shape_before)
    }

    /// Apply an already-typed operation, bypassing the textual gate.
    ///
    /// Typed operations are safe by construction; the ledger records their
    /// canonical text form.
    pub fn apply_operation(
        &self,
        store: &mut DatasetStore,
        operation: &Transformation,
        label: &str,
    ) -> EngineResult<TransformResult> {
        let shape_before = store.current()?.shape();
        self.commit(store, operation, &operation.to_string(), label, shape_before)
    }

    fn commit(
        &self,
        store: &mut DatasetStore,
        operation: &Transformation,
        expression: &str,
        label: &str,
        shape_before: (usize, usize),
    ) -> EngineResult<TransformResult> {
        let new_table = operation.apply(store.current()?)?;
        let shape_after = new_table.shape();
        store.replace(new_table);

        // Ledger entry only after the swap has committed.
        self.ledger.record(&TransformationRecord::accepted(
            expression,
            label,
            shape_before,
            shape_after,
        ));

        let saved_to = match &self.options.output_dir {
            Some(dir) => {
                let path = dir.join(format!("{label}.csv"));
                write_csv_to_path(store.current()?, &path)?;
                Some(path)
            }
            None => None,
        };

        Ok(TransformResult {
            expression: expression.to_string(),
            shape_before,
            shape_after,
            saved_to,
        })
    }
}
