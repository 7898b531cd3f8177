//! Textual safety gate for transformation expressions.

use crate::error::{EngineError, EngineResult};

/// Substrings associated with code execution, filesystem, process, or
/// introspection primitives. Matched case-insensitively, anywhere in the
/// expression.
const DENY_LIST: [&str; 12] = [
    "import",
    "exec",
    "eval",
    "compile",
    "__",
    "open",
    "file",
    "system",
    "subprocess",
    "spawn",
    "globals",
    "getattr",
];

/// Conservative deny-list filter applied before any expression is parsed.
///
/// This is a textual scan, not a parser: it trades false positives (a safe
/// expression that happens to contain a banned substring) for the guarantee
/// that no expression containing a scanned token ever reaches execution.
/// Passing the check does not make an expression semantically safe; the typed
/// operation allow-list in [`crate::transform::Transformation`] is the actual
/// execution boundary.
#[derive(Debug, Clone, Copy, Default)]
pub struct SafetyPolicy;

impl SafetyPolicy {
    /// Accept or reject `expression`.
    ///
    /// Returns [`EngineError::UnsafeExpression`] naming the first matched
    /// token.
    pub fn evaluate(&self, expression: &str) -> EngineResult<()> {
        let lowered = expression.to_lowercase();
        for token in DENY_LIST {
            if lowered.contains(token) {
                return Err(EngineError::UnsafeExpression {
                    expression: expression.to_string(),
                    token: token.to_string(),
                });
            }
        }
        Ok(())
    }
}
