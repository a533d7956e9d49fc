//! The non-error result of executing one execution-tree node.

use ovum_runtime::RuntimeError;

/// Outcome of executing a node of the execution tree.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExecutionOutcome {
    /// The node completed; continue with the next statement.
    Normal,
    /// A `Break` reached this point; the nearest loop absorbs it.
    Break,
    /// A `Continue` reached this point; the nearest loop restarts.
    Continue,
    /// A `Return` reached this point; the function boundary absorbs it.
    Return,
    /// A branch condition evaluated to false (internal to `IfMultibranch`).
    ConditionFalse,
}

/// Result alias used by every execution-tree node.
pub type ExecOutcome = Result<ExecutionOutcome, RuntimeError>;
