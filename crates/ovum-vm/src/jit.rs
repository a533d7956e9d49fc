//! The abstract just-in-time compilation interface.
//!
//! The VM only consumes this contract; no concrete code generator lives in
//! this workspace. The placeholder implementations never compile anything,
//! which makes [`crate::JitFunction`] a transparent pass-through.

use ovum_runtime::{OperandStack, RuntimeError};

/// Compiles and runs one function natively.
pub trait JitExecutor {
    /// Attempts to compile the function; returns whether native code is
    /// available.
    fn try_compile(&self) -> bool;

    /// Runs the compiled code against the operand stack.
    fn run(&self, stack: &mut OperandStack) -> Result<(), RuntimeError>;
}

/// Creates a [`JitExecutor`] per function declaration.
pub trait JitExecutorFactory {
    /// Creates the executor that will own `function_id`'s native code.
    fn create(&self, function_id: &str) -> Box<dyn JitExecutor>;
}

/// An executor that never compiles.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullJitExecutor;

impl JitExecutor for NullJitExecutor {
    fn try_compile(&self) -> bool {
        false
    }

    fn run(&self, _stack: &mut OperandStack) -> Result<(), RuntimeError> {
        Err(RuntimeError::other("NullJitExecutor::run: not implemented"))
    }
}

/// A factory that hands out [`NullJitExecutor`]s.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullJitExecutorFactory;

impl JitExecutorFactory for NullJitExecutorFactory {
    fn create(&self, _function_id: &str) -> Box<dyn JitExecutor> {
        Box::new(NullJitExecutor)
    }
}
