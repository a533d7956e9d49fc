//! Shared machine fixture for the execution-engine tests.

#![allow(dead_code)]

use ovum_runtime::{RuntimeError, StackFrame, Value, VirtualTableStore};
use ovum_vm::commands::{CommandArg, create_command};
use ovum_vm::{
    Executor, FunctionStore, IoCapture, VmIo, register_builtin_functions,
    register_builtin_vtables,
};

/// A fully wired executor with the built-in catalog installed and the
/// guest streams captured in memory.
pub struct Machine {
    pub executor: Executor,
    pub capture: IoCapture,
}

impl Machine {
    pub fn new() -> Self {
        Self::with_input("")
    }

    pub fn with_input(input: &str) -> Self {
        Self::build(input, 4096, |_, _| {})
    }

    pub fn with_gc_threshold(threshold: usize) -> Self {
        Self::build("", threshold, |_, _| {})
    }

    /// Builds a machine whose stores hold extra user functions or classes
    /// on top of the built-in catalog.
    pub fn with_program(setup: impl FnOnce(&mut FunctionStore, &mut VirtualTableStore)) -> Self {
        Self::build("", 4096, setup)
    }

    fn build(
        input: &str,
        threshold: usize,
        setup: impl FnOnce(&mut FunctionStore, &mut VirtualTableStore),
    ) -> Self {
        let mut vtables = VirtualTableStore::new();
        let mut functions = FunctionStore::new();
        register_builtin_vtables(&mut vtables).expect("builtin vtables install");
        register_builtin_functions(&mut functions).expect("builtin functions install");
        setup(&mut functions, &mut vtables);
        let (io, capture) = VmIo::capture(input);
        let executor = Executor::new(vtables, functions, io, threshold);
        Self { executor, capture }
    }

    /// Runs a command sequence inside a single frame.
    ///
    /// The frame is popped afterwards, so locals do not survive across
    /// calls; use one `run` per scenario that needs them.
    pub fn run(&mut self, ops: &[(&str, CommandArg)]) -> Result<(), RuntimeError> {
        let mut ctx = self.executor.context();
        ctx.memory.stack_frames.push(StackFrame::new("test"));
        let mut result = Ok(());
        for (name, arg) in ops {
            let command = create_command(name, arg.clone()).expect("known opcode");
            if let Err(error) = command.execute(&mut ctx) {
                result = Err(error);
                break;
            }
        }
        let _ = ctx.memory.stack_frames.pop();
        result
    }

    pub fn pop(&mut self) -> Value {
        self.executor.context().memory.machine_stack.pop("test pop").expect("value on stack")
    }

    pub fn pop_int(&mut self) -> i64 {
        match self.pop() {
            Value::Int(v) => v,
            other => panic!("expected int on stack, found {other:?}"),
        }
    }

    pub fn pop_bool(&mut self) -> bool {
        match self.pop() {
            Value::Bool(v) => v,
            other => panic!("expected bool on stack, found {other:?}"),
        }
    }

    pub fn pop_float(&mut self) -> f64 {
        match self.pop() {
            Value::Float(v) => v,
            other => panic!("expected float on stack, found {other:?}"),
        }
    }

    /// Pops a `String` instance and returns its text.
    pub fn pop_string(&mut self) -> String {
        let value = self.pop();
        let Value::Object(reference) = value else {
            panic!("expected String object on stack, found {value:?}");
        };
        self.executor.context().string_value(reference, "test").expect("String instance")
    }

    pub fn stack_depth(&self) -> usize {
        self.executor.memory().machine_stack.len()
    }

    pub fn live_objects(&self) -> usize {
        self.executor.heap().repository().len()
    }
}

pub fn cmd(name: &'static str) -> (&'static str, CommandArg) {
    (name, CommandArg::None)
}

pub fn int_cmd(name: &'static str, value: i64) -> (&'static str, CommandArg) {
    (name, CommandArg::Int(value))
}

pub fn float_cmd(name: &'static str, value: f64) -> (&'static str, CommandArg) {
    (name, CommandArg::Float(value))
}

pub fn bool_cmd(name: &'static str, value: bool) -> (&'static str, CommandArg) {
    (name, CommandArg::Bool(value))
}

pub fn str_cmd(name: &'static str, value: &str) -> (&'static str, CommandArg) {
    (name, CommandArg::Str(value.to_string()))
}

pub fn ident_cmd(name: &'static str, value: &str) -> (&'static str, CommandArg) {
    (name, CommandArg::Ident(value.to_string()))
}
