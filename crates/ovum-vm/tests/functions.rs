//! Function, wrapper, and executor tests: prologue/epilogue, memoization,
//! JIT delegation, and whole-program runs.

mod common;

use common::Machine;
use ovum_runtime::{OperandStack, RuntimeError, Value};
use ovum_vm::commands::{CommandArg, create_command};
use ovum_vm::{
    Block, Executable, Function, JitExecutor, JitFunction, NullJitExecutor, PureFunction,
    StoredFunction,
};

fn body(ops: &[(&str, CommandArg)]) -> Block {
    let mut block = Block::new();
    for (name, arg) in ops {
        block.push(Executable::Command(create_command(name, arg.clone()).expect("known opcode")));
    }
    block
}

/// `square(n) = n * n`, then `Return`.
fn square_function() -> Function {
    Function::new(
        "_Global_square_int",
        1,
        body(&[
            ("LoadLocal", CommandArg::Int(0)),
            ("LoadLocal", CommandArg::Int(0)),
            ("IntMultiply", CommandArg::None),
            ("Return", CommandArg::None),
        ]),
    )
}

#[test]
fn prologue_pops_arguments_into_locals_in_stack_order() {
    // two_locals(a, b) pushes local 0 then local 1. The caller pushes
    // a then b, so local 0 holds b (the first value popped).
    let function = Function::new(
        "_Global_two_locals_int_int",
        2,
        body(&[
            ("LoadLocal", CommandArg::Int(0)),
            ("LoadLocal", CommandArg::Int(1)),
        ]),
    );

    let mut machine = Machine::new();
    let mut ctx = machine.executor.context();
    ctx.memory.machine_stack.push(Value::Int(10));
    ctx.memory.machine_stack.push(Value::Int(20));
    function.execute(&mut ctx).unwrap();

    assert_eq!(ctx.memory.machine_stack.pop("t").unwrap(), Value::Int(10));
    assert_eq!(ctx.memory.machine_stack.pop("t").unwrap(), Value::Int(20));
    assert!(ctx.memory.stack_frames.is_empty());
}

#[test]
fn insufficient_arguments_fail_before_the_frame_is_pushed() {
    let function = square_function();
    let mut machine = Machine::new();
    let mut ctx = machine.executor.context();

    let error = function.execute(&mut ctx).unwrap_err();
    assert!(matches!(error, RuntimeError::InsufficientArguments { .. }));
    assert!(ctx.memory.stack_frames.is_empty());
}

#[test]
fn return_maps_to_normal_at_the_function_boundary() {
    let function = square_function();
    let mut machine = Machine::new();
    let mut ctx = machine.executor.context();
    ctx.memory.machine_stack.push(Value::Int(6));

    let outcome = function.execute(&mut ctx).unwrap();
    assert_eq!(outcome, ovum_vm::ExecutionOutcome::Normal);
    assert_eq!(ctx.memory.machine_stack.pop("t").unwrap(), Value::Int(36));
}

#[test]
fn counters_track_actions_and_executions() {
    let function = square_function();
    let mut machine = Machine::new();
    let mut ctx = machine.executor.context();

    ctx.memory.machine_stack.push(Value::Int(3));
    function.execute(&mut ctx).unwrap();
    let _ = ctx.memory.machine_stack.pop("t").unwrap();

    assert_eq!(function.execution_count(), 1);
    assert_eq!(function.total_action_count(), 4);

    ctx.memory.machine_stack.push(Value::Int(4));
    function.execute(&mut ctx).unwrap();
    assert_eq!(function.execution_count(), 2);
    assert_eq!(function.total_action_count(), 8);
}

#[test]
fn frames_are_popped_on_the_error_path_too() {
    let failing = Function::new(
        "_Global_fails",
        0,
        body(&[("IntAdd", CommandArg::None)]),
    );
    let mut machine = Machine::new();
    let mut ctx = machine.executor.context();

    assert!(failing.execute(&mut ctx).is_err());
    assert!(ctx.memory.stack_frames.is_empty());
    assert_eq!(failing.execution_count(), 0);
}

#[test]
fn pure_function_serves_repeat_calls_from_the_cache() {
    let pure = PureFunction::new(
        StoredFunction::Plain(square_function()),
        vec!["int".to_string()],
    )
    .unwrap();

    let mut machine = Machine::new();
    let mut ctx = machine.executor.context();

    ctx.memory.machine_stack.push(Value::Int(4));
    pure.execute(&mut ctx).unwrap();
    assert_eq!(ctx.memory.machine_stack.pop("t").unwrap(), Value::Int(16));
    assert_eq!(pure.inner().execution_count(), 1);
    let actions_after_first = pure.inner().total_action_count();

    ctx.memory.machine_stack.push(Value::Int(4));
    pure.execute(&mut ctx).unwrap();
    assert_eq!(ctx.memory.machine_stack.pop("t").unwrap(), Value::Int(16));
    assert_eq!(pure.inner().execution_count(), 1);
    assert_eq!(pure.inner().total_action_count(), actions_after_first);

    ctx.memory.machine_stack.push(Value::Int(5));
    pure.execute(&mut ctx).unwrap();
    assert_eq!(ctx.memory.machine_stack.pop("t").unwrap(), Value::Int(25));
    assert_eq!(pure.inner().execution_count(), 2);
    assert_eq!(pure.cache_len(), 2);
}

#[test]
fn pure_function_rejects_mismatched_argument_tags() {
    let pure = PureFunction::new(
        StoredFunction::Plain(square_function()),
        vec!["int".to_string()],
    )
    .unwrap();

    let mut machine = Machine::new();
    let mut ctx = machine.executor.context();
    ctx.memory.machine_stack.push(Value::Bool(true));
    assert!(pure.execute(&mut ctx).is_err());
}

#[test]
fn pure_function_arity_and_type_names_must_agree() {
    let result = PureFunction::new(
        StoredFunction::Plain(square_function()),
        vec!["int".to_string(), "int".to_string()],
    );
    assert!(result.is_err());
}

struct ConstantJit;

impl JitExecutor for ConstantJit {
    fn try_compile(&self) -> bool {
        true
    }

    fn run(&self, stack: &mut OperandStack) -> Result<(), RuntimeError> {
        let _ = stack.pop("jit")?;
        stack.push(Value::Int(99));
        Ok(())
    }
}

#[test]
fn jit_function_is_a_pass_through_below_the_boundary() {
    let jit = JitFunction::new(
        Box::new(NullJitExecutor),
        StoredFunction::Plain(square_function()),
        0,
    );
    let mut machine = Machine::new();
    let mut ctx = machine.executor.context();

    ctx.memory.machine_stack.push(Value::Int(5));
    jit.execute(&mut ctx).unwrap();
    assert_eq!(ctx.memory.machine_stack.pop("t").unwrap(), Value::Int(25));
    assert_eq!(jit.inner().execution_count(), 1);
}

#[test]
fn jit_function_delegates_once_past_the_boundary() {
    let jit = JitFunction::new(
        Box::new(ConstantJit),
        StoredFunction::Plain(square_function()),
        0,
    );
    let mut machine = Machine::new();
    let mut ctx = machine.executor.context();

    // First call interprets: the action count has not crossed zero yet.
    ctx.memory.machine_stack.push(Value::Int(5));
    jit.execute(&mut ctx).unwrap();
    assert_eq!(ctx.memory.machine_stack.pop("t").unwrap(), Value::Int(25));

    // Second call runs the compiled stub.
    ctx.memory.machine_stack.push(Value::Int(5));
    jit.execute(&mut ctx).unwrap();
    assert_eq!(ctx.memory.machine_stack.pop("t").unwrap(), Value::Int(99));
    assert_eq!(jit.inner().execution_count(), 1);
}

#[test]
fn executor_runs_init_static_and_main() {
    // function : 1 _Global_Main_StringArray { PushInt 7 Return }
    let mut machine = Machine::with_program(|functions, _| {
        let main = Function::new(
            ovum_vm::MAIN_FUNCTION_ID,
            1,
            body(&[("PushInt", CommandArg::Int(7)), ("Return", CommandArg::None)]),
        );
        functions.add(StoredFunction::Plain(main)).unwrap();
    });

    let init = body(&[
        ("PushString", CommandArg::Str("boot".to_string())),
        ("PrintLine", CommandArg::None),
    ]);

    let code = machine.executor.run_program(&init, &["a".to_string()]).unwrap();
    assert_eq!(code, 7);
    assert_eq!(machine.capture.output(), "boot\n");
    assert_eq!(machine.live_objects(), 0);
}

#[test]
fn exit_in_init_static_becomes_the_exit_code() {
    let mut machine = Machine::new();
    let init = body(&[("Exit", CommandArg::Int(0))]);
    let code = machine.executor.run_program(&init, &[]).unwrap();
    assert_eq!(code, 0);
}

#[test]
fn missing_main_is_a_runtime_failure() {
    let mut machine = Machine::new();
    let init = body(&[]);
    let error = machine.executor.run_program(&init, &[]).unwrap_err();
    assert!(matches!(error, RuntimeError::UnknownFunction { .. }));
}
