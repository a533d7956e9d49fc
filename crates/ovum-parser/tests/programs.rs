//! End-to-end program runs: source text through lexer, parser, and
//! executor.

use ovum_parser::{ParserOptions, parse_program, tokenize};
use ovum_runtime::{RuntimeError, StackFrame, VirtualTableStore};
use ovum_vm::{
    Block, Executor, FunctionStore, IoCapture, NullJitExecutorFactory, VmIo,
    register_builtin_functions, register_builtin_vtables,
};

fn build_executor(source: &str, input: &str) -> (Executor, Option<Block>, IoCapture) {
    let mut vtables = VirtualTableStore::new();
    let mut functions = FunctionStore::new();
    register_builtin_vtables(&mut vtables).unwrap();
    register_builtin_functions(&mut functions).unwrap();

    let tokens = tokenize(source).unwrap();
    let factory = NullJitExecutorFactory;
    let options = ParserOptions { jit_factory: &factory, jit_boundary: 10_000 };
    let init = parse_program(&tokens, &mut functions, &mut vtables, &options).unwrap();

    let (io, capture) = VmIo::capture(input);
    (Executor::new(vtables, functions, io, 4096), init, capture)
}

fn run(source: &str, args: &[&str]) -> (Result<i64, RuntimeError>, IoCapture, Executor) {
    let (mut executor, init, capture) = build_executor(source, "");
    let init = init.expect("program has an init-static block");
    let args: Vec<String> = args.iter().map(ToString::to_string).collect();
    let result = executor.run_program(&init, &args);
    (result, capture, executor)
}

#[test]
fn arithmetic_and_print() {
    let source = r#"init-static { PushInt 5 PushInt 7 IntAdd IntToString PrintLine Exit 0 }"#;
    let (result, capture, _) = run(source, &[]);
    assert_eq!(result.unwrap(), 0);
    assert_eq!(capture.output(), "12\n");
}

#[test]
fn conditional_picks_the_equal_branch() {
    let source = r#"
        init-static {
            PushInt 3 PushInt 3 IntEqual
            if { } then { PushString "eq" PrintLine }
            else { PushString "ne" PrintLine }
            Exit 0
        }
    "#;
    let (result, capture, _) = run(source, &[]);
    assert_eq!(result.unwrap(), 0);
    assert_eq!(capture.output(), "eq\n");
}

#[test]
fn while_loop_sums_one_to_ten() {
    let source = r#"
        init-static {
            PushInt 1 SetLocal 0
            PushInt 0 SetLocal 1
            while { LoadLocal 0 PushInt 10 IntLessEqual } then {
                LoadLocal 1 LoadLocal 0 IntAdd SetLocal 1
                LoadLocal 0 IntIncrement SetLocal 0
            }
            LoadLocal 1 IntToString PrintLine
            Exit 0
        }
    "#;
    let (result, capture, _) = run(source, &[]);
    assert_eq!(result.unwrap(), 0);
    assert_eq!(capture.output(), "55\n");
}

#[test]
fn pure_function_caches_the_second_call() {
    let source = r#"
        pure(int) no-jit function : 1 _Global_square_int {
            LoadLocal 0 LoadLocal 0 IntMultiply Return
        }
        init-static {
            PushInt 4 Call _Global_square_int IntToString PrintLine
            PushInt 4 Call _Global_square_int IntToString PrintLine
            Exit 0
        }
    "#;
    let (result, capture, executor) = run(source, &[]);
    assert_eq!(result.unwrap(), 0);
    assert_eq!(capture.output(), "16\n16\n");

    // The inner body ran once; the second call came from the cache.
    let square = executor.functions().get_by_id("_Global_square_int").unwrap();
    assert_eq!(square.execution_count(), 1);
}

#[test]
fn unreachable_cycle_is_collected() {
    let source = r#"
        vtable WithRef {
            size : 16
            vartable { other : Object @ 8 }
            methods { _destructor_<M> : _WithRef_destructor_<M> }
        }
        no-jit function : 1 _WithRef_destructor_<M> { }
        init-static {
            NewArray WithRef SetLocal 0
            NewArray WithRef SetLocal 1
            LoadLocal 1 LoadLocal 0 SetField 0
            LoadLocal 0 LoadLocal 1 SetField 0
            PushInt 0 SetLocal 0
            PushInt 0 SetLocal 1
            ForceGarbageCollection
        }
    "#;
    let (mut executor, init, _capture) = build_executor(source, "");
    let init = init.unwrap();

    let mut ctx = executor.context();
    ctx.memory.stack_frames.push(StackFrame::new("init-static"));
    init.execute(&mut ctx).unwrap();
    let _ = ctx.memory.stack_frames.pop();

    assert_eq!(executor.heap().repository().len(), 0);
}

#[test]
fn virtual_dispatch_runs_the_mapped_function() {
    let source = r#"
        vtable C {
            size : 8
            methods { _m_<M> : _C_real_m_<M>, _destructor_<M> : _C_destructor_<M> }
        }
        no-jit function : 1 _C_real_m_<M> { Pop PushInt 123 Return }
        no-jit function : 1 _C_destructor_<M> { }
        init-static {
            NewArray C
            CallVirtual _m_<M>
            IntToString PrintLine
            Exit 0
        }
    "#;
    let (result, capture, _) = run(source, &[]);
    assert_eq!(result.unwrap(), 0);
    assert_eq!(capture.output(), "123\n");
}

#[test]
fn virtual_dispatch_with_the_wrong_receiver_fails() {
    let source = r#"
        init-static {
            PushInt 1 CallConstructor _Int_int
            CallVirtual _m_<M>
            Exit 0
        }
    "#;
    let (result, _, _) = run(source, &[]);
    assert!(matches!(result.unwrap_err(), RuntimeError::UnknownVirtualMethod { .. }));
}

#[test]
fn entry_function_receives_the_argument_array() {
    let source = r#"
        no-jit function : 1 _Global_Main_StringArray {
            LoadLocal 0 CallVirtual _Length_<C>
            Return
        }
        init-static { }
    "#;
    let (result, _, _) = run(source, &["alpha", "beta", "gamma"]);
    assert_eq!(result.unwrap(), 3);
}

#[test]
fn entry_function_reads_its_arguments() {
    let source = r#"
        no-jit function : 1 _Global_Main_StringArray {
            PushInt 1 LoadLocal 0 CallVirtual _GetAt_<C>_int
            PrintLine
            PushInt 0 Return
        }
        init-static { }
    "#;
    let (result, capture, _) = run(source, &["first", "second"]);
    assert_eq!(result.unwrap(), 0);
    assert_eq!(capture.output(), "second\n");
}

#[test]
fn runtime_errors_surface_from_the_run() {
    let source = r#"init-static { PushInt 1 PushInt 0 IntDivide Exit 0 }"#;
    let (result, _, _) = run(source, &[]);
    assert!(matches!(result.unwrap_err(), RuntimeError::DivisionByZero { .. }));
}

#[test]
fn exit_code_wins_over_the_missing_main() {
    let source = r#"init-static { Exit 41 }"#;
    let (result, _, _) = run(source, &[]);
    assert_eq!(result.unwrap(), 41);
}
