//! Parser structure tests: declarations, lowering, and error reporting.

use ovum_parser::{ParseError, ParserOptions, parse_program, tokenize};
use ovum_runtime::VirtualTableStore;
use ovum_vm::{FunctionStore, NullJitExecutorFactory};

fn parse(
    source: &str,
) -> Result<(Option<ovum_vm::Block>, FunctionStore, VirtualTableStore), ParseError> {
    let tokens = tokenize(source)?;
    let mut functions = FunctionStore::new();
    let mut vtables = VirtualTableStore::new();
    let factory = NullJitExecutorFactory;
    let options = ParserOptions { jit_factory: &factory, jit_boundary: 10_000 };
    let init = parse_program(&tokens, &mut functions, &mut vtables, &options)?;
    Ok((init, functions, vtables))
}

#[test]
fn empty_input_parses_to_nothing() {
    let (init, functions, vtables) = parse("").unwrap();
    assert!(init.is_none());
    assert!(functions.is_empty());
    assert!(vtables.is_empty());
}

#[test]
fn init_static_collects_its_statements() {
    let (init, _, _) = parse("init-static { PushInt 1 PushInt 2 IntAdd }").unwrap();
    assert_eq!(init.expect("init-static block").len(), 3);
}

#[test]
fn a_second_init_static_is_rejected() {
    let error = parse("init-static { } init-static { }").unwrap_err();
    assert!(matches!(error, ParseError::DuplicateInitStatic { .. }));
}

#[test]
fn vtable_declarations_install_into_the_store() {
    let source = "
        vtable Point {
            size : 24
            interfaces { IComparable, IHashable }
            methods { _GetHash_<C> : _Point_GetHash_<C> }
            vartable { x : int @ 8, y : float @ 16 }
        }
    ";
    let (_, _, vtables) = parse(source).unwrap();
    let table = vtables.get_by_name("Point").unwrap();
    assert_eq!(table.size(), 24);
    assert_eq!(table.fields().len(), 2);
    assert!(table.is_type("Point"));
    assert!(table.is_type("IComparable"));
    assert_eq!(table.real_method_id("_GetHash_<C>").unwrap(), "_Point_GetHash_<C>");
}

#[test]
fn duplicate_vartable_entries_are_kept_positionally() {
    let source = "vtable Odd { size : 16 vartable { a : int @ 8, b : int @ 8 } }";
    let (_, _, vtables) = parse(source).unwrap();
    assert_eq!(vtables.get_by_name("Odd").unwrap().fields().len(), 2);
}

#[test]
fn unknown_vtable_directive_is_rejected() {
    let error = parse("vtable Bad { fields { } }").unwrap_err();
    assert!(matches!(error, ParseError::UnknownDirective { .. }));
}

#[test]
fn unknown_field_type_is_rejected() {
    let error = parse("vtable Bad { vartable { a : quux @ 8 } }").unwrap_err();
    assert!(matches!(error, ParseError::UnknownFieldType { .. }));
}

#[test]
fn functions_register_under_their_id() {
    let source = "function : 2 _Global_add_int_int { LoadLocal 1 LoadLocal 0 IntAdd Return }";
    let (_, functions, _) = parse(source).unwrap();
    let function = functions.get_by_id("_Global_add_int_int").unwrap();
    assert_eq!(function.arity(), 2);
}

#[test]
fn duplicate_function_ids_are_rejected() {
    let source = "
        function : 0 _Global_f { }
        function : 0 _Global_f { }
    ";
    let error = parse(source).unwrap_err();
    assert!(matches!(error, ParseError::Install { .. }));
}

#[test]
fn pure_qualifier_must_match_the_arity() {
    let source = "pure(int, int) function : 1 _Global_square_int { LoadLocal 0 }";
    let error = parse(source).unwrap_err();
    assert!(matches!(error, ParseError::Install { .. }));
}

#[test]
fn qualifiers_apply_in_fixed_order() {
    let source = "pure(int) no-jit function : 1 _Global_square_int { LoadLocal 0 Return }";
    let (_, functions, _) = parse(source).unwrap();
    let function = functions.get_by_id("_Global_square_int").unwrap();
    assert!(matches!(function, ovum_vm::StoredFunction::Pure(_)));
}

#[test]
fn if_with_else_lowers_into_branches() {
    let source = "
        init-static {
            PushInt 1 PushInt 1 IntEqual
            if { } then { PushInt 1 Pop }
            else if { PushBool false } then { }
            else { PushInt 2 Pop }
        }
    ";
    let (init, _, _) = parse(source).unwrap();
    assert_eq!(init.expect("init-static block").len(), 4);
}

#[test]
fn while_requires_the_then_keyword() {
    let error = parse("init-static { while { PushBool false } { } }").unwrap_err();
    assert!(matches!(error, ParseError::ExpectedKeyword { keyword: "then", .. }));
}

#[test]
fn unknown_commands_are_rejected_with_their_position() {
    let error = parse("init-static {\n  Frobnicate\n}").unwrap_err();
    match error {
        ParseError::UnknownCommand { name, line, .. } => {
            assert_eq!(name, "Frobnicate");
            assert_eq!(line, 2);
        }
        other => panic!("expected UnknownCommand, got {other:?}"),
    }
}

#[test]
fn commands_consume_their_classified_immediates() {
    let source = r#"
        init-static {
            PushInt 1
            PushFloat 2.5
            PushBool true
            PushString "text"
            PushChar "c"
            LoadLocal 0
            Call _Global_f
            IsType Int
        }
    "#;
    let (init, _, _) = parse(source).unwrap();
    assert_eq!(init.expect("init-static block").len(), 8);
}

#[test]
fn top_level_statements_are_rejected() {
    let error = parse("PushInt 1").unwrap_err();
    assert!(matches!(error, ParseError::UnknownDeclaration { .. }));
}

#[test]
fn missing_immediate_is_a_literal_error() {
    let error = parse("init-static { PushInt }").unwrap_err();
    assert!(matches!(error, ParseError::ExpectedLiteral { what: "integer", .. }));
}
