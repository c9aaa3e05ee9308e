use protojs::*;

#[ctor::ctor]
fn __init_test_logger() {
    let _ = env_logger::Builder::from_env(env_logger::Env::default()).is_test(true).try_init();
}

#[test]
fn test_calling_non_function_reports_callee() {
    match evaluate_script("var x = 5; x()") {
        Err(JSError::NotCallable { callee }) => assert_eq!(callee, "x"),
        other => panic!("expected NotCallable, got {other:?}"),
    }
    match evaluate_script("var o = {}; o.missing(1)") {
        Err(err @ JSError::NotCallable { .. }) => assert_eq!(err.to_string(), "TypeError: o.missing is not a function"),
        other => panic!("expected NotCallable, got {other:?}"),
    }
}

#[test]
fn test_for_each_rejects_non_callable_callback() {
    assert!(matches!(evaluate_script("[1].forEach(3)"), Err(JSError::NotCallable { .. })));
}

#[test]
fn test_unbounded_recursion_overflows() {
    let config = EngineConfig { max_call_depth: 8 };
    let mut engine = Engine::with_config(config).unwrap();
    let mut sink = CollectingSink::new();
    match engine.eval("function f() { return f(); } f()", &mut sink) {
        Err(JSError::StackOverflow { depth }) => assert_eq!(depth, 9),
        other => panic!("expected StackOverflow, got {other:?}"),
    }
    // the depth counter unwinds with the error
    assert_eq!(engine.eval("function g(n) { if (n == 0) { return 0; } return g(n - 1); } g(7)", &mut sink).unwrap(), "0");
}

#[test]
fn test_call_depth_limit_counts_nested_callbacks() {
    let config = EngineConfig { max_call_depth: 2 };
    let mut engine = Engine::with_config(config).unwrap();
    let mut sink = CollectingSink::new();
    let script = "function outer() { [1].forEach(function() { [2].forEach(function() {}); }); } outer()";
    assert!(matches!(engine.eval(script, &mut sink), Err(JSError::StackOverflow { .. })));
}

#[test]
fn test_undeclared_variable() {
    match evaluate_script("y + 1") {
        Err(JSError::VariableNotFound { name }) => assert_eq!(name, "y"),
        other => panic!("expected VariableNotFound, got {other:?}"),
    }
}

#[test]
fn test_const_rejects_reassignment() {
    assert!(matches!(evaluate_script("const c = 1; c = 2;"), Err(JSError::TypeError { .. })));
    assert!(matches!(evaluate_script("const c = 1; c++;"), Err(JSError::TypeError { .. })));
    assert_eq!(evaluate_script("const c = 1; { let c = 2; } c").unwrap(), "1");
}

#[test]
fn test_property_access_on_undefined() {
    let err = evaluate_script("var u; u.x").unwrap_err();
    assert_eq!(err.to_string(), "TypeError: Cannot read properties of undefined (reading 'x')");
    assert!(matches!(evaluate_script("null.x = 1"), Err(JSError::TypeError { .. })));
}

#[test]
fn test_missing_property_is_not_an_error() {
    assert_eq!(evaluate_script("var o = {}; [o.a, o['b'], [].x, (1).y]").unwrap(), "[undefined,undefined,undefined,undefined]");
}

#[test]
fn test_parse_errors_carry_position() {
    let err = evaluate_script("var x = 1;\nvar = 5;").unwrap_err();
    assert!(matches!(err, JSError::ParseError { .. }));
    assert_eq!(err.js_position().map(|(line, _)| line), Some(2));

    assert!(matches!(evaluate_script("1 = 2;"), Err(JSError::ParseError { .. })));
    assert!(matches!(evaluate_script("const k;"), Err(JSError::ParseError { .. })));
}

#[test]
fn test_tokenization_error() {
    assert!(matches!(evaluate_script("var s = 'unterminated"), Err(JSError::TokenizationError { .. })));
    assert!(matches!(evaluate_script("var a = 1 # 2;"), Err(JSError::TokenizationError { .. })));
}

#[test]
fn test_invalid_prototype_argument() {
    assert!(matches!(evaluate_script("Object.create(5)"), Err(JSError::TypeError { .. })));
}

#[test]
fn test_invalid_array_length() {
    assert!(matches!(evaluate_script("var a = [1]; a.length = -1;"), Err(JSError::RangeError { .. })));
    assert!(matches!(evaluate_script("var a = [1]; a.length = 1.5;"), Err(JSError::RangeError { .. })));
    let err = evaluate_script("var a = []; a.length = 4294967295;").unwrap_err();
    assert!(err.to_string().starts_with("RangeError: "), "{err}");
}

#[test]
fn test_far_index_write_is_a_range_error() {
    assert!(matches!(evaluate_script("var a = []; a[4000000000] = 1;"), Err(JSError::RangeError { .. })));
    assert!(matches!(evaluate_script("var a = []; a.push(1); a[4194304] = 1;"), Err(JSError::RangeError { .. })));
}

#[test]
fn test_default_call_depth_limit_on_test_thread() {
    let mut engine = Engine::new().unwrap();
    let limit = engine.config().max_call_depth;
    assert_eq!(limit, 256);
    let mut sink = CollectingSink::new();

    let script = format!("function g(n) {{ if (n == 0) {{ return 0; }} return 1 + g(n - 1); }} g({})", limit - 6);
    assert_eq!(engine.eval(&script, &mut sink).unwrap(), (limit - 6).to_string());

    match engine.eval("function f() { return f(); } f()", &mut sink) {
        Err(JSError::StackOverflow { depth }) => assert_eq!(depth, limit + 1),
        other => panic!("expected StackOverflow, got {other:?}"),
    }
}

#[test]
fn test_deep_nesting_is_a_parse_error() {
    let parens = format!("{}1{}", "(".repeat(100_000), ")".repeat(100_000));
    assert!(matches!(evaluate_script(&parens), Err(JSError::ParseError { .. })));

    let nots = format!("{}1", "!".repeat(100_000));
    assert!(matches!(evaluate_script(&nots), Err(JSError::ParseError { .. })));

    let blocks = format!("{}{}", "{".repeat(100_000), "}".repeat(100_000));
    assert!(matches!(evaluate_script(&blocks), Err(JSError::ParseError { .. })));

    let chain = format!("var a; {}1", "a = ".repeat(100_000));
    assert!(matches!(evaluate_script(&chain), Err(JSError::ParseError { .. })));

    // nesting below the limit still parses, and a failed parse leaves no depth behind
    let nested = format!("{}1{}", "(".repeat(200), ")".repeat(200));
    assert_eq!(evaluate_script(&nested).unwrap(), "1");
    assert_eq!(evaluate_script(&format!("{}1", "!".repeat(300))).unwrap(), "true");
}
