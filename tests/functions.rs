use protojs::*;

// Initialize logger for this integration test binary so `RUST_LOG` is honored.
// Using `ctor` ensures initialization runs before tests start.
#[ctor::ctor]
fn __init_test_logger() {
    let _ = env_logger::Builder::from_env(env_logger::Env::default()).is_test(true).try_init();
}

#[cfg(test)]
mod function_tests {
    use super::*;

    #[test]
    fn test_function_definition() {
        let script = "function add(a, b) { return a + b; } add(3, 4)";
        assert_eq!(evaluate_script(script).unwrap(), "7");
    }

    #[test]
    fn test_function_declarations_are_hoisted() {
        let script = "var r = add(1, 2); function add(a, b) { return a + b; } r";
        assert_eq!(evaluate_script(script).unwrap(), "3");
    }

    #[test]
    fn test_missing_arguments_are_undefined() {
        let script = "function f(a, b) { return typeof b; } [f(1), f(1, 2)]";
        assert_eq!(evaluate_script(script).unwrap(), "[\"undefined\",\"number\"]");
    }

    #[test]
    fn test_function_without_return_yields_undefined() {
        let script = "function g() { 1; } g()";
        assert_eq!(evaluate_script(script).unwrap(), "undefined");
    }

    #[test]
    fn test_closure_sees_mutation_made_after_creation() {
        let script = r#"
            var getter;
            function outer() {
                var x = 1;
                getter = function() { return x; };
                x = 2;
            }
            outer();
            getter()
        "#;
        assert_eq!(evaluate_script(script).unwrap(), "2");
    }

    #[test]
    fn test_closures_share_their_captured_frame() {
        let script = r#"
            function pair() {
                var n = 0;
                return [function() { n = n + 1; return n; }, function() { return n; }];
            }
            var p = pair();
            p[0](); p[0]();
            p[1]()
        "#;
        assert_eq!(evaluate_script(script).unwrap(), "2");
    }

    #[test]
    fn test_each_call_gets_its_own_frame() {
        let script = r#"
            function makeCounter() { var c = 0; return function() { c = c + 1; return c; }; }
            var a = makeCounter();
            var b = makeCounter();
            a(); a();
            [a(), b()]
        "#;
        assert_eq!(evaluate_script(script).unwrap(), "[3,1]");
    }

    #[test]
    fn test_recursion() {
        let script = "function fib(n) { if (n < 2) { return n; } return fib(n - 1) + fib(n - 2); } fib(10)";
        assert_eq!(evaluate_script(script).unwrap(), "55");
    }

    #[test]
    fn test_named_function_expression_refers_to_itself() {
        let script = "var fact = function me(n) { if (n <= 1) { return 1; } return n * me(n - 1); }; [fact(5), typeof me]";
        assert_eq!(evaluate_script(script).unwrap(), "[120,\"undefined\"]");
    }

    #[test]
    fn test_method_call_binds_receiver() {
        let script = "var o = { v: 7, get: function() { return this.v; } }; o.get()";
        assert_eq!(evaluate_script(script).unwrap(), "7");
        let script = "var o = { v: 7, get: function() { return this.v; } }; o['get']()";
        assert_eq!(evaluate_script(script).unwrap(), "7");
    }

    #[test]
    fn test_plain_call_has_undefined_receiver() {
        let script = "function t() { return typeof this; } t()";
        assert_eq!(evaluate_script(script).unwrap(), "\"undefined\"");

        let script = "var o = { v: 7, get: function() { return this.v; } }; var f = o.get; f()";
        assert!(matches!(evaluate_script(script), Err(JSError::TypeError { .. })));
    }

    #[test]
    fn test_receiver_survives_nested_blocks() {
        let script = r#"
            var o = {
                items: [1, 2, 3],
                total: function() {
                    var s = 0;
                    for (var i = 0; i < this.items.length; i++) {
                        if (true) { s += this.items[i]; }
                    }
                    return s;
                }
            };
            o.total()
        "#;
        assert_eq!(evaluate_script(script).unwrap(), "6");
    }

    #[test]
    fn test_for_each_this_arg() {
        let script = "var o = { total: 0 }; [1, 2, 3].forEach(function(n) { this.total = this.total + n; }, o); o.total";
        assert_eq!(evaluate_script(script).unwrap(), "6");
    }

    #[test]
    fn test_function_name_and_length() {
        let script = "function foo(a, b) {} var anon = function() {}; [foo.name, foo.length, anon.name, typeof foo]";
        assert_eq!(evaluate_script(script).unwrap(), "[\"foo\",2,\"\",\"function\"]");
    }

    #[test]
    fn test_var_is_function_scoped() {
        let script = "function h() { if (true) { var z = 5; } return z; } h()";
        assert_eq!(evaluate_script(script).unwrap(), "5");
    }

    #[test]
    fn test_let_is_block_scoped() {
        let script = "let q = 1; { let q = 2; } q";
        assert_eq!(evaluate_script(script).unwrap(), "1");
    }

    #[test]
    fn test_inner_var_does_not_leak() {
        let script = "function h() { var secret = 1; return secret; } h(); typeof secret";
        assert_eq!(evaluate_script(script).unwrap(), "\"undefined\"");
    }

    #[test]
    fn test_functions_as_arguments() {
        let script = "function apply(f, x) { return f(x); } apply(function(v) { return v * 3; }, 4)";
        assert_eq!(evaluate_script(script).unwrap(), "12");
    }
}
