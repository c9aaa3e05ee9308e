use protojs::evaluate_script;

// Initialize logger for this integration test binary so `RUST_LOG` is honored.
// Using `ctor` ensures initialization runs before tests start.
#[ctor::ctor]
fn __init_test_logger() {
    let _ = env_logger::Builder::from_env(env_logger::Env::default()).is_test(true).try_init();
}

#[cfg(test)]
mod control_flow_tests {
    use super::*;

    fn count_iterations(n: i32) -> String {
        let script = format!("var count = 0; for (i = 0; i < {n}; i = i + 1) {{ count = count + 1; }} count");
        evaluate_script(script).unwrap()
    }

    #[test]
    fn test_for_loop_runs_n_times() {
        assert_eq!(count_iterations(5), "5");
        assert_eq!(count_iterations(1), "1");
        assert_eq!(count_iterations(0), "0");
    }

    #[test]
    fn test_for_loop_negative_bound_never_runs() {
        let script = "var count = 0; for (i = 0; i < -3; i = i + 1) { count = count + 1; } count";
        assert_eq!(evaluate_script(script).unwrap(), "0");
    }

    #[test]
    fn test_for_condition_checked_before_first_iteration() {
        let script = "var ran = false; for (var i = 0; false; i = i + 1) { ran = true; } [ran, i]";
        assert_eq!(evaluate_script(script).unwrap(), "[false,0]");
    }

    #[test]
    fn test_for_break() {
        let script = "var s = 0; for (var i = 0; i < 10; i = i + 1) { if (i == 3) break; s = s + i; } [s, i]";
        assert_eq!(evaluate_script(script).unwrap(), "[3,3]");
    }

    #[test]
    fn test_for_continue_still_runs_update() {
        let script = "var s = 0; for (var i = 0; i < 5; i = i + 1) { if (i % 2 == 0) continue; s = s + i; } [s, i]";
        assert_eq!(evaluate_script(script).unwrap(), "[4,5]");
    }

    #[test]
    fn test_for_without_clauses() {
        let script = "var k = 0; for (;;) { k = k + 1; if (k >= 3) { break; } } k";
        assert_eq!(evaluate_script(script).unwrap(), "3");
    }

    #[test]
    fn test_for_with_update_operators() {
        let script = "var t = 0; for (var i = 0; i < 4; i++) { t += i; } t";
        assert_eq!(evaluate_script(script).unwrap(), "6");
    }

    #[test]
    fn test_break_only_leaves_inner_loop() {
        let script = r#"
            var pairs = 0;
            for (var i = 0; i < 3; i = i + 1) {
                for (var j = 0; j < 3; j = j + 1) {
                    if (j == 1) { break; }
                    pairs = pairs + 1;
                }
            }
            pairs
        "#;
        assert_eq!(evaluate_script(script).unwrap(), "3");
    }

    #[test]
    fn test_return_from_inside_loop() {
        let script = r#"
            function find(arr, t) {
                for (var i = 0; i < arr.length; i = i + 1) {
                    if (arr[i] === t) { return i; }
                }
                return -1;
            }
            [find([5, 6, 7], 7), find([5], 1)]
        "#;
        assert_eq!(evaluate_script(script).unwrap(), "[2,-1]");
    }

    #[test]
    fn test_while_loop() {
        let script = "var n = 0; while (n < 4) { n = n + 1; } n";
        assert_eq!(evaluate_script(script).unwrap(), "4");
        let script = "var n = 0; while (true) { n++; if (n > 2) break; } n";
        assert_eq!(evaluate_script(script).unwrap(), "3");
    }

    #[test]
    fn test_if_statement_true() {
        let script = "let x = 5; if (x > 3) { x = x + 1; } x";
        assert_eq!(evaluate_script(script).unwrap(), "6");
    }

    #[test]
    fn test_if_else_statement() {
        let script = "let x = 2; if (x > 3) { x = 10; } else { x = 20; } x";
        assert_eq!(evaluate_script(script).unwrap(), "20");
        let script = "let x = 2; if (x > 3) x = 10; else if (x > 1) x = 15; else x = 20; x";
        assert_eq!(evaluate_script(script).unwrap(), "15");
    }

    #[test]
    fn test_truthiness_in_conditions() {
        let script = r#"
            var hits = [];
            if (0) { hits.push("zero"); }
            if ("") { hits.push("empty"); }
            if (null) { hits.push("null"); }
            if ([]) { hits.push("array"); }
            if ("0") { hits.push("string zero"); }
            hits
        "#;
        assert_eq!(evaluate_script(script).unwrap(), "[\"array\",\"string zero\"]");
    }

    #[test]
    fn test_logical_operators_short_circuit() {
        let script = r#"
            var calls = 0;
            function touch() { calls = calls + 1; return true; }
            var a = false && touch();
            var b = true || touch();
            var c = null || "fallback";
            [a, b, c, calls, !0]
        "#;
        assert_eq!(evaluate_script(script).unwrap(), "[false,true,\"fallback\",0,true]");
    }

    #[test]
    fn test_equality_and_arithmetic() {
        let script = r#"[1 == "1", 1 === "1", null == undefined, null === undefined, 7 % 3, "a" + 1, 1 + 2 * 3, "b" < "c"]"#;
        assert_eq!(evaluate_script(script).unwrap(), "[true,false,true,false,1,\"a1\",7,true]");
    }

    #[test]
    fn test_let_loop_binding_is_fresh_each_iteration() {
        let script = r#"
            var fs = [];
            for (let i = 0; i < 3; i++) { fs.push(function() { return i; }); }
            [fs[0](), fs[1](), fs[2]()]
        "#;
        assert_eq!(evaluate_script(script).unwrap(), "[0,1,2]");
    }

    #[test]
    fn test_var_loop_binding_is_shared() {
        let script = r#"
            var fs = [];
            for (var i = 0; i < 3; i++) { fs.push(function() { return i; }); }
            [fs[0](), fs[1](), fs[2]()]
        "#;
        assert_eq!(evaluate_script(script).unwrap(), "[3,3,3]");
    }

    #[test]
    fn test_let_loop_body_writes_carry_into_next_iteration() {
        let script = "var seen = []; for (let i = 0; i < 6; i++) { seen.push(i); i++; } seen";
        assert_eq!(evaluate_script(script).unwrap(), "[0,2,4]");
    }
}
