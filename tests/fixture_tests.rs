use protojs::*;

// Initialize logger for this integration test binary so `RUST_LOG` is honored.
// Using `ctor` ensures initialization runs before tests start.
#[ctor::ctor]
fn __init_test_logger() {
    let _ = env_logger::Builder::from_env(env_logger::Env::default()).is_test(true).try_init();
}

const FOR_EACH_FIXTURE: &str = r#"
Array.prototype.forEach = function(fn){ for(var i=0;i<this.length;i=i+1){ fn(this[i]); } };
var a=[1,2,3];
a.forEach(function(n){ console.log(n); });
"#;

#[test]
fn test_fixture_prints_each_element_in_order() {
    let mut sink = CollectingSink::new();
    let result = evaluate_script_with_sink(FOR_EACH_FIXTURE, &mut sink).unwrap();
    assert_eq!(result, "undefined");
    assert_eq!(sink.calls, vec![vec!["1".to_string()], vec!["2".to_string()], vec!["3".to_string()]]);
    assert_eq!(sink.lines(), vec!["1", "2", "3"]);
}

#[test]
fn test_fixture_callback_receives_elements_not_indices() {
    let script = r#"
        Array.prototype.forEach = function(fn){ for(var i=0;i<this.length;i=i+1){ fn(this[i]); } };
        var seen = [];
        var a = [10, 20, 30];
        a.forEach(function(n){ seen.push(n); });
        seen
    "#;
    assert_eq!(evaluate_script(script).unwrap(), "[10,20,30]");
}

#[test]
fn test_fixture_runs_on_stdout_sink() {
    // StdoutSink prints; only the completion value is observable here.
    assert_eq!(evaluate_script(FOR_EACH_FIXTURE).unwrap(), "undefined");
}

#[test]
fn test_console_log_joins_arguments() {
    let mut sink = CollectingSink::new();
    evaluate_script_with_sink(r#"console.log("a", 1, [1, "b"], { k: true }); console.log();"#, &mut sink).unwrap();
    assert_eq!(sink.lines(), vec!["a 1 [ 1, 'b' ] { k: true }", ""]);
}
