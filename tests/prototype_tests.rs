use protojs::*;

#[ctor::ctor]
fn __init_test_logger() {
    let _ = env_logger::Builder::from_env(env_logger::Env::default()).is_test(true).try_init();
}

#[test]
fn test_shared_prototype_write_is_seen_by_all_children() {
    let script = r#"
        var P = {};
        var a = Object.create(P);
        var b = Object.create(P);
        var before = [a.m, b.m];
        P.m = function() { return 1; };
        [before[0], before[1], a.m === P.m, b.m === P.m, a.m()]
    "#;
    assert_eq!(evaluate_script(script).unwrap(), "[undefined,undefined,true,true,1]");
}

#[test]
fn test_array_prototype_method_reaches_old_and_new_arrays() {
    let script = r#"
        var early = [1, 2];
        Array.prototype.sum = function() {
            var s = 0;
            for (var i = 0; i < this.length; i = i + 1) { s = s + this[i]; }
            return s;
        };
        var late = [3, 4];
        [early.sum(), late.sum()]
    "#;
    assert_eq!(evaluate_script(script).unwrap(), "[3,7]");
}

#[test]
fn test_reassigning_for_each_changes_existing_arrays() {
    let script = r#"
        var a = [1, 2];
        a.forEach(function(n) { console.log("builtin", n); });
        Array.prototype.forEach = function(fn) { fn("replaced"); };
        a.forEach(function(n) { console.log(n); });
        Array.prototype.forEach = function(fn) { for (var i = this.length - 1; i >= 0; i = i - 1) { fn(this[i]); } };
        a.forEach(function(n) { console.log(n); });
    "#;
    let mut sink = CollectingSink::new();
    evaluate_script_with_sink(script, &mut sink).unwrap();
    assert_eq!(sink.lines(), vec!["builtin 1", "builtin 2", "replaced", "2", "1"]);
}

#[test]
fn test_builtins_are_ordinary_properties() {
    let script = r#"
        var original = Array.prototype.push;
        Array.prototype.push = function() { return "patched"; };
        var patched = [1].push(2);
        Array.prototype.push = original;
        [patched, [1].push(2)]
    "#;
    assert_eq!(evaluate_script(script).unwrap(), "[\"patched\",2]");
}

#[test]
fn test_own_write_shadows_prototype() {
    let script = "var p = {m: 1}; var o = Object.create(p); o.m = 2; [o.m, p.m, o.hasOwnProperty('m')]";
    assert_eq!(evaluate_script(script).unwrap(), "[2,1,true]");
}

#[test]
fn test_prototype_assignment() {
    let script = r#"
        var proto = { inheritedProp: "inherited value" };
        var obj = { ownProp: "own value" };
        obj.__proto__ = proto;
        [obj.ownProp, obj.inheritedProp, obj.__proto__ === proto, Object.getPrototypeOf(obj) === proto]
    "#;
    assert_eq!(evaluate_script(script).unwrap(), "[\"own value\",\"inherited value\",true,true]");
}

#[test]
fn test_proto_in_object_literal() {
    let script = r#"var p = { greet: function() { return "hi " + this.name; } }; var o = { __proto__: p, name: "o" }; o.greet()"#;
    assert_eq!(evaluate_script(script).unwrap(), "\"hi o\"");
}

#[test]
fn test_intrinsic_prototype_links() {
    let script = r#"
        [
            Object.getPrototypeOf([]) === Array.prototype,
            Object.getPrototypeOf(Array.prototype) === Object.prototype,
            Object.getPrototypeOf({}) === Object.prototype,
            Object.getPrototypeOf(Object.prototype),
            Array.prototype.isPrototypeOf([]),
        ]
    "#;
    assert_eq!(evaluate_script(script).unwrap(), "[true,true,true,null,true]");
}

#[test]
fn test_receiver_is_the_object_not_the_defining_prototype() {
    let script = r#"
        var proto = { describe: function() { return this.name; } };
        var o = Object.create(proto);
        o.name = "obj";
        proto.name = "proto";
        [o.describe(), proto.describe()]
    "#;
    assert_eq!(evaluate_script(script).unwrap(), "[\"obj\",\"proto\"]");
}

#[test]
fn test_set_prototype_of_and_null_prototype() {
    let script = r#"
        var bare = Object.create(null);
        var base = { kind: "base" };
        var o = {};
        Object.setPrototypeOf(o, base);
        [bare.toString, o.kind, Object.getPrototypeOf(bare)]
    "#;
    assert_eq!(evaluate_script(script).unwrap(), "[undefined,\"base\",null]");
}

#[test]
fn test_cyclic_prototype_is_rejected() {
    let script = "var a = {}; var b = Object.create(a); a.__proto__ = b;";
    assert!(matches!(evaluate_script(script), Err(JSError::CyclicPrototype)));

    let script = "var a = {}; Object.setPrototypeOf(a, a);";
    assert!(matches!(evaluate_script(script), Err(JSError::CyclicPrototype)));
}

#[test]
fn test_failed_cycle_leaves_prototype_unchanged() {
    let mut engine = Engine::new().unwrap();
    let mut sink = CollectingSink::new();
    engine.eval("var a = {}; var b = Object.create(a);", &mut sink).unwrap();
    assert!(engine.eval("a.__proto__ = b;", &mut sink).is_err());
    assert_eq!(engine.eval("Object.getPrototypeOf(a) === Object.prototype", &mut sink).unwrap(), "true");
}
