use protojs::*;

#[ctor::ctor]
fn __init_test_logger() {
    let _ = env_logger::Builder::from_env(env_logger::Env::default()).is_test(true).try_init();
}

#[cfg(test)]
mod array_literal_tests {
    use super::*;

    #[test]
    fn test_array_literal_and_length() {
        assert_eq!(evaluate_script("[1, 2, 3].length").unwrap(), "3");
        assert_eq!(evaluate_script("[].length").unwrap(), "0");
        assert_eq!(evaluate_script("[1, 2, 3,].length").unwrap(), "3");
        assert_eq!(evaluate_script("[[1], [2, [3]]]").unwrap(), "[[1],[2,[3]]]");
    }

    #[test]
    fn test_index_reads() {
        assert_eq!(evaluate_script("var a = [4, 5, 6]; [a[0], a[2], a[3], a['1']]").unwrap(), "[4,6,undefined,5]");
        assert_eq!(evaluate_script("var a = [4, 5, 6]; var i = 1; a[i + 1]").unwrap(), "6");
    }

    #[test]
    fn test_index_write_grows_array() {
        assert_eq!(evaluate_script("var a = [1, 2]; a[4] = 5; [a.length, a[3]]").unwrap(), "[5,undefined]");
    }

    #[test]
    fn test_length_write_truncates() {
        assert_eq!(evaluate_script("var a = [1, 2, 3]; a.length = 1; a").unwrap(), "[1]");
        assert_eq!(evaluate_script("var a = [1]; a.length = 3; a").unwrap(), "[1,undefined,undefined]");
    }

    #[test]
    fn test_named_properties_on_arrays() {
        assert_eq!(evaluate_script("var a = [1]; a.label = 'x'; [a.label, a.length]").unwrap(), "[\"x\",1]");
    }

    #[test]
    fn test_push_and_pop() {
        let script = "var a = [1]; var n = a.push(2, 3); var last = a.pop(); [n, last, a]";
        assert_eq!(evaluate_script(script).unwrap(), "[3,3,[1,2]]");
        assert_eq!(evaluate_script("[].pop()").unwrap(), "undefined");
    }

    #[test]
    fn test_map_index_of_and_join() {
        assert_eq!(evaluate_script("[1, 2, 3].map(function(n) { return n * 2; })").unwrap(), "[2,4,6]");
        assert_eq!(evaluate_script("[1, 2, 3].map(function(n, i) { return i; })").unwrap(), "[0,1,2]");
        assert_eq!(evaluate_script("[[1, 2, 3].indexOf(2), [1, 2, 3].indexOf(9), [1, 2, 1].indexOf(1, 1)]").unwrap(), "[1,-1,2]");
        assert_eq!(evaluate_script("[1, null, 'x'].join('-')").unwrap(), "\"1--x\"");
        assert_eq!(evaluate_script("[1, 2].join()").unwrap(), "\"1,2\"");
    }

    #[test]
    fn test_builtin_for_each_passes_index_and_array() {
        let mut sink = CollectingSink::new();
        evaluate_script_with_sink("['a', 'b'].forEach(function(v, i, arr) { console.log(v, i, arr.length); });", &mut sink).unwrap();
        assert_eq!(sink.lines(), vec!["a 0 2", "b 1 2"]);
    }

    #[test]
    fn test_is_array() {
        assert_eq!(evaluate_script("[Array.isArray([]), Array.isArray({}), Array.isArray('abc')]").unwrap(), "[true,false,false]");
    }

    #[test]
    fn test_array_methods_work_on_array_likes() {
        let script = "var like = { length: 2, 0: 'p', 1: 'q', join: Array.prototype.join }; like.join('+')";
        assert_eq!(evaluate_script(script).unwrap(), "\"p+q\"");
    }

    #[test]
    fn test_string_length_and_index() {
        assert_eq!(evaluate_script("var s = 'abc'; [s.length, s[1], s[5]]").unwrap(), "[3,\"b\",undefined]");
    }

    #[test]
    fn test_array_to_string_in_concatenation() {
        assert_eq!(evaluate_script("'' + [1, [2, 3]]").unwrap(), "\"1,2,3\"");
    }

    #[test]
    fn test_length_assigned_from_the_array_itself() {
        assert_eq!(evaluate_script("var a = [1]; a.length = a; a.length").unwrap(), "1");
    }

    #[test]
    fn test_self_containing_array_converts() {
        assert_eq!(evaluate_script("var a = []; a.push(a); [a.join(), '' + a, a < 1]").unwrap(), "[\"\",\"\",true]");
        assert_eq!(evaluate_script("var b = [1, 2]; b.push(b); b.join('-')").unwrap(), "\"1-2-\"");
    }

    #[test]
    fn test_key_past_the_index_range_is_a_plain_property() {
        assert_eq!(evaluate_script("var a = []; a[4294967295] = 1; [a.length, a[4294967295]]").unwrap(), "[0,1]");
    }
}
