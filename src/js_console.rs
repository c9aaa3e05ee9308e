use crate::core::{EvalContext, Gc, JSObjectDataPtr, JsRoot, MutationContext, Value, format_js_number, new_js_object_data, object_set_key_value};
use crate::error::JSError;
use crate::raise_eval_error;
use crate::unicode::utf16_to_utf8;

/// Receiver of `console.log` argument lists, one call per log invocation.
pub trait OutputSink {
    fn log<'gc>(&mut self, args: &[Value<'gc>]);
}

/// Prints each call as one space-separated line on stdout.
pub struct StdoutSink;

impl OutputSink for StdoutSink {
    fn log<'gc>(&mut self, args: &[Value<'gc>]) {
        println!("{}", format_log_line(args));
    }
}

/// Records formatted arguments per call so hosts can inspect output after
/// the arena has been left.
#[derive(Debug, Default)]
pub struct CollectingSink {
    pub calls: Vec<Vec<String>>,
}

impl CollectingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Each call with its arguments joined by a space.
    pub fn lines(&self) -> Vec<String> {
        self.calls.iter().map(|args| args.join(" ")).collect()
    }
}

impl OutputSink for CollectingSink {
    fn log<'gc>(&mut self, args: &[Value<'gc>]) {
        self.calls.push(args.iter().map(|v| format_console_value(v)).collect());
    }
}

/// Create the console object with logging functions
pub fn initialize_console_object<'gc>(mc: &MutationContext<'gc>, root: &JsRoot<'gc>) -> Result<JSObjectDataPtr<'gc>, JSError> {
    let console_obj = new_js_object_data(mc);
    console_obj.borrow_mut(mc).prototype = Some(root.object_prototype);
    object_set_key_value(mc, &console_obj, "log", Value::Function("console.log"))?;
    Ok(console_obj)
}

/// Handle console object method calls
pub fn handle_console_method<'gc>(ctx: &EvalContext<'_, 'gc>, method: &str, args: &[Value<'gc>]) -> Result<Value<'gc>, JSError> {
    match method {
        "log" => {
            log::debug!("console.log called with {} args", args.len());
            ctx.emit(args);
            Ok(Value::Undefined)
        }
        _ => Err(raise_eval_error!(format!("Console method {method} not implemented"))),
    }
}

/// Join a `console.log` argument list into one output line. A leading string
/// containing `%s`, `%d`, `%i` or `%o` consumes following arguments.
pub fn format_log_line<'gc>(args: &[Value<'gc>]) -> String {
    let Some(first) = args.first() else {
        return String::new();
    };
    let mut output = String::new();
    let mut rest = &args[1..];
    match first {
        Value::String(s) if !rest.is_empty() && s.contains(&(b'%' as u16)) => {
            let text = utf16_to_utf8(s);
            let mut chars = text.chars().peekable();
            while let Some(c) = chars.next() {
                if c != '%' {
                    output.push(c);
                    continue;
                }
                match chars.peek().copied() {
                    Some('%') => {
                        chars.next();
                        output.push('%');
                    }
                    Some(spec @ ('s' | 'd' | 'i' | 'o' | 'O')) if !rest.is_empty() => {
                        chars.next();
                        let val = &rest[0];
                        rest = &rest[1..];
                        match spec {
                            'd' | 'i' => output.push_str(&format_js_number(crate::core::to_number(val).trunc())),
                            _ => output.push_str(&format_console_value(val)),
                        }
                    }
                    _ => output.push('%'),
                }
            }
        }
        other => output.push_str(&format_console_value(other)),
    }
    for val in rest {
        output.push(' ');
        output.push_str(&format_console_value(val));
    }
    output
}

/// Render a value the way `console.log` shows a top-level argument.
pub fn format_console_value<'gc>(val: &Value<'gc>) -> String {
    let mut seen = Vec::new();
    format_nested(val, 0, &mut seen, false)
}

const MAX_INSPECT_DEPTH: usize = 2;

fn format_nested<'gc>(val: &Value<'gc>, depth: usize, seen: &mut Vec<JSObjectDataPtr<'gc>>, quote_strings: bool) -> String {
    match val {
        Value::Number(n) => format_js_number(*n),
        Value::String(s) if quote_strings => format!("'{}'", utf16_to_utf8(s)),
        Value::String(s) => utf16_to_utf8(s),
        Value::Boolean(b) => b.to_string(),
        Value::Undefined => "undefined".to_string(),
        Value::Null => "null".to_string(),
        Value::Closure(cl) => match &cl.name {
            Some(name) if !name.is_empty() => format!("[Function: {name}]"),
            _ => "[Function (anonymous)]".to_string(),
        },
        Value::Function(name) => format!("[Function: {}]", name.rsplit('.').next().unwrap_or(*name)),
        Value::Object(obj) => {
            if seen.iter().any(|o| Gc::ptr_eq(*o, *obj)) {
                return "[Circular]".to_string();
            }
            let borrowed = obj.borrow();
            if depth > MAX_INSPECT_DEPTH {
                return if borrowed.is_array() { "[Array]" } else { "[Object]" }.to_string();
            }
            seen.push(*obj);
            let mut parts: Vec<String> = Vec::new();
            if let Some(elements) = borrowed.elements() {
                for v in elements {
                    parts.push(format_nested(v, depth + 1, seen, true));
                }
            }
            for (key, v) in borrowed.properties.iter() {
                parts.push(format!("{}: {}", key, format_nested(v, depth + 1, seen, true)));
            }
            seen.pop();
            let (open, close) = if borrowed.is_array() { ("[", "]") } else { ("{", "}") };
            if parts.is_empty() {
                format!("{open}{close}")
            } else {
                format!("{open} {} {close}", parts.join(", "))
            }
        }
    }
}

/// Render the completion value of a script: strings are double-quoted and
/// containers use a compact JSON-like form.
pub fn format_result_value<'gc>(val: &Value<'gc>) -> String {
    let mut seen = Vec::new();
    format_result_nested(val, &mut seen)
}

fn format_result_nested<'gc>(val: &Value<'gc>, seen: &mut Vec<JSObjectDataPtr<'gc>>) -> String {
    match val {
        Value::String(s) => json_quote(&utf16_to_utf8(s)),
        Value::Object(obj) => {
            if seen.iter().any(|o| Gc::ptr_eq(*o, *obj)) {
                return "[Circular]".to_string();
            }
            seen.push(*obj);
            let borrowed = obj.borrow();
            let rendered = match borrowed.elements() {
                Some(elements) => {
                    let items: Vec<String> = elements.iter().map(|v| format_result_nested(v, seen)).collect();
                    format!("[{}]", items.join(","))
                }
                None => {
                    let items: Vec<String> = borrowed
                        .properties
                        .iter()
                        .map(|(k, v)| format!("{}:{}", json_quote(k), format_result_nested(v, seen)))
                        .collect();
                    format!("{{{}}}", items.join(","))
                }
            };
            seen.pop();
            rendered
        }
        other => format_nested(other, 0, &mut Vec::new(), false),
    }
}

// JSON string literal: short escapes where JSON has them, `\uXXXX` for other control characters.
fn json_quote(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\u{8}' => out.push_str("\\b"),
            '\u{c}' => out.push_str("\\f"),
            c if (c as u32) < 0x20 => out.push_str(&format!("\\u{:04x}", c as u32)),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{JSObjectData, JsArena, new_gc_cell_ptr};

    #[test]
    fn log_line_formats_placeholders() {
        let args = [Value::from("%s has %d items"), Value::from("cart"), Value::Number(3.7)];
        assert_eq!(format_log_line(&args), "cart has 3 items");
        let args = [Value::from("100%"), Value::Number(1.0)];
        assert_eq!(format_log_line(&args), "100% 1");
        assert_eq!(format_log_line(&[]), "");
    }

    #[test]
    fn nested_values_render_like_node() {
        let arena = JsArena::new(|mc| JsRoot::new(mc));
        arena.mutate(|mc, _root| {
            let arr = new_gc_cell_ptr(mc, JSObjectData::new_array(vec![Value::Number(1.0), Value::from("a")]));
            assert_eq!(format_console_value(&Value::Object(arr)), "[ 1, 'a' ]");
            assert_eq!(format_result_value(&Value::Object(arr)), "[1,\"a\"]");

            let obj = new_js_object_data(mc);
            object_set_key_value(mc, &obj, "self", Value::Object(obj)).unwrap();
            assert_eq!(format_console_value(&Value::Object(obj)), "{ self: [Circular] }");
        });
    }

    #[test]
    fn result_strings_use_json_escapes() {
        assert_eq!(format_result_value(&Value::from("a\"b\\c")), r#""a\"b\\c""#);
        assert_eq!(format_result_value(&Value::from("\n\t\u{1b}\u{0}")), r#""\n\t\u001b\u0000""#);
        assert_eq!(format_result_value(&Value::from("é😀")), "\"é😀\"");
    }
}
