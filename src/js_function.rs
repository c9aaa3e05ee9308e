use crate::core::{EvalContext, Value};
use crate::error::JSError;
use crate::js_array::{handle_array_prototype_method, handle_array_static_method};
use crate::js_console::handle_console_method;
use crate::js_object::{handle_object_prototype_method, handle_object_static_method};
use crate::raise_eval_error;

/// Dispatch a built-in `Value::Function` by its qualified name. Built-ins
/// receive the same explicit receiver and evaluated arguments as closures.
pub fn call_native_function<'gc>(
    ctx: &EvalContext<'_, 'gc>,
    func_name: &str,
    this_val: Value<'gc>,
    args: &[Value<'gc>],
) -> Result<Value<'gc>, JSError> {
    if let Some(method) = func_name.strip_prefix("Array.prototype.") {
        return handle_array_prototype_method(ctx, method, this_val, args);
    }
    if let Some(method) = func_name.strip_prefix("Object.prototype.") {
        return handle_object_prototype_method(method, &this_val, args);
    }
    if let Some(method) = func_name.strip_prefix("Array.") {
        return handle_array_static_method(method, args);
    }
    if let Some(method) = func_name.strip_prefix("Object.") {
        return handle_object_static_method(ctx, method, args);
    }
    if let Some(method) = func_name.strip_prefix("console.") {
        return handle_console_method(ctx, method, args);
    }
    Err(raise_eval_error!(format!("Unknown built-in function {func_name}")))
}
