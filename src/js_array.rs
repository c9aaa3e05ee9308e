use crate::{
    core::{
        EvalContext, JSObjectData, JSObjectDataPtr, JsRoot, MutationContext, Value, call_function, env_set, new_gc_cell_ptr,
        new_js_object_data, object_get_key_value, object_set_key_value, to_number, value_to_string, value_to_string_guarded,
        values_strict_equal,
    },
    error::JSError,
    raise_eval_error, raise_type_error,
    unicode::utf8_to_utf16,
};

const ARRAY_PROTOTYPE_METHODS: &[(&str, &str)] = &[
    ("forEach", "Array.prototype.forEach"),
    ("push", "Array.prototype.push"),
    ("pop", "Array.prototype.pop"),
    ("map", "Array.prototype.map"),
    ("indexOf", "Array.prototype.indexOf"),
    ("join", "Array.prototype.join"),
];

/// Populate the shared `Array.prototype` and bind the `Array` global.
pub fn initialize_array<'gc>(mc: &MutationContext<'gc>, root: &JsRoot<'gc>) -> Result<(), JSError> {
    let proto = root.array_prototype;
    for &(name, qualified) in ARRAY_PROTOTYPE_METHODS {
        object_set_key_value(mc, &proto, name, Value::Function(qualified))?;
    }

    let array_ctor = new_js_object_data(mc);
    array_ctor.borrow_mut(mc).prototype = Some(root.object_prototype);
    object_set_key_value(mc, &array_ctor, "prototype", Value::Object(proto))?;
    object_set_key_value(mc, &array_ctor, "isArray", Value::Function("Array.isArray"))?;
    object_set_key_value(mc, &proto, "constructor", Value::Object(array_ctor))?;

    env_set(mc, &root.global_env, "Array", Value::Object(array_ctor))
}

/// New array linked to the realm's `Array.prototype`.
pub fn create_array<'gc>(mc: &MutationContext<'gc>, root: &JsRoot<'gc>, elements: Vec<Value<'gc>>) -> JSObjectDataPtr<'gc> {
    let arr = new_gc_cell_ptr(mc, JSObjectData::new_array(elements));
    arr.borrow_mut(mc).prototype = Some(root.array_prototype);
    arr
}

/// Check if a value is an Array
pub fn is_array(val: &Value<'_>) -> bool {
    matches!(val, Value::Object(obj) if obj.borrow().is_array())
}

/// Handle Array static method calls (Array.isArray)
pub(crate) fn handle_array_static_method<'gc>(method: &str, args: &[Value<'gc>]) -> Result<Value<'gc>, JSError> {
    match method {
        "isArray" => Ok(Value::Boolean(args.first().is_some_and(is_array))),
        _ => Err(raise_eval_error!(format!("Array.{method} is not implemented"))),
    }
}

fn this_object<'gc>(this_val: &Value<'gc>, method: &str) -> Result<JSObjectDataPtr<'gc>, JSError> {
    match this_val {
        Value::Object(obj) => Ok(*obj),
        other => Err(raise_type_error!(format!(
            "Array.prototype.{method} called on {}",
            value_to_string(other)
        ))),
    }
}

// Generic `length` so the methods also work on array-like receivers.
fn length_of(obj: &JSObjectDataPtr<'_>) -> usize {
    let len = object_get_key_value(obj, "length").map(|v| to_number(&v)).unwrap_or(0.0);
    if len.is_finite() && len > 0.0 { len as usize } else { 0 }
}

fn callback_arg<'gc>(args: &[Value<'gc>]) -> Result<Value<'gc>, JSError> {
    let callback = args.first().cloned().unwrap_or(Value::Undefined);
    if !callback.is_callable() {
        return Err(JSError::NotCallable {
            callee: value_to_string(&callback),
        });
    }
    Ok(callback)
}

pub(crate) fn handle_array_prototype_method<'gc>(
    ctx: &EvalContext<'_, 'gc>,
    method: &str,
    this_val: Value<'gc>,
    args: &[Value<'gc>],
) -> Result<Value<'gc>, JSError> {
    let mc = ctx.mc;
    let obj = this_object(&this_val, method)?;
    match method {
        "forEach" => {
            let callback = callback_arg(args)?;
            let this_arg = args.get(1).cloned().unwrap_or(Value::Undefined);
            let len = length_of(&obj);
            for i in 0..len {
                // indices deleted or truncated during iteration are skipped
                let Some(elem) = obj.borrow().get_own(&i.to_string()) else {
                    continue;
                };
                call_function(ctx, &callback, this_arg.clone(), &[elem, Value::Number(i as f64), this_val.clone()])?;
            }
            Ok(Value::Undefined)
        }
        "map" => {
            let callback = callback_arg(args)?;
            let this_arg = args.get(1).cloned().unwrap_or(Value::Undefined);
            let len = length_of(&obj);
            let mut mapped = Vec::with_capacity(len);
            for i in 0..len {
                let Some(elem) = obj.borrow().get_own(&i.to_string()) else {
                    mapped.push(Value::Undefined);
                    continue;
                };
                mapped.push(call_function(ctx, &callback, this_arg.clone(), &[elem, Value::Number(i as f64), this_val.clone()])?);
            }
            Ok(Value::Object(create_array(mc, ctx.root, mapped)))
        }
        "push" => {
            let mut len = length_of(&obj);
            for val in args {
                object_set_key_value(mc, &obj, &len.to_string(), val.clone())?;
                len += 1;
            }
            object_set_key_value(mc, &obj, "length", Value::Number(len as f64))?;
            Ok(Value::Number(len as f64))
        }
        "pop" => {
            let len = length_of(&obj);
            if len == 0 {
                object_set_key_value(mc, &obj, "length", Value::Number(0.0))?;
                return Ok(Value::Undefined);
            }
            let key = (len - 1).to_string();
            let last = object_get_key_value(&obj, &key).unwrap_or(Value::Undefined);
            if !obj.borrow().is_array() {
                obj.borrow_mut(mc).properties.shift_remove(&key);
            }
            object_set_key_value(mc, &obj, "length", Value::Number((len - 1) as f64))?;
            Ok(last)
        }
        "indexOf" => {
            let search = args.first().cloned().unwrap_or(Value::Undefined);
            let len = length_of(&obj);
            let start = match args.get(1).map(to_number) {
                Some(n) if n.is_nan() => 0,
                Some(n) if n < 0.0 => (len as f64 + n.trunc()).max(0.0) as usize,
                Some(n) => n.trunc() as usize,
                None => 0,
            };
            for i in start..len {
                if let Some(elem) = obj.borrow().get_own(&i.to_string())
                    && values_strict_equal(&elem, &search)
                {
                    return Ok(Value::Number(i as f64));
                }
            }
            Ok(Value::Number(-1.0))
        }
        "join" => {
            let separator = match args.first() {
                None | Some(Value::Undefined) => ",".to_string(),
                Some(sep) => value_to_string(sep),
            };
            let len = length_of(&obj);
            let mut parts = Vec::with_capacity(len);
            for i in 0..len {
                match object_get_key_value(&obj, &i.to_string()) {
                    None | Some(Value::Undefined) | Some(Value::Null) => parts.push(String::new()),
                    // the receiver counts as already visited
                    Some(v) => parts.push(value_to_string_guarded(&v, &mut vec![obj])),
                }
            }
            Ok(Value::String(utf8_to_utf16(&parts.join(&separator))))
        }
        _ => Err(raise_eval_error!(format!("Array.prototype.{method} is not implemented"))),
    }
}
