use crate::core::{
    EvalContext, Gc, JSObjectDataPtr, JsRoot, MutationContext, Value, env_set, new_js_object_data, object_set_key_value, set_prototype,
    value_to_string,
};
use crate::error::JSError;
use crate::js_array::create_array;
use crate::{raise_eval_error, raise_type_error};

pub fn initialize_object_module<'gc>(mc: &MutationContext<'gc>, root: &JsRoot<'gc>) -> Result<(), JSError> {
    // 1. Create Object constructor
    let object_ctor = new_js_object_data(mc);
    object_ctor.borrow_mut(mc).prototype = Some(root.object_prototype);
    env_set(mc, &root.global_env, "Object", Value::Object(object_ctor))?;

    // 2. Link the realm's Object.prototype and constructor
    let object_proto = root.object_prototype;
    object_set_key_value(mc, &object_ctor, "prototype", Value::Object(object_proto))?;
    object_set_key_value(mc, &object_proto, "constructor", Value::Object(object_ctor))?;

    // 3. Register static methods
    let static_methods: [(&str, &'static str); 4] = [
        ("create", "Object.create"),
        ("getPrototypeOf", "Object.getPrototypeOf"),
        ("keys", "Object.keys"),
        ("setPrototypeOf", "Object.setPrototypeOf"),
    ];
    for (method, qualified) in static_methods {
        object_set_key_value(mc, &object_ctor, method, Value::Function(qualified))?;
    }

    // 4. Register prototype methods
    let proto_methods: [(&str, &'static str); 3] = [
        ("hasOwnProperty", "Object.prototype.hasOwnProperty"),
        ("isPrototypeOf", "Object.prototype.isPrototypeOf"),
        ("toString", "Object.prototype.toString"),
    ];
    for (method, qualified) in proto_methods {
        object_set_key_value(mc, &object_proto, method, Value::Function(qualified))?;
    }
    Ok(())
}

fn prototype_arg<'gc>(val: Option<&Value<'gc>>, what: &str) -> Result<Option<JSObjectDataPtr<'gc>>, JSError> {
    match val {
        Some(Value::Object(obj)) => Ok(Some(*obj)),
        Some(Value::Null) => Ok(None),
        other => Err(raise_type_error!(format!(
            "{what}: Object prototype may only be an Object or null: {}",
            other.map(value_to_string).unwrap_or_else(|| "undefined".to_string())
        ))),
    }
}

pub(crate) fn handle_object_static_method<'gc>(ctx: &EvalContext<'_, 'gc>, method: &str, args: &[Value<'gc>]) -> Result<Value<'gc>, JSError> {
    let mc = ctx.mc;
    match method {
        "getPrototypeOf" => match args.first() {
            Some(Value::Object(obj)) => Ok(obj.borrow().prototype.map(Value::Object).unwrap_or(Value::Null)),
            Some(Value::Undefined) | Some(Value::Null) | None => Err(raise_type_error!("Cannot convert undefined or null to object")),
            // primitives without wrapper prototypes
            Some(_) => Ok(Value::Null),
        },
        "setPrototypeOf" => {
            let target = args.first().cloned().unwrap_or(Value::Undefined);
            let proto = prototype_arg(args.get(1), "Object.setPrototypeOf")?;
            match &target {
                Value::Object(obj) => set_prototype(mc, obj, proto)?,
                Value::Undefined | Value::Null => return Err(raise_type_error!("Object.setPrototypeOf called on null or undefined")),
                _ => {}
            }
            Ok(target)
        }
        "create" => {
            let proto = prototype_arg(args.first(), "Object.create")?;
            let obj = new_js_object_data(mc);
            obj.borrow_mut(mc).prototype = proto;
            Ok(Value::Object(obj))
        }
        "keys" => match args.first() {
            Some(Value::Object(obj)) => {
                let keys = obj.borrow().own_keys().into_iter().map(Value::from).collect();
                Ok(Value::Object(create_array(mc, ctx.root, keys)))
            }
            Some(Value::Undefined) | Some(Value::Null) | None => Err(raise_type_error!("Cannot convert undefined or null to object")),
            Some(_) => Ok(Value::Object(create_array(mc, ctx.root, Vec::new()))),
        },
        _ => Err(raise_eval_error!(format!("Object.{method} is not implemented"))),
    }
}

pub(crate) fn handle_object_prototype_method<'gc>(method: &str, this_val: &Value<'gc>, args: &[Value<'gc>]) -> Result<Value<'gc>, JSError> {
    match method {
        "hasOwnProperty" => {
            let key = args.first().map(value_to_string).unwrap_or_else(|| "undefined".to_string());
            match this_val {
                Value::Object(obj) => Ok(Value::Boolean(obj.borrow().has_own(&key))),
                Value::Undefined | Value::Null => Err(raise_type_error!("Cannot convert undefined or null to object")),
                _ => Ok(Value::Boolean(false)),
            }
        }
        "isPrototypeOf" => {
            let (Value::Object(proto), Some(Value::Object(target))) = (this_val, args.first()) else {
                return Ok(Value::Boolean(false));
            };
            let mut current = target.borrow().prototype;
            while let Some(parent) = current {
                if Gc::ptr_eq(parent, *proto) {
                    return Ok(Value::Boolean(true));
                }
                current = parent.borrow().prototype;
            }
            Ok(Value::Boolean(false))
        }
        "toString" => {
            let tag = match this_val {
                Value::Undefined => "Undefined",
                Value::Null => "Null",
                Value::Object(obj) if obj.borrow().is_array() => "Array",
                Value::Closure(_) | Value::Function(_) => "Function",
                Value::Number(_) => "Number",
                Value::String(_) => "String",
                Value::Boolean(_) => "Boolean",
                Value::Object(_) => "Object",
            };
            Ok(Value::from(format!("[object {tag}]")))
        }
        _ => Err(raise_eval_error!(format!("Object.prototype.{method} is not implemented"))),
    }
}
