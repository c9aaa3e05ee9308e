use crate::core::{Collect, GcPtr, GcTrace, MutationContext, Value, new_gc_cell_ptr};
use crate::{JSError, raise_type_error};
use std::collections::HashSet;

pub type EnvPtr<'gc> = GcPtr<'gc, JSEnvironment<'gc>>;

/// One lexical scope. Closures hold these by pointer, so a frame stays alive as
/// long as any function created in it (or a call still running in it) does.
#[derive(Default)]
pub struct JSEnvironment<'gc> {
    pub bindings: indexmap::IndexMap<String, Value<'gc>>,
    pub constants: HashSet<String>,
    pub parent: Option<EnvPtr<'gc>>,
    pub is_function_scope: bool,
    /// Receiver of the call that created this frame (function scopes only).
    pub this_value: Option<Value<'gc>>,
}

unsafe impl<'gc> Collect<'gc> for JSEnvironment<'gc> {
    fn trace<T: GcTrace<'gc>>(&self, cc: &mut T) {
        for v in self.bindings.values() {
            v.trace(cc);
        }
        if let Some(p) = &self.parent {
            p.trace(cc);
        }
        if let Some(t) = &self.this_value {
            t.trace(cc);
        }
    }
}

impl<'gc> JSEnvironment<'gc> {
    pub fn is_const(&self, key: &str) -> bool {
        self.constants.contains(key)
    }
}

pub fn new_environment<'gc>(mc: &MutationContext<'gc>, parent: Option<EnvPtr<'gc>>) -> EnvPtr<'gc> {
    new_gc_cell_ptr(
        mc,
        JSEnvironment {
            parent,
            ..JSEnvironment::default()
        },
    )
}

pub fn new_function_environment<'gc>(mc: &MutationContext<'gc>, parent: EnvPtr<'gc>, this_value: Value<'gc>) -> EnvPtr<'gc> {
    new_gc_cell_ptr(
        mc,
        JSEnvironment {
            parent: Some(parent),
            is_function_scope: true,
            this_value: Some(this_value),
            ..JSEnvironment::default()
        },
    )
}

/// Fresh frame with the same bindings and parent as `env`. Closures that
/// captured `env` keep seeing the old values.
pub fn copy_environment<'gc>(mc: &MutationContext<'gc>, env: &EnvPtr<'gc>) -> EnvPtr<'gc> {
    let src = env.borrow();
    new_gc_cell_ptr(
        mc,
        JSEnvironment {
            bindings: src.bindings.clone(),
            constants: src.constants.clone(),
            parent: src.parent,
            is_function_scope: src.is_function_scope,
            this_value: src.this_value.clone(),
        },
    )
}

pub fn env_get<'gc>(env: &EnvPtr<'gc>, key: &str) -> Option<Value<'gc>> {
    let mut current = Some(*env);
    while let Some(cur) = current {
        let borrowed = cur.borrow();
        if let Some(val) = borrowed.bindings.get(key) {
            return Some(val.clone());
        }
        current = borrowed.parent;
    }
    None
}

pub fn env_has_own<'gc>(env: &EnvPtr<'gc>, key: &str) -> bool {
    env.borrow().bindings.contains_key(key)
}

/// Create or overwrite a binding in `env` itself.
pub fn env_set<'gc>(mc: &MutationContext<'gc>, env: &EnvPtr<'gc>, key: &str, val: Value<'gc>) -> Result<(), JSError> {
    if env.borrow().is_const(key) {
        return Err(raise_type_error!(format!("Assignment to constant variable '{key}'")));
    }
    env.borrow_mut(mc).bindings.insert(key.to_string(), val);
    Ok(())
}

pub fn env_set_const<'gc>(mc: &MutationContext<'gc>, env: &EnvPtr<'gc>, key: &str, val: Value<'gc>) -> Result<(), JSError> {
    env_set(mc, env, key, val)?;
    env.borrow_mut(mc).constants.insert(key.to_string());
    Ok(())
}

/// Assign to the nearest existing binding. An unresolvable name becomes a
/// binding of the outermost (global) scope.
pub fn env_set_recursive<'gc>(mc: &MutationContext<'gc>, env: &EnvPtr<'gc>, key: &str, val: Value<'gc>) -> Result<(), JSError> {
    let mut current = *env;
    loop {
        if env_has_own(&current, key) {
            return env_set(mc, &current, key, val);
        }
        let parent = current.borrow().parent;
        match parent {
            Some(p) => current = p,
            None => {
                log::debug!("env_set_recursive: creating implicit global '{}'", key);
                return env_set(mc, &current, key, val);
            }
        }
    }
}

/// Nearest enclosing function scope; `var` declarations live there.
pub fn env_function_scope<'gc>(env: &EnvPtr<'gc>) -> EnvPtr<'gc> {
    let mut current = *env;
    loop {
        let (is_function_scope, parent) = {
            let borrowed = current.borrow();
            (borrowed.is_function_scope, borrowed.parent)
        };
        match parent {
            Some(p) if !is_function_scope => current = p,
            _ => return current,
        }
    }
}

/// The receiver bound by the nearest function frame, `undefined` at top level.
pub fn env_this<'gc>(env: &EnvPtr<'gc>) -> Value<'gc> {
    let mut current = Some(*env);
    while let Some(cur) = current {
        let borrowed = cur.borrow();
        if let Some(this_value) = &borrowed.this_value {
            return this_value.clone();
        }
        current = borrowed.parent;
    }
    Value::Undefined
}
