use crate::core::{
    BinaryOp, ClosureData, EngineConfig, EnvPtr, Expr, Gc, JsRoot, MutationContext, Statement, StatementKind, Value, array_index,
    copy_environment, env_function_scope, env_get, env_has_own, env_set, env_set_const, env_set_recursive, env_this, format_js_number, new_environment,
    new_function_environment, new_js_object_data, object_get_key_value, object_set_key_value, set_prototype, to_boolean, to_number,
    type_of, value_to_string, values_loosely_equal, values_strict_equal,
};
use crate::js_array::create_array;
use crate::js_console::OutputSink;
use crate::js_function::call_native_function;
use crate::stack::ensure_sufficient_stack;
use crate::unicode::{utf16_char_at, utf16_concat, utf8_to_utf16};
use crate::{JSError, raise_eval_error, raise_type_error};
use std::cell::{Cell, RefCell};

#[derive(Clone, Debug)]
pub enum ControlFlow<'gc> {
    Normal(Value<'gc>),
    Return(Value<'gc>),
    Break,
    Continue,
}

/// Everything an evaluation needs besides the current scope: the mutation
/// handle, the realm, the output sink and the call depth budget.
pub struct EvalContext<'a, 'gc> {
    pub mc: &'a MutationContext<'gc>,
    pub root: &'a JsRoot<'gc>,
    sink: RefCell<&'a mut dyn OutputSink>,
    config: &'a EngineConfig,
    depth: Cell<usize>,
}

/// Decrements the call depth when a call frame is popped, including on error.
pub struct CallDepthGuard<'c> {
    depth: &'c Cell<usize>,
}

impl Drop for CallDepthGuard<'_> {
    fn drop(&mut self) {
        self.depth.set(self.depth.get().saturating_sub(1));
    }
}

impl<'a, 'gc> EvalContext<'a, 'gc> {
    pub fn new(mc: &'a MutationContext<'gc>, root: &'a JsRoot<'gc>, sink: &'a mut dyn OutputSink, config: &'a EngineConfig) -> Self {
        EvalContext {
            mc,
            root,
            sink: RefCell::new(sink),
            config,
            depth: Cell::new(0),
        }
    }

    pub fn depth(&self) -> usize {
        self.depth.get()
    }

    pub fn enter_call(&self) -> Result<CallDepthGuard<'_>, JSError> {
        let depth = self.depth.get() + 1;
        if depth > self.config.max_call_depth {
            log::debug!("enter_call: depth {} exceeds limit {}", depth, self.config.max_call_depth);
            return Err(JSError::StackOverflow { depth });
        }
        self.depth.set(depth);
        Ok(CallDepthGuard { depth: &self.depth })
    }

    /// Forward one `console.log` argument list to the host sink.
    pub fn emit(&self, args: &[Value<'gc>]) {
        self.sink.borrow_mut().log(args);
    }
}

fn hoist_var_names<'gc>(mc: &MutationContext<'gc>, scope: &EnvPtr<'gc>, statements: &[Statement]) -> Result<(), JSError> {
    for stmt in statements {
        match &stmt.kind {
            StatementKind::Var(decls) => {
                for (name, _) in decls {
                    if !env_has_own(scope, name) {
                        env_set(mc, scope, name, Value::Undefined)?;
                    }
                }
            }
            StatementKind::If(_, then_body, else_body) => {
                hoist_var_names(mc, scope, then_body)?;
                if let Some(else_body) = else_body {
                    hoist_var_names(mc, scope, else_body)?;
                }
            }
            StatementKind::For(init, _, _, body) => {
                if let Some(init) = init {
                    hoist_var_names(mc, scope, std::slice::from_ref(init.as_ref()))?;
                }
                hoist_var_names(mc, scope, body)?;
            }
            StatementKind::While(_, body) | StatementKind::Block(body) => hoist_var_names(mc, scope, body)?,
            _ => {}
        }
    }
    Ok(())
}

fn hoist_declarations<'gc>(ctx: &EvalContext<'_, 'gc>, env: &EnvPtr<'gc>, statements: &[Statement]) -> Result<(), JSError> {
    let scope = env_function_scope(env);
    hoist_var_names(ctx.mc, &scope, statements)?;
    for stmt in statements {
        if let StatementKind::FunctionDeclaration(name, params, body) = &stmt.kind {
            let closure = Gc::new(ctx.mc, ClosureData::new(Some(name.clone()), params, body, *env));
            env_set(ctx.mc, env, name, Value::Closure(closure))?;
        }
    }
    Ok(())
}

/// Run a statement list and return its completion value. Control signals that
/// reach this boundary end the list.
pub fn evaluate_statements<'gc>(ctx: &EvalContext<'_, 'gc>, env: &EnvPtr<'gc>, statements: &[Statement]) -> Result<Value<'gc>, JSError> {
    match evaluate_statements_with_context(ctx, env, statements)? {
        ControlFlow::Normal(val) | ControlFlow::Return(val) => Ok(val),
        ControlFlow::Break | ControlFlow::Continue => Ok(Value::Undefined),
    }
}

pub fn evaluate_statements_with_context<'gc>(
    ctx: &EvalContext<'_, 'gc>,
    env: &EnvPtr<'gc>,
    statements: &[Statement],
) -> Result<ControlFlow<'gc>, JSError> {
    hoist_declarations(ctx, env, statements)?;
    let mut last_value = Value::Undefined;
    for stmt in statements {
        if let Some(cf) = eval_res(ctx, stmt, &mut last_value, env)? {
            return Ok(cf);
        }
    }
    Ok(ControlFlow::Normal(last_value))
}

// Body of a block, branch or loop iteration in its own lexical scope.
fn evaluate_block<'gc>(ctx: &EvalContext<'_, 'gc>, env: &EnvPtr<'gc>, body: &[Statement]) -> Result<ControlFlow<'gc>, JSError> {
    let block_env = new_environment(ctx.mc, Some(*env));
    ensure_sufficient_stack(|| evaluate_statements_with_context(ctx, &block_env, body))
}

fn eval_res<'gc>(
    ctx: &EvalContext<'_, 'gc>,
    stmt: &Statement,
    last_value: &mut Value<'gc>,
    env: &EnvPtr<'gc>,
) -> Result<Option<ControlFlow<'gc>>, JSError> {
    log::trace!("eval_res {}:{} {:?}", stmt.line, stmt.column, stmt.kind);
    let mc = ctx.mc;
    match &stmt.kind {
        StatementKind::Expr(expr) => {
            *last_value = evaluate_expr(ctx, env, expr).inspect_err(|e| {
                log::debug!("statement at {}:{} failed: {}", stmt.line, stmt.column, e);
            })?;
            Ok(None)
        }
        StatementKind::Var(decls) => {
            let scope = env_function_scope(env);
            for (name, expr_opt) in decls {
                match expr_opt {
                    Some(expr) => {
                        let val = evaluate_expr(ctx, env, expr)?;
                        env_set(mc, &scope, name, val)?;
                    }
                    None if !env_has_own(&scope, name) => env_set(mc, &scope, name, Value::Undefined)?,
                    None => {}
                }
            }
            Ok(None)
        }
        StatementKind::Let(decls) => {
            for (name, expr_opt) in decls {
                let val = match expr_opt {
                    Some(expr) => evaluate_expr(ctx, env, expr)?,
                    None => Value::Undefined,
                };
                env_set(mc, env, name, val)?;
            }
            Ok(None)
        }
        StatementKind::Const(decls) => {
            for (name, expr) in decls {
                let val = evaluate_expr(ctx, env, expr)?;
                env_set_const(mc, env, name, val)?;
            }
            Ok(None)
        }
        // bound during hoisting
        StatementKind::FunctionDeclaration(..) => Ok(None),
        StatementKind::Return(expr_opt) => {
            let val = match expr_opt {
                Some(expr) => evaluate_expr(ctx, env, expr)?,
                None => Value::Undefined,
            };
            Ok(Some(ControlFlow::Return(val)))
        }
        StatementKind::If(condition, then_body, else_body) => {
            let cond = evaluate_expr(ctx, env, condition)?;
            let branch = if to_boolean(&cond) { Some(then_body) } else { else_body.as_ref() };
            if let Some(body) = branch {
                match evaluate_block(ctx, env, body)? {
                    ControlFlow::Normal(val) => *last_value = val,
                    cf => return Ok(Some(cf)),
                }
            }
            Ok(None)
        }
        StatementKind::Block(body) => match evaluate_block(ctx, env, body)? {
            ControlFlow::Normal(val) => {
                *last_value = val;
                Ok(None)
            }
            cf => Ok(Some(cf)),
        },
        StatementKind::For(init, condition, update, body) => {
            let mut loop_env = new_environment(mc, Some(*env));
            // let/const bindings get a fresh copy for every iteration
            let per_iteration = matches!(init.as_deref().map(|s| &s.kind), Some(StatementKind::Let(_) | StatementKind::Const(_)));
            if let Some(init) = init {
                let mut init_value = Value::Undefined;
                eval_res(ctx, init, &mut init_value, &loop_env)?;
            }
            loop {
                if let Some(condition) = condition {
                    let cond = evaluate_expr(ctx, &loop_env, condition)?;
                    if !to_boolean(&cond) {
                        break;
                    }
                }
                match evaluate_block(ctx, &loop_env, body)? {
                    ControlFlow::Normal(val) => *last_value = val,
                    ControlFlow::Continue => {}
                    ControlFlow::Break => break,
                    ControlFlow::Return(val) => return Ok(Some(ControlFlow::Return(val))),
                }
                if per_iteration {
                    loop_env = copy_environment(mc, &loop_env);
                }
                if let Some(update) = update {
                    evaluate_expr(ctx, &loop_env, update)?;
                }
            }
            Ok(None)
        }
        StatementKind::While(condition, body) => {
            loop {
                let cond = evaluate_expr(ctx, env, condition)?;
                if !to_boolean(&cond) {
                    break;
                }
                match evaluate_block(ctx, env, body)? {
                    ControlFlow::Normal(val) => *last_value = val,
                    ControlFlow::Continue => {}
                    ControlFlow::Break => break,
                    ControlFlow::Return(val) => return Ok(Some(ControlFlow::Return(val))),
                }
            }
            Ok(None)
        }
        StatementKind::Break => Ok(Some(ControlFlow::Break)),
        StatementKind::Continue => Ok(Some(ControlFlow::Continue)),
        StatementKind::Empty => Ok(None),
    }
}

pub fn evaluate_expr<'gc>(ctx: &EvalContext<'_, 'gc>, env: &EnvPtr<'gc>, expr: &Expr) -> Result<Value<'gc>, JSError> {
    ensure_sufficient_stack(|| evaluate_expr_inner(ctx, env, expr))
}

fn evaluate_expr_inner<'gc>(ctx: &EvalContext<'_, 'gc>, env: &EnvPtr<'gc>, expr: &Expr) -> Result<Value<'gc>, JSError> {
    let mc = ctx.mc;
    match expr {
        Expr::Number(n) => Ok(Value::Number(*n)),
        Expr::StringLit(s) => Ok(Value::String(s.clone())),
        Expr::Boolean(b) => Ok(Value::Boolean(*b)),
        Expr::Null => Ok(Value::Null),
        Expr::Undefined => Ok(Value::Undefined),
        Expr::This => Ok(env_this(env)),
        Expr::Var(name) => evaluate_var(env, name),
        Expr::Array(elements) => {
            let mut values = Vec::with_capacity(elements.len());
            for element in elements {
                values.push(evaluate_expr(ctx, env, element)?);
            }
            Ok(Value::Object(create_array(mc, ctx.root, values)))
        }
        Expr::Object(props) => {
            let obj = new_js_object_data(mc);
            obj.borrow_mut(mc).prototype = Some(ctx.root.object_prototype);
            for (key, value_expr) in props {
                let val = evaluate_expr(ctx, env, value_expr)?;
                if key == "__proto__" {
                    // non-object values leave the default prototype in place
                    match val {
                        Value::Object(proto) => set_prototype(mc, &obj, Some(proto))?,
                        Value::Null => set_prototype(mc, &obj, None)?,
                        _ => {}
                    }
                } else {
                    object_set_key_value(mc, &obj, key, val)?;
                }
            }
            Ok(Value::Object(obj))
        }
        Expr::Function(name, params, body) => make_closure(mc, name.as_deref(), params, body, env),
        Expr::Property(obj_expr, key) => {
            let base = evaluate_expr(ctx, env, obj_expr)?;
            get_property_value(&base, key)
        }
        Expr::Index(obj_expr, index_expr) => {
            let base = evaluate_expr(ctx, env, obj_expr)?;
            let key = value_to_string(&evaluate_expr(ctx, env, index_expr)?);
            get_property_value(&base, &key)
        }
        Expr::Call(callee, args) => evaluate_call(ctx, env, callee, args),
        Expr::Assign(target, value_expr) => match target.as_ref() {
            Expr::Var(name) => {
                let val = evaluate_expr(ctx, env, value_expr)?;
                env_set_recursive(mc, env, name, val.clone())?;
                Ok(val)
            }
            Expr::Property(obj_expr, key) => {
                let base = evaluate_expr(ctx, env, obj_expr)?;
                let val = evaluate_expr(ctx, env, value_expr)?;
                set_property_value(ctx, &base, key, val.clone())?;
                Ok(val)
            }
            Expr::Index(obj_expr, index_expr) => {
                let base = evaluate_expr(ctx, env, obj_expr)?;
                let key = value_to_string(&evaluate_expr(ctx, env, index_expr)?);
                let val = evaluate_expr(ctx, env, value_expr)?;
                set_property_value(ctx, &base, &key, val.clone())?;
                Ok(val)
            }
            _ => Err(raise_eval_error!("Invalid assignment target")),
        },
        Expr::AddAssign(target, value_expr) => {
            let (_, new) = update_target(ctx, env, target, |old| {
                let rhs = evaluate_expr(ctx, env, value_expr)?;
                Ok(add_values(&old, &rhs))
            })?;
            Ok(new)
        }
        Expr::SubAssign(target, value_expr) => {
            let (_, new) = update_target(ctx, env, target, |old| {
                let rhs = evaluate_expr(ctx, env, value_expr)?;
                Ok(Value::Number(to_number(&old) - to_number(&rhs)))
            })?;
            Ok(new)
        }
        Expr::Increment(target, is_prefix) | Expr::Decrement(target, is_prefix) => {
            let delta = if matches!(expr, Expr::Increment(..)) { 1.0 } else { -1.0 };
            let (old, new) = update_target(ctx, env, target, |old| Ok(Value::Number(to_number(&old) + delta)))?;
            if *is_prefix { Ok(new) } else { Ok(Value::Number(to_number(&old))) }
        }
        Expr::Binary(left, op, right) => {
            let l = evaluate_expr(ctx, env, left)?;
            let r = evaluate_expr(ctx, env, right)?;
            Ok(evaluate_binary(&l, *op, &r))
        }
        Expr::LogicalAnd(left, right) => {
            let l = evaluate_expr(ctx, env, left)?;
            if to_boolean(&l) { evaluate_expr(ctx, env, right) } else { Ok(l) }
        }
        Expr::LogicalOr(left, right) => {
            let l = evaluate_expr(ctx, env, left)?;
            if to_boolean(&l) { Ok(l) } else { evaluate_expr(ctx, env, right) }
        }
        Expr::LogicalNot(operand) => Ok(Value::Boolean(!to_boolean(&evaluate_expr(ctx, env, operand)?))),
        Expr::UnaryNeg(operand) => Ok(Value::Number(-to_number(&evaluate_expr(ctx, env, operand)?))),
        Expr::TypeOf(operand) => {
            // typeof tolerates undeclared names
            let val = match operand.as_ref() {
                Expr::Var(name) => env_get(env, name).unwrap_or(Value::Undefined),
                other => evaluate_expr(ctx, env, other)?,
            };
            Ok(Value::from(type_of(&val)))
        }
    }
}

fn evaluate_var<'gc>(env: &EnvPtr<'gc>, name: &str) -> Result<Value<'gc>, JSError> {
    env_get(env, name).ok_or_else(|| JSError::VariableNotFound { name: name.to_string() })
}

/// Create a function value capturing `env`. A named function expression can
/// refer to itself through a binding in an intermediate scope.
pub fn make_closure<'gc>(
    mc: &MutationContext<'gc>,
    name: Option<&str>,
    params: &[String],
    body: &std::rc::Rc<Vec<Statement>>,
    env: &EnvPtr<'gc>,
) -> Result<Value<'gc>, JSError> {
    match name {
        Some(name) => {
            let func_env = new_environment(mc, Some(*env));
            let closure = Value::Closure(Gc::new(mc, ClosureData::new(Some(name.to_string()), params, body, func_env)));
            env_set(mc, &func_env, name, closure.clone())?;
            Ok(closure)
        }
        None => Ok(Value::Closure(Gc::new(mc, ClosureData::new(None, params, body, *env)))),
    }
}

// Read-modify-write of an assignable expression. Returns (old, new).
fn update_target<'gc, F>(ctx: &EvalContext<'_, 'gc>, env: &EnvPtr<'gc>, target: &Expr, f: F) -> Result<(Value<'gc>, Value<'gc>), JSError>
where
    F: FnOnce(Value<'gc>) -> Result<Value<'gc>, JSError>,
{
    match target {
        Expr::Var(name) => {
            let old = evaluate_var(env, name)?;
            let new = f(old.clone())?;
            env_set_recursive(ctx.mc, env, name, new.clone())?;
            Ok((old, new))
        }
        Expr::Property(obj_expr, key) => {
            let base = evaluate_expr(ctx, env, obj_expr)?;
            let old = get_property_value(&base, key)?;
            let new = f(old.clone())?;
            set_property_value(ctx, &base, key, new.clone())?;
            Ok((old, new))
        }
        Expr::Index(obj_expr, index_expr) => {
            let base = evaluate_expr(ctx, env, obj_expr)?;
            let key = value_to_string(&evaluate_expr(ctx, env, index_expr)?);
            let old = get_property_value(&base, &key)?;
            let new = f(old.clone())?;
            set_property_value(ctx, &base, &key, new.clone())?;
            Ok((old, new))
        }
        _ => Err(raise_eval_error!("Invalid assignment target")),
    }
}

fn add_values<'gc>(l: &Value<'gc>, r: &Value<'gc>) -> Value<'gc> {
    let numeric = |v: &Value<'gc>| matches!(v, Value::Number(_) | Value::Boolean(_) | Value::Null | Value::Undefined);
    if numeric(l) && numeric(r) {
        return Value::Number(to_number(l) + to_number(r));
    }
    let left = match l {
        Value::String(s) => s.clone(),
        other => utf8_to_utf16(&value_to_string(other)),
    };
    let right = match r {
        Value::String(s) => s.clone(),
        other => utf8_to_utf16(&value_to_string(other)),
    };
    Value::String(utf16_concat(&left, &right))
}

fn compare_values<'gc>(l: &Value<'gc>, r: &Value<'gc>) -> Option<std::cmp::Ordering> {
    if let (Value::String(a), Value::String(b)) = (l, r) {
        return Some(a.cmp(b));
    }
    to_number(l).partial_cmp(&to_number(r))
}

pub fn evaluate_binary<'gc>(l: &Value<'gc>, op: BinaryOp, r: &Value<'gc>) -> Value<'gc> {
    use std::cmp::Ordering;
    match op {
        BinaryOp::Add => add_values(l, r),
        BinaryOp::Sub => Value::Number(to_number(l) - to_number(r)),
        BinaryOp::Mul => Value::Number(to_number(l) * to_number(r)),
        BinaryOp::Div => Value::Number(to_number(l) / to_number(r)),
        BinaryOp::Mod => Value::Number(to_number(l) % to_number(r)),
        BinaryOp::Equal => Value::Boolean(values_loosely_equal(l, r)),
        BinaryOp::NotEqual => Value::Boolean(!values_loosely_equal(l, r)),
        BinaryOp::StrictEqual => Value::Boolean(values_strict_equal(l, r)),
        BinaryOp::StrictNotEqual => Value::Boolean(!values_strict_equal(l, r)),
        BinaryOp::LessThan => Value::Boolean(compare_values(l, r) == Some(Ordering::Less)),
        BinaryOp::GreaterThan => Value::Boolean(compare_values(l, r) == Some(Ordering::Greater)),
        BinaryOp::LessEqual => Value::Boolean(matches!(compare_values(l, r), Some(Ordering::Less | Ordering::Equal))),
        BinaryOp::GreaterEqual => Value::Boolean(matches!(compare_values(l, r), Some(Ordering::Greater | Ordering::Equal))),
    }
}

/// Language-level property read. Misses anywhere on the prototype chain yield
/// `undefined`; only `undefined`/`null` bases are errors.
pub fn get_property_value<'gc>(base: &Value<'gc>, key: &str) -> Result<Value<'gc>, JSError> {
    match base {
        Value::Object(obj) => {
            if key == "__proto__" {
                return Ok(obj.borrow().prototype.map(Value::Object).unwrap_or(Value::Null));
            }
            Ok(object_get_key_value(obj, key).unwrap_or(Value::Undefined))
        }
        Value::String(s) => {
            if key == "length" {
                return Ok(Value::Number(s.len() as f64));
            }
            Ok(array_index(key)
                .and_then(|idx| utf16_char_at(s, idx))
                .map(Value::String)
                .unwrap_or(Value::Undefined))
        }
        Value::Closure(cl) => Ok(match key {
            "name" => Value::from(cl.name.as_deref().unwrap_or("")),
            "length" => Value::Number(cl.params.len() as f64),
            _ => Value::Undefined,
        }),
        Value::Function(name) => Ok(match key {
            "name" => Value::from(name.rsplit('.').next().unwrap_or(*name)),
            _ => Value::Undefined,
        }),
        Value::Undefined | Value::Null => Err(raise_type_error!(format!(
            "Cannot read properties of {} (reading '{}')",
            value_to_string(base),
            key
        ))),
        Value::Number(_) | Value::Boolean(_) => Ok(Value::Undefined),
    }
}

/// Language-level property write: an own property of the base object.
pub fn set_property_value<'gc>(ctx: &EvalContext<'_, 'gc>, base: &Value<'gc>, key: &str, val: Value<'gc>) -> Result<(), JSError> {
    match base {
        Value::Object(obj) => {
            if key == "__proto__" {
                return match val {
                    Value::Object(proto) => set_prototype(ctx.mc, obj, Some(proto)),
                    Value::Null => set_prototype(ctx.mc, obj, None),
                    _ => Ok(()),
                };
            }
            object_set_key_value(ctx.mc, obj, key, val)
        }
        Value::Undefined | Value::Null => Err(raise_type_error!(format!(
            "Cannot set properties of {} (setting '{}')",
            value_to_string(base),
            key
        ))),
        // writes to primitives are dropped
        _ => Ok(()),
    }
}

fn describe_callee(expr: &Expr) -> String {
    match expr {
        Expr::Var(name) => name.clone(),
        Expr::This => "this".to_string(),
        Expr::Property(obj, key) => format!("{}.{}", describe_callee(obj), key),
        Expr::Index(obj, index) => match index.as_ref() {
            Expr::Number(n) => format!("{}[{}]", describe_callee(obj), format_js_number(*n)),
            _ => format!("{}[...]", describe_callee(obj)),
        },
        Expr::Call(callee, _) => format!("{}(...)", describe_callee(callee)),
        _ => "expression".to_string(),
    }
}

fn evaluate_call<'gc>(ctx: &EvalContext<'_, 'gc>, env: &EnvPtr<'gc>, callee: &Expr, args: &[Expr]) -> Result<Value<'gc>, JSError> {
    // A member callee supplies the receiver.
    let (func, this_val) = match callee {
        Expr::Property(obj_expr, key) => {
            let base = evaluate_expr(ctx, env, obj_expr)?;
            (get_property_value(&base, key)?, base)
        }
        Expr::Index(obj_expr, index_expr) => {
            let base = evaluate_expr(ctx, env, obj_expr)?;
            let key = value_to_string(&evaluate_expr(ctx, env, index_expr)?);
            (get_property_value(&base, &key)?, base)
        }
        _ => (evaluate_expr(ctx, env, callee)?, Value::Undefined),
    };
    let mut arg_values = Vec::with_capacity(args.len());
    for arg in args {
        arg_values.push(evaluate_expr(ctx, env, arg)?);
    }
    if !func.is_callable() {
        return Err(JSError::NotCallable {
            callee: describe_callee(callee),
        });
    }
    call_function(ctx, &func, this_val, &arg_values)
}

/// Invoke any callable value with an explicit receiver.
pub fn call_function<'gc>(ctx: &EvalContext<'_, 'gc>, callee: &Value<'gc>, this_val: Value<'gc>, args: &[Value<'gc>]) -> Result<Value<'gc>, JSError> {
    match callee {
        Value::Closure(cl) => call_closure(ctx, cl, this_val, args),
        Value::Function(name) => {
            log::debug!("call_function: native {} with {} args", name, args.len());
            call_native_function(ctx, name, this_val, args)
        }
        other => Err(JSError::NotCallable {
            callee: value_to_string(other),
        }),
    }
}

pub fn call_closure<'gc>(ctx: &EvalContext<'_, 'gc>, cl: &ClosureData<'gc>, this_val: Value<'gc>, args: &[Value<'gc>]) -> Result<Value<'gc>, JSError> {
    let _guard = ctx.enter_call()?;
    log::debug!(
        "call_closure: {} depth={} args={}",
        cl.name.as_deref().unwrap_or("<anonymous>"),
        ctx.depth(),
        args.len()
    );
    let call_env = new_function_environment(ctx.mc, cl.env, this_val);
    for (i, param) in cl.params.iter().enumerate() {
        let arg = args.get(i).cloned().unwrap_or(Value::Undefined);
        env_set(ctx.mc, &call_env, param, arg)?;
    }
    match ensure_sufficient_stack(|| evaluate_statements_with_context(ctx, &call_env, &cl.body))? {
        ControlFlow::Return(val) => Ok(val),
        ControlFlow::Normal(_) | ControlFlow::Break | ControlFlow::Continue => Ok(Value::Undefined),
    }
}
