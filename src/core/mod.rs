use crate::error::JSError;
use crate::js_array::initialize_array;
use crate::js_console::{OutputSink, StdoutSink, format_result_value, initialize_console_object};
use crate::js_object::initialize_object_module;
use crate::raise_eval_error;
pub(crate) use gc_arena::Mutation as MutationContext;
pub(crate) use gc_arena::collect::Trace as GcTrace;
pub(crate) use gc_arena::lock::RefLock as GcCell;
pub(crate) use gc_arena::{Collect, Gc};
pub(crate) type GcPtr<'gc, T> = Gc<'gc, GcCell<T>>;

#[inline]
pub fn new_gc_cell_ptr<'gc, T: 'gc + Collect<'gc>>(mc: &MutationContext<'gc>, value: T) -> GcPtr<'gc, T> {
    Gc::new(mc, GcCell::new(value))
}

mod value;
pub use value::*;

mod environment;
pub use environment::*;

mod statement;
pub use statement::*;

mod token;
pub use token::*;

mod eval;
pub use eval::*;

mod parser;
pub use parser::*;

/// Realm state that outlives a single evaluation.
#[derive(Collect)]
#[collect(no_drop)]
pub struct JsRoot<'gc> {
    pub global_env: EnvPtr<'gc>,
    /// `Object.prototype`; prototype of every object literal.
    pub object_prototype: JSObjectDataPtr<'gc>,
    /// The single shared `Array.prototype`; prototype of every array.
    pub array_prototype: JSObjectDataPtr<'gc>,
}

impl<'gc> JsRoot<'gc> {
    /// Bare realm: empty global scope, unpopulated intrinsic prototypes.
    pub fn new(mc: &MutationContext<'gc>) -> Self {
        let global_env = new_environment(mc, None);
        global_env.borrow_mut(mc).is_function_scope = true;
        let object_prototype = new_js_object_data(mc);
        let array_prototype = new_js_object_data(mc);
        array_prototype.borrow_mut(mc).prototype = Some(object_prototype);
        JsRoot {
            global_env,
            object_prototype,
            array_prototype,
        }
    }
}

pub type JsArena = gc_arena::Arena<gc_arena::Rootable!['gc => JsRoot<'gc>]>;

pub fn initialize_global_constructors<'gc>(mc: &MutationContext<'gc>, root: &JsRoot<'gc>) -> Result<(), JSError> {
    initialize_object_module(mc, root)?;
    initialize_array(mc, root)?;

    let console_obj = initialize_console_object(mc, root)?;
    env_set(mc, &root.global_env, "console", Value::Object(console_obj))?;

    env_set(mc, &root.global_env, "NaN", Value::Number(f64::NAN))?;
    env_set(mc, &root.global_env, "Infinity", Value::Number(f64::INFINITY))?;
    Ok(())
}

#[derive(Clone, Debug)]
pub struct EngineConfig {
    /// Nested closure calls allowed before `JSError::StackOverflow`.
    pub max_call_depth: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig { max_call_depth: 256 }
    }
}

/// A realm plus its configuration. Globals persist across `eval` calls, so a
/// single engine can back a REPL session.
pub struct Engine {
    arena: JsArena,
    config: EngineConfig,
}

impl Engine {
    pub fn new() -> Result<Self, JSError> {
        Self::with_config(EngineConfig::default())
    }

    pub fn with_config(config: EngineConfig) -> Result<Self, JSError> {
        let arena = JsArena::new(|mc| JsRoot::new(mc));
        arena.mutate(|mc, root| initialize_global_constructors(mc, root))?;
        Ok(Engine { arena, config })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Tokenize, parse and run `script`, returning the rendered completion value.
    pub fn eval<T: AsRef<str>>(&mut self, script: T, sink: &mut dyn OutputSink) -> Result<String, JSError> {
        let tokens = tokenize(script.as_ref())?;
        let statements = parse_program(&tokens)?;
        self.run_statements(&statements, sink)
    }

    /// Run syntax nodes produced by any front-end in the global scope.
    pub fn run_statements(&mut self, statements: &[Statement], sink: &mut dyn OutputSink) -> Result<String, JSError> {
        let config = &self.config;
        let result = self.arena.mutate(|mc, root| {
            let ctx = EvalContext::new(mc, root, sink, config);
            let value = evaluate_statements(&ctx, &root.global_env, statements)?;
            Ok(format_result_value(&value))
        });
        // Values cannot escape `mutate`, so everything unreachable from the root is garbage now.
        self.arena.finish_cycle();
        result
    }
}

/// Evaluate a script in a fresh realm, printing `console.log` output to stdout.
pub fn evaluate_script<T>(script: T) -> Result<String, JSError>
where
    T: AsRef<str>,
{
    evaluate_script_with_sink(script, &mut StdoutSink)
}

pub fn evaluate_script_with_sink<T>(script: T, sink: &mut dyn OutputSink) -> Result<String, JSError>
where
    T: AsRef<str>,
{
    Engine::new()?.eval(script, sink)
}

/// Read a script file from disk and decode it into a UTF-8 Rust `String`.
/// Supports UTF-8 (with optional BOM) and UTF-16 (LE/BE) with BOM.
pub fn read_script_file<P: AsRef<std::path::Path>>(path: P) -> Result<String, JSError> {
    let bytes = std::fs::read(path.as_ref())?;
    if bytes.len() >= 3 && bytes[0] == 0xEF && bytes[1] == 0xBB && bytes[2] == 0xBF {
        let s = std::str::from_utf8(&bytes[3..]).map_err(|e| raise_eval_error!(format!("Script file contains invalid UTF-8: {e}")))?;
        return Ok(s.to_string());
    }
    if bytes.len() >= 2 && (bytes[0..2] == [0xFF, 0xFE] || bytes[0..2] == [0xFE, 0xFF]) {
        let little_endian = bytes[0] == 0xFF;
        if (bytes.len() - 2) % 2 != 0 {
            return Err(raise_eval_error!("Invalid UTF-16 script file length"));
        }
        let u16s: Vec<u16> = bytes[2..]
            .chunks(2)
            .map(|c| if little_endian { u16::from_le_bytes([c[0], c[1]]) } else { u16::from_be_bytes([c[0], c[1]]) })
            .collect();
        return String::from_utf16(&u16s).map_err(|e| raise_eval_error!(format!("Invalid UTF-16 script file contents: {e}")));
    }
    std::str::from_utf8(&bytes)
        .map(|s| s.to_string())
        .map_err(|e| raise_eval_error!(format!("Script file contains invalid UTF-8: {e}")))
}
