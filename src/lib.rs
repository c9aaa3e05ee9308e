//! A prototype-dispatch and closure execution core for a small JavaScript
//! subset.
//!
//! Objects link to a single prototype and built-in methods live as ordinary
//! function values on shared prototype objects, so replacing
//! `Array.prototype.forEach` changes every array. Functions capture their
//! defining scope by reference, and a method call passes its receiver to the
//! callee explicitly.

pub(crate) mod core;
pub(crate) mod error;
pub(crate) mod js_array;
pub(crate) mod js_console;
pub(crate) mod js_function;
pub(crate) mod js_object;
pub(crate) mod repl;
pub(crate) mod repl_utils;
pub(crate) mod stack;
pub(crate) mod unicode;

pub use crate::core::{
    BinaryOp, ClosureData, ControlFlow, Engine, EngineConfig, EvalContext, Expr, JSObjectData, JSObjectDataPtr, JsArena, JsRoot, ObjectKind,
    Statement, StatementKind, Token, TokenData, Value, call_function, evaluate_script, evaluate_script_with_sink, get_own_property,
    get_property_value, object_get_key_value, object_set_key_value, parse_program, parse_statements, read_script_file, set_prototype,
    tokenize, value_to_string,
};
pub use crate::error::JSError;
pub use crate::js_console::{CollectingSink, OutputSink, StdoutSink, format_console_value};
pub use crate::repl::Repl;
pub use crate::repl_utils::is_complete_input;
pub use crate::unicode::{utf8_to_utf16, utf16_to_utf8};
