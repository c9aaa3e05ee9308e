use crate::{
    JSError,
    core::{Engine, EngineConfig},
    js_console::{OutputSink, StdoutSink},
};

/// A small persistent REPL environment wrapper.
///
/// Notes:
/// - `Repl::new()` creates one engine and initializes built-ins once.
/// - `Repl::eval(&mut self, code)` evaluates the provided code in the same
///   global scope, so variables, functions and prototype edits persist
///   between calls.
pub struct Repl {
    engine: Engine,
    sink: Box<dyn OutputSink>,
}

impl Repl {
    /// Create a new persistent REPL printing `console.log` output to stdout.
    pub fn new() -> Result<Self, JSError> {
        Self::with_config(EngineConfig::default())
    }

    pub fn with_config(config: EngineConfig) -> Result<Self, JSError> {
        Self::with_sink(config, Box::new(StdoutSink))
    }

    pub fn with_sink(config: EngineConfig, sink: Box<dyn OutputSink>) -> Result<Self, JSError> {
        Ok(Repl {
            engine: Engine::with_config(config)?,
            sink,
        })
    }

    /// Whether `input` can be evaluated or more lines should be read first.
    pub fn is_complete_input(input: &str) -> bool {
        crate::repl_utils::is_complete_input(input)
    }

    /// Evaluate a script in the persistent environment and return the
    /// rendered completion value.
    pub fn eval<T: AsRef<str>>(&mut self, script: T) -> Result<String, JSError> {
        self.engine.eval(script, self.sink.as_mut())
    }
}
