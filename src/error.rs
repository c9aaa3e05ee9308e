#[derive(thiserror::Error, Debug)]
pub enum JSError {
    #[error("Tokenization failed at {line}:{column}: {message}")]
    TokenizationError { message: String, line: usize, column: usize },

    #[error("SyntaxError: {message} ({line}:{column})")]
    ParseError { message: String, line: usize, column: usize },

    #[error("Evaluation failed at {method} {file}:{line}: {message}")]
    EvaluationError {
        message: String,
        file: String,
        line: usize,
        method: String,
    },

    #[error("ReferenceError: {name} is not defined")]
    VariableNotFound { name: String },

    #[error("TypeError: {callee} is not a function")]
    NotCallable { callee: String },

    #[error("RangeError: Maximum call stack size exceeded (depth {depth})")]
    StackOverflow { depth: usize },

    #[error("TypeError: Cyclic __proto__ value")]
    CyclicPrototype,

    #[error("TypeError: {message}")]
    TypeError { message: String },

    #[error("RangeError: {message}")]
    RangeError { message: String },

    #[error("std::io error: {0}")]
    IoError(#[from] std::io::Error),
}

impl JSError {
    /// Message for end users: internal Rust locations are left out.
    pub fn user_message(&self) -> String {
        match self {
            JSError::EvaluationError { message, .. } => format!("Error: {message}"),
            other => other.to_string(),
        }
    }

    /// Source position of the script text that caused the error, when known.
    pub fn js_position(&self) -> Option<(usize, usize)> {
        match self {
            JSError::TokenizationError { line, column, .. } | JSError::ParseError { line, column, .. } => Some((*line, *column)),
            _ => None,
        }
    }
}

impl From<JSError> for std::io::Error {
    fn from(err: JSError) -> std::io::Error {
        match err {
            JSError::IoError(io_err) => io_err,
            _ => std::io::Error::other(err.to_string()),
        }
    }
}

// Macro that constructs an EvaluationError using the compile-time caller
// location and the provided message. Using a macro (rather than a
// function) ensures `file!()` and `line!()` expand to the site where the
// macro is invoked.
#[macro_export]
macro_rules! raise_eval_error {
    ($msg:expr) => {
        $crate::JSError::EvaluationError {
            message: $msg.to_string(),
            file: file!().to_string(),
            line: line!() as usize,
            method: $crate::function_name!().to_string(),
        }
    };
}

#[macro_export]
macro_rules! raise_type_error {
    ($msg:expr) => {
        $crate::JSError::TypeError { message: $msg.to_string() }
    };
}

#[macro_export]
macro_rules! raise_range_error {
    ($msg:expr) => {
        $crate::JSError::RangeError { message: $msg.to_string() }
    };
}

#[macro_export]
macro_rules! raise_parse_error {
    ($msg:expr, $token:expr) => {
        $crate::JSError::ParseError {
            message: $msg.to_string(),
            line: $token.line,
            column: $token.column,
        }
    };
}

#[macro_export]
macro_rules! function_name {
    () => {{
        fn f() {}
        fn type_name_of<T>(_: T) -> &'static str {
            std::any::type_name::<T>()
        }
        let name = type_name_of(f);
        // remove the trailing "::f"
        &name[..name.len() - 3]
    }};
}
