//! Stack growth for the recursive parser and evaluator.
//!
//! Nested expressions and script-level recursion map onto native recursion.
//! Wrapping the recursive entry points in [`ensure_sufficient_stack`] lets
//! them run on any host thread, so the call-depth limit of
//! [`EngineConfig`](crate::EngineConfig) is reached before the native stack
//! runs out.

/// Grow the stack when less than this remains.
const RED_ZONE: usize = 128 * 1024;

/// Size of each newly allocated stack segment.
const STACK_PER_RECURSION: usize = 1024 * 1024;

#[inline]
#[cfg(not(target_arch = "wasm32"))]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    stacker::maybe_grow(RED_ZONE, STACK_PER_RECURSION, f)
}

#[inline]
#[cfg(target_arch = "wasm32")]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    f()
}
