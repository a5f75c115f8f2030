//! Stack growth for the recursive parser and evaluator.
//!
//! Both walk the tree with native recursion. Wrapping each recursive step in
//! [`ensure_sufficient_stack`] moves the walk onto a freshly allocated segment
//! when the current one runs low, so depth is bounded by the explicit nesting
//! and call limits instead of the thread's stack size.

/// Grow when less than this much stack remains.
const RED_ZONE: usize = 100 * 1024;

/// Size of each newly allocated stack segment.
const STACK_PER_RECURSION: usize = 1024 * 1024;

#[inline]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    stacker::maybe_grow(RED_ZONE, STACK_PER_RECURSION, f)
}
