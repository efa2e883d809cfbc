#![forbid(unsafe_code)]

//! Failure modes of overlay meta resolution.

use std::fmt;

/// Local record construction was attempted with no live component
/// instance on the scope.
///
/// This is a usage error, not a runtime condition: the caller resolved a
/// meta outside component setup (or forgot to attach the instance to the
/// scope). Fix the call site rather than handling it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContextError;

impl fmt::Display for ContextError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "overlay meta must be resolved during component setup (no live instance on this scope)"
        )
    }
}

impl std::error::Error for ContextError {}
