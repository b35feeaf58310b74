//! Callback-style completion for person operations.
//!
//! Operations return `Result`; callers that want a completion callback
//! wrap them with [`complete`]. The callback is an `FnOnce`, so it runs
//! exactly once on every path, errors included.

use crate::repo::person_repo::RepoResult;

/// Runs `operation` and hands its result to `done`.
///
/// Outcomes are logged by the service layer, not here.
pub fn complete<T, Op, Done>(operation: Op, done: Done)
where
    Op: FnOnce() -> RepoResult<T>,
    Done: FnOnce(RepoResult<T>),
{
    done(operation());
}
