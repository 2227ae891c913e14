//! Completion adapter for the callback-style asynchronous path.
//!
//! The transport invokes a [`SingleResultCallback`] exactly once when a
//! command completes. [`user_command_callback`] wraps the caller's callback so
//! that it observes the same failures the blocking path reports.

use crate::error::UserCommandError;
use crate::translate::reclassify_embedded_write_concern;

/// Callback invoked once with the outcome of an asynchronous operation.
pub type SingleResultCallback<T> = Box<dyn FnOnce(Result<T, UserCommandError>) + Send>;

/// Wrap `wrapped` so it receives user-command outcomes.
///
/// - A command failure whose reply embeds a write-concern error is delivered
///   as [`UserCommandError::WriteConcern`], whatever its top-level code.
/// - Every other error is delivered unchanged.
/// - Success is delivered as `Ok(())`; the transport payload is dropped.
///
/// # Examples
/// ```
/// use std::sync::mpsc;
///
/// use serde_json::json;
/// use user_admin::{SingleResultCallback, UserCommandError, user_command_callback};
///
/// let (tx, rx) = mpsc::channel();
/// let callback: SingleResultCallback<serde_json::Value> =
///     user_command_callback(move |outcome: Result<(), UserCommandError>| {
///         tx.send(outcome).expect("receiver alive");
///     });
///
/// callback(Ok(json!({ "ok": 1 })));
/// assert_eq!(rx.recv().expect("callback fired"), Ok(()));
/// ```
pub fn user_command_callback<T, F>(wrapped: F) -> SingleResultCallback<T>
where
    T: 'static,
    F: FnOnce(Result<(), UserCommandError>) + Send + 'static,
{
    Box::new(move |result: Result<T, UserCommandError>| {
        let outcome = match result {
            Ok(_) => Ok(()),
            Err(UserCommandError::Command(failure)) => {
                Err(reclassify_embedded_write_concern(failure))
            }
            Err(other) => Err(other),
        };
        wrapped(outcome);
    })
}
