//! Reclassification of failed user commands on the blocking path.

use tracing::debug;

use crate::error::{CommandFailure, UserCommandError, WRITE_CONCERN_FAILED_CODE};
use crate::write_concern::create_write_concern_failure;

/// Translate a failed user command into the error reported to the caller.
///
/// A failure carrying [`WRITE_CONCERN_FAILED_CODE`] whose reply embeds a
/// write-concern error becomes [`UserCommandError::WriteConcern`]: the user
/// was written, only the acknowledgment failed. Any other failure is returned
/// as [`UserCommandError::Command`] holding the same allocation it arrived in.
///
/// # Examples
/// ```
/// use serde_json::json;
/// use user_admin::{
///     CommandFailure, ServerAddress, UserCommandError, translate_user_command_failure,
/// };
///
/// let reply = json!({
///     "ok": 0,
///     "code": 100,
///     "errmsg": "write concern failed",
///     "writeConcernError": { "code": 64, "errmsg": "timed out" }
/// });
/// let failure = CommandFailure::from_response(
///     reply.as_object().cloned().expect("reply is a document"),
///     ServerAddress::default(),
/// );
///
/// let err = translate_user_command_failure(Box::new(failure));
/// assert!(matches!(err, UserCommandError::WriteConcern(_)));
/// ```
#[must_use]
pub fn translate_user_command_failure(failure: Box<CommandFailure>) -> UserCommandError {
    if failure.code() == WRITE_CONCERN_FAILED_CODE {
        reclassify_embedded_write_concern(failure)
    } else {
        UserCommandError::Command(failure)
    }
}

/// Apply [`translate_user_command_failure`] to the error of a blocking call.
///
/// Successful results and non-command errors pass through unchanged.
///
/// # Errors
///
/// Returns the translated error when `result` is an error.
pub fn translate_user_command_result<T>(
    result: Result<T, UserCommandError>,
) -> Result<T, UserCommandError> {
    result.map_err(|err| match err {
        UserCommandError::Command(failure) => translate_user_command_failure(failure),
        other => other,
    })
}

/// Turn `failure` into a write-concern failure when its reply embeds one.
pub(crate) fn reclassify_embedded_write_concern(
    failure: Box<CommandFailure>,
) -> UserCommandError {
    match create_write_concern_failure(failure.response(), failure.server_address()) {
        Some(write_concern) => {
            debug!(
                code = failure.code(),
                write_concern_code = write_concern.error().code(),
                server = %failure.server_address(),
                "reporting user command failure as write concern failure"
            );
            UserCommandError::WriteConcern(Box::new(write_concern))
        }
        None => UserCommandError::Command(failure),
    }
}
