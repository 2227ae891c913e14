//! Detection and extraction of write-concern errors embedded in replies.
//!
//! A server that applied a write but could not satisfy the requested
//! acknowledgment reports it through a `writeConcernError` sub-document in
//! the reply. These helpers read that sub-document; they never look at the
//! reply's `ok` or `code` fields.

use serde::{Deserialize, Deserializer, de};
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::warn;

use crate::error::{ServerAddress, error_code};

/// Reply field holding the embedded write-concern error.
pub const WRITE_CONCERN_ERROR_FIELD: &str = "writeConcernError";

const ERROR_LABELS_FIELD: &str = "errorLabels";

/// Structured detail of an embedded write-concern error.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct WriteConcernError {
    #[serde(deserialize_with = "deserialize_code")]
    code: i32,
    #[serde(rename = "codeName", default)]
    code_name: String,
    #[serde(rename = "errmsg")]
    message: String,
    #[serde(rename = "errInfo", default)]
    details: Map<String, Value>,
}

fn deserialize_code<'de, D>(deserializer: D) -> Result<i32, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Value::deserialize(deserializer)?;
    error_code(&raw).ok_or_else(|| {
        de::Error::invalid_value(de::Unexpected::Other("non-numeric code"), &"a 32-bit code")
    })
}

impl WriteConcernError {
    /// Numeric server error code.
    #[must_use]
    pub const fn code(&self) -> i32 {
        self.code
    }

    /// Symbolic server error name, empty when the server omits it.
    #[must_use]
    pub fn code_name(&self) -> &str {
        self.code_name.as_str()
    }

    /// Server-supplied error message.
    #[must_use]
    pub fn message(&self) -> &str {
        self.message.as_str()
    }

    /// Additional error information (`errInfo`), empty when absent.
    #[must_use]
    pub const fn details(&self) -> &Map<String, Value> {
        &self.details
    }
}

/// A write whose data effect succeeded but whose acknowledgment failed.
#[derive(Debug, Clone, PartialEq, Error)]
#[error(
    "write concern error {} ({}): '{}' on server {server_address}",
    .error.code,
    .error.code_name,
    .error.message
)]
pub struct WriteConcernFailure {
    error: WriteConcernError,
    server_address: ServerAddress,
    error_labels: Vec<String>,
}

impl WriteConcernFailure {
    /// Embedded error detail.
    #[must_use]
    pub const fn error(&self) -> &WriteConcernError {
        &self.error
    }

    /// Server that reported the failure.
    #[must_use]
    pub const fn server_address(&self) -> &ServerAddress {
        &self.server_address
    }

    /// Error labels copied from the reply.
    #[must_use]
    pub fn error_labels(&self) -> &[String] {
        self.error_labels.as_slice()
    }

    /// Whether the reply carried `label`.
    #[must_use]
    pub fn has_error_label(&self, label: &str) -> bool {
        self.error_labels.iter().any(|candidate| candidate == label)
    }
}

/// Report whether `response` embeds a well-formed write-concern error.
///
/// # Examples
/// ```
/// use serde_json::json;
/// use user_admin::has_write_concern_error;
///
/// let reply = json!({ "ok": 1, "writeConcernError": { "code": 64, "errmsg": "timed out" } });
/// let reply = reply.as_object().expect("reply is a document");
/// assert!(has_write_concern_error(reply));
/// ```
#[must_use]
pub fn has_write_concern_error(response: &Map<String, Value>) -> bool {
    embedded_write_concern_error(response).is_some()
}

/// Build the failure described by the write-concern error in `response`.
///
/// Returns `None` when the reply embeds no write-concern error.
#[must_use]
pub fn create_write_concern_failure(
    response: &Map<String, Value>,
    server_address: &ServerAddress,
) -> Option<WriteConcernFailure> {
    let error = embedded_write_concern_error(response)?;
    Some(WriteConcernFailure {
        error,
        server_address: server_address.clone(),
        error_labels: error_labels(response),
    })
}

fn embedded_write_concern_error(response: &Map<String, Value>) -> Option<WriteConcernError> {
    let raw = response.get(WRITE_CONCERN_ERROR_FIELD)?;
    match WriteConcernError::deserialize(raw) {
        Ok(error) => Some(error),
        Err(err) => {
            warn!(error = %err, "ignoring malformed write concern error in command reply");
            None
        }
    }
}

fn error_labels(response: &Map<String, Value>) -> Vec<String> {
    response
        .get(ERROR_LABELS_FIELD)
        .and_then(Value::as_array)
        .map(|labels| {
            labels
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_owned)
                .collect()
        })
        .unwrap_or_default()
}
