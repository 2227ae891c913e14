//! Error taxonomy for user-management commands.
//!
//! Every failure a caller can observe from this crate is a
//! [`UserCommandError`]. The transport boundary produces the `Command` and
//! `Transport` variants; this crate only ever reclassifies a `Command` failure
//! into a `WriteConcern` failure or reports a missing credential field.

use std::fmt;

use serde_json::{Map, Value};
use thiserror::Error;

use crate::write_concern::WriteConcernFailure;

/// Reserved server error code for "write concern failed at replica-set level".
pub const WRITE_CONCERN_FAILED_CODE: i32 = 100;

/// Code reported when a reply carries no usable numeric `code` field.
const UNKNOWN_ERROR_CODE: i32 = -1;

/// Network location of the server that produced a reply.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ServerAddress {
    host: String,
    port: u16,
}

impl ServerAddress {
    /// Port used when none is configured.
    pub const DEFAULT_PORT: u16 = 27017;

    /// Host used when none is configured.
    pub const DEFAULT_HOST: &'static str = "127.0.0.1";

    /// Build an address from a host name and port.
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }

    /// Host name or IP literal.
    #[must_use]
    pub fn host(&self) -> &str {
        self.host.as_str()
    }

    /// TCP port.
    #[must_use]
    pub const fn port(&self) -> u16 {
        self.port
    }
}

impl Default for ServerAddress {
    fn default() -> Self {
        Self::new(Self::DEFAULT_HOST, Self::DEFAULT_PORT)
    }
}

impl fmt::Display for ServerAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

/// Credential field that must be present before a user command is built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CredentialField {
    /// The principal the credential authenticates as.
    UserName,
    /// The secret paired with the principal.
    Password,
}

impl fmt::Display for CredentialField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UserName => f.write_str("user name"),
            Self::Password => f.write_str("password"),
        }
    }
}

/// A command the server rejected, together with its raw reply.
///
/// ## Invariants
/// - `code`, `code_name` and `message` are read from the reply's `code`,
///   `codeName` and `errmsg` fields; the reply itself is kept verbatim so
///   embedded sub-documents remain inspectable.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("command failed with error {code} ({code_name}): '{message}' on server {server_address}")]
pub struct CommandFailure {
    code: i32,
    code_name: String,
    message: String,
    response: Map<String, Value>,
    server_address: ServerAddress,
}

impl CommandFailure {
    /// Build a failure from the raw reply returned by `server_address`.
    ///
    /// # Examples
    /// ```
    /// use serde_json::json;
    /// use user_admin::{CommandFailure, ServerAddress};
    ///
    /// let reply = json!({ "ok": 0, "code": 11000, "codeName": "DuplicateKey", "errmsg": "dup" });
    /// let failure = CommandFailure::from_response(
    ///     reply.as_object().cloned().unwrap_or_default(),
    ///     ServerAddress::default(),
    /// );
    /// assert_eq!(failure.code(), 11000);
    /// assert_eq!(failure.code_name(), "DuplicateKey");
    /// ```
    pub fn from_response(response: Map<String, Value>, server_address: ServerAddress) -> Self {
        let code = response
            .get("code")
            .and_then(error_code)
            .unwrap_or(UNKNOWN_ERROR_CODE);
        let code_name = string_field(&response, "codeName");
        let message = string_field(&response, "errmsg");
        Self {
            code,
            code_name,
            message,
            response,
            server_address,
        }
    }

    /// Numeric server error code.
    #[must_use]
    pub const fn code(&self) -> i32 {
        self.code
    }

    /// Symbolic server error name, empty when the reply omits it.
    #[must_use]
    pub fn code_name(&self) -> &str {
        self.code_name.as_str()
    }

    /// Server-supplied error message.
    #[must_use]
    pub fn message(&self) -> &str {
        self.message.as_str()
    }

    /// Raw reply document.
    #[must_use]
    pub const fn response(&self) -> &Map<String, Value> {
        &self.response
    }

    /// Server that produced the reply.
    #[must_use]
    pub const fn server_address(&self) -> &ServerAddress {
        &self.server_address
    }
}

/// Read a server error code encoded as any JSON number.
///
/// Servers send codes as int32, int64 or double; doubles lose their fraction.
/// Values outside the `i32` range yield `None`.
pub(crate) fn error_code(value: &Value) -> Option<i32> {
    match value.as_i64() {
        Some(integer) => i32::try_from(integer).ok(),
        None => value.as_f64().and_then(code_from_double),
    }
}

#[expect(
    clippy::cast_possible_truncation,
    reason = "the value is truncated and range-checked before the cast"
)]
fn code_from_double(raw: f64) -> Option<i32> {
    let whole = raw.trunc();
    (f64::from(i32::MIN)..=f64::from(i32::MAX))
        .contains(&whole)
        .then_some(whole as i32)
}

fn string_field(response: &Map<String, Value>, key: &str) -> String {
    response
        .get(key)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_owned()
}

/// Errors surfaced by user-management commands on both execution paths.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum UserCommandError {
    /// The credential lacks a field required to build the command.
    ///
    /// This is a caller configuration bug; retrying without fixing the
    /// credential cannot succeed.
    #[error("{field} can not be null")]
    MissingCredentialField {
        /// The absent field.
        field: CredentialField,
    },
    /// The server rejected the command; passed through unchanged.
    #[error(transparent)]
    Command(Box<CommandFailure>),
    /// The user was written but the requested acknowledgment was not met.
    #[error(transparent)]
    WriteConcern(Box<WriteConcernFailure>),
    /// Any other transport-level failure; passed through unchanged.
    #[error("command transport failed: {message}")]
    Transport {
        /// Transport-supplied description.
        message: String,
    },
}

impl UserCommandError {
    /// Convenience constructor for [`UserCommandError::MissingCredentialField`].
    #[must_use]
    pub const fn missing_credential_field(field: CredentialField) -> Self {
        Self::MissingCredentialField { field }
    }

    /// Convenience constructor for [`UserCommandError::Command`].
    #[must_use]
    pub fn command(failure: CommandFailure) -> Self {
        Self::Command(Box::new(failure))
    }

    /// Convenience constructor for [`UserCommandError::Transport`].
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }

    /// Whether retrying the same command could succeed.
    ///
    /// Always `false`: missing fields need a corrected credential, and command,
    /// write-concern and transport failures are reported after any retries the
    /// transport performs.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        match self {
            Self::MissingCredentialField { .. }
            | Self::Command(_)
            | Self::WriteConcern(_)
            | Self::Transport { .. } => false,
        }
    }

    /// Server address attached to the failure, when one is known.
    #[must_use]
    pub fn server_address(&self) -> Option<&ServerAddress> {
        match self {
            Self::Command(failure) => Some(failure.server_address()),
            Self::WriteConcern(failure) => Some(failure.server_address()),
            Self::MissingCredentialField { .. } | Self::Transport { .. } => None,
        }
    }
}
