//! Legacy user-management commands for the database driver.
//!
//! This crate builds the `createUser` / `updateUser` commands used by the
//! legacy user helpers and makes their failures look the same on the blocking
//! and callback paths.
//!
//! # Overview
//!
//! - [`build_user_command`] turns a [`Credential`] into a wire-ready
//!   [`CommandDocument`] carrying a pre-digested password and a single
//!   [`BuiltinRole`].
//! - [`translate_user_command_failure`] reports a command failure with the
//!   reserved write-concern code and an embedded write-concern error as a
//!   [`WriteConcernFailure`], and passes anything else through.
//! - [`user_command_callback`] applies the same rule to asynchronous
//!   completions.
//! - [`UserCommandOperation`] ties these together over a
//!   [`CommandTransport`] or [`AsyncCommandTransport`].
//!
//! The authentication hash and the transports are ports implemented by the
//! caller.
//!
//! # Example
//!
//! ```
//! use user_admin::{AuthenticationHash, Credential, UserCommandName, build_user_command};
//!
//! struct Digest;
//!
//! impl AuthenticationHash for Digest {
//!     fn hash(&self, user_name: &str, password: &[u8]) -> String {
//!         format!("{user_name}:{}", password.len())
//!     }
//! }
//!
//! let credential = Credential::native("alice", "sales", "s3cret");
//! let command = build_user_command(&credential, false, UserCommandName::CreateUser, &Digest)
//!     .expect("credential is complete");
//!
//! assert_eq!(
//!     serde_json::to_string(&command).expect("document serialises"),
//!     r#"{"createUser":"alice","pwd":"alice:6","digestPassword":false,"roles":["dbOwner"]}"#
//! );
//! ```

mod auth_hash;
mod callback;
mod command;
mod config;
mod credential;
mod error;
mod operation;
mod role;
mod translate;
mod write_concern;

pub use auth_hash::AuthenticationHash;
pub use callback::{SingleResultCallback, user_command_callback};
pub use command::{
    CommandDocument, DIGEST_PASSWORD_FIELD, PASSWORD_FIELD, ROLES_FIELD, UserCommandName,
    build_user_command,
};
pub use config::UserAdminSettings;
pub use credential::Credential;
pub use error::{
    CommandFailure, CredentialField, ServerAddress, UserCommandError, WRITE_CONCERN_FAILED_CODE,
};
pub use operation::{AsyncCommandTransport, CommandTransport, UserCommandOperation};
pub use role::{ADMIN_DATABASE, BuiltinRole};
pub use translate::{translate_user_command_failure, translate_user_command_result};
pub use write_concern::{
    WRITE_CONCERN_ERROR_FIELD, WriteConcernError, WriteConcernFailure,
    create_write_concern_failure, has_write_concern_error,
};
