//! Create/update-user operations over an injected command transport.
//!
//! Both operations run against the credential's source database. The blocking
//! path translates failures with [`translate_user_command_result`]; the
//! callback path wraps the caller's callback with [`user_command_callback`].
//! Serialisation, server selection and retries belong to the transport.

use std::fmt;
use std::sync::Arc;

use serde_json::Value;
use tracing::debug;

use crate::auth_hash::AuthenticationHash;
use crate::callback::{SingleResultCallback, user_command_callback};
use crate::command::{CommandDocument, UserCommandName, build_user_command};
use crate::config::UserAdminSettings;
use crate::credential::Credential;
use crate::error::UserCommandError;
use crate::translate::translate_user_command_result;

/// Blocking command transport.
#[cfg_attr(test, mockall::automock)]
pub trait CommandTransport: Send + Sync {
    /// Run `command` against `database`, returning the server reply.
    ///
    /// # Errors
    ///
    /// Returns [`UserCommandError::Command`] when the server rejects the
    /// command and [`UserCommandError::Transport`] for any other failure.
    fn run_command(
        &self,
        database: &str,
        command: &CommandDocument,
    ) -> Result<Value, UserCommandError>;
}

/// Callback-style command transport.
#[cfg_attr(test, mockall::automock)]
pub trait AsyncCommandTransport: Send + Sync {
    /// Start `command` against `database`; `callback` fires exactly once.
    fn run_command_async(
        &self,
        database: &str,
        command: CommandDocument,
        callback: SingleResultCallback<Value>,
    );
}

/// A `createUser` or `updateUser` operation for one credential.
#[derive(Clone)]
pub struct UserCommandOperation {
    command_name: UserCommandName,
    credential: Credential,
    read_only: bool,
    hasher: Arc<dyn AuthenticationHash>,
}

impl UserCommandOperation {
    /// Build an operation issuing `command_name`.
    pub fn new(
        command_name: UserCommandName,
        credential: Credential,
        read_only: bool,
        hasher: Arc<dyn AuthenticationHash>,
    ) -> Self {
        Self {
            command_name,
            credential,
            read_only,
            hasher,
        }
    }

    /// Build an operation taking its read-only flag from `settings`.
    pub fn from_settings(
        command_name: UserCommandName,
        credential: Credential,
        settings: &UserAdminSettings,
        hasher: Arc<dyn AuthenticationHash>,
    ) -> Self {
        Self::new(command_name, credential, settings.read_only, hasher)
    }

    /// Operation creating the user described by `credential`.
    pub fn create_user(
        credential: Credential,
        read_only: bool,
        hasher: Arc<dyn AuthenticationHash>,
    ) -> Self {
        Self::new(UserCommandName::CreateUser, credential, read_only, hasher)
    }

    /// Operation updating the user described by `credential`.
    pub fn update_user(
        credential: Credential,
        read_only: bool,
        hasher: Arc<dyn AuthenticationHash>,
    ) -> Self {
        Self::new(UserCommandName::UpdateUser, credential, read_only, hasher)
    }

    /// Command this operation issues.
    #[must_use]
    pub const fn command_name(&self) -> UserCommandName {
        self.command_name
    }

    /// Credential describing the user.
    #[must_use]
    pub const fn credential(&self) -> &Credential {
        &self.credential
    }

    /// Whether the user receives a read-only role.
    #[must_use]
    pub const fn read_only(&self) -> bool {
        self.read_only
    }

    /// Build the command document this operation sends.
    ///
    /// # Errors
    ///
    /// Returns [`UserCommandError::MissingCredentialField`] for an incomplete
    /// credential.
    pub fn command(&self) -> Result<CommandDocument, UserCommandError> {
        build_user_command(
            &self.credential,
            self.read_only,
            self.command_name,
            self.hasher.as_ref(),
        )
    }

    /// Run the operation on the caller's thread.
    ///
    /// # Errors
    ///
    /// Returns [`UserCommandError::MissingCredentialField`] before contacting
    /// the server, [`UserCommandError::WriteConcern`] when the user was written
    /// without the requested acknowledgment, or the transport's error as-is.
    pub fn execute<T>(&self, transport: &T) -> Result<(), UserCommandError>
    where
        T: CommandTransport + ?Sized,
    {
        let command = self.command()?;
        debug!(
            command = %self.command_name,
            database = self.credential.source(),
            "running user command"
        );
        translate_user_command_result(transport.run_command(self.credential.source(), &command))
            .map(|_| ())
    }

    /// Start the operation; `callback` fires exactly once with the outcome.
    ///
    /// A build failure is delivered through `callback` without contacting
    /// the transport.
    pub fn execute_async<T>(&self, transport: &T, callback: SingleResultCallback<()>)
    where
        T: AsyncCommandTransport + ?Sized,
    {
        match self.command() {
            Ok(command) => {
                debug!(
                    command = %self.command_name,
                    database = self.credential.source(),
                    "starting user command"
                );
                transport.run_command_async(
                    self.credential.source(),
                    command,
                    user_command_callback(callback),
                );
            }
            Err(err) => callback(Err(err)),
        }
    }
}

impl fmt::Debug for UserCommandOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UserCommandOperation")
            .field("command_name", &self.command_name)
            .field("credential", &self.credential)
            .field("read_only", &self.read_only)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use crate::error::{CommandFailure, CredentialField, ServerAddress};
    use mockall::predicate::{always, eq};
    use rstest::{fixture, rstest};
    use serde_json::json;
    use std::sync::mpsc;

    struct UpperHash;

    impl AuthenticationHash for UpperHash {
        fn hash(&self, user_name: &str, _password: &[u8]) -> String {
            user_name.to_uppercase()
        }
    }

    #[fixture]
    fn operation() -> UserCommandOperation {
        UserCommandOperation::create_user(
            Credential::native("carol", "admin", "pw"),
            false,
            Arc::new(UpperHash),
        )
    }

    fn command_failure(reply: &Value) -> UserCommandError {
        UserCommandError::command(CommandFailure::from_response(
            reply.as_object().cloned().expect("reply must be an object"),
            ServerAddress::new("primary.example.net", 27017),
        ))
    }

    fn write_concern_reply(code: i32) -> Value {
        json!({
            "ok": 0,
            "code": code,
            "errmsg": "write concern failed",
            "writeConcernError": { "code": 64, "errmsg": "timed out" }
        })
    }

    fn channel_callback() -> (
        SingleResultCallback<()>,
        mpsc::Receiver<Result<(), UserCommandError>>,
    ) {
        let (tx, rx) = mpsc::channel();
        let callback: SingleResultCallback<()> =
            Box::new(move |outcome: Result<(), UserCommandError>| {
                tx.send(outcome).expect("receiver alive");
            });
        (callback, rx)
    }

    #[rstest]
    fn execute_sends_the_built_command_to_the_source_database(operation: UserCommandOperation) {
        let expected = operation.command().expect("command builds");
        let mut transport = MockCommandTransport::new();
        transport
            .expect_run_command()
            .with(eq("admin"), eq(expected))
            .times(1)
            .returning(|_, _| Ok(json!({ "ok": 1 })));

        assert_eq!(operation.execute(&transport), Ok(()));
    }

    #[rstest]
    #[case(100, true)]
    #[case(11000, false)]
    fn execute_translates_command_failures(
        #[case] code: i32,
        #[case] reclassified: bool,
        operation: UserCommandOperation,
    ) {
        let mut transport = MockCommandTransport::new();
        transport
            .expect_run_command()
            .times(1)
            .returning(move |_, _| Err(command_failure(&write_concern_reply(code))));

        let err = operation.execute(&transport).expect_err("command fails");

        assert_eq!(matches!(err, UserCommandError::WriteConcern(_)), reclassified);
        assert_eq!(matches!(err, UserCommandError::Command(_)), !reclassified);
    }

    #[rstest]
    fn execute_passes_transport_errors_through(operation: UserCommandOperation) {
        let mut transport = MockCommandTransport::new();
        transport
            .expect_run_command()
            .returning(|_, _| Err(UserCommandError::transport("connection refused")));

        assert_eq!(
            operation.execute(&transport),
            Err(UserCommandError::transport("connection refused"))
        );
    }

    #[rstest]
    fn execute_rejects_incomplete_credentials_without_contacting_the_server() {
        let operation = UserCommandOperation::update_user(
            Credential::new("reporting").with_user_name("dave"),
            true,
            Arc::new(UpperHash),
        );
        let mut transport = MockCommandTransport::new();
        transport.expect_run_command().never();

        assert_eq!(
            operation.execute(&transport),
            Err(UserCommandError::missing_credential_field(
                CredentialField::Password
            ))
        );
    }

    #[rstest]
    #[case(100)]
    #[case(11000)]
    fn execute_async_reclassifies_embedded_write_concern_errors(
        #[case] code: i32,
        operation: UserCommandOperation,
    ) {
        let mut transport = MockAsyncCommandTransport::new();
        transport
            .expect_run_command_async()
            .with(eq("admin"), always(), always())
            .times(1)
            .returning(move |_, _, callback| {
                callback(Err(command_failure(&write_concern_reply(code))));
            });
        let (callback, rx) = channel_callback();

        operation.execute_async(&transport, callback);

        let outcome = rx.recv().expect("callback fired");
        assert!(matches!(outcome, Err(UserCommandError::WriteConcern(_))));
        assert!(rx.try_recv().is_err(), "callback must fire exactly once");
    }

    #[rstest]
    fn execute_async_reports_success_as_unit(operation: UserCommandOperation) {
        let mut transport = MockAsyncCommandTransport::new();
        transport
            .expect_run_command_async()
            .times(1)
            .returning(|_, command, callback| {
                assert_eq!(command.command_name(), Some("createUser"));
                callback(Ok(json!({ "ok": 1 })));
            });
        let (callback, rx) = channel_callback();

        operation.execute_async(&transport, callback);

        assert_eq!(rx.recv().expect("callback fired"), Ok(()));
    }

    #[rstest]
    fn execute_async_delivers_build_failures_through_the_callback() {
        let operation = UserCommandOperation::create_user(
            Credential::new("admin"),
            false,
            Arc::new(UpperHash),
        );
        let mut transport = MockAsyncCommandTransport::new();
        transport.expect_run_command_async().never();
        let (callback, rx) = channel_callback();

        operation.execute_async(&transport, callback);

        assert_eq!(
            rx.recv().expect("callback fired"),
            Err(UserCommandError::missing_credential_field(
                CredentialField::UserName
            ))
        );
    }

    #[rstest]
    fn settings_choose_the_read_only_role() {
        let settings = UserAdminSettings { read_only: true };
        let operation = UserCommandOperation::from_settings(
            UserCommandName::CreateUser,
            Credential::native("erin", "admin", "pw"),
            &settings,
            Arc::new(UpperHash),
        );

        let command = operation.command().expect("command builds");

        assert!(operation.read_only());
        assert_eq!(command.get("roles"), Some(&json!(["readAnyDatabase"])));
    }
}
