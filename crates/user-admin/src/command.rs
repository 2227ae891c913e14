//! Builder for legacy `createUser` / `updateUser` command documents.

use std::fmt;

use serde::Serialize;
use serde_json::{Map, Value};
use tracing::debug;

use crate::auth_hash::AuthenticationHash;
use crate::credential::Credential;
use crate::error::UserCommandError;
use crate::role::BuiltinRole;

/// Field carrying the digested password.
pub const PASSWORD_FIELD: &str = "pwd";

/// Field telling the server whether to digest `pwd` itself.
pub const DIGEST_PASSWORD_FIELD: &str = "digestPassword";

/// Field listing the roles granted to the user.
pub const ROLES_FIELD: &str = "roles";

/// User-management commands built by [`build_user_command`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UserCommandName {
    /// Create a new user.
    CreateUser,
    /// Replace an existing user's password and roles.
    UpdateUser,
}

impl UserCommandName {
    /// Command name as sent on the wire.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::CreateUser => "createUser",
            Self::UpdateUser => "updateUser",
        }
    }
}

impl fmt::Display for UserCommandName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl AsRef<str> for UserCommandName {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

/// Wire-ready command document with a fixed field order.
///
/// The first field names the command; serialisation preserves insertion
/// order.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct CommandDocument(Map<String, Value>);

impl CommandDocument {
    /// Value stored under `field`.
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    /// Field names in wire order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// Number of fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the document has no fields.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Name of the command, i.e. the first field.
    #[must_use]
    pub fn command_name(&self) -> Option<&str> {
        self.keys().next()
    }

    /// Copy the document into a JSON object value.
    #[must_use]
    pub fn to_value(&self) -> Value {
        Value::Object(self.0.clone())
    }

    /// Consume the document, returning its ordered fields.
    #[must_use]
    pub fn into_inner(self) -> Map<String, Value> {
        self.0
    }
}

/// Build the command that creates or updates the user described by `credential`.
///
/// The password is sent pre-digested: `pwd` holds
/// `hasher.hash(user_name, password)` and `digestPassword` is `false` so the
/// server stores it as-is. The user receives the single role given by
/// [`BuiltinRole::for_source`]. `command_name` is not validated.
///
/// # Errors
///
/// Returns [`UserCommandError::MissingCredentialField`] when the credential
/// has no user name or no password; no document is produced.
///
/// # Examples
/// ```
/// use user_admin::{AuthenticationHash, Credential, UserCommandName, build_user_command};
///
/// struct Reversed;
///
/// impl AuthenticationHash for Reversed {
///     fn hash(&self, user_name: &str, _password: &[u8]) -> String {
///         user_name.chars().rev().collect()
///     }
/// }
///
/// let credential = Credential::native("alice", "admin", "s3cret");
/// let command = build_user_command(&credential, true, UserCommandName::CreateUser, &Reversed)
///     .expect("credential is complete");
///
/// let fields: Vec<_> = command.keys().collect();
/// assert_eq!(fields, ["createUser", "pwd", "digestPassword", "roles"]);
/// assert_eq!(command.get("pwd"), Some(&"ecila".into()));
/// ```
pub fn build_user_command<H>(
    credential: &Credential,
    read_only: bool,
    command_name: impl AsRef<str>,
    hasher: &H,
) -> Result<CommandDocument, UserCommandError>
where
    H: AuthenticationHash + ?Sized,
{
    let name = command_name.as_ref();
    let user_name = credential.user_name_non_null()?;
    let password = credential.password_non_null()?;
    let role = BuiltinRole::for_source(credential.source(), read_only);

    let mut document = Map::new();
    document.insert(name.to_owned(), Value::from(user_name));
    document.insert(
        PASSWORD_FIELD.to_owned(),
        Value::from(hasher.hash(user_name, password)),
    );
    document.insert(DIGEST_PASSWORD_FIELD.to_owned(), Value::Bool(false));
    document.insert(
        ROLES_FIELD.to_owned(),
        Value::Array(vec![Value::from(role.as_str())]),
    );

    debug!(
        command = name,
        database = credential.source(),
        %role,
        "built user command"
    );
    Ok(CommandDocument(document))
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use crate::auth_hash::MockAuthenticationHash;
    use crate::error::CredentialField;
    use mockall::predicate::eq;
    use rstest::{fixture, rstest};
    use serde_json::json;

    struct JoinHash;

    impl AuthenticationHash for JoinHash {
        fn hash(&self, user_name: &str, password: &[u8]) -> String {
            format!("{user_name}:{}", String::from_utf8_lossy(password))
        }
    }

    #[fixture]
    fn credential() -> Credential {
        Credential::native("alice", "inventory", "s3cret")
    }

    #[rstest]
    fn fields_are_written_in_wire_order(credential: Credential) {
        let command =
            build_user_command(&credential, false, UserCommandName::CreateUser, &JoinHash)
                .expect("credential is complete");

        assert_eq!(
            command.keys().collect::<Vec<_>>(),
            ["createUser", "pwd", "digestPassword", "roles"]
        );
        assert_eq!(command.command_name(), Some("createUser"));
        assert_eq!(command.get("createUser"), Some(&json!("alice")));
        assert_eq!(command.get(PASSWORD_FIELD), Some(&json!("alice:s3cret")));
        assert_eq!(command.get(DIGEST_PASSWORD_FIELD), Some(&json!(false)));
        assert_eq!(command.get(ROLES_FIELD), Some(&json!(["dbOwner"])));
        assert_eq!(
            serde_json::to_string(&command).expect("document serialises"),
            r#"{"createUser":"alice","pwd":"alice:s3cret","digestPassword":false,"roles":["dbOwner"]}"#
        );
    }

    #[rstest]
    #[case("admin", false, "root")]
    #[case("admin", true, "readAnyDatabase")]
    #[case("inventory", false, "dbOwner")]
    #[case("inventory", true, "read")]
    fn roles_hold_the_single_resolved_role(
        #[case] source: &str,
        #[case] read_only: bool,
        #[case] expected: &str,
    ) {
        let credential = Credential::native("alice", source, "s3cret");
        let command =
            build_user_command(&credential, read_only, UserCommandName::UpdateUser, &JoinHash)
                .expect("credential is complete");
        assert_eq!(command.get(ROLES_FIELD), Some(&json!([expected])));
        assert_eq!(command.command_name(), Some("updateUser"));
    }

    #[rstest]
    fn hash_receives_user_name_then_password(credential: Credential) {
        let mut hasher = MockAuthenticationHash::new();
        hasher
            .expect_hash()
            .with(eq("alice"), eq(&b"s3cret"[..]))
            .times(1)
            .return_const("digest".to_owned());

        let command = build_user_command(&credential, false, "createUser", &hasher)
            .expect("credential is complete");

        assert_eq!(command.get(PASSWORD_FIELD), Some(&json!("digest")));
    }

    #[rstest]
    #[case(Credential::new("admin").with_password("pw"), CredentialField::UserName)]
    #[case(Credential::new("admin").with_user_name("alice"), CredentialField::Password)]
    #[case(Credential::new("admin"), CredentialField::UserName)]
    fn incomplete_credentials_fail_before_hashing(
        #[case] credential: Credential,
        #[case] field: CredentialField,
    ) {
        let mut hasher = MockAuthenticationHash::new();
        hasher.expect_hash().never();

        let err = build_user_command(&credential, false, UserCommandName::CreateUser, &hasher)
            .expect_err("incomplete credential must fail");

        assert_eq!(err, UserCommandError::missing_credential_field(field));
    }

    #[rstest]
    fn repeated_builds_are_identical(credential: Credential) {
        let first = build_user_command(&credential, true, UserCommandName::CreateUser, &JoinHash)
            .expect("first build");
        let second = build_user_command(&credential, true, UserCommandName::CreateUser, &JoinHash)
            .expect("second build");

        assert_eq!(first, second);
        assert_eq!(
            first.keys().collect::<Vec<_>>(),
            second.keys().collect::<Vec<_>>()
        );
    }

    #[rstest]
    fn caller_supplied_names_are_not_validated(credential: Credential) {
        let command = build_user_command(&credential, false, "grantRolesToUser", &JoinHash)
            .expect("credential is complete");
        assert_eq!(command.command_name(), Some("grantRolesToUser"));
        assert_eq!(command.len(), 4);
    }
}
