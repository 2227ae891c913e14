//! Credentials consumed when building user-management commands.
//!
//! The credential is owned by the caller; builders only read it. Either the
//! user name or the password may be absent (for example a credential meant
//! for a mechanism that does not need one), so both are optional here and
//! checked when a command is built.

use std::fmt;

use zeroize::Zeroizing;

use crate::error::{CredentialField, UserCommandError};

/// A principal, its secret, and the database the principal is scoped to.
///
/// ## Invariants
/// - The password bytes are wiped from memory when the credential drops.
/// - `Debug` output never includes the password.
///
/// # Examples
/// ```
/// use user_admin::Credential;
///
/// let credential = Credential::native("alice", "admin", "s3cret");
/// assert_eq!(credential.user_name(), Some("alice"));
/// assert_eq!(credential.source(), "admin");
/// assert_eq!(credential.password(), Some(&b"s3cret"[..]));
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct Credential {
    user_name: Option<String>,
    password: Option<Zeroizing<Vec<u8>>>,
    source: String,
}

impl Credential {
    /// Create a credential scoped to `source` with neither user name nor password.
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            user_name: None,
            password: None,
            source: source.into(),
        }
    }

    /// Create a user name/password credential for the legacy mechanism.
    pub fn native(
        user_name: impl Into<String>,
        source: impl Into<String>,
        password: impl Into<Vec<u8>>,
    ) -> Self {
        Self::new(source)
            .with_user_name(user_name)
            .with_password(password)
    }

    /// Set the principal name.
    #[must_use]
    pub fn with_user_name(mut self, user_name: impl Into<String>) -> Self {
        self.user_name = Some(user_name.into());
        self
    }

    /// Set the secret.
    #[must_use]
    pub fn with_password(mut self, password: impl Into<Vec<u8>>) -> Self {
        self.password = Some(Zeroizing::new(password.into()));
        self
    }

    /// Principal name, if present.
    #[must_use]
    pub fn user_name(&self) -> Option<&str> {
        self.user_name.as_deref()
    }

    /// Secret bytes, if present.
    #[must_use]
    pub fn password(&self) -> Option<&[u8]> {
        self.password.as_deref().map(Vec::as_slice)
    }

    /// Database the principal is scoped to.
    #[must_use]
    pub fn source(&self) -> &str {
        self.source.as_str()
    }

    /// Principal name, failing when it is absent.
    ///
    /// # Errors
    ///
    /// Returns [`UserCommandError::MissingCredentialField`] naming
    /// [`CredentialField::UserName`].
    pub fn user_name_non_null(&self) -> Result<&str, UserCommandError> {
        self.user_name()
            .ok_or_else(|| UserCommandError::missing_credential_field(CredentialField::UserName))
    }

    /// Secret bytes, failing when they are absent.
    ///
    /// # Errors
    ///
    /// Returns [`UserCommandError::MissingCredentialField`] naming
    /// [`CredentialField::Password`].
    pub fn password_non_null(&self) -> Result<&[u8], UserCommandError> {
        self.password()
            .ok_or_else(|| UserCommandError::missing_credential_field(CredentialField::Password))
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("user_name", &self.user_name)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("source", &self.source)
            .finish()
    }
}
