//! Built-in role granted to users created through the legacy helpers.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Database whose users receive cluster-wide roles.
pub const ADMIN_DATABASE: &str = "admin";

/// The single role assigned to a legacy user.
///
/// Users scoped to [`ADMIN_DATABASE`] receive a cluster-wide role and all
/// others a database-wide one. The read-only flag picks the reading variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum BuiltinRole {
    /// Full cluster administration.
    Root,
    /// Read access to every database.
    ReadAnyDatabase,
    /// Full ownership of one database.
    DbOwner,
    /// Read access to one database.
    Read,
}

impl BuiltinRole {
    /// Resolve the role for a user scoped to `source`.
    ///
    /// # Examples
    /// ```
    /// use user_admin::BuiltinRole;
    ///
    /// assert_eq!(BuiltinRole::for_source("admin", false), BuiltinRole::Root);
    /// assert_eq!(BuiltinRole::for_source("sales", true), BuiltinRole::Read);
    /// ```
    #[must_use]
    pub fn for_source(source: &str, read_only: bool) -> Self {
        match (source == ADMIN_DATABASE, read_only) {
            (true, false) => Self::Root,
            (true, true) => Self::ReadAnyDatabase,
            (false, false) => Self::DbOwner,
            (false, true) => Self::Read,
        }
    }

    /// Role name as sent on the wire.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Root => "root",
            Self::ReadAnyDatabase => "readAnyDatabase",
            Self::DbOwner => "dbOwner",
            Self::Read => "read",
        }
    }
}

impl fmt::Display for BuiltinRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
