//! Port for the legacy authentication hash.
//!
//! The server stores a digest of the user name and password for its legacy
//! challenge-response mechanism and computes the same digest itself. The
//! digest algorithm lives with the authentication code; command builders only
//! need to call it.

/// Deterministic digest of a user name and password.
///
/// Implementations must be pure: the same inputs always produce the same
/// digest, independent of any session or nonce.
#[cfg_attr(test, mockall::automock)]
pub trait AuthenticationHash: Send + Sync {
    /// Digest `password` for `user_name`, returning the encoded hash.
    fn hash(&self, user_name: &str, password: &[u8]) -> String;
}
