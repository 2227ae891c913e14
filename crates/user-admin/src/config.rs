//! User administration settings loaded via OrthoConfig.

use ortho_config::OrthoConfig;
use serde::Deserialize;

/// Settings applied to user commands built from configuration.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "USER_ADMIN")]
pub struct UserAdminSettings {
    /// Grant read-only roles to created or updated users.
    #[ortho_config(default = false)]
    pub read_only: bool,
}
