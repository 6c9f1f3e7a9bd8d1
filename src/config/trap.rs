use serde::Deserialize;
use serde::Serialize;

use crate::AuthConfig;

/// Settings of the trap reception path. The listener itself lives in the
/// external transport; these settings drive authentication and dispatch.
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct TrapConfig {
    #[serde(default)]
    pub enabled: bool,

    #[serde(default = "default_trap_port")]
    pub port: u16,

    #[serde(default)]
    pub auth: AuthConfig,
}

fn default_trap_port() -> u16 {
    162
}
