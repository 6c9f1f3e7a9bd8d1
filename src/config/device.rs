use serde::Deserialize;
use serde::Serialize;

use crate::MalformedOid;
use crate::Oid;
use crate::SetupError;

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum SnmpVersion {
    V1,
    #[default]
    V2c,
    V3,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum SecurityLevel {
    #[default]
    NoAuthNoPriv,
    AuthNoPriv,
    AuthPriv,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum AuthProtocol {
    Md5,
    Sha,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PrivProtocol {
    Aes,
    Des,
}

/// Authentication material, used both for outgoing requests and for
/// accepting incoming traps.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct AuthConfig {
    #[serde(default)]
    pub version: SnmpVersion,

    /// Community for v1/v2c, security name for v3
    #[serde(default = "default_community")]
    pub community: String,

    #[serde(default)]
    pub security: SecurityLevel,

    #[serde(default)]
    pub auth_protocol: Option<AuthProtocol>,
    #[serde(default)]
    pub auth_passphrase: Option<String>,

    #[serde(default)]
    pub priv_protocol: Option<PrivProtocol>,
    #[serde(default)]
    pub priv_passphrase: Option<String>,
}

impl Default for AuthConfig {
    fn default() -> Self {
        AuthConfig {
            version: SnmpVersion::default(),
            community: default_community(),
            security: SecurityLevel::default(),
            auth_protocol: None,
            auth_passphrase: None,
            priv_protocol: None,
            priv_passphrase: None,
        }
    }
}

/// How one configuration entry maps into the namespace.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    /// One leaf file bound to a single attribute
    #[default]
    Scalar,
    /// One leaf file rendering a whole table
    Table,
    /// A directory expanded from schema or discovery data
    Subtree,
    /// Placeholder replaced by a template's objects
    Reuse,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ColumnConfig {
    pub name: String,
    pub oid: String,
}

/// One desired object on a device. For `reuse` entries `name` carries the
/// template name and `oid` stays empty.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ObjectConfig {
    pub name: String,

    #[serde(default)]
    pub oid: String,

    #[serde(default)]
    pub kind: EntryKind,

    /// Polling interval in seconds; unset falls back to the device's
    #[serde(default)]
    pub interval: Option<u64>,

    /// Explicit column layout (tables only)
    #[serde(default)]
    pub columns: Vec<ColumnConfig>,

    /// Attach expanded children directly to the parent (subtrees only)
    #[serde(default)]
    pub placeholder: bool,

    /// Prefix expanded object names with the template name (reuse only)
    #[serde(default)]
    pub prefix: bool,
}

impl ObjectConfig {
    pub fn parsed_oid(&self) -> Result<Oid, MalformedOid> {
        self.oid.parse()
    }

    pub(crate) fn validate(&self, device: &str) -> Result<(), SetupError> {
        if self.kind == EntryKind::Reuse {
            return Ok(());
        }

        let id = self.parsed_oid()?;
        if self.kind == EntryKind::Scalar && (id.len() < 2 || id.back() != Some(0)) {
            return Err(SetupError::ScalarWithoutInstance {
                object: format!("{}/{}", device, self.name),
                oid: self.oid.clone(),
            });
        }

        for column in &self.columns {
            column.oid.parse::<Oid>()?;
        }

        Ok(())
    }
}

/// Immutable per-device configuration snapshot.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct DeviceConfig {
    /// Name in the filesystem
    pub name: String,

    /// Name or address of the peer, may include transport specifier
    /// and/or port number
    pub address: String,

    /// Default polling interval in seconds for objects without their own
    #[serde(default = "default_device_interval")]
    pub interval: u64,

    #[serde(default)]
    pub auth: AuthConfig,

    #[serde(default)]
    pub objects: Vec<ObjectConfig>,
}

impl DeviceConfig {
    pub(crate) fn validate(&self) -> Result<(), SetupError> {
        for object in &self.objects {
            object.validate(&self.name)?;
        }
        Ok(())
    }
}

fn default_community() -> String {
    "public".to_string()
}

fn default_device_interval() -> u64 {
    60
}
