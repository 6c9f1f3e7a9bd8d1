//! snmpfs Error Hierarchy
//!
//! Defines error types for the device-polling filesystem core,
//! categorized by protocol layer and operational concerns.

use config::ConfigError;

#[doc(hidden)]
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Configuration file loading/deserialization failures
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Startup validation failures (fatal before any session is opened)
    #[error(transparent)]
    Setup(#[from] SetupError),

    /// SNMP request failures (transport and remote semantic errors)
    #[error(transparent)]
    Snmp(#[from] SnmpError),

    /// Discovery tree invariant violations
    #[error(transparent)]
    Tree(#[from] TreeError),

    /// Namespace node operation failures
    #[error(transparent)]
    Namespace(#[from] NamespaceError),

    /// Task scheduler lifecycle misuse
    #[error(transparent)]
    Scheduler(#[from] SchedulerError),

    /// Unrecoverable failures requiring process termination
    #[error("Fatal error: {0}")]
    Fatal(String),
}

/// Identifier text that does not parse as a dotted sequence of
/// non-negative integers.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("could not parse OID from {0:?}")]
pub struct MalformedOid(pub String);

impl From<MalformedOid> for Error {
    fn from(malformed: MalformedOid) -> Self {
        Error::Setup(SetupError::MalformedOid(malformed))
    }
}

/// Configuration errors are reported with enough context (device,
/// template, object name) to fix the file; all of them abort startup.
#[derive(Debug, thiserror::Error)]
pub enum SetupError {
    #[error(transparent)]
    MalformedOid(#[from] MalformedOid),

    #[error("scalar object '{object}' requires an OID ending with '.0', got {oid}")]
    ScalarWithoutInstance { object: String, oid: String },

    #[error("device with name '{0}' already exists")]
    DuplicateDevice(String),

    #[error("template with name '{0}' already exists")]
    DuplicateTemplate(String),

    #[error("template '{template}' referenced by device '{device}' was not found")]
    MissingTemplate { device: String, template: String },

    #[error("device '{device}' has duplicated object '{object}', check device and templates used")]
    DuplicateObject { device: String, object: String },

    #[error("template expansion for device '{0}' exceeded 32 nesting levels")]
    TemplateRecursion(String),

    #[error("could not open session for device '{device}': {reason}")]
    SessionOpen { device: String, reason: String },

    #[error("invalid setting: {0}")]
    InvalidSetting(String),
}

/// Request-level failures. Transport errors are counted and logged at the
/// device boundary; semantic errors feed back into object access flags.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SnmpError {
    /// No response from the device within the session timeout
    #[error("request timed out")]
    Timeout,

    /// Session-level failure (socket, encoding, session closed)
    #[error("transport failure: {0}")]
    Transport(String),

    /// Remote refused access to the object
    #[error("no access")]
    NoAccess,

    /// Remote rejected a SET on a read-only object
    #[error("not writable")]
    NotWritable,

    /// Remote rejected the encoded value
    #[error("bad value")]
    BadValue,

    /// SET named an object that cannot be created
    #[error("inconsistent name")]
    InconsistentName,

    /// Requested object does not exist on the device
    #[error("no such name")]
    NoSuchName,

    /// Any other error-status code from the device
    #[error("remote error status {0}")]
    General(i64),
}

impl SnmpError {
    /// Transport errors are retried via the next scheduled poll;
    /// semantic errors adjust access flags instead.
    pub fn is_transport(&self) -> bool {
        matches!(self, SnmpError::Timeout | SnmpError::Transport(_))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TreeError {
    /// An identifier was inserted below a node deeper than its own length
    #[error("identifier of length {len} inserted below depth {depth}")]
    OutOfOrderInsert { depth: usize, len: usize },
}

#[derive(Debug, thiserror::Error)]
pub enum NamespaceError {
    #[error("'{0}' is not a directory")]
    NotADirectory(String),

    #[error("'{0}' is not a file")]
    NotAFile(String),

    #[error("commit of '{0}' was rejected by the device")]
    CommitFailed(String),

    #[error("table layout mismatch: {0}")]
    TableLayout(String),
}

#[derive(Debug, thiserror::Error)]
pub enum SchedulerError {
    #[error("scheduler already running")]
    AlreadyRunning,

    #[error("scheduler not running")]
    NotRunning,
}
