//! Core WebHDFS protocol types.
//!
//! Holds the [`Operation`] names understood by the REST gateway, the
//! structured [`RemoteException`] decoded from error bodies, and the typed
//! JSON documents returned by metadata operations.
//!
//! Every JSON document the service returns is wrapped in a single top-level
//! key (`FileStatus`, `ContentSummary`, `boolean`, ...). The wrapper keys live
//! in [`crate::protocol::keys`]; the types here describe the inner value.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A WebHDFS operation, sent as the `op` query parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Create,
    Append,
    Open,
    Mkdirs,
    Rename,
    Delete,
    GetFileStatus,
    ListStatus,
    GetContentSummary,
    GetFileChecksum,
    GetHomeDirectory,
    SetPermission,
    SetOwner,
    SetReplication,
    SetTimes,
    CreateSymlink,
    Concat,
    Truncate,
    ModifyAclEntries,
    RemoveAclEntries,
    RemoveDefaultAcl,
    RemoveAcl,
    SetAcl,
    GetAclStatus,
    CreateSnapshot,
    DeleteSnapshot,
    RenameSnapshot,
    GetDelegationToken,
    GetDelegationTokens,
    RenewDelegationToken,
    CancelDelegationToken,
}

impl Operation {
    /// Wire name of the operation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::Create => "CREATE",
            Operation::Append => "APPEND",
            Operation::Open => "OPEN",
            Operation::Mkdirs => "MKDIRS",
            Operation::Rename => "RENAME",
            Operation::Delete => "DELETE",
            Operation::GetFileStatus => "GETFILESTATUS",
            Operation::ListStatus => "LISTSTATUS",
            Operation::GetContentSummary => "GETCONTENTSUMMARY",
            Operation::GetFileChecksum => "GETFILECHECKSUM",
            Operation::GetHomeDirectory => "GETHOMEDIRECTORY",
            Operation::SetPermission => "SETPERMISSION",
            Operation::SetOwner => "SETOWNER",
            Operation::SetReplication => "SETREPLICATION",
            Operation::SetTimes => "SETTIMES",
            Operation::CreateSymlink => "CREATESYMLINK",
            Operation::Concat => "CONCAT",
            Operation::Truncate => "TRUNCATE",
            Operation::ModifyAclEntries => "MODIFYACLENTRIES",
            Operation::RemoveAclEntries => "REMOVEACLENTRIES",
            Operation::RemoveDefaultAcl => "REMOVEDEFAULTACL",
            Operation::RemoveAcl => "REMOVEACL",
            Operation::SetAcl => "SETACL",
            Operation::GetAclStatus => "GETACLSTATUS",
            Operation::CreateSnapshot => "CREATESNAPSHOT",
            Operation::DeleteSnapshot => "DELETESNAPSHOT",
            Operation::RenameSnapshot => "RENAMESNAPSHOT",
            Operation::GetDelegationToken => "GETDELEGATIONTOKEN",
            Operation::GetDelegationTokens => "GETDELEGATIONTOKENS",
            Operation::RenewDelegationToken => "RENEWDELEGATIONTOKEN",
            Operation::CancelDelegationToken => "CANCELDELEGATIONTOKEN",
        }
    }

    /// HTTP method the REST gateway expects for this operation.
    pub fn method(&self) -> http::Method {
        use http::Method;
        match self {
            Operation::Open
            | Operation::GetFileStatus
            | Operation::ListStatus
            | Operation::GetContentSummary
            | Operation::GetFileChecksum
            | Operation::GetHomeDirectory
            | Operation::GetAclStatus
            | Operation::GetDelegationToken
            | Operation::GetDelegationTokens => Method::GET,
            Operation::Append | Operation::Concat | Operation::Truncate => Method::POST,
            Operation::Delete | Operation::DeleteSnapshot => Method::DELETE,
            _ => Method::PUT,
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Structured failure reported by the remote service.
///
/// Decoded from `{"RemoteException": {"message": ..., "exception": ..., "javaClassName": ...}}`.
/// When a body carries no recognizable envelope the classifier synthesizes one
/// with the message `"Unknown error"` (see [`crate::protocol::parse_remote_exception`]).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteException {
    /// Human-readable failure message.
    pub message: String,

    /// Short exception name, e.g. `FileNotFoundException`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exception: Option<String>,

    /// Fully qualified server-side class name.
    #[serde(
        default,
        rename = "javaClassName",
        skip_serializing_if = "Option::is_none"
    )]
    pub java_class_name: Option<String>,

    /// Raw response body the exception was decoded from.
    #[serde(skip)]
    pub raw: Option<String>,
}

impl RemoteException {
    /// Create an exception carrying only a message.
    pub fn new(message: impl Into<String>) -> Self {
        RemoteException {
            message: message.into(),
            exception: None,
            java_class_name: None,
            raw: None,
        }
    }

    /// Attach the raw body this exception was decoded from.
    pub fn with_raw(mut self, raw: impl Into<String>) -> Self {
        self.raw = Some(raw.into());
        self
    }
}

impl fmt::Display for RemoteException {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// Kind of a filesystem entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum FileType {
    File,
    Directory,
    Symlink,
}

/// Status of a single file or directory (`GETFILESTATUS`, `LISTSTATUS`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileStatus {
    pub access_time: u64,
    pub block_size: u64,
    #[serde(default)]
    pub children_num: Option<u64>,
    #[serde(default)]
    pub file_id: Option<u64>,
    pub group: String,
    pub length: u64,
    pub modification_time: u64,
    pub owner: String,
    /// Entry name relative to the listed directory; empty for `stat`.
    pub path_suffix: String,
    /// Octal permission string such as `"755"`.
    pub permission: String,
    pub replication: u32,
    #[serde(default)]
    pub storage_policy: Option<u32>,
    #[serde(default)]
    pub symlink: Option<String>,
    #[serde(rename = "type")]
    pub file_type: FileType,
}

impl FileStatus {
    pub fn is_file(&self) -> bool {
        self.file_type == FileType::File
    }

    pub fn is_directory(&self) -> bool {
        self.file_type == FileType::Directory
    }
}

/// Directory listing body (`{"FileStatuses": {"FileStatus": [...]}}`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileStatuses {
    #[serde(rename = "FileStatus", default)]
    pub file_status: Vec<FileStatus>,
}

/// Aggregate usage of a directory tree (`GETCONTENTSUMMARY`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentSummary {
    pub directory_count: u64,
    pub file_count: u64,
    pub length: u64,
    /// `-1` when no namespace quota is set.
    pub quota: i64,
    pub space_consumed: u64,
    /// `-1` when no space quota is set.
    pub space_quota: i64,
}

/// File checksum (`GETFILECHECKSUM`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileChecksum {
    pub algorithm: String,
    /// Hex encoded checksum bytes.
    pub bytes: String,
    pub length: u64,
}

/// ACL state of a path (`GETACLSTATUS`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AclStatus {
    /// Entries in `type:name:perm` form, e.g. `user:carla:rw-`.
    #[serde(default)]
    pub entries: Vec<String>,
    pub group: String,
    pub owner: String,
    #[serde(default)]
    pub permission: Option<String>,
    pub sticky_bit: bool,
}

/// Delegation token (`GETDELEGATIONTOKEN`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    #[serde(rename = "urlString")]
    pub url_string: String,
}

/// Token list body (`{"Tokens": {"token": [...]}}`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tokens {
    #[serde(default)]
    pub token: Vec<Token>,
}
