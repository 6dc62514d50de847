//! Metadata operations.
//!
//! Each method maps to one WebHDFS operation: one HTTP verb, one `op` name and
//! a parameter set, dispatched through [`WebHdfsClient::dispatch`]. Results
//! are projected out of the documented top-level JSON key.
//!
//! | Method | Operation | Result key |
//! |--------|-----------|------------|
//! | [`stat`](WebHdfsClient::stat) | `GETFILESTATUS` | `FileStatus` |
//! | [`readdir`](WebHdfsClient::readdir) | `LISTSTATUS` | `FileStatuses` |
//! | [`mkdir`](WebHdfsClient::mkdir) | `MKDIRS` | `boolean` |
//! | [`rename`](WebHdfsClient::rename) | `RENAME` | `boolean` |
//! | [`unlink`](WebHdfsClient::unlink) | `DELETE` | `boolean` |
//! | [`content_summary`](WebHdfsClient::content_summary) | `GETCONTENTSUMMARY` | `ContentSummary` |
//! | [`checksum`](WebHdfsClient::checksum) | `GETFILECHECKSUM` | `FileChecksum` |
//! | [`acl_status`](WebHdfsClient::acl_status) | `GETACLSTATUS` | `AclStatus` |
//! | [`create_snapshot`](WebHdfsClient::create_snapshot) | `CREATESNAPSHOT` | `Path` |
//! | [`get_delegation_token`](WebHdfsClient::get_delegation_token) | `GETDELEGATIONTOKEN` | `Token` |
//!
//! Operations without a documented result key return `()`.

use crate::client::fetch::{Params, WebHdfsClient};
use crate::client::utils::{validate_permission, ConcatSources};
use crate::error::{Result, WebHdfsError};
use crate::protocol::constants::params;
use crate::protocol::keys;
use crate::types::{AclStatus, ContentSummary, FileChecksum, FileStatus, FileStatuses, Operation, Token, Tokens};

fn param(key: &str, value: impl ToString) -> (String, String) {
    (key.to_string(), value.to_string())
}

fn require(name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(WebHdfsError::validation(format!("{} must be a non-empty string", name)));
    }
    Ok(())
}

impl WebHdfsClient {
    async fn dispatch_unit(&self, op: Operation, path: &str, params: Params) -> Result<()> {
        self.dispatch(op, path, params).await.map(|_| ())
    }

    /// Change permissions of `path`; `mode` is octal, e.g. `"755"`.
    pub async fn chmod(&self, path: &str, mode: &str) -> Result<()> {
        validate_permission(mode)?;
        self.dispatch_unit(Operation::SetPermission, path, vec![param(params::PERMISSION, mode)])
            .await
    }

    /// Change owner and group of `path`.
    pub async fn chown(&self, path: &str, owner: &str, group: &str) -> Result<()> {
        let mut query = Vec::new();
        if !owner.is_empty() {
            query.push(param(params::OWNER, owner));
        }
        if !group.is_empty() {
            query.push(param(params::GROUP, group));
        }
        if query.is_empty() {
            return Err(WebHdfsError::validation("chown requires an owner or a group"));
        }
        self.dispatch_unit(Operation::SetOwner, path, query).await
    }

    /// List the directory at `path`.
    pub async fn readdir(&self, path: &str) -> Result<Vec<FileStatus>> {
        let statuses: FileStatuses = self
            .dispatch_as(Operation::ListStatus, path, Vec::new(), keys::FILE_STATUSES)
            .await?;
        Ok(statuses.file_status)
    }

    /// Create `path` and any missing parents. `mode` defaults to the
    /// configured permission.
    pub async fn mkdir(&self, path: &str, mode: Option<&str>) -> Result<bool> {
        let mode = mode.unwrap_or(&self.config().default_permission);
        validate_permission(mode)?;
        self.dispatch_as(Operation::Mkdirs, path, vec![param(params::PERMISSION, mode)], keys::BOOLEAN)
            .await
    }

    /// Rename `path` to `destination`.
    pub async fn rename(&self, path: &str, destination: &str) -> Result<bool> {
        require("destination", destination)?;
        self.dispatch_as(
            Operation::Rename,
            path,
            vec![param(params::DESTINATION, destination)],
            keys::BOOLEAN,
        )
        .await
    }

    /// Status of a single file or directory.
    pub async fn stat(&self, path: &str) -> Result<FileStatus> {
        self.dispatch_as(Operation::GetFileStatus, path, Vec::new(), keys::FILE_STATUS)
            .await
    }

    /// Whether `path` exists.
    ///
    /// Never fails: any error, including a malformed status, reads as `false`.
    pub async fn exists(&self, path: &str) -> bool {
        match self.stat(path).await {
            Ok(_) => true,
            Err(e) => {
                tracing::debug!(path, error = %e, "exists check resolved to false");
                false
            }
        }
    }

    /// Delete `path`; directories need `recursive` unless empty.
    pub async fn unlink(&self, path: &str, recursive: bool) -> Result<bool> {
        self.dispatch_as(
            Operation::Delete,
            path,
            vec![param(params::RECURSIVE, recursive)],
            keys::BOOLEAN,
        )
        .await
    }

    /// Delete the directory at `path`.
    pub async fn rmdir(&self, path: &str, recursive: bool) -> Result<bool> {
        self.unlink(path, recursive).await
    }

    /// Create a symbolic link at `path` pointing to `destination`.
    pub async fn symlink(&self, path: &str, destination: &str, create_parent: bool) -> Result<()> {
        require("destination", destination)?;
        self.dispatch_unit(
            Operation::CreateSymlink,
            path,
            vec![
                param(params::DESTINATION, destination),
                param(params::CREATE_PARENT, create_parent),
            ],
        )
        .await
    }

    /// Concatenate `sources` onto the end of `path`.
    ///
    /// Accepts a single path or a list of paths.
    pub async fn concat(&self, path: &str, sources: impl Into<ConcatSources>) -> Result<()> {
        let sources = sources.into().to_param()?;
        self.dispatch_unit(Operation::Concat, path, vec![param(params::SOURCES, sources)])
            .await
    }

    /// Truncate `path` to `new_length` bytes.
    ///
    /// Returns true when the file is already at its new length, false when
    /// block recovery is still in progress.
    pub async fn truncate(&self, path: &str, new_length: u64) -> Result<bool> {
        self.dispatch_as(
            Operation::Truncate,
            path,
            vec![param(params::NEW_LENGTH, new_length)],
            keys::BOOLEAN,
        )
        .await
    }

    pub async fn content_summary(&self, path: &str) -> Result<ContentSummary> {
        self.dispatch_as(Operation::GetContentSummary, path, Vec::new(), keys::CONTENT_SUMMARY)
            .await
    }

    pub async fn checksum(&self, path: &str) -> Result<FileChecksum> {
        self.dispatch_as(Operation::GetFileChecksum, path, Vec::new(), keys::FILE_CHECKSUM)
            .await
    }

    /// Home directory of the configured user.
    pub async fn home_directory(&self) -> Result<String> {
        self.dispatch_as(Operation::GetHomeDirectory, "/", Vec::new(), keys::PATH)
            .await
    }

    pub async fn set_replication(&self, path: &str, replication: u16) -> Result<bool> {
        self.dispatch_as(
            Operation::SetReplication,
            path,
            vec![param(params::REPLICATION, replication)],
            keys::BOOLEAN,
        )
        .await
    }

    /// Set modification and/or access time, in milliseconds since the epoch.
    pub async fn set_times(
        &self,
        path: &str,
        modification_time: Option<u64>,
        access_time: Option<u64>,
    ) -> Result<()> {
        let mut query = Vec::new();
        if let Some(mtime) = modification_time {
            query.push(param(params::MODIFICATION_TIME, mtime));
        }
        if let Some(atime) = access_time {
            query.push(param(params::ACCESS_TIME, atime));
        }
        if query.is_empty() {
            return Err(WebHdfsError::validation("set_times requires at least one timestamp"));
        }
        self.dispatch_unit(Operation::SetTimes, path, query).await
    }

    pub async fn modify_acl_entries(&self, path: &str, acl_spec: &str) -> Result<()> {
        require("aclspec", acl_spec)?;
        self.dispatch_unit(Operation::ModifyAclEntries, path, vec![param(params::ACL_SPEC, acl_spec)])
            .await
    }

    pub async fn remove_acl_entries(&self, path: &str, acl_spec: &str) -> Result<()> {
        require("aclspec", acl_spec)?;
        self.dispatch_unit(Operation::RemoveAclEntries, path, vec![param(params::ACL_SPEC, acl_spec)])
            .await
    }

    pub async fn remove_default_acl(&self, path: &str) -> Result<()> {
        self.dispatch_unit(Operation::RemoveDefaultAcl, path, Vec::new()).await
    }

    pub async fn remove_acl(&self, path: &str) -> Result<()> {
        self.dispatch_unit(Operation::RemoveAcl, path, Vec::new()).await
    }

    /// Replace the full ACL of `path`.
    pub async fn set_acl(&self, path: &str, acl_spec: &str) -> Result<()> {
        require("aclspec", acl_spec)?;
        self.dispatch_unit(Operation::SetAcl, path, vec![param(params::ACL_SPEC, acl_spec)])
            .await
    }

    pub async fn acl_status(&self, path: &str) -> Result<AclStatus> {
        self.dispatch_as(Operation::GetAclStatus, path, Vec::new(), keys::ACL_STATUS)
            .await
    }

    /// Create a snapshot of the snapshottable directory `path`; returns the snapshot path.
    pub async fn create_snapshot(&self, path: &str, name: Option<&str>) -> Result<String> {
        let query = name
            .map(|n| vec![param(params::SNAPSHOT_NAME, n)])
            .unwrap_or_default();
        self.dispatch_as(Operation::CreateSnapshot, path, query, keys::PATH)
            .await
    }

    pub async fn delete_snapshot(&self, path: &str, name: &str) -> Result<()> {
        require("snapshot name", name)?;
        self.dispatch_unit(Operation::DeleteSnapshot, path, vec![param(params::SNAPSHOT_NAME, name)])
            .await
    }

    pub async fn rename_snapshot(&self, path: &str, old_name: &str, new_name: &str) -> Result<()> {
        require("old snapshot name", old_name)?;
        require("snapshot name", new_name)?;
        self.dispatch_unit(
            Operation::RenameSnapshot,
            path,
            vec![
                param(params::OLD_SNAPSHOT_NAME, old_name),
                param(params::SNAPSHOT_NAME, new_name),
            ],
        )
        .await
    }

    pub async fn get_delegation_token(&self, renewer: Option<&str>) -> Result<Token> {
        let query = renewer
            .map(|r| vec![param(params::RENEWER, r)])
            .unwrap_or_default();
        self.dispatch_as(Operation::GetDelegationToken, "/", query, keys::TOKEN)
            .await
    }

    pub async fn get_delegation_tokens(&self, renewer: Option<&str>) -> Result<Vec<Token>> {
        let query = renewer
            .map(|r| vec![param(params::RENEWER, r)])
            .unwrap_or_default();
        let tokens: Tokens = self
            .dispatch_as(Operation::GetDelegationTokens, "/", query, keys::TOKENS)
            .await?;
        Ok(tokens.token)
    }

    /// Renew a delegation token; returns the new expiration time.
    pub async fn renew_delegation_token(&self, token: &str) -> Result<i64> {
        require("token", token)?;
        self.dispatch_as(
            Operation::RenewDelegationToken,
            "/",
            vec![param(params::TOKEN, token)],
            keys::LONG,
        )
        .await
    }

    pub async fn cancel_delegation_token(&self, token: &str) -> Result<()> {
        require("token", token)?;
        self.dispatch_unit(Operation::CancelDelegationToken, "/", vec![param(params::TOKEN, token)])
            .await
    }
}
