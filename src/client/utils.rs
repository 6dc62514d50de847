//! Option types and input helpers for the WebHDFS client.
//!
//! This module provides:
//! - [`UploadOptions`] and [`DownloadOptions`] for the streaming transfers
//! - [`ConcatSources`] for `CONCAT` input
//! - permission string validation

use crate::client::config::ClientConfig;
use crate::client::fetch::Params;
use crate::error::{Result, WebHdfsError};
use crate::protocol::constants::params;

/// Options for `CREATE` and `APPEND`.
///
/// Unset fields fall back to [`ClientConfig`] defaults (`overwrite`,
/// `permission`) or are omitted (the rest).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UploadOptions {
    /// Append to an existing file instead of creating one.
    pub append: bool,
    pub overwrite: Option<bool>,
    /// Octal permission, e.g. `"0644"`.
    pub permission: Option<String>,
    pub blocksize: Option<u64>,
    pub replication: Option<u16>,
    pub buffersize: Option<u32>,
    /// Extra raw parameters, appended verbatim.
    pub extra: Params,
}

impl UploadOptions {
    /// Options for creating (or replacing) a file.
    pub fn create() -> Self {
        Self::default()
    }

    /// Options for appending to an existing file.
    pub fn append() -> Self {
        UploadOptions {
            append: true,
            ..Self::default()
        }
    }

    pub fn with_overwrite(mut self, overwrite: bool) -> Self {
        self.overwrite = Some(overwrite);
        self
    }

    pub fn with_permission(mut self, permission: impl Into<String>) -> Self {
        self.permission = Some(permission.into());
        self
    }

    pub fn with_replication(mut self, replication: u16) -> Self {
        self.replication = Some(replication);
        self
    }

    pub fn with_blocksize(mut self, blocksize: u64) -> Self {
        self.blocksize = Some(blocksize);
        self
    }

    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.extra.push((key.into(), value.into()));
        self
    }

    /// Query parameters for the locate request.
    ///
    /// `APPEND` takes neither `overwrite` nor `permission`.
    pub(crate) fn to_params(&self, config: &ClientConfig) -> Result<Params> {
        let mut out = Params::new();
        if !self.append {
            let overwrite = self.overwrite.unwrap_or(config.default_overwrite);
            let permission = self
                .permission
                .clone()
                .unwrap_or_else(|| config.default_permission.clone());
            validate_permission(&permission)?;
            out.push((params::OVERWRITE.to_string(), overwrite.to_string()));
            out.push((params::PERMISSION.to_string(), permission));
            if let Some(blocksize) = self.blocksize {
                out.push((params::BLOCKSIZE.to_string(), blocksize.to_string()));
            }
            if let Some(replication) = self.replication {
                out.push((params::REPLICATION.to_string(), replication.to_string()));
            }
        }
        if let Some(buffersize) = self.buffersize {
            out.push((params::BUFFERSIZE.to_string(), buffersize.to_string()));
        }
        out.extend(self.extra.iter().cloned());
        Ok(out)
    }
}

/// Options for `OPEN`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DownloadOptions {
    /// Byte offset to start reading from.
    pub offset: Option<u64>,
    /// Number of bytes to read.
    pub length: Option<u64>,
    pub buffersize: Option<u32>,
    /// Extra raw parameters, appended verbatim.
    pub extra: Params,
}

impl DownloadOptions {
    /// Read `length` bytes starting at `offset`.
    pub fn range(offset: u64, length: u64) -> Self {
        DownloadOptions {
            offset: Some(offset),
            length: Some(length),
            ..Self::default()
        }
    }

    pub(crate) fn to_params(&self) -> Params {
        let mut out = Params::new();
        if let Some(offset) = self.offset {
            out.push((params::OFFSET.to_string(), offset.to_string()));
        }
        if let Some(length) = self.length {
            out.push((params::LENGTH.to_string(), length.to_string()));
        }
        if let Some(buffersize) = self.buffersize {
            out.push((params::BUFFERSIZE.to_string(), buffersize.to_string()));
        }
        out.extend(self.extra.iter().cloned());
        out
    }
}

/// Source paths for `CONCAT`: a single path or a list of paths.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConcatSources {
    One(String),
    Many(Vec<String>),
}

impl ConcatSources {
    /// Comma-joined parameter value.
    ///
    /// # Errors
    ///
    /// [`WebHdfsError::Validation`] for an empty list or any empty path.
    pub fn to_param(&self) -> Result<String> {
        let paths: Vec<&str> = match self {
            ConcatSources::One(path) => vec![path.as_str()],
            ConcatSources::Many(paths) => paths.iter().map(String::as_str).collect(),
        };
        if paths.is_empty() {
            return Err(WebHdfsError::validation("concat requires at least one source path"));
        }
        if paths.iter().any(|p| p.trim().is_empty()) {
            return Err(WebHdfsError::validation("concat source paths must be non-empty strings"));
        }
        Ok(paths.join(","))
    }
}

impl From<&str> for ConcatSources {
    fn from(path: &str) -> Self {
        ConcatSources::One(path.to_string())
    }
}

impl From<String> for ConcatSources {
    fn from(path: String) -> Self {
        ConcatSources::One(path)
    }
}

impl From<Vec<String>> for ConcatSources {
    fn from(paths: Vec<String>) -> Self {
        ConcatSources::Many(paths)
    }
}

impl From<Vec<&str>> for ConcatSources {
    fn from(paths: Vec<&str>) -> Self {
        ConcatSources::Many(paths.into_iter().map(str::to_string).collect())
    }
}

impl From<&[&str]> for ConcatSources {
    fn from(paths: &[&str]) -> Self {
        ConcatSources::Many(paths.iter().map(|p| p.to_string()).collect())
    }
}

/// Check an octal permission string such as `"755"` or `"0644"`.
pub fn validate_permission(permission: &str) -> Result<()> {
    let valid = (3..=4).contains(&permission.len())
        && permission.chars().all(|c| ('0'..='7').contains(&c));
    if !valid {
        return Err(WebHdfsError::validation(format!(
            "invalid permission '{}': expected 3 or 4 octal digits",
            permission
        )));
    }
    Ok(())
}
