/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

use std::fmt;
use std::io;
use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use ezftp_proto::error::{
    FtpCommandError, FtpConnectError, FtpFileListError, FtpFileRetrieveError, FtpFileStatError,
    FtpFileStoreError, FtpSessionOpenError,
};

use crate::FtpSecurityMode;

mod proto;
pub use proto::ProtoFtpEngine;

#[derive(Debug, Error)]
pub enum FtpEngineError {
    #[error("not connected")]
    NotConnected,
    #[error("no tls config set for security mode {0}")]
    TlsConfigMissing(FtpSecurityMode),
    #[error("connect failed: {0}")]
    Connect(#[from] FtpConnectError),
    #[error("login failed: {0}")]
    Login(#[from] FtpSessionOpenError),
    #[error("command failed: {0}")]
    Command(#[from] FtpCommandError),
    #[error("remote file operation failed: {0}")]
    Stat(#[from] FtpFileStatError),
    #[error("list failed: {0}")]
    List(#[from] FtpFileListError),
    #[error("retrieve failed: {0}")]
    Retrieve(#[from] FtpFileRetrieveError),
    #[error("store failed: {0}")]
    Store(#[from] FtpFileStoreError),
    #[error("local io error: {0:?}")]
    LocalIo(#[from] io::Error),
}

impl FtpEngineError {
    /// The server refused the credentials.
    pub fn is_auth_rejected(&self) -> bool {
        matches!(self, FtpEngineError::Login(e) if e.is_rejected())
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum FtpRemoteEntryKind {
    File,
    Directory,
    Link,
}

impl fmt::Display for FtpRemoteEntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FtpRemoteEntryKind::File => f.write_str("file"),
            FtpRemoteEntryKind::Directory => f.write_str("dir"),
            FtpRemoteEntryKind::Link => f.write_str("link"),
        }
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FtpRemoteEntry {
    pub name: String,
    pub kind: FtpRemoteEntryKind,
    pub size: Option<u64>,
}

impl FtpRemoteEntry {
    pub fn new(name: &str, kind: FtpRemoteEntryKind) -> Self {
        FtpRemoteEntry {
            name: name.to_string(),
            kind,
            size: None,
        }
    }

    #[inline]
    pub fn is_file(&self) -> bool {
        self.kind == FtpRemoteEntryKind::File
    }
}

/// The FTP operations a session drives.
///
/// Names are relative to the current remote directory unless absolute.
#[async_trait]
pub trait FtpEngine: Send {
    fn set_security_mode(&mut self, mode: FtpSecurityMode);
    fn set_tls_config(&mut self, config: Option<Arc<rustls::ClientConfig>>);

    async fn connect(&mut self, host: &str, port: u16) -> Result<(), FtpEngineError>;
    async fn disconnect(&mut self, graceful: bool) -> Result<(), FtpEngineError>;
    async fn login(&mut self, username: &str, password: &str) -> Result<(), FtpEngineError>;

    async fn current_directory(&mut self) -> Result<String, FtpEngineError>;
    async fn change_directory(&mut self, path: &str) -> Result<(), FtpEngineError>;
    async fn change_directory_up(&mut self) -> Result<(), FtpEngineError>;

    /// List the current directory, without the `.` and `..` entries.
    async fn list(&mut self) -> Result<Vec<FtpRemoteEntry>, FtpEngineError>;
    /// Store a local file in the current directory under its base name.
    async fn upload(&mut self, local_file: &Path) -> Result<u64, FtpEngineError>;
    async fn download(
        &mut self,
        remote_name: &str,
        local_file: &Path,
    ) -> Result<u64, FtpEngineError>;
    async fn delete_file(&mut self, remote_name: &str) -> Result<(), FtpEngineError>;
    async fn delete_directory(&mut self, remote_name: &str) -> Result<(), FtpEngineError>;
}
