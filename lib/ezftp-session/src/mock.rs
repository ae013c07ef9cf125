/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

use std::collections::BTreeSet;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;

use ezftp_proto::error::{FtpConnectError, FtpFileStatError, FtpSessionOpenError};

use crate::{
    FtpEngine, FtpEngineError, FtpRemoteEntry, FtpRemoteEntryKind, FtpSecurityMode,
    LocalFileSystem,
};

#[derive(Clone, Debug, Eq, PartialEq)]
pub(crate) enum MockCall {
    SetSecurityMode(FtpSecurityMode),
    SetTlsConfig(bool),
    Connect(String, u16),
    Disconnect(bool),
    Login(String, String),
    CurrentDirectory,
    ChangeDirectory(String),
    ChangeDirectoryUp,
    List,
    Upload(PathBuf),
    Download(String, PathBuf),
    DeleteFile(String),
    DeleteDirectory(String),
}

fn unavailable() -> FtpEngineError {
    FtpEngineError::Stat(FtpFileStatError::FileUnavailable)
}

#[derive(Default)]
pub(crate) struct MockFtpEngine {
    pub(crate) calls: Vec<MockCall>,
    pub(crate) cwd: String,
    pub(crate) listing: Vec<FtpRemoteEntry>,
    pub(crate) fail_connect: bool,
    pub(crate) reject_login: bool,
    pub(crate) fail_login: bool,
    pub(crate) fail_disconnect: bool,
    pub(crate) fail_cwd: bool,
    pub(crate) fail_upload: BTreeSet<PathBuf>,
    pub(crate) fail_download: BTreeSet<String>,
    pub(crate) fail_delete: BTreeSet<String>,
    /// Absolute paths of removed directories, resolved against `cwd`.
    pub(crate) removed_dirs: Vec<String>,
}

impl MockFtpEngine {
    pub(crate) fn in_directory(cwd: &str) -> Self {
        MockFtpEngine {
            cwd: cwd.to_string(),
            ..Default::default()
        }
    }

    pub(crate) fn with_listing(mut self, entries: &[(&str, FtpRemoteEntryKind)]) -> Self {
        self.listing = entries
            .iter()
            .map(|(name, kind)| FtpRemoteEntry::new(name, *kind))
            .collect();
        self
    }

    pub(crate) fn count(&self, f: impl Fn(&MockCall) -> bool) -> usize {
        self.calls.iter().filter(|c| f(c)).count()
    }

    /// Calls after session setup, i.e. without connect and login.
    pub(crate) fn remote_calls(&self) -> Vec<MockCall> {
        self.calls
            .iter()
            .filter(|c| {
                !matches!(
                    c,
                    MockCall::SetSecurityMode(_)
                        | MockCall::SetTlsConfig(_)
                        | MockCall::Connect(..)
                        | MockCall::Login(..)
                )
            })
            .cloned()
            .collect()
    }
}

#[async_trait]
impl FtpEngine for MockFtpEngine {
    fn set_security_mode(&mut self, mode: FtpSecurityMode) {
        self.calls.push(MockCall::SetSecurityMode(mode));
    }

    fn set_tls_config(&mut self, config: Option<Arc<rustls::ClientConfig>>) {
        self.calls.push(MockCall::SetTlsConfig(config.is_some()));
    }

    async fn connect(&mut self, host: &str, port: u16) -> Result<(), FtpEngineError> {
        self.calls.push(MockCall::Connect(host.to_string(), port));
        if self.fail_connect {
            return Err(FtpConnectError::ConnectTimedOut.into());
        }
        Ok(())
    }

    async fn disconnect(&mut self, graceful: bool) -> Result<(), FtpEngineError> {
        self.calls.push(MockCall::Disconnect(graceful));
        if self.fail_disconnect {
            return Err(FtpEngineError::LocalIo(io::Error::other("connection reset")));
        }
        Ok(())
    }

    async fn login(&mut self, username: &str, password: &str) -> Result<(), FtpEngineError> {
        self.calls
            .push(MockCall::Login(username.to_string(), password.to_string()));
        if self.reject_login {
            return Err(FtpSessionOpenError::NotLoggedIn.into());
        }
        if self.fail_login {
            return Err(FtpSessionOpenError::ServiceNotAvailable.into());
        }
        Ok(())
    }

    async fn current_directory(&mut self) -> Result<String, FtpEngineError> {
        self.calls.push(MockCall::CurrentDirectory);
        Ok(self.cwd.clone())
    }

    async fn change_directory(&mut self, path: &str) -> Result<(), FtpEngineError> {
        self.calls.push(MockCall::ChangeDirectory(path.to_string()));
        if self.fail_cwd {
            return Err(unavailable());
        }
        self.cwd = path.to_string();
        Ok(())
    }

    async fn change_directory_up(&mut self) -> Result<(), FtpEngineError> {
        self.calls.push(MockCall::ChangeDirectoryUp);
        let trimmed = self.cwd.trim_end_matches('/');
        self.cwd = match trimmed.rsplit_once('/') {
            Some(("", _)) | None => "/".to_string(),
            Some((parent, _)) => parent.to_string(),
        };
        Ok(())
    }

    async fn list(&mut self) -> Result<Vec<FtpRemoteEntry>, FtpEngineError> {
        self.calls.push(MockCall::List);
        Ok(self.listing.clone())
    }

    async fn upload(&mut self, local_file: &Path) -> Result<u64, FtpEngineError> {
        self.calls.push(MockCall::Upload(local_file.to_path_buf()));
        if self.fail_upload.contains(local_file) {
            return Err(unavailable());
        }
        Ok(1)
    }

    async fn download(
        &mut self,
        remote_name: &str,
        local_file: &Path,
    ) -> Result<u64, FtpEngineError> {
        self.calls.push(MockCall::Download(
            remote_name.to_string(),
            local_file.to_path_buf(),
        ));
        if self.fail_download.contains(remote_name) {
            return Err(unavailable());
        }
        Ok(1)
    }

    async fn delete_file(&mut self, remote_name: &str) -> Result<(), FtpEngineError> {
        self.calls.push(MockCall::DeleteFile(remote_name.to_string()));
        if self.fail_delete.contains(remote_name) {
            return Err(unavailable());
        }
        Ok(())
    }

    async fn delete_directory(&mut self, remote_name: &str) -> Result<(), FtpEngineError> {
        self.calls
            .push(MockCall::DeleteDirectory(remote_name.to_string()));
        if self.fail_delete.contains(remote_name) {
            return Err(unavailable());
        }
        let path = if remote_name.starts_with('/') {
            remote_name.trim_end_matches('/').to_string()
        } else {
            format!("{}/{remote_name}", self.cwd.trim_end_matches('/'))
        };
        self.removed_dirs.push(path);
        Ok(())
    }
}

#[derive(Default)]
pub(crate) struct MockFileSystem {
    files: BTreeSet<PathBuf>,
    dirs: BTreeSet<PathBuf>,
}

impl MockFileSystem {
    pub(crate) fn with_dir(mut self, dir: &str) -> Self {
        self.dirs.insert(PathBuf::from(dir));
        self
    }

    pub(crate) fn with_file(mut self, file: &str) -> Self {
        let path = PathBuf::from(file);
        if let Some(parent) = path.parent() {
            self.dirs.insert(parent.to_path_buf());
        }
        self.files.insert(path);
        self
    }
}

#[async_trait]
impl LocalFileSystem for MockFileSystem {
    async fn list_regular_files(&self, dir: &Path) -> io::Result<Vec<PathBuf>> {
        if !self.dirs.contains(dir) {
            return Err(io::Error::from(io::ErrorKind::NotFound));
        }
        Ok(self
            .files
            .iter()
            .filter(|f| f.parent() == Some(dir))
            .cloned()
            .collect())
    }

    async fn is_file(&self, path: &Path) -> bool {
        self.files.contains(path)
    }

    async fn is_dir(&self, path: &Path) -> bool {
        self.dirs.contains(path)
    }
}
