/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

use std::fmt;
use std::path::{Path, PathBuf};

use log::{debug, info};

use super::{FtpSession, log_failure, require_non_empty};
use crate::{
    FtpBatchPolicy, FtpEngine, FtpEngineError, FtpPreconditionError, FtpRemoteEntry,
    FtpSessionError, LocalFileSystem,
};

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum FtpTransferDirection {
    Upload,
    Download,
}

/// One file transfer, used as log context.
#[derive(Clone, Debug)]
pub struct FtpTransferRequest {
    pub local_path: PathBuf,
    pub remote_name: String,
    pub remote_dir: String,
    pub direction: FtpTransferDirection,
}

impl FtpTransferRequest {
    fn upload(local_path: &Path, remote_dir: &str) -> Self {
        let remote_name = local_path
            .file_name()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        FtpTransferRequest {
            local_path: local_path.to_path_buf(),
            remote_name,
            remote_dir: remote_dir.to_string(),
            direction: FtpTransferDirection::Upload,
        }
    }

    fn download(remote_name: &str, remote_dir: &str, local_dir: &Path) -> Self {
        FtpTransferRequest {
            local_path: local_dir.join(remote_name),
            remote_name: remote_name.to_string(),
            remote_dir: remote_dir.to_string(),
            direction: FtpTransferDirection::Download,
        }
    }
}

impl fmt::Display for FtpTransferRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let dir = self.remote_dir.trim_end_matches('/');
        match self.direction {
            FtpTransferDirection::Upload => write!(
                f,
                "upload {} -> {dir}/{}",
                self.local_path.display(),
                self.remote_name
            ),
            FtpTransferDirection::Download => write!(
                f,
                "download {dir}/{} -> {}",
                self.remote_name,
                self.local_path.display()
            ),
        }
    }
}

fn require_non_empty_path(path: &Path, name: &'static str) -> Result<(), FtpPreconditionError> {
    if path.as_os_str().is_empty() {
        Err(FtpPreconditionError::EmptyParameter(name))
    } else {
        Ok(())
    }
}

/// Collects item failures of a batch according to the policy.
struct BatchOutcome {
    policy: FtpBatchPolicy,
    first_error: Option<FtpSessionError>,
}

impl BatchOutcome {
    fn new(policy: FtpBatchPolicy) -> Self {
        BatchOutcome {
            policy,
            first_error: None,
        }
    }

    /// Returns the error back if the batch should stop now.
    fn record(&mut self, e: FtpSessionError) -> Result<(), FtpSessionError> {
        match self.policy {
            FtpBatchPolicy::AbortOnError => Err(e),
            FtpBatchPolicy::ContinueOnError => {
                if self.first_error.is_none() {
                    self.first_error = Some(e);
                }
                Ok(())
            }
        }
    }

    fn finish(self) -> Result<(), FtpSessionError> {
        match self.first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

impl<E, F> FtpSession<E, F>
where
    E: FtpEngine,
    F: LocalFileSystem,
{
    fn require_ready(
        &self,
        operation: &'static str,
        check_args: Result<(), FtpPreconditionError>,
    ) -> Result<(), FtpSessionError> {
        check_args
            .and_then(|_| self.phase.require_authenticated())
            .map_err(|e| log_failure(operation, e.into()))
    }

    async fn enter_directory(&mut self, target: &str) -> Result<(), FtpEngineError> {
        let current = self.engine.current_directory().await?;
        if crate::path::same_directory(&current, target) {
            debug!("already in remote directory {target}");
            return Ok(());
        }
        debug!("change remote directory from {current} to {target}");
        self.engine.change_directory(target).await
    }

    /// Change the remote working directory unless it is already `target`.
    pub async fn change_dir_if_needed(&mut self, target: &str) -> Result<(), FtpSessionError> {
        const OP: &str = "change directory";
        self.require_ready(OP, require_non_empty(target, "remote directory"))?;
        self.enter_directory(target)
            .await
            .map_err(|e| log_failure(OP, FtpSessionError::Transport(e)))
    }

    async fn upload_one(
        &mut self,
        local_path: &Path,
        remote_dir: &str,
    ) -> Result<(), FtpSessionError> {
        let req = FtpTransferRequest::upload(local_path, remote_dir);
        match self.engine.upload(local_path).await {
            Ok(n) => {
                info!("{req}: {n} bytes");
                Ok(())
            }
            Err(e) => Err(log_failure("upload", FtpSessionError::Transfer(e))),
        }
    }

    async fn download_one(
        &mut self,
        remote_name: &str,
        remote_dir: &str,
        local_dir: &Path,
    ) -> Result<(), FtpSessionError> {
        let req = FtpTransferRequest::download(remote_name, remote_dir, local_dir);
        match self.engine.download(remote_name, &req.local_path).await {
            Ok(n) => {
                info!("{req}: {n} bytes");
                Ok(())
            }
            Err(e) => Err(log_failure("download", FtpSessionError::Transfer(e))),
        }
    }

    async fn check_local_dir(&self, local_dir: &Path) -> Result<(), FtpSessionError> {
        if self.fs.is_dir(local_dir).await {
            Ok(())
        } else {
            Err(FtpSessionError::NotFound(
                local_dir.to_path_buf(),
                "local directory",
            ))
        }
    }

    /// Upload one local file into `remote_dir`, keeping its base name.
    pub async fn upload_file(
        &mut self,
        local_path: &Path,
        remote_dir: &str,
    ) -> Result<(), FtpSessionError> {
        const OP: &str = "upload file";
        self.require_ready(
            OP,
            require_non_empty_path(local_path, "local path")
                .and_then(|_| require_non_empty(remote_dir, "remote directory")),
        )?;

        self.enter_directory(remote_dir)
            .await
            .map_err(|e| log_failure(OP, FtpSessionError::Transfer(e)))?;
        if !self.fs.is_file(local_path).await {
            return Err(log_failure(
                OP,
                FtpSessionError::NotFound(local_path.to_path_buf(), "local file"),
            ));
        }
        self.upload_one(local_path, remote_dir).await
    }

    /// Upload every regular file directly inside `local_dir`, in name order.
    pub async fn upload_directory(
        &mut self,
        local_dir: &Path,
        remote_dir: &str,
    ) -> Result<(), FtpSessionError> {
        const OP: &str = "upload directory";
        self.require_ready(
            OP,
            require_non_empty_path(local_dir, "local directory")
                .and_then(|_| require_non_empty(remote_dir, "remote directory")),
        )?;

        let files = match self.fs.list_regular_files(local_dir).await {
            Ok(files) if !files.is_empty() => files,
            Ok(_) => {
                return Err(log_failure(
                    OP,
                    FtpSessionError::NotFound(local_dir.to_path_buf(), "regular file in"),
                ));
            }
            Err(e) => {
                debug!("failed to read local directory {}: {e}", local_dir.display());
                return Err(log_failure(
                    OP,
                    FtpSessionError::NotFound(local_dir.to_path_buf(), "local directory"),
                ));
            }
        };

        self.enter_directory(remote_dir)
            .await
            .map_err(|e| log_failure(OP, FtpSessionError::Transfer(e)))?;

        let mut outcome = BatchOutcome::new(self.config.batch_policy);
        for file in &files {
            if let Err(e) = self.upload_one(file, remote_dir).await {
                outcome.record(e)?;
            }
        }
        outcome.finish()
    }

    /// Download `remote_dir/remote_name` into `local_dir`.
    pub async fn download_file(
        &mut self,
        remote_name: &str,
        remote_dir: &str,
        local_dir: &Path,
    ) -> Result<(), FtpSessionError> {
        const OP: &str = "download file";
        self.require_ready(
            OP,
            require_non_empty(remote_name, "remote name")
                .and_then(|_| require_non_empty(remote_dir, "remote directory"))
                .and_then(|_| require_non_empty_path(local_dir, "local directory")),
        )?;

        self.enter_directory(remote_dir)
            .await
            .map_err(|e| log_failure(OP, FtpSessionError::Transfer(e)))?;
        self.check_local_dir(local_dir)
            .await
            .map_err(|e| log_failure(OP, e))?;
        self.download_one(remote_name, remote_dir, local_dir).await
    }

    /// Download every file entry of `remote_dir` into `local_dir`.
    ///
    /// Directories and links are skipped.
    pub async fn download_directory(
        &mut self,
        remote_dir: &str,
        local_dir: &Path,
    ) -> Result<(), FtpSessionError> {
        const OP: &str = "download directory";
        self.require_ready(
            OP,
            require_non_empty(remote_dir, "remote directory")
                .and_then(|_| require_non_empty_path(local_dir, "local directory")),
        )?;

        self.enter_directory(remote_dir)
            .await
            .map_err(|e| log_failure(OP, FtpSessionError::Transfer(e)))?;
        self.check_local_dir(local_dir)
            .await
            .map_err(|e| log_failure(OP, e))?;
        let entries = self
            .engine
            .list()
            .await
            .map_err(|e| log_failure(OP, FtpSessionError::Transfer(e)))?;
        if entries.is_empty() {
            return Err(log_failure(
                OP,
                FtpSessionError::EmptyListing(remote_dir.to_string()),
            ));
        }

        let mut outcome = BatchOutcome::new(self.config.batch_policy);
        for entry in entries.iter().filter(|e| e.is_file()) {
            if let Err(e) = self.download_one(&entry.name, remote_dir, local_dir).await {
                outcome.record(e)?;
            }
        }
        outcome.finish()
    }

    pub async fn delete_file(
        &mut self,
        remote_name: &str,
        remote_dir: &str,
    ) -> Result<(), FtpSessionError> {
        const OP: &str = "delete file";
        self.require_ready(
            OP,
            require_non_empty(remote_name, "remote name")
                .and_then(|_| require_non_empty(remote_dir, "remote directory")),
        )?;

        self.enter_directory(remote_dir)
            .await
            .map_err(|e| log_failure(OP, FtpSessionError::Delete(e)))?;
        self.engine
            .delete_file(remote_name)
            .await
            .map_err(|e| log_failure(OP, FtpSessionError::Delete(e)))?;
        info!("deleted remote file {remote_dir}/{remote_name}");
        Ok(())
    }

    /// Delete the files of `remote_dir`, then the directory itself.
    ///
    /// With files inside, the directory is removed by its last path component
    /// from the parent. An empty directory is removed by `remote_dir` as given.
    /// Sub directories are not descended into, so the final removal fails
    /// if there is any.
    pub async fn delete_directory(&mut self, remote_dir: &str) -> Result<(), FtpSessionError> {
        const OP: &str = "delete directory";
        self.require_ready(OP, require_non_empty(remote_dir, "remote directory"))?;
        let child_name = crate::path::child_dir_name(remote_dir)
            .ok_or(FtpPreconditionError::EmptyParameter("remote directory"))
            .map_err(|e| log_failure(OP, e.into()))?
            .to_string();

        self.enter_directory(remote_dir)
            .await
            .map_err(|e| log_failure(OP, FtpSessionError::Delete(e)))?;
        let entries = self
            .engine
            .list()
            .await
            .map_err(|e| log_failure(OP, FtpSessionError::Delete(e)))?;

        let target = if entries.is_empty() {
            remote_dir
        } else {
            let mut outcome = BatchOutcome::new(self.config.batch_policy);
            for entry in entries.iter().filter(|e| e.is_file()) {
                match self.engine.delete_file(&entry.name).await {
                    Ok(_) => debug!("deleted remote file {}", entry.name),
                    Err(e) => outcome.record(log_failure(OP, FtpSessionError::Delete(e)))?,
                }
            }
            outcome.finish()?;

            self.engine
                .change_directory_up()
                .await
                .map_err(|e| log_failure(OP, FtpSessionError::Delete(e)))?;
            child_name.as_str()
        };

        self.engine
            .delete_directory(target)
            .await
            .map_err(|e| log_failure(OP, FtpSessionError::Delete(e)))?;
        info!("deleted remote directory {remote_dir}");
        Ok(())
    }

    pub async fn list_directory(
        &mut self,
        remote_dir: &str,
    ) -> Result<Vec<FtpRemoteEntry>, FtpSessionError> {
        const OP: &str = "list directory";
        self.require_ready(OP, require_non_empty(remote_dir, "remote directory"))?;

        self.enter_directory(remote_dir)
            .await
            .map_err(|e| log_failure(OP, FtpSessionError::Transfer(e)))?;
        self.engine
            .list()
            .await
            .map_err(|e| log_failure(OP, FtpSessionError::Transfer(e)))
    }
}
