/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

use std::io;
use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use log::debug;

use ezftp_proto::{FtpClient, FtpClientConfig, FtpControlSecurity, FtpFileEntryType, FtpFileFacts};

use super::{FtpEngine, FtpEngineError, FtpRemoteEntry, FtpRemoteEntryKind};
use crate::FtpSecurityMode;

/// [`FtpEngine`] on top of the `ezftp-proto` client.
pub struct ProtoFtpEngine {
    config: Arc<FtpClientConfig>,
    security: FtpSecurityMode,
    tls_config: Option<Arc<rustls::ClientConfig>>,
    client: Option<FtpClient>,
}

impl ProtoFtpEngine {
    pub fn new(config: FtpClientConfig) -> Self {
        ProtoFtpEngine {
            config: Arc::new(config),
            security: FtpSecurityMode::Plain,
            tls_config: None,
            client: None,
        }
    }

    fn client_mut(&mut self) -> Result<&mut FtpClient, FtpEngineError> {
        self.client.as_mut().ok_or(FtpEngineError::NotConnected)
    }

    fn control_security(&self) -> Result<FtpControlSecurity, FtpEngineError> {
        let tls_config = || {
            self.tls_config
                .clone()
                .ok_or(FtpEngineError::TlsConfigMissing(self.security))
        };
        match self.security {
            FtpSecurityMode::Plain => Ok(FtpControlSecurity::Plain),
            FtpSecurityMode::ImplicitTls => Ok(FtpControlSecurity::ImplicitTls(tls_config()?)),
            FtpSecurityMode::ExplicitTls => Ok(FtpControlSecurity::ExplicitTls(tls_config()?)),
        }
    }
}

impl Default for ProtoFtpEngine {
    fn default() -> Self {
        ProtoFtpEngine::new(FtpClientConfig::default())
    }
}

fn convert_entry(facts: FtpFileFacts) -> Option<FtpRemoteEntry> {
    let kind = match facts.entry_type() {
        FtpFileEntryType::File => FtpRemoteEntryKind::File,
        FtpFileEntryType::Directory => FtpRemoteEntryKind::Directory,
        FtpFileEntryType::Link => FtpRemoteEntryKind::Link,
        t => {
            debug!("skip listing entry {} of type {t}", facts.entry_name());
            return None;
        }
    };
    Some(FtpRemoteEntry {
        name: facts.entry_name().to_string(),
        kind,
        size: facts.size(),
    })
}

fn local_file_name(local_file: &Path) -> Result<&str, FtpEngineError> {
    local_file
        .file_name()
        .and_then(|s| s.to_str())
        .ok_or_else(|| {
            FtpEngineError::LocalIo(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("no valid file name in {}", local_file.display()),
            ))
        })
}

#[async_trait]
impl FtpEngine for ProtoFtpEngine {
    fn set_security_mode(&mut self, mode: FtpSecurityMode) {
        self.security = mode;
    }

    fn set_tls_config(&mut self, config: Option<Arc<rustls::ClientConfig>>) {
        self.tls_config = config;
    }

    async fn connect(&mut self, host: &str, port: u16) -> Result<(), FtpEngineError> {
        let security = self.control_security()?;
        let client = FtpClient::connect_to(host, port, security, self.config.clone()).await?;
        self.client = Some(client);
        Ok(())
    }

    async fn disconnect(&mut self, graceful: bool) -> Result<(), FtpEngineError> {
        let client = self.client.take().ok_or(FtpEngineError::NotConnected)?;
        if graceful {
            client.quit_and_close().await?;
        }
        Ok(())
    }

    async fn login(&mut self, username: &str, password: &str) -> Result<(), FtpEngineError> {
        self.client_mut()?.login(username, password).await?;
        Ok(())
    }

    async fn current_directory(&mut self) -> Result<String, FtpEngineError> {
        let dir = self.client_mut()?.current_directory().await?;
        Ok(dir)
    }

    async fn change_directory(&mut self, path: &str) -> Result<(), FtpEngineError> {
        self.client_mut()?.change_directory(path).await?;
        Ok(())
    }

    async fn change_directory_up(&mut self) -> Result<(), FtpEngineError> {
        self.client_mut()?.change_directory_up().await?;
        Ok(())
    }

    async fn list(&mut self) -> Result<Vec<FtpRemoteEntry>, FtpEngineError> {
        let facts = self.client_mut()?.list_directory().await?;
        Ok(facts.into_iter().filter_map(convert_entry).collect())
    }

    async fn upload(&mut self, local_file: &Path) -> Result<u64, FtpEngineError> {
        let remote_name = local_file_name(local_file)?;
        let client = self.client_mut()?;
        let mut file = tokio::fs::File::open(local_file).await?;
        let size = client.store_file(remote_name, &mut file).await?;
        Ok(size)
    }

    async fn download(
        &mut self,
        remote_name: &str,
        local_file: &Path,
    ) -> Result<u64, FtpEngineError> {
        let client = self.client_mut()?;
        let mut file = tokio::fs::File::create(local_file).await?;
        match client.retrieve_file(remote_name, &mut file).await {
            Ok(size) => Ok(size),
            Err(e) => {
                drop(file);
                if let Err(e) = tokio::fs::remove_file(local_file).await {
                    debug!(
                        "failed to remove partial file {}: {e}",
                        local_file.display()
                    );
                }
                Err(e.into())
            }
        }
    }

    async fn delete_file(&mut self, remote_name: &str) -> Result<(), FtpEngineError> {
        self.client_mut()?.delete_file(remote_name).await?;
        Ok(())
    }

    async fn delete_directory(&mut self, remote_name: &str) -> Result<(), FtpEngineError> {
        self.client_mut()?.remove_dir(remote_name).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn not_connected() {
        let mut engine = ProtoFtpEngine::default();
        assert!(matches!(
            engine.current_directory().await,
            Err(FtpEngineError::NotConnected)
        ));
        assert!(matches!(
            engine.disconnect(true).await,
            Err(FtpEngineError::NotConnected)
        ));
    }

    #[tokio::test]
    async fn tls_config_missing() {
        let mut engine = ProtoFtpEngine::default();
        engine.set_security_mode(FtpSecurityMode::ImplicitTls);
        assert!(matches!(
            engine.connect("127.0.0.1", 990).await,
            Err(FtpEngineError::TlsConfigMissing(FtpSecurityMode::ImplicitTls))
        ));
    }

    #[test]
    fn file_name() {
        assert_eq!(local_file_name(Path::new("/tmp/a.txt")).unwrap(), "a.txt");
        assert!(local_file_name(Path::new("/")).is_err());
    }
}
