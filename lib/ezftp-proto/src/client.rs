/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

use std::net::IpAddr;
use std::sync::Arc;

use async_trait::async_trait;
use log::{debug, info};
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};
use tokio::net::TcpStream;

use crate::control::FtpControlChannel;
use crate::error::{
    FtpAuthStatus, FtpCommandError, FtpConnectError, FtpFileFactsParseError, FtpFileListError,
    FtpFileRetrieveError, FtpFileRetrieveStartError, FtpFileStatError, FtpFileStoreError,
    FtpFileStoreStartError, FtpLineDataReadError, FtpSessionOpenError,
};
use crate::stream::{FtpStream, FtpTlsClient};
use crate::transfer::{FtpLineDataReceiver, FtpLineDataTransfer, FtpTransferType};
use crate::{FtpClientConfig, FtpFileFacts};

/// How the control connection is protected.
#[derive(Clone)]
pub enum FtpControlSecurity {
    Plain,
    /// TLS from the first byte, usually on port 990.
    ImplicitTls(Arc<rustls::ClientConfig>),
    /// Clear text greeting, then upgraded with `AUTH TLS`.
    ExplicitTls(Arc<rustls::ClientConfig>),
}

pub struct FtpClient {
    pub(crate) config: Arc<FtpClientConfig>,
    pub(crate) control: FtpControlChannel<FtpStream>,
    pub(crate) peer_ip: IpAddr,
    pub(crate) tls: Option<FtpTlsClient>,
    pub(crate) data_protected: bool,
}

async fn tls_handshake(
    tls: &FtpTlsClient,
    tcp_stream: TcpStream,
    config: &FtpClientConfig,
) -> Result<FtpStream, FtpConnectError> {
    match tokio::time::timeout(config.tls_handshake_timeout, tls.handshake(tcp_stream)).await {
        Ok(Ok(stream)) => Ok(stream),
        Ok(Err(e)) => Err(FtpConnectError::TlsHandshakeFailed(e)),
        Err(_) => Err(FtpConnectError::TlsHandshakeTimedOut),
    }
}

impl FtpClient {
    pub async fn connect_to(
        host: &str,
        port: u16,
        security: FtpControlSecurity,
        config: Arc<FtpClientConfig>,
    ) -> Result<Self, FtpConnectError> {
        let tcp_stream =
            match tokio::time::timeout(config.connect_timeout, TcpStream::connect((host, port)))
                .await
            {
                Ok(Ok(stream)) => stream,
                Ok(Err(e)) => return Err(FtpConnectError::ConnectIoError(e)),
                Err(_) => return Err(FtpConnectError::ConnectTimedOut),
            };
        let peer_ip = tcp_stream
            .peer_addr()
            .map_err(FtpConnectError::ConnectIoError)?
            .ip();
        debug!("control channel connected to {host}:{port} ({peer_ip})");

        let (stream, tls, upgrade) = match security {
            FtpControlSecurity::Plain => (FtpStream::Plain(tcp_stream), None, false),
            FtpControlSecurity::ImplicitTls(tls_config) => {
                let tls = FtpTlsClient::new(tls_config, host, peer_ip);
                let stream = tls_handshake(&tls, tcp_stream, &config).await?;
                (stream, Some(tls), false)
            }
            FtpControlSecurity::ExplicitTls(tls_config) => {
                let tls = FtpTlsClient::new(tls_config, host, peer_ip);
                (FtpStream::Plain(tcp_stream), Some(tls), true)
            }
        };

        let mut control = FtpControlChannel::new(stream, config.control);
        match tokio::time::timeout(config.greeting_timeout, control.wait_greetings()).await {
            Ok(Ok(_)) => {}
            Ok(Err(e)) => return Err(FtpConnectError::GreetingFailed(e)),
            Err(_) => return Err(FtpConnectError::GreetingTimedOut),
        }

        if let Some(tls) = tls.as_ref().filter(|_| upgrade) {
            control
                .request_auth_tls()
                .await
                .map_err(FtpConnectError::NegotiationFailed)?;
            let stream = match control.into_inner() {
                FtpStream::Plain(tcp_stream) => tls_handshake(tls, tcp_stream, &config).await?,
                stream => stream,
            };
            control = FtpControlChannel::new(stream, config.control);
            debug!("control channel to {peer_ip} upgraded to tls");
        }

        Ok(FtpClient {
            config,
            control,
            peer_ip,
            tls,
            data_protected: false,
        })
    }

    #[inline]
    pub fn peer_ip(&self) -> IpAddr {
        self.peer_ip
    }

    #[inline]
    pub fn is_secure(&self) -> bool {
        self.tls.is_some()
    }

    /// Authenticate, then protect data connections if the control one is
    /// protected, then switch to binary transfer type.
    pub async fn login(&mut self, user: &str, pass: &str) -> Result<(), FtpSessionOpenError> {
        match self.control.send_username(user).await? {
            FtpAuthStatus::LoggedIn => {}
            FtpAuthStatus::NotLoggedIn => return Err(FtpSessionOpenError::NotLoggedIn),
            FtpAuthStatus::NeedAccount => return Err(FtpSessionOpenError::AccountIsNeeded),
            FtpAuthStatus::NeedPassword => match self.control.send_password(pass).await? {
                FtpAuthStatus::LoggedIn => {}
                FtpAuthStatus::NeedAccount => return Err(FtpSessionOpenError::AccountIsNeeded),
                FtpAuthStatus::NotLoggedIn | FtpAuthStatus::NeedPassword => {
                    return Err(FtpSessionOpenError::NotLoggedIn);
                }
            },
        }
        info!("logged in to {} as {user}", self.peer_ip);

        if self.tls.is_some() && !self.data_protected {
            self.control
                .set_protection_buffer_size()
                .await
                .map_err(FtpSessionOpenError::DataProtectionFailed)?;
            self.control
                .set_private_protection()
                .await
                .map_err(FtpSessionOpenError::DataProtectionFailed)?;
            self.data_protected = true;
        }

        self.control
            .request_transfer_type(FtpTransferType::Image)
            .await?;
        Ok(())
    }

    pub async fn current_directory(&mut self) -> Result<String, FtpCommandError> {
        self.control.print_working_directory().await
    }

    pub async fn change_directory(&mut self, path: &str) -> Result<(), FtpFileStatError> {
        self.control.change_working_directory(path).await
    }

    pub async fn change_directory_up(&mut self) -> Result<(), FtpFileStatError> {
        self.control.change_to_parent_directory().await
    }

    pub async fn delete_file(&mut self, path: &str) -> Result<(), FtpFileStatError> {
        self.control.delete_file(path).await
    }

    pub async fn remove_dir(&mut self, path: &str) -> Result<(), FtpFileStatError> {
        self.control.remove_dir(path).await
    }

    /// List the current directory with MLSD.
    pub async fn list_directory(&mut self) -> Result<Vec<FtpFileFacts>, FtpFileListError> {
        let tcp_stream = self
            .connect_data()
            .await
            .map_err(FtpFileRetrieveStartError::from)?;
        self.control.start_list().await?;
        let data_stream = self
            .secure_data(tcp_stream)
            .await
            .map_err(FtpFileRetrieveStartError::from)?;

        let mut collector = FtpFileFactsCollector::default();
        let mut transfer = FtpLineDataTransfer::new(data_stream, &self.config.transfer);
        let read_result = tokio::time::timeout(
            self.config.transfer.list_all_timeout,
            transfer.read_to_end(&mut collector),
        )
        .await;
        drop(transfer);

        match read_result {
            Ok(Ok(_)) => {}
            Ok(Err(FtpLineDataReadError::AbortedByCallback)) => {
                let _ = self.wait_list_end().await;
                return Err(collector.into_error());
            }
            Ok(Err(e)) => {
                let _ = self.wait_list_end().await;
                return Err(e.into());
            }
            Err(_) => return Err(FtpFileListError::TimeoutToWaitAllData),
        }

        self.wait_list_end().await?;
        Ok(collector.entries)
    }

    async fn wait_list_end(&mut self) -> Result<(), FtpFileListError> {
        match tokio::time::timeout(
            self.config.transfer.end_wait_timeout,
            self.control.wait_list(),
        )
        .await
        {
            Ok(r) => r.map_err(FtpFileListError::from),
            Err(_) => Err(FtpFileListError::TimeoutToWaitEndReply),
        }
    }

    /// Download `path` into `writer`, returning the number of bytes received.
    pub async fn retrieve_file<W>(
        &mut self,
        path: &str,
        writer: &mut W,
    ) -> Result<u64, FtpFileRetrieveError>
    where
        W: AsyncWrite + Unpin,
    {
        let tcp_stream = self
            .connect_data()
            .await
            .map_err(FtpFileRetrieveStartError::from)?;
        self.control.start_retrieve(path).await?;
        let mut data_stream = self
            .secure_data(tcp_stream)
            .await
            .map_err(FtpFileRetrieveStartError::from)?;

        let copy_result = match crate::io::copy_with_idle_timeout(
            &mut data_stream,
            writer,
            self.config.transfer.data_idle_timeout,
        )
        .await
        {
            Ok(n) => writer.flush().await.map(|_| n),
            Err(e) => Err(e),
        };
        drop(data_stream);

        let end_result = match tokio::time::timeout(
            self.config.transfer.end_wait_timeout,
            self.control.wait_retrieve(),
        )
        .await
        {
            Ok(r) => r.map_err(FtpFileRetrieveError::from),
            Err(_) => Err(FtpFileRetrieveError::TimeoutToWaitEndReply),
        };

        let copied = copy_result.map_err(FtpFileRetrieveError::DataCopyFailed)?;
        end_result?;
        debug!("retrieved {copied} bytes of {path}");
        Ok(copied)
    }

    /// Upload the content of `reader` as `path`, returning the number of bytes sent.
    pub async fn store_file<R>(
        &mut self,
        path: &str,
        reader: &mut R,
    ) -> Result<u64, FtpFileStoreError>
    where
        R: AsyncRead + Unpin,
    {
        let tcp_stream = self
            .connect_data()
            .await
            .map_err(FtpFileStoreStartError::from)?;
        self.control.start_store(path).await?;
        let mut data_stream = self
            .secure_data(tcp_stream)
            .await
            .map_err(FtpFileStoreStartError::from)?;

        let copy_result = match crate::io::copy_with_idle_timeout(
            reader,
            &mut data_stream,
            self.config.transfer.data_idle_timeout,
        )
        .await
        {
            Ok(n) => data_stream.shutdown().await.map(|_| n),
            Err(e) => Err(e),
        };
        drop(data_stream);

        let end_result = match tokio::time::timeout(
            self.config.transfer.end_wait_timeout,
            self.control.wait_store(),
        )
        .await
        {
            Ok(r) => r.map_err(FtpFileStoreError::from),
            Err(_) => Err(FtpFileStoreError::TimeoutToWaitEndReply),
        };

        let copied = copy_result.map_err(FtpFileStoreError::DataCopyFailed)?;
        end_result?;
        debug!("stored {copied} bytes as {path}");
        Ok(copied)
    }

    /// Send QUIT and close the control connection.
    ///
    /// The connection is closed even if the server does not answer QUIT properly.
    pub async fn quit_and_close(self) -> Result<(), FtpCommandError> {
        let mut control = self.control;
        let r = control.send_quit().await;
        let mut stream = control.into_inner();
        let _ = stream.shutdown().await;
        r
    }
}

#[derive(Default)]
struct FtpFileFactsCollector {
    entries: Vec<FtpFileFacts>,
    error: Option<FtpFileFactsParseError>,
}

impl FtpFileFactsCollector {
    fn into_error(self) -> FtpFileListError {
        match self.error {
            Some(e) => FtpFileListError::InvalidEntry(e),
            None => FtpFileListError::DataReadFailed(FtpLineDataReadError::AbortedByCallback),
        }
    }
}

#[async_trait]
impl FtpLineDataReceiver for FtpFileFactsCollector {
    async fn recv_line(&mut self, line: &str) {
        match FtpFileFacts::parse_line(line) {
            Ok(ff) => self.entries.push(ff),
            Err(e) => {
                debug!("invalid MLSD line {line:?}: {e}");
                self.error = Some(e);
            }
        }
    }

    fn should_return_early(&self) -> bool {
        self.error.is_some()
    }
}
