/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

use std::net::SocketAddr;

use log::debug;
use tokio::net::TcpStream;

use crate::FtpClient;
use crate::error::{FtpCommandError, FtpTransferSetupError};
use crate::stream::FtpStream;

mod line;
pub use line::FtpLineDataReceiver;
pub(crate) use line::FtpLineDataTransfer;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum FtpTransferType {
    Ascii,
    Image,
}

impl FtpClient {
    async fn request_passive_addr(&mut self) -> Result<SocketAddr, FtpTransferSetupError> {
        if self.config.always_try_epsv {
            match self.control.request_epsv_port().await {
                Ok(port) => return Ok(SocketAddr::new(self.peer_ip, port)),
                Err(
                    FtpCommandError::CommandNotImplemented(_)
                    | FtpCommandError::RejectedCommandSyntax(_),
                ) => {
                    debug!("EPSV is not supported by {}, fall back to PASV", self.peer_ip);
                }
                Err(e) => return Err(e.into()),
            }
        }

        match self.control.request_pasv_port().await {
            // the address in the reply is often a private one behind NAT
            Ok(addr) => Ok(SocketAddr::new(self.peer_ip, addr.port())),
            Err(FtpCommandError::CommandNotImplemented(_)) => {
                Err(FtpTransferSetupError::PassiveModeUnsupported)
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Open the TCP part of a passive mode data connection.
    pub(crate) async fn connect_data(&mut self) -> Result<TcpStream, FtpTransferSetupError> {
        let addr = self.request_passive_addr().await?;
        debug!("connecting data channel to {addr}");
        match tokio::time::timeout(
            self.config.transfer.data_connect_timeout,
            TcpStream::connect(addr),
        )
        .await
        {
            Ok(Ok(stream)) => Ok(stream),
            Ok(Err(e)) => Err(FtpTransferSetupError::ConnectFailed(e)),
            Err(_) => Err(FtpTransferSetupError::ConnectTimedOut),
        }
    }

    /// Wrap the data connection in TLS if data protection has been negotiated.
    ///
    /// Must be called after the server has accepted the transfer command.
    pub(crate) async fn secure_data(
        &self,
        tcp_stream: TcpStream,
    ) -> Result<FtpStream, FtpTransferSetupError> {
        let Some(tls) = self.tls.as_ref().filter(|_| self.data_protected) else {
            return Ok(FtpStream::Plain(tcp_stream));
        };

        match tokio::time::timeout(
            self.config.tls_handshake_timeout,
            tls.handshake(tcp_stream),
        )
        .await
        {
            Ok(Ok(stream)) => Ok(stream),
            Ok(Err(e)) => Err(FtpTransferSetupError::TlsHandshakeFailed(e)),
            Err(_) => Err(FtpTransferSetupError::TlsHandshakeTimedOut),
        }
    }
}
