/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

use std::io;
use std::net::IpAddr;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use rustls_pki_types::ServerName;
use tokio::io::{AsyncRead, AsyncWrite, ReadBuf};
use tokio::net::TcpStream;
use tokio_rustls::TlsConnector;
use tokio_rustls::client::TlsStream;

/// A control or data connection, either in clear text or wrapped in TLS.
pub enum FtpStream {
    Plain(TcpStream),
    Tls(Box<TlsStream<TcpStream>>),
}

impl FtpStream {
    pub fn is_tls(&self) -> bool {
        matches!(self, FtpStream::Tls(_))
    }
}

impl AsyncRead for FtpStream {
    fn poll_read(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        match self.get_mut() {
            FtpStream::Plain(stream) => Pin::new(stream).poll_read(cx, buf),
            FtpStream::Tls(tls_stream) => Pin::new(tls_stream).poll_read(cx, buf),
        }
    }
}

impl AsyncWrite for FtpStream {
    fn poll_write(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<io::Result<usize>> {
        match self.get_mut() {
            FtpStream::Plain(stream) => Pin::new(stream).poll_write(cx, buf),
            FtpStream::Tls(tls_stream) => Pin::new(tls_stream).poll_write(cx, buf),
        }
    }

    fn poll_flush(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        match self.get_mut() {
            FtpStream::Plain(stream) => Pin::new(stream).poll_flush(cx),
            FtpStream::Tls(tls_stream) => Pin::new(tls_stream).poll_flush(cx),
        }
    }

    fn poll_shutdown(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        match self.get_mut() {
            FtpStream::Plain(stream) => Pin::new(stream).poll_shutdown(cx),
            FtpStream::Tls(tls_stream) => Pin::new(tls_stream).poll_shutdown(cx),
        }
    }
}

/// TLS parameters shared by the control connection and every data connection.
#[derive(Clone)]
pub(crate) struct FtpTlsClient {
    connector: TlsConnector,
    server_name: ServerName<'static>,
}

impl FtpTlsClient {
    /// The host is used as the server name, falling back to the peer address
    /// when it is not a valid DNS name.
    pub(crate) fn new(config: Arc<rustls::ClientConfig>, host: &str, peer_ip: IpAddr) -> Self {
        let server_name = ServerName::try_from(host.to_string())
            .unwrap_or_else(|_| ServerName::IpAddress(peer_ip.into()));
        FtpTlsClient {
            connector: TlsConnector::from(config),
            server_name,
        }
    }

    pub(crate) async fn handshake(&self, tcp_stream: TcpStream) -> io::Result<FtpStream> {
        let tls_stream = self
            .connector
            .connect(self.server_name.clone(), tcp_stream)
            .await?;
        Ok(FtpStream::Tls(Box::new(tls_stream)))
    }
}
