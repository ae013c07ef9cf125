/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

use std::path::PathBuf;

use thiserror::Error;

use crate::FtpEngineError;

#[derive(Debug, Error)]
pub enum FtpConfigError {
    #[error("no rustls crypto provider available")]
    NoCryptoProvider,
    #[error("unsupported tls protocol versions: {0}")]
    UnsupportedProtocolVersions(rustls::Error),
    #[error("failed to load native root certificates: {0}")]
    LoadNativeCerts(rustls_native_certs::Error),
    #[error("no usable native root certificate found")]
    NoRootCertificate,
    #[error("certificate bypass is denied in this build")]
    InsecureTrustDenied,
}

#[derive(Debug, Error)]
pub enum FtpPreconditionError {
    #[error("session is not configured")]
    NotConfigured,
    #[error("session is not connected")]
    NotConnected,
    #[error("session is not logged in")]
    NotLoggedIn,
    #[error("session is still connected")]
    StillConnected,
    #[error("session is already connected")]
    AlreadyConnected,
    #[error("empty {0}")]
    EmptyParameter(&'static str),
    #[error("invalid port")]
    InvalidPort,
}

#[derive(Debug, Error)]
pub enum FtpSessionError {
    #[error("config error: {0}")]
    Config(#[from] FtpConfigError),
    #[error("precondition failed: {0}")]
    Precondition(#[from] FtpPreconditionError),
    #[error("transport error: {0}")]
    Transport(FtpEngineError),
    #[error("authentication failed: {0}")]
    Auth(FtpEngineError),
    #[error("{1} {path} not found", path = .0.display())]
    NotFound(PathBuf, &'static str),
    #[error("remote directory {0} has an empty listing")]
    EmptyListing(String),
    #[error("transfer failed: {0}")]
    Transfer(FtpEngineError),
    #[error("delete failed: {0}")]
    Delete(FtpEngineError),
}
