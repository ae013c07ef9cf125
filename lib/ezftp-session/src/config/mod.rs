/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

use std::fmt;
use std::str::FromStr;

use ezftp_proto::FtpClientConfig;

#[cfg(feature = "yaml")]
mod yaml;

pub const FTP_DEFAULT_PORT: u16 = 21;
pub const FTPS_IMPLICIT_DEFAULT_PORT: u16 = 990;

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum FtpSecurityMode {
    #[default]
    Plain,
    ImplicitTls,
    ExplicitTls,
}

impl FtpSecurityMode {
    pub fn is_tls(&self) -> bool {
        !matches!(self, FtpSecurityMode::Plain)
    }

    pub fn default_port(&self) -> u16 {
        match self {
            FtpSecurityMode::ImplicitTls => FTPS_IMPLICIT_DEFAULT_PORT,
            _ => FTP_DEFAULT_PORT,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FtpSecurityMode::Plain => "plain",
            FtpSecurityMode::ImplicitTls => "implicit",
            FtpSecurityMode::ExplicitTls => "explicit",
        }
    }
}

impl fmt::Display for FtpSecurityMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FtpSecurityMode {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "plain" | "none" | "ftp" => Ok(FtpSecurityMode::Plain),
            "implicit" | "implicit_tls" | "ftps" => Ok(FtpSecurityMode::ImplicitTls),
            "explicit" | "explicit_tls" | "ftpes" => Ok(FtpSecurityMode::ExplicitTls),
            _ => Err(()),
        }
    }
}

/// What a batch operation does when one of its items fails.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum FtpBatchPolicy {
    #[default]
    AbortOnError,
    /// Attempt every item, then report the first failure.
    ContinueOnError,
}

impl FromStr for FtpBatchPolicy {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "abort" | "abort_on_error" => Ok(FtpBatchPolicy::AbortOnError),
            "continue" | "continue_on_error" => Ok(FtpBatchPolicy::ContinueOnError),
            _ => Err(()),
        }
    }
}

#[derive(Clone, Default)]
pub struct FtpSessionConfig {
    pub host: String,
    /// Use the default port of the security mode if not set.
    pub port: Option<u16>,
    pub username: String,
    pub password: String,
    pub security: FtpSecurityMode,
    /// Skip all certificate checks of TLS connections.
    pub certificate_bypass: bool,
    pub batch_policy: FtpBatchPolicy,
    pub client: FtpClientConfig,
}

impl fmt::Debug for FtpSessionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FtpSessionConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("password", &"******")
            .field("security", &self.security)
            .field("certificate_bypass", &self.certificate_bypass)
            .field("batch_policy", &self.batch_policy)
            .field("client", &self.client)
            .finish()
    }
}

impl FtpSessionConfig {
    pub fn new(host: &str, username: &str, password: &str) -> Self {
        FtpSessionConfig {
            host: host.to_string(),
            username: username.to_string(),
            password: password.to_string(),
            ..Default::default()
        }
    }

    #[inline]
    pub fn port(&self) -> u16 {
        self.port.unwrap_or_else(|| self.security.default_port())
    }
}
