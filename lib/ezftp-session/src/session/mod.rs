/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

use log::{error, info};

use crate::{
    FtpEngine, FtpPreconditionError, FtpSessionConfig, FtpSessionError, LocalFileSystem,
    TokioLocalFileSystem,
};

mod ops;
pub use ops::{FtpTransferDirection, FtpTransferRequest};

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum FtpSessionPhase {
    #[default]
    Unconfigured,
    Configured,
    Connected,
    Authenticated,
}

impl FtpSessionPhase {
    pub fn is_configured(&self) -> bool {
        !matches!(self, FtpSessionPhase::Unconfigured)
    }

    pub fn is_connected(&self) -> bool {
        matches!(
            self,
            FtpSessionPhase::Connected | FtpSessionPhase::Authenticated
        )
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self, FtpSessionPhase::Authenticated)
    }

    fn configure(self) -> Result<Self, FtpPreconditionError> {
        match self {
            FtpSessionPhase::Unconfigured | FtpSessionPhase::Configured => {
                Ok(FtpSessionPhase::Configured)
            }
            FtpSessionPhase::Connected | FtpSessionPhase::Authenticated => {
                Err(FtpPreconditionError::StillConnected)
            }
        }
    }

    fn connect(self) -> Result<Self, FtpPreconditionError> {
        match self {
            FtpSessionPhase::Configured => Ok(FtpSessionPhase::Connected),
            FtpSessionPhase::Unconfigured => Err(FtpPreconditionError::NotConfigured),
            FtpSessionPhase::Connected | FtpSessionPhase::Authenticated => {
                Err(FtpPreconditionError::AlreadyConnected)
            }
        }
    }

    fn login(self) -> Result<Self, FtpPreconditionError> {
        if self.is_connected() {
            Ok(FtpSessionPhase::Authenticated)
        } else {
            Err(FtpPreconditionError::NotConnected)
        }
    }

    fn require_authenticated(self) -> Result<(), FtpPreconditionError> {
        match self {
            FtpSessionPhase::Authenticated => Ok(()),
            FtpSessionPhase::Connected => Err(FtpPreconditionError::NotLoggedIn),
            FtpSessionPhase::Unconfigured | FtpSessionPhase::Configured => {
                Err(FtpPreconditionError::NotConnected)
            }
        }
    }
}

pub(crate) fn log_failure(operation: &'static str, e: FtpSessionError) -> FtpSessionError {
    error!("ftp {operation} failed: {e}");
    e
}

fn require_non_empty(value: &str, name: &'static str) -> Result<(), FtpPreconditionError> {
    if value.is_empty() {
        Err(FtpPreconditionError::EmptyParameter(name))
    } else {
        Ok(())
    }
}

/// A stateful connection to one FTP server.
pub struct FtpSession<E, F = TokioLocalFileSystem> {
    engine: E,
    fs: F,
    config: FtpSessionConfig,
    phase: FtpSessionPhase,
}

impl<E: FtpEngine> FtpSession<E> {
    pub fn new(engine: E) -> Self {
        FtpSession::with_config(engine, FtpSessionConfig::default())
    }

    pub fn with_config(engine: E, config: FtpSessionConfig) -> Self {
        FtpSession::with_local_fs(engine, TokioLocalFileSystem, config)
    }
}

impl<E, F> FtpSession<E, F>
where
    E: FtpEngine,
    F: LocalFileSystem,
{
    pub fn with_local_fs(engine: E, fs: F, config: FtpSessionConfig) -> Self {
        FtpSession {
            engine,
            fs,
            config,
            phase: FtpSessionPhase::Unconfigured,
        }
    }

    #[inline]
    pub fn phase(&self) -> FtpSessionPhase {
        self.phase
    }

    #[inline]
    pub fn is_configured(&self) -> bool {
        self.phase.is_configured()
    }

    #[inline]
    pub fn is_connected(&self) -> bool {
        self.phase.is_connected()
    }

    #[inline]
    pub fn is_authenticated(&self) -> bool {
        self.phase.is_authenticated()
    }

    #[inline]
    pub fn config(&self) -> &FtpSessionConfig {
        &self.config
    }

    #[inline]
    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// Replace the connection parameters. The session must be configured again.
    pub fn set_config(&mut self, config: FtpSessionConfig) -> Result<(), FtpSessionError> {
        if self.phase.is_connected() {
            return Err(log_failure(
                "set config",
                FtpPreconditionError::StillConnected.into(),
            ));
        }
        self.config = config;
        self.phase = FtpSessionPhase::Unconfigured;
        Ok(())
    }

    /// Apply the security settings to the engine.
    pub fn configure(&mut self) -> Result<(), FtpSessionError> {
        let next = self
            .phase
            .configure()
            .map_err(|e| log_failure("configure", e.into()))?;

        let tls_config = match crate::tls::build_client_config(&self.config) {
            Ok(c) => c,
            Err(e) => {
                self.phase = FtpSessionPhase::Unconfigured;
                return Err(log_failure("configure", e.into()));
            }
        };
        self.engine.set_security_mode(self.config.security);
        self.engine.set_tls_config(tls_config);
        self.phase = next;
        info!(
            "ftp session to {} configured with security mode {}",
            self.config.host, self.config.security
        );
        Ok(())
    }

    fn check_connect_params(&self) -> Result<(), FtpPreconditionError> {
        require_non_empty(&self.config.host, "host")?;
        require_non_empty(&self.config.username, "username")?;
        require_non_empty(&self.config.password, "password")?;
        if self.config.port() == 0 {
            return Err(FtpPreconditionError::InvalidPort);
        }
        Ok(())
    }

    pub async fn connect(&mut self) -> Result<(), FtpSessionError> {
        self.check_connect_params()
            .map_err(|e| log_failure("connect", e.into()))?;
        let next = self
            .phase
            .connect()
            .map_err(|e| log_failure("connect", e.into()))?;

        let port = self.config.port();
        self.engine
            .connect(&self.config.host, port)
            .await
            .map_err(|e| log_failure("connect", FtpSessionError::Transport(e)))?;
        self.phase = next;
        info!("connected to ftp server {}:{port}", self.config.host);
        Ok(())
    }

    pub async fn login(&mut self) -> Result<(), FtpSessionError> {
        require_non_empty(&self.config.username, "username")
            .and_then(|_| require_non_empty(&self.config.password, "password"))
            .map_err(|e| log_failure("login", e.into()))?;
        let next = self
            .phase
            .login()
            .map_err(|e| log_failure("login", e.into()))?;

        match self
            .engine
            .login(&self.config.username, &self.config.password)
            .await
        {
            Ok(_) => {
                self.phase = next;
                info!(
                    "logged in to ftp server {} as {}",
                    self.config.host, self.config.username
                );
                Ok(())
            }
            Err(e) => {
                self.phase = FtpSessionPhase::Connected;
                let e = if e.is_auth_rejected() {
                    FtpSessionError::Auth(e)
                } else {
                    FtpSessionError::Transport(e)
                };
                Err(log_failure("login", e))
            }
        }
    }

    /// Quit and close the connection. Local state is cleared even on error.
    pub async fn disconnect(&mut self) -> Result<(), FtpSessionError> {
        if !self.phase.is_connected() {
            return Err(log_failure(
                "disconnect",
                FtpPreconditionError::NotConnected.into(),
            ));
        }

        let r = self.engine.disconnect(true).await;
        self.phase = FtpSessionPhase::Unconfigured;
        match r {
            Ok(_) => {
                info!("disconnected from ftp server {}", self.config.host);
                Ok(())
            }
            Err(e) => Err(log_failure("disconnect", FtpSessionError::Transport(e))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{MockCall, MockFileSystem, MockFtpEngine};
    use crate::{FtpPreconditionError, FtpSecurityMode};

    type MockSession = FtpSession<MockFtpEngine, MockFileSystem>;

    fn session(engine: MockFtpEngine) -> MockSession {
        FtpSession::with_local_fs(
            engine,
            MockFileSystem::default(),
            FtpSessionConfig::new("ftp.example.net", "alice", "secret"),
        )
    }

    #[test]
    fn phase_predicates() {
        use FtpSessionPhase::*;
        for phase in [Unconfigured, Configured, Connected, Authenticated] {
            if phase.is_authenticated() {
                assert!(phase.is_connected());
            }
            if phase.is_connected() {
                assert!(phase.is_configured());
            }
        }
        assert!(!Unconfigured.is_configured());
        assert!(Configured.is_configured() && !Configured.is_connected());
    }

    #[test]
    fn configure_plain() {
        let mut s = session(MockFtpEngine::default());
        s.configure().unwrap();
        assert_eq!(s.phase(), FtpSessionPhase::Configured);
        assert_eq!(
            s.engine().calls,
            [
                MockCall::SetSecurityMode(FtpSecurityMode::Plain),
                MockCall::SetTlsConfig(false)
            ]
        );
        // idempotent
        s.configure().unwrap();
        assert_eq!(s.phase(), FtpSessionPhase::Configured);
    }

    #[tokio::test]
    async fn full_lifecycle() {
        let mut s = session(MockFtpEngine::default());
        s.configure().unwrap();
        s.connect().await.unwrap();
        assert!(s.is_connected() && !s.is_authenticated());
        s.login().await.unwrap();
        assert!(s.is_authenticated());
        assert!(s.engine().calls.contains(&MockCall::Connect(
            "ftp.example.net".to_string(),
            21
        )));

        s.disconnect().await.unwrap();
        assert_eq!(s.phase(), FtpSessionPhase::Unconfigured);
        assert!(!s.is_connected() && !s.is_authenticated());
        assert_eq!(s.engine().calls.last(), Some(&MockCall::Disconnect(true)));
    }

    #[tokio::test]
    async fn connect_without_configure() {
        let mut s = session(MockFtpEngine::default());
        assert!(matches!(
            s.connect().await,
            Err(FtpSessionError::Precondition(
                FtpPreconditionError::NotConfigured
            ))
        ));
        assert!(s.engine().calls.is_empty());
    }

    #[tokio::test]
    async fn connect_empty_params() {
        let mut s = FtpSession::with_local_fs(
            MockFtpEngine::default(),
            MockFileSystem::default(),
            FtpSessionConfig::new("ftp.example.net", "alice", ""),
        );
        s.configure().unwrap();
        assert!(matches!(
            s.connect().await,
            Err(FtpSessionError::Precondition(
                FtpPreconditionError::EmptyParameter("password")
            ))
        ));

        let mut config = FtpSessionConfig::new("ftp.example.net", "alice", "secret");
        config.port = Some(0);
        s.set_config(config).unwrap();
        s.configure().unwrap();
        assert!(matches!(
            s.connect().await,
            Err(FtpSessionError::Precondition(
                FtpPreconditionError::InvalidPort
            ))
        ));
        assert_eq!(s.engine().count(|c| matches!(c, MockCall::Connect(..))), 0);
    }

    #[tokio::test]
    async fn connect_twice() {
        let mut s = session(MockFtpEngine::default());
        s.configure().unwrap();
        s.connect().await.unwrap();
        assert!(matches!(
            s.connect().await,
            Err(FtpSessionError::Precondition(
                FtpPreconditionError::AlreadyConnected
            ))
        ));
        assert!(matches!(
            s.configure(),
            Err(FtpSessionError::Precondition(
                FtpPreconditionError::StillConnected
            ))
        ));
        assert!(s.set_config(FtpSessionConfig::default()).is_err());
        assert_eq!(s.phase(), FtpSessionPhase::Connected);
    }

    #[tokio::test]
    async fn connect_failure_keeps_state() {
        let engine = MockFtpEngine {
            fail_connect: true,
            ..Default::default()
        };
        let mut s = session(engine);
        s.configure().unwrap();
        assert!(matches!(
            s.connect().await,
            Err(FtpSessionError::Transport(_))
        ));
        assert_eq!(s.phase(), FtpSessionPhase::Configured);
    }

    #[tokio::test]
    async fn login_requires_connect() {
        let mut s = session(MockFtpEngine::default());
        s.configure().unwrap();
        assert!(matches!(
            s.login().await,
            Err(FtpSessionError::Precondition(
                FtpPreconditionError::NotConnected
            ))
        ));
        assert!(!s.is_authenticated());
        assert_eq!(s.engine().count(|c| matches!(c, MockCall::Login(..))), 0);
    }

    #[tokio::test]
    async fn login_rejected() {
        let engine = MockFtpEngine {
            reject_login: true,
            ..Default::default()
        };
        let mut s = session(engine);
        s.configure().unwrap();
        s.connect().await.unwrap();
        assert!(matches!(s.login().await, Err(FtpSessionError::Auth(_))));
        assert_eq!(s.phase(), FtpSessionPhase::Connected);
    }

    #[tokio::test]
    async fn login_transport_failure() {
        let engine = MockFtpEngine {
            fail_login: true,
            ..Default::default()
        };
        let mut s = session(engine);
        s.configure().unwrap();
        s.connect().await.unwrap();
        assert!(matches!(
            s.login().await,
            Err(FtpSessionError::Transport(_))
        ));
        assert_eq!(s.phase(), FtpSessionPhase::Connected);
    }

    #[tokio::test]
    async fn relogin() {
        let mut s = session(MockFtpEngine::default());
        s.configure().unwrap();
        s.connect().await.unwrap();
        s.login().await.unwrap();
        s.login().await.unwrap();
        assert!(s.is_authenticated());
        assert_eq!(s.engine().count(|c| matches!(c, MockCall::Login(..))), 2);
    }

    #[tokio::test]
    async fn disconnect_not_connected() {
        let mut s = session(MockFtpEngine::default());
        s.configure().unwrap();
        assert!(matches!(
            s.disconnect().await,
            Err(FtpSessionError::Precondition(
                FtpPreconditionError::NotConnected
            ))
        ));
        assert_eq!(s.phase(), FtpSessionPhase::Configured);
    }

    #[tokio::test]
    async fn disconnect_error_clears_state() {
        let engine = MockFtpEngine {
            fail_disconnect: true,
            ..Default::default()
        };
        let mut s = session(engine);
        s.configure().unwrap();
        s.connect().await.unwrap();
        s.login().await.unwrap();
        assert!(matches!(
            s.disconnect().await,
            Err(FtpSessionError::Transport(_))
        ));
        assert_eq!(s.phase(), FtpSessionPhase::Unconfigured);
        assert!(!s.is_connected() && !s.is_authenticated());
    }
}
