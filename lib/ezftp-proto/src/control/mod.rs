/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

use std::net::SocketAddr;

use tokio::io::{AsyncRead, AsyncWrite, BufStream};

use crate::FtpControlConfig;
use crate::error::{
    FtpAuthStatus, FtpCommandError, FtpFileRetrieveStartError, FtpFileStatError,
    FtpFileStoreStartError, FtpTransferServerError,
};
use crate::transfer::FtpTransferType;

mod response;

mod command;
pub use command::FtpCommand;

pub(crate) struct FtpControlChannel<T>
where
    T: AsyncRead + AsyncWrite,
{
    config: FtpControlConfig,
    stream: BufStream<T>,
}

impl<T> FtpControlChannel<T>
where
    T: AsyncRead + AsyncWrite + Unpin,
{
    pub(crate) fn new(stream: T, config: FtpControlConfig) -> Self {
        FtpControlChannel {
            config,
            stream: BufStream::new(stream),
        }
    }

    /// Give back the underlying stream, used when upgrading to TLS.
    ///
    /// Only call this when no reply is pending, or buffered data will be lost.
    pub(crate) fn into_inner(self) -> T {
        self.stream.into_inner()
    }

    pub(crate) async fn wait_greetings(&mut self) -> Result<(), FtpCommandError> {
        loop {
            let reply = self.read_raw_response().await?;
            return match reply.code() {
                120 => continue,
                220 => Ok(()),
                421 => Err(FtpCommandError::ServiceNotAvailable),
                n => Err(FtpCommandError::UnexpectedReplyCode(
                    FtpCommand::GREETING,
                    n,
                )),
            };
        }
    }

    pub(crate) async fn request_auth_tls(&mut self) -> Result<(), FtpCommandError> {
        let cmd = FtpCommand::AUTH_TLS;
        self.send_cmd(cmd)
            .await
            .map_err(FtpCommandError::SendFailed)?;

        let reply = self.timed_read_raw_response("request auth tls").await?;
        match reply.code() {
            234 | 334 => Ok(()),
            421 => Err(FtpCommandError::ServiceNotAvailable),
            n @ (431 | 500 | 501 | 502 | 504 | 534) => {
                Err(FtpCommandError::SecurityRejected(cmd, n))
            }
            n => Err(FtpCommandError::UnexpectedReplyCode(cmd, n)),
        }
    }

    pub(crate) async fn set_protection_buffer_size(&mut self) -> Result<(), FtpCommandError> {
        let cmd = FtpCommand::PBSZ;
        self.send_cmd1(cmd, "0")
            .await
            .map_err(FtpCommandError::SendFailed)?;

        let reply = self
            .timed_read_raw_response("set protection buffer size")
            .await?;
        match reply.code() {
            200 => Ok(()),
            500 | 501 => Err(FtpCommandError::RejectedCommandSyntax(cmd)),
            503 => Err(FtpCommandError::BadCommandSequence(cmd)),
            530 => Err(FtpCommandError::NotLoggedIn),
            421 => Err(FtpCommandError::ServiceNotAvailable),
            n => Err(FtpCommandError::UnexpectedReplyCode(cmd, n)),
        }
    }

    pub(crate) async fn set_private_protection(&mut self) -> Result<(), FtpCommandError> {
        let cmd = FtpCommand::PROT_P;
        self.send_cmd(cmd)
            .await
            .map_err(FtpCommandError::SendFailed)?;

        let reply = self
            .timed_read_raw_response("set private protection")
            .await?;
        match reply.code() {
            200 => Ok(()),
            500 | 501 => Err(FtpCommandError::RejectedCommandSyntax(cmd)),
            503 => Err(FtpCommandError::BadCommandSequence(cmd)),
            530 => Err(FtpCommandError::NotLoggedIn),
            421 => Err(FtpCommandError::ServiceNotAvailable),
            n @ (431 | 504 | 534 | 536) => Err(FtpCommandError::SecurityRejected(cmd, n)),
            n => Err(FtpCommandError::UnexpectedReplyCode(cmd, n)),
        }
    }

    pub(crate) async fn send_username(
        &mut self,
        name: &str,
    ) -> Result<FtpAuthStatus, FtpCommandError> {
        let cmd = FtpCommand::USER;
        self.send_cmd1(cmd, name)
            .await
            .map_err(FtpCommandError::SendFailed)?;

        let reply = self.timed_read_raw_response("send username").await?;
        match reply.code() {
            500 | 501 => Err(FtpCommandError::RejectedCommandSyntax(cmd)),
            530 => Ok(FtpAuthStatus::NotLoggedIn),
            230 => Ok(FtpAuthStatus::LoggedIn),
            331 => Ok(FtpAuthStatus::NeedPassword),
            332 => Ok(FtpAuthStatus::NeedAccount),
            421 => Err(FtpCommandError::ServiceNotAvailable),
            n => Err(FtpCommandError::UnexpectedReplyCode(cmd, n)),
        }
    }

    pub(crate) async fn send_password(
        &mut self,
        pass: &str,
    ) -> Result<FtpAuthStatus, FtpCommandError> {
        let cmd = FtpCommand::PASS;
        self.send_cmd1(cmd, pass)
            .await
            .map_err(FtpCommandError::SendFailed)?;

        let reply = self.timed_read_raw_response("send password").await?;
        match reply.code() {
            500 | 501 => Err(FtpCommandError::RejectedCommandSyntax(cmd)),
            503 => Err(FtpCommandError::BadCommandSequence(cmd)),
            530 => Ok(FtpAuthStatus::NotLoggedIn),
            202 => Err(FtpCommandError::CommandNotImplemented(cmd)), // not fatal but unexpected
            230 => Ok(FtpAuthStatus::LoggedIn),
            332 => Ok(FtpAuthStatus::NeedAccount),
            421 => Err(FtpCommandError::ServiceNotAvailable),
            n => Err(FtpCommandError::UnexpectedReplyCode(cmd, n)),
        }
    }

    pub(crate) async fn send_quit(&mut self) -> Result<(), FtpCommandError> {
        let cmd = FtpCommand::QUIT;
        self.send_cmd(cmd)
            .await
            .map_err(FtpCommandError::SendFailed)?;

        let reply = self.timed_read_raw_response("send quit").await?;
        match reply.code() {
            500 => Err(FtpCommandError::RejectedCommandSyntax(cmd)),
            221 => Ok(()),
            n => Err(FtpCommandError::UnexpectedReplyCode(cmd, n)),
        }
    }

    pub(crate) async fn print_working_directory(&mut self) -> Result<String, FtpCommandError> {
        let cmd = FtpCommand::PWD;
        self.send_cmd(cmd)
            .await
            .map_err(FtpCommandError::SendFailed)?;

        let reply = self
            .timed_read_raw_response("print working directory")
            .await?;
        match reply.code() {
            257 => reply
                .parse_pwd_257_reply()
                .ok_or(FtpCommandError::InvalidReplySyntax(cmd, 257)),
            500 | 501 => Err(FtpCommandError::RejectedCommandSyntax(cmd)),
            502 => Err(FtpCommandError::CommandNotImplemented(cmd)),
            530 => Err(FtpCommandError::NotLoggedIn),
            421 => Err(FtpCommandError::ServiceNotAvailable),
            n => Err(FtpCommandError::UnexpectedReplyCode(cmd, n)),
        }
    }

    pub(crate) async fn change_working_directory(
        &mut self,
        path: &str,
    ) -> Result<(), FtpFileStatError> {
        let cmd = FtpCommand::CWD;
        self.send_cmd1(cmd, path)
            .await
            .map_err(FtpCommandError::SendFailed)?;

        let reply = self
            .timed_read_raw_response("change working directory")
            .await
            .map_err(FtpCommandError::RecvFailed)?;
        match reply.code() {
            200 | 250 => Ok(()),
            500 | 501 => Err(FtpCommandError::RejectedCommandSyntax(cmd).into()),
            502 => Err(FtpCommandError::CommandNotImplemented(cmd).into()),
            530 => Err(FtpCommandError::NotLoggedIn.into()),
            550 => Err(FtpFileStatError::FileUnavailable),
            421 => Err(FtpFileStatError::ServiceNotAvailable),
            n => Err(FtpCommandError::UnexpectedReplyCode(cmd, n).into()),
        }
    }

    pub(crate) async fn change_to_parent_directory(&mut self) -> Result<(), FtpFileStatError> {
        let cmd = FtpCommand::CDUP;
        self.send_cmd(cmd)
            .await
            .map_err(FtpCommandError::SendFailed)?;

        let reply = self
            .timed_read_raw_response("change to parent directory")
            .await
            .map_err(FtpCommandError::RecvFailed)?;
        match reply.code() {
            200 | 250 => Ok(()),
            500 | 501 => Err(FtpCommandError::RejectedCommandSyntax(cmd).into()),
            502 => Err(FtpCommandError::CommandNotImplemented(cmd).into()),
            530 => Err(FtpCommandError::NotLoggedIn.into()),
            550 => Err(FtpFileStatError::FileUnavailable),
            421 => Err(FtpFileStatError::ServiceNotAvailable),
            n => Err(FtpCommandError::UnexpectedReplyCode(cmd, n).into()),
        }
    }

    pub(crate) async fn delete_file(&mut self, path: &str) -> Result<(), FtpFileStatError> {
        let cmd = FtpCommand::DELE;
        self.send_cmd1(cmd, path)
            .await
            .map_err(FtpCommandError::SendFailed)?;

        let reply = self
            .timed_read_raw_response("delete file")
            .await
            .map_err(FtpCommandError::RecvFailed)?;
        match reply.code() {
            500 | 501 => Err(FtpCommandError::RejectedCommandSyntax(cmd).into()),
            502 => Err(FtpCommandError::CommandNotImplemented(cmd).into()),
            530 => Err(FtpCommandError::NotLoggedIn.into()),
            550 => Err(FtpFileStatError::FileUnavailable),
            250 => Ok(()),
            421 => Err(FtpFileStatError::ServiceNotAvailable),
            450 => Err(FtpFileStatError::FileUnavailable),
            n => Err(FtpCommandError::UnexpectedReplyCode(cmd, n).into()),
        }
    }

    pub(crate) async fn remove_dir(&mut self, path: &str) -> Result<(), FtpFileStatError> {
        let cmd = FtpCommand::RMD;
        self.send_cmd1(cmd, path)
            .await
            .map_err(FtpCommandError::SendFailed)?;

        let reply = self
            .timed_read_raw_response("remove dir")
            .await
            .map_err(FtpCommandError::RecvFailed)?;
        match reply.code() {
            500 | 501 => Err(FtpCommandError::RejectedCommandSyntax(cmd).into()),
            502 => Err(FtpCommandError::CommandNotImplemented(cmd).into()),
            530 => Err(FtpCommandError::NotLoggedIn.into()),
            550 => Err(FtpFileStatError::FileUnavailable),
            250 => Ok(()),
            421 => Err(FtpFileStatError::ServiceNotAvailable),
            n => Err(FtpCommandError::UnexpectedReplyCode(cmd, n).into()),
        }
    }

    pub(crate) async fn request_pasv_port(&mut self) -> Result<SocketAddr, FtpCommandError> {
        let cmd = FtpCommand::PASV;
        self.send_cmd(cmd)
            .await
            .map_err(FtpCommandError::SendFailed)?;

        let reply = self.timed_read_raw_response("request pasv port").await?;
        match reply.code() {
            500 | 501 => Err(FtpCommandError::RejectedCommandSyntax(cmd)),
            502 => Err(FtpCommandError::CommandNotImplemented(cmd)),
            530 => Err(FtpCommandError::NotLoggedIn),
            227 => match reply.parse_pasv_227_reply() {
                Some(addr) => Ok(addr),
                None => Err(FtpCommandError::InvalidReplySyntax(cmd, 227)),
            },
            421 => Err(FtpCommandError::ServiceNotAvailable),
            n => Err(FtpCommandError::UnexpectedReplyCode(cmd, n)),
        }
    }

    pub(crate) async fn request_epsv_port(&mut self) -> Result<u16, FtpCommandError> {
        let cmd = FtpCommand::EPSV;
        self.send_cmd(cmd)
            .await
            .map_err(FtpCommandError::SendFailed)?;

        let reply = self.timed_read_raw_response("request epsv port").await?;
        match reply.code() {
            500 | 501 => Err(FtpCommandError::RejectedCommandSyntax(cmd)),
            502 | 522 => Err(FtpCommandError::CommandNotImplemented(cmd)),
            530 => Err(FtpCommandError::NotLoggedIn),
            229 => match reply.parse_epsv_229_reply() {
                Some(port) => Ok(port),
                None => Err(FtpCommandError::InvalidReplySyntax(cmd, 229)),
            },
            421 => Err(FtpCommandError::ServiceNotAvailable),
            n => Err(FtpCommandError::UnexpectedReplyCode(cmd, n)),
        }
    }

    pub(crate) async fn request_transfer_type(
        &mut self,
        t: FtpTransferType,
    ) -> Result<(), FtpCommandError> {
        let cmd = match t {
            FtpTransferType::Ascii => FtpCommand::TYPE_A,
            FtpTransferType::Image => FtpCommand::TYPE_I,
        };
        self.send_cmd(cmd)
            .await
            .map_err(FtpCommandError::SendFailed)?;

        let reply = self
            .timed_read_raw_response("request transfer type")
            .await?;
        match reply.code() {
            500 | 501 => Err(FtpCommandError::RejectedCommandSyntax(cmd)),
            504 => Err(FtpCommandError::ParameterNotImplemented(cmd)),
            530 => Err(FtpCommandError::NotLoggedIn),
            200 => Ok(()),
            421 => Err(FtpCommandError::ServiceNotAvailable),
            n => Err(FtpCommandError::UnexpectedReplyCode(cmd, n)),
        }
    }

    pub(crate) async fn start_list(&mut self) -> Result<(), FtpFileRetrieveStartError> {
        let cmd = FtpCommand::MLSD;
        self.send_cmd(cmd)
            .await
            .map_err(FtpCommandError::SendFailed)?;

        let reply = self
            .timed_read_raw_response("start list")
            .await
            .map_err(FtpCommandError::RecvFailed)?;
        match reply.code() {
            500 | 501 => Err(FtpCommandError::RejectedCommandSyntax(cmd).into()),
            502 => Err(FtpCommandError::CommandNotImplemented(cmd).into()),
            530 => Err(FtpCommandError::NotLoggedIn.into()),
            125 | 150 => Ok(()),
            421 => Err(FtpFileRetrieveStartError::ServiceNotAvailable),
            450 | 550 => Err(FtpFileRetrieveStartError::FileUnavailable),
            n => Err(FtpCommandError::UnexpectedReplyCode(cmd, n).into()),
        }
    }

    pub(crate) async fn wait_list(&mut self) -> Result<(), FtpTransferServerError> {
        let reply = self.read_raw_response().await?;
        match reply.code() {
            226 | 250 => Ok(()),
            425 => Err(FtpTransferServerError::DataTransferNotEstablished),
            426 => Err(FtpTransferServerError::DataTransferLost),
            451 => Err(FtpTransferServerError::ServerFailed),
            n => Err(FtpTransferServerError::UnexpectedEndReplyCode(
                FtpCommand::MLSD,
                n,
            )),
        }
    }

    pub(crate) async fn start_retrieve(
        &mut self,
        path: &str,
    ) -> Result<(), FtpFileRetrieveStartError> {
        let cmd = FtpCommand::RETR;
        self.send_cmd1(cmd, path)
            .await
            .map_err(FtpCommandError::SendFailed)?;

        let reply = self
            .timed_read_raw_response("start retrieve")
            .await
            .map_err(FtpCommandError::RecvFailed)?;
        match reply.code() {
            500 | 501 => Err(FtpCommandError::RejectedCommandSyntax(cmd).into()),
            530 => Err(FtpCommandError::NotLoggedIn.into()),
            550 => Err(FtpFileRetrieveStartError::FileUnavailable),
            125 | 150 => Ok(()),
            421 => Err(FtpFileRetrieveStartError::ServiceNotAvailable),
            450 => Err(FtpFileRetrieveStartError::FileUnavailable),
            n => Err(FtpCommandError::UnexpectedReplyCode(cmd, n).into()),
        }
    }

    pub(crate) async fn wait_retrieve(&mut self) -> Result<(), FtpTransferServerError> {
        let reply = self.read_raw_response().await?;
        match reply.code() {
            110 => Err(FtpTransferServerError::RestartNeeded),
            226 | 250 => Ok(()),
            425 => Err(FtpTransferServerError::DataTransferNotEstablished),
            426 => Err(FtpTransferServerError::DataTransferLost),
            451 => Err(FtpTransferServerError::ServerFailed),
            n => Err(FtpTransferServerError::UnexpectedEndReplyCode(
                FtpCommand::RETR,
                n,
            )),
        }
    }

    pub(crate) async fn start_store(&mut self, path: &str) -> Result<(), FtpFileStoreStartError> {
        let cmd = FtpCommand::STOR;
        self.send_cmd1(cmd, path)
            .await
            .map_err(FtpCommandError::SendFailed)?;

        let reply = self
            .timed_read_raw_response("start store")
            .await
            .map_err(FtpCommandError::RecvFailed)?;
        match reply.code() {
            500 | 501 => Err(FtpCommandError::RejectedCommandSyntax(cmd).into()),
            530 => Err(FtpCommandError::NotLoggedIn.into()),
            532 => Err(FtpFileStoreStartError::NeedAccountForStoring),
            553 => Err(FtpFileStoreStartError::FileNameNotAllowed),
            125 | 150 => Ok(()),
            421 => Err(FtpFileStoreStartError::ServiceNotAvailable),
            450 | 550 => Err(FtpFileStoreStartError::FileUnavailable),
            452 => Err(FtpFileStoreStartError::InsufficientStorageSpace),
            n => Err(FtpCommandError::UnexpectedReplyCode(cmd, n).into()),
        }
    }

    pub(crate) async fn wait_store(&mut self) -> Result<(), FtpTransferServerError> {
        let reply = self.read_raw_response().await?;
        match reply.code() {
            110 => Err(FtpTransferServerError::RestartNeeded),
            226 | 250 => Ok(()),
            425 => Err(FtpTransferServerError::DataTransferNotEstablished),
            426 => Err(FtpTransferServerError::DataTransferLost),
            451 => Err(FtpTransferServerError::ServerFailed),
            551 => Err(FtpTransferServerError::PageTypeUnknown),
            552 => Err(FtpTransferServerError::ExceededStorageAllocation),
            n => Err(FtpTransferServerError::UnexpectedEndReplyCode(
                FtpCommand::STOR,
                n,
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio_test::io::Builder;

    fn channel(mock: tokio_test::io::Mock) -> FtpControlChannel<tokio_test::io::Mock> {
        FtpControlChannel::new(mock, FtpControlConfig::default())
    }

    #[tokio::test]
    async fn greeting_multi_line() {
        let mock = Builder::new()
            .read(b"120 wait a moment\r\n")
            .read(b"220-Welcome\r\n")
            .read(b" to the server\r\n")
            .read(b"220 Ready\r\n")
            .build();
        let mut c = channel(mock);
        c.wait_greetings().await.unwrap();
    }

    #[tokio::test]
    async fn greeting_unavailable() {
        let mock = Builder::new().read(b"421 busy\r\n").build();
        let mut c = channel(mock);
        assert!(matches!(
            c.wait_greetings().await,
            Err(FtpCommandError::ServiceNotAvailable)
        ));
    }

    #[tokio::test]
    async fn login_sequence() {
        let mock = Builder::new()
            .write(b"USER alice\r\n")
            .read(b"331 need password\r\n")
            .write(b"PASS secret\r\n")
            .read(b"230 logged in\r\n")
            .build();
        let mut c = channel(mock);
        assert!(matches!(
            c.send_username("alice").await.unwrap(),
            FtpAuthStatus::NeedPassword
        ));
        assert!(matches!(
            c.send_password("secret").await.unwrap(),
            FtpAuthStatus::LoggedIn
        ));
    }

    #[tokio::test]
    async fn auth_tls_rejected() {
        let mock = Builder::new()
            .write(b"AUTH TLS\r\n")
            .read(b"534 not allowed\r\n")
            .build();
        let mut c = channel(mock);
        assert!(matches!(
            c.request_auth_tls().await,
            Err(FtpCommandError::SecurityRejected(_, 534))
        ));
    }

    #[tokio::test]
    async fn pwd_and_cwd() {
        let mock = Builder::new()
            .write(b"PWD\r\n")
            .read(b"257 \"/pub\" is current directory\r\n")
            .write(b"CWD data\r\n")
            .read(b"550 no such directory\r\n")
            .write(b"CDUP\r\n")
            .read(b"200 ok\r\n")
            .build();
        let mut c = channel(mock);
        assert_eq!(c.print_working_directory().await.unwrap(), "/pub");
        assert!(matches!(
            c.change_working_directory("data").await,
            Err(FtpFileStatError::FileUnavailable)
        ));
        c.change_to_parent_directory().await.unwrap();
    }

    #[tokio::test]
    async fn reject_line_break_in_param() {
        let mock = Builder::new().build();
        let mut c = channel(mock);
        assert!(matches!(
            c.delete_file("a\r\nRMD b").await,
            Err(FtpFileStatError::RawCommandError(
                FtpCommandError::SendFailed(_)
            ))
        ));
    }

    #[tokio::test]
    async fn epsv_not_supported() {
        let mock = Builder::new()
            .write(b"EPSV\r\n")
            .read(b"502 not implemented\r\n")
            .write(b"PASV\r\n")
            .read(b"227 Entering Passive Mode (10,0,0,1,4,1)\r\n")
            .build();
        let mut c = channel(mock);
        assert!(matches!(
            c.request_epsv_port().await,
            Err(FtpCommandError::CommandNotImplemented(_))
        ));
        let addr = c.request_pasv_port().await.unwrap();
        assert_eq!(addr.port(), 1025);
    }

    #[tokio::test]
    async fn store_end_reply() {
        let mock = Builder::new()
            .write(b"STOR a.txt\r\n")
            .read(b"150 ok to send\r\n")
            .read(b"552 quota exceeded\r\n")
            .build();
        let mut c = channel(mock);
        c.start_store("a.txt").await.unwrap();
        assert!(matches!(
            c.wait_store().await,
            Err(FtpTransferServerError::ExceededStorageAllocation)
        ));
    }
}
