/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

use async_trait::async_trait;
use tokio::io::{AsyncRead, BufReader};

use crate::config::FtpTransferConfig;
use crate::error::FtpLineDataReadError;

#[async_trait]
pub trait FtpLineDataReceiver {
    async fn recv_line(&mut self, line: &str);
    fn should_return_early(&self) -> bool;
}

pub(crate) struct FtpLineDataTransfer<T: AsyncRead> {
    io: BufReader<T>,
    max_lines: usize,
    max_line_len: usize,
    line_buf: Vec<u8>,
}

impl<T> FtpLineDataTransfer<T>
where
    T: AsyncRead + Unpin,
{
    pub(crate) fn new(io: T, config: &FtpTransferConfig) -> Self {
        FtpLineDataTransfer {
            io: BufReader::new(io),
            max_lines: config.list_max_entries,
            max_line_len: config.list_max_line_len,
            line_buf: Vec::with_capacity(config.list_max_line_len),
        }
    }

    async fn send_buf_to_receiver<R>(
        &mut self,
        receiver: &mut R,
    ) -> Result<(), FtpLineDataReadError>
    where
        R: FtpLineDataReceiver + Send,
    {
        let s = std::str::from_utf8(&self.line_buf)
            .map_err(|_| FtpLineDataReadError::UnsupportedEncoding)?;
        let s = s.trim_end_matches(['\r', '\n']);
        if !s.is_empty() {
            receiver.recv_line(s).await;
        }
        self.line_buf.clear();
        if receiver.should_return_early() {
            return Err(FtpLineDataReadError::AbortedByCallback);
        }
        Ok(())
    }

    /// Feed every line to the receiver until the server closes the data connection.
    pub(crate) async fn read_to_end<R>(
        &mut self,
        receiver: &mut R,
    ) -> Result<(), FtpLineDataReadError>
    where
        R: FtpLineDataReceiver + Send,
    {
        let mut nl = 0usize;
        loop {
            let (found, nr) = crate::io::limited_read_until(
                &mut self.io,
                b'\n',
                self.max_line_len,
                &mut self.line_buf,
            )
            .await?;
            if nr == 0 {
                return Ok(());
            }

            if nl >= self.max_lines {
                return Err(FtpLineDataReadError::TooManyLines);
            }
            nl += 1;

            if !found {
                if nr < self.max_line_len {
                    // last line without line ending
                    self.send_buf_to_receiver(receiver).await?;
                    return Ok(());
                }
                return Err(FtpLineDataReadError::LineTooLong(nl));
            }

            self.send_buf_to_receiver(receiver).await?;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Collector {
        lines: Vec<String>,
        limit: Option<usize>,
    }

    #[async_trait]
    impl FtpLineDataReceiver for Collector {
        async fn recv_line(&mut self, line: &str) {
            self.lines.push(line.to_string());
        }

        fn should_return_early(&self) -> bool {
            self.limit.map(|n| self.lines.len() >= n).unwrap_or(false)
        }
    }

    #[tokio::test]
    async fn read_all() {
        let data: &[u8] = b"type=file; a\r\ntype=dir; b\r\ntype=file; c";
        let mut transfer = FtpLineDataTransfer::new(data, &FtpTransferConfig::default());
        let mut collector = Collector::default();
        transfer.read_to_end(&mut collector).await.unwrap();
        assert_eq!(collector.lines, ["type=file; a", "type=dir; b", "type=file; c"]);
    }

    #[tokio::test]
    async fn too_many_lines() {
        let data: &[u8] = b"a\nb\nc\n";
        let config = FtpTransferConfig {
            list_max_entries: 2,
            ..Default::default()
        };
        let mut transfer = FtpLineDataTransfer::new(data, &config);
        let mut collector = Collector::default();
        assert!(matches!(
            transfer.read_to_end(&mut collector).await,
            Err(FtpLineDataReadError::TooManyLines)
        ));
    }

    #[tokio::test]
    async fn line_too_long() {
        let data: &[u8] = b"0123456789\n";
        let config = FtpTransferConfig {
            list_max_line_len: 4,
            ..Default::default()
        };
        let mut transfer = FtpLineDataTransfer::new(data, &config);
        let mut collector = Collector::default();
        assert!(matches!(
            transfer.read_to_end(&mut collector).await,
            Err(FtpLineDataReadError::LineTooLong(1))
        ));
    }

    #[tokio::test]
    async fn abort() {
        let data: &[u8] = b"a\nb\nc\n";
        let mut transfer = FtpLineDataTransfer::new(data, &FtpTransferConfig::default());
        let mut collector = Collector {
            limit: Some(1),
            ..Default::default()
        };
        assert!(matches!(
            transfer.read_to_end(&mut collector).await,
            Err(FtpLineDataReadError::AbortedByCallback)
        ));
        assert_eq!(collector.lines, ["a"]);
    }
}
