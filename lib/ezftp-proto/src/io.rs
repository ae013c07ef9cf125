/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

use std::io;
use std::time::Duration;

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

const COPY_BUFFER_SIZE: usize = 16 * 1024;

/// Read into `buf` until `delimiter` is found or `max_len` bytes have been read.
///
/// Returns whether the delimiter was found and how many bytes were read.
/// A zero length means the reader reached eof.
pub(crate) async fn limited_read_until<R>(
    reader: &mut R,
    delimiter: u8,
    max_len: usize,
    buf: &mut Vec<u8>,
) -> io::Result<(bool, usize)>
where
    R: AsyncBufRead + Unpin + ?Sized,
{
    let mut nr = 0usize;
    while nr < max_len {
        let available = reader.fill_buf().await?;
        if available.is_empty() {
            return Ok((false, nr));
        }

        let left = max_len - nr;
        let search = if available.len() > left {
            &available[..left]
        } else {
            available
        };
        if let Some(p) = memchr::memchr(delimiter, search) {
            buf.extend_from_slice(&search[..=p]);
            reader.consume(p + 1);
            return Ok((true, nr + p + 1));
        }

        let len = search.len();
        buf.extend_from_slice(search);
        reader.consume(len);
        nr += len;
    }
    Ok((false, nr))
}

/// Copy `reader` into `writer` until eof.
///
/// Fails with [`io::ErrorKind::TimedOut`] if a single read or write makes no
/// progress within `idle_timeout`.
pub(crate) async fn copy_with_idle_timeout<R, W>(
    reader: &mut R,
    writer: &mut W,
    idle_timeout: Duration,
) -> io::Result<u64>
where
    R: AsyncRead + Unpin + ?Sized,
    W: AsyncWrite + Unpin + ?Sized,
{
    let mut buf = vec![0u8; COPY_BUFFER_SIZE];
    let mut copied = 0u64;
    loop {
        let nr = match tokio::time::timeout(idle_timeout, reader.read(&mut buf)).await {
            Ok(r) => r?,
            Err(_) => {
                return Err(io::Error::new(
                    io::ErrorKind::TimedOut,
                    "idle timeout while reading data",
                ));
            }
        };
        if nr == 0 {
            return Ok(copied);
        }
        match tokio::time::timeout(idle_timeout, writer.write_all(&buf[..nr])).await {
            Ok(r) => r?,
            Err(_) => {
                return Err(io::Error::new(
                    io::ErrorKind::TimedOut,
                    "idle timeout while writing data",
                ));
            }
        }
        copied += nr as u64;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::BufReader;

    #[tokio::test]
    async fn read_lines() {
        let data: &[u8] = b"220 ok\r\n221 bye\r\n";
        let mut reader = BufReader::new(data);
        let mut buf = Vec::new();

        let (found, nr) = limited_read_until(&mut reader, b'\n', 64, &mut buf)
            .await
            .unwrap();
        assert!(found);
        assert_eq!(nr, 8);
        assert_eq!(buf.as_slice(), b"220 ok\r\n");

        buf.clear();
        let (found, _) = limited_read_until(&mut reader, b'\n', 64, &mut buf)
            .await
            .unwrap();
        assert!(found);
        assert_eq!(buf.as_slice(), b"221 bye\r\n");

        buf.clear();
        let (found, nr) = limited_read_until(&mut reader, b'\n', 64, &mut buf)
            .await
            .unwrap();
        assert!(!found);
        assert_eq!(nr, 0);
    }

    #[tokio::test]
    async fn read_too_long() {
        let data: &[u8] = b"0123456789\n";
        let mut reader = BufReader::with_capacity(4, data);
        let mut buf = Vec::new();

        let (found, nr) = limited_read_until(&mut reader, b'\n', 6, &mut buf)
            .await
            .unwrap();
        assert!(!found);
        assert_eq!(nr, 6);
        assert_eq!(buf.as_slice(), b"012345");
    }

    #[tokio::test]
    async fn copy_all() {
        let data = vec![7u8; COPY_BUFFER_SIZE * 2 + 5];
        let mut reader = data.as_slice();
        let mut writer = Vec::new();
        let copied = copy_with_idle_timeout(&mut reader, &mut writer, Duration::from_secs(1))
            .await
            .unwrap();
        assert_eq!(copied, data.len() as u64);
        assert_eq!(writer, data);
    }

    #[tokio::test]
    async fn copy_stalled() {
        // the peer stays open but never sends anything
        let (mut reader, _peer) = tokio::io::duplex(64);
        let mut writer = Vec::new();
        let e = copy_with_idle_timeout(&mut reader, &mut writer, Duration::from_millis(20))
            .await
            .unwrap_err();
        assert_eq!(e.kind(), io::ErrorKind::TimedOut);
        assert!(writer.is_empty());
    }
}
