/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::str::FromStr;

use tokio::io::{AsyncRead, AsyncWrite};

use super::FtpControlChannel;
use crate::error::FtpRawResponseError;

#[derive(Debug)]
pub(super) enum FtpRawResponse {
    SingleLine(u16, String),
    MultiLine(u16, Vec<String>),
}

fn parse_reply_code(line: &[u8]) -> Result<u16, FtpRawResponseError> {
    let digits = &line[0..3];
    if !digits.iter().all(u8::is_ascii_digit) {
        return Err(FtpRawResponseError::InvalidLineFormat);
    }
    let code = digits
        .iter()
        .fold(0u16, |acc, c| acc * 10 + (c - b'0') as u16);
    if !(100..600).contains(&code) {
        return Err(FtpRawResponseError::InvalidReplyCode(code));
    }
    Ok(code)
}

impl FtpRawResponse {
    pub(super) fn parse_single_line(line: &[u8]) -> Result<Self, FtpRawResponseError> {
        let code = parse_reply_code(line)?;
        let msg =
            std::str::from_utf8(&line[4..]).map_err(|_| FtpRawResponseError::LineIsNotUtf8)?;
        Ok(FtpRawResponse::SingleLine(code, msg.trim_end().to_string()))
    }

    pub(super) fn get_multi_line_parser(
        line: &[u8],
        max_lines: usize,
    ) -> Result<FtpMultiLineReplyParser, FtpRawResponseError> {
        let code = parse_reply_code(line)?;
        let end_prefix = [line[0], line[1], line[2], b' '];
        let mut lines = Vec::<String>::with_capacity(max_lines);
        let msg =
            std::str::from_utf8(&line[4..]).map_err(|_| FtpRawResponseError::LineIsNotUtf8)?;
        lines.push(msg.trim_end().to_string());
        Ok(FtpMultiLineReplyParser {
            code,
            end_prefix,
            lines,
        })
    }

    pub(super) fn code(&self) -> u16 {
        match self {
            FtpRawResponse::SingleLine(code, _) => *code,
            FtpRawResponse::MultiLine(code, _) => *code,
        }
    }

    fn first_line(&self) -> &str {
        match self {
            FtpRawResponse::SingleLine(_, line) => line,
            FtpRawResponse::MultiLine(_, lines) => lines.first().map(|s| s.as_str()).unwrap_or(""),
        }
    }

    pub(super) fn parse_pasv_227_reply(&self) -> Option<SocketAddr> {
        let line = match self {
            FtpRawResponse::SingleLine(_, line) => line,
            FtpRawResponse::MultiLine(_, _) => return None,
        };

        let p_start = memchr::memchr(b'(', line.as_bytes())?;
        let p_end = memchr::memchr(b')', &line.as_bytes()[p_start..])? + p_start;

        let a: Vec<&str> = line[p_start + 1..p_end].split(',').collect();
        if a.len() != 6 {
            return None;
        }

        let h1 = u8::from_str(a[0].trim()).ok()?;
        let h2 = u8::from_str(a[1].trim()).ok()?;
        let h3 = u8::from_str(a[2].trim()).ok()?;
        let h4 = u8::from_str(a[3].trim()).ok()?;
        let p1 = u8::from_str(a[4].trim()).ok()?;
        let p2 = u8::from_str(a[5].trim()).ok()?;

        let ip = IpAddr::V4(Ipv4Addr::new(h1, h2, h3, h4));
        let port = ((p1 as u16) << 8) + (p2 as u16);
        Some(SocketAddr::new(ip, port))
    }

    pub(super) fn parse_epsv_229_reply(&self) -> Option<u16> {
        let line = match self {
            FtpRawResponse::SingleLine(_, line) => line,
            FtpRawResponse::MultiLine(_, _) => return None,
        };

        let p_start = memchr::memchr(b'(', line.as_bytes())?;
        let p_end = memchr::memchr(b')', &line.as_bytes()[p_start..])? + p_start;

        if !line[p_start + 1..p_end].starts_with("|||") {
            return None;
        }
        if p_end - 1 <= p_start + 4 {
            return None;
        }
        if line.as_bytes()[p_end - 1] != b'|' {
            return None;
        }
        u16::from_str(&line[p_start + 4..p_end - 1]).ok()
    }

    /// Extract the quoted path of a 257 reply, `""` being an escaped quote.
    pub(super) fn parse_pwd_257_reply(&self) -> Option<String> {
        let line = self.first_line();
        let start = memchr::memchr(b'"', line.as_bytes())?;

        let mut path = String::with_capacity(line.len());
        let mut chars = line[start + 1..].chars().peekable();
        while let Some(c) = chars.next() {
            if c == '"' {
                if chars.peek() == Some(&'"') {
                    chars.next();
                    path.push('"');
                } else {
                    return Some(path);
                }
            } else {
                path.push(c);
            }
        }

        None
    }
}

pub(super) struct FtpMultiLineReplyParser {
    code: u16,
    end_prefix: [u8; 4],
    lines: Vec<String>,
}

impl FtpMultiLineReplyParser {
    pub(super) fn feed_line(&mut self, line: &[u8]) -> Result<bool, FtpRawResponseError> {
        if line.starts_with(&self.end_prefix) {
            let msg =
                std::str::from_utf8(&line[4..]).map_err(|_| FtpRawResponseError::LineIsNotUtf8)?;
            self.lines.push(msg.trim_end().to_string());
            Ok(true)
        } else {
            let msg = std::str::from_utf8(line).map_err(|_| FtpRawResponseError::LineIsNotUtf8)?;
            // do not trim whitespace at beginning
            self.lines.push(msg.trim_end().to_string());
            Ok(false)
        }
    }

    pub(super) fn finish(self) -> FtpRawResponse {
        FtpRawResponse::MultiLine(self.code, self.lines)
    }
}

impl<T> FtpControlChannel<T>
where
    T: AsyncRead + AsyncWrite + Unpin,
{
    async fn read_line(
        &mut self,
        buf: &mut Vec<u8>,
        min_len: usize,
    ) -> Result<(), FtpRawResponseError> {
        buf.clear();

        let (found, len) = crate::io::limited_read_until(
            &mut self.stream,
            b'\n',
            self.config.max_line_len,
            buf,
        )
        .await
        .map_err(FtpRawResponseError::ReadFailed)?;
        if len == 0 {
            return Err(FtpRawResponseError::ConnectionClosed);
        }

        #[cfg(feature = "log-raw-io")]
        crate::debug::log_rsp(buf);

        if !found {
            Err(FtpRawResponseError::LineTooLong)
        } else if len < min_len {
            Err(FtpRawResponseError::InvalidLineFormat)
        } else {
            Ok(())
        }
    }

    pub(super) async fn read_raw_response(
        &mut self,
    ) -> Result<FtpRawResponse, FtpRawResponseError> {
        let mut buf = Vec::<u8>::with_capacity(self.config.max_line_len);
        // at least <code><sp>\n
        self.read_line(&mut buf, 5).await?;

        match buf[3] {
            b' ' | b'\r' | b'\n' => FtpRawResponse::parse_single_line(&buf),
            b'-' => {
                let mut ml_parser =
                    FtpRawResponse::get_multi_line_parser(&buf, self.config.max_multi_lines)?;
                for _i in 0..self.config.max_multi_lines {
                    self.read_line(&mut buf, 1).await?;
                    let end = ml_parser.feed_line(&buf)?;
                    if end {
                        return Ok(ml_parser.finish());
                    }
                }
                Err(FtpRawResponseError::TooManyLines)
            }
            _ => Err(FtpRawResponseError::InvalidLineFormat),
        }
    }

    pub(super) async fn timed_read_raw_response(
        &mut self,
        stage: &'static str,
    ) -> Result<FtpRawResponse, FtpRawResponseError> {
        match tokio::time::timeout(self.config.command_timeout, self.read_raw_response()).await {
            Ok(r) => r,
            Err(_) => Err(FtpRawResponseError::ReadResponseTimedOut(stage)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_line() {
        let rsp = FtpRawResponse::parse_single_line(b"220 welcome\r\n").unwrap();
        assert_eq!(rsp.code(), 220);

        assert!(FtpRawResponse::parse_single_line(b"2x0 welcome\r\n").is_err());
        assert!(FtpRawResponse::parse_single_line(b"700 what\r\n").is_err());
    }

    #[test]
    fn pasv() {
        let rsp = FtpRawResponse::SingleLine(
            227,
            "Entering Passive Mode (192,168,1,2,19,137).".to_string(),
        );
        let addr = rsp.parse_pasv_227_reply().unwrap();
        assert_eq!(addr, SocketAddr::from_str("192.168.1.2:5001").unwrap());

        let rsp = FtpRawResponse::SingleLine(227, "Entering Passive Mode (1,2,3)".to_string());
        assert!(rsp.parse_pasv_227_reply().is_none());
    }

    #[test]
    fn epsv() {
        let rsp = FtpRawResponse::SingleLine(
            229,
            "Entering Extended Passive Mode (|||6446|)".to_string(),
        );
        assert_eq!(rsp.parse_epsv_229_reply(), Some(6446));

        let rsp = FtpRawResponse::SingleLine(229, "Entering (||6446|)".to_string());
        assert!(rsp.parse_epsv_229_reply().is_none());
    }

    #[test]
    fn pwd() {
        let rsp = FtpRawResponse::SingleLine(257, "\"/home/ftp\" is current directory".to_string());
        assert_eq!(rsp.parse_pwd_257_reply().unwrap(), "/home/ftp");

        let rsp = FtpRawResponse::SingleLine(257, "\"/a \"\"b\"\"\" created".to_string());
        assert_eq!(rsp.parse_pwd_257_reply().unwrap(), "/a \"b\"");

        let rsp = FtpRawResponse::SingleLine(257, "no quote".to_string());
        assert!(rsp.parse_pwd_257_reply().is_none());

        let rsp = FtpRawResponse::SingleLine(257, "\"/unterminated".to_string());
        assert!(rsp.parse_pwd_257_reply().is_none());
    }
}
