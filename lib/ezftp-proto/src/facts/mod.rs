/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

use std::str::FromStr;

use chrono::{DateTime, Utc};

use crate::error::FtpFileFactsParseError;

mod entry_type;
pub(crate) mod time_val;

pub use entry_type::FtpFileEntryType;

/// One entry of a machine readable (MLSD) listing.
#[derive(Clone, Debug)]
pub struct FtpFileFacts {
    entry_name: String,
    entry_type: FtpFileEntryType,
    size: Option<u64>,
    modify_time: Option<DateTime<Utc>>,
}

impl FtpFileFacts {
    fn new(name: &str) -> Self {
        FtpFileFacts {
            entry_name: name.to_string(),
            entry_type: FtpFileEntryType::Unknown,
            size: None,
            modify_time: None,
        }
    }

    #[inline]
    pub fn entry_name(&self) -> &str {
        self.entry_name.as_str()
    }

    #[inline]
    pub fn entry_type(&self) -> &FtpFileEntryType {
        &self.entry_type
    }

    #[inline]
    pub fn size(&self) -> Option<u64> {
        self.size
    }

    #[inline]
    pub fn mtime(&self) -> Option<&DateTime<Utc>> {
        self.modify_time.as_ref()
    }

    pub fn parse_line(line: &str) -> Result<Self, FtpFileFactsParseError> {
        let line = line.trim_end_matches(['\r', '\n']);
        if let Some((facts, name)) = line.trim_start().split_once(' ') {
            let mut ff = FtpFileFacts::new(name);

            for fact in facts.split(';') {
                if fact.is_empty() {
                    continue;
                }

                if let Some((key, value)) = fact.split_once('=') {
                    ff.set_fact(key, value)?;
                } else {
                    return Err(FtpFileFactsParseError::NoDelimiterInFact(fact.to_string()));
                }
            }

            Ok(ff)
        } else {
            Err(FtpFileFactsParseError::NoSpaceDelimiter)
        }
    }

    fn set_fact(&mut self, key: &str, value: &str) -> Result<(), FtpFileFactsParseError> {
        match key.to_lowercase().as_str() {
            "type" => self.entry_type = FtpFileEntryType::parse(value),
            "modify" => {
                let dt = time_val::parse_from_str(value)
                    .map_err(FtpFileFactsParseError::InvalidModifyTime)?;
                self.modify_time = Some(dt);
            }
            "size" | "sizd" => {
                let size = u64::from_str(value).map_err(|_| FtpFileFactsParseError::InvalidSize)?;
                self.size = Some(size);
            }
            _ => {}
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_pdir() {
        let ff = FtpFileFacts::parse_line("type=pdir;sizd=4096;modify=20210525083610;UNIX.mode=0755;UNIX.uid=0;UNIX.gid=0;unique=804g2; /").unwrap();
        assert_eq!(ff.entry_type, FtpFileEntryType::ParentDir);
        assert_eq!(ff.size, Some(4096));
        assert_eq!(ff.entry_name(), "/");
    }

    #[test]
    fn parse_file_with_space() {
        let ff = FtpFileFacts::parse_line("type=file;size=12;modify=20240101000000; my report.txt\r\n")
            .unwrap();
        assert_eq!(ff.entry_type, FtpFileEntryType::File);
        assert_eq!(ff.size(), Some(12));
        assert_eq!(ff.entry_name(), "my report.txt");
        assert!(ff.mtime().is_some());
    }

    #[test]
    fn parse_invalid() {
        assert!(matches!(
            FtpFileFacts::parse_line("type=file;size=1;"),
            Err(FtpFileFactsParseError::NoSpaceDelimiter)
        ));
        assert!(matches!(
            FtpFileFacts::parse_line("type=file;size; a"),
            Err(FtpFileFactsParseError::NoDelimiterInFact(_))
        ));
        assert!(matches!(
            FtpFileFacts::parse_line("size=x; a"),
            Err(FtpFileFactsParseError::InvalidSize)
        ));
    }
}
