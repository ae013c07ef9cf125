/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

use anyhow::{Context, anyhow};
use yaml_rust::Yaml;

use super::{FtpClientConfig, FtpControlConfig, FtpTransferConfig};

impl FtpControlConfig {
    pub fn parse_yaml(value: &Yaml) -> anyhow::Result<Self> {
        if let Yaml::Hash(map) = value {
            let mut config = FtpControlConfig::default();
            ezftp_yaml::foreach_kv(map, |k, v| match ezftp_yaml::normalize_key(k).as_str() {
                "max_line_len" | "max_line_length" => {
                    config.max_line_len = ezftp_yaml::humanize::as_usize(v)
                        .context(format!("invalid humanize usize value for key {k}"))?;
                    Ok(())
                }
                "max_multi_lines" => {
                    config.max_multi_lines = ezftp_yaml::value::as_usize(v)
                        .context(format!("invalid usize value for key {k}"))?;
                    Ok(())
                }
                "command_timeout" => {
                    config.command_timeout = ezftp_yaml::humanize::as_duration(v)
                        .context(format!("invalid humanize duration value for key {k}"))?;
                    Ok(())
                }
                _ => Err(anyhow!("invalid key {k}")),
            })?;
            Ok(config)
        } else {
            Err(anyhow!("invalid yaml type"))
        }
    }
}

impl FtpTransferConfig {
    pub fn parse_yaml(value: &Yaml) -> anyhow::Result<Self> {
        if let Yaml::Hash(map) = value {
            let mut config = FtpTransferConfig::default();
            ezftp_yaml::foreach_kv(map, |k, v| match ezftp_yaml::normalize_key(k).as_str() {
                "list_max_line_len" | "list_max_line_length" => {
                    config.list_max_line_len = ezftp_yaml::humanize::as_usize(v)
                        .context(format!("invalid humanize usize value for key {k}"))?;
                    Ok(())
                }
                "list_max_entries" => {
                    config.list_max_entries = ezftp_yaml::value::as_usize(v)
                        .context(format!("invalid usize value for key {k}"))?;
                    Ok(())
                }
                "list_all_timeout" => {
                    config.list_all_timeout = ezftp_yaml::humanize::as_duration(v)
                        .context(format!("invalid humanize duration value for key {k}"))?;
                    Ok(())
                }
                "data_connect_timeout" => {
                    config.data_connect_timeout = ezftp_yaml::humanize::as_duration(v)
                        .context(format!("invalid humanize duration value for key {k}"))?;
                    Ok(())
                }
                "data_idle_timeout" => {
                    config.data_idle_timeout = ezftp_yaml::humanize::as_duration(v)
                        .context(format!("invalid humanize duration value for key {k}"))?;
                    Ok(())
                }
                "end_wait_timeout" => {
                    config.end_wait_timeout = ezftp_yaml::humanize::as_duration(v)
                        .context(format!("invalid humanize duration value for key {k}"))?;
                    Ok(())
                }
                _ => Err(anyhow!("invalid key {k}")),
            })?;
            Ok(config)
        } else {
            Err(anyhow!("invalid yaml type"))
        }
    }
}

impl FtpClientConfig {
    pub fn parse_yaml(value: &Yaml) -> anyhow::Result<Self> {
        if let Yaml::Hash(map) = value {
            let mut config = FtpClientConfig::default();
            ezftp_yaml::foreach_kv(map, |k, v| match ezftp_yaml::normalize_key(k).as_str() {
                "control" => {
                    config.control = FtpControlConfig::parse_yaml(v).context(format!(
                        "invalid ftp control connection config value for key {k}"
                    ))?;
                    Ok(())
                }
                "transfer" => {
                    config.transfer = FtpTransferConfig::parse_yaml(v).context(format!(
                        "invalid ftp transfer connection config value for key {k}"
                    ))?;
                    Ok(())
                }
                "connect_timeout" => {
                    config.connect_timeout = ezftp_yaml::humanize::as_duration(v)
                        .context(format!("invalid humanize duration value for key {k}"))?;
                    Ok(())
                }
                "greeting_timeout" => {
                    config.greeting_timeout = ezftp_yaml::humanize::as_duration(v)
                        .context(format!("invalid humanize duration value for key {k}"))?;
                    Ok(())
                }
                "tls_handshake_timeout" => {
                    config.tls_handshake_timeout = ezftp_yaml::humanize::as_duration(v)
                        .context(format!("invalid humanize duration value for key {k}"))?;
                    Ok(())
                }
                "always_try_epsv" => {
                    config.always_try_epsv = ezftp_yaml::value::as_bool(v)
                        .context(format!("invalid bool value for key {k}"))?;
                    Ok(())
                }
                _ => Err(anyhow!("invalid key {k}")),
            })?;
            Ok(config)
        } else {
            Err(anyhow!("invalid yaml type"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn parse_client() {
        let doc = ezftp_yaml::load_first_doc(
            r#"
            connect-timeout: 5s
            always_try_epsv: false
            control:
              max_line_length: 4KiB
              command_timeout: 3
            transfer:
              list_max_entries: 16
              end_wait_timeout: 500ms
              data_idle_timeout: 15s
            "#,
        )
        .unwrap();
        let config = FtpClientConfig::parse_yaml(&doc).unwrap();
        assert_eq!(config.connect_timeout, Duration::from_secs(5));
        assert!(!config.always_try_epsv);
        assert_eq!(config.control.max_line_len, 4096);
        assert_eq!(config.control.command_timeout, Duration::from_secs(3));
        assert_eq!(config.transfer.list_max_entries, 16);
        assert_eq!(config.transfer.end_wait_timeout, Duration::from_millis(500));
        assert_eq!(config.transfer.data_idle_timeout, Duration::from_secs(15));
        assert_eq!(config.greeting_timeout, FtpClientConfig::default().greeting_timeout);
    }

    #[test]
    fn parse_unknown_key() {
        let doc = ezftp_yaml::load_first_doc("control:\n  max_lines: 1").unwrap();
        assert!(FtpClientConfig::parse_yaml(&doc).is_err());

        let doc = ezftp_yaml::load_first_doc("- 1").unwrap();
        assert!(FtpClientConfig::parse_yaml(&doc).is_err());
    }
}
